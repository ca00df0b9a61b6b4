//! Recast built-in recipes
//!
//! Ready-made Java transformations and the glue that turns a
//! [`RecastConfig`] into a runnable recipe:
//! - [`builtin::change_method_name`]: rename a method everywhere it is referenced
//! - [`builtin::replace_invocation`]: rewrite calls through a template
//! - [`builtin::find_methods`]: flag calls as search results
//! - [`builtin::comment_on_invocations`]: annotate calls with a comment
//! - [`builtin::update_java_compatibility`]: bump a build's Java version

pub mod builtin;

pub use builtin::BuiltinRecipes;
pub use builtin::change_method_name::{CHANGE_METHOD_NAME, ChangeMethodName, ChangeMethodNameOptions};
pub use builtin::comment_on_invocations::{COMMENT_ON_METHOD_INVOCATIONS, CommentOnMethodInvocations};
pub use builtin::find_methods::{FIND_METHODS, FindMethods};
pub use builtin::replace_invocation::{REPLACE_INVOCATION_WITH_TEMPLATE, ReplaceInvocationWithTemplate};
pub use builtin::update_java_compatibility::{
    CompatibilityType, DeclarationStyle, UPDATE_JAVA_COMPATIBILITY, UpdateJavaCompatibility,
};

use recast_core::recipe::{DeclarativeRecipe, RecipeRegistry};
use recast_core::result::Result;
use recast_core::RecastConfig;
use tracing::{debug, info};

/// Registry of the built-ins, each configured from `config`'s recipe options
pub fn registry_from_config(config: &RecastConfig) -> Result<RecipeRegistry> {
    let cache = config.template_cache();
    let indent = config.indent_style()?;
    let mut registry = RecipeRegistry::new();
    for name in BuiltinRecipes::names() {
        let options = config
            .recipe_options(name)
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));
        debug!(recipe = name, "registering built-in recipe");
        registry.register(BuiltinRecipes::with_template_settings(
            name,
            &options,
            cache.clone(),
            indent.clone(),
        )?);
    }
    Ok(registry)
}

/// The recipes `config` activates, composed in order and validated
pub fn activate_from_config(config: &RecastConfig) -> Result<DeclarativeRecipe> {
    let registry = registry_from_config(config)?;
    let recipe = registry.activate(config.active_recipes())?;
    info!(recipes = config.active_recipes().len(), "activated recipes");
    Ok(recipe)
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
