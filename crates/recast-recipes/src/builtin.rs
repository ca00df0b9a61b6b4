//! Built-in Java recipes

use std::sync::Arc;

use recast_core::error::RecastError;
use recast_core::recipe::{Recipe, RecipeRegistry};
use recast_core::result::Result;
use recast_core::template::{IndentStyle, TemplateCache};

pub mod change_method_name;
pub mod comment_on_invocations;
pub mod find_methods;
pub mod replace_invocation;
pub mod update_java_compatibility;

use change_method_name::{CHANGE_METHOD_NAME, ChangeMethodName, ChangeMethodNameOptions};
use comment_on_invocations::{
    COMMENT_ON_METHOD_INVOCATIONS, CommentOnMethodInvocations, CommentOnMethodInvocationsOptions,
};
use find_methods::{FIND_METHODS, FindMethods, FindMethodsOptions};
use replace_invocation::{
    REPLACE_INVOCATION_WITH_TEMPLATE, ReplaceInvocationOptions, ReplaceInvocationWithTemplate,
};
use update_java_compatibility::{
    UPDATE_JAVA_COMPATIBILITY, UpdateJavaCompatibility, UpdateJavaCompatibilityOptions,
};

/// Collection of built-in recipes
pub struct BuiltinRecipes;

impl BuiltinRecipes {
    /// Names of every built-in recipe
    pub fn names() -> &'static [&'static str] {
        &[
            CHANGE_METHOD_NAME,
            REPLACE_INVOCATION_WITH_TEMPLATE,
            FIND_METHODS,
            COMMENT_ON_METHOD_INVOCATIONS,
            UPDATE_JAVA_COMPATIBILITY,
        ]
    }

    /// JSON schema of a built-in recipe's options
    pub fn options_schema(name: &str) -> Option<serde_json::Value> {
        let schema = match name {
            CHANGE_METHOD_NAME => schemars::schema_for!(ChangeMethodNameOptions),
            REPLACE_INVOCATION_WITH_TEMPLATE => schemars::schema_for!(ReplaceInvocationOptions),
            FIND_METHODS => schemars::schema_for!(FindMethodsOptions),
            COMMENT_ON_METHOD_INVOCATIONS => schemars::schema_for!(CommentOnMethodInvocationsOptions),
            UPDATE_JAVA_COMPATIBILITY => schemars::schema_for!(UpdateJavaCompatibilityOptions),
            _ => return None,
        };
        serde_json::to_value(schema).ok()
    }

    /// Instantiate a built-in recipe from its JSON options
    pub fn from_options(name: &str, options: &serde_json::Value) -> Result<Arc<dyn Recipe>> {
        Self::with_template_settings(name, options, TemplateCache::global(), None)
    }

    /// Like [`BuiltinRecipes::from_options`], with the template settings
    /// template-backed recipes build their snippets with
    pub fn with_template_settings(
        name: &str,
        options: &serde_json::Value,
        cache: Arc<TemplateCache>,
        indent: Option<IndentStyle>,
    ) -> Result<Arc<dyn Recipe>> {
        let recipe: Arc<dyn Recipe> = match name {
            CHANGE_METHOD_NAME => Arc::new(ChangeMethodName::from_json(options)?),
            REPLACE_INVOCATION_WITH_TEMPLATE => {
                let options = serde_json::from_value(options.clone()).map_err(|e| {
                    RecastError::config_error(format!("{REPLACE_INVOCATION_WITH_TEMPLATE} options: {e}"))
                })?;
                Arc::new(ReplaceInvocationWithTemplate::with_template_settings(options, cache, indent))
            }
            FIND_METHODS => Arc::new(FindMethods::from_json(options)?),
            COMMENT_ON_METHOD_INVOCATIONS => Arc::new(CommentOnMethodInvocations::from_json(options)?),
            UPDATE_JAVA_COMPATIBILITY => Arc::new(UpdateJavaCompatibility::from_json(options)?),
            _ => {
                return Err(RecastError::config_error(format!("unknown recipe '{name}'")));
            }
        };
        Ok(recipe)
    }

    /// Registry holding one instance of every built-in, with default options
    pub fn registry() -> Result<RecipeRegistry> {
        let mut registry = RecipeRegistry::new();
        for name in Self::names() {
            registry.register(Self::from_options(name, &serde_json::json!({}))?);
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_has_a_schema() {
        for name in BuiltinRecipes::names() {
            let schema = BuiltinRecipes::options_schema(name).unwrap();
            assert!(schema.get("properties").is_some(), "{name}");
        }
        assert!(BuiltinRecipes::options_schema("nope").is_none());
    }

    #[test]
    fn test_registry_contains_every_builtin() {
        let registry = BuiltinRecipes::registry().unwrap();
        assert_eq!(registry.len(), BuiltinRecipes::names().len());
        assert!(registry.contains(CHANGE_METHOD_NAME));
    }

    #[test]
    fn test_unknown_recipe_is_a_config_error() {
        let err = BuiltinRecipes::from_options("recast.Nope", &serde_json::json!({})).err().unwrap();
        assert!(matches!(err, RecastError::ConfigError { .. }));
    }
}
