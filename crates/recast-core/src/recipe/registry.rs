use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::{DeclarativeRecipe, Recipe, RecipeDescriptor};
use crate::error::RecastError;
use crate::result::Result;

/// Recipes available by name, in registration order
#[derive(Default)]
pub struct RecipeRegistry {
    recipes: IndexMap<String, Arc<dyn Recipe>>,
}

impl RecipeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recipe, returning the one it replaced
    pub fn register(&mut self, recipe: Arc<dyn Recipe>) -> Option<Arc<dyn Recipe>> {
        let name = recipe.name().to_string();
        debug!("Registering recipe: {}", name);
        let previous = self.recipes.insert(name.clone(), recipe);
        if previous.is_some() {
            info!("Recipe '{}' replaced an earlier registration", name);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Recipe>> {
        self.recipes.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn descriptors(&self) -> Vec<RecipeDescriptor> {
        self.recipes.values().map(|r| r.descriptor()).collect()
    }

    /// Composite of the named recipes, in the given order
    pub fn activate(&self, names: &[String]) -> Result<DeclarativeRecipe> {
        let mut builder = DeclarativeRecipe::builder("recast.ActiveRecipes")
            .display_name("Active recipes")
            .description("Recipes activated by configuration.");
        for name in names {
            builder = builder.recipe_named(name);
        }
        let mut composite = builder.build();
        composite.initialize(self);
        let validated = composite.validate();
        if !validated.is_valid() {
            return Err(RecastError::InvalidRecipe {
                recipe: composite.name().to_string(),
                failures: validated.failure_summary(),
            });
        }
        Ok(composite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Recipe for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn display_name(&self) -> &str {
            "Named"
        }

        fn description(&self) -> &str {
            "A recipe that does nothing."
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = RecipeRegistry::new();
        assert!(registry.register(Arc::new(Named("b.Second"))).is_none());
        registry.register(Arc::new(Named("a.First")));
        assert!(registry.register(Arc::new(Named("b.Second"))).is_some());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["b.Second", "a.First"]);
        assert!(registry.get("a.First").is_some());
        assert!(registry.get("c.Third").is_none());
    }

    #[test]
    fn test_activate_unknown_recipe() {
        let mut registry = RecipeRegistry::new();
        registry.register(Arc::new(Named("a.First")));

        let active = registry.activate(&["a.First".to_string()]).unwrap();
        assert_eq!(active.recipe_list().len(), 1);

        let err = registry
            .activate(&["a.First".to_string(), "a.Missing".to_string()])
            .err()
            .unwrap();
        assert!(err.to_string().contains("recipe 'a.Missing' does not exist."));
    }
}
