use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{
    All, Contributor, Maintainer, Precondition, Recipe, RecipeApplies, RecipeRegistry, Scanning,
    ScanningRecipe, Validated,
};
use crate::execution::ExecutionContext;
use crate::result::Result;
use crate::tree::CompilationUnit;

#[derive(Clone)]
enum Reference {
    Loaded(Arc<dyn Recipe>),
    Named(String),
}

impl Reference {
    fn name(&self) -> &str {
        match self {
            Reference::Loaded(recipe) => recipe.name(),
            Reference::Named(name) => name,
        }
    }
}

/// A recipe composed of other recipes referenced by name.
///
/// Children and applicability tests named with `*_named` are resolved by
/// [`DeclarativeRecipe::initialize`]. Until then the recipe validates as
/// invalid.
pub struct DeclarativeRecipe {
    name: String,
    display_name: String,
    description: String,
    tags: Vec<String>,
    estimated_effort: Option<Duration>,
    maintainers: Vec<Maintainer>,
    causes_another_cycle: bool,
    references: Vec<Reference>,
    single_source_references: Vec<Reference>,
    any_source_references: Vec<Reference>,
    recipe_list: Vec<Arc<dyn Recipe>>,
    single_source: Option<All>,
    any_source: Vec<Arc<dyn Recipe>>,
    validation: Validated,
    initialized: bool,
}

impl DeclarativeRecipe {
    pub fn builder(name: impl Into<String>) -> DeclarativeRecipeBuilder {
        DeclarativeRecipeBuilder {
            recipe: DeclarativeRecipe {
                name: name.into(),
                display_name: String::new(),
                description: String::new(),
                tags: Vec::new(),
                estimated_effort: None,
                maintainers: Vec::new(),
                causes_another_cycle: false,
                references: Vec::new(),
                single_source_references: Vec::new(),
                any_source_references: Vec::new(),
                recipe_list: Vec::new(),
                single_source: None,
                any_source: Vec::new(),
                validation: Validated::none(),
                initialized: false,
            },
        }
    }

    fn needs_initialize(&self) -> bool {
        self.references
            .iter()
            .chain(&self.single_source_references)
            .chain(&self.any_source_references)
            .any(|r| matches!(r, Reference::Named(_)))
    }

    fn resolve(
        &mut self,
        references: &[Reference],
        property: &str,
        registry: &RecipeRegistry,
    ) -> Vec<Arc<dyn Recipe>> {
        let mut resolved = Vec::with_capacity(references.len());
        for (i, reference) in references.iter().enumerate() {
            let found = match reference {
                Reference::Loaded(recipe) => Some(recipe.clone()),
                Reference::Named(name) => registry.get(name),
            };
            match found {
                Some(recipe) => resolved.push(recipe),
                None => {
                    let name = reference.name();
                    let validation = std::mem::take(&mut self.validation);
                    self.validation = validation.and(Validated::invalid(
                        format!("{}.{}[{}]", self.name, property, i),
                        Some(name.to_string()),
                        format!("recipe '{name}' does not exist."),
                    ));
                }
            }
        }
        resolved
    }

    /// Resolve named children and applicability tests against a registry
    pub fn initialize(&mut self, registry: &RecipeRegistry) {
        self.validation = Validated::none();

        let references = self.references.clone();
        self.recipe_list = self.resolve(&references, "recipeList", registry);

        let single = self.single_source_references.clone();
        let single = self.resolve(&single, "singleSourceApplicableTests", registry);
        self.single_source = (!single.is_empty()).then(|| {
            All(single
                .into_iter()
                .map(|r| Box::new(RecipeApplies(r)) as Box<dyn Precondition>)
                .collect())
        });

        let any = self.any_source_references.clone();
        self.any_source = self.resolve(&any, "applicableTests", registry);

        self.initialized = true;
        debug!(
            recipe = %self.name,
            children = self.recipe_list.len(),
            valid = self.validation.is_valid(),
            "initialized declarative recipe"
        );
    }
}

impl Recipe for DeclarativeRecipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tags(&self) -> Vec<String> {
        self.tags.clone()
    }

    fn estimated_effort_per_occurrence(&self) -> Option<Duration> {
        self.estimated_effort.or_else(|| {
            let total: Duration = self
                .recipe_list
                .iter()
                .filter_map(|r| r.estimated_effort_per_occurrence())
                .sum();
            (!total.is_zero()).then_some(total)
        })
    }

    fn maintainers(&self) -> Vec<Maintainer> {
        self.maintainers.clone()
    }

    fn contributors(&self) -> Vec<Contributor> {
        let mut by_author: Vec<Contributor> = Vec::new();
        for contributor in self.recipe_list.iter().flat_map(|r| r.contributors()) {
            match by_author
                .iter_mut()
                .find(|c| c.name == contributor.name && c.email == contributor.email)
            {
                Some(existing) => existing.line_count += contributor.line_count,
                None => by_author.push(contributor),
            }
        }
        by_author.sort_by(|a, b| b.line_count.cmp(&a.line_count));
        by_author
    }

    fn validate(&self) -> Validated {
        if !self.initialized && self.needs_initialize() {
            return Validated::invalid(
                self.name.clone(),
                None,
                "initialize(..) must be called on DeclarativeRecipe prior to use.",
            );
        }
        self.validation.clone()
    }

    fn causes_another_cycle(&self) -> bool {
        self.causes_another_cycle
    }

    fn recipe_list(&self) -> &[Arc<dyn Recipe>] {
        &self.recipe_list
    }

    fn precondition(&self) -> Option<&dyn Precondition> {
        self.single_source.as_ref().map(|p| p as &dyn Precondition)
    }

    fn scanning(&self) -> Option<&dyn Scanning> {
        (!self.any_source.is_empty()).then_some(self as &dyn Scanning)
    }
}

impl ScanningRecipe for DeclarativeRecipe {
    /// Whether some unit satisfied every any-source test
    type Accumulator = bool;

    fn initial_value(&self, _ctx: &ExecutionContext) -> bool {
        false
    }

    fn scan(&self, acc: &mut bool, source: &Arc<CompilationUnit>, ctx: &mut ExecutionContext) -> Result<()> {
        if *acc {
            return Ok(());
        }
        for test in &self.any_source {
            if !RecipeApplies(test.clone()).check(source, ctx)? {
                return Ok(());
            }
        }
        *acc = true;
        Ok(())
    }

    fn is_applicable(&self, acc: &bool) -> bool {
        *acc
    }
}

pub struct DeclarativeRecipeBuilder {
    recipe: DeclarativeRecipe,
}

impl DeclarativeRecipeBuilder {
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.recipe.display_name = display_name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.recipe.description = description.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.recipe.tags.push(tag.into());
        self
    }

    pub fn estimated_effort(mut self, effort: Duration) -> Self {
        self.recipe.estimated_effort = Some(effort);
        self
    }

    pub fn maintainer(mut self, maintainer: Maintainer) -> Self {
        self.recipe.maintainers.push(maintainer);
        self
    }

    pub fn causes_another_cycle(mut self, causes_another_cycle: bool) -> Self {
        self.recipe.causes_another_cycle = causes_another_cycle;
        self
    }

    pub fn recipe(mut self, recipe: Arc<dyn Recipe>) -> Self {
        self.recipe.references.push(Reference::Loaded(recipe));
        self
    }

    pub fn recipe_named(mut self, name: impl Into<String>) -> Self {
        self.recipe.references.push(Reference::Named(name.into()));
        self
    }

    /// Children run on a unit only if this recipe would change that unit
    pub fn single_source_applicable_test(mut self, recipe: Arc<dyn Recipe>) -> Self {
        self.recipe.single_source_references.push(Reference::Loaded(recipe));
        self
    }

    pub fn single_source_applicable_test_named(mut self, name: impl Into<String>) -> Self {
        self.recipe.single_source_references.push(Reference::Named(name.into()));
        self
    }

    /// Children run on every unit if some unit satisfies all any-source tests
    pub fn applicable_test(mut self, recipe: Arc<dyn Recipe>) -> Self {
        self.recipe.any_source_references.push(Reference::Loaded(recipe));
        self
    }

    pub fn applicable_test_named(mut self, name: impl Into<String>) -> Self {
        self.recipe.any_source_references.push(Reference::Named(name.into()));
        self
    }

    /// Finish building; references to loaded recipes are resolved immediately
    pub fn build(self) -> DeclarativeRecipe {
        let mut recipe = self.recipe;
        if !recipe.needs_initialize() {
            recipe.initialize(&RecipeRegistry::new());
        }
        recipe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf {
        name: &'static str,
        contributors: Vec<Contributor>,
    }

    impl Recipe for Leaf {
        fn name(&self) -> &str {
            self.name
        }

        fn display_name(&self) -> &str {
            "Leaf"
        }

        fn description(&self) -> &str {
            "Leaf recipe."
        }

        fn contributors(&self) -> Vec<Contributor> {
            self.contributors.clone()
        }
    }

    fn contributor(name: &str, line_count: usize) -> Contributor {
        Contributor {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            line_count,
        }
    }

    #[test]
    fn test_uninitialized_recipe_is_invalid() {
        let recipe = DeclarativeRecipe::builder("com.example.Composite")
            .recipe_named("com.example.Leaf")
            .build();
        let validated = recipe.validate();
        assert!(!validated.is_valid());
        assert_eq!(
            validated.failures().next().unwrap().message.as_deref(),
            Some("initialize(..) must be called on DeclarativeRecipe prior to use.")
        );
    }

    #[test]
    fn test_unknown_child_reports_index() {
        let mut registry = RecipeRegistry::new();
        registry.register(Arc::new(Leaf {
            name: "com.example.Leaf",
            contributors: vec![],
        }));
        let mut recipe = DeclarativeRecipe::builder("com.example.Composite")
            .recipe_named("com.example.Leaf")
            .recipe_named("com.example.Missing")
            .build();
        recipe.initialize(&registry);

        let validated = recipe.validate();
        let failure = validated.failures().next().unwrap();
        assert_eq!(failure.property, "com.example.Composite.recipeList[1]");
        assert_eq!(
            failure.message.as_deref(),
            Some("recipe 'com.example.Missing' does not exist.")
        );
        assert_eq!(recipe.recipe_list().len(), 1);
    }

    #[test]
    fn test_contributors_aggregate_by_line_count() {
        let recipe = DeclarativeRecipe::builder("com.example.Composite")
            .recipe(Arc::new(Leaf {
                name: "a",
                contributors: vec![contributor("Ada", 10), contributor("Bo", 25)],
            }))
            .recipe(Arc::new(Leaf {
                name: "b",
                contributors: vec![contributor("Ada", 30)],
            }))
            .build();

        let contributors = recipe.contributors();
        let summary: Vec<(&str, usize)> = contributors
            .iter()
            .map(|c| (c.name.as_str(), c.line_count))
            .collect();
        assert_eq!(summary, vec![("Ada", 40), ("Bo", 25)]);
        assert!(recipe.validate().is_valid());
    }

    #[test]
    fn test_descriptor_lists_children() {
        let recipe = DeclarativeRecipe::builder("com.example.Composite")
            .display_name("Composite")
            .tag("demo")
            .causes_another_cycle(true)
            .recipe(Arc::new(Leaf {
                name: "com.example.Leaf",
                contributors: vec![],
            }))
            .build();
        let descriptor = recipe.descriptor();
        assert_eq!(descriptor.recipe_list.len(), 1);
        assert_eq!(descriptor.recipe_list[0].name, "com.example.Leaf");
        assert!(descriptor.causes_another_cycle);

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["displayName"], "Composite");
    }
}
