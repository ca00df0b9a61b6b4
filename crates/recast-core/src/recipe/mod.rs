//! Recipes: named, composable transformation units
//!
//! A [`Recipe`] describes itself (name, display name, tags, effort,
//! maintainers) and hands the scheduler a visitor for each source unit. A
//! recipe may carry children that run after its own visitor in the same pass,
//! a [`Precondition`] gating the whole subtree per unit, and a scanning phase
//! ([`ScanningRecipe`]) that reads every unit before any edit happens.

mod declarative;
mod preconditions;
mod registry;
mod validated;

pub use declarative::{DeclarativeRecipe, DeclarativeRecipeBuilder};
pub use preconditions::{
    All, AnyOf, HasSourcePath, Not, Precondition, Preconditions, RecipeApplies, UsesMethod, UsesType,
};
pub use registry::RecipeRegistry;
pub use validated::{Validated, Validation};

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use crate::error::RecastError;
use crate::execution::ExecutionContext;
use crate::result::Result;
use crate::tree::{CompilationUnit, Cursor, J};
use crate::visitor::JavaVisitor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    pub name: String,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub name: String,
    pub email: String,
    pub line_count: usize,
}

/// Serializable description of a recipe and its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDescriptor {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub estimated_effort_seconds: Option<u64>,
    pub maintainers: Vec<Maintainer>,
    pub contributors: Vec<Contributor>,
    pub options: serde_json::Value,
    pub preconditions: Vec<String>,
    pub recipe_list: Vec<RecipeDescriptor>,
    pub causes_another_cycle: bool,
}

pub trait Recipe: Send + Sync {
    /// Fully qualified name, unique within a registry
    fn name(&self) -> &str;

    fn display_name(&self) -> &str;

    fn description(&self) -> &str;

    fn tags(&self) -> Vec<String> {
        Vec::new()
    }

    fn estimated_effort_per_occurrence(&self) -> Option<Duration> {
        Some(Duration::from_secs(5 * 60))
    }

    fn maintainers(&self) -> Vec<Maintainer> {
        Vec::new()
    }

    fn contributors(&self) -> Vec<Contributor> {
        Vec::new()
    }

    /// Configured option values, reported in the descriptor
    fn options(&self) -> serde_json::Value {
        serde_json::Value::Null
    }

    fn validate(&self) -> Validated {
        Validated::none()
    }

    /// Whether a change made by this recipe warrants another edit pass
    fn causes_another_cycle(&self) -> bool {
        false
    }

    fn recipe_list(&self) -> &[Arc<dyn Recipe>] {
        &[]
    }

    /// Evaluated once per unit before this recipe and its children edit it
    fn precondition(&self) -> Option<&dyn Precondition> {
        None
    }

    fn visitor(&self) -> Box<dyn JavaVisitor<ExecutionContext> + '_> {
        Box::new(NoopVisitor)
    }

    fn scanning(&self) -> Option<&dyn Scanning> {
        None
    }

    fn descriptor(&self) -> RecipeDescriptor {
        RecipeDescriptor {
            name: self.name().to_string(),
            display_name: self.display_name().to_string(),
            description: self.description().to_string(),
            tags: self.tags(),
            estimated_effort_seconds: self.estimated_effort_per_occurrence().map(|d| d.as_secs()),
            maintainers: self.maintainers(),
            contributors: self.contributors(),
            options: self.options(),
            preconditions: self
                .precondition()
                .map(|p| vec![p.description()])
                .unwrap_or_default(),
            recipe_list: self.recipe_list().iter().map(|r| r.descriptor()).collect(),
            causes_another_cycle: self.causes_another_cycle(),
        }
    }
}

/// Visitor that returns every tree untouched without walking it
pub struct NoopVisitor;

impl JavaVisitor<ExecutionContext> for NoopVisitor {
    fn visit(&mut self, tree: &J, _parent: &Cursor<'_>, _ctx: &mut ExecutionContext) -> Result<J> {
        Ok(tree.clone())
    }
}

/// A recipe with a read-only accumulation phase over all units
pub trait ScanningRecipe: Recipe {
    type Accumulator: Send + Sync + 'static;

    fn initial_value(&self, ctx: &ExecutionContext) -> Self::Accumulator;

    fn scan(
        &self,
        acc: &mut Self::Accumulator,
        source: &Arc<CompilationUnit>,
        ctx: &mut ExecutionContext,
    ) -> Result<()>;

    fn editor<'a>(&'a self, _acc: &'a Self::Accumulator) -> Box<dyn JavaVisitor<ExecutionContext> + 'a> {
        Box::new(NoopVisitor)
    }

    /// Whether this recipe and its children edit at all, given the frozen accumulator
    fn is_applicable(&self, _acc: &Self::Accumulator) -> bool {
        true
    }
}

/// Type-erased accumulator held by the scheduler
pub type Accumulator = Box<dyn Any + Send + Sync>;

/// Object-safe view of a [`ScanningRecipe`]
pub trait Scanning: Send + Sync {
    fn initial_accumulator(&self, ctx: &ExecutionContext) -> Accumulator;

    fn scan_erased(
        &self,
        acc: &mut (dyn Any + Send + Sync),
        source: &Arc<CompilationUnit>,
        ctx: &mut ExecutionContext,
    ) -> Result<()>;

    fn editor_erased<'a>(
        &'a self,
        acc: &'a (dyn Any + Send + Sync),
    ) -> Result<Box<dyn JavaVisitor<ExecutionContext> + 'a>>;

    fn is_applicable_erased(&self, acc: &(dyn Any + Send + Sync)) -> Result<bool>;
}

fn accumulator_mismatch(recipe: &str) -> RecastError {
    RecastError::internal_error(format!("accumulator of '{recipe}' has an unexpected type"))
}

impl<R: ScanningRecipe> Scanning for R {
    fn initial_accumulator(&self, ctx: &ExecutionContext) -> Accumulator {
        Box::new(self.initial_value(ctx))
    }

    fn scan_erased(
        &self,
        acc: &mut (dyn Any + Send + Sync),
        source: &Arc<CompilationUnit>,
        ctx: &mut ExecutionContext,
    ) -> Result<()> {
        let acc = acc
            .downcast_mut::<R::Accumulator>()
            .ok_or_else(|| accumulator_mismatch(self.name()))?;
        self.scan(acc, source, ctx)
    }

    fn editor_erased<'a>(
        &'a self,
        acc: &'a (dyn Any + Send + Sync),
    ) -> Result<Box<dyn JavaVisitor<ExecutionContext> + 'a>> {
        let acc = acc
            .downcast_ref::<R::Accumulator>()
            .ok_or_else(|| accumulator_mismatch(self.name()))?;
        Ok(self.editor(acc))
    }

    fn is_applicable_erased(&self, acc: &(dyn Any + Send + Sync)) -> Result<bool> {
        let acc = acc
            .downcast_ref::<R::Accumulator>()
            .ok_or_else(|| accumulator_mismatch(self.name()))?;
        Ok(self.is_applicable(acc))
    }
}

/// Validation of a recipe and all of its descendants
pub fn validate_all(recipe: &dyn Recipe) -> Validated {
    recipe
        .recipe_list()
        .iter()
        .fold(recipe.validate(), |acc, child| acc.and(validate_all(child.as_ref())))
}

/// Whether any recipe in the tree asks for another pass
pub fn causes_another_cycle(recipe: &dyn Recipe) -> bool {
    recipe.causes_another_cycle()
        || recipe
            .recipe_list()
            .iter()
            .any(|child| causes_another_cycle(child.as_ref()))
}

/// Number of recipes in the tree rooted at `recipe`, itself included
pub fn subtree_len(recipe: &dyn Recipe) -> usize {
    1 + recipe
        .recipe_list()
        .iter()
        .map(|child| subtree_len(child.as_ref()))
        .sum::<usize>()
}

/// Recipes of the tree in pre-order
pub fn flatten(recipe: &dyn Recipe) -> Vec<&dyn Recipe> {
    let mut out = vec![recipe];
    for child in recipe.recipe_list() {
        out.extend(flatten(child.as_ref()));
    }
    out
}
