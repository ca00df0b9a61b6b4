//! Recast core: lossless source trees and the machinery to rewrite them
//!
//! - [`tree`]: immutable, whitespace-exact syntax tree with identities and markers
//! - [`visitor`]: cursor-tracking visitors that rebuild only what they change
//! - [`matcher`]: type-aware method and type patterns
//! - [`template`]: tree fragments synthesized from source snippets
//! - [`recipe`] and [`scheduler`]: composable transformations run to a fixed point
//!
//! Language front ends (parsing, type attribution) live in separate crates
//! and plug in through [`template::TemplateParser`].

pub mod config;
pub mod error;
pub mod execution;
pub mod matcher;
pub mod recipe;
pub mod result;
pub mod scheduler;
pub mod template;
pub mod tree;
pub mod visitor;

pub use config::{ConfigLoader, RecastConfig};
pub use error::{ErrorKind, RecastError};
pub use execution::{AddImport, CancellationToken, ExecutionContext, RecordedError, SourceEdit};
pub use matcher::{MethodMatcher, TypeMatcher};
pub use recipe::{
    DeclarativeRecipe, Precondition, Preconditions, Recipe, RecipeDescriptor, RecipeRegistry,
    ScanningRecipe, Validated,
};
pub use result::{Result, ResultExt};
pub use scheduler::{
    DEFAULT_MAX_CYCLES, RecipeRun, RecipeScheduler, RunWarning, SchedulerConfig, SourceResult,
};
pub use template::{IndentStyle, JavaTemplate, TemplateArg, TemplateCache, TemplateParser};
pub use tree::{CompilationUnit, Coordinates, Cursor, J, JKind, JavaType, Marker, Markers, Space, TreeId};
pub use visitor::{JavaIsoVisitor, JavaVisitor};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("recast=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
