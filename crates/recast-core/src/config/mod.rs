//! Configuration for recipe runs
//!
//! Settings live in one of the following files, searched upward from the
//! working directory:
//! - `.recastrc.toml`
//! - `recast.yaml` / `recast.yml`
//! - `recast.json`
//!
//! ## Example Configuration (recast.yaml)
//!
//! ```yaml
//! scheduler:
//!   maxCycles: 5
//!   parallel: true
//!   deadlineMs: 30000
//!
//! template:
//!   cacheEnabled: true
//!   indent: "4"
//!
//! recipes:
//!   active:
//!     - recast.ChangeMethodName
//!   options:
//!     recast.ChangeMethodName:
//!       methodPattern: "A foo(..)"
//!       newMethodName: bar
//! ```

mod loader;
mod recast_config;

pub use loader::ConfigLoader;
pub use recast_config::{
    RecastConfig, RecipesConfiguration, SchedulerConfiguration, TemplateConfiguration,
};
