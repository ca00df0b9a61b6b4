//! Configuration types for recast

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::RecastError;
use crate::result::Result;
use crate::scheduler::{DEFAULT_MAX_CYCLES, SchedulerConfig};
use crate::template::{IndentStyle, TemplateCache};

/// Top-level configuration file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecastConfig {
    /// Scheduler settings
    #[schemars(description = "Recipe scheduler settings")]
    pub scheduler: Option<SchedulerConfiguration>,

    /// Template settings
    #[schemars(description = "Template engine settings")]
    pub template: Option<TemplateConfiguration>,

    /// Recipe selection
    #[schemars(description = "Recipes to activate and their options")]
    pub recipes: Option<RecipesConfiguration>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerConfiguration {
    #[schemars(description = "Maximum number of passes over the sources (default: 3)")]
    pub max_cycles: Option<usize>,

    #[schemars(description = "Visit compilation units in parallel (default: true)")]
    pub parallel: Option<bool>,

    #[schemars(description = "Wall-clock budget for a run in milliseconds")]
    pub deadline_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfiguration {
    #[schemars(description = "Share parsed template scaffolds across applications (default: true)")]
    pub cache_enabled: Option<bool>,

    /// `"tab"` or a number of spaces
    #[schemars(description = "Indentation unit for inserted code: \"tab\" or a number of spaces")]
    pub indent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipesConfiguration {
    #[schemars(description = "Names of the recipes to run, in order")]
    #[serde(default)]
    pub active: Vec<String>,

    #[schemars(description = "Options per recipe name")]
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
}

impl RecastConfig {
    /// Load a configuration file, choosing the format by extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| RecastError::io_error(path, e))?;
        let ext = path.extension().and_then(|e| e.to_str());
        match ext {
            Some("toml") => toml::from_str(&content).map_err(|e| RecastError::config_error(e.to_string())),
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&content).map_err(|e| RecastError::config_error(e.to_string()))
            }
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| RecastError::config_error(e.to_string()))
            }
            _ => Err(RecastError::config_error(format!(
                "Unsupported file extension for '{}' (expected .toml, .yaml, .yml, or .json)",
                path.display()
            ))),
        }
    }

    /// JSON schema of the configuration file
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(RecastConfig)).unwrap_or_default()
    }

    pub fn scheduler_config(&self) -> Result<SchedulerConfig> {
        let section = self.scheduler.clone().unwrap_or_default();
        let max_cycles = section.max_cycles.unwrap_or(DEFAULT_MAX_CYCLES);
        if max_cycles == 0 {
            return Err(RecastError::config_error("scheduler.maxCycles must be at least 1"));
        }
        Ok(SchedulerConfig {
            max_cycles,
            parallel: section.parallel.unwrap_or(true),
            deadline: section.deadline_ms.map(Duration::from_millis),
        })
    }

    /// Configured indentation, or `None` to detect it from each unit
    pub fn indent_style(&self) -> Result<Option<IndentStyle>> {
        let Some(setting) = self.template.as_ref().and_then(|t| t.indent.as_deref()) else {
            return Ok(None);
        };
        IndentStyle::from_setting(setting)
            .map(Some)
            .ok_or_else(|| RecastError::config_error(format!("invalid template.indent '{setting}'")))
    }

    pub fn template_cache(&self) -> Arc<TemplateCache> {
        let enabled = self
            .template
            .as_ref()
            .and_then(|t| t.cache_enabled)
            .unwrap_or(true);
        if enabled {
            TemplateCache::global()
        } else {
            Arc::new(TemplateCache::disabled())
        }
    }

    pub fn active_recipes(&self) -> &[String] {
        self.recipes.as_ref().map_or(&[], |r| r.active.as_slice())
    }

    pub fn recipe_options(&self, recipe: &str) -> Option<&serde_json::Value> {
        self.recipes.as_ref().and_then(|r| r.options.get(recipe))
    }
}
