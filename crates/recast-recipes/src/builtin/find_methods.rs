//! Search recipe flagging method calls and declarations

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use recast_core::error::RecastError;
use recast_core::recipe::{NoopVisitor, Recipe, Validated};
use recast_core::result::Result;
use recast_core::tree::{Cursor, J, MethodDeclaration, MethodInvocation, NewClass};
use recast_core::visitor::{
    JavaIsoVisitor, JavaVisitor, SearchResult, walk_method_declaration, walk_method_invocation, walk_new_class,
};
use recast_core::{ExecutionContext, MethodMatcher};

pub const FIND_METHODS: &str = "recast.java.search.FindMethods";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindMethodsOptions {
    pub method_pattern: Option<String>,
    #[serde(default)]
    pub match_overrides: bool,
    /// Also flag the matching declarations
    #[serde(default)]
    pub include_declarations: bool,
}

#[derive(Debug, Clone)]
pub struct FindMethods {
    options: FindMethodsOptions,
    matcher: std::result::Result<MethodMatcher, String>,
}

impl FindMethods {
    pub fn new(method_pattern: impl Into<String>) -> Self {
        Self::from_options(FindMethodsOptions {
            method_pattern: Some(method_pattern.into()),
            ..Default::default()
        })
    }

    pub fn from_options(options: FindMethodsOptions) -> Self {
        let matcher = match options.method_pattern.as_deref() {
            Some(pattern) => MethodMatcher::with_overrides(pattern, options.match_overrides)
                .map_err(|e| e.to_string()),
            None => Err("is required".to_string()),
        };
        FindMethods { options, matcher }
    }

    pub fn from_json(options: &serde_json::Value) -> Result<Self> {
        let options = serde_json::from_value(options.clone())
            .map_err(|e| RecastError::config_error(format!("{FIND_METHODS} options: {e}")))?;
        Ok(Self::from_options(options))
    }

    pub fn including_declarations(mut self) -> Self {
        self.options.include_declarations = true;
        self
    }
}

impl Recipe for FindMethods {
    fn name(&self) -> &str {
        FIND_METHODS
    }

    fn display_name(&self) -> &str {
        "Find method usages"
    }

    fn description(&self) -> &str {
        "Find method invocations and constructor calls matching a method pattern."
    }

    fn tags(&self) -> Vec<String> {
        vec!["java".to_string(), "search".to_string()]
    }

    fn estimated_effort_per_occurrence(&self) -> Option<std::time::Duration> {
        None
    }

    fn options(&self) -> serde_json::Value {
        serde_json::to_value(&self.options).unwrap_or_default()
    }

    fn validate(&self) -> Validated {
        match (&self.options.method_pattern, &self.matcher) {
            (Some(pattern), Err(message)) => {
                Validated::invalid("methodPattern", Some(pattern.clone()), message.clone())
            }
            _ => Validated::required("methodPattern", self.options.method_pattern.as_deref()),
        }
    }

    fn visitor(&self) -> Box<dyn JavaVisitor<ExecutionContext> + '_> {
        match &self.matcher {
            Ok(matcher) => Box::new(FindMethodsVisitor {
                matcher,
                include_declarations: self.options.include_declarations,
            }),
            Err(_) => Box::new(NoopVisitor),
        }
    }
}

struct FindMethodsVisitor<'a> {
    matcher: &'a MethodMatcher,
    include_declarations: bool,
}

impl JavaIsoVisitor<ExecutionContext> for FindMethodsVisitor<'_> {
    fn visit_method_invocation(
        &mut self,
        method: &Arc<MethodInvocation>,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Result<Arc<MethodInvocation>> {
        let m = walk_method_invocation(self, method, cursor, ctx)?;
        if self.matcher.matches(&J::MethodInvocation(method.clone())) {
            return Ok(SearchResult::found(&m, None));
        }
        Ok(m)
    }

    fn visit_new_class(
        &mut self,
        new_class: &Arc<NewClass>,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Result<Arc<NewClass>> {
        let n = walk_new_class(self, new_class, cursor, ctx)?;
        if self.matcher.matches(&J::NewClass(new_class.clone())) {
            return Ok(SearchResult::found(&n, None));
        }
        Ok(n)
    }

    fn visit_method_declaration(
        &mut self,
        method: &Arc<MethodDeclaration>,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Result<Arc<MethodDeclaration>> {
        let m = walk_method_declaration(self, method, cursor, ctx)?;
        if self.include_declarations && self.matcher.matches_declaration(method, cursor) {
            return Ok(SearchResult::found(&m, Some("declaration")));
        }
        Ok(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(FindMethods::new("java.util.List add(..)").validate().is_valid());
        assert!(!FindMethods::from_options(FindMethodsOptions::default()).validate().is_valid());
        assert!(!FindMethods::new("java.util.List").validate().is_valid());
    }

    #[test]
    fn test_options_round_trip_through_json() {
        let recipe = FindMethods::from_json(&serde_json::json!({
            "methodPattern": "java.util.List add(..)",
            "includeDeclarations": true
        }))
        .unwrap();
        assert_eq!(
            recipe.options(),
            serde_json::json!({
                "methodPattern": "java.util.List add(..)",
                "matchOverrides": false,
                "includeDeclarations": true
            })
        );
    }
}
