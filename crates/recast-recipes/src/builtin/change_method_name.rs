//! Rename a method at its call sites, declarations and static imports

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use recast_core::error::RecastError;
use recast_core::recipe::{NoopVisitor, Recipe, Validated};
use recast_core::result::Result;
use recast_core::tree::{Cursor, Identifier, Import, J, MethodDeclaration, MethodInvocation};
use recast_core::visitor::{JavaIsoVisitor, JavaVisitor, walk_method_declaration, walk_method_invocation};
use recast_core::{ExecutionContext, MethodMatcher};

pub const CHANGE_METHOD_NAME: &str = "recast.java.ChangeMethodName";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeMethodNameOptions {
    /// Pattern of the method to rename, e.g. `com.example.Foo bar(int)`
    pub method_pattern: Option<String>,
    pub new_method_name: Option<String>,
    /// Also rename overrides declared in subtypes of the pattern's owner
    #[serde(default)]
    pub match_overrides: bool,
}

#[derive(Debug, Clone)]
pub struct ChangeMethodName {
    options: ChangeMethodNameOptions,
    matcher: std::result::Result<MethodMatcher, String>,
}

impl ChangeMethodName {
    pub fn new(method_pattern: impl Into<String>, new_method_name: impl Into<String>) -> Self {
        Self::from_options(ChangeMethodNameOptions {
            method_pattern: Some(method_pattern.into()),
            new_method_name: Some(new_method_name.into()),
            match_overrides: false,
        })
    }

    pub fn from_options(options: ChangeMethodNameOptions) -> Self {
        let matcher = match options.method_pattern.as_deref() {
            Some(pattern) => MethodMatcher::with_overrides(pattern, options.match_overrides)
                .map_err(|e| e.to_string()),
            None => Err("is required".to_string()),
        };
        ChangeMethodName { options, matcher }
    }

    pub fn from_json(options: &serde_json::Value) -> Result<Self> {
        let options = serde_json::from_value(options.clone())
            .map_err(|e| RecastError::config_error(format!("{CHANGE_METHOD_NAME} options: {e}")))?;
        Ok(Self::from_options(options))
    }
}

impl Recipe for ChangeMethodName {
    fn name(&self) -> &str {
        CHANGE_METHOD_NAME
    }

    fn display_name(&self) -> &str {
        "Change method name"
    }

    fn description(&self) -> &str {
        "Rename a method declaration and every invocation and static import that refers to it."
    }

    fn tags(&self) -> Vec<String> {
        vec!["java".to_string(), "refactoring".to_string()]
    }

    fn options(&self) -> serde_json::Value {
        serde_json::to_value(&self.options).unwrap_or_default()
    }

    fn validate(&self) -> Validated {
        let pattern = match (&self.options.method_pattern, &self.matcher) {
            (Some(pattern), Err(message)) => {
                Validated::invalid("methodPattern", Some(pattern.clone()), message.clone())
            }
            _ => Validated::required("methodPattern", self.options.method_pattern.as_deref()),
        };
        pattern.and(Validated::required(
            "newMethodName",
            self.options.new_method_name.as_deref(),
        ))
    }

    fn visitor(&self) -> Box<dyn JavaVisitor<ExecutionContext> + '_> {
        match (&self.matcher, self.options.new_method_name.as_deref()) {
            (Ok(matcher), Some(new_name)) => Box::new(ChangeMethodNameVisitor { matcher, new_name }),
            _ => Box::new(NoopVisitor),
        }
    }
}

struct ChangeMethodNameVisitor<'a> {
    matcher: &'a MethodMatcher,
    new_name: &'a str,
}

impl ChangeMethodNameVisitor<'_> {
    fn renamed_identifier(&self, ident: &Arc<Identifier>) -> Arc<Identifier> {
        Arc::new(ident.with_simple_name(self.new_name))
    }
}

impl JavaIsoVisitor<ExecutionContext> for ChangeMethodNameVisitor<'_> {
    fn visit_method_declaration(
        &mut self,
        method: &Arc<MethodDeclaration>,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Result<Arc<MethodDeclaration>> {
        let m = walk_method_declaration(self, method, cursor, ctx)?;
        if method.simple_name() == self.new_name || !self.matcher.matches_declaration(method, cursor) {
            return Ok(m);
        }
        let method_type = m
            .method_type
            .as_ref()
            .map(|t| Arc::new(t.with_name(self.new_name)));
        Ok(Arc::new(
            m.with_name(self.renamed_identifier(&m.name))
                .with_method_type(method_type),
        ))
    }

    fn visit_method_invocation(
        &mut self,
        method: &Arc<MethodInvocation>,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Result<Arc<MethodInvocation>> {
        let m = walk_method_invocation(self, method, cursor, ctx)?;
        if method.simple_name() == self.new_name
            || !self.matcher.matches(&J::MethodInvocation(method.clone()))
        {
            return Ok(m);
        }
        let method_type = m
            .method_type
            .as_ref()
            .map(|t| Arc::new(t.with_name(self.new_name)));
        Ok(Arc::new(
            m.with_name(self.renamed_identifier(&m.name))
                .with_method_type(method_type),
        ))
    }

    /// `import static a.B.old;` becomes `import static a.B.new;`
    fn visit_import(
        &mut self,
        import: &Arc<Import>,
        _cursor: &Cursor<'_>,
        _ctx: &mut ExecutionContext,
    ) -> Result<Arc<Import>> {
        let rename = import
            .member_name()
            .is_some_and(|member| member != "*" && member != self.new_name)
            && self.matcher.matches_static_import(import);
        if !rename {
            return Ok(import.clone());
        }
        let name = self.renamed_identifier(&import.qualid.name.element);
        Ok(Arc::new(import.with_qualid(Arc::new(import.qualid.with_name(name)))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_requires_pattern_and_name() {
        let recipe = ChangeMethodName::from_options(ChangeMethodNameOptions::default());
        let validated = recipe.validate();
        let failed: Vec<&str> = validated.failures().map(|f| f.property.as_str()).collect();
        assert_eq!(failed, vec!["methodPattern", "newMethodName"]);

        assert!(ChangeMethodName::new("a.B c(..)", "d").validate().is_valid());
    }

    #[test]
    fn test_malformed_pattern_is_a_validation_failure() {
        let validated = ChangeMethodName::new("a.B c(", "d").validate();
        let failure = validated.failures().next().unwrap();
        assert_eq!(failure.property, "methodPattern");
        assert_eq!(failure.invalid_value.as_deref(), Some("a.B c("));
    }

    #[test]
    fn test_options_from_json() {
        let recipe = ChangeMethodName::from_json(&serde_json::json!({
            "methodPattern": "a.B c(..)",
            "newMethodName": "d",
            "matchOverrides": true
        }))
        .unwrap();
        assert!(recipe.validate().is_valid());
        assert_eq!(recipe.options()["matchOverrides"], serde_json::json!(true));

        let err = ChangeMethodName::from_json(&serde_json::json!({ "methodPattern": 3 })).unwrap_err();
        assert!(matches!(err, RecastError::ConfigError { .. }));
    }
}
