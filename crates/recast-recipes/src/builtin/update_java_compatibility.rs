//! Update the Java source/target compatibility declared by a build script
//!
//! Build scripts are read as Java sources. Three shapes are recognised:
//! assignments to `sourceCompatibility` / `targetCompatibility`, calls to
//! `setSourceCompatibility` / `setTargetCompatibility`, and toolchain
//! declarations through `JavaLanguageVersion.of(int)`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use recast_core::error::RecastError;
use recast_core::execution::qualified_field_access;
use recast_core::recipe::{NoopVisitor, Recipe, Validated};
use recast_core::result::Result;
use recast_core::tree::{
    Assignment, Cursor, J, Literal, LiteralValue, MethodInvocation, Primitive,
};
use recast_core::visitor::{
    JavaIsoVisitor, JavaVisitor, SearchResult, walk_assignment, walk_method_invocation,
};
use recast_core::{ExecutionContext, MethodMatcher};

pub const UPDATE_JAVA_COMPATIBILITY: &str = "recast.gradle.UpdateJavaCompatibility";

const JAVA_LANGUAGE_VERSION_OF: &str = "org.gradle.jvm.toolchain.JavaLanguageVersion of(int)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityType {
    Source,
    Target,
}

impl CompatibilityType {
    fn property(self) -> &'static str {
        match self {
            CompatibilityType::Source => "sourceCompatibility",
            CompatibilityType::Target => "targetCompatibility",
        }
    }

    fn setter(self) -> &'static str {
        match self {
            CompatibilityType::Source => "setSourceCompatibility",
            CompatibilityType::Target => "setTargetCompatibility",
        }
    }

    fn of_property(name: &str) -> Option<Self> {
        [CompatibilityType::Source, CompatibilityType::Target]
            .into_iter()
            .find(|t| t.property() == name)
    }

    fn of_setter(name: &str) -> Option<Self> {
        [CompatibilityType::Source, CompatibilityType::Target]
            .into_iter()
            .find(|t| t.setter() == name)
    }
}

/// How a version is spelled: `JavaVersion.VERSION_11`, `11` or `"11"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DeclarationStyle {
    Enum,
    Number,
    String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJavaCompatibilityOptions {
    pub version: Option<i64>,
    /// Only touch this side; both when absent
    pub compatibility_type: Option<CompatibilityType>,
    /// Spelling of rewritten versions; the existing spelling when absent
    pub declaration_style: Option<DeclarationStyle>,
}

#[derive(Debug, Clone)]
pub struct UpdateJavaCompatibility {
    options: UpdateJavaCompatibilityOptions,
    language_version: MethodMatcher,
}

impl UpdateJavaCompatibility {
    pub fn new(version: i64) -> Result<Self> {
        Self::from_options(UpdateJavaCompatibilityOptions {
            version: Some(version),
            ..Default::default()
        })
    }

    pub fn from_options(options: UpdateJavaCompatibilityOptions) -> Result<Self> {
        Ok(UpdateJavaCompatibility {
            options,
            language_version: MethodMatcher::new(JAVA_LANGUAGE_VERSION_OF)?,
        })
    }

    pub fn from_json(options: &serde_json::Value) -> Result<Self> {
        let options = serde_json::from_value(options.clone()).map_err(|e| {
            RecastError::config_error(format!("{UPDATE_JAVA_COMPATIBILITY} options: {e}"))
        })?;
        Self::from_options(options)
    }

    pub fn compatibility_type(mut self, compatibility_type: CompatibilityType) -> Self {
        self.options.compatibility_type = Some(compatibility_type);
        self
    }

    pub fn declaration_style(mut self, style: DeclarationStyle) -> Self {
        self.options.declaration_style = Some(style);
        self
    }
}

impl Recipe for UpdateJavaCompatibility {
    fn name(&self) -> &str {
        UPDATE_JAVA_COMPATIBILITY
    }

    fn display_name(&self) -> &str {
        "Update Gradle project Java compatibility"
    }

    fn description(&self) -> &str {
        "Find and update the Java compatibility declared by a Gradle build."
    }

    fn tags(&self) -> Vec<String> {
        vec!["gradle".to_string(), "java".to_string()]
    }

    fn options(&self) -> serde_json::Value {
        serde_json::to_value(&self.options).unwrap_or_default()
    }

    fn validate(&self) -> Validated {
        match self.options.version {
            Some(version) => Validated::test("version", "Version must be > 0.", &version, |v| *v > 0),
            None => Validated::required("version", None),
        }
    }

    fn visitor(&self) -> Box<dyn JavaVisitor<ExecutionContext> + '_> {
        match self.options.version {
            Some(version) if version > 0 => Box::new(CompatibilityVisitor {
                version,
                compatibility_type: self.options.compatibility_type,
                style: self.options.declaration_style,
                language_version: &self.language_version,
            }),
            _ => Box::new(NoopVisitor),
        }
    }
}

struct CompatibilityVisitor<'a> {
    version: i64,
    compatibility_type: Option<CompatibilityType>,
    style: Option<DeclarationStyle>,
    language_version: &'a MethodMatcher,
}

impl CompatibilityVisitor<'_> {
    fn wanted(&self, found: CompatibilityType) -> bool {
        self.compatibility_type.is_none_or(|t| t == found)
    }

    fn unsuccessful(&self) -> String {
        format!(
            "Attempted to update to Java version to {}  but was unsuccessful, please update manually",
            self.version
        )
    }

    /// `expression` respelled for the target version, or `None` when it already fits
    fn rewrite(&self, expression: &J) -> Option<J> {
        let current = current_style(expression);
        if major_version(expression) == Some(self.version)
            && self.style.is_none_or(|s| Some(s) == current)
        {
            return None;
        }
        self.change_expression(expression, self.style.or(current)?)
    }

    fn change_expression(&self, expression: &J, style: DeclarationStyle) -> Option<J> {
        let (prefix, markers) = match expression {
            J::Literal(l) => (l.prefix.clone(), l.markers.clone()),
            J::FieldAccess(f) => (f.prefix.clone(), f.markers.clone()),
            _ => return None,
        };
        let legacy = self.version <= 8;
        let literal = |literal: Literal| {
            J::Literal(Arc::new(Literal {
                prefix: prefix.clone(),
                markers: markers.clone(),
                ..literal
            }))
        };
        let changed = match style {
            DeclarationStyle::String if legacy => literal(Literal::string(format!("1.{}", self.version))),
            DeclarationStyle::String => literal(Literal::string(self.version.to_string())),
            DeclarationStyle::Number if legacy => literal(Literal::build(
                LiteralValue::Double(1.0 + self.version as f64 / 10.0),
                format!("1.{}", self.version),
                Primitive::Double,
            )),
            DeclarationStyle::Number => literal(Literal::int(self.version)),
            DeclarationStyle::Enum => {
                let constant = if legacy {
                    format!("VERSION_1_{}", self.version)
                } else {
                    format!("VERSION_{}", self.version)
                };
                match expression {
                    J::FieldAccess(f) => {
                        let name = Arc::new(f.name.element.with_simple_name(constant));
                        J::FieldAccess(Arc::new(f.with_name(name)))
                    }
                    _ => {
                        let access = qualified_field_access(&format!("JavaVersion.{constant}"));
                        J::FieldAccess(Arc::new(access.with_prefix(prefix.clone()).with_markers(markers.clone())))
                    }
                }
            }
        };
        Some(changed)
    }

    fn replace_first_argument(method: &MethodInvocation, argument: J) -> MethodInvocation {
        let elements = method
            .arguments
            .elements
            .iter()
            .enumerate()
            .map(|(i, rp)| if i == 0 { rp.with_element(argument.clone()) } else { rp.clone() })
            .collect();
        method.with_arguments(method.arguments.with_elements(elements))
    }
}

impl JavaIsoVisitor<ExecutionContext> for CompatibilityVisitor<'_> {
    fn visit_assignment(
        &mut self,
        assignment: &Arc<Assignment>,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Result<Arc<Assignment>> {
        let a = walk_assignment(self, assignment, cursor, ctx)?;
        let property = match &a.variable {
            J::Identifier(i) => CompatibilityType::of_property(&i.simple_name),
            J::FieldAccess(f) => CompatibilityType::of_property(f.simple_name()),
            _ => None,
        };
        match property {
            Some(found) if self.wanted(found) => match self.rewrite(&a.assignment.element) {
                Some(value) => {
                    debug!(property = found.property(), version = self.version, "updating compatibility");
                    Ok(Arc::new(a.with_value(value)))
                }
                None => Ok(a),
            },
            _ => Ok(a),
        }
    }

    fn visit_method_invocation(
        &mut self,
        method: &Arc<MethodInvocation>,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Result<Arc<MethodInvocation>> {
        let m = walk_method_invocation(self, method, cursor, ctx)?;
        let arguments: Vec<J> = m.arguments().cloned().collect();

        if self.language_version.matches(&J::MethodInvocation(method.clone())) {
            return Ok(match arguments.as_slice() {
                [J::Literal(l)] => match l.value {
                    LiteralValue::Int(n) if n == self.version => m,
                    LiteralValue::Int(_) => {
                        let version = J::Literal(Arc::new(Literal {
                            prefix: l.prefix.clone(),
                            markers: l.markers.clone(),
                            ..Literal::int(self.version)
                        }));
                        Arc::new(Self::replace_first_argument(&m, version))
                    }
                    _ => SearchResult::found(&m, Some(&self.unsuccessful())),
                },
                _ => SearchResult::found(&m, Some(&self.unsuccessful())),
            });
        }

        let Some(found) = CompatibilityType::of_setter(m.simple_name()) else {
            return Ok(m);
        };
        if !self.wanted(found) {
            return Ok(m);
        }
        match arguments.as_slice() {
            [argument @ (J::Literal(_) | J::FieldAccess(_))] => match self.rewrite(argument) {
                Some(changed) => Ok(Arc::new(Self::replace_first_argument(&m, changed))),
                None => Ok(m),
            },
            _ => Ok(SearchResult::found(&m, Some(&self.unsuccessful()))),
        }
    }
}

fn current_style(expression: &J) -> Option<DeclarationStyle> {
    match expression {
        J::Literal(l) => match l.ty {
            Primitive::String => Some(DeclarationStyle::String),
            Primitive::Int | Primitive::Double => Some(DeclarationStyle::Number),
            _ => None,
        },
        J::FieldAccess(_) => Some(DeclarationStyle::Enum),
        _ => None,
    }
}

fn major_version(expression: &J) -> Option<i64> {
    match expression {
        J::Literal(l) => match &l.value {
            LiteralValue::Int(n) => Some(*n),
            LiteralValue::String(s) => parse_major(s),
            LiteralValue::Double(_) => parse_major(&l.value_source),
            _ => None,
        },
        J::FieldAccess(f) => parse_major(f.simple_name()),
        _ => None,
    }
}

/// `1.8`, `"1.8"`, `VERSION_1_8` and `8` all name Java 8
fn parse_major(version: &str) -> Option<i64> {
    let version = version.trim_matches(|c| c == '"' || c == '\'');
    let major = if let Some((_, rest)) = version.split_once('_') {
        rest.strip_prefix("1_").unwrap_or(rest)
    } else if let Some((_, rest)) = version.split_once('.') {
        rest
    } else {
        version
    };
    major.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_major() {
        assert_eq!(parse_major("1.8"), Some(8));
        assert_eq!(parse_major("\"11\""), Some(11));
        assert_eq!(parse_major("VERSION_1_8"), Some(8));
        assert_eq!(parse_major("VERSION_17"), Some(17));
        assert_eq!(parse_major("latest"), None);
    }

    #[test]
    fn test_version_must_be_positive() {
        let zero = UpdateJavaCompatibility::new(0).unwrap().validate();
        let messages: Vec<String> = zero.failures().filter_map(|f| f.message.clone()).collect();
        assert_eq!(messages, vec!["Version must be > 0."]);

        let missing = UpdateJavaCompatibility::from_options(UpdateJavaCompatibilityOptions::default()).unwrap();
        assert!(!missing.validate().is_valid());
        assert!(UpdateJavaCompatibility::new(17).unwrap().validate().is_valid());
    }

    #[test]
    fn test_options_use_lowercase_types() {
        let recipe = UpdateJavaCompatibility::from_json(&serde_json::json!({
            "version": 11,
            "compatibilityType": "source",
            "declarationStyle": "Enum"
        }))
        .unwrap();
        assert_eq!(recipe.options()["compatibilityType"], serde_json::json!("source"));
        assert!(UpdateJavaCompatibility::from_json(&serde_json::json!({ "compatibilityType": "both" })).is_err());
    }
}
