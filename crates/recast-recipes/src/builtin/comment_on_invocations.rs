//! Annotate matching method invocations with a line comment

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use recast_core::error::RecastError;
use recast_core::recipe::{NoopVisitor, Precondition, Recipe, UsesMethod, Validated};
use recast_core::result::Result;
use recast_core::tree::{Cursor, J, Marker, MethodInvocation};
use recast_core::visitor::{JavaIsoVisitor, JavaVisitor, walk_method_invocation};
use recast_core::{ExecutionContext, MethodMatcher};

pub const COMMENT_ON_METHOD_INVOCATIONS: &str = "recast.java.CommentOnMethodInvocations";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentOnMethodInvocationsOptions {
    pub method_pattern: Option<String>,
    /// Comment text, written after `//`
    pub comment: Option<String>,
}

/// Places a comment before each call a pattern matches.
///
/// Annotated calls carry a stamp of this recipe, so running it again over its
/// own output leaves the tree untouched.
pub struct CommentOnMethodInvocations {
    options: CommentOnMethodInvocationsOptions,
    matcher: std::result::Result<(UsesMethod, MethodMatcher), String>,
}

impl CommentOnMethodInvocations {
    pub fn new(method_pattern: impl Into<String>, comment: impl Into<String>) -> Self {
        Self::from_options(CommentOnMethodInvocationsOptions {
            method_pattern: Some(method_pattern.into()),
            comment: Some(comment.into()),
        })
    }

    pub fn from_options(options: CommentOnMethodInvocationsOptions) -> Self {
        let matcher = match options.method_pattern.as_deref() {
            Some(pattern) => UsesMethod::new(pattern)
                .and_then(|uses| Ok((uses, MethodMatcher::new(pattern)?)))
                .map_err(|e| e.to_string()),
            None => Err("is required".to_string()),
        };
        CommentOnMethodInvocations { options, matcher }
    }

    pub fn from_json(options: &serde_json::Value) -> Result<Self> {
        let options = serde_json::from_value(options.clone()).map_err(|e| {
            RecastError::config_error(format!("{COMMENT_ON_METHOD_INVOCATIONS} options: {e}"))
        })?;
        Ok(Self::from_options(options))
    }
}

impl Recipe for CommentOnMethodInvocations {
    fn name(&self) -> &str {
        COMMENT_ON_METHOD_INVOCATIONS
    }

    fn display_name(&self) -> &str {
        "Comment on method invocations"
    }

    fn description(&self) -> &str {
        "Add a line comment before every invocation matching a method pattern."
    }

    fn tags(&self) -> Vec<String> {
        vec!["java".to_string()]
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
        let comment = match self.options.comment.as_deref() {
            Some(comment) => {
                Validated::test("comment", "must be a single line", &comment, |c| !c.contains('\n'))
            }
            None => Validated::required("comment", None),
        };
        pattern.and(comment)
    }

    fn precondition(&self) -> Option<&dyn Precondition> {
        self.matcher.as_ref().ok().map(|(uses, _)| uses as &dyn Precondition)
    }

    fn visitor(&self) -> Box<dyn JavaVisitor<ExecutionContext> + '_> {
        match (&self.matcher, self.options.comment.as_deref()) {
            (Ok((_, matcher)), Some(comment)) => Box::new(CommentVisitor {
                matcher,
                comment,
                recipe: self.name(),
            }),
            _ => Box::new(NoopVisitor),
        }
    }
}

struct CommentVisitor<'a> {
    matcher: &'a MethodMatcher,
    comment: &'a str,
    recipe: &'a str,
}

impl JavaIsoVisitor<ExecutionContext> for CommentVisitor<'_> {
    fn visit_method_invocation(
        &mut self,
        method: &Arc<MethodInvocation>,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Result<Arc<MethodInvocation>> {
        let m = walk_method_invocation(self, method, cursor, ctx)?;
        if m.markers.is_stamped_by(self.recipe) || !self.matcher.matches(&J::MethodInvocation(method.clone())) {
            return Ok(m);
        }
        let prefix = m.prefix.with_line_comment(self.comment);
        let markers = m.markers.add(Marker::recipe_stamp(self.recipe));
        Ok(Arc::new(m.with_prefix(prefix).with_markers(markers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(CommentOnMethodInvocations::new("java.util.List add(..)", "check").validate().is_valid());

        let multiline = CommentOnMethodInvocations::new("java.util.List add(..)", "a\nb").validate();
        let failed: Vec<&str> = multiline.failures().map(|f| f.property.as_str()).collect();
        assert_eq!(failed, vec!["comment"]);

        let empty = CommentOnMethodInvocations::from_options(CommentOnMethodInvocationsOptions::default());
        assert_eq!(empty.validate().failures().count(), 2);
    }
}
