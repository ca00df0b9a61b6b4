//! Replace matching method invocations with a templated expression

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

use recast_core::error::RecastError;
use recast_core::recipe::{NoopVisitor, Precondition, Recipe, UsesMethod, Validated};
use recast_core::result::Result;
use recast_core::template::{IndentStyle, JavaTemplate, TemplateArg, TemplateCache};
use recast_core::tree::{Cursor, J, MethodInvocation};
use recast_core::visitor::{JavaVisitor, walk_method_invocation};
use recast_core::{ExecutionContext, MethodMatcher};

pub const REPLACE_INVOCATION_WITH_TEMPLATE: &str = "recast.java.ReplaceInvocationWithTemplate";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceInvocationOptions {
    pub method_pattern: Option<String>,
    /// Replacement snippet; `#{any()}` placeholders bind the call's receiver and arguments
    pub template: Option<String>,
    /// Types the snippet needs imported
    #[serde(default)]
    pub imports: Vec<String>,
}

/// Rewrites each invocation a pattern matches into a template expression.
///
/// The template's tree placeholders bind, in order, the call's arguments. A
/// template with one more placeholder than the call has arguments binds the
/// receiver first.
pub struct ReplaceInvocationWithTemplate {
    options: ReplaceInvocationOptions,
    matcher: std::result::Result<UsesMethod, String>,
    method: Option<MethodMatcher>,
    template: std::result::Result<JavaTemplate, String>,
}

impl ReplaceInvocationWithTemplate {
    pub fn new(method_pattern: impl Into<String>, template: impl Into<String>) -> Self {
        Self::from_options(ReplaceInvocationOptions {
            method_pattern: Some(method_pattern.into()),
            template: Some(template.into()),
            imports: Vec::new(),
        })
    }

    pub fn from_options(options: ReplaceInvocationOptions) -> Self {
        Self::with_template_settings(options, TemplateCache::global(), None)
    }

    /// Build with an explicit scaffold cache and indentation for inserted code
    pub fn with_template_settings(
        options: ReplaceInvocationOptions,
        cache: Arc<TemplateCache>,
        indent: Option<IndentStyle>,
    ) -> Self {
        let (matcher, method) = match options.method_pattern.as_deref() {
            Some(pattern) => match (UsesMethod::new(pattern), MethodMatcher::new(pattern)) {
                (Ok(uses), Ok(method)) => (Ok(uses), Some(method)),
                (Err(e), _) | (_, Err(e)) => (Err(e.to_string()), None),
            },
            None => (Err("is required".to_string()), None),
        };
        let template = match options.template.as_deref() {
            Some(code) => {
                let mut builder = recast_java::template(code)
                    .imports(options.imports.iter().cloned())
                    .cache(cache);
                if let Some(indent) = indent {
                    builder = builder.indent(indent);
                }
                builder.build().map_err(|e| e.to_string())
            }
            None => Err("is required".to_string()),
        };
        ReplaceInvocationWithTemplate {
            options,
            matcher,
            method,
            template,
        }
    }

    pub fn from_json(options: &serde_json::Value) -> Result<Self> {
        let options = serde_json::from_value(options.clone()).map_err(|e| {
            RecastError::config_error(format!("{REPLACE_INVOCATION_WITH_TEMPLATE} options: {e}"))
        })?;
        Ok(Self::from_options(options))
    }
}

impl Recipe for ReplaceInvocationWithTemplate {
    fn name(&self) -> &str {
        REPLACE_INVOCATION_WITH_TEMPLATE
    }

    fn display_name(&self) -> &str {
        "Replace method invocation with template"
    }

    fn description(&self) -> &str {
        "Replace every invocation of a method with an expression built from a template."
    }

    fn tags(&self) -> Vec<String> {
        vec!["java".to_string()]
    }

    fn options(&self) -> serde_json::Value {
        serde_json::to_value(&self.options).unwrap_or_default()
    }

    fn validate(&self) -> Validated {
        let failure = |property: &str, value: &Option<String>, message: &str| match value {
            Some(value) if message != "is required" => {
                Validated::invalid(property, Some(value.clone()), message)
            }
            _ => Validated::required(property, value.as_deref()),
        };
        let pattern = match &self.matcher {
            Ok(_) => Validated::valid("methodPattern"),
            Err(message) => failure("methodPattern", &self.options.method_pattern, message),
        };
        let template = match &self.template {
            Ok(_) => Validated::valid("template"),
            Err(message) => failure("template", &self.options.template, message),
        };
        pattern.and(template)
    }

    fn precondition(&self) -> Option<&dyn Precondition> {
        self.matcher.as_ref().ok().map(|m| m as &dyn Precondition)
    }

    fn visitor(&self) -> Box<dyn JavaVisitor<ExecutionContext> + '_> {
        match (&self.method, &self.template) {
            (Some(matcher), Ok(template)) => Box::new(ReplaceInvocationVisitor { matcher, template }),
            _ => Box::new(NoopVisitor),
        }
    }
}

struct ReplaceInvocationVisitor<'a> {
    matcher: &'a MethodMatcher,
    template: &'a JavaTemplate,
}

impl ReplaceInvocationVisitor<'_> {
    fn arguments(&self, method: &MethodInvocation) -> Result<Vec<TemplateArg>> {
        let expected = self.template.parameter_count();
        let arguments: Vec<TemplateArg> = method.arguments().map(TemplateArg::from).collect();
        if expected == 0 {
            return Ok(Vec::new());
        }
        if expected == arguments.len() {
            return Ok(arguments);
        }
        match &method.select {
            Some(select) if expected == arguments.len() + 1 => {
                let mut bound = vec![TemplateArg::from(&select.element)];
                bound.extend(arguments);
                Ok(bound)
            }
            _ => Err(RecastError::TemplateParameterCount {
                code: self.template.code().to_string(),
                expected,
                actual: arguments.len(),
            }),
        }
    }
}

impl JavaVisitor<ExecutionContext> for ReplaceInvocationVisitor<'_> {
    fn visit_method_invocation(
        &mut self,
        method: &Arc<MethodInvocation>,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Result<J> {
        let original = J::MethodInvocation(method.clone());
        if !self.matcher.matches(&original) {
            return walk_method_invocation(self, method, cursor, ctx).map(J::from);
        }

        let walked = walk_method_invocation(self, method, cursor, ctx)?;
        let args = self.arguments(&walked)?;
        let m = J::MethodInvocation(walked);
        let root = Cursor::root();
        let parent = cursor.parent().unwrap_or(&root);
        trace!(call = %original.print_trimmed(), "replacing invocation");
        let replaced = self
            .template
            .apply_within(&m, parent, m.coordinates().replace(), &args)?;
        self.template.add_imports(ctx);
        Ok(replaced)
    }
}
