use indexmap::IndexMap;
use std::fmt;
use std::fmt::Write as _;

use crate::error::RecastError;
use crate::result::Result;
use crate::tree::{CompilationUnit, J, JavaType, RightPadded, VariableDeclarations};

pub(crate) const TEMPLATE_CLASS: &str = "__Template__";
pub(crate) const TEMPLATE_METHOD: &str = "__template__";
pub(crate) const SNIPPET_CLASS: &str = "__Snippet__";
pub(crate) const EXPRESSION_VARIABLE: &str = "__v__";

/// Syntactic position a snippet is parsed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Expression,
    Statement,
    Member,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Expression => "expression",
            Shape::Statement => "statement",
            Shape::Member => "member",
        })
    }
}

/// Names and types visible at an insertion point
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    pub package: Option<String>,
    /// Import statements without the trailing `;`
    pub imports: Vec<String>,
    pub type_parameters: Vec<String>,
    /// Variable name to declared type, inner scopes shadowing outer ones
    pub variables: IndexMap<String, String>,
}

fn declared_type(variable_type: Option<&JavaType>, type_expression: Option<&J>) -> String {
    match (variable_type, type_expression) {
        (Some(ty), _) if *ty != JavaType::Unknown => ty.to_source(),
        (_, Some(expr)) => expr.print_trimmed(),
        _ => "Object".to_string(),
    }
}

impl TemplateContext {
    /// Capture the context along `path`, which runs from the root down to the anchor
    pub fn capture(path: &[J]) -> Self {
        let mut context = TemplateContext::default();
        for (i, node) in path.iter().enumerate() {
            let next = path.get(i + 1);
            match node {
                J::CompilationUnit(cu) => {
                    context.package = cu.package_name();
                    context.imports = cu
                        .imports()
                        .map(|import| J::Import(import.clone()).print_trimmed())
                        .collect();
                }
                J::ClassDeclaration(class) => {
                    context.type_parameters.extend(class.type_parameter_names());
                    for member in class.body.statements() {
                        if let J::VariableDeclarations(fields) = member {
                            context.declare_all(fields);
                        }
                    }
                }
                J::MethodDeclaration(method) => {
                    if let Some(type_parameters) = &method.type_parameters {
                        context.type_parameters.extend(type_parameters.elements().filter_map(|t| match t {
                            J::Identifier(i) => Some(i.simple_name.clone()),
                            _ => None,
                        }));
                    }
                    for parameter in method.parameters() {
                        context.declare_all(parameter);
                    }
                }
                J::Lambda(lambda) => {
                    for parameter in &lambda.parameters.parameters {
                        match &parameter.element {
                            J::VariableDeclarations(v) => context.declare_all(v),
                            J::Identifier(ident) => {
                                context.declare(&ident.simple_name, declared_type(ident.ty.as_ref(), None))
                            }
                            _ => {}
                        }
                    }
                }
                J::Block(block) => {
                    let Some(next) = next else { continue };
                    for statement in block.statements() {
                        if statement.id() == next.id() {
                            break;
                        }
                        if let J::VariableDeclarations(locals) = statement {
                            context.declare_all(locals);
                        }
                    }
                }
                _ => {}
            }
        }
        context.type_parameters.dedup();
        context
    }

    fn declare(&mut self, name: &str, type_source: String) {
        self.variables.shift_remove(name);
        self.variables.insert(name.to_string(), type_source);
    }

    fn declare_all(&mut self, declarations: &VariableDeclarations) {
        for variable in declarations.variables() {
            let ty = declared_type(
                variable.variable_type.as_ref(),
                declarations.type_expression.as_ref(),
            );
            self.declare(variable.simple_name(), ty);
        }
    }

    /// Source of a compilation unit that embeds `snippet` at `shape`.
    ///
    /// `stand_ins` are `(name, type)` pairs declared next to the captured
    /// variables so that tree placeholders resolve during attribution.
    pub fn scaffold(
        &self,
        shape: Shape,
        snippet: &str,
        stand_ins: &[(String, String)],
        extra_imports: &[String],
    ) -> String {
        let mut source = String::new();
        if let Some(package) = &self.package {
            let _ = writeln!(source, "package {package};");
        }
        for import in &self.imports {
            let _ = writeln!(source, "{import};");
        }
        for import in extra_imports {
            if !self.imports.iter().any(|i| i.ends_with(&format!(" {import}"))) {
                let _ = writeln!(source, "import {import};");
            }
        }

        let type_parameters = if self.type_parameters.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.type_parameters.join(", "))
        };
        let _ = writeln!(source, "class {TEMPLATE_CLASS}{type_parameters} {{");
        for (name, ty) in self
            .variables
            .iter()
            .map(|(n, t)| (n.as_str(), t.as_str()))
            .chain(stand_ins.iter().map(|(n, t)| (n.as_str(), t.as_str())))
        {
            let _ = writeln!(source, "    {ty} {name};");
        }
        match shape {
            Shape::Expression => {
                let _ = writeln!(source, "    void {TEMPLATE_METHOD}() {{");
                let _ = writeln!(source, "        Object {EXPRESSION_VARIABLE} ={snippet};");
                let _ = writeln!(source, "    }}");
            }
            Shape::Statement => {
                let _ = writeln!(source, "    void {TEMPLATE_METHOD}() {{{snippet}");
                let _ = writeln!(source, "    }}");
            }
            Shape::Member => {
                let _ = writeln!(source, "    class {SNIPPET_CLASS} {{{snippet}");
                let _ = writeln!(source, "    }}");
            }
        }
        source.push_str("}\n");
        source
    }
}

fn malformed(shape: Shape, what: &str) -> RecastError {
    RecastError::internal_error(format!("{shape:?} scaffold is missing {what}"))
}

/// Trees the snippet produced inside a parsed scaffold
pub fn extract(cu: &CompilationUnit, shape: Shape) -> Result<Vec<RightPadded<J>>> {
    let class = cu
        .classes()
        .find(|c| c.simple_name() == TEMPLATE_CLASS)
        .ok_or_else(|| malformed(shape, "the template class"))?;

    let fragments = match shape {
        Shape::Expression | Shape::Statement => {
            let body = class
                .body
                .statements()
                .find_map(|member| match member {
                    J::MethodDeclaration(m) if m.simple_name() == TEMPLATE_METHOD => m.body.clone(),
                    _ => None,
                })
                .ok_or_else(|| malformed(shape, "the template method"))?;
            if shape == Shape::Statement {
                body.statements.clone()
            } else {
                if body.statements.len() != 1 {
                    return Err(malformed(shape, "a single expression"));
                }
                let initializer = match body.statements().next() {
                    Some(J::VariableDeclarations(v)) => v
                        .variables()
                        .find(|n| n.simple_name() == EXPRESSION_VARIABLE)
                        .and_then(|n| n.initializer.as_ref())
                        .map(|init| init.element.clone()),
                    _ => None,
                }
                .ok_or_else(|| malformed(shape, "the expression"))?;
                vec![RightPadded::build(initializer)]
            }
        }
        Shape::Member => class
            .body
            .statements()
            .find_map(|member| match member {
                J::ClassDeclaration(c) if c.simple_name() == SNIPPET_CLASS => Some(c.body.statements.clone()),
                _ => None,
            })
            .ok_or_else(|| malformed(shape, "the snippet class"))?,
    };

    if fragments.is_empty() {
        return Err(malformed(shape, "any tree"));
    }
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_scaffold() {
        let mut context = TemplateContext {
            package: Some("com.example".to_string()),
            imports: vec!["import java.util.List".to_string()],
            type_parameters: vec!["T".to_string()],
            variables: IndexMap::new(),
        };
        context.declare("names", "java.util.List<T>".to_string());

        let source = context.scaffold(
            Shape::Expression,
            " names.get(__p0__)",
            &[("__p0__".to_string(), "int".to_string())],
            &["java.util.List".to_string(), "java.util.Map".to_string()],
        );
        assert_eq!(
            source,
            "package com.example;\n\
             import java.util.List;\n\
             import java.util.Map;\n\
             class __Template__<T> {\n    \
                 java.util.List<T> names;\n    \
                 int __p0__;\n    \
                 void __template__() {\n        \
                     Object __v__ = names.get(__p0__);\n    \
                 }\n\
             }\n"
        );
    }

    #[test]
    fn test_member_scaffold() {
        let source = TemplateContext::default().scaffold(Shape::Member, "void foo() {}", &[], &[]);
        assert_eq!(
            source,
            "class __Template__ {\n    class __Snippet__ {void foo() {}\n    }\n}\n"
        );
    }

    #[test]
    fn test_inner_declarations_shadow_outer() {
        let mut context = TemplateContext::default();
        context.declare("x", "int".to_string());
        context.declare("y", "int".to_string());
        context.declare("x", "String".to_string());
        let declared: Vec<(&str, &str)> = context
            .variables
            .iter()
            .map(|(n, t)| (n.as_str(), t.as_str()))
            .collect();
        assert_eq!(declared, vec![("y", "int"), ("x", "String")]);
    }
}
