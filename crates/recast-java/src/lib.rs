//! Recast Java front end
//!
//! Lossless lexing and parsing of a Java subset into the Recast tree, plus
//! type attribution against a stub JDK classpath and any extra dependency
//! sources. [`JavaParser`] is also the [`TemplateParser`] the template engine
//! uses to parse snippet scaffolds.

pub mod attribution;
pub mod classpath;
mod jdk;
pub mod lexer;
pub mod parser;

pub use attribution::attribute;
pub use classpath::{ClassInfo, NameScope, TypeTable};
pub use parser::{ParseMode, parse_compilation_unit};

use once_cell::sync::Lazy;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use recast_core::error::RecastError;
use recast_core::result::Result;
use recast_core::template::{JavaTemplate, JavaTemplateBuilder, TemplateParser};
use recast_core::tree::CompilationUnit;

const TEMPLATE_PATH: &str = "__template__.java";

static DEFAULT_PARSER: Lazy<Arc<JavaParser>> = Lazy::new(|| Arc::new(JavaParser::new()));

/// Parses and attributes Java sources
#[derive(Debug, Clone)]
pub struct JavaParser {
    mode: ParseMode,
    classpath: Arc<TypeTable>,
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`JavaParser`]
#[derive(Debug, Default)]
pub struct JavaParserBuilder {
    lenient: bool,
    dependencies: Vec<String>,
}

impl JavaParserBuilder {
    /// Keep statements and members outside the supported subset as verbatim source
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Source of a class the parsed code depends on, contributing only its signatures
    pub fn dependency(mut self, source: impl Into<String>) -> Self {
        self.dependencies.push(source.into());
        self
    }

    pub fn build(self) -> Result<JavaParser> {
        let jdk = TypeTable::jdk();
        let classpath = if self.dependencies.is_empty() {
            jdk
        } else {
            let units = self
                .dependencies
                .iter()
                .enumerate()
                .map(|(i, source)| {
                    let path = PathBuf::from(format!("__dependency{i}__.java"));
                    parse_compilation_unit(source, &path, ParseMode::Lenient)
                })
                .collect::<Result<Vec<_>>>()?;
            debug!(units = units.len(), "built dependency classpath");
            Arc::new(TypeTable::build(&units, Some(jdk)))
        };
        Ok(JavaParser {
            mode: if self.lenient { ParseMode::Lenient } else { ParseMode::Strict },
            classpath,
        })
    }
}

impl JavaParser {
    /// Strict parser with the stub JDK on the classpath
    pub fn new() -> Self {
        JavaParser {
            mode: ParseMode::Strict,
            classpath: TypeTable::jdk(),
        }
    }

    pub fn builder() -> JavaParserBuilder {
        JavaParserBuilder::default()
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    pub fn classpath(&self) -> &Arc<TypeTable> {
        &self.classpath
    }

    /// Parse and attribute one source; its path follows its package and first class
    pub fn parse(&self, source: &str) -> Result<Arc<CompilationUnit>> {
        self.parse_all(&[source])?
            .pop()
            .ok_or_else(|| RecastError::internal_error("no compilation unit parsed"))
    }

    pub fn parse_path(&self, path: impl AsRef<Path>, source: &str) -> Result<Arc<CompilationUnit>> {
        let cu = self.parse_unit(path.as_ref(), source)?;
        let table = TypeTable::build(std::slice::from_ref(&cu), Some(self.classpath.clone()));
        attribute(Arc::new(cu), &table)
    }

    /// Parse sources that may refer to each other, attributing them against one table
    pub fn parse_all<S: AsRef<str> + Sync>(&self, sources: &[S]) -> Result<Vec<Arc<CompilationUnit>>> {
        let units = sources
            .par_iter()
            .map(|source| {
                let source = source.as_ref();
                let mut cu = self.parse_unit(Path::new("Source.java"), source)?;
                cu.source_path = derived_path(&cu);
                Ok(cu)
            })
            .collect::<Result<Vec<_>>>()?;

        let table = TypeTable::build(&units, Some(self.classpath.clone()));
        debug!(units = units.len(), "attributing compilation units");
        units
            .into_par_iter()
            .map(|cu| attribute(Arc::new(cu), &table))
            .collect()
    }

    fn parse_unit(&self, path: &Path, source: &str) -> Result<CompilationUnit> {
        let cu = parse_compilation_unit(source, path, self.mode)?;
        let printed = cu.print();
        if printed != source {
            let offset = printed
                .bytes()
                .zip(source.bytes())
                .position(|(a, b)| a != b)
                .unwrap_or_else(|| printed.len().min(source.len()));
            return Err(RecastError::parse_error(
                path,
                "printed tree differs from the source",
                offset,
            ));
        }
        Ok(cu)
    }
}

impl TemplateParser for JavaParser {
    fn parse_template(&self, source: &str) -> Result<Arc<CompilationUnit>> {
        let cu = parse_compilation_unit(source, Path::new(TEMPLATE_PATH), ParseMode::Strict)?;
        let table = TypeTable::build(std::slice::from_ref(&cu), Some(self.classpath.clone()));
        attribute(Arc::new(cu), &table)
    }
}

/// Start a template whose snippets are parsed by the default Java parser
pub fn template(code: impl Into<String>) -> JavaTemplateBuilder {
    JavaTemplate::builder(code).parser(DEFAULT_PARSER.clone())
}

/// Shared default parser
pub fn default_parser() -> Arc<JavaParser> {
    DEFAULT_PARSER.clone()
}

/// `com/example/Foo.java` for a unit declaring `com.example.Foo` first
fn derived_path(cu: &CompilationUnit) -> PathBuf {
    let class = cu
        .classes()
        .next()
        .map_or("Unnamed", |c| c.simple_name());
    let mut path = PathBuf::new();
    if let Some(package) = cu.package_name() {
        path.extend(package.split('.'));
    }
    path.push(format!("{class}.java"));
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_follows_package_and_class() {
        let cu = JavaParser::new()
            .parse("package com.example;\n\npublic class Greeter {}\n")
            .unwrap();
        assert_eq!(cu.source_path(), Path::new("com/example/Greeter.java"));

        let cu = JavaParser::new().parse("class A {}").unwrap();
        assert_eq!(cu.source_path(), Path::new("A.java"));
    }

    #[test]
    fn test_strict_and_lenient_modes() {
        let source = "class A { void m() { x += 1; } }";
        assert!(JavaParser::new().parse(source).is_err());

        let lenient = JavaParser::builder().lenient(true).build().unwrap();
        let cu = lenient.parse(source).unwrap();
        assert_eq!(cu.print(), source);
    }

    #[test]
    fn test_dependencies_join_the_classpath() {
        let parser = JavaParser::builder()
            .dependency("package lib;\npublic class Util { public static int twice(int x) { return x; } }")
            .build()
            .unwrap();
        assert!(parser.classpath().contains("lib.Util"));
        assert!(parser.classpath().contains("java.lang.String"));
    }

    #[test]
    fn test_template_parser_attributes_scaffolds() {
        let cu = JavaParser::new()
            .parse_template("class __Template__ {\n    void __template__() {\n        Object __v__ = Integer.valueOf(1);\n    }\n}\n")
            .unwrap();
        assert_eq!(cu.source_path(), Path::new(TEMPLATE_PATH));
        assert!(cu.print().contains("Integer.valueOf(1)"));
    }
}
