use std::fmt;
use std::sync::Arc;

use super::Recipe;
use crate::error::RecastError;
use crate::execution::ExecutionContext;
use crate::matcher::{MethodMatcher, TypeMatcher};
use crate::result::Result;
use crate::tree::{CompilationUnit, Cursor, J};
use crate::visitor::{JavaVisitor, find_first};

/// Per-unit gate deciding whether a recipe edits a compilation unit
pub trait Precondition: Send + Sync {
    fn description(&self) -> String;

    fn check(&self, cu: &Arc<CompilationUnit>, ctx: &mut ExecutionContext) -> Result<bool>;
}

impl fmt::Debug for dyn Precondition + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Source path matches a glob such as `**/*Test.java`
#[derive(Debug, Clone)]
pub struct HasSourcePath {
    pattern: glob::Pattern,
}

impl HasSourcePath {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = glob::Pattern::new(pattern).map_err(|e| RecastError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(HasSourcePath { pattern })
    }
}

impl Precondition for HasSourcePath {
    fn description(&self) -> String {
        format!("HasSourcePath({})", self.pattern.as_str())
    }

    fn check(&self, cu: &Arc<CompilationUnit>, _ctx: &mut ExecutionContext) -> Result<bool> {
        let options = glob::MatchOptions {
            require_literal_separator: true,
            ..Default::default()
        };
        Ok(self.pattern.matches_path_with(cu.source_path(), options)
            || self
                .pattern
                .matches_path_with(std::path::Path::new(&format!("/{}", cu.source_path().display())), options))
    }
}

/// Unit contains an invocation, constructor call or static import matching a method pattern
#[derive(Debug, Clone)]
pub struct UsesMethod {
    matcher: MethodMatcher,
}

impl UsesMethod {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(UsesMethod {
            matcher: MethodMatcher::new(pattern)?,
        })
    }
}

impl Precondition for UsesMethod {
    fn description(&self) -> String {
        format!("UsesMethod({})", self.matcher.pattern())
    }

    fn check(&self, cu: &Arc<CompilationUnit>, _ctx: &mut ExecutionContext) -> Result<bool> {
        if cu
            .imports()
            .any(|import| self.matcher.matches_static_import(import))
        {
            return Ok(true);
        }
        let hit = find_first(&J::from(cu.clone()), |node, _| match node {
            J::MethodInvocation(_) | J::NewClass(_) if self.matcher.matches(node) => Some(()),
            _ => None,
        })?;
        Ok(hit.is_some())
    }
}

/// Unit imports or references a type matching a type pattern
#[derive(Debug, Clone)]
pub struct UsesType {
    matcher: TypeMatcher,
}

impl UsesType {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(UsesType {
            matcher: TypeMatcher::new(pattern)?,
        })
    }
}

impl Precondition for UsesType {
    fn description(&self) -> String {
        format!("UsesType({})", self.matcher.pattern())
    }

    fn check(&self, cu: &Arc<CompilationUnit>, _ctx: &mut ExecutionContext) -> Result<bool> {
        if cu.imports().any(|import| {
            !import.is_static() && !import.is_wildcard() && self.matcher.matches_name(&import.type_name())
        }) {
            return Ok(true);
        }
        let hit = find_first(&J::from(cu.clone()), |node, _| {
            let referenced = match node {
                J::MethodInvocation(mi) => mi
                    .method_type
                    .as_ref()
                    .is_some_and(|m| self.matcher.matches_name(&m.declaring_type.fully_qualified_name)),
                J::ClassDeclaration(_) | J::MethodDeclaration(_) => false,
                other => other.java_type().is_some_and(|ty| self.matcher.matches(&ty)),
            };
            referenced.then_some(())
        })?;
        Ok(hit.is_some())
    }
}

pub struct Not(pub Box<dyn Precondition>);

impl Precondition for Not {
    fn description(&self) -> String {
        format!("Not({})", self.0.description())
    }

    fn check(&self, cu: &Arc<CompilationUnit>, ctx: &mut ExecutionContext) -> Result<bool> {
        Ok(!self.0.check(cu, ctx)?)
    }
}

pub struct All(pub Vec<Box<dyn Precondition>>);

impl Precondition for All {
    fn description(&self) -> String {
        let parts: Vec<String> = self.0.iter().map(|p| p.description()).collect();
        format!("All({})", parts.join(", "))
    }

    fn check(&self, cu: &Arc<CompilationUnit>, ctx: &mut ExecutionContext) -> Result<bool> {
        for precondition in &self.0 {
            if !precondition.check(cu, ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

pub struct AnyOf(pub Vec<Box<dyn Precondition>>);

impl Precondition for AnyOf {
    fn description(&self) -> String {
        let parts: Vec<String> = self.0.iter().map(|p| p.description()).collect();
        format!("Any({})", parts.join(", "))
    }

    fn check(&self, cu: &Arc<CompilationUnit>, ctx: &mut ExecutionContext) -> Result<bool> {
        for precondition in &self.0 {
            if precondition.check(cu, ctx)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Holds when running a recipe's visitor on the unit would change it.
///
/// Search recipes make good applicability tests: they only add markers, so a
/// changed tree means "found".
pub struct RecipeApplies(pub Arc<dyn Recipe>);

impl Precondition for RecipeApplies {
    fn description(&self) -> String {
        self.0.name().to_string()
    }

    fn check(&self, cu: &Arc<CompilationUnit>, ctx: &mut ExecutionContext) -> Result<bool> {
        let tree = J::from(cu.clone());
        let mut unit_ctx = ctx.for_unit(cu.source_path(), self.0.name());
        let mut visitor = self.0.visitor();
        let after = visitor.visit(&tree, &Cursor::root(), &mut unit_ctx)?;
        Ok(!after.ptr_eq(&tree))
    }
}

/// Constructors for the built-in preconditions
pub struct Preconditions;

impl Preconditions {
    /// Wrap `visitor` so it only runs on units for which `precondition` holds
    pub fn check<'a>(
        precondition: impl Precondition + 'a,
        visitor: Box<dyn JavaVisitor<ExecutionContext> + 'a>,
    ) -> Box<dyn JavaVisitor<ExecutionContext> + 'a> {
        Box::new(Checked {
            precondition: Box::new(precondition),
            visitor,
        })
    }

    pub fn has_source_path(pattern: &str) -> Result<HasSourcePath> {
        HasSourcePath::new(pattern)
    }

    pub fn uses_method(pattern: &str) -> Result<UsesMethod> {
        UsesMethod::new(pattern)
    }

    pub fn uses_type(pattern: &str) -> Result<UsesType> {
        UsesType::new(pattern)
    }

    pub fn not(precondition: impl Precondition + 'static) -> Not {
        Not(Box::new(precondition))
    }

    pub fn all(preconditions: Vec<Box<dyn Precondition>>) -> All {
        All(preconditions)
    }

    pub fn any(preconditions: Vec<Box<dyn Precondition>>) -> AnyOf {
        AnyOf(preconditions)
    }
}

struct Checked<'a> {
    precondition: Box<dyn Precondition + 'a>,
    visitor: Box<dyn JavaVisitor<ExecutionContext> + 'a>,
}

impl JavaVisitor<ExecutionContext> for Checked<'_> {
    fn visit(&mut self, tree: &J, parent: &Cursor<'_>, ctx: &mut ExecutionContext) -> Result<J> {
        if let J::CompilationUnit(cu) = tree
            && parent.value().is_none()
            && !self.precondition.check(cu, ctx)?
        {
            return Ok(tree.clone());
        }
        self.visitor.visit(tree, parent, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Markers, Space, TreeId};
    use std::path::PathBuf;

    fn unit(path: &str) -> Arc<CompilationUnit> {
        Arc::new(CompilationUnit {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            source_path: PathBuf::from(path),
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
            eof: Space::EMPTY,
        })
    }

    #[test]
    fn test_has_source_path() {
        let mut ctx = ExecutionContext::new();
        let tests = HasSourcePath::new("**/*Test.java").unwrap();
        assert!(tests.check(&unit("src/test/java/FooTest.java"), &mut ctx).unwrap());
        assert!(tests.check(&unit("FooTest.java"), &mut ctx).unwrap());
        assert!(!tests.check(&unit("src/main/java/Foo.java"), &mut ctx).unwrap());
    }

    #[test]
    fn test_combinators() {
        let mut ctx = ExecutionContext::new();
        let cu = unit("src/A.java");
        let in_src = || Box::new(HasSourcePath::new("src/*.java").unwrap()) as Box<dyn Precondition>;
        let in_test = || Box::new(HasSourcePath::new("test/*.java").unwrap()) as Box<dyn Precondition>;

        assert!(Preconditions::any(vec![in_test(), in_src()]).check(&cu, &mut ctx).unwrap());
        assert!(!Preconditions::all(vec![in_test(), in_src()]).check(&cu, &mut ctx).unwrap());
        assert!(Not(in_test()).check(&cu, &mut ctx).unwrap());
        assert_eq!(
            Preconditions::all(vec![in_src()]).description(),
            "All(HasSourcePath(src/*.java))"
        );
    }

    #[test]
    fn test_invalid_glob() {
        assert!(matches!(
            HasSourcePath::new("src/[.java"),
            Err(RecastError::InvalidPattern { .. })
        ));
    }
}
