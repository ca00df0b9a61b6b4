//! Run-scoped state shared by recipes
//!
//! An [`ExecutionContext`] carries the message bag, recorded errors, the
//! current cycle and cancellation for one scheduler run. The scheduler derives
//! a unit-scoped context per source file and recipe; those share the run state
//! but keep their own queue of [`SourceEdit`]s, which is applied to the
//! compilation unit after the visitor pass finishes.

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::error::{ErrorKind, RecastError};
use crate::result::Result;
use crate::tree::{CompilationUnit, FieldAccess, Identifier, Import, J, LeftPadded, Markers, RightPadded, Space, TreeId};

/// Cooperative cancellation, checked between units and between passes
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        CancellationToken {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst) || self.deadline_elapsed()
    }

    pub fn deadline_elapsed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// An error recorded during a run without aborting it
#[derive(Debug, Clone, Serialize)]
pub struct RecordedError {
    pub recipe: Option<String>,
    pub source_path: Option<PathBuf>,
    pub kind: ErrorKind,
    pub message: String,
}

/// Deferred edit applied to a compilation unit after a visitor pass
pub trait SourceEdit: Send + Sync + fmt::Debug {
    fn apply(&self, cu: &Arc<CompilationUnit>, ctx: &mut ExecutionContext) -> Result<Arc<CompilationUnit>>;
}

#[derive(Debug)]
struct RunState {
    messages: DashMap<String, serde_json::Value>,
    errors: Mutex<Vec<RecordedError>>,
    cycle: AtomicUsize,
    cancellation: CancellationToken,
}

#[derive(Debug)]
pub struct ExecutionContext {
    run: Arc<RunState>,
    source_path: Option<PathBuf>,
    recipe: Option<String>,
    after_visit: Vec<Box<dyn SourceEdit>>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        ExecutionContext {
            run: Arc::new(RunState {
                messages: DashMap::new(),
                errors: Mutex::new(Vec::new()),
                cycle: AtomicUsize::new(0),
                cancellation,
            }),
            source_path: None,
            recipe: None,
            after_visit: Vec::new(),
        }
    }

    /// Context for one source unit and recipe, sharing this run's state
    pub fn for_unit(&self, source_path: &Path, recipe: &str) -> ExecutionContext {
        ExecutionContext {
            run: self.run.clone(),
            source_path: Some(source_path.to_path_buf()),
            recipe: Some(recipe.to_string()),
            after_visit: Vec::new(),
        }
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn current_recipe(&self) -> Option<&str> {
        self.recipe.as_deref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.run.cancellation
    }

    /// 1-based edit pass; 0 while validating or scanning
    pub fn cycle(&self) -> usize {
        self.run.cycle.load(Ordering::SeqCst)
    }

    pub(crate) fn set_cycle(&self, cycle: usize) {
        self.run.cycle.store(cycle, Ordering::SeqCst);
    }

    pub fn put_message(&self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.run.messages.insert(key.into(), value);
        Ok(())
    }

    pub fn message(&self, key: &str) -> Option<serde_json::Value> {
        self.run.messages.get(key).map(|v| v.value().clone())
    }

    pub fn get_message<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.message(key)
            .and_then(|v| serde_json::from_value(v).ok())
    }

    pub fn compute_message_if_absent(
        &self,
        key: &str,
        compute: impl FnOnce() -> serde_json::Value,
    ) -> serde_json::Value {
        self.run
            .messages
            .entry(key.to_string())
            .or_insert_with(compute)
            .value()
            .clone()
    }

    /// Record a non-fatal error against the current unit and recipe
    pub fn on_error(&self, error: &RecastError) {
        tracing::warn!(
            recipe = self.recipe.as_deref().unwrap_or("<none>"),
            path = ?self.source_path,
            "{}",
            error
        );
        let recorded = RecordedError {
            recipe: self.recipe.clone(),
            source_path: self.source_path.clone(),
            kind: error.kind(),
            message: error.to_string(),
        };
        match self.run.errors.lock() {
            Ok(mut errors) => errors.push(recorded),
            Err(poisoned) => poisoned.into_inner().push(recorded),
        }
    }

    pub fn errors(&self) -> Vec<RecordedError> {
        match self.run.errors.lock() {
            Ok(errors) => errors.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Queue an edit for the compilation unit currently being visited
    pub fn do_after_visit(&mut self, edit: impl SourceEdit + 'static) {
        self.after_visit.push(Box::new(edit));
    }

    pub fn add_import(&mut self, type_name: impl Into<String>) {
        self.do_after_visit(AddImport::new(type_name));
    }

    pub(crate) fn take_after_visits(&mut self) -> Vec<Box<dyn SourceEdit>> {
        std::mem::take(&mut self.after_visit)
    }

    /// Apply queued edits in order; edits queued while applying run too
    pub fn apply_after_visits(&mut self, mut cu: Arc<CompilationUnit>) -> Result<Arc<CompilationUnit>> {
        loop {
            let edits = self.take_after_visits();
            if edits.is_empty() {
                return Ok(cu);
            }
            for edit in edits {
                tracing::debug!(?edit, "applying queued source edit");
                cu = edit.apply(&cu, self)?;
            }
        }
    }
}

/// Adds `import <type_name>;` unless the type is already visible
#[derive(Debug, Clone)]
pub struct AddImport {
    type_name: String,
    member: Option<String>,
}

impl AddImport {
    pub fn new(type_name: impl Into<String>) -> Self {
        AddImport {
            type_name: type_name.into(),
            member: None,
        }
    }

    pub fn new_static(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        AddImport {
            type_name: type_name.into(),
            member: Some(member.into()),
        }
    }

    fn qualified_name(&self) -> String {
        match &self.member {
            Some(member) => format!("{}.{}", self.type_name, member),
            None => self.type_name.clone(),
        }
    }

    fn already_visible(&self, cu: &CompilationUnit) -> bool {
        let target = self.qualified_name();
        if let Some(member) = &self.member {
            return cu.imports().any(|i| {
                i.is_static()
                    && (i.qualified_name() == target
                        || (i.type_name() == self.type_name && i.member_name() == Some("*")))
                    && !member.is_empty()
            });
        }
        let package = self
            .type_name
            .rfind('.')
            .map_or("", |idx| &self.type_name[..idx]);
        package.is_empty()
            || package == "java.lang"
            || cu.package_name().as_deref() == Some(package)
            || cu.has_import(&self.type_name)
    }
}

impl SourceEdit for AddImport {
    fn apply(&self, cu: &Arc<CompilationUnit>, _ctx: &mut ExecutionContext) -> Result<Arc<CompilationUnit>> {
        if self.already_visible(cu) {
            return Ok(cu.clone());
        }

        let import = Arc::new(Import {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            statik: self.member.as_ref().map(|_| Space::single_space()),
            qualid: Arc::new(qualified_field_access(&self.qualified_name()).with_prefix(Space::single_space())),
        });

        let mut imports = cu.imports.clone();
        let mut types = cu.types.clone();
        let name = self.qualified_name();

        if imports.is_empty() {
            let prefix = if cu.package.is_some() {
                Space::format("\n\n")
            } else {
                Space::EMPTY
            };
            imports.push(RightPadded::build(Arc::new(import.with_prefix(prefix))));
            if cu.package.is_none()
                && let Some(first) = types.first_mut()
            {
                let trimmed = first.prefix().trim_leading_whitespace();
                *first = first.with_prefix(Space::format(format!("\n\n{trimmed}")));
            }
        } else {
            let index = imports
                .iter()
                .position(|i| i.element.qualified_name() > name)
                .unwrap_or(imports.len());
            if index == 0 {
                let taken = imports[0].element.prefix.clone();
                let shifted = imports[0].with_element(Arc::new(imports[0].element.with_prefix(Space::newline(""))));
                imports[0] = shifted;
                imports.insert(0, RightPadded::build(Arc::new(import.with_prefix(taken))));
            } else {
                imports.insert(
                    index,
                    RightPadded::build(Arc::new(import.with_prefix(Space::newline("")))),
                );
            }
        }

        tracing::debug!(import = %name, path = %cu.source_path.display(), "added import");
        Ok(Arc::new(CompilationUnit {
            imports,
            types,
            ..(**cu).clone()
        }))
    }
}

/// `a.b.C` as a field access chain with empty padding
pub fn qualified_field_access(name: &str) -> Arc<FieldAccess> {
    let mut parts = name.split('.');
    let mut target = J::from(Identifier::build(parts.next().unwrap_or_default(), None));
    let mut last: Option<Arc<FieldAccess>> = None;
    for part in parts {
        let access = Arc::new(FieldAccess {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            target: target.clone(),
            name: LeftPadded::new(Space::EMPTY, Arc::new(Identifier::build(part, None))),
            ty: None,
        });
        target = J::FieldAccess(access.clone());
        last = Some(access);
    }
    last.unwrap_or_else(|| {
        Arc::new(FieldAccess {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            target: J::from(Identifier::build("", None)),
            name: LeftPadded::new(Space::EMPTY, Arc::new(Identifier::build(name, None))),
            ty: None,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(package: bool, imports: &[&str]) -> Arc<CompilationUnit> {
        let package = package.then(|| {
            RightPadded::build(Arc::new(crate::tree::Package {
                id: TreeId::fresh(),
                prefix: Space::EMPTY,
                markers: Markers::EMPTY,
                name: J::FieldAccess(qualified_field_access("com.example")).with_prefix(Space::single_space()),
            }))
        });
        let imports = imports
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let prefix = if i == 0 { "\n\n" } else { "\n" };
                RightPadded::build(Arc::new(Import {
                    id: TreeId::fresh(),
                    prefix: Space::format(prefix),
                    markers: Markers::EMPTY,
                    statik: None,
                    qualid: Arc::new(qualified_field_access(name).with_prefix(Space::single_space())),
                }))
            })
            .collect();
        Arc::new(CompilationUnit {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            source_path: PathBuf::from("A.java"),
            package,
            imports,
            types: vec![J::from(crate::tree::Unknown {
                id: TreeId::fresh(),
                prefix: Space::format("\n\n"),
                markers: Markers::EMPTY,
                source: "class A {}".to_string(),
            })],
            eof: Space::format("\n"),
        })
    }

    #[test]
    fn test_message_bag_round_trip() {
        let ctx = ExecutionContext::new();
        ctx.put_message("count", 3).unwrap();
        assert_eq!(ctx.get_message::<i32>("count"), Some(3));
        assert_eq!(ctx.get_message::<i32>("missing"), None);

        let unit = ctx.for_unit(Path::new("A.java"), "r");
        assert_eq!(unit.get_message::<i32>("count"), Some(3));
        let value = unit.compute_message_if_absent("count", || serde_json::json!(10));
        assert_eq!(value, serde_json::json!(3));
    }

    #[test]
    fn test_errors_are_shared_across_unit_contexts() {
        let ctx = ExecutionContext::new();
        let unit = ctx.for_unit(Path::new("A.java"), "com.example.Recipe");
        unit.on_error(&RecastError::internal_error("boom"));

        let errors = ctx.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].recipe.as_deref(), Some("com.example.Recipe"));
        assert_eq!(errors[0].kind, ErrorKind::Internal);
    }

    #[test]
    fn test_add_import_into_sorted_position() {
        let cu = unit(true, &["java.util.List", "java.util.Set"]);
        let mut ctx = ExecutionContext::new();
        ctx.add_import("java.util.Map");
        let result = ctx.apply_after_visits(cu).unwrap();
        assert_eq!(
            result.print(),
            "package com.example;\n\nimport java.util.List;\nimport java.util.Map;\nimport java.util.Set;\n\nclass A {}\n"
        );
    }

    #[test]
    fn test_add_first_import_after_package() {
        let cu = unit(true, &[]);
        let mut ctx = ExecutionContext::new();
        ctx.add_import("java.util.List");
        ctx.add_import("java.util.List");
        let result = ctx.apply_after_visits(cu).unwrap();
        assert_eq!(
            result.print(),
            "package com.example;\n\nimport java.util.List;\n\nclass A {}\n"
        );
    }

    #[test]
    fn test_add_import_skips_visible_types() {
        let cu = unit(true, &["java.util.*"]);
        let mut ctx = ExecutionContext::new();
        ctx.add_import("java.util.List");
        ctx.add_import("java.lang.String");
        ctx.add_import("com.example.Sibling");
        let result = ctx.apply_after_visits(cu.clone()).unwrap();
        assert!(Arc::ptr_eq(&result, &cu));
    }

    #[test]
    fn test_cancellation_token() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.clone().cancel();
        assert!(token.is_cancelled());

        let expired = CancellationToken::with_deadline(Instant::now());
        assert!(expired.is_cancelled());
    }
}
