//! Runs a recipe tree over a set of compilation units to a fixed point
//!
//! A run validates the whole recipe tree, lets scanning recipes accumulate
//! over every unit once, then performs edit passes until nothing changes, no
//! recipe asks for another pass, or the pass limit is reached. A failing unit
//! falls back to its original tree and the run carries on with the others.

use indexmap::IndexSet;
use rayon::prelude::*;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::RecastError;
use crate::execution::{ExecutionContext, RecordedError};
use crate::recipe::{self, Accumulator, Recipe};
use crate::result::Result;
use crate::tree::{CompilationUnit, Cursor, J, JKind, Marker, MarkerKind, TreeId};
use crate::visitor::collect;

pub const DEFAULT_MAX_CYCLES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub max_cycles: usize,
    pub parallel: bool,
    /// Wall-clock budget for the run, checked between units and passes
    pub deadline: Option<Duration>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            max_cycles: DEFAULT_MAX_CYCLES,
            parallel: true,
            deadline: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RunWarning {
    /// Trees were still changing when the pass limit was reached
    DidNotConverge { max_cycles: usize },
}

/// A node flagged with a search result marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub tree_id: TreeId,
    pub kind: JKind,
    pub description: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct SourceResult {
    pub source_path: PathBuf,
    pub original_id: TreeId,
    pub before: Arc<CompilationUnit>,
    /// `None` when the unit is unchanged
    pub after: Option<Arc<CompilationUnit>>,
    pub recipes_that_made_changes: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub errors: Vec<RecordedError>,
}

impl SourceResult {
    pub fn is_changed(&self) -> bool {
        self.after.is_some()
    }

    /// The final tree, whether or not it changed
    pub fn tree(&self) -> &Arc<CompilationUnit> {
        self.after.as_ref().unwrap_or(&self.before)
    }

    /// Unified diff of the printed unit, empty when unchanged
    pub fn diff(&self) -> String {
        let Some(after) = &self.after else {
            return String::new();
        };
        let original = self.before.print();
        let modified = after.print();
        let diff = TextDiff::from_lines(&original, &modified);

        let mut output = String::new();
        output.push_str(&format!("--- {}\n", self.source_path.display()));
        output.push_str(&format!("+++ {}\n", self.source_path.display()));
        for group in diff.grouped_ops(3) {
            let (Some(first), Some(last)) = (group.first(), group.last()) else {
                continue;
            };
            let old_start = first.old_range().start;
            let new_start = first.new_range().start;
            let old_len = last.old_range().end - old_start;
            let new_len = last.new_range().end - new_start;
            output.push_str(&format!(
                "@@ -{},{} +{},{} @@\n",
                old_start + 1,
                old_len,
                new_start + 1,
                new_len
            ));
            for op in &group {
                for change in diff.iter_changes(op) {
                    let sign = match change.tag() {
                        ChangeTag::Delete => '-',
                        ChangeTag::Insert => '+',
                        ChangeTag::Equal => ' ',
                    };
                    output.push(sign);
                    output.push_str(change.value());
                    if change.missing_newline() {
                        output.push('\n');
                    }
                }
            }
        }
        output
    }
}

#[derive(Debug, Clone)]
pub struct RecipeRun {
    pub results: Vec<SourceResult>,
    pub cycles: usize,
    pub converged: bool,
    pub cancelled: bool,
    pub warnings: Vec<RunWarning>,
}

impl RecipeRun {
    pub fn changed(&self) -> impl Iterator<Item = &SourceResult> {
        self.results.iter().filter(|r| r.is_changed())
    }

    pub fn errors(&self) -> impl Iterator<Item = &RecordedError> {
        self.results.iter().flat_map(|r| r.errors.iter())
    }
}

struct UnitState {
    original: Arc<CompilationUnit>,
    current: Arc<CompilationUnit>,
    changed_by: IndexSet<String>,
    failed: bool,
}

pub struct RecipeScheduler {
    config: SchedulerConfig,
}

impl Default for RecipeScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl RecipeScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        RecipeScheduler { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run `recipe` over `sources`.
    ///
    /// Fails only when the recipe tree is invalid. Unit-level failures are
    /// recorded on the context and on the affected [`SourceResult`].
    pub fn run(
        &self,
        recipe: &dyn Recipe,
        sources: &[Arc<CompilationUnit>],
        ctx: &ExecutionContext,
    ) -> Result<RecipeRun> {
        let started = Instant::now();
        let deadline = self.config.deadline.map(|d| started + d);
        let cancelled = AtomicBool::new(false);
        let should_stop = || {
            let stop = ctx.cancellation().is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d);
            if stop {
                cancelled.store(true, Ordering::SeqCst);
            }
            stop
        };

        let validated = recipe::validate_all(recipe);
        if !validated.is_valid() {
            return Err(RecastError::InvalidRecipe {
                recipe: recipe.name().to_string(),
                failures: validated.failure_summary(),
            });
        }

        info!(
            recipe = recipe.name(),
            units = sources.len(),
            max_cycles = self.config.max_cycles,
            "starting recipe run"
        );
        let error_baseline = ctx.errors().len();

        ctx.set_cycle(0);
        let accumulators = self.scan(recipe, sources, ctx, &should_stop);

        let mut units: Vec<UnitState> = sources
            .iter()
            .map(|cu| UnitState {
                original: cu.clone(),
                current: cu.clone(),
                changed_by: IndexSet::new(),
                failed: false,
            })
            .collect();

        let another_cycle = recipe::causes_another_cycle(recipe);
        let max_cycles = self.config.max_cycles.max(1);
        let mut cycles = 0;
        let mut converged = false;

        for cycle in 1..=max_cycles {
            if should_stop() {
                break;
            }
            ctx.set_cycle(cycle);
            cycles = cycle;

            let changed = AtomicBool::new(false);
            let edit = |unit: &mut UnitState| {
                if unit.failed || should_stop() {
                    return;
                }
                if self.edit_unit(recipe, &accumulators, unit, ctx) {
                    changed.store(true, Ordering::SeqCst);
                }
            };
            if self.config.parallel {
                units.par_iter_mut().for_each(edit);
            } else {
                units.iter_mut().for_each(edit);
            }

            let changed = changed.load(Ordering::SeqCst);
            debug!(cycle, changed, "edit pass finished");
            if !changed || !another_cycle {
                converged = !cancelled.load(Ordering::SeqCst);
                break;
            }
        }

        let cancelled = cancelled.load(Ordering::SeqCst);
        let mut warnings = Vec::new();
        if !converged && !cancelled {
            warn!(
                recipe = recipe.name(),
                max_cycles, "recipe run did not converge"
            );
            warnings.push(RunWarning::DidNotConverge { max_cycles });
        }

        let errors: Vec<RecordedError> = ctx.errors().into_iter().skip(error_baseline).collect();
        let results = units
            .into_iter()
            .map(|unit| Self::report(unit, &errors))
            .collect::<Vec<_>>();

        info!(
            recipe = recipe.name(),
            cycles,
            converged,
            cancelled,
            changed = results.iter().filter(|r| r.is_changed()).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "recipe run finished"
        );

        Ok(RecipeRun {
            results,
            cycles,
            converged,
            cancelled,
            warnings,
        })
    }

    /// Scanning phase; returns one frozen accumulator slot per recipe in pre-order
    fn scan(
        &self,
        recipe: &dyn Recipe,
        sources: &[Arc<CompilationUnit>],
        ctx: &ExecutionContext,
        should_stop: &(dyn Fn() -> bool + Sync),
    ) -> Vec<Option<Accumulator>> {
        recipe::flatten(recipe)
            .into_iter()
            .map(|r| {
                let scanning = r.scanning()?;
                let acc = Mutex::new(scanning.initial_accumulator(ctx));
                let scan_one = |cu: &Arc<CompilationUnit>| {
                    if should_stop() {
                        return;
                    }
                    let mut unit_ctx = ctx.for_unit(cu.source_path(), r.name());
                    let mut guard = acc.lock().unwrap_or_else(PoisonError::into_inner);
                    if let Err(err) = scanning.scan_erased(guard.as_mut(), cu, &mut unit_ctx) {
                        unit_ctx.on_error(&err);
                    }
                };
                if self.config.parallel {
                    sources.par_iter().for_each(scan_one);
                } else {
                    sources.iter().for_each(scan_one);
                }
                debug!(recipe = r.name(), "scan finished");
                Some(acc.into_inner().unwrap_or_else(PoisonError::into_inner))
            })
            .collect()
    }

    /// One edit pass over one unit; returns whether the unit changed
    fn edit_unit(
        &self,
        recipe: &dyn Recipe,
        accumulators: &[Option<Accumulator>],
        unit: &mut UnitState,
        ctx: &ExecutionContext,
    ) -> bool {
        let before = unit.current.clone();
        let mut current_recipe = recipe.name().to_string();
        let mut changed_by = Vec::new();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let mut position = 0;
            run_recipe(
                recipe,
                &mut position,
                accumulators,
                before.clone(),
                ctx,
                &mut current_recipe,
                &mut changed_by,
            )
        }));

        let error = match outcome {
            Ok(Ok(after)) => {
                if Arc::ptr_eq(&after, &before) {
                    return false;
                }
                unit.changed_by.extend(changed_by);
                unit.current = after;
                return true;
            }
            Ok(Err(err)) => err,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "visitor panicked".to_string());
                RecastError::internal_error(format!("panic: {message}"))
            }
        };

        let path = unit.original.source_path();
        let failure = RecastError::UnitFailure {
            recipe: current_recipe.clone(),
            path: path.to_path_buf(),
            message: error.to_string(),
        };
        ctx.for_unit(path, &current_recipe).on_error(&failure);
        unit.failed = true;
        let reverted = !Arc::ptr_eq(&unit.current, &unit.original);
        unit.current = unit.original.clone();
        unit.changed_by.clear();
        reverted
    }

    fn report(unit: UnitState, errors: &[RecordedError]) -> SourceResult {
        let path = unit.original.source_path().to_path_buf();
        let changed = !Arc::ptr_eq(&unit.current, &unit.original);
        let diagnostics = collect(&J::from(unit.current.clone()), |node, _| {
            match node.markers().find_first(&MarkerKind::SearchResult) {
                Some(Marker::SearchResult { description, .. }) => Some(Diagnostic {
                    tree_id: node.id(),
                    kind: node.kind(),
                    description: description.clone(),
                    text: node.print_trimmed(),
                }),
                _ => None,
            }
        })
        .unwrap_or_default();

        SourceResult {
            original_id: unit.original.id,
            errors: errors
                .iter()
                .filter(|e| e.source_path.as_deref() == Some(path.as_path()))
                .cloned()
                .collect(),
            source_path: path,
            after: changed.then(|| unit.current.clone()),
            before: unit.original,
            recipes_that_made_changes: if changed {
                unit.changed_by.into_iter().collect()
            } else {
                Vec::new()
            },
            diagnostics,
        }
    }
}

/// Run `recipe`, then its children, over one unit.
///
/// `position` is the pre-order index of `recipe` in the tree and indexes
/// `accumulators`; skipped subtrees advance it by their size.
fn run_recipe(
    recipe: &dyn Recipe,
    position: &mut usize,
    accumulators: &[Option<Accumulator>],
    cu: Arc<CompilationUnit>,
    ctx: &ExecutionContext,
    current_recipe: &mut String,
    changed_by: &mut Vec<String>,
) -> Result<Arc<CompilationUnit>> {
    let index = *position;
    *position += 1;
    let skip_subtree = |position: &mut usize| *position = index + recipe::subtree_len(recipe);

    current_recipe.clear();
    current_recipe.push_str(recipe.name());
    let mut unit_ctx = ctx.for_unit(cu.source_path(), recipe.name());

    let accumulator = accumulators.get(index).and_then(|a| a.as_deref());
    let scanning = recipe.scanning().zip(accumulator);
    if let Some((scanning, acc)) = scanning
        && !scanning.is_applicable_erased(acc)?
    {
        skip_subtree(position);
        return Ok(cu);
    }
    if let Some(precondition) = recipe.precondition()
        && !precondition.check(&cu, &mut unit_ctx)?
    {
        debug!(recipe = recipe.name(), path = %cu.source_path().display(), "precondition not met");
        skip_subtree(position);
        return Ok(cu);
    }

    let tree = J::from(cu.clone());
    let visited = {
        let mut visitor = match scanning {
            Some((scanning, acc)) => scanning.editor_erased(acc)?,
            None => recipe.visitor(),
        };
        visitor.visit(&tree, &Cursor::root(), &mut unit_ctx)?
    };
    let mut after: Arc<CompilationUnit> = if visited.ptr_eq(&tree) {
        cu.clone()
    } else {
        Arc::try_from(visited)?
    };
    after = unit_ctx.apply_after_visits(after)?;
    if !Arc::ptr_eq(&after, &cu) {
        debug!(recipe = recipe.name(), path = %cu.source_path().display(), "recipe changed unit");
        changed_by.push(recipe.name().to_string());
    }

    for child in recipe.recipe_list() {
        after = run_recipe(
            child.as_ref(),
            position,
            accumulators,
            after,
            ctx,
            current_recipe,
            changed_by,
        )?;
    }
    Ok(after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Identifier, Markers, Space};
    use crate::visitor::JavaIsoVisitor;

    fn unit(path: &str, class_name: &str) -> Arc<CompilationUnit> {
        Arc::new(CompilationUnit {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            source_path: PathBuf::from(path),
            package: None,
            imports: Vec::new(),
            types: vec![J::from(Identifier::build(class_name, None))],
            eof: Space::format("\n"),
        })
    }

    /// Appends `x` to every identifier, once per pass
    struct Grow {
        another_cycle: bool,
    }

    struct GrowVisitor;

    impl JavaIsoVisitor<ExecutionContext> for GrowVisitor {
        fn visit_identifier(
            &mut self,
            ident: &Arc<Identifier>,
            _cursor: &Cursor<'_>,
            _ctx: &mut ExecutionContext,
        ) -> Result<Arc<Identifier>> {
            Ok(Arc::new(ident.with_simple_name(format!("{}x", ident.simple_name))))
        }
    }

    impl Recipe for Grow {
        fn name(&self) -> &str {
            "test.Grow"
        }

        fn display_name(&self) -> &str {
            "Grow"
        }

        fn description(&self) -> &str {
            "Appends a character to identifiers."
        }

        fn causes_another_cycle(&self) -> bool {
            self.another_cycle
        }

        fn visitor(&self) -> Box<dyn crate::visitor::JavaVisitor<ExecutionContext> + '_> {
            Box::new(GrowVisitor)
        }
    }

    struct Explode;

    struct ExplodeVisitor;

    impl JavaIsoVisitor<ExecutionContext> for ExplodeVisitor {
        fn visit_identifier(
            &mut self,
            ident: &Arc<Identifier>,
            _cursor: &Cursor<'_>,
            _ctx: &mut ExecutionContext,
        ) -> Result<Arc<Identifier>> {
            if ident.simple_name.starts_with("Bad") {
                panic!("cannot handle {}", ident.simple_name);
            }
            Ok(ident.clone())
        }
    }

    impl Recipe for Explode {
        fn name(&self) -> &str {
            "test.Explode"
        }

        fn display_name(&self) -> &str {
            "Explode"
        }

        fn description(&self) -> &str {
            "Panics on some units."
        }

        fn visitor(&self) -> Box<dyn crate::visitor::JavaVisitor<ExecutionContext> + '_> {
            Box::new(ExplodeVisitor)
        }
    }

    #[test]
    fn test_single_pass_without_another_cycle() {
        let scheduler = RecipeScheduler::new(SchedulerConfig {
            parallel: false,
            ..Default::default()
        });
        let sources = vec![unit("A.java", "A")];
        let run = scheduler
            .run(&Grow { another_cycle: false }, &sources, &ExecutionContext::new())
            .unwrap();

        assert_eq!(run.cycles, 1);
        assert!(run.converged);
        assert!(run.warnings.is_empty());
        let result = &run.results[0];
        assert_eq!(result.tree().print(), "Ax\n");
        assert_eq!(result.recipes_that_made_changes, vec!["test.Grow".to_string()]);
        assert_eq!(result.diff(), "--- A.java\n+++ A.java\n@@ -1,1 +1,1 @@\n-A\n+Ax\n");
    }

    #[test]
    fn test_non_convergence_is_reported() {
        let scheduler = RecipeScheduler::new(SchedulerConfig {
            max_cycles: 3,
            parallel: true,
            deadline: None,
        });
        let sources = vec![unit("A.java", "A"), unit("B.java", "B")];
        let run = scheduler
            .run(&Grow { another_cycle: true }, &sources, &ExecutionContext::new())
            .unwrap();

        assert_eq!(run.cycles, 3);
        assert!(!run.converged);
        assert_eq!(run.warnings, vec![RunWarning::DidNotConverge { max_cycles: 3 }]);
        assert_eq!(run.results[0].tree().print(), "Axxx\n");
        assert_eq!(run.results[1].tree().print(), "Bxxx\n");
    }

    #[test]
    fn test_panicking_unit_falls_back_to_original() {
        let scheduler = RecipeScheduler::default();
        let sources = vec![unit("Bad.java", "BadName"), unit("Good.java", "Good")];
        let ctx = ExecutionContext::new();
        let run = scheduler.run(&Explode, &sources, &ctx).unwrap();

        assert!(run.converged);
        assert!(run.results.iter().all(|r| !r.is_changed()));
        assert!(Arc::ptr_eq(run.results[0].tree(), &sources[0]));
        assert_eq!(run.results[0].errors.len(), 1);
        assert!(run.results[0].errors[0].message.contains("cannot handle BadName"));
        assert_eq!(run.results[0].errors[0].recipe.as_deref(), Some("test.Explode"));
        assert!(run.results[1].errors.is_empty());
    }

    #[test]
    fn test_cancelled_run_touches_nothing() {
        let ctx = ExecutionContext::new();
        ctx.cancellation().cancel();
        let sources = vec![unit("A.java", "A")];
        let run = RecipeScheduler::default()
            .run(&Grow { another_cycle: true }, &sources, &ctx)
            .unwrap();

        assert!(run.cancelled);
        assert!(!run.converged);
        assert_eq!(run.cycles, 0);
        assert!(run.warnings.is_empty());
        assert!(!run.results[0].is_changed());
    }

    #[test]
    fn test_invalid_recipe_aborts_before_editing() {
        let recipe = crate::recipe::DeclarativeRecipe::builder("test.Composite")
            .recipe_named("test.Missing")
            .build();
        let err = RecipeScheduler::default()
            .run(&recipe, &[unit("A.java", "A")], &ExecutionContext::new())
            .unwrap_err();
        assert!(matches!(err, RecastError::InvalidRecipe { .. }));
    }

    #[test]
    fn test_unchanged_tree_is_shared() {
        let sources = vec![unit("A.java", "Fine")];
        let run = RecipeScheduler::default()
            .run(&Explode, &sources, &ExecutionContext::new())
            .unwrap();
        assert!(Arc::ptr_eq(run.results[0].tree(), &sources[0]));
        assert!(run.results[0].diff().is_empty());
    }
}
