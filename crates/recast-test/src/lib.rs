//! Recast test harness
//!
//! Runs a recipe over Java sources and checks the printed result:
//! - every source must round-trip through the parser untouched
//! - a source with an expected `after` must print exactly that
//! - a source without one must come back as the very same tree
//! - running the recipe again over its own output must change nothing
//!
//! ```ignore
//! let spec = RecipeSpec::new(ChangeMethodName::new("a.A foo()", "bar"));
//! rewrite_run(&spec, "class A { void foo() {} }", "class A { void bar() {} }");
//! ```

use similar::TextDiff;
use std::path::PathBuf;
use std::sync::{Arc, Once};

use recast_core::recipe::Recipe;
use recast_core::scheduler::{RecipeRun, RecipeScheduler, SchedulerConfig};
use recast_core::tree::CompilationUnit;
use recast_core::visitor::JavaVisitor;
use recast_core::ExecutionContext;
use recast_java::JavaParser;

static LOGGING: Once = Once::new();

/// Route `tracing` output through the test writer, filtered by `RUST_LOG`
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("recast=warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// How a recipe is run and what the run must look like
#[derive(Clone)]
pub struct RecipeSpec {
    recipe: Arc<dyn Recipe>,
    parser: JavaParser,
    scheduler: SchedulerConfig,
    expected_cycles: Option<usize>,
    check_idempotence: bool,
    allow_errors: bool,
}

impl RecipeSpec {
    pub fn new(recipe: impl Recipe + 'static) -> Self {
        Self::from_arc(Arc::new(recipe))
    }

    pub fn from_arc(recipe: Arc<dyn Recipe>) -> Self {
        RecipeSpec {
            recipe,
            parser: JavaParser::new(),
            scheduler: SchedulerConfig::default(),
            expected_cycles: None,
            check_idempotence: true,
            allow_errors: false,
        }
    }

    pub fn parser(mut self, parser: JavaParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn max_cycles(mut self, max_cycles: usize) -> Self {
        self.scheduler.max_cycles = max_cycles;
        self
    }

    pub fn scheduler(mut self, config: SchedulerConfig) -> Self {
        self.scheduler = config;
        self
    }

    /// Number of edit passes the run must take
    pub fn expected_cycles(mut self, cycles: usize) -> Self {
        self.expected_cycles = Some(cycles);
        self
    }

    pub fn skip_idempotence(mut self) -> Self {
        self.check_idempotence = false;
        self
    }

    /// Accept recorded unit failures instead of failing the test
    pub fn allow_errors(mut self) -> Self {
        self.allow_errors = true;
        self
    }

    pub fn recipe(&self) -> &Arc<dyn Recipe> {
        &self.recipe
    }
}

/// One input source and, if the recipe should change it, its expected text
#[derive(Debug, Clone)]
pub struct SourceSpec {
    pub before: String,
    pub after: Option<String>,
    pub path: Option<PathBuf>,
}

/// A source the recipe must leave alone
pub fn java(before: &str) -> SourceSpec {
    SourceSpec {
        before: before.to_string(),
        after: None,
        path: None,
    }
}

/// A source the recipe must rewrite into `after`
pub fn java_after(before: &str, after: &str) -> SourceSpec {
    SourceSpec {
        before: before.to_string(),
        after: Some(after.to_string()),
        path: None,
    }
}

impl SourceSpec {
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Run `spec` over `before` and expect exactly `after`
pub fn rewrite_run(spec: &RecipeSpec, before: &str, after: &str) -> RecipeRun {
    rewrite_run_sources(spec, &[java_after(before, after)])
}

/// Run `spec` over `before` and expect no change at all
pub fn rewrite_run_unchanged(spec: &RecipeSpec, before: &str) -> RecipeRun {
    rewrite_run_sources(spec, &[java(before)])
}

/// Run `spec` over several sources parsed together
pub fn rewrite_run_sources(spec: &RecipeSpec, sources: &[SourceSpec]) -> RecipeRun {
    init_test_logging();
    let units = parse_sources(spec, sources);
    let run = run(spec, &units);

    if !spec.allow_errors {
        let errors: Vec<String> = run
            .errors()
            .map(|e| format!("{}: {}", e.recipe.as_deref().unwrap_or("<run>"), e.message))
            .collect();
        assert!(errors.is_empty(), "recipe run recorded errors:\n{}", errors.join("\n"));
    }
    if let Some(expected) = spec.expected_cycles {
        assert_eq!(run.cycles, expected, "unexpected number of edit passes");
    }
    assert!(run.converged || run.cancelled, "recipe did not converge within {} passes", run.cycles);

    for ((source, unit), result) in sources.iter().zip(&units).zip(&run.results) {
        match &source.after {
            Some(after) => {
                let actual = result.tree().print();
                assert!(
                    result.is_changed(),
                    "expected {} to change, but the recipe left it untouched",
                    unit.source_path().display()
                );
                if actual != *after {
                    panic!("{}", mismatch(after, &actual));
                }
            }
            None => {
                assert!(
                    !result.is_changed(),
                    "expected no change to {}, got:\n{}",
                    unit.source_path().display(),
                    result.diff()
                );
                assert!(
                    Arc::ptr_eq(result.tree(), unit),
                    "unchanged unit was rebuilt instead of returned as is"
                );
            }
        }
    }

    if spec.check_idempotence && run.changed().next().is_some() {
        let outputs: Vec<Arc<CompilationUnit>> = run.results.iter().map(|r| r.tree().clone()).collect();
        let again = self::run(spec, &outputs);
        for result in again.changed() {
            panic!(
                "recipe is not idempotent; a second run changed {}:\n{}",
                result.source_path.display(),
                result.diff()
            );
        }
    }
    run
}

fn parse_sources(spec: &RecipeSpec, sources: &[SourceSpec]) -> Vec<Arc<CompilationUnit>> {
    let befores: Vec<&str> = sources.iter().map(|s| s.before.as_str()).collect();
    let mut units = spec
        .parser
        .parse_all(&befores)
        .unwrap_or_else(|e| panic!("failed to parse sources: {e}"));
    for (unit, source) in units.iter_mut().zip(sources) {
        assert_eq!(unit.print(), source.before, "source does not round-trip");
        if let Some(path) = &source.path {
            *unit = Arc::new(CompilationUnit {
                source_path: path.clone(),
                ..(**unit).clone()
            });
        }
    }
    units
}

fn run(spec: &RecipeSpec, units: &[Arc<CompilationUnit>]) -> RecipeRun {
    let scheduler = RecipeScheduler::new(spec.scheduler.clone());
    scheduler
        .run(spec.recipe.as_ref(), units, &ExecutionContext::new())
        .unwrap_or_else(|e| panic!("recipe run failed: {e}"))
}

fn mismatch(expected: &str, actual: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual)
        .unified_diff()
        .header("expected", "actual")
        .to_string();
    format!("printed output differs from the expected source\n{diff}")
}

type VisitorFactory = dyn Fn() -> Box<dyn JavaVisitor<ExecutionContext>> + Send + Sync;

/// Recipe wrapping a visitor built on the spot, for exercising visitors directly
pub struct AdHocRecipe {
    name: String,
    visitor: Box<VisitorFactory>,
    causes_another_cycle: bool,
}

impl AdHocRecipe {
    pub fn new<F>(visitor: F) -> Self
    where
        F: Fn() -> Box<dyn JavaVisitor<ExecutionContext>> + Send + Sync + 'static,
    {
        AdHocRecipe {
            name: "recast.test.AdHocRecipe".to_string(),
            visitor: Box::new(visitor),
            causes_another_cycle: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn causes_another_cycle(mut self, causes_another_cycle: bool) -> Self {
        self.causes_another_cycle = causes_another_cycle;
        self
    }
}

impl Recipe for AdHocRecipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        "Ad hoc recipe"
    }

    fn description(&self) -> &str {
        "Runs a visitor supplied by a test."
    }

    fn causes_another_cycle(&self) -> bool {
        self.causes_another_cycle
    }

    fn visitor(&self) -> Box<dyn JavaVisitor<ExecutionContext> + '_> {
        (self.visitor)()
    }
}

/// Wrap a visitor factory as a recipe
pub fn to_recipe<F>(visitor: F) -> AdHocRecipe
where
    F: Fn() -> Box<dyn JavaVisitor<ExecutionContext>> + Send + Sync + 'static,
{
    AdHocRecipe::new(visitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_core::recipe::NoopVisitor;

    #[test]
    fn test_noop_recipe_returns_the_same_tree() {
        let spec = RecipeSpec::new(to_recipe(|| Box::new(NoopVisitor)));
        let run = rewrite_run_unchanged(&spec, "class A { void m() { int x = 1; } }");
        assert_eq!(run.cycles, 1);
        assert!(run.converged);
    }

    #[test]
    #[should_panic(expected = "expected A.java to change")]
    fn test_missing_change_fails() {
        let spec = RecipeSpec::new(to_recipe(|| Box::new(NoopVisitor)));
        rewrite_run(&spec, "class A { }", "class B { }");
    }

    #[test]
    fn test_mismatch_renders_a_unified_diff() {
        let report = mismatch("class A {}\n", "class B {}\n");
        assert!(report.contains("-class A {}"));
        assert!(report.contains("+class B {}"));
    }
}
