//! Fixed-point behaviour of recipe runs over parsed Java

use std::sync::Arc;
use std::time::Duration;

use recast_core::recipe::DeclarativeRecipe;
use recast_core::result::Result;
use recast_core::scheduler::{RecipeScheduler, RunWarning, SchedulerConfig};
use recast_core::tree::{Cursor, J};
use recast_core::visitor::JavaVisitor;
use recast_core::{ErrorKind, ExecutionContext, RecastError};
use recast_java::JavaParser;
use recast_recipes::{ChangeMethodName, CommentOnMethodInvocations, FindMethods};
use recast_test::{RecipeSpec, java, java_after, rewrite_run_sources, to_recipe};

const SOURCE: &str = r#"package p;

class A {
    void foo() {}

    void caller() {
        foo();
    }
}
"#;

#[test]
fn test_mutually_retriggering_recipes_stop_at_the_pass_limit() {
    let flip_flop = DeclarativeRecipe::builder("test.FlipFlop")
        .recipe(Arc::new(ChangeMethodName::new("p.A foo()", "bar")))
        .recipe(Arc::new(ChangeMethodName::new("p.A bar()", "foo")))
        .causes_another_cycle(true)
        .build();
    let sources = JavaParser::new().parse_all(&[SOURCE]).unwrap();
    let scheduler = RecipeScheduler::new(SchedulerConfig {
        max_cycles: 3,
        ..Default::default()
    });

    let run = scheduler.run(&flip_flop, &sources, &ExecutionContext::new()).unwrap();

    assert_eq!(run.cycles, 3);
    assert!(!run.converged);
    assert_eq!(run.warnings, vec![RunWarning::DidNotConverge { max_cycles: 3 }]);
    assert_eq!(run.results[0].tree().print(), SOURCE);
}

#[test]
fn test_recipe_asking_for_another_cycle_converges_once_stable() {
    let recipe = DeclarativeRecipe::builder("test.Annotate")
        .recipe(Arc::new(CommentOnMethodInvocations::new("p.A foo()", "calls foo")))
        .causes_another_cycle(true)
        .build();
    let spec = RecipeSpec::new(recipe).expected_cycles(2);
    let run = rewrite_run_sources(
        &spec,
        &[java_after(
            SOURCE,
            r#"package p;

class A {
    void foo() {}

    void caller() {
        // calls foo
        foo();
    }
}
"#,
        )],
    );
    assert!(run.converged);
    assert!(run.warnings.is_empty());
}

#[test]
fn test_only_matching_units_change() {
    let spec = RecipeSpec::new(ChangeMethodName::new("p.A foo()", "bar"));
    let run = rewrite_run_sources(
        &spec,
        &[
            java_after(
                SOURCE,
                r#"package p;

class A {
    void bar() {}

    void caller() {
        bar();
    }
}
"#,
            ),
            java("package q;\n\nclass B {\n    void foo() {}\n}\n"),
        ],
    );
    assert_eq!(
        run.results[0].recipes_that_made_changes,
        vec!["recast.java.ChangeMethodName".to_string()]
    );
    assert!(run.results[1].recipes_that_made_changes.is_empty());
}

#[test]
fn test_search_results_become_diagnostics() {
    let spec = RecipeSpec::new(FindMethods::new("java.io.PrintStream println(..)"));
    let source = "class A {\n    void m() {\n        System.out.println(1);\n        System.out.print(2);\n    }\n}\n";
    let run = rewrite_run_sources(&spec, &[java_after(source, source)]);

    let found: Vec<&str> = run.results[0].diagnostics.iter().map(|d| d.text.as_str()).collect();
    assert_eq!(found, vec!["System.out.println(1)"]);
}

#[test]
fn test_sequential_and_parallel_runs_agree() {
    let sources: Vec<String> = (0..8)
        .map(|i| format!("package p{i};\n\nclass C{i} {{\n    int v() {{ return Integer.valueOf({i}); }}\n}}\n"))
        .collect();
    let units = JavaParser::new().parse_all(&sources).unwrap();
    let recipe = CommentOnMethodInvocations::new("java.lang.Integer valueOf(int)", "boxed");

    let printed = |parallel: bool| -> Vec<String> {
        let scheduler = RecipeScheduler::new(SchedulerConfig {
            parallel,
            ..Default::default()
        });
        let run = scheduler.run(&recipe, &units, &ExecutionContext::new()).unwrap();
        run.results.iter().map(|r| r.tree().print()).collect()
    };

    let sequential = printed(false);
    assert_eq!(sequential, printed(true));
    assert!(sequential[3].contains("return /* boxed */ Integer.valueOf(3);"));
}

const OTHER: &str = "package q;\n\nclass B {\n    void bar() {}\n}\n";

fn rename_bar_when_foo_is_used() -> DeclarativeRecipe {
    DeclarativeRecipe::builder("test.RenameBarWhenFooIsUsed")
        .applicable_test(Arc::new(FindMethods::new("p.A foo()")))
        .recipe(Arc::new(ChangeMethodName::new("q.B bar()", "baz")))
        .build()
}

#[test]
fn test_any_source_test_opens_every_unit() {
    let spec = RecipeSpec::new(rename_bar_when_foo_is_used());
    let run = rewrite_run_sources(
        &spec,
        &[
            java(SOURCE),
            java_after(OTHER, "package q;\n\nclass B {\n    void baz() {}\n}\n"),
        ],
    );
    assert!(run.warnings.is_empty());
    assert!(run.errors().next().is_none());
}

#[test]
fn test_any_source_test_without_a_match_changes_nothing() {
    let spec = RecipeSpec::new(rename_bar_when_foo_is_used());
    let run = rewrite_run_sources(&spec, &[java(OTHER)]);
    assert!(run.results[0].diagnostics.is_empty());
    assert!(run.warnings.is_empty());
}

/// Cancels the run from inside a unit visit
struct CancelRun;

impl JavaVisitor<ExecutionContext> for CancelRun {
    fn visit(&mut self, tree: &J, _parent: &Cursor<'_>, ctx: &mut ExecutionContext) -> Result<J> {
        ctx.cancellation().cancel();
        Ok(tree.clone())
    }
}

#[test]
fn test_cancellation_is_honoured_between_units() {
    let recipe = DeclarativeRecipe::builder("test.CommentThenCancel")
        .recipe(Arc::new(CommentOnMethodInvocations::new("p.A foo()", "calls foo")))
        .recipe(Arc::new(to_recipe(|| Box::new(CancelRun)).named("test.CancelRun")))
        .build();
    let second = SOURCE.replace("package p;", "package p2;").replace("p.A", "p2.A");
    let units = JavaParser::new().parse_all(&[SOURCE, second.as_str()]).unwrap();
    let scheduler = RecipeScheduler::new(SchedulerConfig {
        parallel: false,
        ..Default::default()
    });
    let ctx = ExecutionContext::new();

    let run = scheduler.run(&recipe, &units, &ctx).unwrap();

    assert!(run.cancelled);
    assert!(!run.converged);
    assert!(run.warnings.is_empty());
    assert!(run.results[0].tree().print().contains("// calls foo"));
    assert!(!run.results[1].is_changed());
    assert!(ctx.errors().is_empty());
}

#[test]
fn test_elapsed_deadline_stops_before_the_first_pass() {
    let units = JavaParser::new().parse_all(&[SOURCE]).unwrap();
    let scheduler = RecipeScheduler::new(SchedulerConfig {
        deadline: Some(Duration::ZERO),
        ..Default::default()
    });
    let recipe = ChangeMethodName::new("p.A foo()", "bar");

    let run = scheduler.run(&recipe, &units, &ExecutionContext::new()).unwrap();

    assert!(run.cancelled);
    assert_eq!(run.cycles, 0);
    assert!(run.warnings.is_empty());
    assert_eq!(run.results[0].tree().print(), SOURCE);
    assert!(run.changed().next().is_none());
}

/// Refuses to visit units whose path ends with the given file name
struct FailOn(&'static str);

impl JavaVisitor<ExecutionContext> for FailOn {
    fn visit(&mut self, tree: &J, _parent: &Cursor<'_>, ctx: &mut ExecutionContext) -> Result<J> {
        if ctx.source_path().is_some_and(|path| path.ends_with(self.0)) {
            return Err(RecastError::internal_error("refusing to edit this unit"));
        }
        Ok(tree.clone())
    }
}

#[test]
fn test_failing_unit_is_recorded_while_others_change() {
    let broken = SOURCE.replace("class A", "class Broken").replace("p.A", "p.Broken");
    let recipe = DeclarativeRecipe::builder("test.CommentUnlessBroken")
        .recipe(Arc::new(CommentOnMethodInvocations::new("p.* foo()", "calls foo")))
        .recipe(Arc::new(to_recipe(|| Box::new(FailOn("Broken.java"))).named("test.FailOn")))
        .build();
    let spec = RecipeSpec::new(recipe).allow_errors();
    let run = rewrite_run_sources(
        &spec,
        &[
            java_after(SOURCE, &SOURCE.replace("        foo();", "        // calls foo\n        foo();")),
            java(&broken),
        ],
    );

    assert!(run.warnings.is_empty());
    assert_eq!(run.results[1].tree().print(), broken);
    let errors: Vec<_> = run.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].recipe.as_deref(), Some("test.FailOn"));
    assert_eq!(errors[0].kind, ErrorKind::Unit);
    assert!(errors[0].source_path.as_ref().is_some_and(|p| p.ends_with("Broken.java")));
    assert!(errors[0].message.contains("refusing to edit this unit"), "{}", errors[0].message);
    assert!(run.results[0].errors.is_empty());
}
