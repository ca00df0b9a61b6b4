//! Template application through whole recipe runs
//!
//! Each case parses real source, applies a template at some coordinates and
//! checks the printed unit, so both the fragment and the untouched
//! surroundings are verified.

use std::sync::{Arc, Mutex};

use recast_core::result::Result;
use recast_core::template::JavaTemplate;
use recast_core::tree::{Block, ClassDeclaration, Cursor, J, MethodInvocation};
use recast_core::visitor::{JavaVisitor, walk_block, walk_class_declaration, walk_method_invocation};
use recast_core::{ErrorKind, ExecutionContext, RecastError};
use recast_recipes::ReplaceInvocationWithTemplate;
use recast_recipes::builtin::replace_invocation::ReplaceInvocationOptions;
use recast_test::{RecipeSpec, rewrite_run, rewrite_run_unchanged, to_recipe};

#[test]
fn test_replace_invocation_with_literal() {
    let spec = RecipeSpec::new(ReplaceInvocationWithTemplate::new("java.lang.Integer valueOf(int)", "1"));
    rewrite_run(
        &spec,
        r#"class Test {
    void test() {
        int i;
        i = Integer.valueOf(1);
    }
}
"#,
        r#"class Test {
    void test() {
        int i;
        i = 1;
    }
}
"#,
    );
}

#[test]
fn test_replace_in_lambda_body_binds_the_parameter() {
    let spec = RecipeSpec::new(ReplaceInvocationWithTemplate::new(
        "java.lang.Integer valueOf(int)",
        "new Integer(#{any()})",
    ));
    rewrite_run(
        &spec,
        r#"import java.util.function.Function;

class Test {
    Function<Integer, Integer> f = it -> Integer.valueOf(it);
}
"#,
        r#"import java.util.function.Function;

class Test {
    Function<Integer, Integer> f = it -> new Integer(it);
}
"#,
    );
}

#[test]
fn test_replace_leaves_surrounding_text_alone() {
    let before = r#"class Test {
    int test(int a) {
        int x  =   Integer.valueOf( a ) ;  // keep this
        /* and this */ return   x;
    }
}
"#;
    let spec = RecipeSpec::new(ReplaceInvocationWithTemplate::new(
        "java.lang.Integer valueOf(int)",
        "#{any(int)}",
    ));
    let after = before.replace("Integer.valueOf( a )", "a");
    rewrite_run(&spec, before, &after);
}

#[test]
fn test_receiver_binds_the_first_placeholder() {
    let spec = RecipeSpec::new(ReplaceInvocationWithTemplate::new(
        "java.lang.String concat(java.lang.String)",
        "#{any(java.lang.String)} + #{any(java.lang.String)}",
    ));
    rewrite_run(
        &spec,
        "class Test {\n    String join(String a, String b) {\n        return a.concat(b);\n    }\n}\n",
        "class Test {\n    String join(String a, String b) {\n        return a + b;\n    }\n}\n",
    );
}

#[test]
fn test_non_matching_overload_is_untouched() {
    let spec = RecipeSpec::new(ReplaceInvocationWithTemplate::new("java.lang.Integer valueOf(int)", "1"));
    rewrite_run_unchanged(
        &spec,
        "class Test {\n    Integer test() {\n        return Integer.valueOf(\"1\");\n    }\n}\n",
    );
}

/// Adds a method to every class whose body is empty
struct AddGreeting {
    template: JavaTemplate,
}

impl JavaVisitor<ExecutionContext> for AddGreeting {
    fn visit_class_declaration(
        &mut self,
        class: &Arc<ClassDeclaration>,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Result<J> {
        let c = walk_class_declaration(self, class, cursor, ctx)?;
        if !c.body.statements.is_empty() {
            return Ok(J::from(c));
        }
        let coordinates = J::from(c.body.clone()).coordinates().first_statement();
        let root = Cursor::root();
        let parent = cursor.parent().unwrap_or(&root);
        self.template
            .apply_within(&J::from(c), parent, coordinates, &[])
    }
}

fn add_greeting() -> RecipeSpec {
    RecipeSpec::new(to_recipe(|| {
        let template = recast_java::template("/** Says hello. */\nvoid hello() {}")
            .build()
            .expect("greeting template parses");
        Box::new(AddGreeting { template })
    }))
}

#[test]
fn test_method_with_doc_comment_at_first_statement() {
    rewrite_run(
        &add_greeting(),
        "class Test {\n}\n",
        "class Test {\n    /** Says hello. */\n    void hello() {}\n}\n",
    );
}

#[test]
fn test_first_statement_follows_nested_indentation() {
    rewrite_run(
        &add_greeting(),
        "class Outer {\n    void m() {}\n\n    class Inner {\n    }\n}\n",
        "class Outer {\n    void m() {}\n\n    class Inner {\n        /** Says hello. */\n        void hello() {}\n    }\n}\n",
    );
}

#[test]
fn test_template_imports_are_added_to_the_unit() {
    let spec = RecipeSpec::new(ReplaceInvocationWithTemplate::from_options(ReplaceInvocationOptions {
        method_pattern: Some("java.util.Collections emptyList()".to_string()),
        template: Some("new ArrayList<Integer>()".to_string()),
        imports: vec!["java.util.ArrayList".to_string()],
    }));
    rewrite_run(
        &spec,
        r#"package p;

import java.util.Collections;
import java.util.List;

class Test {
    List<Integer> make() {
        return Collections.emptyList();
    }
}
"#,
        r#"package p;

import java.util.ArrayList;
import java.util.Collections;
import java.util.List;

class Test {
    List<Integer> make() {
        return new ArrayList<Integer>();
    }
}
"#,
    );
}

#[test]
fn test_argument_count_mismatch_is_recorded_for_the_unit() {
    let spec = RecipeSpec::new(ReplaceInvocationWithTemplate::new(
        "java.lang.Integer valueOf(int)",
        "#{any(int)} + #{any(int)} + #{any(int)}",
    ))
    .allow_errors();
    let source = "class Test {\n    Integer one() {\n        return Integer.valueOf(1);\n    }\n}\n";
    let run = rewrite_run_unchanged(&spec, source);

    assert_eq!(run.results[0].tree().print(), source);
    assert!(run.warnings.is_empty());
    let errors: Vec<_> = run.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].recipe.as_deref(), Some("recast.java.ReplaceInvocationWithTemplate"));
    assert_eq!(errors[0].kind, ErrorKind::Unit);
    assert!(
        errors[0].message.contains("expects 3 argument(s) but 1 were supplied"),
        "{}",
        errors[0].message
    );
}

/// Tries to put a statement where an expression stands, keeping what went wrong
struct StatementForCall {
    template: JavaTemplate,
    failures: Arc<Mutex<Vec<RecastError>>>,
}

impl JavaVisitor<ExecutionContext> for StatementForCall {
    fn visit_method_invocation(
        &mut self,
        method: &Arc<MethodInvocation>,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Result<J> {
        let m = J::from(walk_method_invocation(self, method, cursor, ctx)?);
        let root = Cursor::root();
        let parent = cursor.parent().unwrap_or(&root);
        match self.template.apply_within(&m, parent, m.coordinates().replace(), &[]) {
            Ok(replaced) => Ok(replaced),
            Err(err) => {
                self.failures.lock().unwrap().push(err);
                Ok(m)
            }
        }
    }
}

#[test]
fn test_statement_at_an_expression_site_is_a_usage_error() {
    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = failures.clone();
    let spec = RecipeSpec::new(to_recipe(move || {
        let template = recast_java::template("return;").build().expect("statement template parses");
        Box::new(StatementForCall {
            template,
            failures: sink.clone(),
        })
    }));
    let source = "class Test {\n    void test() {\n        Integer i;\n        i = Integer.valueOf(1);\n    }\n}\n";
    let run = rewrite_run_unchanged(&spec, source);

    assert_eq!(run.results[0].tree().print(), source);
    assert!(run.errors().next().is_none());
    let failures = failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind(), ErrorKind::Usage);
    assert!(
        matches!(&failures[0], RecastError::IncompatibleCoordinates { site, .. } if site == "replace"),
        "{}",
        failures[0]
    );
}

/// Surrounds the only `work()` call of a method body with two log lines
struct AroundWork {
    before: JavaTemplate,
    after: JavaTemplate,
}

impl JavaVisitor<ExecutionContext> for AroundWork {
    fn visit_block(&mut self, block: &Arc<Block>, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Result<J> {
        let b = walk_block(self, block, cursor, ctx)?;
        let work = match b.statements().collect::<Vec<_>>().as_slice() {
            [only] if only.print_trimmed().starts_with("work(") => (*only).clone(),
            _ => return Ok(J::from(b)),
        };
        let root = Cursor::root();
        let parent = cursor.parent().unwrap_or(&root);
        let with_before = self
            .before
            .apply_within(&J::from(b), parent, work.coordinates().before(), &[])?;
        self.after
            .apply_within(&with_before, parent, work.coordinates().after(), &[])
    }
}

#[test]
fn test_before_and_after_sites_follow_the_statement_indentation() {
    let spec = RecipeSpec::new(to_recipe(|| {
        Box::new(AroundWork {
            before: recast_java::template("System.out.println(\"before\");")
                .build()
                .expect("before template parses"),
            after: recast_java::template("System.out.println(\"after\");")
                .build()
                .expect("after template parses"),
        })
    }));
    let run = rewrite_run(
        &spec,
        r#"class Test {
    void work() {}

    void run() {
        work();
    }
}
"#,
        r#"class Test {
    void work() {}

    void run() {
        System.out.println("before");
        work();
        System.out.println("after");
    }
}
"#,
    );
    assert!(run.warnings.is_empty());
    assert!(run.errors().next().is_none());
}
