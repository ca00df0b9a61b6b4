//! ChangeMethodName over declarations, call sites and static imports

use recast_recipes::builtin::change_method_name::ChangeMethodNameOptions;
use recast_recipes::ChangeMethodName;
use recast_test::{RecipeSpec, java, java_after, rewrite_run, rewrite_run_sources};

const B: &str = r#"package com.abc;

public class B {
    public static void singleStatic() {}

    public void singleMethod(String s) {}

    public void singleMethod(int i) {}
}
"#;

const B_RENAMED: &str = r#"package com.abc;

public class B {
    public static void singleStatic() {}

    public void newMethod(String s) {}

    public void singleMethod(int i) {}
}
"#;

#[test]
fn test_renames_declaration_and_invocations() {
    let spec = RecipeSpec::new(ChangeMethodName::new("com.abc.B singleMethod(String)", "newMethod"));
    rewrite_run_sources(
        &spec,
        &[
            java_after(B, B_RENAMED),
            java_after(
                r#"package com.abc;

class A {
    void test(B b) {
        b.singleMethod("boo");
        b.singleMethod(1);
        new B().singleMethod("bar");
    }
}
"#,
                r#"package com.abc;

class A {
    void test(B b) {
        b.newMethod("boo");
        b.singleMethod(1);
        new B().newMethod("bar");
    }
}
"#,
            ),
        ],
    );
}

#[test]
fn test_renames_static_imports() {
    let spec = RecipeSpec::new(ChangeMethodName::new("com.abc.B singleStatic()", "newStatic"));
    rewrite_run_sources(
        &spec,
        &[
            java_after(B, &B.replace("singleStatic", "newStatic")),
            java_after(
                r#"package com.def;

import static com.abc.B.singleStatic;
import static com.abc.B.*;

class A {
    void test() {
        singleStatic();
    }
}
"#,
                r#"package com.def;

import static com.abc.B.newStatic;
import static com.abc.B.*;

class A {
    void test() {
        newStatic();
    }
}
"#,
            ),
        ],
    );
}

#[test]
fn test_overrides_follow_only_when_asked() {
    let c = r#"package com.abc;

class C extends B {
    @Override
    public void singleMethod(String s) {}
}
"#;
    let strict = RecipeSpec::new(ChangeMethodName::new("com.abc.B singleMethod(String)", "newMethod"));
    rewrite_run_sources(&strict, &[java_after(B, B_RENAMED), java(c)]);

    let overrides = RecipeSpec::new(ChangeMethodName::from_options(ChangeMethodNameOptions {
        method_pattern: Some("com.abc.B singleMethod(String)".to_string()),
        new_method_name: Some("newMethod".to_string()),
        match_overrides: true,
    }));
    rewrite_run_sources(
        &overrides,
        &[java_after(B, B_RENAMED), java_after(c, &c.replace("singleMethod", "newMethod"))],
    );
}

#[test]
fn test_comments_and_spacing_survive_a_rename() {
    let spec = RecipeSpec::new(ChangeMethodName::new("java.lang.String valueOf(..)", "copyValueOf"));
    rewrite_run(
        &spec,
        "class A {\n    String s = String . valueOf ( /* c */ 'x' ) ;\n}\n",
        "class A {\n    String s = String . copyValueOf ( /* c */ 'x' ) ;\n}\n",
    );
}
