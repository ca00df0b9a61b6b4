//! Printing a parsed unit reproduces its source byte for byte

use recast_java::{JavaParser, ParseMode, parse_compilation_unit};
use std::path::Path;

const SOURCES: &[&str] = &[
    "class A {}",
    "  \n// leading comment\nclass A {}\n\n",
    r#"package com.example.app;

import java.util.List;
import java.util.*;
import static java.lang.Math.max;

/**
 * Greets people.
 */
@Deprecated
public final class Greeter<T> extends Base implements Runnable, Comparable<Greeter<T>> {
    private static final String PREFIX = "Hello, " ;
    private final List<String> names = new java.util.ArrayList<>();
    int a = 1, b, c = -2;

    public Greeter( String first , List < String > rest ) throws Exception {
        super(first);
        this.names.add(first);
    }

    @Override
    public void run() {
        for (String name : names) {
            System.out.println(PREFIX + name);
        }
        if (names.isEmpty()) return; else { greet( "nobody" ); }
        Runnable r = () -> { };
        java.util.function.Function<String, Integer> len = s -> s.length();
        java.util.function.BiFunction<Integer, Integer, Integer> add = (x, y) -> x + y;
        int m = max(1 , 2) * (3 - 4) / 5 % 6;
        boolean flag = m > 0 && m <= 10 || !names.isEmpty();
        char ch = '\n';
        long big = 0xFFFF_FFFFL;
        double d = 1.5e-3;
    }

    abstract static class Inner { abstract int size(); }

    enum Color { RED, GREEN("g") { }, BLUE; Color() {} Color(String s) {} }

    interface Shape extends Runnable, Comparable<Shape> { double area(); }
}
"#,
    "class Blocks {\n\tvoid m() {\n\t\t{ ; }\n\t\ttry { x(); } catch (Exception e) { y(); } finally { z(); }\n\t\twhile (true) { break; }\n\t\tdo { } while (false);\n\t\tswitch (1) { case 1: break; default: }\n\t}\n}\n",
    "class Text {\n    String s = \"\"\"\n        multi\n        line\n        \"\"\";\n}\n",
    "class CRLF {\r\n    void m() {\r\n        return;\r\n    }\r\n}\r\n",
    "class Unicode { String s = \"héllo wörld\"; /* ünïcode */ }",
    "\u{FEFF}package com.example;\n\nclass Marked {}\n",
];

#[test]
fn test_print_reproduces_source() {
    let parser = JavaParser::builder().lenient(true).build().unwrap();
    for source in SOURCES {
        let cu = parser.parse(source).unwrap_or_else(|e| panic!("failed to parse:\n{source}\n{e}"));
        assert_eq!(cu.print(), *source);
    }
}

#[test]
fn test_reparse_of_printed_tree_is_stable() {
    for source in SOURCES {
        let first = parse_compilation_unit(source, Path::new("A.java"), ParseMode::Lenient).unwrap();
        let printed = first.print();
        let second = parse_compilation_unit(&printed, Path::new("A.java"), ParseMode::Lenient).unwrap();
        assert_eq!(second.print(), printed);
    }
}

#[test]
fn test_strict_mode_keeps_unmodeled_statements_verbatim() {
    let source = SOURCES[3];
    let cu = JavaParser::new().parse(source).unwrap();
    assert_eq!(cu.print(), source);
}

#[test]
fn test_parse_errors_report_location() {
    let err = JavaParser::new().parse("class A {\n    void m() {\n        int = ;\n    }\n}\n").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Source.java"), "{message}");
}

#[test]
fn test_print_trimmed_drops_only_the_root_prefix() {
    let cu = JavaParser::new().parse("class A { }\n\n// c\nclass B { }\n").unwrap();
    let class = cu.classes().nth(1).unwrap();
    let tree = recast_core::tree::J::ClassDeclaration(class.clone());
    assert_eq!(tree.print_trimmed(), "class B { }");
    assert_eq!(tree.print(), "\n\n// c\nclass B { }");
}

#[test]
fn test_byte_order_mark_is_kept_on_the_unit() {
    let source = "\u{FEFF}package com.example;\n\nimport java.util.List;\n\nclass Marked {}\n";
    let cu = JavaParser::new().parse(source).unwrap();
    assert_eq!(cu.print(), source);
    assert_eq!(cu.source_path(), Path::new("com/example/Marked.java"));
    assert_eq!(cu.imports().count(), 1);
}
