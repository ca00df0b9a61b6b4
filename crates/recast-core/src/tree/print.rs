//! Source printer for the lossless tree
//!
//! Printing is a pure concatenation of every node's prefix, its tokens and
//! its children. An unedited tree therefore prints back to the exact text it
//! was parsed from, and an edit only changes the bytes owned by the nodes it
//! replaced.

use super::*;

impl J {
    /// Full source text of this subtree, including its prefix
    pub fn print(&self) -> String {
        let mut printer = Printer::default();
        printer.tree(self);
        printer.out
    }

    /// Source text without the root's prefix
    pub fn print_trimmed(&self) -> String {
        self.with_prefix(Space::EMPTY).print()
    }
}

impl CompilationUnit {
    pub fn print(&self) -> String {
        let mut printer = Printer::default();
        printer.compilation_unit(self);
        printer.out
    }
}

#[derive(Default)]
pub struct Printer {
    out: String,
}

impl Printer {
    pub fn into_string(self) -> String {
        self.out
    }

    fn space(&mut self, space: &Space) {
        self.out.push_str(space.as_str());
    }

    fn token(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub fn tree(&mut self, tree: &J) {
        match tree {
            J::CompilationUnit(n) => self.compilation_unit(n),
            J::Package(n) => self.package(n),
            J::Import(n) => self.import(n),
            J::ClassDeclaration(n) => self.class_declaration(n),
            J::Block(n) => self.block(n),
            J::MethodDeclaration(n) => self.method_declaration(n),
            J::VariableDeclarations(n) => self.variable_declarations(n),
            J::NamedVariable(n) => self.named_variable(n),
            J::Identifier(n) => self.identifier(n),
            J::FieldAccess(n) => self.field_access(n),
            J::MethodInvocation(n) => {
                self.space(&n.prefix);
                if let Some(select) = &n.select {
                    self.tree(&select.element);
                    self.space(&select.after);
                    self.token(".");
                }
                self.identifier(&n.name);
                self.container(&n.arguments, "(", ",", ")");
            }
            J::NewClass(n) => {
                self.space(&n.prefix);
                self.token("new");
                self.tree(&n.clazz);
                self.container(&n.arguments, "(", ",", ")");
                if let Some(body) = &n.body {
                    self.block(body);
                }
            }
            J::Literal(n) => {
                self.space(&n.prefix);
                self.token(&n.value_source);
            }
            J::Assignment(n) => {
                self.space(&n.prefix);
                self.tree(&n.variable);
                self.space(&n.assignment.before);
                self.token("=");
                self.tree(&n.assignment.element);
            }
            J::Binary(n) => {
                self.space(&n.prefix);
                self.tree(&n.left);
                self.space(&n.operator.before);
                self.token(n.operator.element.symbol());
                self.tree(&n.right);
            }
            J::Parentheses(n) => self.parentheses(n),
            J::Lambda(n) => {
                self.space(&n.prefix);
                self.space(&n.parameters.prefix);
                if n.parameters.parenthesized {
                    self.token("(");
                }
                for (i, param) in n.parameters.parameters.iter().enumerate() {
                    if i > 0 {
                        self.token(",");
                    }
                    self.tree(&param.element);
                    self.space(&param.after);
                }
                if n.parameters.parenthesized {
                    self.token(")");
                }
                self.space(&n.arrow);
                self.token("->");
                self.tree(&n.body);
            }
            J::Return(n) => {
                self.space(&n.prefix);
                self.token("return");
                if let Some(expr) = &n.expression {
                    self.tree(expr);
                }
            }
            J::If(n) => {
                self.space(&n.prefix);
                self.token("if");
                self.parentheses(&n.condition);
                self.statement(&n.then_part);
                if let Some(else_part) = &n.else_part {
                    self.space(&else_part.prefix);
                    self.token("else");
                    self.statement(&else_part.body);
                }
            }
            J::Else(n) => {
                self.space(&n.prefix);
                self.token("else");
                self.statement(&n.body);
            }
            J::ParameterizedType(n) => {
                self.space(&n.prefix);
                self.tree(&n.clazz);
                self.container(&n.type_parameters, "<", ",", ">");
            }
            J::ArrayType(n) => {
                self.space(&n.prefix);
                self.tree(&n.element_type);
                self.space(&n.dimension.before);
                self.token("[");
                self.space(&n.dimension.element);
                self.token("]");
            }
            J::Annotation(n) => self.annotation(n),
            J::Empty(n) => self.space(&n.prefix),
            J::Unknown(n) => {
                self.space(&n.prefix);
                self.token(&n.source);
            }
        }
    }

    fn compilation_unit(&mut self, cu: &CompilationUnit) {
        self.space(&cu.prefix);
        if let Some(package) = &cu.package {
            self.package(&package.element);
            self.space(&package.after);
            self.token(";");
        }
        for import in &cu.imports {
            self.import(&import.element);
            self.space(&import.after);
            self.token(";");
        }
        for ty in &cu.types {
            self.tree(ty);
        }
        self.space(&cu.eof);
    }

    fn package(&mut self, package: &Package) {
        self.space(&package.prefix);
        self.token("package");
        self.tree(&package.name);
    }

    fn import(&mut self, import: &Import) {
        self.space(&import.prefix);
        self.token("import");
        if let Some(statik) = &import.statik {
            self.space(statik);
            self.token("static");
        }
        self.field_access(&import.qualid);
    }

    fn class_declaration(&mut self, class: &ClassDeclaration) {
        self.space(&class.prefix);
        for annotation in &class.leading_annotations {
            self.annotation(annotation);
        }
        self.modifiers(&class.modifiers);
        self.space(&class.keyword.prefix);
        self.token(class.keyword.keyword());
        self.identifier(&class.name);
        if let Some(type_parameters) = &class.type_parameters {
            self.container(type_parameters, "<", ",", ">");
        }
        if let Some(extends) = &class.extends {
            self.space(&extends.before);
            self.token("extends");
            self.tree(&extends.element);
        }
        if let Some(implements) = &class.implements {
            let keyword = match class.keyword.kind {
                ClassKind::Interface => "extends",
                _ => "implements",
            };
            self.container(implements, keyword, ",", "");
        }
        self.block(&class.body);
    }

    fn block(&mut self, block: &Block) {
        self.space(&block.prefix);
        self.token("{");
        for statement in &block.statements {
            self.statement(statement);
        }
        self.space(&block.end);
        self.token("}");
    }

    fn statement(&mut self, statement: &RightPadded<J>) {
        self.tree(&statement.element);
        self.space(&statement.after);
        if statement.element.needs_semicolon() {
            self.token(";");
        }
    }

    fn method_declaration(&mut self, method: &MethodDeclaration) {
        self.space(&method.prefix);
        for annotation in &method.leading_annotations {
            self.annotation(annotation);
        }
        self.modifiers(&method.modifiers);
        if let Some(type_parameters) = &method.type_parameters {
            self.container(type_parameters, "<", ",", ">");
        }
        if let Some(return_type) = &method.return_type {
            self.tree(return_type);
        }
        self.identifier(&method.name);
        self.container(&method.parameters, "(", ",", ")");
        if let Some(throws) = &method.throws {
            self.container(throws, "throws", ",", "");
        }
        if let Some(body) = &method.body {
            self.block(body);
        }
    }

    fn variable_declarations(&mut self, decls: &VariableDeclarations) {
        self.space(&decls.prefix);
        for annotation in &decls.leading_annotations {
            self.annotation(annotation);
        }
        self.modifiers(&decls.modifiers);
        if let Some(type_expression) = &decls.type_expression {
            self.tree(type_expression);
        }
        for (i, var) in decls.variables.iter().enumerate() {
            if i > 0 {
                self.token(",");
            }
            self.named_variable(&var.element);
            self.space(&var.after);
        }
    }

    fn named_variable(&mut self, var: &NamedVariable) {
        self.space(&var.prefix);
        self.identifier(&var.name);
        if let Some(init) = &var.initializer {
            self.space(&init.before);
            self.token("=");
            self.tree(&init.element);
        }
    }

    fn identifier(&mut self, ident: &Identifier) {
        self.space(&ident.prefix);
        self.token(&ident.simple_name);
    }

    fn field_access(&mut self, fa: &FieldAccess) {
        self.space(&fa.prefix);
        self.tree(&fa.target);
        self.space(&fa.name.before);
        self.token(".");
        self.identifier(&fa.name.element);
    }

    fn parentheses(&mut self, parens: &Parentheses) {
        self.space(&parens.prefix);
        self.token("(");
        self.tree(&parens.tree.element);
        self.space(&parens.tree.after);
        self.token(")");
    }

    fn annotation(&mut self, annotation: &Annotation) {
        self.space(&annotation.prefix);
        self.token("@");
        self.tree(&annotation.annotation_type);
        if let Some(args) = &annotation.arguments {
            self.container(args, "(", ",", ")");
        }
    }

    fn modifiers(&mut self, modifiers: &[Modifier]) {
        for modifier in modifiers {
            self.space(&modifier.prefix);
            self.token(&modifier.keyword);
        }
    }

    fn container(&mut self, container: &Container<J>, open: &str, separator: &str, close: &str) {
        self.space(&container.before);
        self.token(open);
        for (i, element) in container.elements.iter().enumerate() {
            if i > 0 {
                self.token(separator);
            }
            self.tree(&element.element);
            self.space(&element.after);
        }
        self.token(close);
    }
}
