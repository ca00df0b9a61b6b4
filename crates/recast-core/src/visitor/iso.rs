//! Kind-preserving visitors
//!
//! Implementing [`JavaIsoVisitor`] gives a [`JavaVisitor`] for free through a
//! blanket impl, so an iso visitor can be handed to anything that runs open
//! visitors (recipes, the scheduler, template splicing).

use std::sync::Arc;

use super::*;
use crate::result::Result;
use crate::tree::*;

pub trait JavaIsoVisitor<P>: Sized {
    fn pre_visit(&mut self, tree: J, _cursor: &Cursor<'_>, _p: &mut P) -> Result<J> {
        Ok(tree)
    }

    fn post_visit(&mut self, tree: J, _cursor: &Cursor<'_>, _p: &mut P) -> Result<J> {
        Ok(tree)
    }

    fn visit_compilation_unit(&mut self, node: &Arc<CompilationUnit>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<CompilationUnit>> {
        walk_compilation_unit(self, node, cursor, p)
    }

    fn visit_package(&mut self, node: &Arc<Package>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Package>> {
        walk_package(self, node, cursor, p)
    }

    fn visit_import(&mut self, node: &Arc<Import>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Import>> {
        walk_import(self, node, cursor, p)
    }

    fn visit_class_declaration(&mut self, node: &Arc<ClassDeclaration>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<ClassDeclaration>> {
        walk_class_declaration(self, node, cursor, p)
    }

    fn visit_block(&mut self, node: &Arc<Block>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Block>> {
        walk_block(self, node, cursor, p)
    }

    fn visit_method_declaration(&mut self, node: &Arc<MethodDeclaration>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<MethodDeclaration>> {
        walk_method_declaration(self, node, cursor, p)
    }

    fn visit_variable_declarations(&mut self, node: &Arc<VariableDeclarations>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<VariableDeclarations>> {
        walk_variable_declarations(self, node, cursor, p)
    }

    fn visit_named_variable(&mut self, node: &Arc<NamedVariable>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<NamedVariable>> {
        walk_named_variable(self, node, cursor, p)
    }

    fn visit_identifier(&mut self, node: &Arc<Identifier>, _cursor: &Cursor<'_>, _p: &mut P) -> Result<Arc<Identifier>> {
        Ok(node.clone())
    }

    fn visit_field_access(&mut self, node: &Arc<FieldAccess>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<FieldAccess>> {
        walk_field_access(self, node, cursor, p)
    }

    fn visit_method_invocation(&mut self, node: &Arc<MethodInvocation>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<MethodInvocation>> {
        walk_method_invocation(self, node, cursor, p)
    }

    fn visit_new_class(&mut self, node: &Arc<NewClass>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<NewClass>> {
        walk_new_class(self, node, cursor, p)
    }

    fn visit_literal(&mut self, node: &Arc<Literal>, _cursor: &Cursor<'_>, _p: &mut P) -> Result<Arc<Literal>> {
        Ok(node.clone())
    }

    fn visit_assignment(&mut self, node: &Arc<Assignment>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Assignment>> {
        walk_assignment(self, node, cursor, p)
    }

    fn visit_binary(&mut self, node: &Arc<Binary>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Binary>> {
        walk_binary(self, node, cursor, p)
    }

    fn visit_parentheses(&mut self, node: &Arc<Parentheses>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Parentheses>> {
        walk_parentheses(self, node, cursor, p)
    }

    fn visit_lambda(&mut self, node: &Arc<Lambda>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Lambda>> {
        walk_lambda(self, node, cursor, p)
    }

    fn visit_return(&mut self, node: &Arc<Return>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Return>> {
        walk_return(self, node, cursor, p)
    }

    fn visit_if(&mut self, node: &Arc<If>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<If>> {
        walk_if(self, node, cursor, p)
    }

    fn visit_else(&mut self, node: &Arc<Else>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Else>> {
        walk_else(self, node, cursor, p)
    }

    fn visit_parameterized_type(&mut self, node: &Arc<ParameterizedType>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<ParameterizedType>> {
        walk_parameterized_type(self, node, cursor, p)
    }

    fn visit_array_type(&mut self, node: &Arc<ArrayType>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<ArrayType>> {
        walk_array_type(self, node, cursor, p)
    }

    fn visit_annotation(&mut self, node: &Arc<Annotation>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Annotation>> {
        walk_annotation(self, node, cursor, p)
    }

    fn visit_empty(&mut self, node: &Arc<Empty>, _cursor: &Cursor<'_>, _p: &mut P) -> Result<Arc<Empty>> {
        Ok(node.clone())
    }

    fn visit_unknown(&mut self, node: &Arc<Unknown>, _cursor: &Cursor<'_>, _p: &mut P) -> Result<Arc<Unknown>> {
        Ok(node.clone())
    }
}

impl<P, V: JavaIsoVisitor<P>> JavaVisitor<P> for V {
    fn pre_visit(&mut self, tree: J, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::pre_visit(self, tree, cursor, p)
    }

    fn post_visit(&mut self, tree: J, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::post_visit(self, tree, cursor, p)
    }

    fn visit_compilation_unit(&mut self, node: &Arc<CompilationUnit>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_compilation_unit(self, node, cursor, p).map(J::from)
    }

    fn visit_package(&mut self, node: &Arc<Package>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_package(self, node, cursor, p).map(J::from)
    }

    fn visit_import(&mut self, node: &Arc<Import>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_import(self, node, cursor, p).map(J::from)
    }

    fn visit_class_declaration(&mut self, node: &Arc<ClassDeclaration>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_class_declaration(self, node, cursor, p).map(J::from)
    }

    fn visit_block(&mut self, node: &Arc<Block>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_block(self, node, cursor, p).map(J::from)
    }

    fn visit_method_declaration(&mut self, node: &Arc<MethodDeclaration>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_method_declaration(self, node, cursor, p).map(J::from)
    }

    fn visit_variable_declarations(&mut self, node: &Arc<VariableDeclarations>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_variable_declarations(self, node, cursor, p).map(J::from)
    }

    fn visit_named_variable(&mut self, node: &Arc<NamedVariable>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_named_variable(self, node, cursor, p).map(J::from)
    }

    fn visit_identifier(&mut self, node: &Arc<Identifier>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_identifier(self, node, cursor, p).map(J::from)
    }

    fn visit_field_access(&mut self, node: &Arc<FieldAccess>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_field_access(self, node, cursor, p).map(J::from)
    }

    fn visit_method_invocation(&mut self, node: &Arc<MethodInvocation>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_method_invocation(self, node, cursor, p).map(J::from)
    }

    fn visit_new_class(&mut self, node: &Arc<NewClass>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_new_class(self, node, cursor, p).map(J::from)
    }

    fn visit_literal(&mut self, node: &Arc<Literal>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_literal(self, node, cursor, p).map(J::from)
    }

    fn visit_assignment(&mut self, node: &Arc<Assignment>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_assignment(self, node, cursor, p).map(J::from)
    }

    fn visit_binary(&mut self, node: &Arc<Binary>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_binary(self, node, cursor, p).map(J::from)
    }

    fn visit_parentheses(&mut self, node: &Arc<Parentheses>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_parentheses(self, node, cursor, p).map(J::from)
    }

    fn visit_lambda(&mut self, node: &Arc<Lambda>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_lambda(self, node, cursor, p).map(J::from)
    }

    fn visit_return(&mut self, node: &Arc<Return>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_return(self, node, cursor, p).map(J::from)
    }

    fn visit_if(&mut self, node: &Arc<If>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_if(self, node, cursor, p).map(J::from)
    }

    fn visit_else(&mut self, node: &Arc<Else>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_else(self, node, cursor, p).map(J::from)
    }

    fn visit_parameterized_type(&mut self, node: &Arc<ParameterizedType>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_parameterized_type(self, node, cursor, p).map(J::from)
    }

    fn visit_array_type(&mut self, node: &Arc<ArrayType>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_array_type(self, node, cursor, p).map(J::from)
    }

    fn visit_annotation(&mut self, node: &Arc<Annotation>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_annotation(self, node, cursor, p).map(J::from)
    }

    fn visit_empty(&mut self, node: &Arc<Empty>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_empty(self, node, cursor, p).map(J::from)
    }

    fn visit_unknown(&mut self, node: &Arc<Unknown>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        JavaIsoVisitor::visit_unknown(self, node, cursor, p).map(J::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts invocations and tags them without changing their kind
    struct TagInvocations {
        seen: usize,
    }

    impl JavaIsoVisitor<()> for TagInvocations {
        fn visit_method_invocation(
            &mut self,
            node: &Arc<MethodInvocation>,
            cursor: &Cursor<'_>,
            p: &mut (),
        ) -> Result<Arc<MethodInvocation>> {
            let node = walk_method_invocation(self, node, cursor, p)?;
            self.seen += 1;
            Ok(Arc::new(
                node.with_markers(node.markers.add_if_absent(Marker::comment("seen"))),
            ))
        }
    }

    #[test]
    fn test_iso_visitor_runs_as_open_visitor() {
        let call = J::from(MethodInvocation {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            select: None,
            name: Arc::new(Identifier::build("run", None)),
            arguments: Container::new(
                Space::EMPTY,
                vec![RightPadded::build(J::from(Empty::build(Space::EMPTY)))],
            ),
            method_type: None,
        });

        let mut visitor = TagInvocations { seen: 0 };
        let result = JavaVisitor::visit(&mut visitor, &call, &Cursor::root(), &mut ()).unwrap();

        assert_eq!(visitor.seen, 1);
        assert_eq!(result.kind(), JKind::MethodInvocation);
        assert_eq!(result.id(), call.id());
        assert_eq!(result.print(), "run()");
        assert!(result.markers().find_first(&MarkerKind::Comment).is_some());
    }
}
