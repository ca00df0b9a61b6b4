//! Cursor-based traversal of the tree
//!
//! [`JavaVisitor`] is the open discipline: every per-kind method returns a
//! [`J`] and may replace a node with a different kind. [`JavaIsoVisitor`]
//! returns the same kind it was given and is automatically a `JavaVisitor`.
//!
//! The default behaviour of every per-kind method is the matching `walk_*`
//! function, which visits the node's children in source order and rebuilds
//! the node only when a child came back as a different `Arc`. Overrides call
//! the `walk_*` function themselves to visit children first.

mod iso;
mod utils;

pub use iso::JavaIsoVisitor;
pub use utils::{RandomizeIds, SearchResult, ShiftIndent, collect, find_first};

use std::sync::Arc;

use crate::error::RecastError;
use crate::result::Result;
use crate::tree::*;

pub trait JavaVisitor<P> {
    /// Entry point for any node; builds the child cursor and dispatches by kind
    fn visit(&mut self, tree: &J, parent: &Cursor<'_>, p: &mut P) -> Result<J> {
        visit_tree(self, tree, parent, p)
    }

    fn pre_visit(&mut self, tree: J, _cursor: &Cursor<'_>, _p: &mut P) -> Result<J> {
        Ok(tree)
    }

    fn post_visit(&mut self, tree: J, _cursor: &Cursor<'_>, _p: &mut P) -> Result<J> {
        Ok(tree)
    }

    fn visit_compilation_unit(&mut self, node: &Arc<CompilationUnit>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_compilation_unit(self, node, cursor, p).map(J::from)
    }

    fn visit_package(&mut self, node: &Arc<Package>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_package(self, node, cursor, p).map(J::from)
    }

    fn visit_import(&mut self, node: &Arc<Import>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_import(self, node, cursor, p).map(J::from)
    }

    fn visit_class_declaration(&mut self, node: &Arc<ClassDeclaration>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_class_declaration(self, node, cursor, p).map(J::from)
    }

    fn visit_block(&mut self, node: &Arc<Block>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_block(self, node, cursor, p).map(J::from)
    }

    fn visit_method_declaration(&mut self, node: &Arc<MethodDeclaration>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_method_declaration(self, node, cursor, p).map(J::from)
    }

    fn visit_variable_declarations(
        &mut self,
        node: &Arc<VariableDeclarations>,
        cursor: &Cursor<'_>,
        p: &mut P,
    ) -> Result<J> {
        walk_variable_declarations(self, node, cursor, p).map(J::from)
    }

    fn visit_named_variable(&mut self, node: &Arc<NamedVariable>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_named_variable(self, node, cursor, p).map(J::from)
    }

    fn visit_identifier(&mut self, node: &Arc<Identifier>, _cursor: &Cursor<'_>, _p: &mut P) -> Result<J> {
        Ok(J::Identifier(node.clone()))
    }

    fn visit_field_access(&mut self, node: &Arc<FieldAccess>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_field_access(self, node, cursor, p).map(J::from)
    }

    fn visit_method_invocation(&mut self, node: &Arc<MethodInvocation>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_method_invocation(self, node, cursor, p).map(J::from)
    }

    fn visit_new_class(&mut self, node: &Arc<NewClass>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_new_class(self, node, cursor, p).map(J::from)
    }

    fn visit_literal(&mut self, node: &Arc<Literal>, _cursor: &Cursor<'_>, _p: &mut P) -> Result<J> {
        Ok(J::Literal(node.clone()))
    }

    fn visit_assignment(&mut self, node: &Arc<Assignment>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_assignment(self, node, cursor, p).map(J::from)
    }

    fn visit_binary(&mut self, node: &Arc<Binary>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_binary(self, node, cursor, p).map(J::from)
    }

    fn visit_parentheses(&mut self, node: &Arc<Parentheses>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_parentheses(self, node, cursor, p).map(J::from)
    }

    fn visit_lambda(&mut self, node: &Arc<Lambda>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_lambda(self, node, cursor, p).map(J::from)
    }

    fn visit_return(&mut self, node: &Arc<Return>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_return(self, node, cursor, p).map(J::from)
    }

    fn visit_if(&mut self, node: &Arc<If>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_if(self, node, cursor, p).map(J::from)
    }

    fn visit_else(&mut self, node: &Arc<Else>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_else(self, node, cursor, p).map(J::from)
    }

    fn visit_parameterized_type(
        &mut self,
        node: &Arc<ParameterizedType>,
        cursor: &Cursor<'_>,
        p: &mut P,
    ) -> Result<J> {
        walk_parameterized_type(self, node, cursor, p).map(J::from)
    }

    fn visit_array_type(&mut self, node: &Arc<ArrayType>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_array_type(self, node, cursor, p).map(J::from)
    }

    fn visit_annotation(&mut self, node: &Arc<Annotation>, cursor: &Cursor<'_>, p: &mut P) -> Result<J> {
        walk_annotation(self, node, cursor, p).map(J::from)
    }

    fn visit_empty(&mut self, node: &Arc<Empty>, _cursor: &Cursor<'_>, _p: &mut P) -> Result<J> {
        Ok(J::Empty(node.clone()))
    }

    fn visit_unknown(&mut self, node: &Arc<Unknown>, _cursor: &Cursor<'_>, _p: &mut P) -> Result<J> {
        Ok(J::Unknown(node.clone()))
    }
}

/// Default body of [`JavaVisitor::visit`]
pub fn visit_tree<V, P>(v: &mut V, tree: &J, parent: &Cursor<'_>, p: &mut P) -> Result<J>
where
    V: JavaVisitor<P> + ?Sized,
{
    let cursor = parent.child(tree);
    let tree = v.pre_visit(tree.clone(), &cursor, p)?;
    let visited = match &tree {
        J::CompilationUnit(n) => v.visit_compilation_unit(n, &cursor, p)?,
        J::Package(n) => v.visit_package(n, &cursor, p)?,
        J::Import(n) => v.visit_import(n, &cursor, p)?,
        J::ClassDeclaration(n) => v.visit_class_declaration(n, &cursor, p)?,
        J::Block(n) => v.visit_block(n, &cursor, p)?,
        J::MethodDeclaration(n) => v.visit_method_declaration(n, &cursor, p)?,
        J::VariableDeclarations(n) => v.visit_variable_declarations(n, &cursor, p)?,
        J::NamedVariable(n) => v.visit_named_variable(n, &cursor, p)?,
        J::Identifier(n) => v.visit_identifier(n, &cursor, p)?,
        J::FieldAccess(n) => v.visit_field_access(n, &cursor, p)?,
        J::MethodInvocation(n) => v.visit_method_invocation(n, &cursor, p)?,
        J::NewClass(n) => v.visit_new_class(n, &cursor, p)?,
        J::Literal(n) => v.visit_literal(n, &cursor, p)?,
        J::Assignment(n) => v.visit_assignment(n, &cursor, p)?,
        J::Binary(n) => v.visit_binary(n, &cursor, p)?,
        J::Parentheses(n) => v.visit_parentheses(n, &cursor, p)?,
        J::Lambda(n) => v.visit_lambda(n, &cursor, p)?,
        J::Return(n) => v.visit_return(n, &cursor, p)?,
        J::If(n) => v.visit_if(n, &cursor, p)?,
        J::Else(n) => v.visit_else(n, &cursor, p)?,
        J::ParameterizedType(n) => v.visit_parameterized_type(n, &cursor, p)?,
        J::ArrayType(n) => v.visit_array_type(n, &cursor, p)?,
        J::Annotation(n) => v.visit_annotation(n, &cursor, p)?,
        J::Empty(n) => v.visit_empty(n, &cursor, p)?,
        J::Unknown(n) => v.visit_unknown(n, &cursor, p)?,
    };
    v.post_visit(visited, &cursor, p)
}

/// Pointer identity across the shapes children are stored in
trait Shared {
    fn same(&self, other: &Self) -> bool;
}

impl Shared for J {
    fn same(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Shared for Arc<T> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: Shared> Shared for Option<T> {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Shared> Shared for Vec<T> {
    fn same(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.same(b))
    }
}

impl<T: Shared> Shared for RightPadded<T> {
    fn same(&self, other: &Self) -> bool {
        self.element.same(&other.element)
    }
}

impl<T: Shared> Shared for LeftPadded<T> {
    fn same(&self, other: &Self) -> bool {
        self.element.same(&other.element)
    }
}

impl<T: Shared> Shared for Container<T> {
    fn same(&self, other: &Self) -> bool {
        self.elements.same(&other.elements)
    }
}

impl Shared for LambdaParameters {
    fn same(&self, other: &Self) -> bool {
        self.parameters.same(&other.parameters)
    }
}

/// Return the original node when every visited child is pointer-equal
macro_rules! rebuild {
    ($node:ident, $kind:ident { $($field:ident),* $(,)? }) => {
        if true $(&& $field.same(&$node.$field))* {
            Ok($node.clone())
        } else {
            Ok(Arc::new($kind {
                $($field,)*
                ..(**$node).clone()
            }))
        }
    };
}

fn visit_typed<V, P, K>(v: &mut V, node: &Arc<K>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<K>>
where
    V: JavaVisitor<P> + ?Sized,
    K: TreeKind,
{
    let visited = v.visit(&K::wrap(node.clone()), cursor, p)?;
    match K::cast(&visited) {
        Some(n) => Ok(n.clone()),
        None => Err(RecastError::UnexpectedKind {
            expected: K::KIND,
            actual: visited.kind(),
        }),
    }
}

fn visit_option<V, P>(v: &mut V, tree: &Option<J>, cursor: &Cursor<'_>, p: &mut P) -> Result<Option<J>>
where
    V: JavaVisitor<P> + ?Sized,
{
    tree.as_ref().map(|t| v.visit(t, cursor, p)).transpose()
}

fn visit_right_padded<V, P>(
    v: &mut V,
    rp: &RightPadded<J>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<RightPadded<J>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let element = v.visit(&rp.element, cursor, p)?;
    if element.ptr_eq(&rp.element) {
        return Ok(rp.clone());
    }
    Ok(rp.with_element(element))
}

fn visit_left_padded<V, P>(v: &mut V, lp: &LeftPadded<J>, cursor: &Cursor<'_>, p: &mut P) -> Result<LeftPadded<J>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let element = v.visit(&lp.element, cursor, p)?;
    Ok(lp.with_element(element))
}

fn visit_statements<V, P>(
    v: &mut V,
    statements: &[RightPadded<J>],
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<Vec<RightPadded<J>>>
where
    V: JavaVisitor<P> + ?Sized,
{
    statements
        .iter()
        .map(|s| visit_right_padded(v, s, cursor, p))
        .collect()
}

fn visit_container<V, P>(v: &mut V, container: &Container<J>, cursor: &Cursor<'_>, p: &mut P) -> Result<Container<J>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let elements = visit_statements(v, &container.elements, cursor, p)?;
    Ok(container.with_elements(elements))
}

fn visit_container_option<V, P>(
    v: &mut V,
    container: &Option<Container<J>>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<Option<Container<J>>>
where
    V: JavaVisitor<P> + ?Sized,
{
    container
        .as_ref()
        .map(|c| visit_container(v, c, cursor, p))
        .transpose()
}

fn visit_typed_list<V, P, K>(v: &mut V, nodes: &[Arc<K>], cursor: &Cursor<'_>, p: &mut P) -> Result<Vec<Arc<K>>>
where
    V: JavaVisitor<P> + ?Sized,
    K: TreeKind,
{
    nodes.iter().map(|n| visit_typed(v, n, cursor, p)).collect()
}

fn visit_typed_padded<V, P, K>(
    v: &mut V,
    rp: &RightPadded<Arc<K>>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<RightPadded<Arc<K>>>
where
    V: JavaVisitor<P> + ?Sized,
    K: TreeKind,
{
    let element = visit_typed(v, &rp.element, cursor, p)?;
    Ok(rp.with_element(element))
}

pub fn walk_compilation_unit<V, P>(
    v: &mut V,
    node: &Arc<CompilationUnit>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<Arc<CompilationUnit>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let package = node
        .package
        .as_ref()
        .map(|pkg| visit_typed_padded(v, pkg, cursor, p))
        .transpose()?;
    let imports = node
        .imports
        .iter()
        .map(|i| visit_typed_padded(v, i, cursor, p))
        .collect::<Result<Vec<_>>>()?;
    let types = node
        .types
        .iter()
        .map(|t| v.visit(t, cursor, p))
        .collect::<Result<Vec<_>>>()?;
    rebuild!(node, CompilationUnit { package, imports, types })
}

pub fn walk_package<V, P>(v: &mut V, node: &Arc<Package>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Package>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let name = v.visit(&node.name, cursor, p)?;
    rebuild!(node, Package { name })
}

pub fn walk_import<V, P>(v: &mut V, node: &Arc<Import>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Import>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let qualid = visit_typed(v, &node.qualid, cursor, p)?;
    rebuild!(node, Import { qualid })
}

pub fn walk_class_declaration<V, P>(
    v: &mut V,
    node: &Arc<ClassDeclaration>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<Arc<ClassDeclaration>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let leading_annotations = visit_typed_list(v, &node.leading_annotations, cursor, p)?;
    let name = visit_typed(v, &node.name, cursor, p)?;
    let type_parameters = visit_container_option(v, &node.type_parameters, cursor, p)?;
    let extends = node
        .extends
        .as_ref()
        .map(|e| visit_left_padded(v, e, cursor, p))
        .transpose()?;
    let implements = visit_container_option(v, &node.implements, cursor, p)?;
    let body = visit_typed(v, &node.body, cursor, p)?;
    rebuild!(
        node,
        ClassDeclaration {
            leading_annotations,
            name,
            type_parameters,
            extends,
            implements,
            body
        }
    )
}

pub fn walk_block<V, P>(v: &mut V, node: &Arc<Block>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Block>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let statements = visit_statements(v, &node.statements, cursor, p)?;
    rebuild!(node, Block { statements })
}

pub fn walk_method_declaration<V, P>(
    v: &mut V,
    node: &Arc<MethodDeclaration>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<Arc<MethodDeclaration>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let leading_annotations = visit_typed_list(v, &node.leading_annotations, cursor, p)?;
    let type_parameters = visit_container_option(v, &node.type_parameters, cursor, p)?;
    let return_type = visit_option(v, &node.return_type, cursor, p)?;
    let name = visit_typed(v, &node.name, cursor, p)?;
    let parameters = visit_container(v, &node.parameters, cursor, p)?;
    let throws = visit_container_option(v, &node.throws, cursor, p)?;
    let body = node
        .body
        .as_ref()
        .map(|b| visit_typed(v, b, cursor, p))
        .transpose()?;
    rebuild!(
        node,
        MethodDeclaration {
            leading_annotations,
            type_parameters,
            return_type,
            name,
            parameters,
            throws,
            body
        }
    )
}

pub fn walk_variable_declarations<V, P>(
    v: &mut V,
    node: &Arc<VariableDeclarations>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<Arc<VariableDeclarations>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let leading_annotations = visit_typed_list(v, &node.leading_annotations, cursor, p)?;
    let type_expression = visit_option(v, &node.type_expression, cursor, p)?;
    let variables = node
        .variables
        .iter()
        .map(|var| visit_typed_padded(v, var, cursor, p))
        .collect::<Result<Vec<_>>>()?;
    rebuild!(
        node,
        VariableDeclarations {
            leading_annotations,
            type_expression,
            variables
        }
    )
}

pub fn walk_named_variable<V, P>(
    v: &mut V,
    node: &Arc<NamedVariable>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<Arc<NamedVariable>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let name = visit_typed(v, &node.name, cursor, p)?;
    let initializer = node
        .initializer
        .as_ref()
        .map(|i| visit_left_padded(v, i, cursor, p))
        .transpose()?;
    rebuild!(node, NamedVariable { name, initializer })
}

pub fn walk_field_access<V, P>(
    v: &mut V,
    node: &Arc<FieldAccess>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<Arc<FieldAccess>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let target = v.visit(&node.target, cursor, p)?;
    let name = node
        .name
        .with_element(visit_typed(v, &node.name.element, cursor, p)?);
    rebuild!(node, FieldAccess { target, name })
}

pub fn walk_method_invocation<V, P>(
    v: &mut V,
    node: &Arc<MethodInvocation>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<Arc<MethodInvocation>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let select = node
        .select
        .as_ref()
        .map(|s| visit_right_padded(v, s, cursor, p))
        .transpose()?;
    let name = visit_typed(v, &node.name, cursor, p)?;
    let arguments = visit_container(v, &node.arguments, cursor, p)?;
    rebuild!(node, MethodInvocation { select, name, arguments })
}

pub fn walk_new_class<V, P>(v: &mut V, node: &Arc<NewClass>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<NewClass>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let clazz = v.visit(&node.clazz, cursor, p)?;
    let arguments = visit_container(v, &node.arguments, cursor, p)?;
    let body = node
        .body
        .as_ref()
        .map(|b| visit_typed(v, b, cursor, p))
        .transpose()?;
    rebuild!(node, NewClass { clazz, arguments, body })
}

pub fn walk_assignment<V, P>(
    v: &mut V,
    node: &Arc<Assignment>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<Arc<Assignment>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let variable = v.visit(&node.variable, cursor, p)?;
    let assignment = visit_left_padded(v, &node.assignment, cursor, p)?;
    rebuild!(node, Assignment { variable, assignment })
}

pub fn walk_binary<V, P>(v: &mut V, node: &Arc<Binary>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Binary>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let left = v.visit(&node.left, cursor, p)?;
    let right = v.visit(&node.right, cursor, p)?;
    rebuild!(node, Binary { left, right })
}

pub fn walk_parentheses<V, P>(
    v: &mut V,
    node: &Arc<Parentheses>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<Arc<Parentheses>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let tree = visit_right_padded(v, &node.tree, cursor, p)?;
    rebuild!(node, Parentheses { tree })
}

pub fn walk_lambda<V, P>(v: &mut V, node: &Arc<Lambda>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Lambda>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let parameters = LambdaParameters {
        parameters: visit_statements(v, &node.parameters.parameters, cursor, p)?,
        ..node.parameters.clone()
    };
    let body = v.visit(&node.body, cursor, p)?;
    rebuild!(node, Lambda { parameters, body })
}

pub fn walk_return<V, P>(v: &mut V, node: &Arc<Return>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Return>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let expression = visit_option(v, &node.expression, cursor, p)?;
    rebuild!(node, Return { expression })
}

pub fn walk_if<V, P>(v: &mut V, node: &Arc<If>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<If>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let condition = visit_typed(v, &node.condition, cursor, p)?;
    let then_part = visit_right_padded(v, &node.then_part, cursor, p)?;
    let else_part = node
        .else_part
        .as_ref()
        .map(|e| visit_typed(v, e, cursor, p))
        .transpose()?;
    rebuild!(node, If { condition, then_part, else_part })
}

pub fn walk_else<V, P>(v: &mut V, node: &Arc<Else>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Else>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let body = visit_right_padded(v, &node.body, cursor, p)?;
    rebuild!(node, Else { body })
}

pub fn walk_parameterized_type<V, P>(
    v: &mut V,
    node: &Arc<ParameterizedType>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<Arc<ParameterizedType>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let clazz = v.visit(&node.clazz, cursor, p)?;
    let type_parameters = visit_container(v, &node.type_parameters, cursor, p)?;
    rebuild!(node, ParameterizedType { clazz, type_parameters })
}

pub fn walk_array_type<V, P>(
    v: &mut V,
    node: &Arc<ArrayType>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<Arc<ArrayType>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let element_type = v.visit(&node.element_type, cursor, p)?;
    rebuild!(node, ArrayType { element_type })
}

pub fn walk_annotation<V, P>(
    v: &mut V,
    node: &Arc<Annotation>,
    cursor: &Cursor<'_>,
    p: &mut P,
) -> Result<Arc<Annotation>>
where
    V: JavaVisitor<P> + ?Sized,
{
    let annotation_type = v.visit(&node.annotation_type, cursor, p)?;
    let arguments = visit_container_option(v, &node.arguments, cursor, p)?;
    rebuild!(node, Annotation { annotation_type, arguments })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RenameX;

    impl JavaVisitor<usize> for RenameX {
        fn visit_identifier(&mut self, node: &Arc<Identifier>, _cursor: &Cursor<'_>, count: &mut usize) -> Result<J> {
            *count += 1;
            if node.simple_name == "x" {
                Ok(J::from(node.with_simple_name("y")))
            } else {
                Ok(J::Identifier(node.clone()))
            }
        }
    }

    struct NameToLiteral;

    impl JavaVisitor<()> for NameToLiteral {
        fn visit_identifier(&mut self, _node: &Arc<Identifier>, _cursor: &Cursor<'_>, _p: &mut ()) -> Result<J> {
            Ok(J::from(Literal::int(0)))
        }
    }

    fn field_access(target: &str, name: &str) -> J {
        J::from(FieldAccess {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            target: J::from(Identifier::build(target, None)),
            name: LeftPadded::new(Space::EMPTY, Arc::new(Identifier::build(name, None))),
            ty: None,
        })
    }

    #[test]
    fn test_unchanged_tree_is_pointer_equal() {
        let tree = field_access("a", "b");
        let mut count = 0;
        let result = RenameX.visit(&tree, &Cursor::root(), &mut count).unwrap();
        assert!(result.ptr_eq(&tree));
        assert_eq!(count, 2);
    }

    #[test]
    fn test_changed_child_rebuilds_parent_with_same_identity() {
        let tree = field_access("x", "b");
        let mut count = 0;
        let result = RenameX.visit(&tree, &Cursor::root(), &mut count).unwrap();
        assert!(!result.ptr_eq(&tree));
        assert_eq!(result.id(), tree.id());
        assert_eq!(result.print(), "y.b");
    }

    #[test]
    fn test_wrong_kind_in_typed_slot_is_an_error() {
        let tree = field_access("a", "b");
        let err = NameToLiteral.visit(&tree, &Cursor::root(), &mut ()).unwrap_err();
        assert!(matches!(
            err,
            RecastError::UnexpectedKind {
                expected: JKind::Identifier,
                actual: JKind::Literal
            }
        ));
    }
}
