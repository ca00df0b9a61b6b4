//! Type attribution of a parsed compilation unit
//!
//! A single visitor pass resolves names against the lexical scopes it walks
//! through and the [`TypeTable`], and records the result on identifiers,
//! declarations, invocations and other expressions. Whatever cannot be
//! resolved is left unattributed, which matchers treat as "no match".

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::trace;

use recast_core::result::Result;
use recast_core::tree::*;
use recast_core::visitor::*;

use crate::classpath::{NameScope, TypeTable, type_parameter_names};

/// Attribute `cu` against `table`, which must include the unit's own declarations
pub fn attribute(cu: Arc<CompilationUnit>, table: &TypeTable) -> Result<Arc<CompilationUnit>> {
    let mut attributor = Attributor {
        table,
        names: NameScope::of(&cu),
        scopes: Vec::new(),
        enclosing: Vec::new(),
        type_vars: Vec::new(),
        declaring: Vec::new(),
        expected_lambda: None,
        lambda_parameters: VecDeque::new(),
    };
    let tree = attributor.visit(&J::CompilationUnit(cu), &Cursor::root(), &mut ())?;
    Arc::<CompilationUnit>::try_from(tree)
}

struct Attributor<'t> {
    table: &'t TypeTable,
    names: NameScope,
    /// Local variables, innermost scope last
    scopes: Vec<HashMap<String, JavaType>>,
    /// Enclosing classes, innermost first
    enclosing: Vec<String>,
    type_vars: Vec<String>,
    /// Declared type of the variable declarations being visited
    declaring: Vec<JavaType>,
    /// Target type for the lambda about to be visited
    expected_lambda: Option<JavaType>,
    /// Types for the untyped lambda parameters about to be visited
    lambda_parameters: VecDeque<JavaType>,
}

impl Attributor<'_> {
    fn resolve_type(&self, expr: &J) -> JavaType {
        self.table
            .resolve_type_expr(expr, &self.names, &self.enclosing, &self.type_vars)
    }

    fn class(&self, fqn: &str) -> JavaType {
        JavaType::Class(self.table.class_type_or_stub(fqn))
    }

    fn declare(&mut self, name: &str, ty: JavaType) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), ty);
        }
    }

    fn variable(&self, name: &str) -> Option<JavaType> {
        self.scopes.iter().rev().find_map(|s| s.get(name).cloned())
    }

    /// Type of a simple name used as an expression or type
    fn resolve_name(&self, name: &str) -> Option<JavaType> {
        match name {
            "this" => return self.enclosing.first().map(|c| self.class(c)),
            "super" => {
                let current = self.enclosing.first()?;
                let sup = self.table.class_type_or_stub(current).supertype.clone()?;
                return Some(JavaType::Class(sup));
            }
            _ => {}
        }
        if let Some(primitive) = Primitive::from_keyword(name) {
            return Some(JavaType::Primitive(primitive));
        }
        if let Some(ty) = self.variable(name) {
            return Some(ty);
        }
        if let Some((_, ty)) = self.enclosing.iter().find_map(|c| self.table.field(c, name)) {
            return Some(ty);
        }
        if let Some((_, ty)) = self
            .names
            .static_imports
            .iter()
            .filter(|(_, member)| member == name || member == "*")
            .find_map(|(owner, _)| self.table.field(owner, name))
        {
            return Some(ty);
        }
        if self.type_vars.iter().any(|v| v == name) {
            return Some(JavaType::GenericTypeVariable(name.to_string()));
        }
        self.table
            .resolve_class_name(name, &self.names, &self.enclosing)
            .map(|fqn| self.class(&fqn))
    }

    /// Methods an unqualified call to `name` may refer to
    fn unqualified_candidates(&self, name: &str) -> Vec<Arc<MethodType>> {
        match name {
            "this" => {
                return self
                    .enclosing
                    .first()
                    .map(|c| self.table.constructors(c))
                    .unwrap_or_default();
            }
            "super" => {
                return self
                    .enclosing
                    .first()
                    .and_then(|c| self.table.class_type_or_stub(c).supertype.clone())
                    .map(|s| self.table.constructors(&s.fully_qualified_name))
                    .unwrap_or_default();
            }
            _ => {}
        }
        for class in &self.enclosing {
            let methods = self.table.methods_named(class, name);
            if !methods.is_empty() {
                return methods;
            }
        }
        self.names
            .static_imports
            .iter()
            .filter(|(_, member)| member == name || member == "*")
            .flat_map(|(owner, _)| self.table.methods_named(owner, name))
            .filter(|m| m.is_static)
            .collect()
    }

    fn boxed(&self, ty: &JavaType) -> JavaType {
        match ty {
            JavaType::Primitive(p) => match p.boxed() {
                Some(fqn) => self.class(fqn),
                None => JavaType::Unknown,
            },
            other => other.clone(),
        }
    }

    /// Copy of `method` whose return type has its type variables bound
    fn specialize(&self, method: &Arc<MethodType>, receiver: Option<&JavaType>, args: &[JavaType]) -> Arc<MethodType> {
        let mut bindings = receiver
            .map(|r| receiver_bindings(r, &method.declaring_type))
            .unwrap_or_default();
        for (param, arg) in method.parameter_types.iter().zip(args) {
            if let JavaType::GenericTypeVariable(var) = param
                && !bindings.contains_key(var)
                && !matches!(arg, JavaType::Unknown | JavaType::Primitive(Primitive::Null))
            {
                bindings.insert(var.clone(), self.boxed(arg));
            }
        }
        if bindings.is_empty() {
            return method.clone();
        }
        let return_type = substitute(&method.return_type, &bindings);
        if return_type == method.return_type {
            return method.clone();
        }
        Arc::new(MethodType {
            return_type,
            ..(**method).clone()
        })
    }

    /// Parameter types of the single abstract method of a functional interface
    fn lambda_parameter_types(&self, target: &JavaType, arity: usize) -> Vec<JavaType> {
        let Some(info) = target
            .class_type()
            .and_then(|c| self.table.class(&c.fully_qualified_name))
        else {
            return Vec::new();
        };
        if info.class_type.kind != ClassKind::Interface {
            return Vec::new();
        }
        let abstract_methods: Vec<&Arc<MethodType>> = info.methods.iter().filter(|m| !m.is_static).collect();
        let [method] = abstract_methods.as_slice() else {
            return Vec::new();
        };
        if method.parameter_types.len() != arity {
            return Vec::new();
        }
        let bindings = receiver_bindings(target, &method.declaring_type);
        method
            .parameter_types
            .iter()
            .map(|t| substitute(t, &bindings))
            .collect()
    }

    fn binary_type(&self, binary: &Binary) -> Option<JavaType> {
        use BinaryOperator::*;
        match binary.operator.element {
            LessThan | GreaterThan | LessThanOrEqual | GreaterThanOrEqual | Equal | NotEqual | And | Or => {
                Some(JavaType::Primitive(Primitive::Boolean))
            }
            op => {
                let left = binary.left.java_type()?;
                let right = binary.right.java_type()?;
                let is_string = |t: &JavaType| t.erased_name().as_deref() == Some("java.lang.String");
                if op == Addition && (is_string(&left) || is_string(&right)) {
                    return Some(JavaType::Primitive(Primitive::String));
                }
                Some(JavaType::Primitive(promote(unboxed(&left)?, unboxed(&right)?)))
            }
        }
    }
}

impl JavaVisitor<()> for Attributor<'_> {
    fn visit_package(&mut self, node: &Arc<Package>, _cursor: &Cursor<'_>, _p: &mut ()) -> Result<J> {
        Ok(J::Package(node.clone()))
    }

    fn visit_import(&mut self, node: &Arc<Import>, _cursor: &Cursor<'_>, _p: &mut ()) -> Result<J> {
        Ok(J::Import(node.clone()))
    }

    fn visit_class_declaration(&mut self, node: &Arc<ClassDeclaration>, cursor: &Cursor<'_>, p: &mut ()) -> Result<J> {
        let class_type = match self.table.declared_class(node.id) {
            Some(declared) => declared.clone(),
            None => {
                let fqn = match self.enclosing.first() {
                    Some(outer) => format!("{outer}.{}", node.simple_name()),
                    None => node.simple_name().to_string(),
                };
                Arc::new(ClassType::new(fqn, node.keyword.kind))
            }
        };

        let type_var_mark = self.type_vars.len();
        self.type_vars.extend(node.type_parameter_names());
        self.enclosing.insert(0, class_type.fully_qualified_name.clone());
        let walked = walk_class_declaration(self, node, cursor, p);
        self.enclosing.remove(0);
        self.type_vars.truncate(type_var_mark);
        let walked = walked?;

        let ty = Some(JavaType::Class(class_type));
        Ok(J::from(ClassDeclaration {
            name: Arc::new(walked.name.with_type(ty.clone())),
            class_type: ty,
            ..(*walked).clone()
        }))
    }

    fn visit_block(&mut self, node: &Arc<Block>, cursor: &Cursor<'_>, p: &mut ()) -> Result<J> {
        self.scopes.push(HashMap::new());
        let walked = walk_block(self, node, cursor, p);
        self.scopes.pop();
        walked.map(J::from)
    }

    fn visit_method_declaration(&mut self, node: &Arc<MethodDeclaration>, cursor: &Cursor<'_>, p: &mut ()) -> Result<J> {
        let type_var_mark = self.type_vars.len();
        self.type_vars
            .extend(type_parameter_names(node.type_parameters.as_ref()));
        self.scopes.push(HashMap::new());
        let walked = walk_method_declaration(self, node, cursor, p);
        self.scopes.pop();
        self.type_vars.truncate(type_var_mark);
        let walked = walked?;

        let method_type = self.table.declared_method(node.id).cloned();
        Ok(J::from(MethodDeclaration {
            name: Arc::new(walked.name.with_type(method_type.clone().map(JavaType::Method))),
            method_type,
            ..(*walked).clone()
        }))
    }

    fn visit_variable_declarations(
        &mut self,
        node: &Arc<VariableDeclarations>,
        cursor: &Cursor<'_>,
        p: &mut (),
    ) -> Result<J> {
        let declared = match &node.type_expression {
            Some(expr) => self.resolve_type(expr),
            None => self.lambda_parameters.pop_front().unwrap_or(JavaType::Unknown),
        };
        self.declaring.push(declared.clone());
        let walked = walk_variable_declarations(self, node, cursor, p);
        self.declaring.pop();
        let walked = walked?;

        let mut variables = Vec::with_capacity(walked.variables.len());
        for padded in &walked.variables {
            let variable = &padded.element;
            let ty = match (&declared, &variable.initializer) {
                (JavaType::Unknown, Some(init)) => init.element.java_type().unwrap_or(JavaType::Unknown),
                _ => declared.clone(),
            };
            self.declare(variable.simple_name(), ty.clone());
            let typed = NamedVariable {
                name: Arc::new(variable.name.with_type(Some(ty.clone()))),
                variable_type: Some(ty),
                ..(**variable).clone()
            };
            variables.push(padded.with_element(Arc::new(typed)));
        }
        Ok(J::from(walked.with_variables(variables)))
    }

    fn visit_named_variable(&mut self, node: &Arc<NamedVariable>, cursor: &Cursor<'_>, p: &mut ()) -> Result<J> {
        if let Some(init) = &node.initializer
            && matches!(init.element, J::Lambda(_))
        {
            self.expected_lambda = self.declaring.last().cloned();
        }
        walk_named_variable(self, node, cursor, p).map(J::from)
    }

    fn visit_identifier(&mut self, node: &Arc<Identifier>, cursor: &Cursor<'_>, _p: &mut ()) -> Result<J> {
        if names_a_member(node, cursor) {
            return Ok(J::Identifier(node.clone()));
        }
        match self.resolve_name(&node.simple_name) {
            Some(ty) => Ok(J::from(node.with_type(Some(ty)))),
            None => Ok(J::Identifier(node.clone())),
        }
    }

    fn visit_field_access(&mut self, node: &Arc<FieldAccess>, cursor: &Cursor<'_>, p: &mut ()) -> Result<J> {
        let walked = walk_field_access(self, node, cursor, p)?;
        let name = walked.simple_name();
        let ty = match walked.target.java_type() {
            Some(JavaType::Array(_)) if name == "length" => Some(JavaType::Primitive(Primitive::Int)),
            Some(target) => target
                .erased_name()
                .filter(|_| target.is_reference())
                .and_then(|owner| self.table.field(&owner, name))
                .map(|(_, ty)| ty),
            None => None,
        }
        .or_else(|| {
            let qualified = qualified_name(&J::FieldAccess(walked.clone()))?;
            let fqn = self
                .table
                .resolve_class_name(&qualified, &self.names, &self.enclosing)?;
            Some(self.class(&fqn))
        });

        Ok(J::from(FieldAccess {
            name: walked
                .name
                .with_element(Arc::new(walked.name.element.with_type(ty.clone()))),
            ty,
            ..(*walked).clone()
        }))
    }

    fn visit_method_invocation(&mut self, node: &Arc<MethodInvocation>, cursor: &Cursor<'_>, p: &mut ()) -> Result<J> {
        let walked = walk_method_invocation(self, node, cursor, p)?;
        let args: Vec<JavaType> = walked
            .arguments()
            .map(|a| a.java_type().unwrap_or(JavaType::Unknown))
            .collect();

        let receiver = walked
            .select
            .as_ref()
            .and_then(|s| s.element.java_type())
            .map(|t| match t {
                JavaType::GenericTypeVariable(_) => self.class("java.lang.Object"),
                other => other,
            });
        let candidates = match (&walked.select, &receiver) {
            (Some(_), Some(receiver)) if receiver.is_reference() => receiver
                .erased_name()
                .map(|owner| self.table.methods_named(&owner, walked.simple_name()))
                .unwrap_or_default(),
            (Some(_), _) => Vec::new(),
            (None, _) => self.unqualified_candidates(walked.simple_name()),
        };

        let method_type = select_overload(&candidates, &args).map(|m| self.specialize(&m, receiver.as_ref(), &args));
        if method_type.is_none() {
            trace!(name = walked.simple_name(), candidates = candidates.len(), "unresolved method invocation");
        }
        Ok(J::from(MethodInvocation {
            name: Arc::new(walked.name.with_type(method_type.clone().map(JavaType::Method))),
            method_type,
            ..(*walked).clone()
        }))
    }

    fn visit_new_class(&mut self, node: &Arc<NewClass>, cursor: &Cursor<'_>, p: &mut ()) -> Result<J> {
        let walked = walk_new_class(self, node, cursor, p)?;
        let ty = walked.clazz.java_type();
        let args: Vec<JavaType> = walked
            .arguments()
            .map(|a| a.java_type().unwrap_or(JavaType::Unknown))
            .collect();
        let constructor_type = ty
            .as_ref()
            .and_then(JavaType::class_type)
            .map(|c| self.table.constructors(&c.fully_qualified_name))
            .and_then(|candidates| select_overload(&candidates, &args));

        Ok(J::from(NewClass {
            constructor_type,
            ty,
            ..(*walked).clone()
        }))
    }

    fn visit_assignment(&mut self, node: &Arc<Assignment>, cursor: &Cursor<'_>, p: &mut ()) -> Result<J> {
        if matches!(node.assignment.element, J::Lambda(_)) {
            self.expected_lambda = qualified_name(&node.variable)
                .filter(|n| !n.contains('.'))
                .and_then(|n| self.variable(&n));
        }
        let walked = walk_assignment(self, node, cursor, p)?;
        Ok(J::from(Assignment {
            ty: walked.variable.java_type(),
            ..(*walked).clone()
        }))
    }

    fn visit_binary(&mut self, node: &Arc<Binary>, cursor: &Cursor<'_>, p: &mut ()) -> Result<J> {
        let walked = walk_binary(self, node, cursor, p)?;
        Ok(J::from(Binary {
            ty: self.binary_type(&walked),
            ..(*walked).clone()
        }))
    }

    fn visit_lambda(&mut self, node: &Arc<Lambda>, cursor: &Cursor<'_>, p: &mut ()) -> Result<J> {
        let target = self.expected_lambda.take();
        let arity = node
            .parameters
            .parameters
            .iter()
            .filter(|param| matches!(param.element, J::VariableDeclarations(_)))
            .count();
        let parameter_types = target
            .as_ref()
            .map(|t| self.lambda_parameter_types(t, arity))
            .unwrap_or_default();

        let saved = std::mem::replace(&mut self.lambda_parameters, parameter_types.into());
        self.scopes.push(HashMap::new());
        let walked = walk_lambda(self, node, cursor, p);
        self.scopes.pop();
        self.lambda_parameters = saved;
        let walked = walked?;

        Ok(J::from(Lambda {
            ty: target,
            ..(*walked).clone()
        }))
    }

    fn visit_parameterized_type(
        &mut self,
        node: &Arc<ParameterizedType>,
        cursor: &Cursor<'_>,
        p: &mut (),
    ) -> Result<J> {
        let walked = walk_parameterized_type(self, node, cursor, p)?;
        let ty = self.resolve_type(&J::ParameterizedType(walked.clone()));
        Ok(J::from(ParameterizedType {
            ty: (ty != JavaType::Unknown).then_some(ty),
            ..(*walked).clone()
        }))
    }

    fn visit_array_type(&mut self, node: &Arc<ArrayType>, cursor: &Cursor<'_>, p: &mut ()) -> Result<J> {
        let walked = walk_array_type(self, node, cursor, p)?;
        let ty = self.resolve_type(&J::ArrayType(walked.clone()));
        Ok(J::from(ArrayType {
            ty: Some(ty),
            ..(*walked).clone()
        }))
    }
}

/// Declared names and member selectors are typed by their owner, not by lookup
fn names_a_member(node: &Identifier, cursor: &Cursor<'_>) -> bool {
    match cursor.parent_value() {
        Some(J::ClassDeclaration(c)) => c.name.id == node.id,
        Some(J::MethodDeclaration(m)) => m.name.id == node.id,
        Some(J::NamedVariable(v)) => v.name.id == node.id,
        Some(J::MethodInvocation(m)) => m.name.id == node.id,
        Some(J::FieldAccess(f)) => f.name.element.id == node.id,
        _ => false,
    }
}

/// Type variable bindings a parameterized receiver gives to its declaring type
fn receiver_bindings(receiver: &JavaType, declaring: &ClassType) -> HashMap<String, JavaType> {
    match receiver {
        JavaType::Parameterized { type_arguments, .. }
            if type_arguments.len() == declaring.type_parameters.len() =>
        {
            declaring
                .type_parameters
                .iter()
                .cloned()
                .zip(type_arguments.iter().cloned())
                .collect()
        }
        _ => HashMap::new(),
    }
}

fn substitute(ty: &JavaType, bindings: &HashMap<String, JavaType>) -> JavaType {
    match ty {
        JavaType::GenericTypeVariable(var) => bindings.get(var).cloned().unwrap_or_else(|| ty.clone()),
        JavaType::Parameterized { base, type_arguments } => JavaType::Parameterized {
            base: base.clone(),
            type_arguments: type_arguments.iter().map(|t| substitute(t, bindings)).collect(),
        },
        JavaType::Array(elem) => JavaType::Array(Box::new(substitute(elem, bindings))),
        other => other.clone(),
    }
}

fn is_primitive_value(ty: &JavaType) -> bool {
    matches!(ty, JavaType::Primitive(p) if !matches!(p, Primitive::String | Primitive::Null))
}

/// Pick the overload `args` select.
///
/// Applicability is checked first without boxing, then with boxing and with
/// unattributed arguments accepted. Among the applicable methods the most
/// specific one wins, the first declared one on a tie.
pub(crate) fn select_overload(candidates: &[Arc<MethodType>], args: &[JavaType]) -> Option<Arc<MethodType>> {
    let by_arity: Vec<&Arc<MethodType>> = candidates
        .iter()
        .filter(|m| m.parameter_types.len() == args.len())
        .collect();

    let strict: Vec<&Arc<MethodType>> = by_arity
        .iter()
        .copied()
        .filter(|m| {
            m.parameter_types.iter().zip(args).all(|(param, arg)| {
                *arg != JavaType::Unknown
                    && is_primitive_value(arg) == is_primitive_value(param)
                    && arg.is_assignable_to(param)
            })
        })
        .collect();
    let applicable = if strict.is_empty() {
        by_arity
            .iter()
            .copied()
            .filter(|m| {
                m.parameter_types
                    .iter()
                    .zip(args)
                    .all(|(param, arg)| *arg == JavaType::Unknown || arg.is_assignable_to(param))
            })
            .collect()
    } else {
        strict
    };

    let more_specific = |a: &MethodType, b: &MethodType| {
        a.parameter_types
            .iter()
            .zip(&b.parameter_types)
            .all(|(x, y)| x.is_assignable_to(y))
    };
    applicable
        .iter()
        .find(|m| applicable.iter().all(|other| more_specific(m, other)))
        .or_else(|| applicable.first())
        .map(|m| (*m).clone())
}

fn unboxed(ty: &JavaType) -> Option<Primitive> {
    let primitive = match ty {
        JavaType::Primitive(p) => *p,
        JavaType::Class(c) => match c.fully_qualified_name.as_str() {
            "java.lang.Byte" => Primitive::Byte,
            "java.lang.Short" => Primitive::Short,
            "java.lang.Character" => Primitive::Char,
            "java.lang.Integer" => Primitive::Int,
            "java.lang.Long" => Primitive::Long,
            "java.lang.Float" => Primitive::Float,
            "java.lang.Double" => Primitive::Double,
            _ => return None,
        },
        _ => return None,
    };
    matches!(
        primitive,
        Primitive::Byte | Primitive::Short | Primitive::Char | Primitive::Int | Primitive::Long | Primitive::Float | Primitive::Double
    )
    .then_some(primitive)
}

/// Binary numeric promotion
fn promote(a: Primitive, b: Primitive) -> Primitive {
    [Primitive::Double, Primitive::Float, Primitive::Long]
        .into_iter()
        .find(|wide| a == *wide || b == *wide)
        .unwrap_or(Primitive::Int)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseMode, parse_compilation_unit};
    use std::path::Path;

    fn attributed(source: &str) -> Arc<CompilationUnit> {
        let cu = parse_compilation_unit(source, Path::new("A.java"), ParseMode::Strict).unwrap();
        let table = TypeTable::build(std::slice::from_ref(&cu), Some(TypeTable::jdk()));
        attribute(Arc::new(cu), &table).unwrap()
    }

    fn invocations(cu: &Arc<CompilationUnit>) -> Vec<String> {
        collect(&J::CompilationUnit(cu.clone()), |t, _| match t {
            J::MethodInvocation(m) => Some(
                m.method_type
                    .as_ref()
                    .map_or_else(|| format!("{}: unresolved", m.simple_name()), |mt| mt.signature()),
            ),
            _ => None,
        })
        .unwrap()
    }

    fn method(name: &str, params: Vec<JavaType>) -> Arc<MethodType> {
        Arc::new(MethodType {
            declaring_type: Arc::new(ClassType::new("Foo", ClassKind::Class)),
            name: name.to_string(),
            parameter_names: Vec::new(),
            parameter_types: params,
            return_type: JavaType::Primitive(Primitive::Void),
            is_static: false,
            is_constructor: false,
        })
    }

    #[test]
    fn test_overloads_follow_argument_types() {
        let cu = attributed(
            "class A {\n    void m(String s) {\n        int i = 1;\n        Integer.valueOf(i);\n        Integer.valueOf(s);\n        Integer.valueOf(\"2\");\n        System.out.println(1L);\n        System.out.println(s + i);\n    }\n}\n",
        );
        assert_eq!(
            invocations(&cu),
            vec![
                "java.lang.Integer valueOf(int)",
                "java.lang.Integer valueOf(java.lang.String)",
                "java.lang.Integer valueOf(java.lang.String)",
                "java.io.PrintStream println(long)",
                "java.io.PrintStream println(java.lang.String)",
            ]
        );
    }

    #[test]
    fn test_most_specific_overload_wins() {
        let int = JavaType::Primitive(Primitive::Int);
        let candidates = vec![
            method("f", vec![JavaType::Primitive(Primitive::Double)]),
            method("f", vec![JavaType::Primitive(Primitive::Long)]),
            method("f", vec![JavaType::class("java.lang.Object")]),
        ];
        let selected = select_overload(&candidates, &[int]).unwrap();
        assert_eq!(selected.signature(), "Foo f(long)");

        let boxed = select_overload(&candidates, &[JavaType::class("java.lang.String")]).unwrap();
        assert_eq!(boxed.signature(), "Foo f(java.lang.Object)");
        assert!(select_overload(&candidates, &[]).is_none());
    }

    #[test]
    fn test_unqualified_calls_and_static_imports() {
        let cu = attributed(
            "import static java.lang.Math.max;\nclass A {\n    int twice(int x) { return x * 2; }\n    int m() { return max(twice(1), 3); }\n}\n",
        );
        assert_eq!(
            invocations(&cu),
            vec!["java.lang.Math max(int,int)", "A twice(int)"]
        );
    }

    #[test]
    fn test_generic_return_types_are_bound_by_receiver() {
        let cu = attributed(
            "import java.util.List;\nclass A {\n    int m(List<String> names) {\n        return names.get(0).length();\n    }\n}\n",
        );
        assert_eq!(
            invocations(&cu),
            vec!["java.lang.String length()", "java.util.List get(int)"]
        );
    }

    #[test]
    fn test_lambda_parameters_take_the_target_type() {
        let cu = attributed(
            "import java.util.function.Function;\nclass A {\n    Function<Integer, Integer> f = it -> Integer.valueOf(it);\n}\n",
        );
        let lambda = find_first(&J::CompilationUnit(cu.clone()), |t, _| match t {
            J::Lambda(l) => Some(l.clone()),
            _ => None,
        })
        .unwrap()
        .unwrap();
        assert_eq!(
            lambda.ty.as_ref().and_then(JavaType::erased_name).as_deref(),
            Some("java.util.function.Function")
        );
        assert_eq!(invocations(&cu), vec!["java.lang.Integer valueOf(int)"]);
    }

    #[test]
    fn test_declarations_and_expressions_are_typed() {
        let cu = attributed(
            "package p;\nclass A<T> {\n    T value;\n    A(T value) { this.value = value; }\n    boolean m(int a, double b) { var c = a + b; return c > 1; }\n}\n",
        );
        let class = cu.classes().next().unwrap();
        assert_eq!(class.class_type.as_ref().and_then(JavaType::erased_name).as_deref(), Some("p.A"));

        let tree = J::CompilationUnit(cu.clone());
        let constructor = find_first(&tree, |t, _| match t {
            J::MethodDeclaration(m) if m.is_constructor() => Some(t.clone()),
            _ => None,
        })
        .unwrap()
        .unwrap();
        assert_eq!(
            constructor.java_type().map(|t| t.to_string()).as_deref(),
            Some("p.A <constructor>(java.lang.Object)")
        );

        let c = find_first(&tree, |t, _| match t {
            J::NamedVariable(v) if v.simple_name() == "c" => Some(t.clone()),
            _ => None,
        })
        .unwrap()
        .unwrap();
        assert_eq!(c.java_type(), Some(JavaType::Primitive(Primitive::Double)));

        let field = find_first(&tree, |t, _| matches!(t, J::FieldAccess(_)).then(|| t.clone()))
            .unwrap()
            .unwrap();
        assert_eq!(field.java_type(), Some(JavaType::GenericTypeVariable("T".to_string())));
    }

    #[test]
    fn test_constructor_overloads() {
        let cu = attributed("class A {\n    Object o = new Integer(\"1\");\n    Object p = new StringBuilder(16);\n}\n");
        let signatures: Vec<String> = collect(&J::CompilationUnit(cu.clone()), |t, _| match t {
            J::NewClass(n) => n.constructor_type.as_ref().map(|c| c.signature()),
            _ => None,
        })
        .unwrap();
        assert_eq!(
            signatures,
            vec![
                "java.lang.Integer <constructor>(java.lang.String)",
                "java.lang.StringBuilder <constructor>(int)"
            ]
        );
    }

    #[test]
    fn test_unresolvable_calls_stay_unattributed() {
        let cu = attributed("class A {\n    void m() { mystery(1); unknown.call(); }\n}\n");
        assert_eq!(invocations(&cu), vec!["mystery: unresolved", "call: unresolved"]);
    }
}
