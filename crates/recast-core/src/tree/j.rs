//! Node kinds of the lossless Java tree
//!
//! Each kind is an immutable struct shared through [`Arc`]. The closed enum
//! [`J`] wraps every kind so visitors can dispatch with a single `match`.
//! Slots that must hold a particular kind (a method name is always an
//! [`Identifier`]) are typed as `Arc<Kind>`; expression and statement slots
//! hold a `J`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{
    Container, JavaType, LeftPadded, Markers, MethodType, Primitive, RightPadded, Space, TreeId,
};
use crate::error::RecastError;

/// Common accessors shared by every node kind
pub trait Tree {
    fn id(&self) -> TreeId;
    fn prefix(&self) -> &Space;
    fn markers(&self) -> &Markers;
}

/// Static information about one node kind, used for typed cursor lookups
pub trait TreeKind: Tree + Clone {
    const KIND: JKind;

    fn cast(tree: &J) -> Option<&Arc<Self>>;

    fn replace_markers(&self, markers: Markers) -> Self;

    fn wrap(node: Arc<Self>) -> J;
}

macro_rules! tree_kinds {
    ($($kind:ident),* $(,)?) => {
        /// Any node of the tree
        #[derive(Debug, Clone, PartialEq)]
        pub enum J {
            $($kind(Arc<$kind>),)*
        }

        /// Discriminant of [`J`]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum JKind {
            $($kind,)*
        }

        impl fmt::Display for JKind {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(JKind::$kind => f.write_str(stringify!($kind)),)*
                }
            }
        }

        impl J {
            pub fn kind(&self) -> JKind {
                match self {
                    $(J::$kind(_) => JKind::$kind,)*
                }
            }

            pub fn id(&self) -> TreeId {
                match self {
                    $(J::$kind(n) => n.id,)*
                }
            }

            pub fn prefix(&self) -> &Space {
                match self {
                    $(J::$kind(n) => &n.prefix,)*
                }
            }

            pub fn markers(&self) -> &Markers {
                match self {
                    $(J::$kind(n) => &n.markers,)*
                }
            }

            pub fn with_prefix(&self, prefix: Space) -> J {
                match self {
                    $(J::$kind(n) => J::$kind(Arc::new(n.with_prefix(prefix))),)*
                }
            }

            pub fn with_markers(&self, markers: Markers) -> J {
                match self {
                    $(J::$kind(n) => J::$kind(Arc::new(n.with_markers(markers))),)*
                }
            }

            pub fn with_id(&self, id: TreeId) -> J {
                match self {
                    $(J::$kind(n) => J::$kind(Arc::new(n.with_id(id))),)*
                }
            }

            /// Same shared node, not merely equal content
            pub fn ptr_eq(&self, other: &J) -> bool {
                match (self, other) {
                    $((J::$kind(a), J::$kind(b)) => Arc::ptr_eq(a, b),)*
                    _ => false,
                }
            }
        }

        $(
            impl Tree for $kind {
                fn id(&self) -> TreeId {
                    self.id
                }

                fn prefix(&self) -> &Space {
                    &self.prefix
                }

                fn markers(&self) -> &Markers {
                    &self.markers
                }
            }

            impl $kind {
                pub fn with_prefix(&self, prefix: Space) -> Self {
                    $kind { prefix, ..self.clone() }
                }

                pub fn with_markers(&self, markers: Markers) -> Self {
                    $kind { markers, ..self.clone() }
                }

                pub fn with_id(&self, id: TreeId) -> Self {
                    $kind { id, ..self.clone() }
                }
            }

            impl TreeKind for $kind {
                const KIND: JKind = JKind::$kind;

                fn cast(tree: &J) -> Option<&Arc<Self>> {
                    match tree {
                        J::$kind(n) => Some(n),
                        _ => None,
                    }
                }

                fn replace_markers(&self, markers: Markers) -> Self {
                    self.with_markers(markers)
                }

                fn wrap(node: Arc<Self>) -> J {
                    J::$kind(node)
                }
            }

            impl From<$kind> for J {
                fn from(node: $kind) -> J {
                    J::$kind(Arc::new(node))
                }
            }

            impl From<Arc<$kind>> for J {
                fn from(node: Arc<$kind>) -> J {
                    J::$kind(node)
                }
            }

            impl TryFrom<J> for Arc<$kind> {
                type Error = RecastError;

                fn try_from(tree: J) -> Result<Self, RecastError> {
                    match tree {
                        J::$kind(n) => Ok(n),
                        other => Err(RecastError::UnexpectedKind {
                            expected: JKind::$kind,
                            actual: other.kind(),
                        }),
                    }
                }
            }
        )*
    };
}

tree_kinds! {
    CompilationUnit,
    Package,
    Import,
    ClassDeclaration,
    Block,
    MethodDeclaration,
    VariableDeclarations,
    NamedVariable,
    Identifier,
    FieldAccess,
    MethodInvocation,
    NewClass,
    Literal,
    Assignment,
    Binary,
    Parentheses,
    Lambda,
    Return,
    If,
    Else,
    ParameterizedType,
    ArrayType,
    Annotation,
    Empty,
    Unknown,
}

impl J {
    /// Resolved type of an expression or declaration, when attributed
    pub fn java_type(&self) -> Option<JavaType> {
        match self {
            J::Identifier(n) => n.ty.clone(),
            J::FieldAccess(n) => n.ty.clone(),
            J::MethodInvocation(n) => n.method_type.as_ref().map(|m| m.return_type.clone()),
            J::NewClass(n) => n.ty.clone(),
            J::Literal(n) => Some(JavaType::Primitive(n.ty)),
            J::Assignment(n) => n.ty.clone(),
            J::Binary(n) => n.ty.clone(),
            J::Parentheses(n) => n.tree.element.java_type(),
            J::Lambda(n) => n.ty.clone(),
            J::ParameterizedType(n) => n.ty.clone(),
            J::ArrayType(n) => n.ty.clone(),
            J::NamedVariable(n) => n.variable_type.clone(),
            J::ClassDeclaration(n) => n.class_type.clone(),
            J::MethodDeclaration(n) => n.method_type.clone().map(JavaType::Method),
            _ => None,
        }
    }

    /// Kinds that may appear where a value is expected
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            J::Identifier(_)
                | J::FieldAccess(_)
                | J::MethodInvocation(_)
                | J::NewClass(_)
                | J::Literal(_)
                | J::Assignment(_)
                | J::Binary(_)
                | J::Parentheses(_)
                | J::Lambda(_)
        )
    }

    /// Kinds that may appear as an element of a block
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            J::Block(_)
                | J::ClassDeclaration(_)
                | J::MethodDeclaration(_)
                | J::VariableDeclarations(_)
                | J::MethodInvocation(_)
                | J::NewClass(_)
                | J::Assignment(_)
                | J::Return(_)
                | J::If(_)
                | J::Empty(_)
                | J::Unknown(_)
        )
    }

    /// Whether a `;` follows this node when it is used as a statement
    pub fn needs_semicolon(&self) -> bool {
        match self {
            J::Block(_) | J::ClassDeclaration(_) | J::If(_) | J::Unknown(_) => false,
            J::MethodDeclaration(m) => m.body.is_none(),
            _ => true,
        }
    }
}

impl fmt::Display for J {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print())
    }
}

/// A parsed source file
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub source_path: PathBuf,
    pub package: Option<RightPadded<Arc<Package>>>,
    pub imports: Vec<RightPadded<Arc<Import>>>,
    pub types: Vec<J>,
    pub eof: Space,
}

impl CompilationUnit {
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn package_name(&self) -> Option<String> {
        self.package
            .as_ref()
            .map(|p| qualified_name(&p.element.name).unwrap_or_default())
    }

    pub fn imports(&self) -> impl Iterator<Item = &Arc<Import>> {
        self.imports.iter().map(|rp| &rp.element)
    }

    pub fn classes(&self) -> impl Iterator<Item = &Arc<ClassDeclaration>> {
        self.types.iter().filter_map(|t| match t {
            J::ClassDeclaration(c) => Some(c),
            _ => None,
        })
    }

    pub fn has_import(&self, type_name: &str) -> bool {
        self.imports().any(|i| {
            !i.is_static()
                && (i.type_name() == type_name
                    || (i.is_wildcard() && i.package_name() == package_of(type_name)))
        })
    }

    pub fn with_imports(&self, imports: Vec<RightPadded<Arc<Import>>>) -> Self {
        CompilationUnit {
            imports,
            ..self.clone()
        }
    }

    pub fn with_types(&self, types: Vec<J>) -> Self {
        CompilationUnit {
            types,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub name: J,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Space before `static`, present for static imports
    pub statik: Option<Space>,
    pub qualid: Arc<FieldAccess>,
}

impl Import {
    pub fn is_static(&self) -> bool {
        self.statik.is_some()
    }

    pub fn is_wildcard(&self) -> bool {
        self.qualid.name.element.simple_name == "*"
    }

    /// Dotted name as written, without whitespace
    pub fn qualified_name(&self) -> String {
        qualified_name(&J::FieldAccess(self.qualid.clone())).unwrap_or_default()
    }

    /// Imported type; for static imports the type owning the member
    pub fn type_name(&self) -> String {
        if self.is_static() {
            qualified_name(&self.qualid.target).unwrap_or_default()
        } else {
            self.qualified_name()
        }
    }

    pub fn package_name(&self) -> String {
        if self.is_wildcard() && !self.is_static() {
            qualified_name(&self.qualid.target).unwrap_or_default()
        } else {
            package_of(&self.type_name()).to_string()
        }
    }

    /// Imported member name of a static import
    pub fn member_name(&self) -> Option<&str> {
        self.is_static()
            .then_some(self.qualid.name.element.simple_name.as_str())
    }

    pub fn with_qualid(&self, qualid: Arc<FieldAccess>) -> Self {
        Import {
            qualid,
            ..self.clone()
        }
    }
}

/// A modifier keyword such as `public` or `static`
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    pub id: TreeId,
    pub prefix: Space,
    pub keyword: String,
}

/// `class`, `interface` or `enum` keyword together with its prefix
#[derive(Debug, Clone, PartialEq)]
pub struct ClassKeyword {
    pub prefix: Space,
    pub kind: super::ClassKind,
}

impl ClassKeyword {
    pub fn keyword(&self) -> &'static str {
        match self.kind {
            super::ClassKind::Class => "class",
            super::ClassKind::Interface => "interface",
            super::ClassKind::Enum => "enum",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub leading_annotations: Vec<Arc<Annotation>>,
    pub modifiers: Vec<Modifier>,
    pub keyword: ClassKeyword,
    pub name: Arc<Identifier>,
    pub type_parameters: Option<Container<J>>,
    pub extends: Option<LeftPadded<J>>,
    /// `implements` list, or the `extends` list of an interface
    pub implements: Option<Container<J>>,
    pub body: Arc<Block>,
    pub class_type: Option<JavaType>,
}

impl ClassDeclaration {
    pub fn simple_name(&self) -> &str {
        &self.name.simple_name
    }

    pub fn type_parameter_names(&self) -> Vec<String> {
        self.type_parameters
            .as_ref()
            .map(|tp| {
                tp.elements()
                    .filter_map(|e| match e {
                        J::Identifier(i) => Some(i.simple_name.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn with_body(&self, body: Arc<Block>) -> Self {
        ClassDeclaration {
            body,
            ..self.clone()
        }
    }

    pub fn with_name(&self, name: Arc<Identifier>) -> Self {
        ClassDeclaration {
            name,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub statements: Vec<RightPadded<J>>,
    /// Space before the closing brace
    pub end: Space,
}

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = &J> {
        self.statements.iter().map(|rp| &rp.element)
    }

    pub fn with_statements(&self, statements: Vec<RightPadded<J>>) -> Self {
        Block {
            statements,
            ..self.clone()
        }
    }

    pub fn with_end(&self, end: Space) -> Self {
        Block {
            end,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclaration {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub leading_annotations: Vec<Arc<Annotation>>,
    pub modifiers: Vec<Modifier>,
    pub type_parameters: Option<Container<J>>,
    /// Absent for constructors
    pub return_type: Option<J>,
    pub name: Arc<Identifier>,
    pub parameters: Container<J>,
    pub throws: Option<Container<J>>,
    pub body: Option<Arc<Block>>,
    pub method_type: Option<Arc<MethodType>>,
}

impl MethodDeclaration {
    pub fn simple_name(&self) -> &str {
        &self.name.simple_name
    }

    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    pub fn has_modifier(&self, keyword: &str) -> bool {
        self.modifiers.iter().any(|m| m.keyword == keyword)
    }

    /// Declared parameters, skipping the placeholder of an empty list
    pub fn parameters(&self) -> impl Iterator<Item = &Arc<VariableDeclarations>> {
        self.parameters.elements().filter_map(|p| match p {
            J::VariableDeclarations(v) => Some(v),
            _ => None,
        })
    }

    pub fn with_name(&self, name: Arc<Identifier>) -> Self {
        MethodDeclaration {
            name,
            ..self.clone()
        }
    }

    pub fn with_body(&self, body: Option<Arc<Block>>) -> Self {
        MethodDeclaration {
            body,
            ..self.clone()
        }
    }

    pub fn with_method_type(&self, method_type: Option<Arc<MethodType>>) -> Self {
        MethodDeclaration {
            method_type,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarations {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub leading_annotations: Vec<Arc<Annotation>>,
    pub modifiers: Vec<Modifier>,
    /// Absent for untyped lambda parameters
    pub type_expression: Option<J>,
    pub variables: Vec<RightPadded<Arc<NamedVariable>>>,
}

impl VariableDeclarations {
    pub fn variables(&self) -> impl Iterator<Item = &Arc<NamedVariable>> {
        self.variables.iter().map(|rp| &rp.element)
    }

    pub fn has_modifier(&self, keyword: &str) -> bool {
        self.modifiers.iter().any(|m| m.keyword == keyword)
    }

    pub fn with_variables(&self, variables: Vec<RightPadded<Arc<NamedVariable>>>) -> Self {
        VariableDeclarations {
            variables,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedVariable {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub name: Arc<Identifier>,
    pub initializer: Option<LeftPadded<J>>,
    pub variable_type: Option<JavaType>,
}

impl NamedVariable {
    pub fn simple_name(&self) -> &str {
        &self.name.simple_name
    }

    pub fn with_initializer(&self, initializer: Option<LeftPadded<J>>) -> Self {
        NamedVariable {
            initializer,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub simple_name: String,
    pub ty: Option<JavaType>,
}

impl Identifier {
    pub fn build(simple_name: impl Into<String>, ty: Option<JavaType>) -> Self {
        Identifier {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            simple_name: simple_name.into(),
            ty,
        }
    }

    pub fn with_simple_name(&self, simple_name: impl Into<String>) -> Self {
        Identifier {
            simple_name: simple_name.into(),
            ..self.clone()
        }
    }

    pub fn with_type(&self, ty: Option<JavaType>) -> Self {
        Identifier { ty, ..self.clone() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccess {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub target: J,
    pub name: LeftPadded<Arc<Identifier>>,
    pub ty: Option<JavaType>,
}

impl FieldAccess {
    pub fn simple_name(&self) -> &str {
        &self.name.element.simple_name
    }

    pub fn with_name(&self, name: Arc<Identifier>) -> Self {
        FieldAccess {
            name: self.name.with_element(name),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInvocation {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub select: Option<RightPadded<J>>,
    pub name: Arc<Identifier>,
    pub arguments: Container<J>,
    pub method_type: Option<Arc<MethodType>>,
}

impl MethodInvocation {
    pub fn simple_name(&self) -> &str {
        &self.name.simple_name
    }

    /// Call arguments, skipping the placeholder of an empty list
    pub fn arguments(&self) -> impl Iterator<Item = &J> {
        self.arguments.elements().filter(|a| !matches!(a, J::Empty(_)))
    }

    pub fn with_name(&self, name: Arc<Identifier>) -> Self {
        MethodInvocation {
            name,
            ..self.clone()
        }
    }

    pub fn with_select(&self, select: Option<RightPadded<J>>) -> Self {
        MethodInvocation {
            select,
            ..self.clone()
        }
    }

    pub fn with_arguments(&self, arguments: Container<J>) -> Self {
        MethodInvocation {
            arguments,
            ..self.clone()
        }
    }

    pub fn with_method_type(&self, method_type: Option<Arc<MethodType>>) -> Self {
        MethodInvocation {
            method_type,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewClass {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub clazz: J,
    pub arguments: Container<J>,
    pub body: Option<Arc<Block>>,
    pub constructor_type: Option<Arc<MethodType>>,
    pub ty: Option<JavaType>,
}

impl NewClass {
    pub fn arguments(&self) -> impl Iterator<Item = &J> {
        self.arguments.elements().filter(|a| !matches!(a, J::Empty(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Int(i64),
    Double(f64),
    Bool(bool),
    Char(char),
    String(String),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub value: LiteralValue,
    /// Exact source spelling, printed verbatim
    pub value_source: String,
    pub ty: Primitive,
}

impl Literal {
    pub fn build(value: LiteralValue, value_source: impl Into<String>, ty: Primitive) -> Self {
        Literal {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            value,
            value_source: value_source.into(),
            ty,
        }
    }

    pub fn int(value: i64) -> Self {
        Self::build(LiteralValue::Int(value), value.to_string(), Primitive::Int)
    }

    pub fn string(value: impl Into<String>) -> Self {
        let value = value.into();
        let source = format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""));
        Self::build(LiteralValue::String(value), source, Primitive::String)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub variable: J,
    pub assignment: LeftPadded<J>,
    pub ty: Option<JavaType>,
}

impl Assignment {
    pub fn with_value(&self, value: J) -> Self {
        Assignment {
            assignment: self.assignment.with_element(value),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Addition => "+",
            BinaryOperator::Subtraction => "-",
            BinaryOperator::Multiplication => "*",
            BinaryOperator::Division => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => BinaryOperator::Addition,
            "-" => BinaryOperator::Subtraction,
            "*" => BinaryOperator::Multiplication,
            "/" => BinaryOperator::Division,
            "%" => BinaryOperator::Modulo,
            "<" => BinaryOperator::LessThan,
            ">" => BinaryOperator::GreaterThan,
            "<=" => BinaryOperator::LessThanOrEqual,
            ">=" => BinaryOperator::GreaterThanOrEqual,
            "==" => BinaryOperator::Equal,
            "!=" => BinaryOperator::NotEqual,
            "&&" => BinaryOperator::And,
            "||" => BinaryOperator::Or,
            _ => return None,
        })
    }

    /// Binding strength, higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Equal | BinaryOperator::NotEqual => 3,
            BinaryOperator::LessThan
            | BinaryOperator::GreaterThan
            | BinaryOperator::LessThanOrEqual
            | BinaryOperator::GreaterThanOrEqual => 4,
            BinaryOperator::Addition | BinaryOperator::Subtraction => 5,
            BinaryOperator::Multiplication | BinaryOperator::Division | BinaryOperator::Modulo => 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub left: J,
    pub operator: LeftPadded<BinaryOperator>,
    pub right: J,
    pub ty: Option<JavaType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parentheses {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub tree: RightPadded<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaParameters {
    pub prefix: Space,
    pub parenthesized: bool,
    pub parameters: Vec<RightPadded<J>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub parameters: LambdaParameters,
    /// Space before `->`
    pub arrow: Space,
    pub body: J,
    pub ty: Option<JavaType>,
}

impl Lambda {
    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters
            .parameters
            .iter()
            .filter_map(|p| match &p.element {
                J::VariableDeclarations(v) => v.variables().next().map(|n| n.simple_name().to_string()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub expression: Option<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub condition: Arc<Parentheses>,
    pub then_part: RightPadded<J>,
    pub else_part: Option<Arc<Else>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Else {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub body: RightPadded<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedType {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub clazz: J,
    pub type_parameters: Container<J>,
    pub ty: Option<JavaType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub element_type: J,
    /// Space before `[` and the space inside the brackets
    pub dimension: LeftPadded<Space>,
    pub ty: Option<JavaType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub annotation_type: J,
    pub arguments: Option<Container<J>>,
}

/// Placeholder for an empty statement or an empty argument list
#[derive(Debug, Clone, PartialEq)]
pub struct Empty {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
}

impl Empty {
    pub fn build(prefix: Space) -> Self {
        Empty {
            id: TreeId::fresh(),
            prefix,
            markers: Markers::EMPTY,
        }
    }
}

/// Source the front end does not model, printed verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct Unknown {
    pub id: TreeId,
    pub prefix: Space,
    pub markers: Markers,
    pub source: String,
}

/// Dotted name of an identifier or field access chain, ignoring whitespace
pub fn qualified_name(tree: &J) -> Option<String> {
    match tree {
        J::Identifier(i) => Some(i.simple_name.clone()),
        J::FieldAccess(fa) => {
            qualified_name(&fa.target).map(|t| format!("{}.{}", t, fa.name.element.simple_name))
        }
        J::ParameterizedType(p) => qualified_name(&p.clazz),
        _ => None,
    }
}

fn package_of(type_name: &str) -> &str {
    match type_name.rfind('.') {
        Some(idx) => &type_name[..idx],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_prefix_keeps_identity_and_markers() {
        let ident = Identifier::build("foo", None);
        let markers = Markers::EMPTY.add(crate::tree::Marker::comment("x"));
        let tree = J::from(ident.with_markers(markers.clone()));
        let moved = tree.with_prefix(Space::format("  "));

        assert_eq!(moved.id(), tree.id());
        assert_eq!(moved.markers(), &markers);
        assert_eq!(moved.prefix().as_str(), "  ");
        assert!(!moved.ptr_eq(&tree));
        assert!(tree.ptr_eq(&tree.clone()));
    }

    #[test]
    fn test_try_from_reports_unexpected_kind() {
        let tree = J::from(Literal::int(1));
        let err = Arc::<Identifier>::try_from(tree).unwrap_err();
        assert!(matches!(
            err,
            RecastError::UnexpectedKind {
                expected: JKind::Identifier,
                actual: JKind::Literal
            }
        ));
    }

    #[test]
    fn test_semicolon_rules() {
        assert!(J::from(Literal::int(1)).needs_semicolon());
        assert!(!J::from(Block {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            statements: vec![],
            end: Space::EMPTY,
        })
        .needs_semicolon());
    }

    #[test]
    fn test_string_literal_escaping() {
        let lit = Literal::string("say \"hi\"");
        assert_eq!(lit.value_source, "\"say \\\"hi\\\"\"");
    }
}
