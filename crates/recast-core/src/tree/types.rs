//! Resolved type information attached to attributed trees
//!
//! Types are produced by a front end's attribution pass. A node without a
//! type is simply unattributed; matchers treat that as "no match".

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    String,
    Null,
    Void,
}

impl Primitive {
    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Double => "double",
            Primitive::Float => "float",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Short => "short",
            Primitive::String => "String",
            Primitive::Null => "null",
            Primitive::Void => "void",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Primitive> {
        Some(match keyword {
            "boolean" => Primitive::Boolean,
            "byte" => Primitive::Byte,
            "char" => Primitive::Char,
            "double" => Primitive::Double,
            "float" => Primitive::Float,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "short" => Primitive::Short,
            "void" => Primitive::Void,
            _ => return None,
        })
    }

    /// Wrapper class for boxing conversions
    pub fn boxed(self) -> Option<&'static str> {
        match self {
            Primitive::Boolean => Some("java.lang.Boolean"),
            Primitive::Byte => Some("java.lang.Byte"),
            Primitive::Char => Some("java.lang.Character"),
            Primitive::Double => Some("java.lang.Double"),
            Primitive::Float => Some("java.lang.Float"),
            Primitive::Int => Some("java.lang.Integer"),
            Primitive::Long => Some("java.lang.Long"),
            Primitive::Short => Some("java.lang.Short"),
            Primitive::String => Some("java.lang.String"),
            Primitive::Null | Primitive::Void => None,
        }
    }

    fn widening_rank(self) -> Option<u8> {
        match self {
            Primitive::Byte => Some(1),
            Primitive::Short | Primitive::Char => Some(2),
            Primitive::Int => Some(3),
            Primitive::Long => Some(4),
            Primitive::Float => Some(5),
            Primitive::Double => Some(6),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassType {
    pub fully_qualified_name: String,
    pub kind: ClassKind,
    pub type_parameters: Vec<String>,
    pub supertype: Option<Arc<ClassType>>,
    pub interfaces: Vec<Arc<ClassType>>,
}

impl ClassType {
    pub fn new(fqn: impl Into<String>, kind: ClassKind) -> Self {
        ClassType {
            fully_qualified_name: fqn.into(),
            kind,
            type_parameters: Vec::new(),
            supertype: None,
            interfaces: Vec::new(),
        }
    }

    pub fn simple_name(&self) -> &str {
        self.fully_qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.fully_qualified_name)
    }

    pub fn package_name(&self) -> &str {
        match self.fully_qualified_name.rfind('.') {
            Some(idx) => &self.fully_qualified_name[..idx],
            None => "",
        }
    }

    /// This type, its superclasses and all implemented interfaces, nearest first
    pub fn supertypes(self: &Arc<Self>) -> Vec<Arc<ClassType>> {
        let mut seen = Vec::new();
        let mut queue = vec![self.clone()];
        while let Some(next) = queue.pop() {
            if seen
                .iter()
                .any(|t: &Arc<ClassType>| t.fully_qualified_name == next.fully_qualified_name)
            {
                continue;
            }
            for iface in next.interfaces.iter().rev() {
                queue.push(iface.clone());
            }
            if let Some(sup) = &next.supertype {
                queue.push(sup.clone());
            }
            seen.push(next);
        }
        seen
    }

    pub fn is_assignable_to(self: &Arc<Self>, fqn: &str) -> bool {
        fqn == "java.lang.Object"
            || self
                .supertypes()
                .iter()
                .any(|t| t.fully_qualified_name == fqn)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodType {
    pub declaring_type: Arc<ClassType>,
    pub name: String,
    pub parameter_names: Vec<String>,
    pub parameter_types: Vec<JavaType>,
    pub return_type: JavaType,
    pub is_static: bool,
    pub is_constructor: bool,
}

impl MethodType {
    pub fn with_name(&self, name: impl Into<String>) -> MethodType {
        MethodType {
            name: name.into(),
            ..self.clone()
        }
    }

    /// `java.lang.Integer valueOf(int)`
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .parameter_types
            .iter()
            .map(|p| p.erased_name().unwrap_or_else(|| "?".to_string()))
            .collect();
        let name = if self.is_constructor {
            "<constructor>"
        } else {
            &self.name
        };
        format!(
            "{} {}({})",
            self.declaring_type.fully_qualified_name,
            name,
            params.join(",")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JavaType {
    Primitive(Primitive),
    Class(Arc<ClassType>),
    Parameterized {
        base: Arc<ClassType>,
        type_arguments: Vec<JavaType>,
    },
    GenericTypeVariable(String),
    Array(Box<JavaType>),
    Method(Arc<MethodType>),
    Unknown,
}

impl JavaType {
    pub fn class(fqn: impl Into<String>) -> JavaType {
        JavaType::Class(Arc::new(ClassType::new(fqn, ClassKind::Class)))
    }

    /// Erased name used for matching: primitives by keyword, classes by fully qualified name
    pub fn erased_name(&self) -> Option<String> {
        match self {
            JavaType::Primitive(Primitive::String) => Some("java.lang.String".to_string()),
            JavaType::Primitive(p) => Some(p.keyword().to_string()),
            JavaType::Class(c) => Some(c.fully_qualified_name.clone()),
            JavaType::Parameterized { base, .. } => Some(base.fully_qualified_name.clone()),
            JavaType::GenericTypeVariable(_) => Some("java.lang.Object".to_string()),
            JavaType::Array(elem) => elem.erased_name().map(|n| format!("{n}[]")),
            JavaType::Method(m) => m.return_type.erased_name(),
            JavaType::Unknown => None,
        }
    }

    pub fn class_type(&self) -> Option<&Arc<ClassType>> {
        match self {
            JavaType::Class(c) => Some(c),
            JavaType::Parameterized { base, .. } => Some(base),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        !matches!(
            self,
            JavaType::Primitive(p) if *p != Primitive::String && *p != Primitive::Null
        ) && !matches!(self, JavaType::Unknown | JavaType::Method(_))
    }

    /// Source spelling used when declaring a variable of this type in generated code
    pub fn to_source(&self) -> String {
        match self {
            JavaType::Primitive(p) => p.keyword().to_string(),
            JavaType::Class(c) => c.fully_qualified_name.clone(),
            JavaType::Parameterized {
                base,
                type_arguments,
            } => {
                let args: Vec<String> = type_arguments.iter().map(JavaType::boxed_source).collect();
                format!("{}<{}>", base.fully_qualified_name, args.join(", "))
            }
            JavaType::GenericTypeVariable(name) => name.clone(),
            JavaType::Array(elem) => format!("{}[]", elem.to_source()),
            JavaType::Method(m) => m.return_type.to_source(),
            JavaType::Unknown => "Object".to_string(),
        }
    }

    fn boxed_source(&self) -> String {
        match self {
            JavaType::Primitive(p) => p.boxed().map_or_else(|| "Object".to_string(), str::to_string),
            other => other.to_source(),
        }
    }

    /// Assignment compatibility used for overload selection
    pub fn is_assignable_to(&self, target: &JavaType) -> bool {
        if let (Some(a), Some(b)) = (self.erased_name(), target.erased_name())
            && a == b
        {
            return true;
        }
        match (self, target) {
            (_, JavaType::GenericTypeVariable(_)) => self.is_reference() || self.boxed_type().is_some(),
            (JavaType::Primitive(Primitive::Null), t) => t.is_reference(),
            (JavaType::Primitive(from), JavaType::Primitive(to)) => {
                match (from.widening_rank(), to.widening_rank()) {
                    (Some(a), Some(b)) => a <= b,
                    _ => false,
                }
            }
            (JavaType::Primitive(from), t) => match (from.boxed(), t.erased_name()) {
                (Some(boxed), Some(name)) => boxed == name || name == "java.lang.Object",
                _ => false,
            },
            (from, JavaType::Primitive(to)) => {
                to.boxed().is_some() && from.erased_name().as_deref() == to.boxed()
            }
            (from, to) => match (from.class_type(), to.erased_name()) {
                (Some(class), Some(name)) => class.is_assignable_to(&name),
                (None, Some(name)) => {
                    name == "java.lang.Object" && from.is_reference()
                }
                _ => false,
            },
        }
    }

    fn boxed_type(&self) -> Option<&'static str> {
        match self {
            JavaType::Primitive(p) => p.boxed(),
            _ => None,
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Method(m) => f.write_str(&m.signature()),
            other => f.write_str(&other.to_source()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integer() -> JavaType {
        let number = Arc::new(ClassType::new("java.lang.Number", ClassKind::Class));
        let mut integer = ClassType::new("java.lang.Integer", ClassKind::Class);
        integer.supertype = Some(number);
        JavaType::Class(Arc::new(integer))
    }

    #[test]
    fn test_erased_names() {
        assert_eq!(JavaType::Primitive(Primitive::Int).erased_name().as_deref(), Some("int"));
        assert_eq!(
            JavaType::Primitive(Primitive::String).erased_name().as_deref(),
            Some("java.lang.String")
        );
        assert_eq!(
            JavaType::Array(Box::new(JavaType::Primitive(Primitive::Int)))
                .erased_name()
                .as_deref(),
            Some("int[]")
        );
        assert_eq!(JavaType::Unknown.erased_name(), None);
    }

    #[test]
    fn test_assignability() {
        let int = JavaType::Primitive(Primitive::Int);
        let long = JavaType::Primitive(Primitive::Long);
        let string = JavaType::Primitive(Primitive::String);

        assert!(int.is_assignable_to(&long));
        assert!(!long.is_assignable_to(&int));
        assert!(int.is_assignable_to(&integer()));
        assert!(!string.is_assignable_to(&int));
        assert!(integer().is_assignable_to(&JavaType::class("java.lang.Number")));
        assert!(integer().is_assignable_to(&JavaType::class("java.lang.Object")));
        assert!(string.is_assignable_to(&JavaType::GenericTypeVariable("T".to_string())));
    }
}
