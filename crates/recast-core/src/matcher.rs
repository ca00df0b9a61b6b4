//! Type-aware predicates over call sites and declarations
//!
//! A [`MethodMatcher`] is compiled once from a pattern such as
//! `java.lang.Integer valueOf(int)` or `com.example..* find*(.., String)` and
//! then reused across every tree of a run. Matching always goes through
//! resolved types: a call site without a method type never matches.

use regex::Regex;

use crate::error::RecastError;
use crate::result::Result;
use crate::tree::{ClassDeclaration, Cursor, Import, J, JavaType, MethodDeclaration, MethodType};

const CONSTRUCTOR: &str = "<constructor>";

/// Single fully-qualified type pattern
///
/// Inside a qualified pattern `*` stands for one name segment, so `p.*`
/// only covers types declared directly in package `p`. A pattern that is
/// nothing but `*` matches every type.
#[derive(Debug, Clone)]
pub struct TypeMatcher {
    pattern: String,
    regex: Regex,
}

impl TypeMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(RecastError::invalid_pattern(pattern, "empty type pattern"));
        }
        if let Some(bad) = pattern
            .chars()
            .find(|c| !(c.is_alphanumeric() || matches!(c, '.' | '*' | '_' | '$' | '[' | ']')))
        {
            return Err(RecastError::invalid_pattern(
                pattern,
                format!("unexpected character '{bad}' in type pattern"),
            ));
        }

        if pattern == "*" {
            return Ok(TypeMatcher {
                pattern: pattern.to_string(),
                regex: Regex::new("^.+$").map_err(|e| RecastError::invalid_pattern(pattern, e.to_string()))?,
            });
        }

        let mut regex = String::from("^");
        let plain = !pattern.contains('.') && !pattern.contains('*');
        if plain && crate::tree::Primitive::from_keyword(pattern.trim_end_matches("[]")).is_none() {
            regex.push_str(r"(?:java\.lang\.)?");
        }

        let mut rest = pattern;
        while !rest.is_empty() {
            if let Some(tail) = rest.strip_prefix("..") {
                regex.push_str(r"\.(?:.*\.)?");
                rest = tail;
            } else if let Some(tail) = rest.strip_prefix("[]") {
                regex.push_str(r"\[\]");
                rest = tail;
            } else {
                let c = rest.chars().next().unwrap_or_default();
                match c {
                    '*' => regex.push_str(r"[^.\[\]]*"),
                    '.' => regex.push_str(r"\."),
                    '$' => regex.push_str(r"\$"),
                    '[' | ']' => {
                        return Err(RecastError::invalid_pattern(pattern, "unbalanced array brackets"));
                    }
                    other => regex.push(other),
                }
                rest = &rest[c.len_utf8()..];
            }
        }
        regex.push('$');

        let regex =
            Regex::new(&regex).map_err(|e| RecastError::invalid_pattern(pattern, e.to_string()))?;
        Ok(TypeMatcher {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches_name(&self, fully_qualified_name: &str) -> bool {
        self.regex.is_match(fully_qualified_name)
    }

    /// Fails closed for unattributed types
    pub fn matches(&self, ty: &JavaType) -> bool {
        ty.erased_name().is_some_and(|name| self.matches_name(&name))
    }
}

#[derive(Debug, Clone)]
enum ParamPattern {
    /// `..`: any number of arguments
    Any,
    Type(TypeMatcher),
}

/// Compiled method pattern
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    pattern: String,
    owner: TypeMatcher,
    name: Option<Regex>,
    parameters: Vec<ParamPattern>,
    match_overrides: bool,
}

impl MethodMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        Self::with_overrides(pattern, false)
    }

    pub fn with_overrides(pattern: &str, match_overrides: bool) -> Result<Self> {
        let invalid = |message: &str| RecastError::invalid_pattern(pattern, message);

        let open = pattern.find('(').ok_or_else(|| invalid("missing '('"))?;
        let close = pattern.rfind(')').ok_or_else(|| invalid("missing ')'"))?;
        if close < open || !pattern[close + 1..].trim().is_empty() {
            return Err(invalid("unbalanced parentheses"));
        }
        if pattern[open + 1..close].contains(['(', ')']) {
            return Err(invalid("nested parentheses"));
        }

        let head = pattern[..open].trim();
        let split = head
            .rfind(|c: char| c.is_whitespace() || c == '#')
            .ok_or_else(|| invalid("expected `OwnerType methodName(...)`"))?;
        let owner = TypeMatcher::new(head[..split].trim())
            .map_err(|e| invalid(&format!("owner type: {e}")))?;
        let method = head[split + 1..].trim();
        if method.is_empty() {
            return Err(invalid("missing method name"));
        }

        let name = if method == CONSTRUCTOR {
            None
        } else {
            if !method
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '*')
            {
                return Err(invalid("invalid method name pattern"));
            }
            let regex = format!("^{}$", regex::escape(method).replace(r"\*", ".*"));
            Some(Regex::new(&regex).map_err(|e| invalid(&e.to_string()))?)
        };

        let args = pattern[open + 1..close].trim();
        let mut parameters = Vec::new();
        if !args.is_empty() {
            for arg in args.split(',') {
                let arg = arg.trim();
                if arg == ".." {
                    parameters.push(ParamPattern::Any);
                } else {
                    let matcher = TypeMatcher::new(arg)
                        .map_err(|e| invalid(&format!("parameter `{arg}`: {e}")))?;
                    parameters.push(ParamPattern::Type(matcher));
                }
            }
        }

        Ok(MethodMatcher {
            pattern: pattern.to_string(),
            owner,
            name,
            parameters,
            match_overrides,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn match_overrides(&self) -> bool {
        self.match_overrides
    }

    fn matches_name(&self, method: &MethodType) -> bool {
        match &self.name {
            None => method.is_constructor,
            Some(regex) => !method.is_constructor && regex.is_match(&method.name),
        }
    }

    fn matches_owner(&self, method: &MethodType) -> bool {
        if self.match_overrides {
            method
                .declaring_type
                .supertypes()
                .iter()
                .any(|t| self.owner.matches_name(&t.fully_qualified_name))
        } else {
            self.owner
                .matches_name(&method.declaring_type.fully_qualified_name)
        }
    }

    fn matches_parameters(&self, method: &MethodType) -> bool {
        let mut erased = Vec::with_capacity(method.parameter_types.len());
        for param in &method.parameter_types {
            match param.erased_name() {
                Some(name) => erased.push(name),
                None => return false,
            }
        }
        match_params(&self.parameters, &erased)
    }

    pub fn matches_method_type(&self, method: &MethodType) -> bool {
        self.matches_name(method) && self.matches_owner(method) && self.matches_parameters(method)
    }

    /// Invocation or constructor call; unattributed sites never match
    pub fn matches(&self, tree: &J) -> bool {
        match tree {
            J::MethodInvocation(m) => m
                .method_type
                .as_ref()
                .is_some_and(|t| self.matches_method_type(t)),
            J::NewClass(n) => n
                .constructor_type
                .as_ref()
                .is_some_and(|t| self.matches_method_type(t)),
            J::MethodDeclaration(m) => m
                .method_type
                .as_ref()
                .is_some_and(|t| self.matches_method_type(t)),
            _ => false,
        }
    }

    /// Declaration check using the class enclosing the cursor as owner
    pub fn matches_declaration(&self, method: &MethodDeclaration, cursor: &Cursor<'_>) -> bool {
        let Some(class) = cursor.first_enclosing::<ClassDeclaration>() else {
            return false;
        };
        let Some(method_type) = &method.method_type else {
            return false;
        };
        let owner_matches = match class.class_type.as_ref().and_then(JavaType::class_type) {
            Some(owner) if self.match_overrides => owner
                .supertypes()
                .iter()
                .any(|t| self.owner.matches_name(&t.fully_qualified_name)),
            Some(owner) => self.owner.matches_name(&owner.fully_qualified_name),
            None => false,
        };
        owner_matches && self.matches_name(method_type) && self.matches_parameters(method_type)
    }

    /// `import static a.B.method;` or `import static a.B.*;`
    pub fn matches_static_import(&self, import: &Import) -> bool {
        let Some(member) = import.member_name() else {
            return false;
        };
        let name_matches = member == "*"
            || self
                .name
                .as_ref()
                .is_some_and(|regex| regex.is_match(member));
        name_matches && self.owner.matches_name(&import.type_name())
    }
}

fn match_params(patterns: &[ParamPattern], args: &[String]) -> bool {
    match patterns.split_first() {
        None => args.is_empty(),
        Some((ParamPattern::Any, rest)) => (0..=args.len()).any(|skip| match_params(rest, &args[skip..])),
        Some((ParamPattern::Type(matcher), rest)) => match args.split_first() {
            Some((first, remaining)) => matcher.matches_name(first) && match_params(rest, remaining),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ClassKind, ClassType, Primitive};
    use std::sync::Arc;

    fn method(owner: &str, name: &str, params: Vec<JavaType>) -> MethodType {
        MethodType {
            declaring_type: Arc::new(ClassType::new(owner, ClassKind::Class)),
            name: name.to_string(),
            parameter_names: vec![],
            parameter_types: params,
            return_type: JavaType::Primitive(Primitive::Void),
            is_static: false,
            is_constructor: false,
        }
    }

    fn int() -> JavaType {
        JavaType::Primitive(Primitive::Int)
    }

    fn string() -> JavaType {
        JavaType::class("java.lang.String")
    }

    #[test]
    fn test_overload_precision() {
        let matcher = MethodMatcher::new("com.example.Foo bar(int)").unwrap();
        assert!(matcher.matches_method_type(&method("com.example.Foo", "bar", vec![int()])));
        assert!(!matcher.matches_method_type(&method("com.example.Foo", "bar", vec![string()])));
        assert!(!matcher.matches_method_type(&method("com.example.Foo", "bar", vec![])));
    }

    #[test]
    fn test_wildcards_in_owner_and_name() {
        let matcher = MethodMatcher::new("com..* find*(..)").unwrap();
        assert!(matcher.matches_method_type(&method("com.example.deep.Repo", "findAll", vec![])));
        assert!(matcher.matches_method_type(&method("com.Repo", "findById", vec![int()])));
        assert!(!matcher.matches_method_type(&method("org.Repo", "findAll", vec![])));
        assert!(!matcher.matches_method_type(&method("com.Repo", "save", vec![])));
    }

    #[test]
    fn test_bare_star_owner_matches_any_type() {
        let matcher = MethodMatcher::new("* toString()").unwrap();
        assert!(matcher.matches_method_type(&method("java.lang.Object", "toString", vec![])));
        assert!(matcher.matches_method_type(&method("Local", "toString", vec![])));
        assert!(!matcher.matches_method_type(&method("a.B", "hashCode", vec![])));

        let segment = MethodMatcher::new("com.* find()").unwrap();
        assert!(segment.matches_method_type(&method("com.Repo", "find", vec![])));
        assert!(!segment.matches_method_type(&method("com.example.Repo", "find", vec![])));
    }

    #[test]
    fn test_bare_star_parameter_matches_one_argument_of_any_type() {
        let matcher = MethodMatcher::new("a.B m(*)").unwrap();
        assert!(matcher.matches_method_type(&method("a.B", "m", vec![string()])));
        assert!(matcher.matches_method_type(&method("a.B", "m", vec![int()])));
        assert!(!matcher.matches_method_type(&method("a.B", "m", vec![int(), int()])));
        assert!(!matcher.matches_method_type(&method("a.B", "m", vec![])));
    }

    #[test]
    fn test_any_parameters_anywhere() {
        let matcher = MethodMatcher::new("a.B m(.., String)").unwrap();
        assert!(matcher.matches_method_type(&method("a.B", "m", vec![string()])));
        assert!(matcher.matches_method_type(&method("a.B", "m", vec![int(), int(), string()])));
        assert!(!matcher.matches_method_type(&method("a.B", "m", vec![string(), int()])));

        let leading = MethodMatcher::new("a.B m(int, ..)").unwrap();
        assert!(leading.matches_method_type(&method("a.B", "m", vec![int()])));
        assert!(leading.matches_method_type(&method("a.B", "m", vec![int(), string()])));
    }

    #[test]
    fn test_plain_names_resolve_to_java_lang() {
        let matcher = MethodMatcher::new("Integer valueOf(String)").unwrap();
        assert!(matcher.matches_method_type(&method(
            "java.lang.Integer",
            "valueOf",
            vec![JavaType::Primitive(Primitive::String)]
        )));
    }

    #[test]
    fn test_constructor_pattern() {
        let matcher = MethodMatcher::new("java.lang.Integer <constructor>(int)").unwrap();
        let mut ctor = method("java.lang.Integer", "<init>", vec![int()]);
        assert!(!matcher.matches_method_type(&ctor));
        ctor.is_constructor = true;
        assert!(matcher.matches_method_type(&ctor));
    }

    #[test]
    fn test_match_overrides_walks_supertypes() {
        let list = Arc::new(ClassType::new("java.util.List", ClassKind::Interface));
        let mut array_list = ClassType::new("java.util.ArrayList", ClassKind::Class);
        array_list.interfaces.push(list);
        let add = MethodType {
            declaring_type: Arc::new(array_list),
            ..method("x", "add", vec![JavaType::class("java.lang.Object")])
        };

        assert!(!MethodMatcher::new("java.util.List add(..)").unwrap().matches_method_type(&add));
        assert!(
            MethodMatcher::with_overrides("java.util.List add(..)", true)
                .unwrap()
                .matches_method_type(&add)
        );
    }

    #[test]
    fn test_unattributed_call_never_matches() {
        let matcher = MethodMatcher::new("a.B m(java.lang.Object)").unwrap();
        assert!(!matcher.matches_method_type(&method("a.B", "m", vec![JavaType::Unknown])));
    }

    #[test]
    fn test_invalid_patterns() {
        for pattern in ["a.B m(", "m()", "a.B (int)", "a.B m(int))x", "a.B m(in t)", "a.B m((int))"] {
            let err = MethodMatcher::new(pattern).unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Definition, "{pattern}");
        }
    }

    #[test]
    fn test_type_matcher_arrays() {
        let matcher = TypeMatcher::new("java.lang.String[]").unwrap();
        assert!(matcher.matches(&JavaType::Array(Box::new(string()))));
        assert!(!matcher.matches(&string()));
    }
}
