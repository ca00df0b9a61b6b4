//! Declared types and their members
//!
//! A [`TypeTable`] is built from parsed compilation units in three phases:
//! collect every class declaration (nested ones included), complete each
//! class type with its supertypes, then record constructors, methods and
//! fields. Tables chain to a parent, so the sources of one parse share the
//! stub JDK table without copying it.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error};

use recast_core::tree::*;

use crate::jdk::JDK_SOURCES;
use crate::parser::{ParseMode, parse_compilation_unit};

const OBJECT: &str = "java.lang.Object";

/// Members of one declared class
#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub class_type: Arc<ClassType>,
    pub methods: Vec<Arc<MethodType>>,
    pub fields: IndexMap<String, JavaType>,
}

/// Names a compilation unit can refer to without qualification
#[derive(Debug, Clone, Default)]
pub struct NameScope {
    pub package: Option<String>,
    pub single_imports: Vec<String>,
    pub on_demand_imports: Vec<String>,
    /// `(owner type, member)`; member `*` for on-demand static imports
    pub static_imports: Vec<(String, String)>,
}

impl NameScope {
    pub fn of(cu: &CompilationUnit) -> Self {
        let mut scope = NameScope {
            package: cu.package_name(),
            ..NameScope::default()
        };
        for import in cu.imports() {
            if import.is_static() {
                let member = import.member_name().unwrap_or("*").to_string();
                scope.static_imports.push((import.type_name(), member));
            } else if import.is_wildcard() {
                scope.on_demand_imports.push(import.package_name());
            } else {
                scope.single_imports.push(import.qualified_name());
            }
        }
        scope
    }
}

#[derive(Debug, Default)]
pub struct TypeTable {
    classes: IndexMap<String, ClassInfo>,
    class_decls: HashMap<TreeId, Arc<ClassType>>,
    method_decls: HashMap<TreeId, Arc<MethodType>>,
    parent: Option<Arc<TypeTable>>,
}

static JDK: Lazy<Arc<TypeTable>> = Lazy::new(|| {
    let units: Vec<CompilationUnit> = JDK_SOURCES
        .iter()
        .filter_map(|(path, source)| {
            parse_compilation_unit(source, Path::new(path), ParseMode::Strict)
                .map_err(|e| error!(path, error = %e, "failed to parse JDK stub"))
                .ok()
        })
        .collect();
    let table = TypeTable::build(&units, None);
    debug!(classes = table.classes.len(), "loaded JDK stubs");
    Arc::new(table)
});

/// A declaration found in the collect phase
struct Declared<'a> {
    fqn: String,
    decl: &'a Arc<ClassDeclaration>,
    scope: usize,
    /// Enclosing classes, innermost first, this class included
    enclosing: Vec<String>,
}

impl TypeTable {
    /// Shared table of the stub JDK classes
    pub fn jdk() -> Arc<TypeTable> {
        JDK.clone()
    }

    pub fn build(units: &[CompilationUnit], parent: Option<Arc<TypeTable>>) -> TypeTable {
        let mut table = TypeTable {
            parent,
            ..TypeTable::default()
        };
        let scopes: Vec<NameScope> = units.iter().map(NameScope::of).collect();

        let mut declared = Vec::new();
        for (scope, cu) in units.iter().enumerate() {
            let package = cu.package_name();
            for class in cu.classes() {
                let fqn = match &package {
                    Some(p) => format!("{p}.{}", class.simple_name()),
                    None => class.simple_name().to_string(),
                };
                collect(class, fqn, scope, Vec::new(), &mut declared);
            }
        }
        for d in &declared {
            let mut class_type = ClassType::new(d.fqn.clone(), d.decl.keyword.kind);
            class_type.type_parameters = d.decl.type_parameter_names();
            table.classes.insert(
                d.fqn.clone(),
                ClassInfo {
                    class_type: Arc::new(class_type),
                    methods: Vec::new(),
                    fields: IndexMap::new(),
                },
            );
        }

        let mut completed = HashMap::new();
        for index in 0..declared.len() {
            let mut in_progress = HashSet::new();
            let class_type = table.complete(index, &declared, &scopes, &mut completed, &mut in_progress);
            if let Some(info) = table.classes.get_mut(&declared[index].fqn) {
                info.class_type = class_type;
            }
        }

        for d in &declared {
            table.add_members(d, &scopes[d.scope]);
        }
        table
    }

    fn complete(
        &self,
        index: usize,
        declared: &[Declared<'_>],
        scopes: &[NameScope],
        completed: &mut HashMap<String, Arc<ClassType>>,
        in_progress: &mut HashSet<String>,
    ) -> Arc<ClassType> {
        let d = &declared[index];
        if let Some(done) = completed.get(&d.fqn) {
            return done.clone();
        }
        let provisional = || {
            self.classes
                .get(&d.fqn)
                .map(|info| info.class_type.clone())
                .unwrap_or_else(|| Arc::new(ClassType::new(d.fqn.clone(), d.decl.keyword.kind)))
        };
        if !in_progress.insert(d.fqn.clone()) {
            return provisional();
        }

        let scope = &scopes[d.scope];
        let mut resolve = |expr: &J, table: &TypeTable| -> Option<Arc<ClassType>> {
            let name = qualified_name(expr)?;
            let fqn = table.resolve_class_name(&name, scope, &d.enclosing[1..])?;
            match declared.iter().position(|other| other.fqn == fqn) {
                Some(i) => Some(table.complete(i, declared, scopes, completed, in_progress)),
                None => Some(table.class_type_or_stub(&fqn)),
            }
        };

        let mut class_type = (*provisional()).clone();
        class_type.supertype = match &d.decl.extends {
            Some(extends) => resolve(&extends.element, self),
            None if d.fqn != OBJECT && d.decl.keyword.kind != ClassKind::Interface => {
                Some(self.class_type_or_stub(OBJECT))
            }
            None => None,
        };
        if let Some(implements) = &d.decl.implements {
            class_type.interfaces = implements
                .elements()
                .filter_map(|i| resolve(i, self))
                .collect();
        }

        let class_type = Arc::new(class_type);
        in_progress.remove(&d.fqn);
        completed.insert(d.fqn.clone(), class_type.clone());
        class_type
    }

    fn add_members(&mut self, d: &Declared<'_>, scope: &NameScope) {
        let Some(owner) = self.classes.get(&d.fqn).map(|info| info.class_type.clone()) else {
            return;
        };
        let class_vars = d.decl.type_parameter_names();
        let mut methods = Vec::new();
        let mut fields = IndexMap::new();

        for member in d.decl.body.statements() {
            match member {
                J::MethodDeclaration(method) => {
                    let mut type_vars = class_vars.clone();
                    type_vars.extend(type_parameter_names(method.type_parameters.as_ref()));
                    let resolve = |expr: &J| self.resolve_type_expr(expr, scope, &d.enclosing, &type_vars);
                    let (parameter_names, parameter_types): (Vec<String>, Vec<JavaType>) = method
                        .parameters()
                        .flat_map(|p| {
                            let ty = p.type_expression.as_ref().map_or(JavaType::Unknown, resolve);
                            p.variables()
                                .map(move |v| (v.simple_name().to_string(), ty.clone()))
                                .collect::<Vec<_>>()
                        })
                        .unzip();
                    let return_type = match &method.return_type {
                        Some(expr) => resolve(expr),
                        None => JavaType::Class(owner.clone()),
                    };
                    let method_type = Arc::new(MethodType {
                        declaring_type: owner.clone(),
                        name: method.simple_name().to_string(),
                        parameter_names,
                        parameter_types,
                        return_type,
                        is_static: method.has_modifier("static"),
                        is_constructor: method.is_constructor(),
                    });
                    self.method_decls.insert(method.id, method_type.clone());
                    methods.push(method_type);
                }
                J::VariableDeclarations(field) => {
                    let ty = field
                        .type_expression
                        .as_ref()
                        .map_or(JavaType::Unknown, |expr| {
                            self.resolve_type_expr(expr, scope, &d.enclosing, &class_vars)
                        });
                    for variable in field.variables() {
                        fields.insert(variable.simple_name().to_string(), ty.clone());
                    }
                }
                _ => {}
            }
        }

        if owner.kind != ClassKind::Interface && !methods.iter().any(|m| m.is_constructor) {
            methods.push(Arc::new(MethodType {
                declaring_type: owner.clone(),
                name: owner.simple_name().to_string(),
                parameter_names: Vec::new(),
                parameter_types: Vec::new(),
                return_type: JavaType::Class(owner.clone()),
                is_static: false,
                is_constructor: true,
            }));
        }

        self.class_decls.insert(d.decl.id, owner);
        if let Some(info) = self.classes.get_mut(&d.fqn) {
            info.methods = methods;
            info.fields = fields;
        }
    }

    pub fn class(&self, fqn: &str) -> Option<&ClassInfo> {
        self.classes
            .get(fqn)
            .or_else(|| self.parent.as_ref().and_then(|p| p.class(fqn)))
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.class(fqn).is_some()
    }

    /// Known class type, or a bare one for names outside the table
    pub fn class_type_or_stub(&self, fqn: &str) -> Arc<ClassType> {
        match self.class(fqn) {
            Some(info) => info.class_type.clone(),
            None => Arc::new(ClassType::new(fqn, ClassKind::Class)),
        }
    }

    pub fn declared_class(&self, id: TreeId) -> Option<&Arc<ClassType>> {
        self.class_decls
            .get(&id)
            .or_else(|| self.parent.as_ref().and_then(|p| p.declared_class(id)))
    }

    pub fn declared_method(&self, id: TreeId) -> Option<&Arc<MethodType>> {
        self.method_decls
            .get(&id)
            .or_else(|| self.parent.as_ref().and_then(|p| p.declared_method(id)))
    }

    /// Methods named `name` visible on `fqn`, nearest declaration first.
    ///
    /// A method overridden lower in the hierarchy hides the inherited one.
    pub fn methods_named(&self, fqn: &str, name: &str) -> Vec<Arc<MethodType>> {
        let mut found: Vec<Arc<MethodType>> = Vec::new();
        for class in self.hierarchy(fqn) {
            let Some(info) = self.class(&class.fully_qualified_name) else {
                continue;
            };
            for method in info.methods.iter().filter(|m| !m.is_constructor && m.name == name) {
                let overridden = found
                    .iter()
                    .any(|f| erasure(&f.parameter_types) == erasure(&method.parameter_types));
                if !overridden {
                    found.push(method.clone());
                }
            }
        }
        found
    }

    pub fn constructors(&self, fqn: &str) -> Vec<Arc<MethodType>> {
        self.class(fqn)
            .map(|info| info.methods.iter().filter(|m| m.is_constructor).cloned().collect())
            .unwrap_or_default()
    }

    /// Type of field `name` on `fqn` or one of its supertypes
    pub fn field(&self, fqn: &str, name: &str) -> Option<(Arc<ClassType>, JavaType)> {
        self.hierarchy(fqn).into_iter().find_map(|class| {
            let info = self.class(&class.fully_qualified_name)?;
            let ty = info.fields.get(name)?;
            Some((info.class_type.clone(), ty.clone()))
        })
    }

    /// `fqn` and its supertypes, ending with `java.lang.Object`
    fn hierarchy(&self, fqn: &str) -> Vec<Arc<ClassType>> {
        let mut chain = self.class_type_or_stub(fqn).supertypes();
        if !chain.iter().any(|c| c.fully_qualified_name == OBJECT) {
            chain.push(self.class_type_or_stub(OBJECT));
        }
        chain
    }

    /// Fully qualified name of the class `name` refers to.
    ///
    /// Lookup order: member classes of the enclosing classes, single-type
    /// imports, the unit's package, `java.lang`, on-demand imports. A
    /// single-type import answers even when the imported class is unknown.
    pub fn resolve_class_name(&self, name: &str, scope: &NameScope, enclosing: &[String]) -> Option<String> {
        if let Some((first, rest)) = name.split_once('.') {
            if self.contains(name) {
                return Some(name.to_string());
            }
            let outer = self.resolve_class_name(first, scope, enclosing)?;
            let nested = format!("{outer}.{rest}");
            return self.contains(&nested).then_some(nested);
        }

        for outer in enclosing {
            if outer.rsplit('.').next() == Some(name) {
                return Some(outer.clone());
            }
            let member = format!("{outer}.{name}");
            if self.contains(&member) {
                return Some(member);
            }
        }
        if let Some(import) = scope
            .single_imports
            .iter()
            .find(|i| i.rsplit('.').next() == Some(name))
        {
            return Some(import.clone());
        }
        let same_package = match &scope.package {
            Some(p) => format!("{p}.{name}"),
            None => name.to_string(),
        };
        if self.contains(&same_package) {
            return Some(same_package);
        }
        let lang = format!("java.lang.{name}");
        if self.contains(&lang) {
            return Some(lang);
        }
        scope
            .on_demand_imports
            .iter()
            .map(|p| format!("{p}.{name}"))
            .find(|candidate| self.contains(candidate))
    }

    /// Type denoted by a type expression, [`JavaType::Unknown`] when unresolvable
    pub fn resolve_type_expr(
        &self,
        expr: &J,
        scope: &NameScope,
        enclosing: &[String],
        type_vars: &[String],
    ) -> JavaType {
        match expr {
            J::Identifier(ident) => {
                if let Some(primitive) = Primitive::from_keyword(&ident.simple_name) {
                    JavaType::Primitive(primitive)
                } else if type_vars.contains(&ident.simple_name) {
                    JavaType::GenericTypeVariable(ident.simple_name.clone())
                } else {
                    self.class_named(&ident.simple_name, scope, enclosing)
                }
            }
            J::FieldAccess(_) => match qualified_name(expr) {
                Some(name) => self.class_named(&name, scope, enclosing),
                None => JavaType::Unknown,
            },
            J::ParameterizedType(parameterized) => {
                let base = self.resolve_type_expr(&parameterized.clazz, scope, enclosing, type_vars);
                let Some(base) = base.class_type().cloned() else {
                    return JavaType::Unknown;
                };
                let type_arguments: Vec<JavaType> = parameterized
                    .type_parameters
                    .elements()
                    .filter(|arg| !matches!(arg, J::Empty(_)))
                    .map(|arg| self.resolve_type_expr(arg, scope, enclosing, type_vars))
                    .collect();
                if type_arguments.is_empty() {
                    JavaType::Class(base)
                } else {
                    JavaType::Parameterized { base, type_arguments }
                }
            }
            J::ArrayType(array) => JavaType::Array(Box::new(self.resolve_type_expr(
                &array.element_type,
                scope,
                enclosing,
                type_vars,
            ))),
            _ => JavaType::Unknown,
        }
    }

    fn class_named(&self, name: &str, scope: &NameScope, enclosing: &[String]) -> JavaType {
        match self.resolve_class_name(name, scope, enclosing) {
            Some(fqn) => JavaType::Class(self.class_type_or_stub(&fqn)),
            None => JavaType::Unknown,
        }
    }
}

fn collect<'a>(
    class: &'a Arc<ClassDeclaration>,
    fqn: String,
    scope: usize,
    mut enclosing: Vec<String>,
    declared: &mut Vec<Declared<'a>>,
) {
    enclosing.insert(0, fqn.clone());
    for member in class.body.statements() {
        if let J::ClassDeclaration(inner) = member {
            let inner_fqn = format!("{fqn}.{}", inner.simple_name());
            collect(inner, inner_fqn, scope, enclosing.clone(), declared);
        }
    }
    declared.push(Declared {
        fqn,
        decl: class,
        scope,
        enclosing,
    });
}

/// Names of the plain type parameters in a `<...>` list
pub(crate) fn type_parameter_names(type_parameters: Option<&Container<J>>) -> Vec<String> {
    type_parameters
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

fn erasure(types: &[JavaType]) -> Vec<Option<String>> {
    types.iter().map(JavaType::erased_name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_of(sources: &[&str]) -> TypeTable {
        let units: Vec<CompilationUnit> = sources
            .iter()
            .map(|s| parse_compilation_unit(s, Path::new("Test.java"), ParseMode::Strict).unwrap())
            .collect();
        TypeTable::build(&units, Some(TypeTable::jdk()))
    }

    #[test]
    fn test_jdk_stubs_all_parse() {
        let jdk = TypeTable::jdk();
        assert_eq!(jdk.classes.len(), JDK_SOURCES.len());
        let integer = jdk.class("java.lang.Integer").unwrap();
        assert!(integer.class_type.is_assignable_to("java.lang.Number"));
        assert!(integer.class_type.is_assignable_to("java.lang.Comparable"));
    }

    #[test]
    fn test_overloads_are_kept_apart() {
        let jdk = TypeTable::jdk();
        let signatures: Vec<String> = jdk
            .methods_named("java.lang.Integer", "valueOf")
            .iter()
            .map(|m| m.signature())
            .collect();
        assert_eq!(
            signatures,
            vec![
                "java.lang.Integer valueOf(int)",
                "java.lang.Integer valueOf(java.lang.String)"
            ]
        );
    }

    #[test]
    fn test_inherited_methods_and_fields() {
        let jdk = TypeTable::jdk();
        let to_string = jdk.methods_named("java.util.ArrayList", "hashCode");
        assert_eq!(to_string[0].declaring_type.fully_qualified_name, "java.lang.Object");

        let size = jdk.methods_named("java.util.ArrayList", "size");
        assert_eq!(size[0].declaring_type.fully_qualified_name, "java.util.Collection");

        let (owner, ty) = jdk.field("java.lang.System", "out").unwrap();
        assert_eq!(owner.fully_qualified_name, "java.lang.System");
        assert_eq!(ty.erased_name().as_deref(), Some("java.io.PrintStream"));
    }

    #[test]
    fn test_source_classes_chain_to_jdk() {
        let table = table_of(&[
            "package com.example;\nimport java.util.List;\npublic class Foo extends Base { void run(List<String> names, int n) {} }",
            "package com.example;\nclass Base { static class Inner {} Base(String s) {} }",
        ]);
        let foo = table.class("com.example.Foo").unwrap();
        assert_eq!(
            foo.class_type.supertype.as_ref().map(|s| s.fully_qualified_name.as_str()),
            Some("com.example.Base")
        );
        assert_eq!(foo.methods[0].signature(), "com.example.Foo run(java.util.List,int)");
        assert_eq!(table.constructors("com.example.Foo").len(), 1);
        assert_eq!(table.constructors("com.example.Base")[0].signature(), "com.example.Base <constructor>(java.lang.String)");
        assert!(table.contains("com.example.Base.Inner"));
        assert!(table.contains("java.lang.String"));
    }

    #[test]
    fn test_name_resolution_order() {
        let cu = parse_compilation_unit(
            "package p;\nimport java.util.*;\nimport q.List;\nimport static java.lang.Math.max;\nclass A {}",
            Path::new("A.java"),
            ParseMode::Strict,
        )
        .unwrap();
        let scope = NameScope::of(&cu);
        assert_eq!(scope.static_imports, vec![("java.lang.Math".to_string(), "max".to_string())]);

        let table = TypeTable::build(std::slice::from_ref(&cu), Some(TypeTable::jdk()));
        assert_eq!(table.resolve_class_name("List", &scope, &[]).as_deref(), Some("q.List"));
        assert_eq!(table.resolve_class_name("Map", &scope, &[]).as_deref(), Some("java.util.Map"));
        assert_eq!(table.resolve_class_name("String", &scope, &[]).as_deref(), Some("java.lang.String"));
        assert_eq!(table.resolve_class_name("A", &scope, &[]).as_deref(), Some("p.A"));
        assert_eq!(table.resolve_class_name("Nope", &scope, &[]), None);
    }

    #[test]
    fn test_cyclic_hierarchy_terminates() {
        let table = table_of(&["class A extends B {}", "class B extends A {}"]);
        assert!(table.contains("A"));
        assert!(table.contains("B"));
    }
}
