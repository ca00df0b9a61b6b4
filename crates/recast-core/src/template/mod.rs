//! Tree fragments synthesized from source snippets
//!
//! A [`JavaTemplate`] holds a snippet with placeholders. Applying it at some
//! [`Coordinates`] captures the names and types visible there, parses the
//! snippet inside a scaffold compilation unit, binds the arguments, and
//! splices the resulting fragment into the tree. Parsing is delegated to a
//! [`TemplateParser`] supplied by a language front end; parsed scaffolds are
//! shared through a [`TemplateCache`].

mod cache;
mod context;
mod format;
mod placeholder;
mod splice;

pub use cache::TemplateCache;
pub use context::{Shape, TemplateContext};
pub use format::IndentStyle;
pub use placeholder::{Placeholder, PlaceholderKind, parse_placeholders};

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::RecastError;
use crate::execution::{AddImport, ExecutionContext};
use crate::result::Result;
use crate::tree::{CompilationUnit, Coordinates, Cursor, Identifier, J, RightPadded, Site, TreeKind};
use crate::visitor::{JavaVisitor, RandomizeIds, ShiftIndent};
use placeholder::{argument_count, stand_in, stand_in_index};

/// Parses generated scaffold source into a tree
pub trait TemplateParser: Send + Sync {
    fn parse_template(&self, source: &str) -> Result<Arc<CompilationUnit>>;
}

/// Value bound to a placeholder
#[derive(Debug, Clone)]
pub enum TemplateArg {
    Tree(J),
    Text(String),
}

impl TemplateArg {
    fn source_text(&self) -> String {
        match self {
            TemplateArg::Tree(tree) => tree.print_trimmed(),
            TemplateArg::Text(text) => text.clone(),
        }
    }
}

impl From<J> for TemplateArg {
    fn from(tree: J) -> Self {
        TemplateArg::Tree(tree)
    }
}

impl From<&J> for TemplateArg {
    fn from(tree: &J) -> Self {
        TemplateArg::Tree(tree.clone())
    }
}

impl<K: TreeKind> From<Arc<K>> for TemplateArg {
    fn from(node: Arc<K>) -> Self {
        TemplateArg::Tree(K::wrap(node))
    }
}

impl From<&str> for TemplateArg {
    fn from(text: &str) -> Self {
        TemplateArg::Text(text.to_string())
    }
}

impl From<String> for TemplateArg {
    fn from(text: String) -> Self {
        TemplateArg::Text(text)
    }
}

pub struct JavaTemplate {
    code: String,
    imports: Vec<String>,
    placeholders: Vec<Placeholder>,
    parser: Arc<dyn TemplateParser>,
    cache: Arc<TemplateCache>,
    indent: Option<IndentStyle>,
}

impl fmt::Debug for JavaTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JavaTemplate")
            .field("code", &self.code)
            .field("imports", &self.imports)
            .field("placeholders", &self.placeholders.len())
            .finish()
    }
}

pub struct JavaTemplateBuilder {
    code: String,
    imports: Vec<String>,
    parser: Option<Arc<dyn TemplateParser>>,
    cache: Option<Arc<TemplateCache>>,
    indent: Option<IndentStyle>,
}

impl JavaTemplateBuilder {
    /// Types the snippet refers to that the target unit may not import
    pub fn imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports.extend(imports.into_iter().map(Into::into));
        self
    }

    pub fn parser(mut self, parser: Arc<dyn TemplateParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn cache(mut self, cache: Arc<TemplateCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Indentation unit for inserted statements; detected from the unit when unset
    pub fn indent(mut self, indent: IndentStyle) -> Self {
        self.indent = Some(indent);
        self
    }

    /// Parse placeholders and check that the snippet parses in some position
    pub fn build(self) -> Result<JavaTemplate> {
        let parser = self
            .parser
            .ok_or_else(|| RecastError::template_definition(&self.code, "no template parser configured"))?;
        let placeholders = parse_placeholders(&self.code)?;
        let template = JavaTemplate {
            code: self.code,
            imports: self.imports,
            placeholders,
            parser,
            cache: self.cache.unwrap_or_else(TemplateCache::global),
            indent: self.indent,
        };
        template.trial_parse()?;
        Ok(template)
    }
}

impl JavaTemplate {
    pub fn builder(code: impl Into<String>) -> JavaTemplateBuilder {
        JavaTemplateBuilder {
            code: code.into(),
            imports: Vec::new(),
            parser: None,
            cache: None,
            indent: None,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Queue the template's imports on the unit being visited
    pub fn add_imports(&self, ctx: &mut ExecutionContext) {
        for import in &self.imports {
            match import.strip_prefix("static ") {
                Some(member) => {
                    let member = member.trim();
                    if let Some((owner, name)) = member.rsplit_once('.') {
                        ctx.do_after_visit(AddImport::new_static(owner, name));
                    }
                }
                None => ctx.add_import(import.trim()),
            }
        }
    }

    pub fn parameter_count(&self) -> usize {
        argument_count(&self.placeholders)
    }

    fn has_text_placeholders(&self) -> bool {
        self.placeholders
            .iter()
            .any(|p| p.kind == PlaceholderKind::Text)
    }

    /// Snippet with text placeholders pasted and tree placeholders replaced by stand-ins
    fn substituted(&self, args: Option<&[TemplateArg]>) -> (String, Vec<(String, String)>) {
        let mut snippet = String::with_capacity(self.code.len());
        let mut stand_ins: Vec<(String, String)> = Vec::new();
        let mut last = 0;
        for placeholder in &self.placeholders {
            snippet.push_str(&self.code[last..placeholder.start]);
            let arg = args.and_then(|a| a.get(placeholder.argument));
            match (&placeholder.kind, arg) {
                (PlaceholderKind::Text, Some(arg)) | (PlaceholderKind::Tree { .. }, Some(arg @ TemplateArg::Text(_))) => {
                    snippet.push_str(&arg.source_text());
                }
                (PlaceholderKind::Text, None) => {}
                (PlaceholderKind::Tree { type_name }, arg) => {
                    let name = stand_in(placeholder.argument);
                    if !stand_ins.iter().any(|(n, _)| *n == name) {
                        let ty = type_name
                            .clone()
                            .or_else(|| match arg {
                                Some(TemplateArg::Tree(tree)) => tree
                                    .java_type()
                                    .filter(|t| !matches!(t, crate::tree::JavaType::Method(_) | crate::tree::JavaType::Unknown))
                                    .map(|t| t.to_source()),
                                _ => None,
                            })
                            .unwrap_or_else(|| "Object".to_string());
                        stand_ins.push((name.clone(), ty));
                    }
                    snippet.push_str(&name);
                }
            }
            last = placeholder.end;
        }
        snippet.push_str(&self.code[last..]);
        (snippet, stand_ins)
    }

    fn parse(&self, context: &TemplateContext, shape: Shape, snippet: &str, stand_ins: &[(String, String)]) -> Result<Vec<RightPadded<J>>> {
        let source = context.scaffold(shape, snippet, stand_ins, &self.imports);
        let cu = self
            .cache
            .get_or_parse(&source, |s| self.parser.parse_template(s))?;
        context::extract(&cu, shape)
    }

    /// Context-free parse in every position; text placeholders defer the check to use
    fn trial_parse(&self) -> Result<()> {
        if self.has_text_placeholders() {
            return Ok(());
        }
        let (snippet, stand_ins) = self.substituted(None);
        let context = TemplateContext::default();
        let mut last_error = None;
        for shape in [Shape::Expression, Shape::Statement, Shape::Member] {
            match self.parse(&context, shape, &snippet, &stand_ins) {
                Ok(_) => return Ok(()),
                Err(err) => last_error = Some(err),
            }
        }
        Err(RecastError::template_definition(
            &self.code,
            last_error.map_or_else(|| "snippet does not parse".to_string(), |e| e.to_string()),
        ))
    }

    /// Apply within the node the cursor points at, returning its replacement
    pub fn apply(&self, cursor: &Cursor<'_>, coordinates: Coordinates, args: &[TemplateArg]) -> Result<J> {
        let scope = cursor.value().ok_or_else(|| RecastError::AnchorNotFound {
            anchor: format!("{} {}", coordinates.anchor_kind, coordinates.anchor),
        })?;
        let root = Cursor::root();
        let parent = cursor.parent().unwrap_or(&root);
        self.apply_within(scope, parent, coordinates, args)
    }

    /// Apply within `scope`, whose ancestors are given by `parent`.
    ///
    /// `scope` may be a modified copy of the node `parent` was built for; only
    /// its subtree is searched for the anchor.
    pub fn apply_within(
        &self,
        scope: &J,
        parent: &Cursor<'_>,
        coordinates: Coordinates,
        args: &[TemplateArg],
    ) -> Result<J> {
        let expected = self.parameter_count();
        if args.len() != expected {
            return Err(RecastError::TemplateParameterCount {
                code: self.code.clone(),
                expected,
                actual: args.len(),
            });
        }

        let path = splice::path_to(scope, parent, coordinates.anchor)?.ok_or_else(|| {
            RecastError::AnchorNotFound {
                anchor: format!("{} {}", coordinates.anchor_kind, coordinates.anchor),
            }
        })?;
        let anchor_index = path.len() - 1;
        let anchor = &path[anchor_index];
        let parent_index = anchor_index.checked_sub(1);
        let in_block = parent_index.is_some_and(|i| matches!(path[i], J::Block(_)));
        let in_class_body = parent_index.is_some_and(|i| splice::is_class_body(&path, i));

        let shapes: &[Shape] = match coordinates.site {
            Site::Replace if in_class_body => &[Shape::Member],
            Site::Replace if in_block || matches!(anchor, J::Block(_)) => &[Shape::Statement, Shape::Expression],
            Site::Replace => &[Shape::Expression],
            Site::Before | Site::After if in_class_body => &[Shape::Member],
            Site::Before | Site::After if in_block => &[Shape::Statement],
            Site::FirstStatement if splice::is_class_body(&path, anchor_index) => &[Shape::Member],
            Site::FirstStatement if matches!(anchor, J::Block(_)) => &[Shape::Statement],
            _ => {
                return Err(RecastError::incompatible_coordinates(
                    coordinates.anchor_kind,
                    coordinates.site.to_string(),
                    "fragment",
                    "the anchor is not a statement of a block",
                ));
            }
        };

        let style = match (&self.indent, path.first()) {
            (Some(style), _) => style.clone(),
            (None, Some(J::CompilationUnit(cu))) => IndentStyle::detect(cu),
            _ => IndentStyle::default(),
        };
        let (indent, owner_indent) = match coordinates.site {
            Site::Replace => (splice::line_indent(&path, anchor_index), String::new()),
            Site::FirstStatement => (
                splice::block_indent(&path, anchor_index, &style),
                splice::line_indent(&path, anchor_index.saturating_sub(1)),
            ),
            Site::Before | Site::After => {
                let block_index = anchor_index.saturating_sub(1);
                let indent = if anchor.prefix().has_newline() {
                    anchor.prefix().indent().to_string()
                } else {
                    splice::block_indent(&path, block_index, &style)
                };
                (indent, splice::line_indent(&path, block_index.saturating_sub(1)))
            }
        };

        let context = TemplateContext::capture(&path);
        let (snippet, stand_ins) = self.substituted(Some(args));
        let mut fragments = None;
        let mut last_error = None;
        for shape in shapes {
            match self.parse(&context, *shape, &snippet, &stand_ins) {
                Ok(parsed) => {
                    fragments = Some(parsed);
                    break;
                }
                Err(err) => last_error = Some(err),
            }
        }
        let Some(fragments) = fragments else {
            // A snippet that parses in some other position is fine; the site is not.
            let elsewhere = [Shape::Expression, Shape::Statement, Shape::Member]
                .into_iter()
                .filter(|shape| !shapes.contains(shape))
                .find(|shape| self.parse(&context, *shape, &snippet, &stand_ins).is_ok());
            return Err(match elsewhere {
                Some(shape) => RecastError::incompatible_coordinates(
                    coordinates.anchor_kind,
                    coordinates.site.to_string(),
                    shape.to_string(),
                    format!("the site only accepts {}", describe(shapes)),
                ),
                None => RecastError::template_definition(
                    &self.code,
                    last_error.map_or_else(|| "snippet does not parse".to_string(), |e| e.to_string()),
                ),
            });
        };

        let mut bind = Bind {
            args,
            used: HashSet::new(),
        };
        let mut shift = ShiftIndent::new(indent.clone());
        let root = Cursor::root();
        let fragments = fragments
            .into_iter()
            .map(|fragment| {
                let tree = RandomizeIds.visit(&fragment.element, &root, &mut ())?;
                let tree = shift.visit(&tree, &root, &mut ())?;
                let tree = bind.visit(&tree, &root, &mut ())?;
                Ok(fragment.with_element(tree))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            template = %self.code,
            site = %coordinates.site,
            anchor = %coordinates.anchor_kind,
            fragments = fragments.len(),
            "applying template"
        );

        splice::apply(
            splice::Splice {
                coordinates,
                fragments,
                indent,
                owner_indent,
                spliced: false,
            },
            scope,
            parent,
        )
    }
}

fn describe(shapes: &[Shape]) -> String {
    shapes.iter().map(Shape::to_string).collect::<Vec<_>>().join(" or ")
}

/// Replaces stand-in identifiers with the bound tree arguments
struct Bind<'a> {
    args: &'a [TemplateArg],
    used: HashSet<usize>,
}

impl JavaVisitor<()> for Bind<'_> {
    fn visit_identifier(&mut self, node: &Arc<Identifier>, _cursor: &Cursor<'_>, _p: &mut ()) -> Result<J> {
        let bound = stand_in_index(&node.simple_name).and_then(|i| match self.args.get(i) {
            Some(TemplateArg::Tree(tree)) => Some((i, tree)),
            _ => None,
        });
        let Some((index, tree)) = bound else {
            return Ok(J::Identifier(node.clone()));
        };
        let tree = if self.used.insert(index) {
            tree.clone()
        } else {
            RandomizeIds.visit(tree, &Cursor::root(), &mut ())?
        };
        Ok(tree.with_prefix(node.prefix.clone()))
    }
}
