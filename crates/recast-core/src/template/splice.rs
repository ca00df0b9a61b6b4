use std::sync::Arc;

use crate::error::RecastError;
use crate::result::Result;
use crate::tree::{Block, Coordinates, Cursor, J, RightPadded, Site, Space, TreeId};
use crate::visitor::{JavaIsoVisitor, JavaVisitor, visit_tree, walk_block};

use super::IndentStyle;

/// Root-first path from the top of the traversal down to `anchor`
pub(crate) fn path_to(scope: &J, parent: &Cursor<'_>, anchor: TreeId) -> Result<Option<Vec<J>>> {
    struct Finder {
        anchor: TreeId,
        path: Option<Vec<J>>,
    }

    impl JavaIsoVisitor<()> for Finder {
        fn pre_visit(&mut self, tree: J, cursor: &Cursor<'_>, _p: &mut ()) -> Result<J> {
            if self.path.is_none() && tree.id() == self.anchor {
                let mut path: Vec<J> = cursor.path().cloned().collect();
                path.reverse();
                self.path = Some(path);
            }
            Ok(tree)
        }
    }

    let mut finder = Finder { anchor, path: None };
    finder.visit(scope, parent, &mut ())?;
    Ok(finder.path)
}

/// Whether the block at `path[index]` is the body of a class
pub(crate) fn is_class_body(path: &[J], index: usize) -> bool {
    matches!(path.get(index), Some(J::Block(_)))
        && index > 0
        && matches!(path.get(index - 1), Some(J::ClassDeclaration(_) | J::NewClass(_)))
}

/// Indentation of the nearest line start at or above `path[index]`
pub(crate) fn line_indent(path: &[J], index: usize) -> String {
    path[..=index.min(path.len().saturating_sub(1))]
        .iter()
        .rev()
        .find(|node| node.prefix().has_newline())
        .map(|node| node.prefix().indent().to_string())
        .unwrap_or_default()
}

/// Indentation of statements inside the block at `path[index]`
pub(crate) fn block_indent(path: &[J], index: usize, style: &IndentStyle) -> String {
    if let Some(J::Block(block)) = path.get(index)
        && let Some(first) = block.statements().find(|s| s.prefix().has_newline())
    {
        return first.prefix().indent().to_string();
    }
    let owner = if index == 0 { String::new() } else { line_indent(path, index - 1) };
    format!("{owner}{}", style.unit())
}

fn incompatible(coordinates: &Coordinates, fragment: &J, message: impl Into<String>) -> RecastError {
    RecastError::incompatible_coordinates(
        coordinates.anchor_kind,
        coordinates.site.to_string(),
        fragment.kind().to_string(),
        message,
    )
}

/// Places fragments at coordinates inside a scope
pub(crate) struct Splice {
    pub coordinates: Coordinates,
    pub fragments: Vec<RightPadded<J>>,
    /// Indentation of inserted statements
    pub indent: String,
    /// Indentation of the closing brace of the target block
    pub owner_indent: String,
    pub spliced: bool,
}

impl Splice {
    fn first_fragment(&self) -> Result<&J> {
        self.fragments
            .first()
            .map(|f| &f.element)
            .ok_or_else(|| RecastError::internal_error("template produced no fragment"))
    }

    /// Fragments ready to sit in a block, the first one on its own line
    fn inserted(&self) -> Vec<RightPadded<J>> {
        self.fragments
            .iter()
            .enumerate()
            .map(|(i, fragment)| {
                if i > 0 {
                    return fragment.clone();
                }
                let trimmed = fragment.element.prefix().trim_leading_whitespace();
                let prefix = Space::format(format!("\n{}{}", self.indent, trimmed));
                fragment.with_element(fragment.element.with_prefix(prefix))
            })
            .collect()
    }

    fn splice_block(&mut self, block: &Arc<Block>) -> Option<Arc<Block>> {
        let anchor = self.coordinates.anchor;
        let mut statements = block.statements.clone();
        match self.coordinates.site {
            Site::FirstStatement if block.id == anchor => {
                let inserted = self.inserted();
                statements.splice(0..0, inserted);
            }
            Site::Before | Site::After | Site::Replace => {
                let index = statements.iter().position(|s| s.element.id() == anchor)?;
                match self.coordinates.site {
                    Site::Before => {
                        statements.splice(index..index, self.inserted());
                    }
                    Site::After => {
                        statements.splice(index + 1..index + 1, self.inserted());
                    }
                    _ => {
                        let replaced = statements[index].element.prefix().clone();
                        let mut fragments = self.fragments.clone();
                        if let Some(first) = fragments.first_mut() {
                            *first = first.with_element(first.element.with_prefix(replaced));
                        }
                        statements.splice(index..=index, fragments);
                    }
                }
            }
            _ => return None,
        }

        self.spliced = true;
        let mut block = block.with_statements(statements);
        if self.coordinates.site != Site::Replace && !block.end.has_newline() {
            block = block.with_end(Space::newline(&self.owner_indent));
        }
        Some(Arc::new(block))
    }
}

impl JavaVisitor<()> for Splice {
    fn visit(&mut self, tree: &J, parent: &Cursor<'_>, p: &mut ()) -> Result<J> {
        if self.spliced {
            return Ok(tree.clone());
        }
        if self.coordinates.site == Site::Replace
            && self.fragments.len() == 1
            && tree.id() == self.coordinates.anchor
        {
            let fragment = self.first_fragment()?.clone();
            if tree.is_expression() && !fragment.is_expression() && !matches!(parent.value(), Some(J::Block(_))) {
                return Err(incompatible(
                    &self.coordinates,
                    &fragment,
                    "an expression cannot be replaced by a statement",
                ));
            }
            self.spliced = true;
            return Ok(fragment.with_prefix(tree.prefix().clone()));
        }
        visit_tree(self, tree, parent, p)
    }

    fn visit_block(&mut self, block: &Arc<Block>, cursor: &Cursor<'_>, p: &mut ()) -> Result<J> {
        let direct = match self.coordinates.site {
            Site::FirstStatement => block.id == self.coordinates.anchor,
            Site::Before | Site::After => block.statements().any(|s| s.id() == self.coordinates.anchor),
            Site::Replace => {
                self.fragments.len() > 1 && block.statements().any(|s| s.id() == self.coordinates.anchor)
            }
        };
        if direct && let Some(spliced) = self.splice_block(block) {
            return Ok(J::Block(spliced));
        }
        walk_block(self, block, cursor, p).map(J::from)
    }
}

/// Run `splice` over `scope`, reporting typed-slot mismatches as unusable coordinates
pub(crate) fn apply(mut splice: Splice, scope: &J, parent: &Cursor<'_>) -> Result<J> {
    let coordinates = splice.coordinates;
    let result = splice.visit(scope, parent, &mut ());
    match result {
        Ok(tree) if splice.spliced => Ok(tree),
        Ok(_) => Err(RecastError::AnchorNotFound {
            anchor: format!("{} {}", coordinates.anchor_kind, coordinates.anchor),
        }),
        Err(RecastError::UnexpectedKind { expected, actual }) => Err(RecastError::incompatible_coordinates(
            coordinates.anchor_kind,
            coordinates.site.to_string(),
            actual.to_string(),
            format!("the slot requires {expected}"),
        )),
        Err(other) => Err(other),
    }
}
