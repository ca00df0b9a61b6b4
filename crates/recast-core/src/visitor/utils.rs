use std::sync::Arc;

use super::{JavaIsoVisitor, JavaVisitor, walk_block};
use crate::result::Result;
use crate::tree::{Block, Cursor, J, Marker, TreeId, TreeKind};

/// Gives every node of a subtree a fresh identity.
///
/// Used on template fragments so that a cached parse never leaks the same
/// identity into two places of a tree.
pub struct RandomizeIds;

impl<P> JavaIsoVisitor<P> for RandomizeIds {
    fn post_visit(&mut self, tree: J, _cursor: &Cursor<'_>, _p: &mut P) -> Result<J> {
        Ok(tree.with_id(TreeId::fresh()))
    }
}

/// Inserts `indent` after every newline in node prefixes and block ends
pub struct ShiftIndent {
    indent: String,
}

impl ShiftIndent {
    pub fn new(indent: impl Into<String>) -> Self {
        ShiftIndent {
            indent: indent.into(),
        }
    }
}

impl<P> JavaIsoVisitor<P> for ShiftIndent {
    fn post_visit(&mut self, tree: J, _cursor: &Cursor<'_>, _p: &mut P) -> Result<J> {
        if self.indent.is_empty() || !tree.prefix().has_newline() {
            return Ok(tree);
        }
        let shifted = tree.prefix().shift_indent(&self.indent);
        Ok(tree.with_prefix(shifted))
    }

    fn visit_block(&mut self, block: &Arc<Block>, cursor: &Cursor<'_>, p: &mut P) -> Result<Arc<Block>> {
        let block = walk_block(self, block, cursor, p)?;
        if self.indent.is_empty() || !block.end.has_newline() {
            return Ok(block);
        }
        Ok(Arc::new(block.with_end(block.end.shift_indent(&self.indent))))
    }
}

/// Flags nodes with a [`Marker::SearchResult`]
pub struct SearchResult;

impl SearchResult {
    pub fn found<K: TreeKind>(node: &Arc<K>, description: Option<&str>) -> Arc<K> {
        let marker = Marker::search_result(description.map(str::to_string));
        let markers = node.markers().add_if_absent(marker);
        if &markers == node.markers() {
            return node.clone();
        }
        Arc::new(node.replace_markers(markers))
    }

    pub fn found_tree(tree: &J, description: Option<&str>) -> J {
        let markers = tree
            .markers()
            .add_if_absent(Marker::search_result(description.map(str::to_string)));
        if &markers == tree.markers() {
            return tree.clone();
        }
        tree.with_markers(markers)
    }
}

struct Collector<F> {
    select: F,
}

impl<T, F> JavaIsoVisitor<Vec<T>> for Collector<F>
where
    F: FnMut(&J, &Cursor<'_>) -> Option<T>,
{
    fn pre_visit(&mut self, tree: J, cursor: &Cursor<'_>, found: &mut Vec<T>) -> Result<J> {
        if let Some(item) = (self.select)(&tree, cursor) {
            found.push(item);
        }
        Ok(tree)
    }
}

/// Read-only traversal gathering whatever `select` returns for each node
pub fn collect<T, F>(tree: &J, select: F) -> Result<Vec<T>>
where
    F: FnMut(&J, &Cursor<'_>) -> Option<T>,
{
    let mut found = Vec::new();
    let mut collector = Collector { select };
    collector.visit(tree, &Cursor::root(), &mut found)?;
    Ok(found)
}

/// First node, in source order, for which `select` returns a value
pub fn find_first<T, F>(tree: &J, mut select: F) -> Result<Option<T>>
where
    F: FnMut(&J, &Cursor<'_>) -> Option<T>,
{
    let mut done = false;
    let found = collect(tree, |node, cursor| {
        if done {
            return None;
        }
        let hit = select(node, cursor);
        done = hit.is_some();
        hit
    })?;
    Ok(found.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{FieldAccess, Identifier, LeftPadded, MarkerKind, Markers, Space};


    fn tree() -> J {
        J::from(FieldAccess {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            target: J::from(Identifier::build("a", None)),
            name: LeftPadded::new(Space::EMPTY, Arc::new(Identifier::build("b", None))),
            ty: None,
        })
    }

    #[test]
    fn test_randomize_ids_changes_every_identity() {
        let original = tree();
        let before: Vec<TreeId> = collect(&original, |n, _| Some(n.id())).unwrap();
        let randomized = RandomizeIds.visit(&original, &Cursor::root(), &mut ()).unwrap();
        let after: Vec<TreeId> = collect(&randomized, |n, _| Some(n.id())).unwrap();

        assert_eq!(before.len(), after.len());
        assert!(before.iter().all(|id| !after.contains(id)));
        assert_eq!(randomized.print(), original.print());
    }

    #[test]
    fn test_shift_indent_moves_prefixes_and_block_ends() {
        let block = J::from(Block {
            id: TreeId::fresh(),
            prefix: Space::single_space(),
            markers: Markers::EMPTY,
            statements: vec![crate::tree::RightPadded::build(
                J::from(Identifier::build("a", None)).with_prefix(Space::newline("    ")),
            )],
            end: Space::newline(""),
        });
        let shifted = ShiftIndent::new("  ").visit(&block, &Cursor::root(), &mut ()).unwrap();
        assert_eq!(shifted.print(), " {\n      a;\n  }");
        assert_eq!(shifted.id(), block.id());
    }

    #[test]
    fn test_found_is_idempotent() {
        let ident = Arc::new(Identifier::build("x", None));
        let once = SearchResult::found(&ident, Some("hit"));
        let twice = SearchResult::found(&once, Some("hit"));
        assert!(Arc::ptr_eq(&once, &twice));
        assert!(once.markers.find_first(&MarkerKind::SearchResult).is_some());
    }

    #[test]
    fn test_collect_with_cursor_context() {
        let names: Vec<String> = collect(&tree(), |node, cursor| match node {
            J::Identifier(i) if cursor.parent_value().is_some() => Some(i.simple_name.clone()),
            _ => None,
        })
        .unwrap();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }
}
