//! Parent chain of the node currently being visited
//!
//! A [`Cursor`] borrows its parent, so the chain lives on the stack of the
//! traversal that built it and cannot outlive that traversal. Nodes never
//! point to their parents.

use std::sync::Arc;

use super::{J, TreeKind};

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    parent: Option<&'a Cursor<'a>>,
    value: Option<&'a J>,
}

impl Cursor<'static> {
    /// Empty cursor above the root of a traversal
    pub const fn root() -> Cursor<'static> {
        Cursor {
            parent: None,
            value: None,
        }
    }
}

impl<'a> Cursor<'a> {
    pub fn child<'b>(&'b self, value: &'b J) -> Cursor<'b>
    where
        'a: 'b,
    {
        Cursor {
            parent: Some(self),
            value: Some(value),
        }
    }

    pub fn value(&self) -> Option<&'a J> {
        self.value
    }

    pub fn parent(&self) -> Option<&'a Cursor<'a>> {
        self.parent
    }

    /// Value of the nearest ancestor that holds a node
    pub fn parent_value(&self) -> Option<&'a J> {
        let mut current = self.parent;
        while let Some(cursor) = current {
            if cursor.value.is_some() {
                return cursor.value;
            }
            current = cursor.parent;
        }
        None
    }

    /// Cursors from this one up to the root
    pub fn iter(&self) -> CursorIter<'_> {
        CursorIter { next: Some(self) }
    }

    /// Node values from the current node up to the root
    pub fn path(&self) -> impl Iterator<Item = &J> {
        self.iter().filter_map(|c| c.value)
    }

    pub fn depth(&self) -> usize {
        self.path().count()
    }

    /// Top-most node, normally the compilation unit
    pub fn root_value(&self) -> Option<&J> {
        self.path().last()
    }

    /// Nearest node of kind `K`, starting with the current node
    pub fn first_enclosing<K: TreeKind>(&self) -> Option<&Arc<K>> {
        self.path().find_map(K::cast)
    }

    /// Nearest strict ancestor of kind `K`
    pub fn first_enclosing_ancestor<K: TreeKind>(&self) -> Option<&Arc<K>> {
        self.path().skip(1).find_map(K::cast)
    }

    /// Walk up from the parent and return the first cursor whose node matches
    pub fn drop_parent_until(&self, predicate: impl Fn(&J) -> bool) -> Option<&Cursor<'_>> {
        self.iter()
            .skip(1)
            .find(|c| c.value.is_some_and(&predicate))
    }
}

pub struct CursorIter<'a> {
    next: Option<&'a Cursor<'a>>,
}

impl<'a> Iterator for CursorIter<'a> {
    type Item = &'a Cursor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Block, Identifier, Markers, RightPadded, Space, TreeId};

    fn block_with(statement: J) -> J {
        J::from(Block {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            statements: vec![RightPadded::build(statement)],
            end: Space::EMPTY,
        })
    }

    #[test]
    fn test_first_enclosing_and_path() {
        let ident = J::from(Identifier::build("x", None));
        let outer = block_with(ident.clone());
        let inner = block_with(ident.clone());

        let root = Cursor::root();
        let c1 = root.child(&outer);
        let c2 = c1.child(&inner);
        let c3 = c2.child(&ident);

        assert_eq!(c3.depth(), 3);
        assert_eq!(c3.root_value().map(J::id), Some(outer.id()));

        let nearest = c3.first_enclosing::<Block>().map(|b| b.id);
        assert_eq!(nearest, Some(inner.id()));
        assert_eq!(c3.first_enclosing::<Identifier>().map(|i| i.id), Some(ident.id()));
        assert!(c3.first_enclosing_ancestor::<Identifier>().is_none());
        assert_eq!(c3.parent_value().map(J::id), Some(inner.id()));
    }

    #[test]
    fn test_drop_parent_until() {
        let ident = J::from(Identifier::build("x", None));
        let outer = block_with(ident.clone());
        let inner = block_with(ident.clone());

        let root = Cursor::root();
        let c1 = root.child(&outer);
        let c2 = c1.child(&inner);
        let c3 = c2.child(&ident);

        let found = c3.drop_parent_until(|j| j.id() == outer.id());
        assert_eq!(found.and_then(|c| c.value()).map(J::id), Some(outer.id()));
        assert!(c3.drop_parent_until(|j| j.id() == ident.id()).is_none());
    }
}
