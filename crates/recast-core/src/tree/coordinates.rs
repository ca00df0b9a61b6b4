use std::fmt;

use super::{J, JKind, TreeId};

/// Where a fragment attaches relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    Replace,
    Before,
    After,
    /// First statement of a block; the anchor must be the block
    FirstStatement,
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Site::Replace => "replace",
            Site::Before => "before",
            Site::After => "after",
            Site::FirstStatement => "first-statement",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinates {
    pub anchor: TreeId,
    pub anchor_kind: JKind,
    pub site: Site,
}

impl Coordinates {
    pub fn is_replacement(&self) -> bool {
        self.site == Site::Replace
    }
}

/// Builds [`Coordinates`] anchored at one node
#[derive(Debug, Clone, Copy)]
pub struct CoordinateBuilder {
    anchor: TreeId,
    kind: JKind,
}

impl CoordinateBuilder {
    fn at(&self, site: Site) -> Coordinates {
        Coordinates {
            anchor: self.anchor,
            anchor_kind: self.kind,
            site,
        }
    }

    pub fn replace(&self) -> Coordinates {
        self.at(Site::Replace)
    }

    pub fn before(&self) -> Coordinates {
        self.at(Site::Before)
    }

    pub fn after(&self) -> Coordinates {
        self.at(Site::After)
    }

    pub fn first_statement(&self) -> Coordinates {
        self.at(Site::FirstStatement)
    }
}

impl J {
    pub fn coordinates(&self) -> CoordinateBuilder {
        CoordinateBuilder {
            anchor: self.id(),
            kind: self.kind(),
        }
    }
}
