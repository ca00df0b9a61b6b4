//! Typed tags attached to tree nodes
//!
//! Markers carry information that is not source text: search hits, stamps
//! left by recipes to stay idempotent, comments meant for reviewers and
//! arbitrary extension payloads. They survive every `with_*` copy of a node.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TreeId;

/// Discriminant used for marker lookups
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    SearchResult,
    RecipeStamp,
    Comment,
    Custom(String),
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerKind::SearchResult => f.write_str("SearchResult"),
            MarkerKind::RecipeStamp => f.write_str("RecipeStamp"),
            MarkerKind::Comment => f.write_str("Comment"),
            MarkerKind::Custom(kind) => write!(f, "Custom({kind})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Marker {
    /// A node flagged by a search recipe
    SearchResult {
        id: TreeId,
        description: Option<String>,
    },
    /// A node already processed by the named recipe
    RecipeStamp { id: TreeId, recipe: String },
    /// Reviewer-facing note that is not printed as source
    Comment { id: TreeId, text: String },
    Custom {
        id: TreeId,
        kind: String,
        payload: serde_json::Value,
    },
}

impl Marker {
    pub fn search_result(description: Option<String>) -> Self {
        Marker::SearchResult {
            id: TreeId::fresh(),
            description,
        }
    }

    pub fn recipe_stamp(recipe: impl Into<String>) -> Self {
        Marker::RecipeStamp {
            id: TreeId::fresh(),
            recipe: recipe.into(),
        }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Marker::Comment {
            id: TreeId::fresh(),
            text: text.into(),
        }
    }

    pub fn custom(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Marker::Custom {
            id: TreeId::fresh(),
            kind: kind.into(),
            payload,
        }
    }

    pub fn id(&self) -> TreeId {
        match self {
            Marker::SearchResult { id, .. }
            | Marker::RecipeStamp { id, .. }
            | Marker::Comment { id, .. }
            | Marker::Custom { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> MarkerKind {
        match self {
            Marker::SearchResult { .. } => MarkerKind::SearchResult,
            Marker::RecipeStamp { .. } => MarkerKind::RecipeStamp,
            Marker::Comment { .. } => MarkerKind::Comment,
            Marker::Custom { kind, .. } => MarkerKind::Custom(kind.clone()),
        }
    }

    /// Equality of kind and payload, ignoring the marker's own identity
    pub fn same_value(&self, other: &Marker) -> bool {
        match (self, other) {
            (
                Marker::SearchResult { description: a, .. },
                Marker::SearchResult { description: b, .. },
            ) => a == b,
            (Marker::RecipeStamp { recipe: a, .. }, Marker::RecipeStamp { recipe: b, .. }) => a == b,
            (Marker::Comment { text: a, .. }, Marker::Comment { text: b, .. }) => a == b,
            (
                Marker::Custom {
                    kind: ka,
                    payload: pa,
                    ..
                },
                Marker::Custom {
                    kind: kb,
                    payload: pb,
                    ..
                },
            ) => ka == kb && pa == pb,
            _ => false,
        }
    }
}

/// Ordered, insertion-stable marker collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Markers {
    entries: Vec<Marker>,
}

impl Markers {
    pub const EMPTY: Markers = Markers {
        entries: Vec::new(),
    };

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.entries.iter()
    }

    /// Append unconditionally
    pub fn add(&self, marker: Marker) -> Markers {
        let mut entries = self.entries.clone();
        entries.push(marker);
        Markers { entries }
    }

    /// Append unless a marker with the same kind and payload is present
    pub fn add_if_absent(&self, marker: Marker) -> Markers {
        if self.entries.iter().any(|m| m.same_value(&marker)) {
            return self.clone();
        }
        self.add(marker)
    }

    pub fn find_first(&self, kind: &MarkerKind) -> Option<&Marker> {
        self.entries.iter().find(|m| &m.kind() == kind)
    }

    pub fn find_all<'a>(&'a self, kind: &'a MarkerKind) -> impl Iterator<Item = &'a Marker> + 'a {
        self.entries.iter().filter(move |m| &m.kind() == kind)
    }

    pub fn remove_by_kind(&self, kind: &MarkerKind) -> Markers {
        Markers {
            entries: self
                .entries
                .iter()
                .filter(|m| &m.kind() != kind)
                .cloned()
                .collect(),
        }
    }

    /// Whether the named recipe already stamped this node
    pub fn is_stamped_by(&self, recipe: &str) -> bool {
        self.entries
            .iter()
            .any(|m| matches!(m, Marker::RecipeStamp { recipe: r, .. } if r == recipe))
    }
}

impl FromIterator<Marker> for Markers {
    fn from_iter<I: IntoIterator<Item = Marker>>(iter: I) -> Self {
        Markers {
            entries: iter.into_iter().collect(),
        }
    }
}
