//! Immutable, whitespace-exact syntax tree
//!
//! The tree is built once by a front end and then threaded through recipe
//! passes. Nodes are shared through `Arc`; every `with_*` call returns a new
//! node with the same identity and exactly one field replaced, so untouched
//! subtrees keep their allocation and print back byte for byte.

mod coordinates;
mod cursor;
mod id;
mod j;
mod markers;
mod padding;
mod print;
mod space;
mod types;

pub use coordinates::{CoordinateBuilder, Coordinates, Site};
pub use cursor::{Cursor, CursorIter};
pub use id::TreeId;
pub use j::*;
pub use markers::{Marker, MarkerKind, Markers};
pub use padding::{Container, LeftPadded, RightPadded};
pub use print::Printer;
pub use space::{Comment, Space};
pub use types::{ClassKind, ClassType, JavaType, MethodType, Primitive};
