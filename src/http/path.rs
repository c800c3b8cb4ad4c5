//! Resource id extraction from request paths.
//!
//! # Rules
//! - `/products` and `/products/` address the collection
//! - `/products/<digits>` addresses one item
//! - Every other shape is invalid
//!
//! # Design Decisions
//! - Only the URI path is inspected; query strings never affect scope
//! - Signs are rejected, so `-1` and `+7` are invalid rather than ids

/// What a request path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathScope {
    /// No id in the path.
    Collection,
    /// A single product id.
    Item(i64),
    /// Wrong segment count, or a final segment that is not an id.
    Invalid,
}

impl PathScope {
    pub fn parse(path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').collect();
        match segments.len() {
            2 => PathScope::Collection,
            3 => match segments[2] {
                "" => PathScope::Collection,
                last => parse_id(last).map_or(PathScope::Invalid, PathScope::Item),
            },
            _ => PathScope::Invalid,
        }
    }

    pub fn id(self) -> Option<i64> {
        match self {
            PathScope::Item(id) => Some(id),
            _ => None,
        }
    }
}

fn parse_id(segment: &str) -> Option<i64> {
    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
