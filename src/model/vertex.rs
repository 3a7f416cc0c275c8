//! Vertex in the social graph.

use serde::{Deserialize, Serialize};

/// Arena index of a vertex. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub u64);

impl VertexId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The typed root vertices that own the people, topics, groups and documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    People,
    Topics,
    Groups,
    Documents,
}

impl ContainerKind {
    /// The vertex kind of the children a container owns.
    pub fn child_kind(self) -> VertexKind {
        match self {
            ContainerKind::People => VertexKind::Person,
            ContainerKind::Topics => VertexKind::Topic,
            ContainerKind::Groups => VertexKind::Group,
            ContainerKind::Documents => VertexKind::Document,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::People => "people",
            ContainerKind::Topics => "topics",
            ContainerKind::Groups => "groups",
            ContainerKind::Documents => "documents",
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of vertex categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexKind {
    Person,
    Topic,
    Group,
    Document,
    Container(ContainerKind),
}

/// A vertex: identity, category and its kind-specific label
/// (person name, topic label, group name; documents carry a generated label).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub kind: VertexKind,
    pub label: String,
}

impl Vertex {
    pub fn new(id: VertexId, kind: VertexKind, label: impl Into<String>) -> Self {
        Self { id, kind, label: label.into() }
    }
}
