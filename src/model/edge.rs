//! Edge (relationship) in the social graph.

use serde::{Deserialize, Serialize};

use super::{PropertyMap, Value, VertexId};
use crate::{Error, Result};

/// Property key: topic string on `Knows` edges.
pub const TOPIC: &str = "topic";
/// Property key: integer weight 0–9 on `Knows` and `AssociatedTo` edges.
pub const WEIGHT: &str = "weight";
/// Property key: float cost in [0, 1) on `AssociatedTo` edges.
pub const COST: &str = "cost";

/// Arena index of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Traversal direction relative to the vertex being expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// Closed set of relationship kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelKind {
    /// Person → person, carries `topic` and `weight`.
    Knows,
    /// Person → topic, carries `weight` and `cost`.
    AssociatedTo,
    /// Person → group.
    IsMemberOf,
    /// Person → document.
    Authors,
    /// Person → document.
    Views,
    /// Document → topic.
    Has,
    /// Container → child.
    Contains,
}

impl RelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelKind::Knows => "KNOWS",
            RelKind::AssociatedTo => "ASSOCIATED_TO",
            RelKind::IsMemberOf => "IS_MEMBER_OF",
            RelKind::Authors => "AUTHORS",
            RelKind::Views => "VIEWS",
            RelKind::Has => "HAS",
            RelKind::Contains => "CONTAINS",
        }
    }
}

impl std::fmt::Display for RelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed, typed edge with a property map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub src: VertexId,
    pub dst: VertexId,
    pub rel: RelKind,
    pub properties: PropertyMap,
}

impl Edge {
    pub fn new(id: EdgeId, src: VertexId, dst: VertexId, rel: RelKind) -> Self {
        Self { id, src, dst, rel, properties: PropertyMap::new() }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// The "other" end of the edge from the given vertex.
    pub fn other_vertex(&self, from: VertexId) -> Option<VertexId> {
        if from == self.src { Some(self.dst) }
        else if from == self.dst { Some(self.src) }
        else { None }
    }

    /// Whether the edge touches `vertex` in the given direction.
    pub fn matches_direction(&self, vertex: VertexId, dir: Direction) -> bool {
        match dir {
            Direction::Outgoing => self.src == vertex,
            Direction::Incoming => self.dst == vertex,
            Direction::Both => self.src == vertex || self.dst == vertex,
        }
    }

    /// Integer `weight` property.
    pub fn weight(&self) -> Result<i64> {
        self.get(WEIGHT)
            .and_then(Value::as_int)
            .ok_or_else(|| self.mismatch(WEIGHT))
    }

    /// String `topic` property.
    pub fn topic(&self) -> Result<&str> {
        self.get(TOPIC)
            .and_then(Value::as_str)
            .ok_or_else(|| self.mismatch(TOPIC))
    }

    /// Float `cost` property.
    pub fn cost(&self) -> Result<f64> {
        self.get(COST)
            .and_then(Value::as_float)
            .ok_or_else(|| self.mismatch(COST))
    }

    /// Exact, case-sensitive topic match. A missing topic never matches.
    pub fn has_topic(&self, topic: &str) -> bool {
        matches!(self.topic(), Ok(t) if t == topic)
    }

    /// Exact integer weight match. A missing weight never matches.
    pub fn has_weight(&self, weight: i64) -> bool {
        matches!(self.weight(), Ok(w) if w == weight)
    }

    fn mismatch(&self, key: &str) -> Error {
        Error::PropertyMismatch { edge: self.id, key: key.to_string() }
    }
}
