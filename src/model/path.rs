//! GraphPath: an ordered vertex/edge path with its accumulated cost.

use serde::{Deserialize, Serialize};
use super::{EdgeId, VertexId};

/// A path in the graph: vertex -[edge]- vertex -[edge]- vertex ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPath {
    /// Vertices along the path. Always has one more element than `edges`.
    pub vertices: Vec<VertexId>,
    /// Edges connecting consecutive vertices.
    pub edges: Vec<EdgeId>,
    /// Sum of edge costs (hop count for unweighted searches).
    pub cost: f64,
}

impl GraphPath {
    pub fn single(vertex: VertexId) -> Self {
        Self { vertices: vec![vertex], edges: Vec::new(), cost: 0.0 }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Extend path with an edge and its far vertex.
    pub fn append(&mut self, edge: EdgeId, vertex: VertexId, cost: f64) {
        self.edges.push(edge);
        self.vertices.push(vertex);
        self.cost += cost;
    }
}
