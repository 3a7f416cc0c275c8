//! # Analytics Adapter
//!
//! Packages a traversal result into a `petgraph` graph and hands it to
//! `rustworkx-core` / `petgraph::algo` for the numerics.
//!
//! ```text
//! Traversal ──► Subgraph { nodes, edges } ──► Projection (petgraph::Graph)
//!                                               ├─► astar (BFS / Dijkstra)
//!                                               ├─► floyd_warshall
//!                                               ├─► betweenness_centrality
//!                                               └─► eigenvector_centrality
//! ```
//!
//! Subgraphs are rebuilt for every call. Nothing is cached.
//!
//! ## Algorithms
//!
//! | Selector | Library routine | Edge cost |
//! |----------|-----------------|-----------|
//! | `BreadthFirst` | `petgraph::algo::astar`, zero heuristic | 1 per hop |
//! | `Dijkstra` | `petgraph::algo::astar`, zero heuristic | weight property |
//! | `FloydWarshall` | `petgraph::algo::floyd_warshall` | weight property |
//! | `BetweennessBfs` | `rustworkx_core::centrality::betweenness_centrality` | unweighted |
//! | `EigenvectorPower` | `rustworkx_core::centrality::eigenvector_centrality` | score property |
//! | `EigenvectorArnoldi` | `rustworkx_core::centrality::eigenvector_centrality` | score property |
//!
//! There is no Arnoldi solver in the stack; both eigenvector kinds run the
//! same power iteration and differ only in their default tolerance.

use std::collections::VecDeque;
use std::convert::Infallible;

use hashbrown::{HashMap, HashSet};
use rustworkx_core::centrality::{betweenness_centrality, eigenvector_centrality};
use rustworkx_core::petgraph::algo::{astar, floyd_warshall};
use rustworkx_core::petgraph::graph::{Graph, NodeIndex};
use rustworkx_core::petgraph::visit::EdgeRef;
use rustworkx_core::petgraph::{Directed, EdgeType, Undirected};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::*;
use crate::storage::GraphStore;
use crate::traversal::Traversal;
use crate::{Error, Result};

/// Graphs at or above this many nodes compute betweenness in parallel.
pub const BETWEENNESS_PARALLEL_THRESHOLD: usize = 50;
pub const EIGENVECTOR_MAX_ITERATIONS: usize = 50;
pub const ARNOLDI_TOLERANCE: f64 = 0.01;
pub const POWER_TOLERANCE: f64 = 0.001;

// ============================================================================
// Selectors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortestPathAlgorithm {
    BreadthFirst,
    Dijkstra,
    FloydWarshall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CentralityKind {
    BetweennessBfs,
    EigenvectorPower,
    EigenvectorArnoldi,
}

impl CentralityKind {
    pub fn default_tolerance(self) -> f64 {
        match self {
            CentralityKind::BetweennessBfs => 0.0,
            CentralityKind::EigenvectorPower => POWER_TOLERANCE,
            CentralityKind::EigenvectorArnoldi => ARNOLDI_TOLERANCE,
        }
    }
}

// ============================================================================
// Subgraph
// ============================================================================

/// A node set plus the edges among them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subgraph {
    pub nodes: Vec<VertexId>,
    pub edges: Vec<Edge>,
}

impl Subgraph {
    /// Deduplicates `nodes` and drops edges with an endpoint outside them.
    pub fn new(nodes: impl IntoIterator<Item = VertexId>, edges: impl IntoIterator<Item = Edge>) -> Self {
        let mut seen = HashSet::new();
        let nodes: Vec<VertexId> = nodes.into_iter().filter(|v| seen.insert(*v)).collect();
        let edges = edges
            .into_iter()
            .filter(|e| seen.contains(&e.src) && seen.contains(&e.dst))
            .collect();
        Self { nodes, edges }
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.nodes.contains(&v)
    }

    /// `person` and the people it knows on `topic`, with the `Knows` edges
    /// tagged `topic` among them.
    pub fn knows_on_topic<S: GraphStore>(walk: &Traversal<'_, S>, person: VertexId, topic: &str) -> Result<Self> {
        let mut nodes = vec![person];
        nodes.extend(walk.topic_filtered_knows(person, topic)?);

        let mut edges = Vec::new();
        for &v in &nodes {
            for (edge, _) in walk.incident(v, RelKind::Knows, Direction::Outgoing)? {
                if edge.has_topic(topic) {
                    edges.push(edge);
                }
            }
        }
        Ok(Self::new(nodes, edges))
    }

    /// The people associated with `topic`, then the topic vertex itself,
    /// with their `AssociatedTo` edges.
    pub fn topic_associations<S: GraphStore>(walk: &Traversal<'_, S>, topic: VertexId) -> Result<Self> {
        let mut nodes = walk.people_on_topic(topic)?;
        nodes.push(topic);
        let edges = walk
            .incident(topic, RelKind::AssociatedTo, Direction::Incoming)?
            .into_iter()
            .map(|(edge, _)| edge);
        Ok(Self::new(nodes, edges))
    }
}

// ============================================================================
// Projection
// ============================================================================

/// Node weight: vertex id. Edge weight: edge id + cost.
type ProjectedGraph<Ty> = Graph<VertexId, (EdgeId, f64), Ty>;

struct Projection<Ty: EdgeType> {
    graph: ProjectedGraph<Ty>,
    index: HashMap<VertexId, NodeIndex>,
}

impl<Ty: EdgeType> Projection<Ty> {
    /// Edges for which `cost` yields `None` are left out. `reverse` flips
    /// each edge (for `Incoming` walks on a directed projection).
    fn build(sub: &Subgraph, reverse: bool, cost: impl Fn(&Edge) -> Option<f64>) -> Self {
        let mut graph = ProjectedGraph::<Ty>::with_capacity(sub.nodes.len(), sub.edges.len());
        let mut index = HashMap::with_capacity(sub.nodes.len());
        for &v in &sub.nodes {
            index.insert(v, graph.add_node(v));
        }
        for edge in &sub.edges {
            let Some(c) = cost(edge) else {
                debug!(edge = %edge.id, "edge left out of projection");
                continue;
            };
            let (Some(&a), Some(&b)) = (index.get(&edge.src), index.get(&edge.dst)) else {
                continue;
            };
            let (a, b) = if reverse { (b, a) } else { (a, b) };
            graph.add_edge(a, b, (edge.id, c));
        }
        Self { graph, index }
    }

    /// Turn a node-index path into a `GraphPath`, choosing the cheapest
    /// parallel edge between consecutive nodes.
    fn to_path(&self, nodes: &[NodeIndex]) -> Option<GraphPath> {
        let (&first, rest) = nodes.split_first()?;
        let mut path = GraphPath::single(self.graph[first]);
        let mut prev = first;
        for &next in rest {
            let (id, cost) = self
                .graph
                .edges_connecting(prev, next)
                .map(|e| *e.weight())
                .min_by(|x, y| x.1.total_cmp(&y.1))?;
            path.append(id, self.graph[next], cost);
            prev = next;
        }
        Some(path)
    }

    fn shortest(&self, algorithm: ShortestPathAlgorithm, source: VertexId, target: VertexId) -> Result<Option<GraphPath>> {
        let (Some(&s), Some(&t)) = (self.index.get(&source), self.index.get(&target)) else {
            return Ok(None);
        };
        let nodes = match algorithm {
            ShortestPathAlgorithm::BreadthFirst | ShortestPathAlgorithm::Dijkstra => {
                astar(&self.graph, s, |n| n == t, |e| e.weight().1, |_| 0.0).map(|(_, p)| p)
            }
            ShortestPathAlgorithm::FloydWarshall => self.floyd_warshall_path(s, t)?,
        };
        Ok(nodes.and_then(|p| self.to_path(&p)))
    }

    /// All-pairs distances, then a breadth-first walk over the edges that
    /// lie on some shortest path to `t`.
    fn floyd_warshall_path(&self, s: NodeIndex, t: NodeIndex) -> Result<Option<Vec<NodeIndex>>> {
        let dist = floyd_warshall(&self.graph, |e| e.weight().1)
            .map_err(|_| Error::AnalyticsError("negative cycle in Floyd-Warshall input".into()))?;
        let to_target = |n: NodeIndex| {
            dist.get(&(n, t)).copied().filter(|d| d.is_finite() && *d < f64::MAX)
        };
        if to_target(s).is_none() {
            return Ok(None);
        }

        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([s]);
        let mut seen = HashSet::new();
        seen.insert(s);
        while let Some(u) = queue.pop_front() {
            if u == t {
                let mut nodes = vec![t];
                let mut cur = t;
                while let Some(&p) = parent.get(&cur) {
                    nodes.push(p);
                    cur = p;
                }
                nodes.reverse();
                return Ok(Some(nodes));
            }
            let Some(du) = to_target(u) else { continue };
            for e in self.graph.edges(u) {
                let v = if e.source() == u { e.target() } else { e.source() };
                let Some(dv) = to_target(v) else { continue };
                let tight = (e.weight().1 + dv - du).abs() < 1e-9;
                if tight && seen.insert(v) {
                    parent.insert(v, u);
                    queue.push_back(v);
                }
            }
        }
        Err(Error::AnalyticsError("Floyd-Warshall path reconstruction failed".into()))
    }

    fn scores(&self, values: impl IntoIterator<Item = Option<f64>>) -> HashMap<VertexId, f64> {
        values
            .into_iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|s| (self.graph[NodeIndex::new(i)], s)))
            .collect()
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Shortest path from `source` to `target` inside `sub`.
///
/// `weight_property` is read as a number for `Dijkstra` and
/// `FloydWarshall`; `BreadthFirst` counts hops. `None` when either end is
/// outside the subgraph or `target` is unreachable.
pub fn shortest_path(
    algorithm: ShortestPathAlgorithm,
    sub: &Subgraph,
    source: VertexId,
    target: VertexId,
    weight_property: &str,
    dir: Direction,
) -> Result<Option<GraphPath>> {
    let cost = |e: &Edge| match algorithm {
        ShortestPathAlgorithm::BreadthFirst => Some(1.0),
        _ => e.get(weight_property).and_then(Value::as_float),
    };
    let path = match dir {
        Direction::Both => Projection::<Undirected>::build(sub, false, cost).shortest(algorithm, source, target)?,
        Direction::Outgoing => Projection::<Directed>::build(sub, false, cost).shortest(algorithm, source, target)?,
        Direction::Incoming => Projection::<Directed>::build(sub, true, cost).shortest(algorithm, source, target)?,
    };
    debug!(?algorithm, %source, %target, hops = path.as_ref().map(GraphPath::len), "shortest path");
    Ok(path)
}

/// Per-vertex centrality over `sub`, treating edges as undirected.
///
/// Betweenness is unweighted and unnormalised. Eigenvector centrality
/// weighs each edge by `score_property`; edges without it are left out.
pub fn centrality(
    kind: CentralityKind,
    sub: &Subgraph,
    score_property: &str,
    tolerance: f64,
    max_iterations: usize,
) -> Result<HashMap<VertexId, f64>> {
    if sub.nodes.is_empty() {
        return Ok(HashMap::new());
    }
    let scores = match kind {
        CentralityKind::BetweennessBfs => {
            let proj = Projection::<Undirected>::build(sub, false, |_| Some(1.0));
            let values = betweenness_centrality(&proj.graph, false, false, BETWEENNESS_PARALLEL_THRESHOLD);
            proj.scores(values)
        }
        CentralityKind::EigenvectorPower | CentralityKind::EigenvectorArnoldi => {
            let proj = Projection::<Undirected>::build(sub, false, |e| e.get(score_property).and_then(Value::as_float));
            let values = eigenvector_centrality(
                &proj.graph,
                |e| Ok::<f64, Infallible>(e.weight().1),
                Some(max_iterations),
                Some(tolerance),
            )
            .unwrap_or_else(|never| match never {})
            .ok_or_else(|| {
                Error::AnalyticsError(format!(
                    "eigenvector centrality did not converge within {max_iterations} iterations"
                ))
            })?;
            proj.scores(values.into_iter().map(Some))
        }
    };
    debug!(?kind, nodes = sub.nodes.len(), edges = sub.edges.len(), "centrality computed");
    Ok(scores)
}
