//! # Graph Store Trait
//!
//! This is THE contract between the query engine and whatever holds the
//! vertices and edges. The engine reads through `neighbors()`; the only
//! write it ever issues is `set_edge_property()` for edge weights.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | Arena of vertices/edges with relation-keyed adjacency |

pub mod memory;

use crate::model::*;
use crate::tx::{Transaction, TxMode};
use crate::Result;

pub use memory::MemoryStore;

/// Store-level counters, for logging and ingest reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub vertices: u64,
    pub edges: u64,
}

// ============================================================================
// GraphStore Trait
// ============================================================================

/// The storage contract.
///
/// All calls are synchronous and blocking. Every call takes the session's
/// transaction; mutating calls take it mutably and must reject a
/// `ReadOnly` transaction.
pub trait GraphStore: Send + Sync + 'static {
    /// The transaction type for this store.
    type Tx: Transaction;

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Begin a new transaction.
    fn begin_tx(&self, mode: TxMode) -> Result<Self::Tx>;

    /// Commit a transaction.
    fn commit_tx(&self, tx: Self::Tx) -> Result<()>;

    /// Roll back a transaction.
    fn rollback_tx(&self, tx: Self::Tx) -> Result<()>;

    // ========================================================================
    // Writes (ingestion + weight updates)
    // ========================================================================

    /// Create a vertex of the given kind and label.
    fn create_vertex(&self, tx: &mut Self::Tx, kind: VertexKind, label: &str) -> Result<VertexId>;

    /// Create a directed edge between two existing vertices.
    fn create_edge(
        &self,
        tx: &mut Self::Tx,
        src: VertexId,
        dst: VertexId,
        rel: RelKind,
        props: PropertyMap,
    ) -> Result<EdgeId>;

    /// Create the container vertex for `kind` and make it resolvable.
    /// Fails if that container already exists.
    fn register_container(&self, tx: &mut Self::Tx, kind: ContainerKind) -> Result<VertexId>;

    /// Set a property on an edge (upsert).
    fn set_edge_property(&self, tx: &mut Self::Tx, id: EdgeId, key: &str, val: Value) -> Result<()>;

    // ========================================================================
    // Reads
    // ========================================================================

    /// Get a vertex by id. Returns None if not found.
    fn vertex(&self, tx: &Self::Tx, id: VertexId) -> Result<Option<Vertex>>;

    /// Get an edge by id. Returns None if not found.
    fn edge(&self, tx: &Self::Tx, id: EdgeId) -> Result<Option<Edge>>;

    /// Find the container vertex of the given kind.
    fn resolve_container(&self, tx: &Self::Tx, kind: ContainerKind) -> Result<Option<VertexId>>;

    /// Incident edges of `vertex` with relation `rel` in direction `dir`,
    /// paired with the vertex at the other end. Creation order.
    fn neighbors(
        &self,
        tx: &Self::Tx,
        vertex: VertexId,
        rel: RelKind,
        dir: Direction,
    ) -> Result<Vec<(Edge, VertexId)>>;

    /// Vertex and edge totals.
    fn stats(&self, tx: &Self::Tx) -> Result<StoreStats>;

    /// Label of a vertex; `NotFound` when the id is dangling.
    fn label(&self, tx: &Self::Tx, id: VertexId) -> Result<String> {
        self.vertex(tx, id)?
            .map(|v| v.label)
            .ok_or_else(|| crate::Error::NotFound(format!("Vertex {id}")))
    }
}
