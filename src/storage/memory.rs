//! In-memory arena store.
//!
//! Vertices and edges live in `Vec`s addressed by their ids; each vertex
//! carries a relation-kind-keyed adjacency list of incident edge ids in
//! creation order. One `RwLock` guards the whole arena.
//!
//! ## Transactions
//!
//! A run uses two transactions: the `ReadWrite` ingest, then one session
//! for the selected query. Writes land in the arena immediately, so
//! `commit_tx()` and `rollback_tx()` only end the transaction. A weight
//! update is visible to the same session before commit and is not undone
//! by rollback. The only enforced rule is that a `ReadOnly` transaction
//! cannot write. Vertices and edges are never deleted, so ids stay dense.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::model::*;
use crate::tx::{Transaction, TxId, TxMode};
use crate::{Error, Result};
use super::{GraphStore, StoreStats};

/// Incident edge ids per relation kind, creation order.
type Incident = HashMap<RelKind, SmallVec<[EdgeId; 4]>>;

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory social graph storage.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    arena: RwLock<Arena>,
    next_tx_id: AtomicU64,
}

#[derive(Default)]
struct Arena {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    /// Parallel to `vertices`.
    adjacency: Vec<Incident>,
    containers: HashMap<ContainerKind, VertexId>,
}

impl Arena {
    fn check_vertex(&self, id: VertexId) -> Result<()> {
        if id.index() < self.vertices.len() {
            Ok(())
        } else {
            Err(Error::NotFound(format!("Vertex {id}")))
        }
    }

    fn push_vertex(&mut self, kind: VertexKind, label: &str) -> VertexId {
        let id = VertexId(self.vertices.len() as u64);
        self.vertices.push(Vertex::new(id, kind, label));
        self.adjacency.push(Incident::new());
        id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                arena: RwLock::new(Arena::default()),
                next_tx_id: AtomicU64::new(1),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MemoryTx
// ============================================================================

/// In-memory transaction (a marker carrying its mode).
#[derive(Debug)]
pub struct MemoryTx {
    id: TxId,
    mode: TxMode,
}

impl Transaction for MemoryTx {
    fn mode(&self) -> TxMode { self.mode }
    fn id(&self) -> TxId { self.id }
}

fn ensure_writable(tx: &MemoryTx) -> Result<()> {
    if tx.mode.is_writable() {
        Ok(())
    } else {
        Err(Error::TxError(format!("{} is read-only", tx.id)))
    }
}

// ============================================================================
// GraphStore impl
// ============================================================================

impl GraphStore for MemoryStore {
    type Tx = MemoryTx;

    fn begin_tx(&self, mode: TxMode) -> Result<MemoryTx> {
        let id = TxId(self.inner.next_tx_id.fetch_add(1, Ordering::Relaxed));
        Ok(MemoryTx { id, mode })
    }

    /// No-op: writes are applied immediately, not on commit.
    fn commit_tx(&self, _tx: MemoryTx) -> Result<()> { Ok(()) }

    /// Ends the transaction; applied writes stay.
    fn rollback_tx(&self, _tx: MemoryTx) -> Result<()> { Ok(()) }

    // ========================================================================
    // Writes
    // ========================================================================

    fn create_vertex(&self, tx: &mut MemoryTx, kind: VertexKind, label: &str) -> Result<VertexId> {
        ensure_writable(tx)?;
        if let VertexKind::Container(ck) = kind {
            return Err(Error::StorageError(format!(
                "container '{ck}' must be created with register_container"
            )));
        }
        Ok(self.inner.arena.write().push_vertex(kind, label))
    }

    fn create_edge(
        &self,
        tx: &mut MemoryTx,
        src: VertexId,
        dst: VertexId,
        rel: RelKind,
        props: PropertyMap,
    ) -> Result<EdgeId> {
        ensure_writable(tx)?;
        let mut arena = self.inner.arena.write();
        arena.check_vertex(src)?;
        arena.check_vertex(dst)?;

        let id = EdgeId(arena.edges.len() as u64);
        arena.edges.push(Edge { id, src, dst, rel, properties: props });

        arena.adjacency[src.index()].entry(rel).or_default().push(id);
        if src != dst {
            arena.adjacency[dst.index()].entry(rel).or_default().push(id);
        }
        Ok(id)
    }

    fn register_container(&self, tx: &mut MemoryTx, kind: ContainerKind) -> Result<VertexId> {
        ensure_writable(tx)?;
        let mut arena = self.inner.arena.write();
        if let Some(existing) = arena.containers.get(&kind) {
            return Err(Error::StorageError(format!(
                "container '{kind}' already registered as vertex {existing}"
            )));
        }
        let id = arena.push_vertex(VertexKind::Container(kind), kind.as_str());
        arena.containers.insert(kind, id);
        Ok(id)
    }

    fn set_edge_property(&self, tx: &mut MemoryTx, id: EdgeId, key: &str, val: Value) -> Result<()> {
        ensure_writable(tx)?;
        let mut arena = self.inner.arena.write();
        let edge = arena.edges.get_mut(id.index())
            .ok_or_else(|| Error::NotFound(format!("Edge {id}")))?;
        edge.properties.insert(key.to_string(), val);
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    fn vertex(&self, _tx: &MemoryTx, id: VertexId) -> Result<Option<Vertex>> {
        Ok(self.inner.arena.read().vertices.get(id.index()).cloned())
    }

    fn edge(&self, _tx: &MemoryTx, id: EdgeId) -> Result<Option<Edge>> {
        Ok(self.inner.arena.read().edges.get(id.index()).cloned())
    }

    fn resolve_container(&self, _tx: &MemoryTx, kind: ContainerKind) -> Result<Option<VertexId>> {
        Ok(self.inner.arena.read().containers.get(&kind).copied())
    }

    fn neighbors(
        &self,
        _tx: &MemoryTx,
        vertex: VertexId,
        rel: RelKind,
        dir: Direction,
    ) -> Result<Vec<(Edge, VertexId)>> {
        let arena = self.inner.arena.read();
        arena.check_vertex(vertex)?;

        let Some(incident) = arena.adjacency[vertex.index()].get(&rel) else {
            return Ok(Vec::new());
        };

        let mut result = Vec::with_capacity(incident.len());
        for eid in incident {
            let edge = &arena.edges[eid.index()];
            if !edge.matches_direction(vertex, dir) {
                continue;
            }
            let other = edge.other_vertex(vertex).unwrap_or(edge.dst);
            result.push((edge.clone(), other));
        }
        Ok(result)
    }

    fn stats(&self, _tx: &MemoryTx) -> Result<StoreStats> {
        let arena = self.inner.arena.read();
        Ok(StoreStats {
            vertices: arena.vertices.len() as u64,
            edges: arena.edges.len() as u64,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn person(db: &MemoryStore, tx: &mut MemoryTx, name: &str) -> VertexId {
        db.create_vertex(tx, VertexKind::Person, name).unwrap()
    }

    #[test]
    fn test_create_and_get_vertex() {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();

        let id = person(&db, &mut tx, "Ada");
        let v = db.vertex(&tx, id).unwrap().unwrap();

        assert_eq!(v.kind, VertexKind::Person);
        assert_eq!(v.label, "Ada");
        assert_eq!(db.label(&tx, id).unwrap(), "Ada");
    }

    #[test]
    fn test_ids_are_dense_and_unique() {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        let a = person(&db, &mut tx, "a");
        let b = person(&db, &mut tx, "b");
        assert_eq!(a, VertexId(0));
        assert_eq!(b, VertexId(1));
    }

    #[test]
    fn test_create_edge_to_missing_vertex() {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        let a = person(&db, &mut tx, "a");
        let result = db.create_edge(&mut tx, a, VertexId(42), RelKind::Knows, PropertyMap::new());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_read_only_tx_rejects_writes() {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadOnly).unwrap();
        let result = db.create_vertex(&mut tx, VertexKind::Person, "a");
        assert!(matches!(result, Err(Error::TxError(_))));
    }

    #[test]
    fn test_neighbors_by_direction() {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        let a = person(&db, &mut tx, "a");
        let b = person(&db, &mut tx, "b");
        let c = person(&db, &mut tx, "c");
        db.create_edge(&mut tx, a, b, RelKind::Knows, PropertyMap::new()).unwrap();
        db.create_edge(&mut tx, c, a, RelKind::Knows, PropertyMap::new()).unwrap();

        let out: Vec<_> = db.neighbors(&tx, a, RelKind::Knows, Direction::Outgoing).unwrap()
            .into_iter().map(|(_, v)| v).collect();
        let inc: Vec<_> = db.neighbors(&tx, a, RelKind::Knows, Direction::Incoming).unwrap()
            .into_iter().map(|(_, v)| v).collect();
        let both: Vec<_> = db.neighbors(&tx, a, RelKind::Knows, Direction::Both).unwrap()
            .into_iter().map(|(_, v)| v).collect();

        assert_eq!(out, vec![b]);
        assert_eq!(inc, vec![c]);
        assert_eq!(both, vec![b, c]);
    }

    #[test]
    fn test_neighbors_keyed_by_relation() {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        let a = person(&db, &mut tx, "a");
        let g = db.create_vertex(&mut tx, VertexKind::Group, "g").unwrap();
        db.create_edge(&mut tx, a, g, RelKind::IsMemberOf, PropertyMap::new()).unwrap();

        assert!(db.neighbors(&tx, a, RelKind::Knows, Direction::Both).unwrap().is_empty());
        assert_eq!(db.neighbors(&tx, a, RelKind::IsMemberOf, Direction::Outgoing).unwrap().len(), 1);
    }

    #[test]
    fn test_self_loop_reported_once() {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        let a = person(&db, &mut tx, "a");
        db.create_edge(&mut tx, a, a, RelKind::Knows, PropertyMap::new()).unwrap();

        let both = db.neighbors(&tx, a, RelKind::Knows, Direction::Both).unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].1, a);
    }

    #[test]
    fn test_containers() {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        assert_eq!(db.resolve_container(&tx, ContainerKind::People).unwrap(), None);

        let people = db.register_container(&mut tx, ContainerKind::People).unwrap();
        assert_eq!(db.resolve_container(&tx, ContainerKind::People).unwrap(), Some(people));
        assert!(db.register_container(&mut tx, ContainerKind::People).is_err());
        assert!(db.create_vertex(&mut tx, VertexKind::Container(ContainerKind::Topics), "t").is_err());
    }

    #[test]
    fn test_set_edge_property() {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        let a = person(&db, &mut tx, "a");
        let b = person(&db, &mut tx, "b");
        let e = db.create_edge(&mut tx, a, b, RelKind::Knows, props([(WEIGHT, 3)])).unwrap();

        db.set_edge_property(&mut tx, e, WEIGHT, Value::from(8)).unwrap();
        assert_eq!(db.edge(&tx, e).unwrap().unwrap().weight().unwrap(), 8);
        assert!(db.set_edge_property(&mut tx, EdgeId(99), WEIGHT, Value::from(1)).is_err());
    }

    #[test]
    fn test_stats() {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        let a = person(&db, &mut tx, "a");
        let b = person(&db, &mut tx, "b");
        db.create_edge(&mut tx, a, b, RelKind::Knows, PropertyMap::new()).unwrap();
        assert_eq!(db.stats(&tx).unwrap(), StoreStats { vertices: 2, edges: 1 });
    }
}
