//! Query session: one open transaction plus the identifier indexes.
//!
//! The person and topic indexes are built on first use and then frozen for
//! the life of the session. Every traversal and dispatch call goes through
//! a `Session`; nothing is global.

use once_cell::unsync::OnceCell;
use tracing::debug;

use crate::index::{IdentifierIndex, KeyDomain};
use crate::model::VertexId;
use crate::storage::GraphStore;
use crate::traversal::{self, Traversal};
use crate::tx::{Transaction, TxMode};
use crate::{Error, Result};

pub struct Session<'s, S: GraphStore> {
    store: &'s S,
    tx: S::Tx,
    people: OnceCell<IdentifierIndex>,
    topics: OnceCell<IdentifierIndex>,
}

impl<'s, S: GraphStore> Session<'s, S> {
    /// Begin a transaction in `mode` and wrap it.
    pub fn open(store: &'s S, mode: TxMode) -> Result<Self> {
        let tx = store.begin_tx(mode)?;
        debug!(tx = %tx.id(), ?mode, "session opened");
        Ok(Self::with_tx(store, tx))
    }

    /// Wrap an already-open transaction.
    pub fn with_tx(store: &'s S, tx: S::Tx) -> Self {
        Self {
            store,
            tx,
            people: OnceCell::new(),
            topics: OnceCell::new(),
        }
    }

    pub fn store(&self) -> &'s S {
        self.store
    }

    pub fn tx(&self) -> &S::Tx {
        &self.tx
    }

    pub fn mode(&self) -> TxMode {
        self.tx.mode()
    }

    // ========================================================================
    // Identifier resolution
    // ========================================================================

    fn index(&self, domain: KeyDomain) -> Result<&IdentifierIndex> {
        let cell = match domain {
            KeyDomain::Person => &self.people,
            KeyDomain::Topic => &self.topics,
        };
        cell.get_or_try_init(|| IdentifierIndex::build(self.store, &self.tx, domain))
    }

    /// The person-name index, built on first call.
    pub fn people(&self) -> Result<&IdentifierIndex> {
        self.index(KeyDomain::Person)
    }

    /// The topic-label index, built on first call.
    pub fn topics(&self) -> Result<&IdentifierIndex> {
        self.index(KeyDomain::Topic)
    }

    pub fn resolve_person(&self, name: &str) -> Result<VertexId> {
        self.people()?.resolve(name)
    }

    pub fn resolve_topic(&self, label: &str) -> Result<VertexId> {
        self.topics()?.resolve(label)
    }

    pub fn label(&self, id: VertexId) -> Result<String> {
        self.store.label(&self.tx, id)
    }

    pub fn labels(&self, ids: &[VertexId]) -> Result<Vec<String>> {
        ids.iter().map(|&id| self.label(id)).collect()
    }

    // ========================================================================
    // Walks
    // ========================================================================

    /// Read-only walk handle bound to this session's transaction.
    pub fn traversal(&self) -> Traversal<'_, S> {
        Traversal::new(self.store, &self.tx)
    }

    /// Set `weight` on every `Knows` edge of `person` tagged `topic`.
    /// Returns how many edges were touched.
    pub fn update_edge_weight(&mut self, person: VertexId, topic: &str, weight: i64) -> Result<usize> {
        if !self.tx.mode().is_writable() {
            return Err(Error::TxError(format!(
                "{} is read-only; weight updates need a ReadWrite session",
                self.tx.id()
            )));
        }
        traversal::update_edge_weight(self.store, &mut self.tx, person, topic, weight)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn commit(self) -> Result<()> {
        self.store.commit_tx(self.tx)
    }

    /// End the session without committing. Weight updates already made
    /// stay in the store.
    pub fn rollback(self) -> Result<()> {
        self.store.rollback_tx(self.tx)
    }
}
