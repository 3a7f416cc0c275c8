//! Identifier index: domain key → vertex id.
//!
//! Built by walking two levels of containment: the typed container vertex,
//! then its `Contains` children of the expected kind. The map is immutable
//! once built.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{ContainerKind, Direction, RelKind, VertexId};
use crate::storage::GraphStore;
use crate::{Error, Result};

/// Which kind of domain key an index resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyDomain {
    Person,
    Topic,
}

impl KeyDomain {
    pub fn container(self) -> ContainerKind {
        match self {
            KeyDomain::Person => ContainerKind::People,
            KeyDomain::Topic => ContainerKind::Topics,
        }
    }
}

impl std::fmt::Display for KeyDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyDomain::Person => f.write_str("person"),
            KeyDomain::Topic => f.write_str("topic"),
        }
    }
}

/// Session-scoped mapping from a person name or topic label to its vertex.
#[derive(Debug, Clone)]
pub struct IdentifierIndex {
    domain: KeyDomain,
    entries: HashMap<String, VertexId>,
}

impl IdentifierIndex {
    /// Scan the domain's container and record each child's label.
    ///
    /// Fails with `MissingContainer` if the container vertex is absent.
    /// A duplicate label overwrites the earlier entry.
    pub fn build<S: GraphStore>(store: &S, tx: &S::Tx, domain: KeyDomain) -> Result<Self> {
        let kind = domain.container();
        let container = store
            .resolve_container(tx, kind)?
            .ok_or(Error::MissingContainer(kind))?;

        let child_kind = kind.child_kind();
        let mut entries = HashMap::new();
        for (_, child) in store.neighbors(tx, container, RelKind::Contains, Direction::Outgoing)? {
            let Some(vertex) = store.vertex(tx, child)? else {
                continue;
            };
            if vertex.kind != child_kind {
                continue;
            }
            if let Some(previous) = entries.insert(vertex.label.clone(), vertex.id) {
                warn!(%domain, key = %vertex.label, %previous, "duplicate key overwritten");
            }
        }

        debug!(%domain, entries = entries.len(), "identifier index built");
        Ok(Self { domain, entries })
    }

    pub fn get(&self, key: &str) -> Option<VertexId> {
        self.entries.get(key).copied()
    }

    /// Resolve a key, failing with `KeyNotFound`.
    pub fn resolve(&self, key: &str) -> Result<VertexId> {
        self.get(key).ok_or_else(|| Error::KeyNotFound {
            domain: self.domain,
            key: key.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
