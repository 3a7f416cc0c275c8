//! GraphBuilder: typed writes on top of a `GraphStore`.
//!
//! Creates the four containers up front and hangs every person, topic,
//! group and document off its container with a `Contains` edge, so the
//! identifier indexes can find them.

use hashbrown::HashMap;

use crate::model::*;
use crate::storage::GraphStore;
use crate::Result;

/// Write handle over a store and an open `ReadWrite` transaction.
pub struct GraphBuilder<'s, S: GraphStore> {
    store: &'s S,
    tx: &'s mut S::Tx,
    containers: HashMap<ContainerKind, VertexId>,
}

impl<'s, S: GraphStore> GraphBuilder<'s, S> {
    /// Register all containers. Fails if any already exists.
    pub fn new(store: &'s S, tx: &'s mut S::Tx) -> Result<Self> {
        let mut containers = HashMap::new();
        for kind in [
            ContainerKind::People,
            ContainerKind::Topics,
            ContainerKind::Groups,
            ContainerKind::Documents,
        ] {
            let id = store.register_container(tx, kind)?;
            containers.insert(kind, id);
        }
        Ok(Self { store, tx, containers })
    }

    fn contained(&mut self, container: ContainerKind, label: &str) -> Result<VertexId> {
        let id = self.store.create_vertex(self.tx, container.child_kind(), label)?;
        let parent = *self
            .containers
            .get(&container)
            .ok_or(crate::Error::MissingContainer(container))?;
        self.store.create_edge(self.tx, parent, id, RelKind::Contains, PropertyMap::new())?;
        Ok(id)
    }

    pub fn person(&mut self, name: &str) -> Result<VertexId> {
        self.contained(ContainerKind::People, name)
    }

    pub fn topic(&mut self, label: &str) -> Result<VertexId> {
        self.contained(ContainerKind::Topics, label)
    }

    pub fn group(&mut self, name: &str) -> Result<VertexId> {
        self.contained(ContainerKind::Groups, name)
    }

    pub fn document(&mut self, label: &str) -> Result<VertexId> {
        self.contained(ContainerKind::Documents, label)
    }

    /// `from -[:KNOWS {topic, weight}]-> to`
    pub fn knows(&mut self, from: VertexId, to: VertexId, topic: &str, weight: i64) -> Result<EdgeId> {
        let props = props([(TOPIC, Value::from(topic)), (WEIGHT, Value::from(weight))]);
        self.store.create_edge(self.tx, from, to, RelKind::Knows, props)
    }

    /// `person -[:ASSOCIATED_TO {weight, cost}]-> topic`
    pub fn associate(&mut self, person: VertexId, topic: VertexId, weight: i64, cost: f64) -> Result<EdgeId> {
        let props = props([(WEIGHT, Value::from(weight)), (COST, Value::from(cost))]);
        self.store.create_edge(self.tx, person, topic, RelKind::AssociatedTo, props)
    }

    /// `person -[:IS_MEMBER_OF]-> group`
    pub fn member_of(&mut self, person: VertexId, group: VertexId) -> Result<EdgeId> {
        self.store.create_edge(self.tx, person, group, RelKind::IsMemberOf, PropertyMap::new())
    }

    /// Untyped edge with caller-supplied properties (authorship, views,
    /// document topics, or deliberately malformed edges).
    pub fn relate(&mut self, src: VertexId, dst: VertexId, rel: RelKind, props: PropertyMap) -> Result<EdgeId> {
        self.store.create_edge(self.tx, src, dst, rel, props)
    }
}
