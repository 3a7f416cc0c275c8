//! Shared fixtures for the end-to-end tests.

#![allow(dead_code)]

use socialgraph::ingest::GraphBuilder;
use socialgraph::{GraphStore, MemoryStore, TxMode, VertexId};

/// A small hand-built social graph.
///
/// ```text
/// Alice -[science, 4]-> Bob -[science, 7]-> Dave
/// Alice -[art, 2]-> Carol
/// Erin (isolated)
///
/// science: Alice (w3, c0.5), Bob (w3, c0.25), Dave (w5, c0.75)
/// art:     Carol (w1, c0.1)
/// chess:   Alice, Bob      go: Bob, Dave
/// ```
pub struct Social {
    pub store: MemoryStore,
    pub alice: VertexId,
    pub bob: VertexId,
    pub carol: VertexId,
    pub dave: VertexId,
    pub erin: VertexId,
    pub science: VertexId,
    pub art: VertexId,
    pub chess: VertexId,
    pub go: VertexId,
}

pub fn social() -> Social {
    let store = MemoryStore::new();
    let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
    let social = {
        let mut g = GraphBuilder::new(&store, &mut tx).unwrap();
        let science = g.topic("science").unwrap();
        let art = g.topic("art").unwrap();
        let chess = g.group("chess").unwrap();
        let go = g.group("go").unwrap();
        let alice = g.person("Alice").unwrap();
        let bob = g.person("Bob").unwrap();
        let carol = g.person("Carol").unwrap();
        let dave = g.person("Dave").unwrap();
        let erin = g.person("Erin").unwrap();

        g.knows(alice, bob, "science", 4).unwrap();
        g.knows(alice, carol, "art", 2).unwrap();
        g.knows(bob, dave, "science", 7).unwrap();

        g.associate(alice, science, 3, 0.5).unwrap();
        g.associate(bob, science, 3, 0.25).unwrap();
        g.associate(dave, science, 5, 0.75).unwrap();
        g.associate(carol, art, 1, 0.1).unwrap();

        g.member_of(alice, chess).unwrap();
        g.member_of(bob, chess).unwrap();
        g.member_of(bob, go).unwrap();
        g.member_of(dave, go).unwrap();

        (alice, bob, carol, dave, erin, science, art, chess, go)
    };
    store.commit_tx(tx).unwrap();

    let (alice, bob, carol, dave, erin, science, art, chess, go) = social;
    Social { store, alice, bob, carol, dave, erin, science, art, chess, go }
}

/// People `p0..pN` with the given `(from, to)` Knows edges, all topic "t",
/// weight 1.
pub fn knows_graph(people: usize, edges: &[(usize, usize)]) -> (MemoryStore, Vec<VertexId>) {
    let store = MemoryStore::new();
    let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
    let ids = {
        let mut g = GraphBuilder::new(&store, &mut tx).unwrap();
        g.topic("t").unwrap();
        let ids: Vec<_> = (0..people).map(|i| g.person(&format!("p{i}")).unwrap()).collect();
        for &(a, b) in edges {
            g.knows(ids[a], ids[b], "t", 1).unwrap();
        }
        ids
    };
    store.commit_tx(tx).unwrap();
    (store, ids)
}
