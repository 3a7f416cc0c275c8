//! End-to-end tests for the bounded-walk family.
//!
//! Covers one-hop filters, two-hop and n-level walks, edge counts and the
//! weight update, against hand-built fixtures and generated graphs.

mod common;

use common::{knows_graph, social};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use socialgraph::config::GraphConfig;
use socialgraph::ingest::{self, GraphBuilder};
use socialgraph::model::{props, TOPIC, WEIGHT};
use socialgraph::{Direction, EdgeId, GraphStore, MemoryStore, RelKind, Session, TxMode, Value};

// ============================================================================
// 1. One hop
// ============================================================================

#[test]
fn test_one_hop_both_directions() {
    let s = social();
    let session = Session::open(&s.store, TxMode::ReadOnly).unwrap();
    let walk = session.traversal();
    assert_eq!(walk.one_hop(s.alice, RelKind::Knows, Direction::Both).unwrap(), vec![s.bob, s.carol]);
    assert_eq!(walk.one_hop(s.bob, RelKind::Knows, Direction::Incoming).unwrap(), vec![s.alice]);
    assert_eq!(walk.one_hop(s.bob, RelKind::Knows, Direction::Outgoing).unwrap(), vec![s.dave]);
    assert!(walk.one_hop(s.erin, RelKind::Knows, Direction::Both).unwrap().is_empty());
}

#[test]
fn test_topic_filtered_knows() {
    let s = social();
    let session = Session::open(&s.store, TxMode::ReadOnly).unwrap();
    let walk = session.traversal();
    assert_eq!(walk.topic_filtered_knows(s.alice, "science").unwrap(), vec![s.bob]);
    assert_eq!(walk.topic_filtered_knows(s.bob, "science").unwrap(), vec![s.alice, s.dave]);
    assert!(walk.topic_filtered_knows(s.alice, "Science").unwrap().is_empty());
}

#[test]
fn test_weight_filtered_one_hop() {
    let s = social();
    let session = Session::open(&s.store, TxMode::ReadOnly).unwrap();
    let walk = session.traversal();
    assert_eq!(
        walk.weight_filtered_one_hop(s.alice, RelKind::Knows, Direction::Both, 4).unwrap(),
        vec![s.bob]
    );
    assert!(walk
        .weight_filtered_one_hop(s.alice, RelKind::Knows, Direction::Both, 9)
        .unwrap()
        .is_empty());
}

#[test]
fn test_float_weight_never_matches_integer_filter() {
    let store = MemoryStore::new();
    let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
    let (a, c) = {
        let mut g = GraphBuilder::new(&store, &mut tx).unwrap();
        let a = g.person("a").unwrap();
        let b = g.person("b").unwrap();
        let c = g.person("c").unwrap();
        g.relate(a, b, RelKind::Knows, props([(TOPIC, Value::from("t")), (WEIGHT, Value::Float(4.0))]))
            .unwrap();
        g.knows(a, c, "t", 4).unwrap();
        (a, c)
    };
    store.commit_tx(tx).unwrap();

    let session = Session::open(&store, TxMode::ReadOnly).unwrap();
    let walk = session.traversal();
    // a -> b carries 4.0, a -> c carries 4
    assert_eq!(walk.weight_filtered_one_hop(a, RelKind::Knows, Direction::Both, 4).unwrap(), vec![c]);
}

#[test]
fn test_people_on_topic() {
    let s = social();
    let session = Session::open(&s.store, TxMode::ReadOnly).unwrap();
    let walk = session.traversal();
    assert_eq!(walk.people_on_topic(s.science).unwrap(), vec![s.alice, s.bob, s.dave]);
    assert_eq!(walk.people_on_topic_with_weight(s.science, 3).unwrap(), vec![s.alice, s.bob]);
    assert_eq!(walk.associated_people(s.alice, s.science).unwrap(), Some(vec![s.bob, s.dave]));
    assert_eq!(walk.associated_people(s.carol, s.science).unwrap(), None);
}

#[test]
fn test_groups() {
    let s = social();
    let session = Session::open(&s.store, TxMode::ReadOnly).unwrap();
    let walk = session.traversal();
    assert_eq!(walk.groups_of(s.bob).unwrap(), vec![s.chess, s.go]);
    assert_eq!(
        walk.groups_of_many(&[s.alice, s.erin]).unwrap(),
        vec![(s.alice, vec![s.chess]), (s.erin, vec![])]
    );
}

// ============================================================================
// 2. Edge counts + weight update
// ============================================================================

#[test]
fn test_edge_counts() {
    let s = social();
    let session = Session::open(&s.store, TxMode::ReadOnly).unwrap();
    let walk = session.traversal();
    assert_eq!(walk.incoming_edge_count(s.bob, "science").unwrap(), 1);
    assert_eq!(walk.outgoing_edge_count(s.bob, "science").unwrap(), 1);
    assert_eq!(walk.incoming_edge_count(s.alice, "science").unwrap(), 0);
    assert_eq!(walk.outgoing_edge_count(s.alice, "art").unwrap(), 1);
}

#[test]
fn test_update_edge_weight() {
    let s = social();
    let mut session = Session::open(&s.store, TxMode::ReadWrite).unwrap();
    assert_eq!(session.update_edge_weight(s.alice, "science", 9).unwrap(), 1);

    let walk = session.traversal();
    let at = |w| walk.weight_filtered_one_hop(s.alice, RelKind::Knows, Direction::Both, w).unwrap();
    assert_eq!(at(9), vec![s.bob]);
    assert!(at(4).is_empty());
    assert_eq!(at(2), vec![s.carol]);
}

#[test]
fn test_update_edge_weight_idempotent() {
    let s = social();
    let mut session = Session::open(&s.store, TxMode::ReadWrite).unwrap();
    session.update_edge_weight(s.bob, "science", 9).unwrap();
    session.update_edge_weight(s.bob, "science", 9).unwrap();

    let walk = session.traversal();
    let matched = walk.weight_filtered_one_hop(s.bob, RelKind::Knows, Direction::Both, 9).unwrap();
    assert_eq!(matched, walk.topic_filtered_knows(s.bob, "science").unwrap());
    session.commit().unwrap();

    let session = Session::open(&s.store, TxMode::ReadOnly).unwrap();
    let walk = session.traversal();
    assert_eq!(
        walk.weight_filtered_one_hop(s.dave, RelKind::Knows, Direction::Both, 9).unwrap(),
        vec![s.bob]
    );
}

// ============================================================================
// 3. Two hops
// ============================================================================

#[test]
fn test_two_hop_includes_origin() {
    let s = social();
    let session = Session::open(&s.store, TxMode::ReadOnly).unwrap();
    assert_eq!(session.traversal().two_hop_dedup(s.alice).unwrap(), vec![s.alice, s.dave]);
}

#[test]
fn test_two_hop_includes_first_hop() {
    let (store, p) = knows_graph(3, &[(0, 1), (0, 2), (1, 2)]);
    let session = Session::open(&store, TxMode::ReadOnly).unwrap();
    assert_eq!(session.traversal().two_hop_dedup(p[0]).unwrap(), vec![p[0], p[2], p[1]]);
}

#[test]
fn test_friends_of_friends_dedup() {
    let (store, p) = knows_graph(3, &[(0, 1), (0, 2), (1, 2)]);
    let session = Session::open(&store, TxMode::ReadOnly).unwrap();
    let sets = session.traversal().friends_of_friends(p[0]).unwrap();
    assert_eq!(sets, vec![vec![p[1], p[0], p[2]]]);
}

#[test]
fn test_friends_of_friends_distinct_sets() {
    let s = social();
    let session = Session::open(&s.store, TxMode::ReadOnly).unwrap();
    let sets = session.traversal().friends_of_friends(s.alice).unwrap();
    assert_eq!(sets, vec![vec![s.bob, s.alice, s.dave], vec![s.carol, s.alice]]);
}

#[test]
fn test_breadth_limited_two_hop() {
    // p0 knows p1..p4; p1 knows p5..p8
    let edges = [(0, 1), (0, 2), (0, 3), (0, 4), (1, 5), (1, 6), (1, 7), (1, 8)];
    let (store, p) = knows_graph(9, &edges);
    let session = Session::open(&store, TxMode::ReadOnly).unwrap();
    let walk = session.traversal();

    let sets = walk.breadth_limited_two_hop(p[0], 2).unwrap();
    assert_eq!(sets, vec![vec![p[1], p[0], p[5]], vec![p[2], p[0]]]);

    let unbounded = walk.breadth_limited_two_hop(p[0], 0).unwrap();
    assert_eq!(unbounded.len(), 4);
    assert_eq!(unbounded[0].len(), 6);
}

#[test]
fn test_breadth_limited_two_hop_reports_identical_sets_once() {
    // p0 knows p1 and p2, who know each other: {p1, p0, p2} == {p2, p0, p1}
    let (store, p) = knows_graph(4, &[(0, 1), (0, 2), (1, 2), (0, 3)]);
    let session = Session::open(&store, TxMode::ReadOnly).unwrap();
    let walk = session.traversal();

    let sets = walk.breadth_limited_two_hop(p[0], 0).unwrap();
    assert_eq!(sets, vec![vec![p[1], p[0], p[2]], vec![p[3], p[0]]]);
    assert_eq!(sets, walk.friends_of_friends(p[0]).unwrap());
}

// ============================================================================
// 4. N levels
// ============================================================================

#[test]
fn test_n_level_stops_at_first_deeper_vertex() {
    // p0 → p1, p0 → p2, p1 → p3, p2 → p4, p3 → p5
    let (store, p) = knows_graph(6, &[(0, 1), (0, 2), (1, 3), (2, 4), (3, 5)]);
    let session = Session::open(&store, TxMode::ReadOnly).unwrap();
    let walk = session.traversal();

    assert_eq!(walk.n_level_breadth_first(p[0], 1, Direction::Both).unwrap(), vec![p[1], p[2]]);
    assert_eq!(
        walk.n_level_breadth_first(p[0], 2, Direction::Both).unwrap(),
        vec![p[1], p[2], p[3], p[4]]
    );
    assert!(walk.n_level_breadth_first(p[0], 0, Direction::Both).unwrap().is_empty());
}

#[test]
fn test_n_level_exhausts_small_component() {
    let (store, p) = knows_graph(4, &[(0, 1), (1, 2)]);
    let session = Session::open(&store, TxMode::ReadOnly).unwrap();
    let walk = session.traversal();
    assert_eq!(walk.n_level_breadth_first(p[0], 5, Direction::Both).unwrap(), vec![p[1], p[2]]);
    assert!(walk.n_level_breadth_first(p[2], 3, Direction::Outgoing).unwrap().is_empty());
}

#[test]
fn test_n_level_unbounded_level_reaches_everything() {
    let (store, p) = knows_graph(7, &[(0, 1), (0, 2), (1, 3), (2, 4), (3, 5)]);
    let session = Session::open(&store, TxMode::ReadOnly).unwrap();
    let walk = session.traversal();
    assert_eq!(
        walk.n_level_breadth_first(p[0], usize::MAX, Direction::Both).unwrap(),
        vec![p[1], p[2], p[3], p[4], p[5]]
    );
}

// ============================================================================
// 5. Properties over generated graphs
// ============================================================================

fn generated(seed: u64) -> MemoryStore {
    let config = GraphConfig {
        people: 15,
        topics: 4,
        groups: 3,
        documents: 0,
        topics_per_person: 2,
        people_per_person: 3,
        seed,
        ..Default::default()
    };
    let store = MemoryStore::new();
    ingest::ingest(&store, &config).unwrap();
    store
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_topic_filter_symmetric(seed in any::<u64>(), topic in 0usize..4) {
        let store = generated(seed);
        let session = Session::open(&store, TxMode::ReadOnly).unwrap();
        let walk = session.traversal();
        let topic = format!("topic-{topic:03}");
        for name in session.people().unwrap().keys() {
            let p = session.resolve_person(name).unwrap();
            for f in walk.topic_filtered_knows(p, &topic).unwrap() {
                prop_assert!(walk.topic_filtered_knows(f, &topic).unwrap().contains(&p));
            }
        }
    }

    #[test]
    fn prop_weight_filter_is_subset(seed in any::<u64>(), weight in 0i64..10) {
        let store = generated(seed);
        let session = Session::open(&store, TxMode::ReadOnly).unwrap();
        let walk = session.traversal();
        for name in session.people().unwrap().keys() {
            let p = session.resolve_person(name).unwrap();
            let all = walk.one_hop(p, RelKind::Knows, Direction::Both).unwrap();
            let filtered = walk.weight_filtered_one_hop(p, RelKind::Knows, Direction::Both, weight).unwrap();
            for f in &filtered {
                prop_assert!(all.contains(f));
                let joined = walk
                    .incident(p, RelKind::Knows, Direction::Both)
                    .unwrap()
                    .into_iter()
                    .any(|(e, other)| other == *f && e.weight().ok() == Some(weight));
                prop_assert!(joined);
            }
        }
    }

    #[test]
    fn prop_incoming_count_matches_edges(seed in any::<u64>(), topic in 0usize..4) {
        let store = generated(seed);
        let session = Session::open(&store, TxMode::ReadOnly).unwrap();
        let topic = format!("topic-{topic:03}");
        let edges = store.stats(session.tx()).unwrap().edges;
        let all: Vec<_> = (0..edges)
            .filter_map(|i| store.edge(session.tx(), EdgeId(i)).unwrap())
            .collect();
        for name in session.people().unwrap().keys() {
            let p = session.resolve_person(name).unwrap();
            let expected = all
                .iter()
                .filter(|e| e.rel == RelKind::Knows && e.dst == p && e.has_topic(&topic))
                .count();
            prop_assert_eq!(session.traversal().incoming_edge_count(p, &topic).unwrap(), expected);
        }
    }
}
