//! # Traversal Engine
//!
//! The bounded-walk family. Every walk reads through
//! `GraphStore::neighbors()` under the session's transaction.
//!
//! | Walk | Relation | Direction | Bound |
//! |------|----------|-----------|-------|
//! | `one_hop` | any | any | none |
//! | `weight_filtered_one_hop` | any | any | none |
//! | `topic_filtered_knows` | `Knows` | Both | none |
//! | `two_hop_dedup` | `Knows` | Both | none |
//! | `n_level_breadth_first` | `Knows` | caller | `level` |
//! | `breadth_limited_two_hop` | `Knows` | Both | `breadth` per step |
//! | `friends_of_friends` | `Knows` | Both | none |
//! | `two_level` | `Knows` | Both, then caller | `breadth` per step |
//!
//! Set-valued results are `Vec<VertexId>` deduplicated by identity in
//! first-discovery order. `adjacent()`, `two_level()` and `groups_of()`
//! are edge-order listings and keep repeats.
//!
//! A breadth of 0 means unbounded.

use std::collections::VecDeque;

use hashbrown::HashSet;
use tracing::{debug, warn};

use crate::model::*;
use crate::storage::GraphStore;
use crate::Result;

// ============================================================================
// Helpers
// ============================================================================

/// Per-step cap for breadth-limited walks.
fn cap(breadth: usize) -> usize {
    if breadth == 0 { usize::MAX } else { breadth }
}

/// Ordered identity set.
#[derive(Default)]
struct Collector {
    seen: HashSet<VertexId>,
    out: Vec<VertexId>,
}

impl Collector {
    fn push(&mut self, v: VertexId) {
        if self.seen.insert(v) {
            self.out.push(v);
        }
    }

    fn finish(self) -> Vec<VertexId> {
        self.out
    }
}

fn topic_matches(edge: &Edge, topic: &str) -> bool {
    match edge.topic() {
        Ok(t) => t == topic,
        Err(err) => {
            warn!(%err, "edge skipped by topic filter");
            false
        }
    }
}

fn weight_matches(edge: &Edge, weight: i64) -> bool {
    match edge.weight() {
        Ok(w) => w == weight,
        Err(err) => {
            warn!(%err, "edge skipped by weight filter");
            false
        }
    }
}

// ============================================================================
// Traversal
// ============================================================================

/// Read-only walk handle over a store and a borrowed transaction.
pub struct Traversal<'a, S: GraphStore> {
    store: &'a S,
    tx: &'a S::Tx,
}

impl<'a, S: GraphStore> Traversal<'a, S> {
    pub fn new(store: &'a S, tx: &'a S::Tx) -> Self {
        Self { store, tx }
    }

    /// Incident edges paired with their far endpoint, in edge order.
    pub fn incident(&self, v: VertexId, rel: RelKind, dir: Direction) -> Result<Vec<(Edge, VertexId)>> {
        self.store.neighbors(self.tx, v, rel, dir)
    }

    /// Far endpoints of `v`'s edges in edge order, repeats kept.
    pub fn adjacent(&self, v: VertexId, rel: RelKind, dir: Direction) -> Result<Vec<VertexId>> {
        Ok(self.incident(v, rel, dir)?.into_iter().map(|(_, other)| other).collect())
    }

    // ========================================================================
    // One hop
    // ========================================================================

    pub fn one_hop(&self, v: VertexId, rel: RelKind, dir: Direction) -> Result<Vec<VertexId>> {
        let mut acc = Collector::default();
        for (_, other) in self.incident(v, rel, dir)? {
            acc.push(other);
        }
        Ok(acc.finish())
    }

    /// `one_hop`, keeping only neighbours whose connecting edge has
    /// `weight == weight` exactly.
    pub fn weight_filtered_one_hop(
        &self,
        v: VertexId,
        rel: RelKind,
        dir: Direction,
        weight: i64,
    ) -> Result<Vec<VertexId>> {
        let mut acc = Collector::default();
        for (edge, other) in self.incident(v, rel, dir)? {
            if weight_matches(&edge, weight) {
                acc.push(other);
            }
        }
        Ok(acc.finish())
    }

    /// People linked to `person` by a `Knows` edge tagged `topic`
    /// (case-sensitive), either direction.
    pub fn topic_filtered_knows(&self, person: VertexId, topic: &str) -> Result<Vec<VertexId>> {
        let mut acc = Collector::default();
        for (edge, other) in self.incident(person, RelKind::Knows, Direction::Both)? {
            if topic_matches(&edge, topic) {
                acc.push(other);
            }
        }
        Ok(acc.finish())
    }

    /// Whether any `AssociatedTo` edge joins `person` and `topic`.
    pub fn topic_membership(&self, person: VertexId, topic: VertexId) -> Result<bool> {
        Ok(self
            .incident(person, RelKind::AssociatedTo, Direction::Both)?
            .iter()
            .any(|(_, other)| *other == topic))
    }

    pub fn people_on_topic(&self, topic: VertexId) -> Result<Vec<VertexId>> {
        self.one_hop(topic, RelKind::AssociatedTo, Direction::Incoming)
    }

    pub fn people_on_topic_with_weight(&self, topic: VertexId, weight: i64) -> Result<Vec<VertexId>> {
        self.weight_filtered_one_hop(topic, RelKind::AssociatedTo, Direction::Incoming, weight)
    }

    /// Everyone else associated with `topic`, or `None` when `person`
    /// is not associated with it.
    pub fn associated_people(&self, person: VertexId, topic: VertexId) -> Result<Option<Vec<VertexId>>> {
        if !self.topic_membership(person, topic)? {
            debug!(%person, %topic, "person not associated with topic");
            return Ok(None);
        }
        let mut people = self.people_on_topic(topic)?;
        people.retain(|&p| p != person);
        Ok(Some(people))
    }

    // ========================================================================
    // Two hops
    // ========================================================================

    /// Union of every first-hop neighbour's `Knows` neighbours.
    ///
    /// Not filtered: `v` and its direct neighbours appear whenever they are
    /// also a neighbour of a neighbour.
    pub fn two_hop_dedup(&self, v: VertexId) -> Result<Vec<VertexId>> {
        let mut acc = Collector::default();
        for (_, friend) in self.incident(v, RelKind::Knows, Direction::Both)? {
            for (_, stranger) in self.incident(friend, RelKind::Knows, Direction::Both)? {
                acc.push(stranger);
            }
        }
        let people = acc.finish();
        debug!(%v, found = people.len(), "two-hop walk");
        Ok(people)
    }

    /// `{f} ∪ first breadth neighbours of f` for the first `breadth`
    /// first-hop neighbours `f`. Sets with identical members are reported
    /// once, at their first position.
    pub fn breadth_limited_two_hop(&self, v: VertexId, breadth: usize) -> Result<Vec<Vec<VertexId>>> {
        let sets = self.closed_neighbourhoods(v, cap(breadth))?;
        debug!(%v, breadth, sets = sets.len(), "breadth-limited two-hop walk");
        Ok(sets)
    }

    /// `{f} ∪ N(f)` for every first-hop neighbour `f`. Sets with identical
    /// members are reported once, at their first position.
    pub fn friends_of_friends(&self, v: VertexId) -> Result<Vec<Vec<VertexId>>> {
        let sets = self.closed_neighbourhoods(v, usize::MAX)?;
        debug!(%v, sets = sets.len(), "friends-of-friends walk");
        Ok(sets)
    }

    fn closed_neighbourhoods(&self, v: VertexId, limit: usize) -> Result<Vec<Vec<VertexId>>> {
        let mut distinct: HashSet<Vec<VertexId>> = HashSet::new();
        let mut sets = Vec::new();
        for (_, friend) in self.incident(v, RelKind::Knows, Direction::Both)?.into_iter().take(limit) {
            let mut acc = Collector::default();
            acc.push(friend);
            for (_, stranger) in self.incident(friend, RelKind::Knows, Direction::Both)?.into_iter().take(limit) {
                acc.push(stranger);
            }
            let members = acc.finish();

            let mut key = members.clone();
            key.sort_unstable();
            if distinct.insert(key) {
                sets.push(members);
            }
        }
        Ok(sets)
    }

    /// Ordered first hop (`Knows`, Both) paired with each friend's ordered
    /// `Knows` neighbours in `inner`. Both levels capped at `breadth`.
    pub fn two_level(
        &self,
        v: VertexId,
        breadth: usize,
        inner: Direction,
    ) -> Result<Vec<(VertexId, Vec<VertexId>)>> {
        let limit = cap(breadth);
        let mut levels = Vec::new();
        for (_, friend) in self.incident(v, RelKind::Knows, Direction::Both)?.into_iter().take(limit) {
            let second = self
                .incident(friend, RelKind::Knows, inner)?
                .into_iter()
                .take(limit)
                .map(|(_, other)| other)
                .collect();
            levels.push((friend, second));
        }
        Ok(levels)
    }

    // ========================================================================
    // N levels
    // ========================================================================

    /// Newly seen `Knows` neighbours of `vertex`; each is marked in `visited`.
    fn expand(&self, vertex: VertexId, dir: Direction, visited: &mut HashSet<VertexId>) -> Result<Vec<VertexId>> {
        let mut fresh = Vec::new();
        for (_, next) in self.incident(vertex, RelKind::Knows, dir)? {
            if visited.insert(next) {
                fresh.push(next);
            }
        }
        Ok(fresh)
    }

    /// Breadth-first walk from `start`, excluding `start`.
    ///
    /// Returns as soon as the first vertex at depth `level + 1` is
    /// discovered; that vertex and everything not yet discovered are left
    /// out. `level == 0` therefore yields nothing for a connected start.
    pub fn n_level_breadth_first(&self, start: VertexId, level: usize, dir: Direction) -> Result<Vec<VertexId>> {
        let stop_depth = level.saturating_add(1);
        let mut visited = HashSet::new();
        visited.insert(start);
        let mut frontier = VecDeque::from([(start, 0usize)]);
        let mut found = Vec::new();

        while let Some((vertex, depth)) = frontier.pop_front() {
            for next in self.expand(vertex, dir, &mut visited)? {
                if depth + 1 == stop_depth {
                    debug!(%start, level, found = found.len(), stopped_at = %next, "n-level walk hit depth bound");
                    return Ok(found);
                }
                found.push(next);
                frontier.push_back((next, depth + 1));
            }
        }
        debug!(%start, level, found = found.len(), "n-level walk exhausted graph");
        Ok(found)
    }

    // ========================================================================
    // Groups
    // ========================================================================

    /// `IsMemberOf` targets in edge-creation order.
    pub fn groups_of(&self, person: VertexId) -> Result<Vec<VertexId>> {
        self.adjacent(person, RelKind::IsMemberOf, Direction::Outgoing)
    }

    pub fn groups_of_many(&self, people: &[VertexId]) -> Result<Vec<(VertexId, Vec<VertexId>)>> {
        people.iter().map(|&p| Ok((p, self.groups_of(p)?))).collect()
    }

    // ========================================================================
    // Edge counts
    // ========================================================================

    fn count_on_topic(&self, person: VertexId, topic: &str, dir: Direction) -> Result<usize> {
        Ok(self
            .incident(person, RelKind::Knows, dir)?
            .iter()
            .filter(|(edge, _)| topic_matches(edge, topic))
            .count())
    }

    pub fn incoming_edge_count(&self, person: VertexId, topic: &str) -> Result<usize> {
        self.count_on_topic(person, topic, Direction::Incoming)
    }

    pub fn outgoing_edge_count(&self, person: VertexId, topic: &str) -> Result<usize> {
        self.count_on_topic(person, topic, Direction::Outgoing)
    }
}

// ============================================================================
// Mutation
// ============================================================================

/// Set `weight` on every `Knows` edge touching `person` whose topic is
/// `topic`. Returns the number of edges written.
pub fn update_edge_weight<S: GraphStore>(
    store: &S,
    tx: &mut S::Tx,
    person: VertexId,
    topic: &str,
    weight: i64,
) -> Result<usize> {
    let matched: Vec<EdgeId> = store
        .neighbors(tx, person, RelKind::Knows, Direction::Both)?
        .into_iter()
        .filter(|(edge, _)| topic_matches(edge, topic))
        .map(|(edge, _)| edge.id)
        .collect();

    for &id in &matched {
        store.set_edge_property(tx, id, WEIGHT, Value::from(weight))?;
    }
    debug!(%person, topic, weight, updated = matched.len(), "edge weights updated");
    Ok(matched.len())
}

// ============================================================================
// Tests
// ============================================================================
