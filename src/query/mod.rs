//! # Query Dispatcher
//!
//! Maps a selector (1–22) plus `{person, topic, weight, breadth, level}`
//! onto one traversal or analytics call and normalises the result.
//!
//! ```text
//! Query + QueryParams
//!   → Session (resolve person / topic, fail with KeyNotFound)
//!   → Traversal walk
//!   → QueryOutput  (+ optional export records)
//! ```
//!
//! Names are resolved before any walk runs. Only `UpdateTopicWeight`
//! writes, and it needs a `ReadWrite` session.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analytics::{self, CentralityKind, ShortestPathAlgorithm, Subgraph, EIGENVECTOR_MAX_ITERATIONS};
use crate::export::{ExportRecord, SubgraphExporter};
use crate::model::*;
use crate::session::Session;
use crate::storage::GraphStore;
use crate::{Error, Result};

/// Default depth for `NLevelBreadthFirst`.
pub const DEFAULT_LEVEL: usize = 2;

// ============================================================================
// Query catalogue
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Query {
    PeopleOnTopic,
    PeopleOnTopicByWeight,
    AssociatedPeople,
    KnowsOnTopic,
    Knows,
    MayKnow,
    KnowsOnTopicWithGroups,
    AssociatedPeopleWithGroups,
    Groups,
    NLevel,
    FriendsOfFriends,
    FriendsOfFriendsFlare,
    BreadthLimitedTwoHop,
    IncomingEdgeCount,
    OutgoingEdgeCount,
    UpdateTopicWeight,
    BetweennessBfs,
    DijkstraPaths,
    FloydWarshallPath,
    EigenvectorArnoldi,
    EigenvectorPower,
    BreadthFirstPaths,
}

impl Query {
    /// Selector order.
    pub const ALL: [Query; 22] = [
        Query::PeopleOnTopic,
        Query::PeopleOnTopicByWeight,
        Query::AssociatedPeople,
        Query::KnowsOnTopic,
        Query::Knows,
        Query::MayKnow,
        Query::KnowsOnTopicWithGroups,
        Query::AssociatedPeopleWithGroups,
        Query::Groups,
        Query::NLevel,
        Query::FriendsOfFriends,
        Query::FriendsOfFriendsFlare,
        Query::BreadthLimitedTwoHop,
        Query::IncomingEdgeCount,
        Query::OutgoingEdgeCount,
        Query::UpdateTopicWeight,
        Query::BetweennessBfs,
        Query::DijkstraPaths,
        Query::FloydWarshallPath,
        Query::EigenvectorArnoldi,
        Query::EigenvectorPower,
        Query::BreadthFirstPaths,
    ];

    pub fn selector(self) -> u8 {
        Query::ALL.iter().position(|&q| q == self).map_or(0, |i| i as u8 + 1)
    }

    pub fn description(self) -> &'static str {
        match self {
            Query::PeopleOnTopic => "people associated with a topic",
            Query::PeopleOnTopicByWeight => "people associated with a topic, filtered by weight",
            Query::AssociatedPeople => "people sharing the person's topic",
            Query::KnowsOnTopic => "people the person knows via the topic",
            Query::Knows => "people the person knows (1st level)",
            Query::MayKnow => "people the person may know (2nd level)",
            Query::KnowsOnTopicWithGroups => "people the person knows via the topic, with groups",
            Query::AssociatedPeopleWithGroups => "people sharing the person's topic, with groups",
            Query::Groups => "the person's groups",
            Query::NLevel => "people the person may know (n levels)",
            Query::FriendsOfFriends => "each friend with their friends",
            Query::FriendsOfFriendsFlare => "flare export of friends and their friends",
            Query::BreadthLimitedTwoHop => "each friend with their friends, breadth limited",
            Query::IncomingEdgeCount => "incoming edges on the topic",
            Query::OutgoingEdgeCount => "outgoing edges on the topic",
            Query::UpdateTopicWeight => "set topic weight to the outgoing edge count",
            Query::BetweennessBfs => "betweenness centrality (BFS)",
            Query::DijkstraPaths => "Dijkstra shortest paths to topic friends",
            Query::FloydWarshallPath => "Floyd-Warshall shortest path on the topic",
            Query::EigenvectorArnoldi => "eigenvector centrality (Arnoldi parameters)",
            Query::EigenvectorPower => "eigenvector centrality (power method)",
            Query::BreadthFirstPaths => "breadth-first shortest paths to topic friends",
        }
    }

    /// Whether the query mutates the graph.
    pub fn is_write(self) -> bool {
        matches!(self, Query::UpdateTopicWeight)
    }
}

impl TryFrom<u8> for Query {
    type Error = Error;

    fn try_from(selector: u8) -> Result<Self> {
        match selector {
            1..=22 => Ok(Query::ALL[selector as usize - 1]),
            other => Err(Error::UnknownQuery(other)),
        }
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Query {}: {}", self.selector(), self.description())
    }
}

// ============================================================================
// Parameters / results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pub person: String,
    pub topic: String,
    pub weight: i64,
    /// 0 = unbounded.
    pub breadth: usize,
    pub level: usize,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            person: String::new(),
            topic: String::new(),
            weight: 0,
            breadth: 0,
            level: DEFAULT_LEVEL,
        }
    }
}

impl QueryParams {
    pub fn new(person: impl Into<String>, topic: impl Into<String>) -> Self {
        Self { person: person.into(), topic: topic.into(), ..Default::default() }
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_breadth(mut self, breadth: usize) -> Self {
        self.breadth = breadth;
        self
    }

    pub fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }
}

/// Normalised query result.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Vertices(Vec<VertexId>),
    VertexSets(Vec<Vec<VertexId>>),
    /// Each vertex with its groups.
    Grouped(Vec<(VertexId, Vec<VertexId>)>),
    Count(usize),
    Score(f64),
    Paths(Vec<GraphPath>),
    Unit,
    /// The subject is not associated with the topic, or not part of the
    /// analysed subgraph.
    NotApplicable,
}

impl QueryOutput {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryOutput::Vertices(_) => "vertices",
            QueryOutput::VertexSets(_) => "vertex-sets",
            QueryOutput::Grouped(_) => "grouped",
            QueryOutput::Count(_) => "count",
            QueryOutput::Score(_) => "score",
            QueryOutput::Paths(_) => "paths",
            QueryOutput::Unit => "unit",
            QueryOutput::NotApplicable => "not-applicable",
        }
    }

    pub fn vertices(&self) -> Option<&[VertexId]> {
        match self {
            QueryOutput::Vertices(v) => Some(v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            QueryOutput::Vertices(v) => v.len(),
            QueryOutput::VertexSets(v) => v.len(),
            QueryOutput::Grouped(v) => v.len(),
            QueryOutput::Paths(v) => v.len(),
            QueryOutput::Count(_) | QueryOutput::Score(_) => 1,
            QueryOutput::Unit | QueryOutput::NotApplicable => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    pub query: Query,
    pub output: QueryOutput,
    /// Records for the export sink, when the query has an export form.
    pub export: Option<Vec<ExportRecord>>,
}

impl DispatchResult {
    fn new(query: Query, output: QueryOutput) -> Self {
        Self { query, output, export: None }
    }

    fn exported(mut self, records: Vec<ExportRecord>) -> Self {
        self.export = Some(records);
        self
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

pub struct QueryDispatcher<'a, 's, S: GraphStore> {
    session: &'a mut Session<'s, S>,
}

impl<'a, 's, S: GraphStore> QueryDispatcher<'a, 's, S> {
    pub fn new(session: &'a mut Session<'s, S>) -> Self {
        Self { session }
    }

    /// Dispatch by integer selector.
    pub fn dispatch_selector(&mut self, selector: u8, params: &QueryParams) -> Result<DispatchResult> {
        let query = Query::try_from(selector)?;
        self.dispatch(query, params)
    }

    pub fn dispatch(&mut self, query: Query, params: &QueryParams) -> Result<DispatchResult> {
        let started = Instant::now();
        let result = if query.is_write() {
            self.update_topic_weight(params)?
        } else {
            self.read(query, params)?
        };
        info!(
            query = query.selector(),
            person = %params.person,
            topic = %params.topic,
            output = result.output.kind(),
            size = result.output.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query dispatched"
        );
        Ok(result)
    }

    fn update_topic_weight(&mut self, params: &QueryParams) -> Result<DispatchResult> {
        let person = self.session.resolve_person(&params.person)?;
        let count = self.session.traversal().outgoing_edge_count(person, &params.topic)?;
        let updated = self.session.update_edge_weight(person, &params.topic, count as i64)?;
        debug!(count, updated, "topic weight set to outgoing edge count");
        Ok(DispatchResult::new(Query::UpdateTopicWeight, QueryOutput::Unit))
    }

    fn read(&self, query: Query, params: &QueryParams) -> Result<DispatchResult> {
        let session: &Session<'s, S> = &*self.session;
        let walk = session.traversal();
        let exporter = SubgraphExporter::new(session);
        let done = |output| DispatchResult::new(query, output);

        let result = match query {
            Query::PeopleOnTopic => {
                let topic = session.resolve_topic(&params.topic)?;
                let people = walk.people_on_topic(topic)?;
                let records = exporter.neighbors(topic, &people)?;
                done(QueryOutput::Vertices(people)).exported(records)
            }
            Query::PeopleOnTopicByWeight => {
                let topic = session.resolve_topic(&params.topic)?;
                let people = walk.people_on_topic_with_weight(topic, params.weight)?;
                let records = exporter.neighbors(topic, &people)?;
                done(QueryOutput::Vertices(people)).exported(records)
            }
            Query::AssociatedPeople => {
                let topic = session.resolve_topic(&params.topic)?;
                let person = session.resolve_person(&params.person)?;
                match walk.associated_people(person, topic)? {
                    Some(people) => {
                        let records = exporter.neighbors(person, &people)?;
                        done(QueryOutput::Vertices(people)).exported(records)
                    }
                    None => done(QueryOutput::NotApplicable),
                }
            }
            Query::KnowsOnTopic => {
                let person = session.resolve_person(&params.person)?;
                let people = walk.topic_filtered_knows(person, &params.topic)?;
                let records = exporter.neighbors(person, &people)?;
                done(QueryOutput::Vertices(people)).exported(records)
            }
            Query::Knows => {
                let person = session.resolve_person(&params.person)?;
                let people = walk.one_hop(person, RelKind::Knows, Direction::Both)?;
                let records = exporter.neighbors(person, &people)?;
                done(QueryOutput::Vertices(people)).exported(records)
            }
            Query::MayKnow => {
                let person = session.resolve_person(&params.person)?;
                let people = walk.two_hop_dedup(person)?;
                let levels = walk.two_level(person, 0, Direction::Outgoing)?;
                let records = exporter.two_level(person, &levels)?;
                done(QueryOutput::Vertices(people)).exported(records)
            }
            Query::KnowsOnTopicWithGroups => {
                let person = session.resolve_person(&params.person)?;
                let people = walk.topic_filtered_knows(person, &params.topic)?;
                done(QueryOutput::Grouped(walk.groups_of_many(&people)?))
            }
            Query::AssociatedPeopleWithGroups => {
                let topic = session.resolve_topic(&params.topic)?;
                let person = session.resolve_person(&params.person)?;
                match walk.associated_people(person, topic)? {
                    Some(people) => done(QueryOutput::Grouped(walk.groups_of_many(&people)?)),
                    None => done(QueryOutput::NotApplicable),
                }
            }
            Query::Groups => {
                let person = session.resolve_person(&params.person)?;
                let groups = walk.groups_of(person)?;
                let records = exporter.neighbors(person, &groups)?;
                done(QueryOutput::Vertices(groups)).exported(records)
            }
            Query::NLevel => {
                let person = session.resolve_person(&params.person)?;
                let people = walk.n_level_breadth_first(person, params.level, Direction::Both)?;
                let mut levels = Vec::new();
                for v in walk.n_level_breadth_first(person, params.level, Direction::Outgoing)? {
                    levels.push((v, walk.adjacent(v, RelKind::Knows, Direction::Outgoing)?));
                }
                let records = exporter.two_level(person, &levels)?;
                done(QueryOutput::Vertices(people)).exported(records)
            }
            Query::FriendsOfFriends => {
                let person = session.resolve_person(&params.person)?;
                done(QueryOutput::VertexSets(walk.friends_of_friends(person)?))
            }
            Query::FriendsOfFriendsFlare => {
                let person = session.resolve_person(&params.person)?;
                let levels = walk.two_level(person, 0, Direction::Both)?;
                let records = exporter.flare(person, &levels)?;
                done(QueryOutput::Unit).exported(records)
            }
            Query::BreadthLimitedTwoHop => {
                let person = session.resolve_person(&params.person)?;
                let sets = walk.breadth_limited_two_hop(person, params.breadth)?;
                let levels = walk.two_level(person, params.breadth, Direction::Both)?;
                let records = exporter.flare(person, &levels)?;
                done(QueryOutput::VertexSets(sets)).exported(records)
            }
            Query::IncomingEdgeCount => {
                let person = session.resolve_person(&params.person)?;
                done(QueryOutput::Count(walk.incoming_edge_count(person, &params.topic)?))
            }
            Query::OutgoingEdgeCount => {
                let person = session.resolve_person(&params.person)?;
                done(QueryOutput::Count(walk.outgoing_edge_count(person, &params.topic)?))
            }
            Query::BetweennessBfs => {
                let (person, _) = self.person_and_topic(params)?;
                let sub = Subgraph::knows_on_topic(&walk, person, &params.topic)?;
                let kind = CentralityKind::BetweennessBfs;
                let scores = analytics::centrality(kind, &sub, WEIGHT, kind.default_tolerance(), 0)?;
                done(score_of(&scores, person))
            }
            Query::DijkstraPaths | Query::BreadthFirstPaths => {
                let (person, _) = self.person_and_topic(params)?;
                let algorithm = if query == Query::DijkstraPaths {
                    ShortestPathAlgorithm::Dijkstra
                } else {
                    ShortestPathAlgorithm::BreadthFirst
                };
                let sub = Subgraph::knows_on_topic(&walk, person, &params.topic)?;
                let mut paths = Vec::new();
                for &friend in sub.nodes.iter().skip(1) {
                    match analytics::shortest_path(algorithm, &sub, person, friend, WEIGHT, Direction::Outgoing)? {
                        Some(path) => paths.push(path),
                        None => debug!(%friend, "no outgoing path"),
                    }
                }
                done(QueryOutput::Paths(paths))
            }
            Query::FloydWarshallPath => {
                let (person, topic) = self.person_and_topic(params)?;
                let sub = Subgraph::topic_associations(&walk, topic)?;
                let mut paths = Vec::new();
                if let Some(&first) = sub.nodes.first() {
                    let algorithm = ShortestPathAlgorithm::FloydWarshall;
                    paths.extend(analytics::shortest_path(algorithm, &sub, person, first, WEIGHT, Direction::Both)?);
                }
                done(QueryOutput::Paths(paths))
            }
            Query::EigenvectorArnoldi | Query::EigenvectorPower => {
                let (person, topic) = self.person_and_topic(params)?;
                let kind = if query == Query::EigenvectorArnoldi {
                    CentralityKind::EigenvectorArnoldi
                } else {
                    CentralityKind::EigenvectorPower
                };
                let sub = Subgraph::topic_associations(&walk, topic)?;
                let scores = analytics::centrality(kind, &sub, COST, kind.default_tolerance(), EIGENVECTOR_MAX_ITERATIONS)?;
                done(score_of(&scores, person))
            }
            Query::UpdateTopicWeight => {
                return Err(Error::InvalidParameter(format!("{query} needs a mutable dispatch")));
            }
        };
        Ok(result)
    }

    /// Analytics queries resolve both names up front.
    fn person_and_topic(&self, params: &QueryParams) -> Result<(VertexId, VertexId)> {
        let person = self.session.resolve_person(&params.person)?;
        let topic = self.session.resolve_topic(&params.topic)?;
        Ok((person, topic))
    }
}

fn score_of(scores: &hashbrown::HashMap<VertexId, f64>, v: VertexId) -> QueryOutput {
    scores.get(&v).map_or(QueryOutput::NotApplicable, |&s| QueryOutput::Score(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_round_trip() {
        for (i, q) in Query::ALL.iter().enumerate() {
            assert_eq!(q.selector() as usize, i + 1);
            assert_eq!(Query::try_from(q.selector()).unwrap(), *q);
        }
    }

    #[test]
    fn test_unknown_selector() {
        assert!(matches!(Query::try_from(0), Err(Error::UnknownQuery(0))));
        assert!(matches!(Query::try_from(23), Err(Error::UnknownQuery(23))));
    }

    #[test]
    fn test_only_update_writes() {
        let writers: Vec<_> = Query::ALL.iter().filter(|q| q.is_write()).collect();
        assert_eq!(writers, vec![&Query::UpdateTopicWeight]);
    }

    #[test]
    fn test_params_defaults() {
        let p = QueryParams::new("Ada", "science").with_breadth(3);
        assert_eq!(p.level, DEFAULT_LEVEL);
        assert_eq!(p.breadth, 3);
        assert_eq!(p.weight, 0);
    }
}
