//! # Ingestion
//!
//! Synthetic social graph generation and loading.
//!
//! ```text
//! GraphConfig ─→ SyntheticData::generate ─→ load(store) ─→ LoadReport
//!                (names, friends, topics)    (containers, vertices, edges)
//! ```
//!
//! Load order: topics, groups, people with two group memberships each,
//! `Knows` edges, `AssociatedTo` edges, then documents with their
//! authors, viewers and topics. All randomness comes from the caller's
//! RNG, so a seeded `StdRng` reproduces a graph exactly.

pub mod builder;

pub use builder::GraphBuilder;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::config::GraphConfig;
use crate::model::{PropertyMap, RelKind, VertexId};
use crate::storage::{GraphStore, StoreStats};
use crate::tx::TxMode;
use crate::{Error, Result};

/// Exclusive upper bound of generated edge weights.
pub const WEIGHT_RANGE: i64 = 10;
/// Group memberships per person.
pub const GROUPS_PER_PERSON: usize = 2;

/// One person row: friends and topics as indexes into the name and topic
/// lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRow {
    pub name: usize,
    pub friends: Vec<usize>,
    pub topics: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
    pub label: String,
    pub authors: Vec<usize>,
    pub viewers: Vec<usize>,
    pub topics: Vec<usize>,
}

/// Everything needed to build a graph, before any store is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticData {
    pub names: Vec<String>,
    pub topics: Vec<String>,
    pub groups: Vec<String>,
    pub people: Vec<PersonRow>,
    pub documents: Vec<DocumentRow>,
}

/// Counts of what `load` created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub people: usize,
    pub topics: usize,
    pub groups: usize,
    pub documents: usize,
    pub knows: usize,
    pub associations: usize,
    pub memberships: usize,
    pub store: StoreStats,
}

// ============================================================================
// Generation
// ============================================================================

impl SyntheticData {
    pub fn generate(config: &GraphConfig, rng: &mut impl Rng) -> Result<Self> {
        let names = word_list(config.names_path.as_deref(), config.people, "person", 4)?;
        let topics = word_list(config.topics_path.as_deref(), config.topics, "topic", 3)?;
        let groups = word_list(config.groups_path.as_deref(), config.groups, "group", 2)?;

        if config.people_per_person >= names.len().max(1) {
            return Err(Error::Config(format!(
                "cannot pick {} distinct friends among {} people",
                config.people_per_person,
                names.len()
            )));
        }
        if config.people_per_person > 0 && config.topics_per_person == 0 {
            return Err(Error::Config("people with friends need at least one topic".into()));
        }
        if config.topics_per_person > topics.len() || config.topics_per_document > topics.len() {
            return Err(Error::Config(format!(
                "cannot pick {} distinct topics among {}",
                config.topics_per_person.max(config.topics_per_document),
                topics.len()
            )));
        }
        if config.documents > 0 && config.authors_per_document > names.len() {
            return Err(Error::Config(format!(
                "cannot pick {} distinct authors among {} people",
                config.authors_per_document,
                names.len()
            )));
        }

        let people = (0..names.len())
            .map(|i| PersonRow {
                name: i,
                friends: distinct_excluding(rng, names.len(), config.people_per_person, i),
                topics: index::sample(rng, topics.len(), config.topics_per_person).into_vec(),
            })
            .collect();

        let viewers = config.viewers_per_document.min(names.len());
        let documents = (0..config.documents)
            .map(|i| DocumentRow {
                label: format!("document-{i:04}"),
                authors: index::sample(rng, names.len(), config.authors_per_document).into_vec(),
                viewers: index::sample(rng, names.len(), viewers).into_vec(),
                topics: index::sample(rng, topics.len(), config.topics_per_document).into_vec(),
            })
            .collect();

        Ok(Self { names, topics, groups, people, documents })
    }

    pub fn person_name(&self, row: &PersonRow) -> &str {
        &self.names[row.name]
    }
}

/// `amount` distinct indexes in `0..len`, never `exclude`.
fn distinct_excluding(rng: &mut impl Rng, len: usize, amount: usize, exclude: usize) -> Vec<usize> {
    index::sample(rng, len - 1, amount)
        .into_iter()
        .map(|i| if i >= exclude { i + 1 } else { i })
        .collect()
}

/// First `count` non-empty lines of `path`, or `prefix-NNN` names.
fn word_list(path: Option<&Path>, count: usize, prefix: &str, width: usize) -> Result<Vec<String>> {
    let Some(path) = path else {
        return Ok((0..count).map(|i| format!("{prefix}-{i:0width$}")).collect());
    };
    let file = File::open(path).map_err(|e| Error::Config(format!("cannot open {}: {e}", path.display())))?;
    let mut words = Vec::with_capacity(count);
    for line in BufReader::new(file).lines() {
        if words.len() == count {
            break;
        }
        let line = line?;
        let word = line.trim();
        if !word.is_empty() {
            words.push(word.to_string());
        }
    }
    if words.len() < count {
        return Err(Error::Config(format!(
            "{} has {} entries, {count} requested",
            path.display(),
            words.len()
        )));
    }
    Ok(words)
}

// ============================================================================
// Loading
// ============================================================================

/// Write `data` into `store` in one `ReadWrite` transaction.
///
/// The store must be empty of containers; `GraphBuilder` registers them.
pub fn load<S: GraphStore>(store: &S, data: &SyntheticData, rng: &mut impl Rng) -> Result<LoadReport> {
    let started = Instant::now();
    let mut tx = store.begin_tx(TxMode::ReadWrite)?;
    let mut report = LoadReport::default();
    {
        let mut g = GraphBuilder::new(store, &mut tx)?;

        let topics = data.topics.iter().map(|t| g.topic(t)).collect::<Result<Vec<VertexId>>>()?;
        report.topics = topics.len();
        let groups = data.groups.iter().map(|n| g.group(n)).collect::<Result<Vec<VertexId>>>()?;
        report.groups = groups.len();
        info!(topics = report.topics, groups = report.groups, "topics and groups loaded");

        let people = data.names.iter().map(|n| g.person(n)).collect::<Result<Vec<VertexId>>>()?;
        report.people = people.len();
        for &person in people.iter().filter(|_| !groups.is_empty()) {
            for _ in 0..GROUPS_PER_PERSON {
                g.member_of(person, groups[rng.gen_range(0..groups.len())])?;
                report.memberships += 1;
            }
        }
        info!(people = report.people, memberships = report.memberships, "people loaded");

        for row in &data.people {
            for (i, &friend) in row.friends.iter().enumerate() {
                let topic = &data.topics[row.topics[i % row.topics.len()]];
                g.knows(people[row.name], people[friend], topic, rng.gen_range(0..WEIGHT_RANGE))?;
                report.knows += 1;
            }
        }
        for row in &data.people {
            for &topic in &row.topics {
                let weight = rng.gen_range(0..WEIGHT_RANGE);
                let cost: f64 = rng.gen();
                g.associate(people[row.name], topics[topic], weight, cost)?;
                report.associations += 1;
            }
        }
        info!(knows = report.knows, associations = report.associations, "relations loaded");

        for doc in &data.documents {
            let d = g.document(&doc.label)?;
            for &a in &doc.authors {
                g.relate(people[a], d, RelKind::Authors, PropertyMap::new())?;
            }
            for &v in &doc.viewers {
                g.relate(people[v], d, RelKind::Views, PropertyMap::new())?;
            }
            for &t in &doc.topics {
                g.relate(d, topics[t], RelKind::Has, PropertyMap::new())?;
            }
        }
        report.documents = data.documents.len();
    }
    report.store = store.stats(&tx)?;
    store.commit_tx(tx)?;

    info!(
        vertices = report.store.vertices,
        edges = report.store.edges,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "ingest complete"
    );
    Ok(report)
}

/// Generate from `config` with a `StdRng` seeded by `config.seed`, then load.
pub fn ingest<S: GraphStore>(store: &S, config: &GraphConfig) -> Result<(SyntheticData, LoadReport)> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let data = SyntheticData::generate(config, &mut rng)?;
    let report = load(store, &data, &mut rng)?;
    Ok((data, report))
}
