//! Run configuration: graph shape, query selection and export sink.
//!
//! Loaded from TOML, then overridden from `SOCIALGRAPH_*` environment
//! variables, then validated.
//!
//! ```toml
//! log_level = "info"
//!
//! [graph]
//! people = 1000
//! topics = 50
//! seed = 7
//!
//! [query]
//! query = 4
//! person = "person-0001"
//! topic = "topic-001"
//!
//! [export]
//! json_path = "flare.json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::query::{QueryParams, DEFAULT_LEVEL};
use crate::{Error, Result};

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "SOCIALGRAPH_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub log_level: String,
    pub graph: GraphConfig,
    pub query: QueryConfig,
    pub export: ExportConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            graph: GraphConfig::default(),
            query: QueryConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

// ============================================================================
// Sections
// ============================================================================

/// Shape of the synthetic graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub people: usize,
    pub topics: usize,
    pub groups: usize,
    pub documents: usize,
    pub topics_per_person: usize,
    pub people_per_person: usize,
    pub authors_per_document: usize,
    pub viewers_per_document: usize,
    pub topics_per_document: usize,
    pub seed: u64,
    /// One name per line. Synthesized when unset.
    pub names_path: Option<PathBuf>,
    pub topics_path: Option<PathBuf>,
    pub groups_path: Option<PathBuf>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            people: default_people(),
            topics: default_topics(),
            groups: default_groups(),
            documents: default_documents(),
            topics_per_person: default_topics_per_person(),
            people_per_person: default_people_per_person(),
            authors_per_document: 2,
            viewers_per_document: 5,
            topics_per_document: 2,
            seed: default_seed(),
            names_path: None,
            topics_path: None,
            groups_path: None,
        }
    }
}

fn default_people() -> usize {
    1000
}
fn default_topics() -> usize {
    50
}
fn default_groups() -> usize {
    20
}
fn default_documents() -> usize {
    200
}
fn default_topics_per_person() -> usize {
    3
}
fn default_people_per_person() -> usize {
    10
}
fn default_seed() -> u64 {
    42
}

/// Which query to run and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Selector, 1-22.
    pub query: u8,
    pub person: String,
    pub topic: String,
    pub weight: i64,
    /// 0 = unbounded.
    pub breadth: usize,
    pub level: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            query: 1,
            person: "person-0000".to_string(),
            topic: "topic-000".to_string(),
            weight: 0,
            breadth: 0,
            level: DEFAULT_LEVEL,
        }
    }
}

impl QueryConfig {
    pub fn to_params(&self) -> QueryParams {
        QueryParams::new(self.person.clone(), self.topic.clone())
            .with_weight(self.weight)
            .with_breadth(self.breadth)
            .with_level(self.level)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub json_path: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { json_path: PathBuf::from("export.json") }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl BenchConfig {
    /// Read, parse, apply environment overrides and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut config = Self::parse_toml(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse without overrides or validation.
    pub fn parse_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any `SOCIALGRAPH_*` lookup. Unparsable values
    /// are logged and ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = get("LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = get("QUERY") {
            parse_into(&mut self.query.query, "QUERY", &v);
        }
        if let Some(v) = get("PERSON") {
            self.query.person = v;
        }
        if let Some(v) = get("TOPIC") {
            self.query.topic = v;
        }
        if let Some(v) = get("WEIGHT") {
            parse_into(&mut self.query.weight, "WEIGHT", &v);
        }
        if let Some(v) = get("BREADTH") {
            parse_into(&mut self.query.breadth, "BREADTH", &v);
        }
        if let Some(v) = get("LEVEL") {
            parse_into(&mut self.query.level, "LEVEL", &v);
        }
        if let Some(v) = get("JSON_PATH") {
            self.export.json_path = PathBuf::from(v);
        }
        if let Some(v) = get("SEED") {
            parse_into(&mut self.graph.seed, "SEED", &v);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(Error::Config(format!(
                "log_level must be one of: {} (got '{}')",
                LOG_LEVELS.join(", "),
                self.log_level
            )));
        }

        let g = &self.graph;
        if g.people == 0 || g.topics == 0 || g.groups == 0 {
            return Err(Error::Config(format!(
                "graph.people, graph.topics and graph.groups must be > 0 (got {}, {}, {})",
                g.people, g.topics, g.groups
            )));
        }
        if g.topics_per_person == 0 || g.topics_per_person > g.topics {
            return Err(Error::Config(format!(
                "graph.topics_per_person must be in 1..={} (got {})",
                g.topics, g.topics_per_person
            )));
        }
        if g.people_per_person >= g.people {
            return Err(Error::Config(format!(
                "graph.people_per_person must be < graph.people ({}) (got {})",
                g.people, g.people_per_person
            )));
        }
        if g.documents > 0 && (g.topics_per_document > g.topics || g.authors_per_document > g.people) {
            return Err(Error::Config(
                "graph.topics_per_document and graph.authors_per_document cannot exceed topics / people".into(),
            ));
        }

        let q = &self.query;
        if !(1..=22).contains(&q.query) {
            return Err(Error::Config(format!("query.query must be in 1..=22 (got {})", q.query)));
        }
        if !(0..=9).contains(&q.weight) {
            return Err(Error::Config(format!("query.weight must be in 0..=9 (got {})", q.weight)));
        }
        Ok(())
    }
}

fn parse_into<T: std::str::FromStr>(slot: &mut T, name: &str, raw: &str) {
    match raw.parse() {
        Ok(v) => *slot = v,
        Err(_) => warn!(prefix = ENV_PREFIX, var = name, value = raw, "ignoring unparsable override"),
    }
}
