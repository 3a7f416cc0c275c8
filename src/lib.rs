//! # socialgraph: bounded-walk queries over a social property graph
//!
//! Ingests a synthetic graph of people, topics, groups and documents and
//! answers a fixed catalogue of traversal and analytics queries against it.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphStore` is the contract between the query engine and storage
//! 2. **Arena ids**: `VertexId` / `EdgeId` are stable indices, never reused
//! 3. **Explicit context**: a `Session` carries the transaction and the identifier indexes
//! 4. **Closed kinds**: vertex and relation categories are enums, never strings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use socialgraph::{GraphStore, MemoryStore, Query, QueryDispatcher, QueryParams, Session, TxMode};
//! use socialgraph::ingest::GraphBuilder;
//!
//! # fn example() -> socialgraph::Result<()> {
//! let store = MemoryStore::new();
//! let mut tx = store.begin_tx(TxMode::ReadWrite)?;
//! {
//!     let mut g = GraphBuilder::new(&store, &mut tx)?;
//!     let ada = g.person("Ada")?;
//!     let bob = g.person("Bob")?;
//!     g.topic("science")?;
//!     g.knows(ada, bob, "science", 4)?;
//! }
//! store.commit_tx(tx)?;
//!
//! let mut session = Session::open(&store, TxMode::ReadOnly)?;
//! let params = QueryParams::new("Ada", "science");
//! let result = QueryDispatcher::new(&mut session).dispatch(Query::KnowsOnTopic, &params)?;
//! println!("{:?}", result.output);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `model` | Vertex, edge, property and path types |
//! | `storage` | `GraphStore` trait + in-memory arena store |
//! | `index` | Name/label → vertex identifier indexes |
//! | `session` | Per-query context: transaction + indexes |
//! | `traversal` | Bounded-walk algorithm family |
//! | `query` | Query catalogue and dispatcher |
//! | `export` | Subgraph export records + JSON sink |
//! | `analytics` | Shortest path / centrality via rustworkx-core |
//! | `ingest` | Synthetic data generation and loading |
//! | `config` | TOML configuration with environment overrides |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod tx;
pub mod index;
pub mod session;
pub mod traversal;
pub mod query;
pub mod export;
pub mod analytics;
pub mod ingest;
pub mod config;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Vertex, VertexId, VertexKind, ContainerKind,
    Edge, EdgeId, RelKind, Direction,
    GraphPath, Value, PropertyMap,
};

// ============================================================================
// Re-exports: Storage + Transactions
// ============================================================================

pub use storage::{GraphStore, MemoryStore, StoreStats};
pub use tx::{Transaction, TxMode, TxId};

// ============================================================================
// Re-exports: Engine
// ============================================================================

pub use index::{IdentifierIndex, KeyDomain};
pub use session::Session;
pub use traversal::Traversal;
pub use query::{Query, QueryParams, QueryOutput, DispatchResult, QueryDispatcher};
pub use export::{ExportRecord, SubgraphExporter};
pub use analytics::{Subgraph, ShortestPathAlgorithm, CentralityKind};
pub use config::BenchConfig;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown {domain}: '{key}'")]
    KeyNotFound { domain: KeyDomain, key: String },

    #[error("Container vertex '{0}' is missing")]
    MissingContainer(ContainerKind),

    #[error("Edge {edge} has no usable '{key}' property")]
    PropertyMismatch { edge: EdgeId, key: String },

    #[error("Unknown query selector {0} (expected 1-22)")]
    UnknownQuery(u8),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Transaction error: {0}")]
    TxError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Analytics error: {0}")]
    AnalyticsError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
