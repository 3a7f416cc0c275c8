//! # socialgraph
//!
//! Generates a synthetic social graph, loads it into a `MemoryStore`, runs
//! one catalogue query and writes its export records.
//!
//! ```text
//! socialgraph --config bench.toml --query 13 --person person-0004 --breadth 3
//! socialgraph --list
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use socialgraph::export;
use socialgraph::ingest;
use socialgraph::{
    BenchConfig, GraphStore, MemoryStore, Query, QueryDispatcher, QueryOutput, Session, TxMode,
};

/// Social graph traversal benchmark
#[derive(Parser)]
#[command(name = "socialgraph")]
#[command(about = "Run one traversal or analytics query over a synthetic social graph")]
#[command(version)]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Query selector, 1-22
    #[arg(long)]
    query: Option<u8>,

    /// Person name
    #[arg(long)]
    person: Option<String>,

    /// Topic label
    #[arg(long)]
    topic: Option<String>,

    /// Edge weight, 0-9
    #[arg(long)]
    weight: Option<i64>,

    /// Per-vertex neighbour limit; 0 = unbounded
    #[arg(long)]
    breadth: Option<usize>,

    /// Depth for the n-level walk
    #[arg(long)]
    level: Option<usize>,

    /// Export sink path
    #[arg(long)]
    json_path: Option<PathBuf>,

    /// RNG seed for data generation
    #[arg(long)]
    seed: Option<u64>,

    /// Print the query catalogue and exit
    #[arg(long, default_value_t = false)]
    list: bool,
}

impl Cli {
    fn load_config(&self) -> Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => {
                let mut config = BenchConfig::default();
                config.apply_env_overrides();
                config
            }
        };

        let q = &mut config.query;
        if let Some(v) = self.query {
            q.query = v;
        }
        if let Some(v) = &self.person {
            q.person = v.clone();
        }
        if let Some(v) = &self.topic {
            q.topic = v.clone();
        }
        if let Some(v) = self.weight {
            q.weight = v;
        }
        if let Some(v) = self.breadth {
            q.breadth = v;
        }
        if let Some(v) = self.level {
            q.level = v;
        }
        if let Some(v) = &self.json_path {
            config.export.json_path = v.clone();
        }
        if let Some(v) = self.seed {
            config.graph.seed = v;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list {
        for query in Query::ALL {
            println!("{:>2}  {}", query.selector(), query.description());
        }
        return Ok(());
    }

    let config = cli.load_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let store = MemoryStore::new();
    let (_, report) = ingest::ingest(&store, &config.graph).context("ingesting synthetic graph")?;
    info!(
        people = report.people,
        topics = report.topics,
        knows = report.knows,
        "graph ready"
    );

    let query = Query::try_from(config.query.query)?;
    let params = config.query.to_params();
    let mode = if query.is_write() { TxMode::ReadWrite } else { TxMode::ReadOnly };
    let mut session = Session::open(&store, mode)?;

    let result = QueryDispatcher::new(&mut session)
        .dispatch(query, &params)
        .with_context(|| format!("running {query}"))?;

    println!("{query}");
    print_output(&session, &result.output)?;

    if let Some(records) = &result.export {
        export::write_json_file(records, &config.export.json_path)
            .with_context(|| format!("writing {}", config.export.json_path.display()))?;
    }

    if query.is_write() {
        session.commit()?;
    } else {
        session.rollback()?;
    }
    Ok(())
}

fn print_output<S: GraphStore>(session: &Session<'_, S>, output: &QueryOutput) -> Result<()> {
    match output {
        QueryOutput::Vertices(vs) => {
            for name in session.labels(vs)? {
                println!("{name}");
            }
        }
        QueryOutput::VertexSets(sets) => {
            for set in sets {
                println!("{}", session.labels(set)?.join(", "));
            }
        }
        QueryOutput::Grouped(rows) => {
            for (v, groups) in rows {
                println!("{}: {}", session.label(*v)?, session.labels(groups)?.join(", "));
            }
        }
        QueryOutput::Count(n) => println!("{n}"),
        QueryOutput::Score(s) => println!("{s:.6}"),
        QueryOutput::Paths(paths) => {
            for path in paths {
                println!("{} (cost {})", session.labels(&path.vertices)?.join(" -> "), path.cost);
            }
        }
        QueryOutput::Unit => {}
        QueryOutput::NotApplicable => println!("not applicable"),
    }
    Ok(())
}
