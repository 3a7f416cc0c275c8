//! Subgraph export: serialize a walk as `{name, size, imports}` records.
//!
//! The record list is consumed by hierarchical-edge-bundling views that
//! key on `name` and draw one link per entry in `imports`.
//!
//! ```text
//! root + walk result → SubgraphExporter → Vec<ExportRecord> → write_json()
//! ```
//!
//! The root record is always first. Flare exports encode each name as
//! `flare,<group>,<label>`, which consumers split positionally.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::VertexId;
use crate::session::Session;
use crate::storage::GraphStore;
use crate::Result;

/// Category tag leading every flare name.
pub const FLARE_TAG: &str = "flare";
/// Separator between the flare name segments.
pub const FLARE_DELIMITER: char = ',';
/// `size` of the root record in a flare export.
pub const FLARE_ROOT_SIZE: u32 = 3500;
/// `size` of each first-hop record in a flare export.
pub const FLARE_FRIEND_SIZE: u32 = 5500;

/// One exported entity and the names it links to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub name: String,
    pub size: u32,
    #[serde(rename = "imports")]
    pub neighbors: Vec<String>,
}

impl ExportRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), size: 0, neighbors: Vec::new() }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }
}

/// Builds export records against a session's labels and group memberships.
pub struct SubgraphExporter<'a, 's, S: GraphStore> {
    session: &'a Session<'s, S>,
}

impl<'a, 's, S: GraphStore> SubgraphExporter<'a, 's, S> {
    pub fn new(session: &'a Session<'s, S>) -> Self {
        Self { session }
    }

    /// Root lists every neighbour; each neighbour gets an empty record.
    pub fn neighbors(&self, root: VertexId, neighbors: &[VertexId]) -> Result<Vec<ExportRecord>> {
        let mut head = ExportRecord::new(self.session.label(root)?);
        let mut records = Vec::with_capacity(neighbors.len() + 1);
        for &n in neighbors {
            let name = self.session.label(n)?;
            head.neighbors.push(name.clone());
            records.push(ExportRecord::new(name));
        }
        records.insert(0, head);
        Ok(records)
    }

    /// Root lists the first level; each first-level record lists its own
    /// second-level names.
    pub fn two_level(&self, root: VertexId, levels: &[(VertexId, Vec<VertexId>)]) -> Result<Vec<ExportRecord>> {
        let mut head = ExportRecord::new(self.session.label(root)?);
        let mut records = Vec::with_capacity(levels.len() + 1);
        for (friend, second) in levels {
            let mut record = ExportRecord::new(self.session.label(*friend)?);
            record.neighbors = self.session.labels(second)?;
            head.neighbors.push(record.name.clone());
            records.push(record);
        }
        records.insert(0, head);
        Ok(records)
    }

    /// `two_level` with flare names and sizes.
    pub fn flare(&self, root: VertexId, levels: &[(VertexId, Vec<VertexId>)]) -> Result<Vec<ExportRecord>> {
        let mut head = ExportRecord::new(self.flare_name(root)?).with_size(FLARE_ROOT_SIZE);
        let mut records = Vec::with_capacity(levels.len() + 1);
        for (friend, second) in levels {
            let mut record = ExportRecord::new(self.flare_name(*friend)?).with_size(FLARE_FRIEND_SIZE);
            for &stranger in second {
                record.neighbors.push(self.flare_name(stranger)?);
            }
            head.neighbors.push(record.name.clone());
            records.push(record);
        }
        records.insert(0, head);
        Ok(records)
    }

    /// `flare,<group>,<label>`; the group is the last `IsMemberOf` target
    /// in edge order, empty when there is none.
    pub fn flare_name(&self, v: VertexId) -> Result<String> {
        let group = match self.session.traversal().groups_of(v)?.last() {
            Some(&g) => self.session.label(g)?,
            None => String::new(),
        };
        let label = self.session.label(v)?;
        Ok(format!("{FLARE_TAG}{FLARE_DELIMITER}{group}{FLARE_DELIMITER}{label}"))
    }
}

// ============================================================================
// Sink
// ============================================================================

/// Serialize records as one JSON array.
pub fn write_json(records: &[ExportRecord], writer: &mut dyn Write) -> Result<()> {
    serde_json::to_writer(&mut *writer, records)?;
    writer.flush()?;
    Ok(())
}

/// Write records to `path`, replacing any existing file.
pub fn write_json_file(records: &[ExportRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(records, &mut writer)?;
    info!(path = %path.display(), records = records.len(), "export written");
    Ok(())
}

/// Read back a record array (for tooling and tests).
pub fn read_json(reader: impl std::io::Read) -> Result<Vec<ExportRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::GraphBuilder;
    use crate::storage::MemoryStore;
    use crate::tx::TxMode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_json_shape() {
        let mut record = ExportRecord::new("Ada");
        record.neighbors.push("Bob".into());
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"name":"Ada","size":0,"imports":["Bob"]}"#);
    }

    #[test]
    fn test_flare_names() {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).unwrap();
        let (ada, bob) = {
            let mut g = GraphBuilder::new(&db, &mut tx).unwrap();
            let ada = g.person("Ada").unwrap();
            let bob = g.person("Bob").unwrap();
            let chess = g.group("chess").unwrap();
            let go = g.group("go").unwrap();
            g.member_of(ada, chess).unwrap();
            g.member_of(ada, go).unwrap();
            (ada, bob)
        };
        let session = Session::with_tx(&db, tx);
        let exporter = SubgraphExporter::new(&session);
        assert_eq!(exporter.flare_name(ada).unwrap(), "flare,go,Ada");
        assert_eq!(exporter.flare_name(bob).unwrap(), "flare,,Bob");
    }

    #[test]
    fn test_write_json_array() {
        let records = vec![ExportRecord::new("a"), ExportRecord::new("b").with_size(7)];
        let mut buf = Vec::new();
        write_json(&records, &mut buf).unwrap();
        assert_eq!(read_json(buf.as_slice()).unwrap(), records);
    }
}
