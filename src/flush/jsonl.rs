use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::model::{GraphMetadata, SimEvent, WorldState};

/// Graph-level state that belongs to no node or edge.
#[derive(Serialize)]
struct MetadataRecord<'a> {
    tick: u64,
    metadata: &'a GraphMetadata,
}

/// Write an iterator of serializable items to a JSONL file (one JSON object per line).
fn write_jsonl<T: Serialize>(path: &Path, items: impl Iterator<Item = T>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Flush a world snapshot and an event log to JSONL files in `output_dir`.
///
/// Creates the output directory if it does not exist. Writes 4 files:
/// - `nodes.jsonl`: one node per line, tagged with `node_type`
/// - `edges.jsonl`: one edge per line, endpoints by node id
/// - `events.jsonl`: one event per line in publication order
/// - `metadata.jsonl`: a single line with the tick and graph metadata
///   (economy, crisis counters, terminal outcome)
pub fn flush_to_jsonl(
    world: &WorldState,
    events: &[SimEvent],
    output_dir: &Path,
) -> io::Result<()> {
    fs::create_dir_all(output_dir)?;

    write_jsonl(&output_dir.join("nodes.jsonl"), world.nodes.iter())?;
    write_jsonl(&output_dir.join("edges.jsonl"), world.edges.iter())?;
    write_jsonl(&output_dir.join("events.jsonl"), events.iter())?;
    let record = MetadataRecord {
        tick: world.tick,
        metadata: &world.metadata,
    };
    write_jsonl(&output_dir.join("metadata.jsonl"), std::iter::once(record))?;

    Ok(())
}
