use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use bevy_ecs::world::World;
use serde::Serialize;

use crate::ecs::components::{CharacterMetrics, SimEntity};
use crate::ecs::resources::{EntityRegistry, EventLog};

/// Write an iterator of serializable items as JSONL (one JSON object per line).
fn write_jsonl<T: Serialize>(file: File, items: impl Iterator<Item = T>) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Append the log's records to `events.jsonl` in `output_dir`, then clear the
/// log. Creates the directory if it does not exist.
///
/// Repeated flushes append, so the file holds the whole run in id order.
pub fn flush_to_jsonl(log: &mut EventLog, output_dir: &Path) -> io::Result<usize> {
    fs::create_dir_all(output_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(output_dir.join("events.jsonl"))?;
    let written = log.records.len();
    write_jsonl(file, log.records.iter())?;
    log.clear();
    tracing::debug!(written, dir = %output_dir.display(), "event log flushed");
    Ok(written)
}

#[derive(Serialize)]
struct MetricsRow<'a> {
    id: u64,
    name: &'a str,
    #[serde(flatten)]
    metrics: &'a CharacterMetrics,
}

/// Snapshot every character's metrics to `metrics.jsonl`, replacing any
/// previous snapshot. Rows follow entity creation order.
pub fn write_metrics_jsonl(world: &World, output_dir: &Path) -> io::Result<usize> {
    fs::create_dir_all(output_dir)?;
    let order = world
        .get_resource::<EntityRegistry>()
        .map(|r| r.order())
        .unwrap_or(&[]);
    let rows: Vec<MetricsRow<'_>> = order
        .iter()
        .filter_map(|e| {
            let identity = world.get::<SimEntity>(*e)?;
            let metrics = world.get::<CharacterMetrics>(*e)?;
            Some(MetricsRow {
                id: identity.id,
                name: &identity.name,
                metrics,
            })
        })
        .collect();
    let count = rows.len();
    write_jsonl(File::create(output_dir.join("metrics.jsonl"))?, rows.into_iter())?;
    Ok(count)
}
