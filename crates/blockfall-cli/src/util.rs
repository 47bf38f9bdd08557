use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write as _},
    path::Path,
};

use anyhow::Context;
use blockfall_engine::Snapshot;

use crate::schema::record::Recording;

/// How `run` prints the final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    /// The snapshot's text grid.
    Text,
}

impl SnapshotFormat {
    fn render(self, snapshot: &Snapshot) -> anyhow::Result<String> {
        match self {
            SnapshotFormat::Json => {
                serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")
            }
            SnapshotFormat::Text => Ok(snapshot.to_string()),
        }
    }
}

/// Writes the snapshot to `path`, or to stdout when no path is given.
pub fn write_snapshot(
    snapshot: &Snapshot,
    format: SnapshotFormat,
    path: Option<&Path>,
) -> anyhow::Result<()> {
    let rendered = format.render(snapshot)?;
    match path {
        Some(path) => {
            let mut writer = create_file("snapshot", path)?;
            writeln!(writer, "{rendered}")
                .and_then(|()| writer.flush())
                .with_context(|| format!("Failed to write snapshot to {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{rendered}").context("Failed to write snapshot to stdout")
        }
    }
}

pub fn save_recording(recording: &Recording, path: &Path) -> anyhow::Result<()> {
    let mut writer = create_file("recording", path)?;
    serde_json::to_writer_pretty(&mut writer, recording)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush output to {}", path.display()))
}

fn create_file(file_kind: &str, path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {} file: {}", file_kind, path.display()))?;
    Ok(BufWriter::new(file))
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    serde_json::from_reader(BufReader::new(file)).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })
}
