use blockfall_engine::{EngineConfig, Snapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scripted session together with the state it ended in.
///
/// The config always carries a concrete seed, so replaying the script
/// against it reproduces `final_snapshot` exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Timestamp when recording was created (ISO 8601 format)
    pub recorded_at: DateTime<Utc>,
    pub config: EngineConfig,
    /// Command script as given on the command line
    pub script: String,
    pub final_snapshot: Snapshot,
}
