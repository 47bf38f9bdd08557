use std::path::PathBuf;

use anyhow::bail;
use tracing::info;

use crate::{command::run::play_script, schema::record::Recording, util};

#[derive(Debug, Clone, clap::Args)]
pub struct ReplayArg {
    /// Path to the recording file (JSON format)
    recording_file: PathBuf,
}

pub fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg { recording_file } = arg;

    info!(path = %recording_file.display(), "loading recording");
    let recording: Recording = util::read_json_file("recording", recording_file)?;
    info!(recorded_at = %recording.recorded_at, script = %recording.script, "replaying");

    verify(&recording)?;
    info!(score = recording.final_snapshot.score, "replay matches recording");
    Ok(())
}

/// Re-runs the recorded script and checks it ends in the recorded state.
fn verify(recording: &Recording) -> anyhow::Result<()> {
    let Recording {
        config,
        script,
        final_snapshot,
        ..
    } = recording;

    if config.seed.is_none() {
        bail!("recording has no seed, so it cannot be replayed");
    }
    let replayed = play_script(config, script)?;
    if replayed != *final_snapshot {
        bail!(
            "replay diverged: recorded score {} after {} pieces, replayed score {} after {} pieces",
            final_snapshot.score,
            final_snapshot.piece_count,
            replayed.score,
            replayed.piece_count
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{EngineConfig, PieceSeed};
    use chrono::Utc;

    use super::*;

    fn recording(script: &str) -> Recording {
        let config = EngineConfig {
            board_width: 8,
            board_height: 12,
            seed: Some(PieceSeed::new(77)),
            ..EngineConfig::default()
        };
        let final_snapshot = play_script(&config, script).unwrap();
        Recording {
            recorded_at: Utc::now(),
            config,
            script: script.to_owned(),
            final_snapshot,
        }
    }

    #[test]
    fn test_verify_accepts_faithful_recording() {
        let recording = recording("HLHRRHUUH");
        verify(&recording).unwrap();

        let json = serde_json::to_string(&recording).unwrap();
        let loaded: Recording = serde_json::from_str(&json).unwrap();
        verify(&loaded).unwrap();
    }

    #[test]
    fn test_verify_detects_divergence() {
        let mut recording = recording("HLHRRH");
        recording.script.push('H');
        assert!(verify(&recording).is_err());
    }

    #[test]
    fn test_verify_needs_seed() {
        let mut recording = recording("H");
        recording.config.seed = None;
        assert!(verify(&recording).is_err());
    }
}
