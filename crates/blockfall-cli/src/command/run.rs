use std::path::PathBuf;

use anyhow::Context;
use blockfall_engine::{EngineConfig, GameEngine, PieceSeed, Snapshot};
use chrono::Utc;
use rand::Rng as _;
use tracing::info;

use crate::{
    schema::record::Recording,
    script::Script,
    util::{self, SnapshotFormat},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct RunArg {
    /// Command script: `L` `R` `D` `U` move and rotate, `H` hard drops, `S` spawns (`St` a T)
    #[clap(long)]
    script: String,
    /// Engine configuration file (JSON format)
    #[clap(long)]
    config: Option<PathBuf>,
    /// Board width in cells
    #[clap(long)]
    width: Option<usize>,
    /// Board height in cells
    #[clap(long)]
    height: Option<usize>,
    /// Spawn column (defaults to three cells left of the center)
    #[clap(long)]
    spawn_x: Option<i32>,
    /// Spawn row
    #[clap(long)]
    spawn_y: Option<i32>,
    /// Piece generator seed (random if omitted)
    #[clap(long)]
    seed: Option<u64>,
    /// Save the session as a recording for `replay`
    #[clap(long)]
    record: Option<PathBuf>,
    /// Write the final snapshot to a file instead of stdout
    #[clap(long)]
    output: Option<PathBuf>,
    /// Print the final board as text instead of JSON
    #[clap(long, default_value_t = false)]
    text: bool,
}

pub(crate) fn run(arg: &RunArg) -> anyhow::Result<()> {
    let RunArg {
        script,
        config,
        width,
        height,
        spawn_x,
        spawn_y,
        seed,
        record,
        output,
        text,
    } = arg;

    let mut config: EngineConfig = match config {
        Some(path) => util::read_json_file("config", path)?,
        None => EngineConfig::default(),
    };
    if let Some(width) = width {
        config.board_width = *width;
    }
    if let Some(height) = height {
        config.board_height = *height;
    }
    if spawn_x.is_some() {
        config.spawn_x = *spawn_x;
    }
    if let Some(spawn_y) = spawn_y {
        config.spawn_y = *spawn_y;
    }
    if let Some(seed) = seed {
        config.seed = Some(PieceSeed::new(*seed));
    }
    let seed = *config.seed.get_or_insert_with(|| rand::rng().random());
    info!(seed = %format!("{:016x}", seed.value()), "starting session");

    let final_snapshot = play_script(&config, script)?;
    info!(
        score = final_snapshot.score,
        pieces = final_snapshot.piece_count,
        rows = final_snapshot.cleared_rows,
        phase = ?final_snapshot.phase,
        "session finished"
    );

    let format = if *text {
        SnapshotFormat::Text
    } else {
        SnapshotFormat::Json
    };
    util::write_snapshot(&final_snapshot, format, output.as_deref())?;

    if let Some(path) = record {
        let recording = Recording {
            recorded_at: Utc::now(),
            config,
            script: script.clone(),
            final_snapshot,
        };
        util::save_recording(&recording, path)?;
        info!(path = %path.display(), "recording saved");
    }

    Ok(())
}

/// Runs `script` against a fresh engine built from `config`.
pub(crate) fn play_script(config: &EngineConfig, script: &str) -> anyhow::Result<Snapshot> {
    let script: Script = script.parse().context("Failed to parse command script")?;
    let mut engine = GameEngine::from_config(config).context("Invalid engine configuration")?;
    script.play(&mut engine);
    Ok(engine.snapshot())
}

#[cfg(test)]
mod tests {
    use blockfall_engine::Phase;

    use super::*;

    fn config() -> EngineConfig {
        EngineConfig {
            board_width: 10,
            board_height: 16,
            seed: Some(PieceSeed::new(0xb10c)),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_play_script_is_deterministic() {
        let script = "HLLHRRRHUHSiHUUD";
        let a = play_script(&config(), script).unwrap();
        let b = play_script(&config(), script).unwrap();
        assert_eq!(a, b);
        assert!(a.piece_count >= 5);
    }

    #[test]
    fn test_play_script_reports_final_phase() {
        let snapshot = play_script(&config(), "SoH").unwrap();
        assert_eq!(snapshot.phase, Phase::Spawning);
        assert_eq!(snapshot.piece_count, 1);
        assert!(snapshot.active.is_none());
    }

    #[test]
    fn test_play_script_rejects_bad_input() {
        assert!(play_script(&config(), "LQ").is_err());

        let narrow = EngineConfig {
            board_width: 0,
            ..config()
        };
        assert!(play_script(&narrow, "H").is_err());
    }
}
