//! Command scripts for headless sessions.
//!
//! A script is a string of single-letter steps:
//!
//! - `L`, `R`, `D`, `U` - move left, right, down, rotate
//! - `H` - hard drop
//! - `S` - spawn a random piece; `S` followed by a lowercase kind letter
//!   (`St`, `Si`, ...) spawns that kind
//!
//! Whitespace between steps is ignored, but the kind letter must follow its
//! `S` directly: `S t` is a random spawn followed by an unknown step. A
//! movement step that arrives while the engine waits for a spawn draws a
//! random piece first.

use std::{fmt, str::FromStr};

use blockfall_engine::{Command, GameEngine, PieceKind, SpawnOutcome};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Command(Command),
    HardDrop,
    Spawn(Option<PieceKind>),
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ScriptError {
    #[display("unknown script step {ch:?} at position {index}")]
    UnknownStep { ch: char, index: usize },
    #[display("unknown piece kind {ch:?} at position {index}")]
    UnknownKind { ch: char, index: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    steps: Vec<Step>,
}

impl FromStr for Script {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut steps = vec![];
        let mut chars = s.char_indices().peekable();
        while let Some((index, ch)) = chars.next() {
            if ch.is_whitespace() {
                continue;
            }
            let step = match ch {
                'H' => Step::HardDrop,
                'S' => match chars.next_if(|(_, next)| next.is_ascii_lowercase()) {
                    Some((index, kind)) => {
                        let kind = PieceKind::from_char(kind.to_ascii_uppercase())
                            .ok_or(ScriptError::UnknownKind { ch: kind, index })?;
                        Step::Spawn(Some(kind))
                    }
                    None => Step::Spawn(None),
                },
                _ => Step::Command(
                    Command::from_char(ch).ok_or(ScriptError::UnknownStep { ch, index })?,
                ),
            };
            steps.push(step);
        }
        Ok(Self { steps })
    }
}

/// Writes the script back in its canonical form.
impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            match step {
                Step::Command(command) => write!(f, "{}", command.as_char())?,
                Step::HardDrop => f.write_str("H")?,
                Step::Spawn(None) => f.write_str("S")?,
                Step::Spawn(Some(kind)) => write!(f, "S{}", kind.as_char().to_ascii_lowercase())?,
            }
        }
        Ok(())
    }
}

impl Script {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Feeds every step to `engine`, stopping early once the game is over.
    ///
    /// Returns the number of steps applied.
    pub fn play(&self, engine: &mut GameEngine) -> usize {
        for (applied, step) in self.steps().iter().enumerate() {
            if engine.phase().is_game_over() {
                info!(applied, total = self.steps.len(), "game over, rest of script skipped");
                return applied;
            }
            match *step {
                Step::Spawn(kind) => {
                    let outcome = engine.spawn(kind);
                    if outcome == SpawnOutcome::AlreadyFalling {
                        debug!(step = applied, "spawn ignored, a piece is already falling");
                    }
                }
                Step::Command(command) => {
                    if spawn_if_needed(engine) {
                        engine.apply_command(command);
                    }
                }
                Step::HardDrop => {
                    if spawn_if_needed(engine) {
                        engine.hard_drop();
                    }
                }
            }
        }
        self.steps.len()
    }
}

/// Spawns a random piece if the engine waits for one.
///
/// Returns whether a piece is falling afterwards.
fn spawn_if_needed(engine: &mut GameEngine) -> bool {
    if engine.phase().is_spawning() {
        engine.spawn(None);
    }
    engine.phase().is_falling()
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{Phase, PieceSeed, Position};

    use super::*;

    fn engine() -> GameEngine {
        GameEngine::new(10, 20, Position::new(3, 0), PieceSeed::new(11)).unwrap()
    }

    #[test]
    fn test_parse_steps() {
        let script: Script = "LR D U H S St Sl L".parse().unwrap();
        assert_eq!(
            script.steps(),
            &[
                Step::Command(Command::Left),
                Step::Command(Command::Right),
                Step::Command(Command::Down),
                Step::Command(Command::RotateCw),
                Step::HardDrop,
                Step::Spawn(None),
                Step::Spawn(Some(PieceKind::T)),
                Step::Spawn(Some(PieceKind::L)),
                Step::Command(Command::Left),
            ]
        );
        assert_eq!(script.to_string(), "LRDUHSStSlL");
    }

    #[test]
    fn test_spawn_followed_by_command() {
        // Uppercase letters after `S` are always commands.
        let script: Script = "SL".parse().unwrap();
        assert_eq!(
            script.steps(),
            &[Step::Spawn(None), Step::Command(Command::Left)]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "LRx".parse::<Script>(),
            Err(ScriptError::UnknownStep { ch: 'x', index: 2 })
        );
        assert_eq!(
            "Sq".parse::<Script>(),
            Err(ScriptError::UnknownKind { ch: 'q', index: 1 })
        );
    }

    #[test]
    fn test_kind_letter_must_follow_spawn() {
        assert_eq!(
            "S t".parse::<Script>(),
            Err(ScriptError::UnknownStep { ch: 't', index: 2 })
        );
        let script: Script = "S\tL".parse().unwrap();
        assert_eq!(
            script.steps(),
            &[Step::Spawn(None), Step::Command(Command::Left)]
        );
    }

    #[test]
    fn test_play_spawns_automatically() {
        let mut engine = engine();
        let script: Script = "D".parse().unwrap();
        assert_eq!(script.play(&mut engine), 1);
        assert_eq!(engine.stats().piece_count(), 1);
        assert_eq!(engine.phase(), Phase::Falling);
        assert_eq!(engine.active_piece().unwrap().anchor(), Position::new(3, 1));
    }

    #[test]
    fn test_play_explicit_spawn() {
        let mut engine = engine();
        let script: Script = "SoH".parse().unwrap();
        script.play(&mut engine);
        assert_eq!(engine.stats().locked_pieces(), 1);
        assert_eq!(engine.board().occupied_count(), 4);
        assert!(engine.board().is_occupied(Position::new(3, 19)));
        assert!(engine.board().is_occupied(Position::new(4, 18)));
    }

    #[test]
    fn test_play_stops_at_game_over() {
        let mut engine = GameEngine::new(4, 4, Position::new(0, 0), PieceSeed::new(1)).unwrap();
        let script: Script = "SoHSoHSoHLLL".parse().unwrap();
        // The third O cannot spawn on top of the first two.
        assert_eq!(script.play(&mut engine), 5);
        assert!(engine.phase().is_game_over());
        assert_eq!(engine.stats().piece_count(), 2);
    }

    #[test]
    fn test_same_seed_same_result() {
        let script: Script = "HLLHRRUHUDDDLH".parse().unwrap();
        let mut a = engine();
        let mut b = engine();
        script.play(&mut a);
        script.play(&mut b);
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
