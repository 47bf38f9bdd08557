//! Falling-block puzzle engine.
//!
//! The crate is split in two layers:
//!
//! - [`core`] - board, piece templates, rotation and collision checks. Everything
//!   here is either plain data or a pure function over it.
//! - [`engine`] - the [`GameEngine`] state machine (spawn, fall, lock, clear) and
//!   the read-only [`Snapshot`] a renderer consumes.
//!
//! The engine never renders, sleeps or reads input. A driver calls
//! [`GameEngine::spawn`], [`GameEngine::apply_command`] and [`GameEngine::tick`]
//! one at a time and draws whatever [`GameEngine::snapshot`] reports.
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{Command, CommandOutcome, GameEngine, PieceKind, PieceSeed, Position};
//!
//! let mut engine = GameEngine::new(4, 4, Position::new(0, 0), PieceSeed::new(1)).unwrap();
//! engine.spawn(Some(PieceKind::O));
//!
//! assert_eq!(engine.apply_command(Command::Down), CommandOutcome::Moved);
//! assert_eq!(engine.apply_command(Command::Down), CommandOutcome::Moved);
//! assert_eq!(
//!     engine.apply_command(Command::Down),
//!     CommandOutcome::Locked { cleared_rows: 0 }
//! );
//! assert!(engine.phase().is_spawning());
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Invalid engine construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board must be at least 1x1, got {width}x{height}")]
    EmptyBoard { width: usize, height: usize },
    #[display("spawn point ({x}, {y}) lies outside the {width}x{height} board")]
    SpawnPointOutsideBoard {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
}

/// A piece template that breaks the occupancy rules.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TemplateError {
    #[display("footprint {width}x{height} does not fit a 4x4 template")]
    FootprintOutOfRange { width: usize, height: usize },
    #[display("cell ({x}, {y}) is set outside the footprint")]
    CellOutsideFootprint { x: usize, y: usize },
    #[display("footprint row {_0} has no set cell")]
    EmptyRow(#[error(not(source))] usize),
    #[display("footprint column {_0} has no set cell")]
    EmptyColumn(#[error(not(source))] usize),
    #[display("set cells in row {_0} are not contiguous")]
    GappedRow(#[error(not(source))] usize),
    #[display("set cells in column {_0} are not contiguous")]
    GappedColumn(#[error(not(source))] usize),
    #[display("unexpected pattern character {_0:?}")]
    UnknownPatternChar(#[error(not(source))] char),
}

/// A script token that is not one of `L`, `R`, `D`, `U`.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown command {_0:?}, expected one of L, R, D, U")]
pub struct ParseCommandError(#[error(not(source))] String);

impl ParseCommandError {
    pub(crate) fn new(input: &str) -> Self {
        Self(input.to_owned())
    }
}
