//! Game state machine and what it exposes to drivers.
//!
//! - [`GameEngine`] - board, falling piece and phase; applies spawns and commands
//! - [`GameStats`] - score, piece count and row clears
//! - [`PieceGenerator`] - seeded uniform piece draws
//! - [`PieceSeed`] - seed for deterministic piece generation
//! - [`EngineConfig`] - board size, spawn point and seed
//! - [`Snapshot`] - read-only view for renderers
//!
//! # Game Flow
//!
//! 1. In [`Phase::Spawning`], call [`GameEngine::spawn`]
//! 2. Move and rotate the falling piece with [`GameEngine::apply_command`]
//! 3. [`Command::Down`] (or [`GameEngine::tick`]) locks the piece once it cannot fall
//! 4. Filled rows are cleared and the engine goes back to spawning
//! 5. Repeat until a spawn is blocked, which ends the game
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{GameEngine, PieceSeed, Position};
//!
//! let mut engine = GameEngine::new(10, 20, Position::new(3, 0), PieceSeed::new(9)).unwrap();
//!
//! while engine.spawn(None).is_spawned() {
//!     engine.hard_drop();
//! }
//!
//! assert!(engine.phase().is_game_over());
//! println!("{}", engine.snapshot());
//! ```

pub use self::{config::*, game_engine::*, game_stats::*, piece_generator::*, snapshot::*};

mod config;
mod game_engine;
mod game_stats;
mod piece_generator;
mod snapshot;
