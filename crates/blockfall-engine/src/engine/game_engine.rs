use std::str::FromStr;

use arrayvec::ArrayVec;
use rand::Rng as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    ConfigError, ParseCommandError,
    core::{
        board::{Board, Position},
        collision::{self, Direction},
        piece::{PieceCatalog, PieceKind, PieceRotation, PieceTemplate, TEMPLATE_SIZE},
    },
};

use super::{
    EngineConfig, GameStats,
    piece_generator::{PieceGenerator, PieceSeed},
    snapshot::{PieceSnapshot, Snapshot},
};

/// Phase of the spawn → fall → lock cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
pub enum Phase {
    /// No piece in play; the driver is expected to call [`GameEngine::spawn`].
    Spawning,
    /// A piece is falling and accepts commands.
    Falling,
    /// A spawn found its placement blocked. Nothing changes any more.
    GameOver,
}

/// Player intent fed to [`GameEngine::apply_command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Left,
    Right,
    /// Move down one row, or lock the piece if it cannot.
    Down,
    /// Turn the piece a quarter with [`PieceTemplate::rotated`].
    ///
    /// The transform turns the shape counter-clockwise on screen; the command
    /// keeps the name of the key that triggers it.
    RotateCw,
}

impl Command {
    /// Returns the script character of this command.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Command::Left => 'L',
            Command::Right => 'R',
            Command::Down => 'D',
            Command::RotateCw => 'U',
        }
    }

    /// Parses a script character: `L`, `R`, `D` or `U` (rotate).
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::Command;
    ///
    /// assert_eq!(Command::from_char('U'), Some(Command::RotateCw));
    /// assert_eq!(Command::from_char('x'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'L' => Some(Command::Left),
            'R' => Some(Command::Right),
            'D' => Some(Command::Down),
            'U' => Some(Command::RotateCw),
            _ => None,
        }
    }
}

/// Parses a single-character command, as in scripts.
///
/// ```
/// use blockfall_engine::Command;
///
/// assert_eq!("L".parse::<Command>(), Ok(Command::Left));
/// assert!("LL".parse::<Command>().is_err());
/// ```
impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Command::from_char(c).ok_or_else(|| ParseCommandError::new(s)),
            _ => Err(ParseCommandError::new(s)),
        }
    }
}

/// Result of a command. Rejections never change any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
pub enum CommandOutcome {
    /// The piece moved by one cell.
    Moved,
    /// The piece turned in place.
    Rotated,
    /// The piece could not move down and was merged into the board.
    Locked { cleared_rows: usize },
    /// The move or rotation was illegal.
    Rejected,
    /// No piece is falling; spawn one first.
    NotFalling,
    /// The game has ended.
    GameOver,
}

/// Result of [`GameEngine::spawn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
pub enum SpawnOutcome {
    Spawned(PieceKind),
    /// A piece is already falling; nothing changed.
    AlreadyFalling,
    /// The spawn placement was blocked, or the game had already ended.
    GameOver,
}

/// The piece currently under the driver's control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    kind: PieceKind,
    rotation: PieceRotation,
    template: PieceTemplate,
    anchor: Position,
}

impl ActivePiece {
    fn spawn(kind: PieceKind, catalog: &PieceCatalog, anchor: Position) -> Self {
        let rotation = PieceRotation::default();
        Self {
            kind,
            rotation,
            template: catalog.template_for(kind, rotation),
            anchor,
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn template(&self) -> &PieceTemplate {
        &self.template
    }

    /// Board coordinate of the template's top-left corner.
    #[must_use]
    pub fn anchor(&self) -> Position {
        self.anchor
    }

    /// Absolute board positions of the piece's cells.
    #[must_use]
    pub fn cells(&self) -> ArrayVec<Position, { TEMPLATE_SIZE * TEMPLATE_SIZE }> {
        self.template
            .offsets()
            .map(|(dx, dy)| self.anchor.offset_by(dx, dy))
            .collect()
    }

    fn moved_to(self, anchor: Position) -> Self {
        Self { anchor, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Spawning,
    Falling(ActivePiece),
    GameOver,
}

/// The game state machine.
///
/// Owns the board, the falling piece and the statistics. Each call performs
/// at most one transition; illegal requests are reported through
/// [`CommandOutcome`] / [`SpawnOutcome`] and leave the state untouched.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Command, GameEngine, PieceSeed, Position, SpawnOutcome};
///
/// let mut engine = GameEngine::new(10, 20, Position::new(3, 0), PieceSeed::new(5)).unwrap();
/// assert!(matches!(engine.spawn(None), SpawnOutcome::Spawned(_)));
///
/// engine.apply_command(Command::Left);
/// engine.apply_command(Command::RotateCw);
/// while engine.tick().is_moved() {}
///
/// assert!(engine.phase().is_spawning());
/// assert_eq!(engine.board().occupied_count(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct GameEngine {
    board: Board,
    catalog: PieceCatalog,
    spawn_point: Position,
    generator: PieceGenerator,
    stats: GameStats,
    state: State,
}

impl GameEngine {
    /// Creates an engine with an empty `width × height` board.
    pub fn new(
        width: usize,
        height: usize,
        spawn_point: Position,
        seed: PieceSeed,
    ) -> Result<Self, ConfigError> {
        Self::with_board(Board::new(width, height)?, spawn_point, seed)
    }

    /// Creates an engine from a configuration, drawing a random seed if none is set.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        Self::new(
            config.board_width,
            config.board_height,
            config.spawn_point(),
            seed,
        )
    }

    /// Creates an engine over a pre-filled board.
    pub fn with_board(
        board: Board,
        spawn_point: Position,
        seed: PieceSeed,
    ) -> Result<Self, ConfigError> {
        if !board.contains(spawn_point) {
            return Err(ConfigError::SpawnPointOutsideBoard {
                x: spawn_point.x,
                y: spawn_point.y,
                width: board.width(),
                height: board.height(),
            });
        }
        Ok(Self {
            board,
            catalog: PieceCatalog::STANDARD,
            spawn_point,
            generator: PieceGenerator::with_seed(seed),
            stats: GameStats::new(),
            state: State::Spawning,
        })
    }

    /// Replaces the piece templates.
    #[must_use]
    pub fn with_catalog(mut self, catalog: PieceCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn catalog(&self) -> &PieceCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn spawn_point(&self) -> Position {
        self.spawn_point
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Spawning => Phase::Spawning,
            State::Falling(_) => Phase::Falling,
            State::GameOver => Phase::GameOver,
        }
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<&ActivePiece> {
        match &self.state {
            State::Falling(piece) => Some(piece),
            State::Spawning | State::GameOver => None,
        }
    }

    /// Returns where the falling piece would lock after a hard drop.
    #[must_use]
    pub fn landing_piece(&self) -> Option<ActivePiece> {
        self.active_piece().map(|piece| self.landed(*piece))
    }

    fn landed(&self, piece: ActivePiece) -> ActivePiece {
        let distance = collision::drop_distance(&self.board, piece.anchor, &piece.template);
        piece.moved_to(piece.anchor.offset_by(0, distance))
    }

    fn falling(&self) -> Result<ActivePiece, CommandOutcome> {
        match self.state {
            State::Falling(piece) => Ok(piece),
            State::Spawning => Err(CommandOutcome::NotFalling),
            State::GameOver => Err(CommandOutcome::GameOver),
        }
    }

    /// Puts a new piece at the spawn point.
    ///
    /// With `None`, the kind is drawn from the seeded generator. If the spawn
    /// placement is out of bounds or overlaps the board, the game is over and
    /// the piece count is left unchanged.
    pub fn spawn(&mut self, kind: Option<PieceKind>) -> SpawnOutcome {
        match self.state {
            State::Spawning => {}
            State::Falling(_) => return SpawnOutcome::AlreadyFalling,
            State::GameOver => return SpawnOutcome::GameOver,
        }

        let kind = kind.unwrap_or_else(|| self.generator.next_kind());
        let piece = ActivePiece::spawn(kind, &self.catalog, self.spawn_point);
        if !collision::placement_clear(&self.board, piece.anchor, &piece.template) {
            debug!(
                ?kind,
                pieces = self.stats.piece_count(),
                score = self.stats.score(),
                "spawn blocked, game over"
            );
            self.state = State::GameOver;
            return SpawnOutcome::GameOver;
        }

        self.stats.record_spawn();
        self.state = State::Falling(piece);
        debug!(?kind, pieces = self.stats.piece_count(), "piece spawned");
        SpawnOutcome::Spawned(kind)
    }

    /// Applies one command to the falling piece.
    pub fn apply_command(&mut self, command: Command) -> CommandOutcome {
        let piece = match self.falling() {
            Ok(piece) => piece,
            Err(outcome) => return outcome,
        };

        let outcome = match command {
            Command::Left => self.try_translate(piece, Direction::Left),
            Command::Right => self.try_translate(piece, Direction::Right),
            Command::Down => match self.try_translate(piece, Direction::Down) {
                CommandOutcome::Moved => CommandOutcome::Moved,
                _ => self.lock(piece),
            },
            Command::RotateCw => self.try_rotate(piece),
        };
        if outcome.is_rejected() {
            trace!(?command, kind = ?piece.kind, "command rejected");
        }
        outcome
    }

    /// Gravity step; same as [`Command::Down`].
    pub fn tick(&mut self) -> CommandOutcome {
        self.apply_command(Command::Down)
    }

    /// Drops the falling piece as far as it goes and locks it.
    pub fn hard_drop(&mut self) -> CommandOutcome {
        match self.falling() {
            Ok(piece) => {
                let landed = self.landed(piece);
                self.lock(landed)
            }
            Err(outcome) => outcome,
        }
    }

    fn try_translate(&mut self, piece: ActivePiece, direction: Direction) -> CommandOutcome {
        let candidate = direction.step(piece.anchor);
        let legal = collision::in_bounds(&self.board, candidate, piece.template.footprint())
            && collision::translation_clear(
                &self.board,
                piece.anchor,
                &piece.template,
                direction,
                1,
            );
        if !legal {
            return CommandOutcome::Rejected;
        }
        self.state = State::Falling(piece.moved_to(candidate));
        CommandOutcome::Moved
    }

    fn try_rotate(&mut self, piece: ActivePiece) -> CommandOutcome {
        let candidate = piece.template.rotated();
        let legal = collision::in_bounds(&self.board, piece.anchor, candidate.footprint())
            && collision::rotation_clear(&self.board, piece.anchor, &candidate, &piece.template);
        if !legal {
            return CommandOutcome::Rejected;
        }
        self.state = State::Falling(ActivePiece {
            rotation: piece.rotation.rotated(),
            template: candidate,
            ..piece
        });
        CommandOutcome::Rotated
    }

    fn lock(&mut self, piece: ActivePiece) -> CommandOutcome {
        debug_assert!(
            collision::placement_clear(&self.board, piece.anchor, &piece.template),
            "locking an illegal placement"
        );
        self.board.fill_piece(piece.anchor, &piece.template);
        let cleared_rows = self.board.clear_filled_rows();
        self.stats.record_lock(cleared_rows);
        self.state = State::Spawning;
        if cleared_rows > 0 {
            debug!(
                cleared_rows,
                total = self.stats.total_cleared_rows(),
                "rows cleared"
            );
        }
        debug!(
            kind = ?piece.kind,
            x = piece.anchor.x,
            y = piece.anchor.y,
            cleared_rows,
            score = self.stats.score(),
            "piece locked"
        );
        CommandOutcome::Locked { cleared_rows }
    }

    /// Returns a read-only copy of everything a renderer needs.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let active = self.active_piece().map(|piece| PieceSnapshot {
            kind: piece.kind,
            rotation: piece.rotation,
            anchor: piece.anchor,
            color: piece.template.color(),
            cells: piece.cells().to_vec(),
        });
        let landing = self
            .landing_piece()
            .map(|piece| piece.cells().to_vec())
            .unwrap_or_default();
        Snapshot {
            width: self.board.width(),
            height: self.board.height(),
            cells: self.board.rows().map(<[_]>::to_vec).collect(),
            active,
            landing,
            score: self.stats.score(),
            piece_count: self.stats.piece_count(),
            cleared_rows: self.stats.total_cleared_rows(),
            phase: self.phase(),
        }
    }
}
