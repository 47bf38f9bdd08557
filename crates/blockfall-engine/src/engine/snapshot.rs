use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Cell, ColorTag, PieceKind, PieceRotation, Position};

use super::Phase;

/// The falling piece as seen by a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub kind: PieceKind,
    pub rotation: PieceRotation,
    pub anchor: Position,
    pub color: ColorTag,
    /// Absolute board positions of the piece's cells.
    pub cells: Vec<Position>,
}

/// Read-only copy of the engine state.
///
/// `cells` holds locked cells only, indexed `[y][x]`. The falling piece and the
/// landing preview are listed separately; use [`Snapshot::overlay`] for a grid
/// with the falling piece drawn in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Vec<Cell>>,
    pub active: Option<PieceSnapshot>,
    /// Cells the falling piece would occupy after a hard drop.
    pub landing: Vec<Position>,
    pub score: usize,
    pub piece_count: usize,
    pub cleared_rows: usize,
    pub phase: Phase,
}

impl Snapshot {
    /// Returns the board cells with the falling piece merged in its color.
    #[must_use]
    pub fn overlay(&self) -> Vec<Vec<Cell>> {
        let mut grid = self.cells.clone();
        if let Some(active) = &self.active {
            for pos in &active.cells {
                if let Some(cell) = cell_mut(&mut grid, *pos) {
                    *cell = Cell::Filled(active.color);
                }
            }
        }
        grid
    }

    fn is_active(&self, pos: Position) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.cells.contains(&pos))
    }
}

fn cell_mut(grid: &mut [Vec<Cell>], pos: Position) -> Option<&mut Cell> {
    let x = usize::try_from(pos.x).ok()?;
    let y = usize::try_from(pos.y).ok()?;
    grid.get_mut(y)?.get_mut(x)
}

/// Plain-text board: `#` locked, `@` falling, `+` landing preview, `.` empty.
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in (0..).zip(&self.cells) {
            for (x, cell) in (0..).zip(row) {
                let pos = Position::new(x, y);
                let ch = if self.is_active(pos) {
                    '@'
                } else if cell.is_filled() {
                    '#'
                } else if self.landing.contains(&pos) {
                    '+'
                } else {
                    '.'
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "score: {}  pieces: {}  rows: {}  phase: {:?}",
            self.score, self.piece_count, self.cleared_rows, self.phase
        )
    }
}
