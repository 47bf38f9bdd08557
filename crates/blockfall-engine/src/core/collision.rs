//! Placement legality checks.
//!
//! Every function here is pure: it takes the board and a *candidate* placement
//! (anchor, template, footprint) and answers a question about it. None of them
//! look at or modify the falling piece held by the engine, so the same checks
//! serve both "can I do this?" probes and the commit path.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::{
    board::{Board, Cell, Position},
    piece::{Footprint, PieceTemplate, TEMPLATE_SIZE},
};

/// Direction of a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    /// Unit step `(dx, dy)` in board coordinates.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
        }
    }

    #[must_use]
    pub const fn step(self, pos: Position) -> Position {
        let (dx, dy) = self.delta();
        pos.translated(dx, dy)
    }
}

/// Free travel along a movement axis before the nearest occupied cell.
///
/// `Cells(0)` means an occupied cell is directly adjacent. `Unobstructed` means
/// the scan reached the board edge without meeting an occupied cell; the edge
/// itself is the bounds check's business. The ordering puts every `Cells(_)`
/// below `Unobstructed`, so the minimum over several scans is the binding one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gap {
    Cells(usize),
    Unobstructed,
}

impl Gap {
    /// Whether a translation of `distance` cells fits in this gap.
    #[must_use]
    pub fn allows(self, distance: usize) -> bool {
        match self {
            Gap::Cells(free) => distance <= free,
            Gap::Unobstructed => true,
        }
    }
}

/// Whether a footprint anchored at `anchor` lies entirely inside the board.
///
/// This is a hard check independent of occupancy.
#[must_use]
pub fn in_bounds(board: &Board, anchor: Position, footprint: Footprint) -> bool {
    let (Ok(x), Ok(y)) = (usize::try_from(anchor.x), usize::try_from(anchor.y)) else {
        return false;
    };
    x + footprint.width() <= board.width() && y + footprint.height() <= board.height()
}

/// Whether every set cell of `template` at `anchor` is inside the board and on
/// an empty cell.
#[must_use]
pub fn placement_clear(board: &Board, anchor: Position, template: &PieceTemplate) -> bool {
    in_bounds(board, anchor, template.footprint())
        && template
            .offsets()
            .all(|(dx, dy)| board.cell(anchor.offset_by(dx, dy)).is_some_and(Cell::is_empty))
}

/// Smallest gap between the piece's leading edge and an occupied cell.
///
/// For `Left`/`Right` every template row is scanned from its outermost set cell
/// in the direction of travel; for `Down` every template column is scanned from
/// its lowest set cell. Rows and columns of a valid template are contiguous,
/// so the leading cell is the only one that can run into something first.
#[must_use]
pub fn translation_gap(
    board: &Board,
    anchor: Position,
    template: &PieceTemplate,
    direction: Direction,
) -> Gap {
    leading_cells(template, direction)
        .into_iter()
        .map(|(dx, dy)| scan_gap(board, anchor.offset_by(dx, dy), direction))
        .min()
        .unwrap_or(Gap::Unobstructed)
}

/// Whether moving `distance` cells in `direction` from `anchor` runs into no
/// occupied cell.
#[must_use]
pub fn translation_clear(
    board: &Board,
    anchor: Position,
    template: &PieceTemplate,
    direction: Direction,
    distance: usize,
) -> bool {
    translation_gap(board, anchor, template, direction).allows(distance)
}

/// How far the piece can fall from `anchor` before it rests on an occupied
/// cell or the floor.
#[must_use]
pub fn drop_distance(board: &Board, anchor: Position, template: &PieceTemplate) -> usize {
    let floor = usize::try_from(anchor.y).map_or(0, |y| {
        board
            .height()
            .saturating_sub(y + template.footprint().height())
    });
    match translation_gap(board, anchor, template, Direction::Down) {
        Gap::Cells(free) => free.min(floor),
        Gap::Unobstructed => floor,
    }
}

/// Whether `candidate` can replace `current` at the same anchor.
///
/// Cells set in both templates are skipped: the piece already sits on them
/// legally. Every other candidate cell must be inside the board and empty.
/// The footprint bounds are checked separately with [`in_bounds`].
#[must_use]
pub fn rotation_clear(
    board: &Board,
    anchor: Position,
    candidate: &PieceTemplate,
    current: &PieceTemplate,
) -> bool {
    candidate
        .offsets()
        .filter(|&(dx, dy)| !current.is_set(dx, dy))
        .all(|(dx, dy)| board.cell(anchor.offset_by(dx, dy)).is_some_and(Cell::is_empty))
}

fn leading_cells(
    template: &PieceTemplate,
    direction: Direction,
) -> ArrayVec<(usize, usize), TEMPLATE_SIZE> {
    let footprint = template.footprint();
    let mut cells = ArrayVec::new();
    match direction {
        Direction::Left | Direction::Right => {
            for dy in 0..footprint.height() {
                let mut set = (0..footprint.width()).filter(|&dx| template.is_set(dx, dy));
                let dx = if direction == Direction::Left {
                    set.next()
                } else {
                    set.next_back()
                };
                if let Some(dx) = dx {
                    cells.push((dx, dy));
                }
            }
        }
        Direction::Down => {
            for dx in 0..footprint.width() {
                if let Some(dy) = (0..footprint.height())
                    .rev()
                    .find(|&dy| template.is_set(dx, dy))
                {
                    cells.push((dx, dy));
                }
            }
        }
    }
    cells
}

fn scan_gap(board: &Board, from: Position, direction: Direction) -> Gap {
    let mut free = 0;
    let mut pos = direction.step(from);
    while let Some(cell) = board.cell(pos) {
        if cell.is_filled() {
            return Gap::Cells(free);
        }
        free += 1;
        pos = direction.step(pos);
    }
    Gap::Unobstructed
}
