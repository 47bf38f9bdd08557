use serde::{Deserialize, Serialize};

use crate::ConfigError;

use super::piece::{ColorTag, PieceTemplate};

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing locked here.
    #[default]
    Empty,
    /// Occupied by a locked piece of the given color.
    Filled(ColorTag),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[must_use]
    pub fn is_filled(self) -> bool {
        !self.is_empty()
    }

    #[must_use]
    pub fn color(self) -> Option<ColorTag> {
        match self {
            Cell::Empty => None,
            Cell::Filled(color) => Some(color),
        }
    }
}

/// A board coordinate.
///
/// `(0, 0)` is the top-left cell; `x` grows rightward and `y` grows downward.
/// Coordinates are signed so that a candidate position one step past the left
/// or top edge can be represented and rejected by the bounds check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Position `(dx, dy)` cells right of and below this one.
    ///
    /// Used for template cell offsets and drop distances, both bounded by the
    /// board size.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    #[must_use]
    pub const fn offset_by(self, dx: usize, dy: usize) -> Self {
        self.translated(dx as i32, dy as i32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BoardRow {
    cells: Box<[Cell]>,
}

impl BoardRow {
    fn empty(width: usize) -> Self {
        Self {
            cells: vec![Cell::Empty; width].into_boxed_slice(),
        }
    }

    fn is_filled(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_filled())
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }
}

/// The grid of locked cells.
///
/// The board only ever holds cells of pieces that were locked (plus whatever
/// the caller seeded before the session started). The falling piece is kept
/// separately by the engine and merged in by [`Board::fill_piece`] when it
/// locks.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Position};
///
/// let board = Board::new(10, 20).unwrap();
/// assert_eq!(board.width(), 10);
/// assert!(board.cell(Position::new(9, 19)).unwrap().is_empty());
/// assert!(board.cell(Position::new(10, 0)).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    rows: Vec<BoardRow>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyBoard { width, height });
        }
        Ok(Self {
            width,
            rows: vec![BoardRow::empty(width); height],
        })
    }

    /// Builds a board from text rows: `.` is empty, any other character is a
    /// cell filled with `color`.
    ///
    /// All rows must be as wide as the first one; shorter rows are padded with
    /// empty cells and longer rows are truncated.
    ///
    /// # Example
    ///
    /// ```
    /// use blockfall_engine::{Board, ColorTag, Position};
    ///
    /// let board = Board::from_pattern(&["....", "##.#"], ColorTag::new(0)).unwrap();
    /// assert!(board.cell(Position::new(0, 1)).unwrap().is_filled());
    /// assert!(board.cell(Position::new(2, 1)).unwrap().is_empty());
    /// ```
    pub fn from_pattern(rows: &[&str], color: ColorTag) -> Result<Self, ConfigError> {
        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut board = Self::new(width, rows.len())?;
        for (row, pattern) in board.rows.iter_mut().zip(rows) {
            for (cell, ch) in row.cells.iter_mut().zip(pattern.chars()) {
                if ch != '.' {
                    *cell = Cell::Filled(color);
                }
            }
        }
        Ok(board)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    /// Returns the cell at `pos`, or `None` if `pos` is outside the board.
    #[must_use]
    pub fn cell(&self, pos: Position) -> Option<Cell> {
        let (x, y) = self.index(pos)?;
        Some(self.rows[y].cells[x])
    }

    /// Whether `pos` is inside the board and occupied.
    #[must_use]
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(Cell::is_filled)
    }

    fn index(&self, pos: Position) -> Option<(usize, usize)> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        (x < self.width && y < self.height()).then_some((x, y))
    }

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(|row| &*row.cells)
    }

    #[must_use]
    pub fn is_row_filled(&self, y: usize) -> bool {
        self.rows.get(y).is_some_and(BoardRow::is_filled)
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.rows().flatten().filter(|cell| cell.is_filled()).count()
    }

    /// Fills a single cell, used to seed a board before a session starts.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside the board.
    pub fn fill_cell(&mut self, pos: Position, color: ColorTag) {
        let Some((x, y)) = self.index(pos) else {
            panic!(
                "cell {pos:?} is outside the {}x{} board",
                self.width,
                self.height()
            );
        };
        self.rows[y].cells[x] = Cell::Filled(color);
    }

    /// Writes every set cell of `template`, anchored at `anchor`, with the
    /// template's color.
    ///
    /// This is called when a piece locks. The engine only locks placements it
    /// has already checked, so a cell outside the board is a bug.
    pub(crate) fn fill_piece(&mut self, anchor: Position, template: &PieceTemplate) {
        for (dx, dy) in template.offsets() {
            self.fill_cell(anchor.offset_by(dx, dy), template.color());
        }
    }

    /// Removes every filled row at once and returns how many were removed.
    ///
    /// Rows above a removed row shift down by the number of removed rows below
    /// them, and the rows exposed at the top become empty.
    pub fn clear_filled_rows(&mut self) -> usize {
        let height = self.height();
        let mut count = 0;
        for y in (0..height).rev() {
            if self.rows[y].is_filled() {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows.swap(y, y + count);
            }
        }
        for row in &mut self.rows[..count] {
            row.clear();
        }
        count
    }
}
