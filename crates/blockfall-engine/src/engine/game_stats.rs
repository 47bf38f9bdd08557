use serde::{Deserialize, Serialize};

/// Score values for row clears.
///
/// Index corresponds to number of rows cleared by a single lock:
/// - 0 rows: 0 points
/// - 1 row: 100 points
/// - 2 rows: 300 points
/// - 3 rows: 500 points
/// - 4 rows: 800 points
const SCORE_TABLE: [usize; 5] = [0, 100, 300, 500, 800];

/// Points for each row beyond four cleared by one lock.
///
/// Only reachable on boards seeded with rows that were already full.
const EXTRA_ROW_POINTS: usize = 400;

/// Returns the points awarded for clearing `cleared_rows` rows with one lock.
///
/// The curve is strictly increasing, and up to four rows clearing them together
/// scores more than clearing the same rows in separate locks.
///
/// # Example
///
/// ```
/// use blockfall_engine::points_for;
///
/// assert_eq!(points_for(0), 0);
/// assert_eq!(points_for(4), 800);
/// assert!(points_for(2) > 2 * points_for(1));
/// ```
#[must_use]
pub fn points_for(cleared_rows: usize) -> usize {
    match SCORE_TABLE.get(cleared_rows) {
        Some(&points) => points,
        None => SCORE_TABLE[4] + (cleared_rows - 4) * EXTRA_ROW_POINTS,
    }
}

/// Session statistics: score, piece counts and row clears.
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let stats = GameStats::new();
/// assert_eq!(stats.score(), 0);
/// assert_eq!(stats.piece_count(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: usize,
    piece_count: usize,
    locked_pieces: usize,
    total_cleared_rows: usize,
    row_clear_counter: [usize; 5],
}

impl GameStats {
    /// Creates a new game statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            piece_count: 0,
            locked_pieces: 0,
            total_cleared_rows: 0,
            row_clear_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Returns the number of pieces spawned successfully.
    ///
    /// A spawn that ends the game is not counted.
    #[must_use]
    pub const fn piece_count(&self) -> usize {
        self.piece_count
    }

    /// Returns the number of pieces locked into the board.
    #[must_use]
    pub const fn locked_pieces(&self) -> usize {
        self.locked_pieces
    }

    #[must_use]
    pub const fn total_cleared_rows(&self) -> usize {
        self.total_cleared_rows
    }

    /// Returns the current level: one level per 10 cleared rows.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.total_cleared_rows / 10
    }

    /// Returns a histogram of locks by number of rows they cleared.
    ///
    /// Index 4 also counts the rare locks that cleared more than four rows.
    #[must_use]
    pub const fn row_clear_counter(&self) -> &[usize; 5] {
        &self.row_clear_counter
    }

    pub(crate) const fn record_spawn(&mut self) {
        self.piece_count += 1;
    }

    pub(crate) fn record_lock(&mut self, cleared_rows: usize) {
        self.locked_pieces += 1;
        self.total_cleared_rows += cleared_rows;
        let bucket = cleared_rows.min(self.row_clear_counter.len() - 1);
        self.row_clear_counter[bucket] += 1;
        self.score += points_for(cleared_rows);
    }
}
