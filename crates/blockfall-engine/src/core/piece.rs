use std::fmt;

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use crate::TemplateError;

/// Side length of the square occupancy matrix every template lives in.
pub const TEMPLATE_SIZE: usize = 4;

/// Occupancy matrix indexed `[row][col]`.
pub type Occupancy = [[bool; TEMPLATE_SIZE]; TEMPLATE_SIZE];

/// Opaque color attached to a piece and copied into the cells it locks.
///
/// The standard catalog stores ANSI background color codes (`41`..`47`), but the
/// engine only ever copies and compares the value. Interpreting it is up to the
/// renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorTag(u8);

impl ColorTag {
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Width and height of the minimal bounding box of a template's set cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    width: usize,
    height: usize,
}

impl Footprint {
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn width(self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(self) -> usize {
        self.height
    }

    /// Swaps width and height.
    #[must_use]
    pub const fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// One rotation state of one piece: a 4×4 occupancy matrix, its footprint and
/// its color.
///
/// Templates are immutable values. [`PieceTemplate::rotated`] returns a new
/// template, so probing a rotation never touches the one currently in play.
///
/// A valid template satisfies:
///
/// - every set cell lies inside the footprint;
/// - every footprint row and column holds at least one set cell;
/// - set cells are contiguous within each row and within each column.
///
/// The last rule lets collision checks look only at the leading cell of each
/// row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceTemplate {
    cells: Occupancy,
    footprint: Footprint,
    color: ColorTag,
}

impl PieceTemplate {
    /// Builds a template from a raw occupancy matrix, checking the template rules.
    pub fn new(
        cells: Occupancy,
        footprint: Footprint,
        color: ColorTag,
    ) -> Result<Self, TemplateError> {
        let template = Self {
            cells,
            footprint,
            color,
        };
        template.validate()?;
        Ok(template)
    }

    /// Parses a template from text rows, `#` for a set cell and `.` for an empty one.
    ///
    /// The footprint is the widest row by the number of rows; shorter rows are
    /// padded with empty cells.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::{ColorTag, Footprint, PieceTemplate};
    ///
    /// let t = PieceTemplate::from_pattern(&[".#.", "###"], ColorTag::new(45)).unwrap();
    /// assert_eq!(t.footprint(), Footprint::new(3, 2));
    /// assert_eq!(t.cell_count(), 4);
    /// ```
    pub fn from_pattern(rows: &[&str], color: ColorTag) -> Result<Self, TemplateError> {
        let height = rows.len();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        if !(1..=TEMPLATE_SIZE).contains(&width) || !(1..=TEMPLATE_SIZE).contains(&height) {
            return Err(TemplateError::FootprintOutOfRange { width, height });
        }

        let mut cells = [[false; TEMPLATE_SIZE]; TEMPLATE_SIZE];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                cells[y][x] = match ch {
                    '#' => true,
                    '.' => false,
                    _ => return Err(TemplateError::UnknownPatternChar(ch)),
                };
            }
        }
        Self::new(cells, Footprint::new(width, height), color)
    }

    // Const counterpart of `from_pattern` for the built-in table. The patterns
    // are fixed, so the rules are asserted by tests instead of checked here.
    const fn authored(rows: &[&str], color: ColorTag) -> Self {
        let mut cells = [[false; TEMPLATE_SIZE]; TEMPLATE_SIZE];
        let mut width = 0;
        let mut y = 0;
        while y < rows.len() {
            let row = rows[y].as_bytes();
            if row.len() > width {
                width = row.len();
            }
            let mut x = 0;
            while x < row.len() {
                cells[y][x] = row[x] == b'#';
                x += 1;
            }
            y += 1;
        }
        Self {
            cells,
            footprint: Footprint::new(width, rows.len()),
            color,
        }
    }

    fn validate(&self) -> Result<(), TemplateError> {
        let Footprint { width, height } = self.footprint;
        if !(1..=TEMPLATE_SIZE).contains(&width) || !(1..=TEMPLATE_SIZE).contains(&height) {
            return Err(TemplateError::FootprintOutOfRange { width, height });
        }

        for (y, row) in self.cells.iter().enumerate() {
            for (x, &set) in row.iter().enumerate() {
                if set && (x >= width || y >= height) {
                    return Err(TemplateError::CellOutsideFootprint { x, y });
                }
            }
        }

        for y in 0..height {
            match count_runs((0..width).map(|x| self.cells[y][x])) {
                0 => return Err(TemplateError::EmptyRow(y)),
                1 => {}
                _ => return Err(TemplateError::GappedRow(y)),
            }
        }
        for x in 0..width {
            match count_runs((0..height).map(|y| self.cells[y][x])) {
                0 => return Err(TemplateError::EmptyColumn(x)),
                1 => {}
                _ => return Err(TemplateError::GappedColumn(x)),
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn cells(&self) -> &Occupancy {
        &self.cells
    }

    #[must_use]
    pub const fn footprint(&self) -> Footprint {
        self.footprint
    }

    #[must_use]
    pub const fn color(&self) -> ColorTag {
        self.color
    }

    /// Whether the cell at column `dx`, row `dy` is set. Out-of-matrix offsets are empty.
    #[must_use]
    pub fn is_set(&self, dx: usize, dy: usize) -> bool {
        self.cells
            .get(dy)
            .and_then(|row| row.get(dx))
            .copied()
            .unwrap_or(false)
    }

    /// Returns an iterator of `(dx, dy)` offsets of the set cells, row by row.
    pub fn offsets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(dx, &set)| set.then_some((dx, dy)))
        })
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.offsets().count()
    }

    /// Returns the template turned by a quarter.
    ///
    /// The occupancy restricted to the footprint `(w, h)` is transposed into a
    /// `(h, w)` matrix with `target[c][r] = source[r][w - 1 - c]`, which is a
    /// counter-clockwise turn in screen coordinates. Cells outside the new
    /// footprint are cleared and the color is kept. Square footprints go through
    /// the same transform.
    #[must_use]
    pub const fn rotated(&self) -> Self {
        let width = self.footprint.width;
        let height = self.footprint.height;
        let mut cells = [[false; TEMPLATE_SIZE]; TEMPLATE_SIZE];
        let mut r = 0;
        while r < height {
            let mut c = 0;
            while c < width {
                cells[c][r] = self.cells[r][width - 1 - c];
                c += 1;
            }
            r += 1;
        }
        Self {
            cells,
            footprint: self.footprint.transposed(),
            color: self.color,
        }
    }
}

fn count_runs(line: impl Iterator<Item = bool>) -> usize {
    let mut runs = 0;
    let mut prev = false;
    for set in line {
        if set && !prev {
            runs += 1;
        }
        prev = set;
    }
    runs
}

/// Writes the footprint rows separated by `/`, e.g. `.#./###`.
impl fmt::Display for PieceTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.footprint.height {
            if y > 0 {
                f.write_str("/")?;
            }
            for x in 0..self.footprint.width {
                f.write_str(if self.cells[y][x] { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}

/// Rotation state of a piece: how many quarter turns were applied to the
/// authored template, modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub const fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    #[must_use]
    pub const fn rotated(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self.0
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// The templates of all seven piece kinds in all four rotation states.
///
/// Only rotation 0 is authored. States 1 to 3 are produced by applying
/// [`PieceTemplate::rotated`] to the previous state, so whatever asymmetry the
/// authored shape has is carried through every rotation the same way.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceCatalog, PieceKind, PieceRotation};
///
/// let catalog = PieceCatalog::STANDARD;
/// let upright = catalog.template_for(PieceKind::I, PieceRotation::new(1));
/// assert_eq!(upright.to_string(), "#/#/#/#");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceCatalog {
    templates: [[PieceTemplate; 4]; PieceKind::LEN],
}

impl Default for PieceCatalog {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl PieceCatalog {
    pub const STANDARD: Self = {
        const fn t(rows: &[&str], color: u8) -> PieceTemplate {
            PieceTemplate::authored(rows, ColorTag::new(color))
        }
        // Same order as `PieceKind`.
        Self::from_base_templates([
            t(&["####"], 46),
            t(&["##", "##"], 43),
            t(&[".##", "##."], 42),
            t(&["##.", ".##"], 41),
            t(&["#..", "###"], 44),
            t(&["..#", "###"], 47),
            t(&[".#.", "###"], 45),
        ])
    };

    /// Builds a catalog from the rotation-0 template of each kind, in
    /// [`PieceKind::ALL`] order.
    #[must_use]
    pub const fn from_base_templates(bases: [PieceTemplate; PieceKind::LEN]) -> Self {
        let mut templates = [[bases[0]; 4]; PieceKind::LEN];
        let mut kind = 0;
        while kind < PieceKind::LEN {
            let mut template = bases[kind];
            let mut rotation = 0;
            while rotation < 4 {
                templates[kind][rotation] = template;
                template = template.rotated();
                rotation += 1;
            }
            kind += 1;
        }
        Self { templates }
    }

    #[must_use]
    pub const fn template_for(&self, kind: PieceKind, rotation: PieceRotation) -> PieceTemplate {
        self.templates[kind as usize][rotation.as_usize()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_templates_are_tetrominoes() {
        let catalog = PieceCatalog::STANDARD;
        for kind in PieceKind::ALL {
            for turns in 0..4 {
                let template = catalog.template_for(kind, PieceRotation::new(turns));
                assert_eq!(template.cell_count(), 4, "{kind:?} rotation {turns}");
                assert_eq!(template.validate(), Ok(()), "{kind:?} rotation {turns}");
            }
        }
    }

    #[test]
    fn test_rotation_closure() {
        for kind in PieceKind::ALL {
            let original = PieceCatalog::STANDARD.template_for(kind, PieceRotation::default());
            let turned = original.rotated().rotated().rotated().rotated();
            assert_eq!(turned, original, "{kind:?}");
        }
    }

    #[test]
    fn test_rotation_swaps_footprint_and_keeps_color() {
        let j = PieceCatalog::STANDARD.template_for(PieceKind::J, PieceRotation::default());
        assert_eq!(j.to_string(), "#../###");

        let turned = j.rotated();
        assert_eq!(turned.footprint(), Footprint::new(2, 3));
        assert_eq!(turned.to_string(), ".#/.#/##");
        assert_eq!(turned.color(), j.color());

        let i = PieceCatalog::STANDARD.template_for(PieceKind::I, PieceRotation::default());
        let upright = i.rotated();
        assert_eq!(upright.footprint(), Footprint::new(1, 4));
        assert_eq!(upright.to_string(), "#/#/#/#");
    }

    #[test]
    fn test_rotation_clears_cells_outside_new_footprint() {
        let i = PieceCatalog::STANDARD.template_for(PieceKind::I, PieceRotation::default());
        let upright = i.rotated();
        for (dx, dy) in upright.offsets() {
            assert_eq!(dx, 0);
            assert!(dy < 4);
        }
        assert!(!upright.is_set(1, 0));
        assert!(!upright.is_set(3, 0));
    }

    #[test]
    fn test_square_rotation_is_identity() {
        let o = PieceCatalog::STANDARD.template_for(PieceKind::O, PieceRotation::default());
        assert_eq!(o.rotated(), o);
    }

    #[test]
    fn test_template_for_follows_repeated_rotation() {
        let catalog = PieceCatalog::STANDARD;
        for kind in PieceKind::ALL {
            let mut expected = catalog.template_for(kind, PieceRotation::default());
            let mut rotation = PieceRotation::default();
            for _ in 0..8 {
                assert_eq!(catalog.template_for(kind, rotation), expected);
                expected = expected.rotated();
                rotation = rotation.rotated();
            }
        }
        assert_eq!(
            catalog.template_for(PieceKind::T, PieceRotation::new(5)),
            catalog.template_for(PieceKind::T, PieceRotation::new(1)),
        );
    }

    #[test]
    fn test_custom_catalog_rotations() {
        let domino = PieceTemplate::from_pattern(&["##"], ColorTag::new(1)).unwrap();
        let catalog = PieceCatalog::from_base_templates([domino; PieceKind::LEN]);
        let upright = catalog.template_for(PieceKind::S, PieceRotation::new(1));
        assert_eq!(upright.to_string(), "#/#");
        assert_eq!(upright.color(), ColorTag::new(1));
    }

    #[test]
    fn test_from_pattern_rejects_invalid_shapes() {
        let color = ColorTag::new(0);
        assert_eq!(
            PieceTemplate::from_pattern(&["#####"], color),
            Err(TemplateError::FootprintOutOfRange {
                width: 5,
                height: 1
            })
        );
        assert_eq!(
            PieceTemplate::from_pattern(&[], color),
            Err(TemplateError::FootprintOutOfRange {
                width: 0,
                height: 0
            })
        );
        assert_eq!(
            PieceTemplate::from_pattern(&["#.#"], color),
            Err(TemplateError::GappedRow(0))
        );
        assert_eq!(
            PieceTemplate::from_pattern(&["#", ".", "#"], color),
            Err(TemplateError::EmptyRow(1))
        );
        assert_eq!(
            PieceTemplate::from_pattern(&["#.", "#."], color),
            Err(TemplateError::EmptyColumn(1))
        );
        assert_eq!(
            PieceTemplate::from_pattern(&["##", ".#", "##"], color),
            Err(TemplateError::GappedColumn(0))
        );
        assert_eq!(
            PieceTemplate::from_pattern(&["#x"], color),
            Err(TemplateError::UnknownPatternChar('x'))
        );
    }

    #[test]
    fn test_new_rejects_cells_outside_footprint() {
        let mut cells = [[false; TEMPLATE_SIZE]; TEMPLATE_SIZE];
        cells[0][0] = true;
        cells[0][1] = true;
        cells[3][3] = true;
        assert_eq!(
            PieceTemplate::new(cells, Footprint::new(2, 1), ColorTag::new(0)),
            Err(TemplateError::CellOutsideFootprint { x: 3, y: 3 })
        );
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('X'), None);
        assert_eq!(PieceKind::from_char('i'), None);
    }

    #[test]
    fn test_color_tag_serializes_as_number() {
        let json = serde_json::to_string(&ColorTag::new(46)).unwrap();
        assert_eq!(json, "46");
    }
}
