//! `grid` — the immutable puzzle structure: grid geometry, slots, and overlaps.
//!
//! A [`Crossword`] is built once (from a textual structure description or from
//! raw parts) and is read-only thereafter. It owns:
//!
//! - the grid dimensions and a boolean "fillable" matrix,
//! - the list of [`Slot`]s (maximal runs of two or more open cells, across and
//!   down), in a canonical order,
//! - the symmetric overlap map: for each pair of slots, the character offsets
//!   at which their words must agree (or `None` if they share no cell),
//! - precomputed neighbor lists (slots sharing at least one cell).
//!
//! Slots are referred to everywhere else by [`SlotId`], their index into the
//! canonical slot list. The canonical order (start row, then start column,
//! then Across before Down) is what makes heuristic tie-breaks in the solver
//! deterministic and therefore testable.

use std::fmt;
use std::fmt::{Display, Formatter};

use crate::errors::GridError;

/// An identifier for a slot: its index in [`Crossword::slots`].
pub type SlotId = usize;

/// A pair of character offsets `(k_a, k_b)`: character `k_a` of slot A must
/// equal character `k_b` of slot B.
pub type Overlap = (usize, usize);

/// Direction that a slot runs in. `Across` sorts before `Down`, which fixes
/// the canonical order of two slots starting at the same cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Across,
    Down,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A fillable run of cells: start position, direction, and length.
///
/// Immutable once derived from the grid. Equality is structural; two slots
/// derived from the same grid never collide because maximal runs are unique
/// per `(row, col, direction)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Start row (0-indexed, top row is 0).
    pub row: usize,
    /// Start column (0-indexed, leftmost column is 0).
    pub col: usize,
    pub direction: Direction,
    /// Number of cells; always >= 2 for derived slots.
    pub length: usize,
}

impl Slot {
    /// The grid cell holding character `k` of this slot's word.
    #[must_use]
    pub fn cell(&self, k: usize) -> (usize, usize) {
        debug_assert!(k < self.length, "offset {k} out of bounds for slot {self}");
        match self.direction {
            Direction::Across => (self.row, self.col + k),
            Direction::Down => (self.row + k, self.col),
        }
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) {} [{}]", self.row, self.col, self.direction, self.length)
    }
}

/// The immutable puzzle structure: geometry, slot list, and overlap graph.
#[derive(Debug, Clone)]
pub struct Crossword {
    height: usize,
    width: usize,
    /// `fillable[row][col]` is true for open cells.
    fillable: Vec<Vec<bool>>,
    /// Canonically ordered: by (row, col, Across-before-Down).
    slots: Vec<Slot>,
    /// Symmetric matrix indexed by `SlotId` pairs; diagonal is `None`.
    overlaps: Vec<Vec<Option<Overlap>>>,
    /// `neighbors[s]` lists every slot sharing a cell with `s`, ascending.
    neighbors: Vec<Vec<SlotId>>,
}

/// The cell character marking an open (fillable) cell in the textual format.
const OPEN_CELL: char = '_';

impl Crossword {
    /// Parse a textual structure description.
    ///
    /// Each line is a row; `'_'` marks an open cell and any other character a
    /// blocked one. The grid width is the longest line; shorter lines are
    /// padded with blocked cells.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyStructure`] for input with no lines or no
    /// columns, and [`GridError::NoSlots`] when no run of two or more open
    /// cells exists.
    pub fn parse(structure: &str) -> Result<Crossword, GridError> {
        let lines: Vec<&str> = structure.lines().collect();
        let height = lines.len();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(GridError::EmptyStructure { height, width });
        }

        let fillable = lines
            .iter()
            .map(|line| {
                let mut row: Vec<bool> = line.chars().map(|c| c == OPEN_CELL).collect();
                row.resize(width, false);
                row
            })
            .collect();

        Self::from_parts(height, width, fillable)
    }

    /// Build a crossword from raw parts, deriving slots, overlaps, and
    /// neighbor lists.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyStructure`] for zero dimensions,
    /// [`GridError::NoSlots`] when the matrix holds no run of two or more
    /// open cells, and [`GridError::OverlapOutOfBounds`] if a derived overlap
    /// offset falls outside a slot (an internal-invariant failure).
    pub fn from_parts(
        height: usize,
        width: usize,
        fillable: Vec<Vec<bool>>,
    ) -> Result<Crossword, GridError> {
        if height == 0 || width == 0 || fillable.len() != height {
            return Err(GridError::EmptyStructure { height, width });
        }
        let mut fillable = fillable;
        for row in &mut fillable {
            // Short rows act as blocked cells, same as the textual format.
            row.resize(width, false);
        }

        let slots = derive_slots(height, width, &fillable);
        if slots.is_empty() {
            return Err(GridError::NoSlots);
        }

        let overlaps = derive_overlaps(height, width, &slots)?;

        // Neighbor lists fall straight out of the overlap matrix; ascending
        // SlotId order keeps arc seeding deterministic.
        let neighbors = (0..slots.len())
            .map(|s| {
                (0..slots.len())
                    .filter(|&t| overlaps[s][t].is_some())
                    .collect()
            })
            .collect();

        Ok(Crossword { height, width, fillable, slots, overlaps, neighbors })
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the cell at `(row, col)` is open.
    #[must_use]
    pub fn is_fillable(&self, row: usize, col: usize) -> bool {
        self.fillable[row][col]
    }

    /// All slots, in canonical order. `SlotId`s index into this slice.
    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    #[must_use]
    pub fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id]
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The overlap between two slots, or `None` if they share no cell.
    /// Symmetric up to swapping the offsets: `overlap(a, b) == (i, j)` iff
    /// `overlap(b, a) == (j, i)`.
    #[must_use]
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<Overlap> {
        self.overlaps[a][b]
    }

    /// Every slot sharing at least one cell with `s`, in ascending id order.
    #[must_use]
    pub fn neighbors(&self, s: SlotId) -> &[SlotId] {
        &self.neighbors[s]
    }

    /// Number of slots overlapping `s` (the "degree" in heuristic terms).
    #[must_use]
    pub fn degree(&self, s: SlotId) -> usize {
        self.neighbors[s].len()
    }
}

/// Scan the fillable matrix for maximal runs of >= 2 open cells, across then
/// down, and return them in canonical order.
fn derive_slots(height: usize, width: usize, fillable: &[Vec<bool>]) -> Vec<Slot> {
    let mut slots = Vec::new();

    for row in 0..height {
        let mut col = 0;
        while col < width {
            let run = (col..width).take_while(|&c| fillable[row][c]).count();
            if run >= 2 {
                slots.push(Slot { row, col, direction: Direction::Across, length: run });
            }
            col += run.max(1);
        }
    }

    for col in 0..width {
        let mut row = 0;
        while row < height {
            let run = (row..height).take_while(|&r| fillable[r][col]).count();
            if run >= 2 {
                slots.push(Slot { row, col, direction: Direction::Down, length: run });
            }
            row += run.max(1);
        }
    }

    slots.sort_unstable_by_key(|s| (s.row, s.col, s.direction));
    slots
}

/// Build the symmetric overlap matrix by mapping each open cell to the slots
/// covering it. Two distinct slots covering the same cell overlap at the
/// offsets of that cell within each.
fn derive_overlaps(
    height: usize,
    width: usize,
    slots: &[Slot],
) -> Result<Vec<Vec<Option<Overlap>>>, GridError> {
    // cell -> list of (slot id, offset within slot)
    let mut covering: Vec<Vec<Vec<(SlotId, usize)>>> = vec![vec![Vec::new(); width]; height];
    for (id, slot) in slots.iter().enumerate() {
        for k in 0..slot.length {
            let (r, c) = slot.cell(k);
            covering[r][c].push((id, k));
        }
    }

    let n = slots.len();
    let mut overlaps = vec![vec![None; n]; n];
    for row in covering.into_iter().flatten() {
        // At most one across and one down slot cover any cell, so this loop
        // body runs at most once per cell.
        for (i, &(a, ka)) in row.iter().enumerate() {
            for &(b, kb) in &row[i + 1..] {
                if ka >= slots[a].length || kb >= slots[b].length {
                    let (offset, length) = if ka >= slots[a].length {
                        (ka, slots[a].length)
                    } else {
                        (kb, slots[b].length)
                    };
                    return Err(GridError::OverlapOutOfBounds { offset, length });
                }
                overlaps[a][b] = Some((ka, kb));
                overlaps[b][a] = Some((kb, ka));
            }
        }
    }

    Ok(overlaps)
}
