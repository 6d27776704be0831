//! `render` — textual materialization of a solved crossword.
//!
//! The solver hands this module a completed [`Assignment`]; nothing here is
//! part of the search. Blocked cells render as `█`, open cells as their
//! letter (or a space if the assignment is partial and the cell is unfilled).

use crate::grid::Crossword;
use crate::solver::Assignment;

/// Lay the assignment's words into a `height x width` grid of characters.
///
/// Cells outside any assigned slot stay `None`.
#[must_use]
pub fn letter_grid(crossword: &Crossword, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; crossword.width()]; crossword.height()];
    for (id, word) in assignment.iter() {
        let slot = crossword.slot(id);
        for (k, c) in word.chars().enumerate() {
            let (row, col) = slot.cell(k);
            letters[row][col] = Some(c);
        }
    }
    letters
}

/// Render the assignment as display text, one grid row per line.
#[must_use]
pub fn render_text(crossword: &Crossword, assignment: &Assignment) -> String {
    let letters = letter_grid(crossword, assignment);
    let mut out = String::with_capacity((crossword.width() + 1) * crossword.height());
    for row in 0..crossword.height() {
        for col in 0..crossword.width() {
            if crossword.is_fillable(row, col) {
                out.push(letters[row][col].unwrap_or(' '));
            } else {
                out.push('█');
            }
        }
        out.push('\n');
    }
    out
}
