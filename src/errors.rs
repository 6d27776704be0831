//! Error types for puzzle-structure construction, with error codes and helpful messages.
//!
//! # Error Codes
//!
//! Each error variant has a unique code (G001-G003) for documentation lookup:
//!
//! - G001: `EmptyStructure` (Structure has no rows or no columns)
//! - G002: `NoSlots` (Structure contains no fillable slot)
//! - G003: `OverlapOutOfBounds` (Derived overlap offset exceeds a slot's length)
//!
//! Structure errors are fatal: they are surfaced to the caller before any search
//! begins, and the solver never attempts to recover from a malformed puzzle.
//! An unsatisfiable puzzle is NOT an error: node/arc consistency and search
//! report that as an ordinary "no solution" result.
//!
//! # Examples
//!
//! ```
//! use gridfill::grid::Crossword;
//!
//! match Crossword::parse("") {
//!     Err(e) => {
//!         println!("Error: {e}");
//!         println!("Code: {}", e.code());
//!         if let Some(help) = e.help() {
//!             println!("Help: {help}");
//!         }
//!     }
//!     Ok(_) => println!("Parsed"),
//! }
//! ```

/// Errors raised while building a [`crate::grid::Crossword`] from a structure
/// description.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GridError {
    /// The structure text (or raw fillable matrix) has zero rows or zero columns.
    #[error("empty structure ({height}x{width})")]
    EmptyStructure { height: usize, width: usize },

    /// The structure has open cells but no run of two or more, so there is
    /// nothing to fill.
    #[error("structure contains no fillable slot")]
    NoSlots,

    /// An overlap offset fell outside a slot's length. The overlap map is
    /// derived purely from geometry, so this indicates corrupt slot data
    /// rather than bad user input.
    #[error("overlap offset {offset} out of bounds for slot of length {length}")]
    OverlapOutOfBounds { offset: usize, length: usize },
}

impl GridError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            GridError::EmptyStructure { .. } => "G001",
            GridError::NoSlots => "G002",
            GridError::OverlapOutOfBounds { .. } => "G003",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            GridError::EmptyStructure { .. } => "Structure has no rows or no columns",
            GridError::NoSlots => "Structure contains no fillable slot",
            GridError::OverlapOutOfBounds { .. } => {
                "Derived overlap offset exceeds a slot's length"
            }
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            GridError::EmptyStructure { .. } => {
                Some("Provide at least one line of cells; use '_' for open cells")
            }
            GridError::NoSlots => {
                Some("A slot is a horizontal or vertical run of at least two '_' cells")
            }
            GridError::OverlapOutOfBounds { .. } => None,
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

/// Helper function to format error messages with code and optional help text
pub(crate) fn format_error_with_code_and_help(
    base_msg: &str,
    code: &str,
    help: Option<&str>,
) -> String {
    if let Some(help_text) = help {
        format!("{base_msg} ({code})\n{help_text}")
    } else {
        format!("{base_msg} ({code})")
    }
}
