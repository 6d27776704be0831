//! Integration tests for the gridfill crossword filler.
//!
//! These tests verify the complete pipeline from structure and word-list
//! parsing through propagation and search to the rendered solution, using
//! fixture files under `tests/fixtures/`.

use std::collections::HashSet;
use std::fs;
use std::time::Duration;

use gridfill::errors::GridError;
use gridfill::grid::Crossword;
use gridfill::render;
use gridfill::solver::{self, Assignment, SolveStatus, Solver};
use gridfill::word_list::WordList;

/// Load a fixture file's contents.
fn load_fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{name}"))
        .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
}

/// The ladder puzzle: two across slots joined by one down slot on the left
/// edge.
fn ladder() -> Crossword {
    Crossword::parse(&load_fixture("ladder_structure.txt")).expect("valid structure")
}

/// Assert every invariant a solved assignment must satisfy: complete, all
/// word lengths match, all words pairwise distinct, all overlaps agree.
fn assert_solution_invariants(crossword: &Crossword, assignment: &Assignment) {
    assert!(assignment.is_complete());
    assert!(solver::is_consistent(crossword, assignment));

    let mut seen = HashSet::new();
    for (id, word) in assignment.iter() {
        assert_eq!(word.chars().count(), crossword.slot(id).length);
        assert!(seen.insert(word.clone()), "word {word:?} used twice");
        for &n in crossword.neighbors(id) {
            let (ks, kn) = crossword.overlap(id, n).unwrap();
            let other = assignment.get(n).unwrap();
            assert_eq!(
                word.chars().nth(ks),
                other.chars().nth(kn),
                "overlap mismatch between slots {id} and {n}"
            );
        }
    }
}

mod ladder_puzzle {
    use super::*;

    #[test]
    fn solves_end_to_end() {
        let crossword = ladder();
        let words = WordList::parse_from_str(&load_fixture("ladder_words.txt"));

        let assignment = solver::solve(&crossword, &words).expect("solvable");
        assert_solution_invariants(&crossword, &assignment);

        // The word list admits exactly one fill: "tab" down the left edge,
        // "ten" on top, "bed" on the bottom.
        assert_eq!(
            render::render_text(&crossword, &assignment),
            "ten\na██\nbed\n"
        );
    }

    #[test]
    fn uniqueness_makes_these_words_unsolvable() {
        // Every word begins and ends with the same letter, so each word
        // supports itself at both crossings and AC-3 passes; only the
        // search's uniqueness check rules the fills out.
        let crossword = ladder();
        let words = WordList::parse_from_str(&load_fixture("ladder_words_unsolvable.txt"));

        let mut solver = Solver::new(&crossword, &words);
        assert!(solver.enforce_consistency());
        assert_eq!(solver.solve(), None);
    }

    #[test]
    fn budgeted_run_reports_solved() {
        let crossword = ladder();
        let words = WordList::parse_from_str(&load_fixture("ladder_words.txt"));

        let mut solver = Solver::new(&crossword, &words);
        match solver.solve_with_budget(Duration::from_secs(30)) {
            SolveStatus::Solved(assignment) => assert_solution_invariants(&crossword, &assignment),
            other => panic!("expected a solution, got {other:?}"),
        }
    }
}

mod structure_errors {
    use super::*;

    #[test]
    fn empty_structure_is_rejected_before_search() {
        let err = Crossword::parse("").unwrap_err();
        assert_eq!(err.code(), "G001");
    }

    #[test]
    fn slotless_structure_is_rejected_before_search() {
        // Open cells exist, but no run of two or more.
        let err = Crossword::parse("#_#\n_#_").unwrap_err();
        assert_eq!(err, GridError::NoSlots);
    }
}

mod propagation {
    use super::*;

    #[test]
    fn empty_word_list_is_ordinary_unsatisfiability() {
        let crossword = ladder();
        let words = WordList::parse_from_str("");
        assert!(words.is_empty());

        // Node consistency yields empty domains; that is a plain "no
        // solution", not an error.
        assert_eq!(solver::solve(&crossword, &words), None);
    }

    #[test]
    fn domains_shrink_monotonically_under_propagation() {
        let crossword = ladder();
        let words = WordList::parse_from_str(&load_fixture("ladder_words.txt"));

        let mut solver = Solver::new(&crossword, &words);
        let seeded = solver.domains().total_len();
        assert!(solver.enforce_consistency());
        let propagated = solver.domains().total_len();
        assert!(propagated <= seeded);

        // A second run is a fixpoint.
        assert!(solver.enforce_consistency());
        assert_eq!(solver.domains().total_len(), propagated);
    }
}
