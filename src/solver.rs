//! The search engine: backtracking with maintained arc consistency.
//!
//! The solver owns the domain store for the duration of one search and walks
//! partial [`Assignment`]s recursively:
//!
//! 1. pick the most constrained unassigned slot (minimum remaining values,
//!    degree as tie-break),
//! 2. order its candidates least-constraining first,
//! 3. tentatively assign, check consistency against the assigned neighbors,
//! 4. run arc consistency seeded with the arcs from each neighbor back toward
//!    the assigned slot, logging every pruned word,
//! 5. merge any slots forced down to a single candidate, recurse,
//! 6. on failure, roll the removal log back and remove exactly the slots this
//!    call added, then try the next candidate.
//!
//! Step 4 is the correctness-critical part: pruning goes through a
//! [`RemovalLog`] so a failed branch restores the domain store to exactly its
//! pre-branch state. Infeasibility is an ordinary result value throughout;
//! it happens on most explored branches, so it must be cheap.
//!
//! # Examples
//!
//! ```
//! use gridfill::grid::Crossword;
//! use gridfill::word_list::WordList;
//! use gridfill::solver;
//!
//! let crossword = Crossword::parse("___\n#_#\n#_#")?;
//! let words = WordList::parse_from_str("cat\nant\ntoe");
//!
//! match solver::solve(&crossword, &words) {
//!     Some(assignment) => println!("filled {} slots", assignment.len()),
//!     None => println!("no solution"),
//! }
//! # Ok::<(), gridfill::errors::GridError>(())
//! ```

use std::cmp::Reverse;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use instant::Instant;
use log::{debug, info};

use crate::consistency::{enforce_arc_consistency, enforce_arc_consistency_logged, Arc};
use crate::domains::{Domains, RemovalLog};
use crate::grid::{Crossword, SlotId};
use crate::word_list::{char_at, WordList};

/// A mapping from slots to chosen words, partial during search.
///
/// Array-backed rather than a `HashMap`: slots are dense indices, and the
/// assigned count makes the completion test O(1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    slots: Vec<Option<Rc<str>>>,
    assigned: usize,
}

impl Assignment {
    fn new(slot_count: usize) -> Assignment {
        Assignment { slots: vec![None; slot_count], assigned: 0 }
    }

    /// The word assigned to `slot`, if any.
    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<&Rc<str>> {
        self.slots[slot].as_ref()
    }

    /// Number of assigned slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned == 0
    }

    /// True when every slot has an entry.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.assigned == self.slots.len()
    }

    /// Iterate `(slot, word)` over assigned slots, ascending by slot id.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Rc<str>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, w)| w.as_ref().map(|w| (id, w)))
    }

    fn insert(&mut self, slot: SlotId, word: Rc<str>) {
        debug_assert!(self.slots[slot].is_none(), "slot assigned twice");
        self.slots[slot] = Some(word);
        self.assigned += 1;
    }

    fn remove(&mut self, slot: SlotId) {
        debug_assert!(self.slots[slot].is_some(), "removing an unassigned slot");
        self.slots[slot] = None;
        self.assigned -= 1;
    }
}

/// Outcome of a budgeted solver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    /// A complete, consistent assignment was found.
    Solved(Assignment),
    /// The search space was exhausted without a solution.
    NoSolution,
    /// The time budget expired mid-search. Contains the elapsed time.
    TimedOut { elapsed: Duration },
}

/// Simple helper to enforce a wall-clock time limit.
struct TimeBudget {
    start: Instant,
    limit: Duration,
}

impl TimeBudget {
    fn new(limit: Duration) -> Self {
        Self { start: Instant::now(), limit }
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn expired(&self) -> bool {
        self.start.elapsed() >= self.limit
    }
}

/// Interior search signal; `Exhausted` is the ordinary "this branch failed"
/// value, not an error.
enum Search {
    Solved(Assignment),
    Exhausted,
    TimedOut,
}

/// One solver run over a crossword and a word list.
pub struct Solver<'a> {
    crossword: &'a Crossword,
    domains: Domains,
}

/// Solve in one call: seed, propagate, and search.
///
/// Returns the first complete consistent assignment found, or `None` if the
/// puzzle is unsatisfiable.
#[must_use]
pub fn solve(crossword: &Crossword, word_list: &WordList) -> Option<Assignment> {
    Solver::new(crossword, word_list).solve()
}

impl<'a> Solver<'a> {
    /// Seed every slot's domain with the full word list.
    #[must_use]
    pub fn new(crossword: &'a Crossword, word_list: &WordList) -> Solver<'a> {
        Solver { crossword, domains: Domains::new(crossword, word_list) }
    }

    /// The current domain store. Mostly useful for inspecting what
    /// propagation pruned.
    #[must_use]
    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    /// Enforce node consistency then whole-problem arc consistency.
    ///
    /// Returns `false` if some domain was emptied, meaning the puzzle is
    /// unsatisfiable without entering search. Idempotent.
    pub fn enforce_consistency(&mut self) -> bool {
        self.domains.enforce_node_consistency(self.crossword);
        enforce_arc_consistency(&mut self.domains, self.crossword, None)
    }

    /// Run the full pipeline: node consistency, AC-3, backtracking search.
    pub fn solve(&mut self) -> Option<Assignment> {
        match self.run(None) {
            Search::Solved(assignment) => Some(assignment),
            _ => None,
        }
    }

    /// [`Solver::solve`] under a wall-clock budget. Core semantics are
    /// unchanged; the budget only bounds how long exhaustion may take.
    pub fn solve_with_budget(&mut self, limit: Duration) -> SolveStatus {
        let budget = TimeBudget::new(limit);
        match self.run(Some(&budget)) {
            Search::Solved(assignment) => SolveStatus::Solved(assignment),
            Search::Exhausted => SolveStatus::NoSolution,
            Search::TimedOut => SolveStatus::TimedOut { elapsed: budget.elapsed() },
        }
    }

    fn run(&mut self, budget: Option<&TimeBudget>) -> Search {
        info!("solving: {} slots", self.crossword.slot_count());

        if !self.enforce_consistency() {
            info!("unsatisfiable before search: a domain emptied during propagation");
            return Search::Exhausted;
        }

        let mut assignment = Assignment::new(self.crossword.slot_count());
        let result = self.backtrack(&mut assignment, budget);
        match &result {
            Search::Solved(_) => info!("solution found"),
            Search::Exhausted => info!("search space exhausted: no solution"),
            Search::TimedOut => info!("search timed out"),
        }
        result
    }

    fn backtrack(&mut self, assignment: &mut Assignment, budget: Option<&TimeBudget>) -> Search {
        if assignment.is_complete() {
            return Search::Solved(assignment.clone());
        }
        if budget.is_some_and(TimeBudget::expired) {
            return Search::TimedOut;
        }

        let Some(slot) = select_slot(self.crossword, &self.domains, assignment) else {
            // No unassigned slot yet the assignment is incomplete; cannot
            // happen with a well-formed crossword.
            return Search::Exhausted;
        };
        debug!(
            "selected slot {} ({} candidates, {} assigned)",
            self.crossword.slot(slot),
            self.domains.len(slot),
            assignment.len()
        );

        for word in order_candidates(self.crossword, &self.domains, slot) {
            if budget.is_some_and(TimeBudget::expired) {
                return Search::TimedOut;
            }
            if !placement_consistent(self.crossword, assignment, slot, &word) {
                continue;
            }

            assignment.insert(slot, Rc::clone(&word));
            let mut added = vec![slot];

            // Inference: re-establish arc consistency from each neighbor back
            // toward the slot just assigned, logging removals for rollback.
            let arcs: Vec<Arc> =
                self.crossword.neighbors(slot).iter().map(|&n| (n, slot)).collect();
            let mut log = RemovalLog::new();
            let feasible =
                enforce_arc_consistency_logged(&mut self.domains, self.crossword, Some(arcs), &mut log);

            let result = if feasible && self.merge_forced(assignment, &mut added) {
                self.backtrack(assignment, budget)
            } else {
                debug!("branch infeasible for {word:?} in slot {}", self.crossword.slot(slot));
                Search::Exhausted
            };

            if let Search::Solved(solution) = result {
                return Search::Solved(solution);
            }

            // Undo exactly what this candidate added: the slots assigned at
            // this call and the domain words its inference pruned.
            for &s in &added {
                assignment.remove(s);
            }
            log.rollback(&mut self.domains);

            if matches!(result, Search::TimedOut) {
                return Search::TimedOut;
            }
        }

        Search::Exhausted
    }

    /// Merge every unassigned slot whose domain was narrowed to one word.
    ///
    /// Each forced word still has to pass the incremental consistency check:
    /// arc consistency knows nothing about the all-words-distinct invariant,
    /// so two slots can be forced to the same word. Returns `false` (branch
    /// infeasible) on any conflict; merged slots are recorded in `added`
    /// either way so the caller can undo them.
    fn merge_forced(&self, assignment: &mut Assignment, added: &mut Vec<SlotId>) -> bool {
        for s in 0..self.crossword.slot_count() {
            if assignment.get(s).is_some() {
                continue;
            }
            let Some(word) = self.domains.sole_candidate(s) else {
                continue;
            };
            if !placement_consistent(self.crossword, assignment, s, &word) {
                return false;
            }
            debug!("forced: slot {} = {word:?}", self.crossword.slot(s));
            assignment.insert(s, word);
            added.push(s);
        }
        true
    }
}

/// Full consistency test for a (possibly partial) assignment: every word's
/// length matches its slot, all words are pairwise distinct, and every
/// assigned overlapping pair agrees at the shared cell.
#[must_use]
pub fn is_consistent(crossword: &Crossword, assignment: &Assignment) -> bool {
    let mut seen: HashSet<&str> = HashSet::new();
    for (s, word) in assignment.iter() {
        if word.chars().count() != crossword.slot(s).length {
            return false;
        }
        if !seen.insert(word.as_ref()) {
            return false;
        }
        for &n in crossword.neighbors(s) {
            let Some(other) = assignment.get(n) else { continue };
            let (ks, kn) = crossword
                .overlap(s, n)
                .unwrap_or_else(|| unreachable!("neighbors always overlap"));
            if char_at(word, ks) != char_at(other, kn) {
                return false;
            }
        }
    }
    true
}

/// Would placing `word` in `slot` keep the assignment consistent? Scans only
/// the uniqueness constraint and `slot`'s already-assigned neighbors, not the
/// whole assignment.
fn placement_consistent(
    crossword: &Crossword,
    assignment: &Assignment,
    slot: SlotId,
    word: &Rc<str>,
) -> bool {
    if word.chars().count() != crossword.slot(slot).length {
        return false;
    }
    if assignment.iter().any(|(_, w)| w == word) {
        return false;
    }
    crossword.neighbors(slot).iter().all(|&n| {
        let Some(other) = assignment.get(n) else { return true };
        let (ks, kn) = crossword
            .overlap(slot, n)
            .unwrap_or_else(|| unreachable!("neighbors always overlap"));
        char_at(word, ks) == char_at(other, kn)
    })
}

/// Choose the unassigned slot minimizing `domain size + 1/(degree+1)`.
///
/// The fractional degree term is strictly below 1, so the composite score is
/// exactly the lexicographic key `(domain size, higher degree first)`; the
/// final tie-break is the canonical slot order, which keeps selection
/// deterministic. Returns `None` when every slot is assigned.
#[must_use]
pub fn select_slot(
    crossword: &Crossword,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<SlotId> {
    (0..crossword.slot_count())
        .filter(|&s| assignment.get(s).is_none())
        .min_by_key(|&s| (domains.len(s), Reverse(crossword.degree(s)), s))
}

/// Order `slot`'s candidates least-constraining first: ascending by the
/// number of neighbor-domain words each candidate would rule out at the
/// overlap offsets. The count is the literal per-neighbor-word sum: a word
/// conflicting with one neighbor at several of its candidates counts once per
/// candidate. Equal counts fall back to alphabetical order.
#[must_use]
pub fn order_candidates(
    crossword: &Crossword,
    domains: &Domains,
    slot: SlotId,
) -> Vec<Rc<str>> {
    let mut candidates: Vec<Rc<str>> = domains.candidates(slot).iter().cloned().collect();
    candidates.sort_unstable_by(|a, b| {
        ruled_out_count(crossword, domains, slot, a)
            .cmp(&ruled_out_count(crossword, domains, slot, b))
            .then_with(|| a.cmp(b))
    });
    candidates
}

/// How many words across all neighbor domains disagree with `word` at the
/// overlap offsets.
fn ruled_out_count(
    crossword: &Crossword,
    domains: &Domains,
    slot: SlotId,
    word: &str,
) -> usize {
    crossword
        .neighbors(slot)
        .iter()
        .map(|&n| {
            let (ks, kn) = crossword
                .overlap(slot, n)
                .unwrap_or_else(|| unreachable!("neighbors always overlap"));
            let c = char_at(word, ks);
            domains
                .candidates(n)
                .iter()
                .filter(|other| char_at(other, kn) != c)
                .count()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction;

    /// Slot A: across at (0,0), length 3. Slot B: down at (0,1), length 3.
    /// A's char 1 must equal B's char 0.
    const ELBOW: &str = "___\n#_#\n#_#";

    fn assignment_words(crossword: &Crossword, assignment: &Assignment) -> Vec<String> {
        (0..crossword.slot_count())
            .map(|s| assignment.get(s).unwrap().to_string())
            .collect()
    }

    #[test]
    fn single_slot_picks_a_fitting_word() {
        let cw = Crossword::parse("___").unwrap();
        let wl = WordList::parse_from_str("cat\ndog");
        let assignment = solve(&cw, &wl).expect("solvable");
        assert!(assignment.is_complete());
        let word = assignment.get(0).unwrap().to_string();
        assert!(word == "cat" || word == "dog");
        assert!(is_consistent(&cw, &assignment));
    }

    #[test]
    fn single_slot_with_no_fitting_length_fails() {
        let cw = Crossword::parse("___").unwrap();
        let wl = WordList::parse_from_str("cats");
        assert_eq!(solve(&cw, &wl), None);
    }

    #[test]
    fn overlap_forces_the_only_agreeing_pair() {
        let cw = Crossword::parse(ELBOW).unwrap();
        let wl = WordList::parse_from_str("cat\nant\ntoe");
        let assignment = solve(&cw, &wl).expect("solvable");

        // Slot 0 is A (across at (0,0)), slot 1 is B (down at (0,1)).
        assert_eq!(cw.slot(0).direction, Direction::Across);
        assert_eq!(assignment_words(&cw, &assignment), vec!["cat", "ant"]);
    }

    #[test]
    fn arc_consistency_prunes_before_search_branches() {
        let cw = Crossword::parse(ELBOW).unwrap();
        let wl = WordList::parse_from_str("cat\nant\ntoe");
        let mut solver = Solver::new(&cw, &wl);
        assert!(solver.enforce_consistency());

        // B's chars at offset 0 must be supported by A's chars at offset 1
        // ({a, n, o}), which eliminates "toe" and "cat" from B; propagation
        // then pins A to "cat".
        assert!(!solver.domains().candidates(1).contains("toe"));
        assert_eq!(solver.domains().len(1), 1);
        assert_eq!(solver.domains().sole_candidate(0).as_deref(), Some("cat"));
    }

    #[test]
    fn disagreeing_overlap_fails_without_search() {
        // A = {"dog"}, B = {"cat"}: 'o' vs 'c' at the shared cell.
        let cw = Crossword::parse(ELBOW).unwrap();
        let wl = WordList::parse_from_str("dog\ncat");
        let mut solver = Solver::new(&cw, &wl);

        // "cat" is pruned from B ('c' unsupported by {a, o}) and "dog"/"cat"
        // from A in turn; some domain empties during propagation.
        assert!(!solver.enforce_consistency());
        assert_eq!(solver.solve(), None);
    }

    #[test]
    fn duplicate_words_are_rejected_even_when_letters_match() {
        // Two disjoint across slots of the same length, one usable word:
        // filling both would need "cat" twice.
        let cw = Crossword::parse("___\n###\n___").unwrap();
        let wl = WordList::parse_from_str("cat");
        assert_eq!(solve(&cw, &wl), None);

        // A second distinct word makes it solvable.
        let wl = WordList::parse_from_str("cat\ndog");
        let assignment = solve(&cw, &wl).expect("solvable");
        let words = assignment_words(&cw, &assignment);
        assert_ne!(words[0], words[1]);
    }

    #[test]
    fn failed_search_restores_domains_exactly() {
        // Solvable only until the word list forbids it: two crossing slots,
        // words that pass AC-3 but fail on uniqueness.
        let cw = Crossword::parse("___\n###\n___").unwrap();
        let wl = WordList::parse_from_str("cat");
        let mut solver = Solver::new(&cw, &wl);
        assert!(solver.enforce_consistency());
        let before: Vec<Vec<String>> = (0..cw.slot_count())
            .map(|s| {
                let mut v: Vec<String> =
                    solver.domains().candidates(s).iter().map(|w| w.to_string()).collect();
                v.sort();
                v
            })
            .collect();

        assert_eq!(solver.solve(), None);

        let after: Vec<Vec<String>> = (0..cw.slot_count())
            .map(|s| {
                let mut v: Vec<String> =
                    solver.domains().candidates(s).iter().map(|w| w.to_string()).collect();
                v.sort();
                v
            })
            .collect();
        assert_eq!(after, before);
    }

    #[test]
    fn select_slot_prefers_smaller_domains_then_higher_degree() {
        // Plus-shaped grid: down slot (id 0, degree 1, 2 candidates after
        // node consistency), across slot (id 1, degree 1, 1 candidate).
        let cw = Crossword::parse("##_##\n_____\n##_##").unwrap();
        let wl = WordList::parse_from_str("cat\ndog\napple");
        let mut solver = Solver::new(&cw, &wl);
        solver.domains.enforce_node_consistency(&cw);

        let empty = Assignment::new(cw.slot_count());
        assert_eq!(select_slot(&cw, solver.domains(), &empty), Some(1));

        let mut partial = empty;
        partial.insert(1, Rc::from("apple"));
        assert_eq!(select_slot(&cw, solver.domains(), &partial), Some(0));

        partial.insert(0, Rc::from("cat"));
        assert_eq!(select_slot(&cw, solver.domains(), &partial), None);
    }

    #[test]
    fn order_candidates_tries_least_constraining_first() {
        // A (across) crosses B (down) at A[1] == B[0]. Both domains hold all
        // five words after node consistency.
        let cw = Crossword::parse(ELBOW).unwrap();
        let wl = WordList::parse_from_str("cat\nann\nant\nadd\nnun");
        let mut solver = Solver::new(&cw, &wl);
        solver.domains.enforce_node_consistency(&cw);

        let ordered = order_candidates(&cw, solver.domains(), 0);
        let words: Vec<&str> = ordered.iter().map(AsRef::as_ref).collect();
        assert_eq!(words.len(), 5);
        let pos = |w: &str| words.iter().position(|&x| x == w).unwrap();

        // "cat" (A[1]='a') rules out only the B-words not starting with 'a'
        // ("cat", "nun"); "nun" (A[1]='u') rules out all five.
        assert!(pos("cat") < pos("nun"));
        // "ann" (A[1]='n') rules out everything but "nun", so it sits
        // between the two.
        assert!(pos("cat") < pos("ann"));
        assert!(pos("ann") < pos("nun"));
    }

    #[test]
    fn zero_budget_times_out() {
        let cw = Crossword::parse(ELBOW).unwrap();
        let wl = WordList::parse_from_str("cat\nant\ntoe");
        let mut solver = Solver::new(&cw, &wl);
        assert!(matches!(
            solver.solve_with_budget(Duration::ZERO),
            SolveStatus::TimedOut { .. }
        ));
    }

    #[test]
    fn generous_budget_solves() {
        let cw = Crossword::parse(ELBOW).unwrap();
        let wl = WordList::parse_from_str("cat\nant\ntoe");
        let mut solver = Solver::new(&cw, &wl);
        match solver.solve_with_budget(Duration::from_secs(30)) {
            SolveStatus::Solved(assignment) => assert!(assignment.is_complete()),
            other => panic!("expected a solution, got {other:?}"),
        }
    }

    #[test]
    fn is_consistent_flags_each_invariant() {
        let cw = Crossword::parse(ELBOW).unwrap();
        let mut assignment = Assignment::new(cw.slot_count());
        assert!(is_consistent(&cw, &assignment));

        // Overlap agreement: A[1] vs B[0].
        assignment.insert(0, Rc::from("cat"));
        assignment.insert(1, Rc::from("toe"));
        assert!(!is_consistent(&cw, &assignment));
        assignment.remove(1);
        assignment.insert(1, Rc::from("ant"));
        assert!(is_consistent(&cw, &assignment));

        // Length mismatch.
        assignment.remove(1);
        assignment.insert(1, Rc::from("ants"));
        assert!(!is_consistent(&cw, &assignment));
    }
}
