//! `domains` — the mutable domain store: each slot's current candidate words.
//!
//! Domains shrink monotonically under node and arc consistency; they only ever
//! grow by rolling back a [`RemovalLog`], which restores exactly the words a
//! speculative inference step pruned. That log is what lets backtracking
//! restore the pre-branch state in O(size of change) instead of deep-copying
//! every domain at every branch.
//!
//! Words are stored as `Rc<str>`: the same allocation is shared across every
//! slot's candidate set, the assignment, and the removal log. The solver is
//! single-threaded, so `Rc` suffices.

use std::collections::HashSet;
use std::rc::Rc;

use crate::grid::{Crossword, SlotId};
use crate::word_list::WordList;

/// Per-slot candidate-word sets, indexed by [`SlotId`].
#[derive(Debug, Clone)]
pub struct Domains {
    sets: Vec<HashSet<Rc<str>>>,
}

impl Domains {
    /// Seed every slot's domain with the full word list.
    ///
    /// Each word is allocated once and shared across all slots.
    #[must_use]
    pub fn new(crossword: &Crossword, word_list: &WordList) -> Domains {
        let shared: Vec<Rc<str>> =
            word_list.words.iter().map(|w| Rc::from(w.as_str())).collect();

        let sets = (0..crossword.slot_count())
            .map(|_| shared.iter().cloned().collect())
            .collect();

        Domains { sets }
    }

    /// Remove from each slot's domain every word whose length differs from
    /// the slot's length. Pure filter, idempotent, run once before arc
    /// consistency.
    pub fn enforce_node_consistency(&mut self, crossword: &Crossword) {
        for (id, set) in self.sets.iter_mut().enumerate() {
            let length = crossword.slot(id).length;
            // Length in characters, not bytes; word lists may carry non-ASCII.
            set.retain(|word| word.chars().count() == length);
            log::debug!(
                "node consistency: slot {} keeps {} candidates",
                crossword.slot(id),
                set.len()
            );
        }
    }

    /// The current candidate set for `slot`.
    #[must_use]
    pub fn candidates(&self, slot: SlotId) -> &HashSet<Rc<str>> {
        &self.sets[slot]
    }

    /// Number of candidates remaining for `slot`.
    #[must_use]
    pub fn len(&self, slot: SlotId) -> usize {
        self.sets[slot].len()
    }

    #[must_use]
    pub fn is_empty(&self, slot: SlotId) -> bool {
        self.sets[slot].is_empty()
    }

    /// Total candidates across all slots. Useful for monotonicity checks.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.sets.iter().map(HashSet::len).sum()
    }

    /// The single remaining candidate for `slot`, if its domain is a
    /// singleton.
    #[must_use]
    pub fn sole_candidate(&self, slot: SlotId) -> Option<Rc<str>> {
        if self.sets[slot].len() == 1 {
            self.sets[slot].iter().next().cloned()
        } else {
            None
        }
    }

    /// Remove `word` from `slot`'s domain, recording the removal so it can be
    /// rolled back.
    pub(crate) fn remove_logged(&mut self, slot: SlotId, word: &Rc<str>, log: &mut RemovalLog) {
        if self.sets[slot].remove(word) {
            log.entries.push((slot, Rc::clone(word)));
        }
    }

    /// Reinstate a previously removed word. Only the rollback path uses this.
    fn reinstate(&mut self, slot: SlotId, word: Rc<str>) {
        let fresh = self.sets[slot].insert(word);
        debug_assert!(fresh, "rollback reinserted a word that was never removed");
    }
}

/// An undo log of domain removals: every `(slot, word)` pruned during one
/// speculative inference step, in removal order.
#[derive(Debug, Default)]
pub struct RemovalLog {
    entries: Vec<(SlotId, Rc<str>)>,
}

impl RemovalLog {
    #[must_use]
    pub fn new() -> RemovalLog {
        RemovalLog::default()
    }

    /// Number of removals recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replay all recorded removals in reverse, restoring `domains` to the
    /// exact state it had when this log was created. Consumes the log.
    pub fn rollback(self, domains: &mut Domains) {
        for (slot, word) in self.entries.into_iter().rev() {
            domains.reinstate(slot, word);
        }
    }
}
