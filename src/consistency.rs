//! `consistency` — AC-3 arc-consistency propagation over the domain store.
//!
//! An arc `(x, y)` is the obligation that every candidate in x's domain has at
//! least one supporting candidate in y's domain at their overlap offsets. The
//! worklist algorithm here is the classic AC-3 loop: pop an arc, revise it,
//! and when a revision shrinks x's domain, re-enqueue `(z, x)` for every other
//! neighbor z of x, since their previously established consistency may no
//! longer hold against the smaller domain.
//!
//! Two entry points:
//! - [`enforce_arc_consistency`] for the whole-problem run before search
//!   (the removals are permanent);
//! - [`enforce_arc_consistency_logged`] for the restricted run during search
//!   (maintaining arc consistency), where every removal lands in a
//!   [`RemovalLog`] so a failed branch can be rolled back exactly.
//!
//! Worklist order affects only performance, never the result; FIFO works.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::domains::{Domains, RemovalLog};
use crate::grid::{Crossword, SlotId};
use crate::word_list::char_at;

/// A directed consistency obligation from one slot onto another.
pub type Arc = (SlotId, SlotId);

/// Make slot `x` arc-consistent with slot `y`: remove every candidate of `x`
/// with no supporting candidate in `y` at the overlap offsets. A no-op when
/// the slots do not overlap.
///
/// Removals are recorded in `log`. Returns whether x's domain changed.
pub fn revise(
    domains: &mut Domains,
    crossword: &Crossword,
    x: SlotId,
    y: SlotId,
    log: &mut RemovalLog,
) -> bool {
    let Some((kx, ky)) = crossword.overlap(x, y) else {
        return false;
    };

    // Iterate a frozen snapshot of x's candidates; the live set is mutated
    // below.
    let snapshot: Vec<Rc<str>> = domains.candidates(x).iter().cloned().collect();

    let mut revised = false;
    for word in snapshot {
        let c = char_at(&word, kx);
        let supported = domains
            .candidates(y)
            .iter()
            .any(|other| char_at(other, ky) == c);
        if !supported {
            domains.remove_logged(x, &word, log);
            revised = true;
        }
    }
    revised
}

/// Enforce arc consistency across the domain store.
///
/// The worklist starts from `arcs` when supplied, otherwise from every
/// ordered pair of distinct overlapping slots. Returns `false` as soon as any
/// domain is emptied (the problem, or the current branch, is unsatisfiable);
/// `true` once the worklist drains with all domains non-empty.
///
/// Removals are permanent; use [`enforce_arc_consistency_logged`] when the
/// run is speculative.
pub fn enforce_arc_consistency(
    domains: &mut Domains,
    crossword: &Crossword,
    arcs: Option<Vec<Arc>>,
) -> bool {
    let mut log = RemovalLog::new();
    enforce_arc_consistency_logged(domains, crossword, arcs, &mut log)
}

/// [`enforce_arc_consistency`] with every removal recorded in `log`.
///
/// On failure the caller decides whether to roll the log back; this function
/// never restores anything itself.
pub fn enforce_arc_consistency_logged(
    domains: &mut Domains,
    crossword: &Crossword,
    arcs: Option<Vec<Arc>>,
    log: &mut RemovalLog,
) -> bool {
    let mut worklist: VecDeque<Arc> = match arcs {
        Some(arcs) => arcs.into(),
        None => {
            // Non-overlapping pairs revise to a no-op, so seeding neighbors
            // only is equivalent to seeding all ordered pairs.
            (0..crossword.slot_count())
                .flat_map(|x| crossword.neighbors(x).iter().map(move |&y| (x, y)))
                .collect()
        }
    };

    log::debug!("arc consistency: {} initial arcs", worklist.len());

    while let Some((x, y)) = worklist.pop_front() {
        if revise(domains, crossword, x, y, log) {
            if domains.is_empty(x) {
                log::debug!("arc consistency: slot {} emptied", crossword.slot(x));
                return false;
            }
            for &z in crossword.neighbors(x) {
                if z != y {
                    worklist.push_back((z, x));
                }
            }
        }
    }
    true
}
