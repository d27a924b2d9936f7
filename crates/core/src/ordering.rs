//! Panel ordering invariant and continuity-window selection.
//!
//! For a fixed episode the set of panel `sort_order` values must equal
//! `{0, 1, …, count-1}` at the end of every committed operation. The
//! helpers here compute append positions, the renumber plan after a
//! delete, and the window of preceding panels used as continuity
//! references.

use crate::types::DbId;

/// Maximum number of preceding panels attached as continuity references.
pub const CONTINUITY_PANEL_COUNT: usize = 2;

// ---------------------------------------------------------------------------
// Invariant checks
// ---------------------------------------------------------------------------

/// Whether a set of order values is exactly `{0..len-1}`.
///
/// Input order does not matter; duplicates and gaps both fail.
pub fn is_contiguous(orders: &[i32]) -> bool {
    let mut sorted: Vec<i32> = orders.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(i, &order)| order == i as i32)
}

/// Order value for a panel appended to an episode with `count` panels.
pub fn append_order(count: usize) -> i32 {
    count as i32
}

// ---------------------------------------------------------------------------
// Renumbering
// ---------------------------------------------------------------------------

/// Compute the renumber plan after removing one panel.
///
/// `remaining` is the surviving panels as `(id, old_order)` pairs sorted
/// by `old_order` ascending. Returns `(id, new_order)` for only the
/// rows whose order changes; relative sequence is preserved, indices
/// shift down to fill the gap.
pub fn renumber_after_removal(remaining: &[(DbId, i32)]) -> Vec<(DbId, i32)> {
    remaining
        .iter()
        .enumerate()
        .filter(|(index, (_, old_order))| *old_order != *index as i32)
        .map(|(index, (id, _))| (*id, index as i32))
        .collect()
}

// ---------------------------------------------------------------------------
// Continuity windows
// ---------------------------------------------------------------------------

/// Which preceding panels condition a generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuityMode {
    /// A new panel: the last panels currently in the episode.
    Append,
    /// An edit of the panel at this position (its position when editing
    /// started, not recomputed afterwards).
    EditAt(usize),
}

/// Index range (into the episode's order-sorted panel list) of the
/// continuity references for a generation call.
///
/// At most [`CONTINUITY_PANEL_COUNT`] panels, always the ones
/// immediately before the insertion point or edited position.
pub fn continuity_range(panel_count: usize, mode: ContinuityMode) -> std::ops::Range<usize> {
    let end = match mode {
        ContinuityMode::Append => panel_count,
        ContinuityMode::EditAt(position) => position.min(panel_count),
    };
    end.saturating_sub(CONTINUITY_PANEL_COUNT)..end
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
