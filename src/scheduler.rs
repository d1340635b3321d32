//! Reconciliation: mapping desired regions onto the slot pool.
//!
//! The scheduler holds no state of its own. [`plan`] reads one consistent
//! snapshot of the pool and produces a full [`ReconcilePlan`] before any
//! command is issued (read-then-act); [`route_focus`] computes the mute
//! flag every span-holding slot should carry for a given focus cell.
//!
//! Matching is greedy with priority tiers, and the tier order is
//! user-visible: a slot already showing a region's URL is reused in place,
//! which is what prevents reloads and flicker when a layout reshapes
//! without changing content.

use crate::command::CellRef;
use crate::layout::Region;
use crate::slot::{Slot, SlotPhase};

/// The commands one reconciliation pass will issue, computed up front from
/// a single snapshot of the pool.
#[derive(Debug)]
pub struct ReconcilePlan {
    /// `(slot index, region)` pairs: each slot receives a display command
    /// for its region.
    pub assignments: Vec<(usize, Region)>,
    /// Slots left unclaimed by every region; each receives a clear.
    pub clears: Vec<usize>,
}

/// Assign `regions` to slots, preferring minimal disruption.
///
/// Per region, in region order:
///   1. an unclaimed slot whose current URL equals the region's URL (any
///      lifecycle phase) — reuse avoids a reload;
///   2. else an unclaimed slot not currently `Displaying` — disrupt a slot
///      that is not yet fully showing content over one that is;
///   3. else any unclaimed slot — an already-displaying slot is repurposed
///      rather than the region dropped.
/// Ties break toward the lowest slot index.
///
/// The caller must ensure `regions.len() <= slots.len()`; the wall rejects
/// oversized layouts before planning. A region that still finds no slot is
/// dropped from the plan (and the debug build asserts).
pub fn plan(slots: &[Slot], regions: Vec<Region>) -> ReconcilePlan {
    let mut unclaimed: Vec<usize> = (0..slots.len()).collect();
    let mut assignments = Vec::with_capacity(regions.len());

    for region in regions {
        let pick = unclaimed
            .iter()
            .position(|&i| slots[i].url() == Some(region.url.as_str()))
            .or_else(|| {
                unclaimed
                    .iter()
                    .position(|&i| slots[i].phase() != SlotPhase::Displaying)
            })
            .or(if unclaimed.is_empty() { None } else { Some(0) });

        match pick {
            Some(p) => {
                let slot = unclaimed.remove(p);
                assignments.push((slot, region));
            }
            None => {
                debug_assert!(false, "region count exceeds pool capacity");
                log::warn!("no slot left for region showing {}", region.url);
            }
        }
    }

    ReconcilePlan {
        assignments,
        clears: unclaimed,
    }
}

/// Compute the desired mute flag for every slot holding a span.
///
/// A slot is unmuted exactly when its span contains `focus`. Loading slots
/// are routed along with displaying ones so audio is correct the moment
/// their content appears. Idle slots hold no span and are skipped.
pub fn route_focus(slots: &[Slot], focus: CellRef) -> Vec<(usize, bool)> {
    slots
        .iter()
        .filter(|s| !s.span().is_empty())
        .map(|s| (s.index(), !s.span().contains(&focus)))
        .collect()
}

//  Tests
