//! Padding distribution and flow-container expansion planning.
//!
//! # Rules
//! - Space is conserved: every plan's parts sum back to `total_extra`.
//! - Edges never claim more safe inset than the slack allows; a cramped target
//!   degrades to a split proportional to the per-side floors (half/half when they are
//!   equal) instead of overshooting.
//! - Safe floors are per side. Interior spacing is clamped so both floors are met
//!   whenever the slack covers them.
//! - Values stay fractional here. Rounding to pixels happens once, when a plan is
//!   written back to a node.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Original gaps on the two opposing edges of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeGaps {
    pub start: f64,
    pub end: f64,
}

impl EdgeGaps {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// Extra space assigned to the two edges of one axis. Also used for the minimum
/// extra each edge needs to clear its safe inset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSplit {
    pub start: f64,
    pub end: f64,
}

impl EdgeSplit {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Same floor on both edges; negative insets count as zero.
    pub fn symmetric(inset: f64) -> Self {
        let inset = inset.max(0.0);
        Self { start: inset, end: inset }
    }

    pub fn sum(&self) -> f64 {
        self.start + self.end
    }
}

/// Per-axis allocation of extra space in a flow container.
///
/// `start + end + interior + unallocated == total_extra`. `unallocated` is only
/// non-zero for containers with fewer than two flow children: that slack belongs to
/// the lone child, not to the padding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpansionPlan {
    pub start: f64,
    pub end: f64,
    pub interior: f64,
    pub unallocated: f64,
    /// `base_item_spacing + interior / gap_count`.
    pub item_spacing: f64,
}

impl ExpansionPlan {
    pub fn total(&self) -> f64 {
        self.start + self.end + self.interior + self.unallocated
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Padding distribution
// ────────────────────────────────────────────────────────────────────────────

/// Splits `total_extra` between two opposing edges.
///
/// Each edge first gets `min(safe_inset, total_extra / 2)`. The rest follows the
/// original gap asymmetry so the side that already had more breathing room keeps it;
/// without usable gaps it is split evenly.
pub fn distribute_padding(total_extra: f64, safe_inset: f64, gaps: Option<EdgeGaps>) -> EdgeSplit {
    let inset_per_side = safe_inset.min(total_extra / 2.0);
    let remaining = (total_extra - 2.0 * inset_per_side).max(0.0);
    let weight = gap_weight(gaps);

    EdgeSplit {
        start: inset_per_side + remaining * weight,
        end: inset_per_side + remaining * (1.0 - weight),
    }
}

fn gap_weight(gaps: Option<EdgeGaps>) -> f64 {
    match gaps {
        Some(g) if g.start + g.end > 0.0 => g.start / (g.start + g.end),
        _ => 0.5,
    }
}

/// [`distribute_padding`] with a separate floor per edge, for targets whose safe area
/// is inset unevenly.
///
/// When `total_extra` cannot cover both floors it is shared in proportion to them.
pub fn distribute_padding_with_floors(total_extra: f64, floors: EdgeSplit, gaps: Option<EdgeGaps>) -> EdgeSplit {
    if floors.start == floors.end {
        return distribute_padding(total_extra, floors.start, gaps);
    }
    let floor_sum = floors.sum();
    if total_extra < floor_sum {
        let share = if floor_sum > 0.0 { floors.start / floor_sum } else { 0.5 };
        let start = total_extra * share;
        return EdgeSplit::new(start, total_extra - start);
    }

    let remaining = total_extra - floor_sum;
    let weight = gap_weight(gaps);

    EdgeSplit {
        start: floors.start + remaining * weight,
        end: floors.end + remaining * (1.0 - weight),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Expansion planning
// ────────────────────────────────────────────────────────────────────────────

/// Child count at or below which content counts as sparse.
const SPARSE_CHILD_COUNT: usize = 2;
/// Child count at or above which content counts as dense.
const DENSE_CHILD_COUNT: usize = 6;
const SPARSE_INTERIOR_FRACTION: f64 = 0.7;
const DENSE_INTERIOR_FRACTION: f64 = 0.55;

/// Share of the slack given to interior spacing, by flow child count.
///
/// Sparse content gets the larger share; the fraction falls linearly to the dense
/// value and stays there. Always a majority.
pub fn interior_fraction(flow_child_count: usize) -> f64 {
    if flow_child_count <= SPARSE_CHILD_COUNT {
        return SPARSE_INTERIOR_FRACTION;
    }
    if flow_child_count >= DENSE_CHILD_COUNT {
        return DENSE_INTERIOR_FRACTION;
    }
    let t = (flow_child_count - SPARSE_CHILD_COUNT) as f64
        / (DENSE_CHILD_COUNT - SPARSE_CHILD_COUNT) as f64;
    SPARSE_INTERIOR_FRACTION + (DENSE_INTERIOR_FRACTION - SPARSE_INTERIOR_FRACTION) * t
}

/// Plans how a flow container's padding and spacing absorb `total_extra` on one axis.
///
/// A deficit (`total_extra < 0`) is never taken out of the spacing; the edges absorb it
/// and the caller clamps padding at zero when applying.
pub fn plan_auto_layout_expansion(
    total_extra: f64,
    safe_inset: f64,
    gaps: Option<EdgeGaps>,
    flow_child_count: usize,
    base_item_spacing: f64,
) -> ExpansionPlan {
    plan_auto_layout_expansion_with_floors(
        total_extra,
        EdgeSplit::symmetric(safe_inset),
        gaps,
        flow_child_count,
        base_item_spacing,
    )
}

/// [`plan_auto_layout_expansion`] with a separate safe floor per edge.
///
/// The interior takes its density fraction of the slack, reduced as far as needed for
/// the edges to reach both floors.
pub fn plan_auto_layout_expansion_with_floors(
    total_extra: f64,
    floors: EdgeSplit,
    gaps: Option<EdgeGaps>,
    flow_child_count: usize,
    base_item_spacing: f64,
) -> ExpansionPlan {
    if flow_child_count < 2 {
        let edge_budget = total_extra.min(floors.sum());
        let split = distribute_padding_with_floors(edge_budget, floors, None);
        return ExpansionPlan {
            start: split.start,
            end: split.end,
            interior: 0.0,
            unallocated: total_extra - split.start - split.end,
            item_spacing: base_item_spacing,
        };
    }

    let interior = if total_extra > 0.0 {
        (total_extra * interior_fraction(flow_child_count))
            .min(total_extra - floors.sum())
            .max(0.0)
    } else {
        0.0
    };
    let edge_budget = total_extra - interior;
    let split = distribute_padding_with_floors(edge_budget, floors, gaps);
    let gap_count = flow_child_count.saturating_sub(1).max(1) as f64;

    ExpansionPlan {
        start: split.start,
        // Derived from the budget so the plan sums back exactly.
        end: edge_budget - split.start,
        interior,
        unallocated: 0.0,
        item_spacing: base_item_spacing + interior / gap_count,
    }
}
