//! Absolute child planning — repositions freely placed children of a container that
//! has no flow layout.
//!
//! Absolute layouts are left alone unless the shape change demands reflow. When a
//! side-by-side arrangement lands on a very tall canvas it is restacked vertically
//! (and a stacked arrangement on a very wide canvas is laid out as a row). Proximity
//! clusters move as units so related elements stay together.

use serde::Serialize;

use crate::layout::grouping::{detect_element_groups, optimize_group_sizes, ElementGroup, GroupedElement};
use crate::layout::profile::{is_extreme_horizontal, is_extreme_vertical, LayoutProfile};
use crate::models::geometry::{Axis, Rect};

/// Smallest gap between restacked groups, as a fraction of the stacking length.
const MIN_STACK_GAP_FRACTION: f64 = 0.02;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Closed interval on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn of(rect: &Rect, axis: Axis) -> Self {
        let (start, length) = axis.span(rect);
        Self::new(start, start + length)
    }

    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrangement {
    Single,
    SideBySide,
    Stacked,
}

#[derive(Debug, Clone)]
pub struct AbsolutePlanInput<'a> {
    /// Destination profile.
    pub profile: LayoutProfile,
    pub safe_bounds: Rect,
    /// Children already mapped into destination coordinates.
    pub children: &'a [GroupedElement],
    pub target_aspect_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildPosition {
    pub id: String,
    pub bounds: Rect,
}

// ────────────────────────────────────────────────────────────────────────────
// Point mapping
// ────────────────────────────────────────────────────────────────────────────

/// Maps `center` proportionally from `source` to `dest`.
///
/// A zero-size source collapses to the destination midpoint.
pub fn scale_center_to_range(center: f64, source: Span, dest: Span) -> f64 {
    let source_len = source.len();
    if source_len.abs() < f64::EPSILON {
        return dest.midpoint();
    }
    dest.start + (center - source.start) / source_len * dest.len()
}

/// Moves `bounds` so its centre keeps its relative place when `source` becomes `dest`,
/// scaling its size by `scale`.
pub fn map_bounds_between(bounds: &Rect, source: &Rect, dest: &Rect, scale: f64) -> Rect {
    let center = bounds.center();
    let cx = scale_center_to_range(
        center.x,
        Span::of(source, Axis::Horizontal),
        Span::of(dest, Axis::Horizontal),
    );
    let cy = scale_center_to_range(
        center.y,
        Span::of(source, Axis::Vertical),
        Span::of(dest, Axis::Vertical),
    );
    let width = bounds.width * scale;
    let height = bounds.height * scale;
    Rect::new(cx - width / 2.0, cy - height / 2.0, width, height)
}

// ────────────────────────────────────────────────────────────────────────────
// Planning
// ────────────────────────────────────────────────────────────────────────────

/// Side-by-side when the group centroids spread further horizontally than vertically.
pub fn detect_arrangement(groups: &[ElementGroup]) -> Arrangement {
    if groups.len() < 2 {
        return Arrangement::Single;
    }
    let (mut min_x, mut max_x, mut min_y, mut max_y) =
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
    for g in groups {
        min_x = min_x.min(g.centroid.x);
        max_x = max_x.max(g.centroid.x);
        min_y = min_y.min(g.centroid.y);
        max_y = max_y.max(g.centroid.y);
    }
    if max_x - min_x > max_y - min_y {
        Arrangement::SideBySide
    } else {
        Arrangement::Stacked
    }
}

/// Decides the stacking axis a destination demands, if any.
fn reflow_axis(profile: LayoutProfile, target_aspect_ratio: Option<f64>) -> Option<Axis> {
    match target_aspect_ratio {
        Some(r) if is_extreme_vertical(r) => Some(Axis::Vertical),
        Some(r) if is_extreme_horizontal(r) => Some(Axis::Horizontal),
        Some(_) => None,
        None => match profile {
            LayoutProfile::Vertical => Some(Axis::Vertical),
            LayoutProfile::Horizontal => Some(Axis::Horizontal),
            LayoutProfile::Square => None,
        },
    }
}

/// Plans destination positions for absolutely positioned children.
///
/// Returns the input positions unchanged unless the destination demands a reflow the
/// current arrangement does not already satisfy.
pub fn plan_absolute_child_positions(input: &AbsolutePlanInput<'_>) -> Vec<ChildPosition> {
    let unchanged = || {
        input
            .children
            .iter()
            .map(|c| ChildPosition {
                id: c.id.clone(),
                bounds: c.bounds,
            })
            .collect::<Vec<_>>()
    };

    let Some(axis) = reflow_axis(input.profile, input.target_aspect_ratio) else {
        return unchanged();
    };

    let groups = optimize_group_sizes(detect_element_groups(input.children));
    let needs_reflow = match (axis, detect_arrangement(&groups)) {
        (Axis::Vertical, Arrangement::SideBySide) => true,
        (Axis::Horizontal, Arrangement::Stacked) => true,
        _ => false,
    };
    if !needs_reflow {
        return unchanged();
    }

    tracing::debug!(
        groups = groups.len(),
        axis = ?axis,
        "Reflowing absolute children into a stack"
    );
    stack_groups(groups, axis, &input.safe_bounds)
}

/// Lays groups out along `axis` inside `safe`: first group at the safe start, last at
/// the safe end, each centred on the cross axis. Groups shrink uniformly when they do
/// not fit.
fn stack_groups(mut groups: Vec<ElementGroup>, axis: Axis, safe: &Rect) -> Vec<ChildPosition> {
    let cross = axis.cross();
    groups.sort_by(|a, b| {
        let (a_main, _) = axis.span(&a.bounds);
        let (b_main, _) = axis.span(&b.bounds);
        let (a_cross, _) = cross.span(&a.bounds);
        let (b_cross, _) = cross.span(&b.bounds);
        a_main.total_cmp(&b_main).then(a_cross.total_cmp(&b_cross))
    });

    let (safe_main_start, available) = axis.span(safe);
    let (safe_cross_start, safe_cross_len) = cross.span(safe);
    let n = groups.len();

    let total_main: f64 = groups.iter().map(|g| axis.span(&g.bounds).1).sum();
    let max_cross = groups
        .iter()
        .map(|g| cross.span(&g.bounds).1)
        .fold(0.0_f64, f64::max);

    let min_gap = available * MIN_STACK_GAP_FRACTION;
    let gaps_needed = min_gap * n.saturating_sub(1) as f64;

    let mut shrink = 1.0_f64;
    if total_main > 0.0 && total_main + gaps_needed > available {
        shrink = shrink.min(((available - gaps_needed) / total_main).max(0.0));
    }
    if max_cross > safe_cross_len && max_cross > 0.0 {
        shrink = shrink.min(safe_cross_len / max_cross);
    }

    let used = total_main * shrink;
    let gap = if n > 1 {
        ((available - used) / (n - 1) as f64).max(0.0)
    } else {
        0.0
    };
    let mut cursor = if n == 1 {
        safe_main_start + (available - used) / 2.0
    } else {
        safe_main_start
    };

    let mut positions = Vec::new();
    for group in &groups {
        let (group_main_start, group_main_len) = axis.span(&group.bounds);
        let (group_cross_start, group_cross_len) = cross.span(&group.bounds);
        let new_cross_start = safe_cross_start + (safe_cross_len - group_cross_len * shrink) / 2.0;

        for element in &group.elements {
            let (main_off, main_len) = axis.span(&element.bounds);
            let (cross_off, cross_len) = cross.span(&element.bounds);
            let main = cursor + (main_off - group_main_start) * shrink;
            let cross_pos = new_cross_start + (cross_off - group_cross_start) * shrink;
            let bounds = match axis {
                Axis::Vertical => Rect::new(cross_pos, main, cross_len * shrink, main_len * shrink),
                Axis::Horizontal => Rect::new(main, cross_pos, main_len * shrink, cross_len * shrink),
            };
            positions.push(ChildPosition {
                id: element.id.clone(),
                bounds,
            });
        }
        cursor += group_main_len * shrink + gap;
    }
    positions
}
