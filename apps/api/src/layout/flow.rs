//! Flow placement: positions the flow children of a container from its padding,
//! spacing, alignment, grow flags and wrap setting.
//!
//! # Rules
//! - Hidden and absolutely positioned children are never moved.
//! - Growing children share positive leftover space equally; deficits are not taken
//!   out of them.
//! - `Hug` sizing shrinks or grows the container to its content plus padding.

use crate::models::geometry::Axis;
use crate::models::node::{ContentNode, CounterAlign, Positioning, PrimaryAlign, SizingMode};

/// Lays out `node`'s flow children in place. No-op for nodes without a flow layout.
pub fn layout_flow_children(node: &mut ContentNode) {
    let Some(layout) = node.flow_layout.clone() else {
        return;
    };
    let axis = layout.direction;
    let cross = axis.cross();
    let size = node.bounds.size();
    let (pad_start, pad_end) = axis.insets(&layout.padding);
    let (cross_pad_start, cross_pad_end) = cross.insets(&layout.padding);
    let inner_len = (axis.length(&size) - pad_start - pad_end).max(0.0);
    let inner_cross = (cross.length(&size) - cross_pad_start - cross_pad_end).max(0.0);
    let spacing = layout.item_spacing;

    let flow: Vec<usize> = node
        .children
        .iter()
        .enumerate()
        .filter(|(_, c)| c.visible && c.positioning == Positioning::Auto)
        .map(|(i, _)| i)
        .collect();
    if flow.is_empty() {
        return;
    }

    let lines = if layout.wrap {
        break_lines(&node.children, &flow, axis, inner_len, spacing)
    } else {
        vec![flow]
    };

    let mut cross_cursor = cross_pad_start;
    let mut used_primary = 0.0_f64;
    for line in &lines {
        let line_cross = if layout.wrap {
            line.iter()
                .map(|&i| cross.span(&node.children[i].bounds).1)
                .fold(0.0, f64::max)
        } else {
            inner_cross
        };

        let mut lengths: Vec<f64> = line.iter().map(|&i| axis.span(&node.children[i].bounds).1).collect();
        let gaps = line.len().saturating_sub(1) as f64;
        let mut free = inner_len - lengths.iter().sum::<f64>() - spacing * gaps;

        let growers = line.iter().filter(|&&i| node.children[i].layout_grow).count();
        if free > 0.0 && growers > 0 {
            let share = free / growers as f64;
            for (len, &i) in lengths.iter_mut().zip(line) {
                if node.children[i].layout_grow {
                    *len += share;
                }
            }
            free = 0.0;
        }

        let (mut cursor, gap) = match layout.primary_align {
            PrimaryAlign::Min => (pad_start, spacing),
            PrimaryAlign::Center => (pad_start + free / 2.0, spacing),
            PrimaryAlign::Max => (pad_start + free, spacing),
            PrimaryAlign::SpaceBetween if gaps > 0.0 && free > 0.0 => (pad_start, spacing + free / gaps),
            PrimaryAlign::SpaceBetween => (pad_start, spacing),
        };

        for (&i, &len) in line.iter().zip(&lengths) {
            let child = &mut node.children[i];
            let child_cross = cross.span(&child.bounds).1;
            let offset = match layout.counter_align {
                CounterAlign::Min => 0.0,
                CounterAlign::Center => (line_cross - child_cross) / 2.0,
                CounterAlign::Max => line_cross - child_cross,
            };
            child.bounds = axis.compose((cursor, len), (cross_cursor + offset, child_cross));
            cursor += len + gap;
        }

        used_primary = used_primary.max(lengths.iter().sum::<f64>() + spacing * gaps);
        cross_cursor += line_cross + spacing;
    }
    let used_cross = cross_cursor - spacing - cross_pad_start;

    let (mut main_len, mut cross_len) = (axis.length(&size), cross.length(&size));
    if layout.primary_sizing == SizingMode::Hug {
        main_len = used_primary + pad_start + pad_end;
    }
    if layout.counter_sizing == SizingMode::Hug && layout.wrap {
        cross_len = used_cross + cross_pad_start + cross_pad_end;
    } else if layout.counter_sizing == SizingMode::Hug {
        cross_len = lines
            .iter()
            .flatten()
            .map(|&i| cross.span(&node.children[i].bounds).1)
            .fold(0.0, f64::max)
            + cross_pad_start
            + cross_pad_end;
    }
    let (main_start, _) = axis.span(&node.bounds);
    let (cross_start, _) = cross.span(&node.bounds);
    node.bounds = axis.compose((main_start, main_len), (cross_start, cross_len));
}

/// Greedy line breaking: a child starts a new line when it would overflow `inner_len`.
/// A line always holds at least one child.
fn break_lines(children: &[ContentNode], flow: &[usize], axis: Axis, inner_len: f64, spacing: f64) -> Vec<Vec<usize>> {
    let mut lines: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut used = 0.0;
    for &i in flow {
        let len = axis.span(&children[i].bounds).1;
        let needed = if current.is_empty() { len } else { used + spacing + len };
        if !current.is_empty() && needed > inner_len {
            lines.push(std::mem::take(&mut current));
            used = len;
        } else {
            used = needed;
        }
        current.push(i);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Sum of child lengths and spacing along `axis`, excluding padding.
pub fn flow_content_extent(node: &ContentNode, axis: Axis, spacing: f64) -> f64 {
    let lengths: Vec<f64> = node.flow_children().map(|c| axis.span(&c.bounds).1).collect();
    lengths.iter().sum::<f64>() + spacing * lengths.len().saturating_sub(1) as f64
}

/// Largest child length along `axis`.
pub fn flow_cross_extent(node: &ContentNode, axis: Axis) -> f64 {
    node.flow_children()
        .map(|c| axis.span(&c.bounds).1)
        .fold(0.0, f64::max)
}
