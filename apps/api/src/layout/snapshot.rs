//! Auto-layout snapshots.
//!
//! A flow container's settings are captured once before it is scaled and consumed
//! exactly once to restore the scaled values. The store is the only state shared
//! between the steps of a retarget pass and is passed explicitly down the call chain.

use std::collections::HashMap;

use serde::Serialize;

use crate::errors::EngineError;
use crate::layout::padding::ExpansionPlan;
use crate::models::geometry::{Axis, Insets};
use crate::models::node::{ContentNode, FlowLayout};

/// Values this close below a whole pixel count as that pixel when rounding down.
const PIXEL_SNAP: f64 = 1e-6;

/// Immutable capture of one flow container's layout at the start of a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoLayoutSnapshot {
    pub node_id: String,
    pub layout: FlowLayout,
    pub flow_child_count: usize,
    pub absolute_child_count: usize,
}

/// Planned extra space for both axes of a flow container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisPlans {
    pub primary: ExpansionPlan,
    pub counter: ExpansionPlan,
}

impl AutoLayoutSnapshot {
    /// Scaled layout with optional expansion plans folded in.
    ///
    /// This is the only place padding and spacing are rounded to whole pixels. Padding
    /// never goes negative. Planned spacing rounds down, so the children never run past
    /// the end padding.
    pub fn restore(&self, scale: f64, plans: Option<&AxisPlans>) -> FlowLayout {
        let base_padding = self.layout.padding.scaled(scale);
        let base_spacing = self.layout.item_spacing * scale;

        let (padding, spacing) = match plans {
            None => (base_padding, base_spacing.round()),
            Some(plans) => {
                let mut padding = base_padding;
                add_to_axis(&mut padding, self.layout.direction, &plans.primary);
                add_to_axis(&mut padding, self.layout.direction.cross(), &plans.counter);
                (padding, (plans.primary.item_spacing + PIXEL_SNAP).floor())
            }
        };

        FlowLayout {
            item_spacing: spacing.max(0.0),
            padding: padding.clamp_non_negative().rounded(),
            ..self.layout.clone()
        }
    }
}

fn add_to_axis(padding: &mut Insets, axis: Axis, plan: &ExpansionPlan) {
    match axis {
        Axis::Horizontal => {
            padding.left += plan.start;
            padding.right += plan.end;
        }
        Axis::Vertical => {
            padding.top += plan.start;
            padding.bottom += plan.end;
        }
    }
}

/// Write-once-read-once map of snapshots keyed by node id.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: HashMap<String, AutoLayoutSnapshot>,
}

impl SnapshotStore {
    /// Captures `node`'s flow layout. A snapshot exists only for nodes that were in flow
    /// mode, and only once per pass.
    pub fn capture(&mut self, node: &ContentNode) -> Result<&AutoLayoutSnapshot, EngineError> {
        let layout = node
            .flow_layout
            .clone()
            .ok_or_else(|| EngineError::NotAFlowContainer(node.id.clone()))?;

        if self.snapshots.contains_key(&node.id) {
            return Err(EngineError::SnapshotAlreadyCaptured(node.id.clone()));
        }

        let (flow_child_count, absolute_child_count) = node.child_counts();
        let snapshot = AutoLayoutSnapshot {
            node_id: node.id.clone(),
            layout,
            flow_child_count,
            absolute_child_count,
        };
        Ok(self.snapshots.entry(node.id.clone()).or_insert(snapshot))
    }

    /// Consumes the snapshot for `node_id`.
    pub fn take(&mut self, node_id: &str) -> Result<AutoLayoutSnapshot, EngineError> {
        self.snapshots
            .remove(node_id)
            .ok_or_else(|| EngineError::SnapshotMissing(node_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geometry::Rect;
    use crate::models::node::NodeType;

    fn make_flow_frame() -> ContentNode {
        ContentNode::new("stack", NodeType::Frame, Rect::new(0.0, 0.0, 400.0, 400.0))
            .with_flow_layout(FlowLayout {
                direction: Axis::Vertical,
                primary_sizing: Default::default(),
                counter_sizing: Default::default(),
                wrap: false,
                primary_align: Default::default(),
                counter_align: Default::default(),
                item_spacing: 10.0,
                padding: Insets::new(20.0, 20.0, 30.0, 10.0),
            })
            .with_children(vec![
                ContentNode::new("a", NodeType::Text, Rect::new(20.0, 30.0, 100.0, 20.0)),
                ContentNode::new("b", NodeType::Text, Rect::new(20.0, 60.0, 100.0, 20.0)),
            ])
    }

    #[test]
    fn test_capture_then_take_once() {
        let frame = make_flow_frame();
        let mut store = SnapshotStore::default();
        let snap = store.capture(&frame).unwrap();
        assert_eq!(snap.flow_child_count, 2);
        assert_eq!(snap.absolute_child_count, 0);

        assert!(store.take("stack").is_ok());
        assert_eq!(
            store.take("stack"),
            Err(EngineError::SnapshotMissing("stack".to_string()))
        );
    }

    #[test]
    fn test_double_capture_fails_fast() {
        let frame = make_flow_frame();
        let mut store = SnapshotStore::default();
        store.capture(&frame).unwrap();
        assert_eq!(
            store.capture(&frame).map(|_| ()),
            Err(EngineError::SnapshotAlreadyCaptured("stack".to_string()))
        );
    }

    #[test]
    fn test_capture_requires_flow_mode() {
        let node = ContentNode::new("free", NodeType::Frame, Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut store = SnapshotStore::default();
        assert_eq!(
            store.capture(&node).map(|_| ()),
            Err(EngineError::NotAFlowContainer("free".to_string()))
        );
        assert_eq!(
            store.take("free").map(|_| ()),
            Err(EngineError::SnapshotMissing("free".to_string()))
        );
    }

    #[test]
    fn test_restore_scales_and_rounds() {
        let frame = make_flow_frame();
        let mut store = SnapshotStore::default();
        store.capture(&frame).unwrap();
        let snap = store.take("stack").unwrap();

        let layout = snap.restore(1.5, None);
        assert_eq!(layout.item_spacing, 15.0);
        assert_eq!(layout.padding, Insets::new(30.0, 30.0, 45.0, 15.0));
        assert_eq!(layout.direction, Axis::Vertical);
    }

    #[test]
    fn test_restore_applies_plans_and_clamps_negative_padding() {
        let frame = make_flow_frame();
        let mut store = SnapshotStore::default();
        store.capture(&frame).unwrap();
        let snap = store.take("stack").unwrap();

        let plans = AxisPlans {
            primary: ExpansionPlan {
                start: 10.4,
                end: -50.0,
                interior: 0.0,
                unallocated: 0.0,
                item_spacing: 22.6,
            },
            counter: ExpansionPlan {
                start: 5.0,
                end: 5.0,
                interior: 0.0,
                unallocated: 0.0,
                item_spacing: 0.0,
            },
        };
        let layout = snap.restore(1.0, Some(&plans));
        assert_eq!(layout.padding.top, 40.0);
        assert_eq!(layout.padding.bottom, 0.0, "padding must never be negative");
        assert_eq!(layout.padding.left, 25.0);
        assert_eq!(layout.item_spacing, 22.0, "planned spacing rounds down");
    }
}
