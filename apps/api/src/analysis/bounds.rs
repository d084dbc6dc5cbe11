//! Content box: the tightest rectangle over the nodes that are real content.

use crate::analysis::roles::RoleClassifier;
use crate::models::geometry::Rect;
use crate::models::node::{ContentNode, FillKind};

/// Bounding box of `frame`'s content in `frame`'s own coordinate space (its top-left is
/// the origin). Hidden nodes, overlays, hero bleeds, backgrounds and decorative nodes are
/// skipped together with their subtrees. Unfilled containers are looked through rather
/// than counted whole. `None` when nothing qualifies.
pub fn combine_child_bounds(frame: &ContentNode, classifier: &RoleClassifier) -> Option<Rect> {
    let mut acc: Option<Rect> = None;
    collect(frame, 0.0, 0.0, classifier, &mut acc);
    acc
}

fn collect(
    parent: &ContentNode,
    offset_x: f64,
    offset_y: f64,
    classifier: &RoleClassifier,
    acc: &mut Option<Rect>,
) {
    for (z_index, child) in parent.children.iter().enumerate() {
        if !child.visible {
            continue;
        }
        if classifier.classify(child, z_index).role.is_excluded_from_content() {
            continue;
        }

        let absolute = child.bounds.translated(offset_x, offset_y);
        if !child.children.is_empty() && child.fill == FillKind::None {
            collect(child, absolute.x, absolute.y, classifier, acc);
            continue;
        }
        if !absolute.is_finite() {
            continue;
        }
        *acc = Some(match acc {
            Some(rect) => rect.union(&absolute),
            None => absolute,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::node::{AuthoringTag, NodeType};
    use crate::signals::models::{AiSignals, RoleAssignment};
    use crate::signals::SemanticRole;

    fn make_frame(children: Vec<ContentNode>) -> ContentNode {
        ContentNode::new("frame", NodeType::Frame, Rect::new(0.0, 0.0, 1000.0, 1000.0))
            .with_children(children)
    }

    fn text(id: &str, x: f64, y: f64) -> ContentNode {
        ContentNode::new(id, NodeType::Text, Rect::new(x, y, 200.0, 40.0))
    }

    #[test]
    fn test_empty_frame_has_no_content_box() {
        let frame = make_frame(vec![]);
        let classifier = RoleClassifier::new(&frame, None, 0.6);
        assert_eq!(combine_child_bounds(&frame, &classifier), None);
    }

    #[test]
    fn test_background_and_overlay_excluded() {
        let frame = make_frame(vec![
            ContentNode::new("bg", NodeType::Rectangle, Rect::new(0.0, 0.0, 1000.0, 1000.0))
                .with_fill(FillKind::Image),
            text("headline", 100.0, 200.0),
            ContentNode::new("chrome", NodeType::Frame, Rect::new(0.0, 900.0, 1000.0, 100.0))
                .with_tag(AuthoringTag::Overlay),
        ]);
        let classifier = RoleClassifier::new(&frame, None, 0.6);
        let rect = combine_child_bounds(&frame, &classifier).unwrap();
        assert_eq!(rect, Rect::new(100.0, 200.0, 200.0, 40.0));
    }

    #[test]
    fn test_nested_groups_use_absolute_offsets() {
        let group = ContentNode::new("group", NodeType::Group, Rect::new(300.0, 400.0, 400.0, 200.0))
            .with_children(vec![text("a", 0.0, 0.0), text("b", 150.0, 100.0)]);
        let frame = make_frame(vec![text("top", 100.0, 50.0), group]);
        let classifier = RoleClassifier::new(&frame, None, 0.6);
        let rect = combine_child_bounds(&frame, &classifier).unwrap();
        assert_eq!(rect.x, 100.0);
        assert_eq!(rect.y, 50.0);
        assert_eq!(rect.right(), 650.0);
        assert_eq!(rect.bottom(), 540.0);
    }

    #[test]
    fn test_hidden_and_ai_decorative_excluded() {
        let mut hidden = text("hidden", 0.0, 0.0);
        hidden.visible = false;
        let frame = make_frame(vec![
            hidden,
            text("keep", 400.0, 400.0),
            ContentNode::new("swirl", NodeType::Vector, Rect::new(900.0, 900.0, 50.0, 50.0)),
        ]);
        let signals = AiSignals {
            roles: vec![RoleAssignment {
                node_id: "swirl".into(),
                role: SemanticRole::Decorative,
                confidence: 0.9,
            }],
            ..Default::default()
        };
        let classifier = RoleClassifier::new(&frame, Some(&signals), 0.6);
        let rect = combine_child_bounds(&frame, &classifier).unwrap();
        assert_eq!(rect, Rect::new(400.0, 400.0, 200.0, 40.0));
    }
}
