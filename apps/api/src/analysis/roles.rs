//! Role classification.
//!
//! # Rules
//! - Authoring tags always win.
//! - Then a sanitized AI role at or above the configured confidence.
//! - Then the structural background score.
//! - Everything else is plain content.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::node::{AuthoringTag, ContentNode, FillKind};
use crate::signals::{AiSignals, SemanticRole};

/// Minimum share of the root frame a node must cover before it can read as background.
pub const BACKGROUND_MIN_COVERAGE: f64 = 0.9;
/// Combined weight of supporting signals needed once the coverage gate passes.
pub const BACKGROUND_ACCEPTANCE_BAR: f64 = 1.0;

const BACKGROUND_KEYWORDS: &[&str] = &["background", "bg", "backdrop", "canvas", "base", "fill"];

const WEIGHT_BOTTOM_OF_STACK: f64 = 1.0;
const WEIGHT_IMAGE_OR_GRADIENT: f64 = 1.0;
const WEIGHT_NO_TEXT: f64 = 1.0;
const WEIGHT_NAME_MATCH: f64 = 1.0;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Overlay,
    HeroBleed,
    Subject,
    Hero,
    HeroImage,
    Background,
    Decorative,
    /// Any other AI-assigned role; informative only.
    Semantic(SemanticRole),
    Content,
}

impl NodeRole {
    /// Exempt from safe-area checks.
    pub fn is_safe_area_exempt(self) -> bool {
        matches!(self, NodeRole::Overlay | NodeRole::HeroBleed)
    }

    /// Never part of the content box.
    pub fn is_excluded_from_content(self) -> bool {
        matches!(
            self,
            NodeRole::Overlay | NodeRole::HeroBleed | NodeRole::Background | NodeRole::Decorative
        )
    }

    /// Hero and subject imagery the leaderboard kill switch hides.
    pub fn is_hero_content(self) -> bool {
        matches!(
            self,
            NodeRole::Subject | NodeRole::Hero | NodeRole::HeroImage | NodeRole::HeroBleed
        )
    }

    fn from_tag(tag: AuthoringTag) -> Self {
        match tag {
            AuthoringTag::Overlay => NodeRole::Overlay,
            AuthoringTag::HeroBleed => NodeRole::HeroBleed,
            AuthoringTag::Subject => NodeRole::Subject,
            AuthoringTag::Hero => NodeRole::Hero,
            AuthoringTag::HeroImage => NodeRole::HeroImage,
        }
    }

    fn from_semantic(role: SemanticRole) -> Self {
        match role {
            SemanticRole::Hero => NodeRole::Hero,
            SemanticRole::HeroImage => NodeRole::HeroImage,
            SemanticRole::Subject => NodeRole::Subject,
            SemanticRole::Background => NodeRole::Background,
            SemanticRole::Decorative => NodeRole::Decorative,
            SemanticRole::Overlay => NodeRole::Overlay,
            other => NodeRole::Semantic(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSource {
    Tag,
    Ai,
    Heuristic,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedRole {
    pub role: NodeRole,
    pub source: RoleSource,
}

// ────────────────────────────────────────────────────────────────────────────
// Background scoring
// ────────────────────────────────────────────────────────────────────────────

/// Every input the background heuristic weighs, extracted so each can be tested alone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BackgroundSignals {
    /// Node area over root frame area.
    pub coverage: f64,
    pub bottom_of_stack: bool,
    pub image_or_gradient_fill: bool,
    pub contains_text: bool,
    pub name_matches: bool,
}

impl BackgroundSignals {
    pub fn from_node(node: &ContentNode, z_index: usize, root_area: f64) -> Self {
        let coverage = if root_area > 0.0 {
            node.bounds.area() / root_area
        } else {
            0.0
        };
        Self {
            coverage,
            bottom_of_stack: z_index == 0,
            image_or_gradient_fill: matches!(node.fill, FillKind::Image | FillKind::Gradient),
            contains_text: node.contains_text(),
            name_matches: name_matches_background(&node.name),
        }
    }
}

/// Whole-word match against the background keyword list.
pub fn name_matches_background(name: &str) -> bool {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| BACKGROUND_KEYWORDS.contains(&word))
}

/// Zero below the coverage gate, otherwise the summed weight of supporting signals.
pub fn background_score(signals: &BackgroundSignals) -> f64 {
    if signals.coverage < BACKGROUND_MIN_COVERAGE {
        return 0.0;
    }
    let mut score = 0.0;
    if signals.bottom_of_stack {
        score += WEIGHT_BOTTOM_OF_STACK;
    }
    if signals.image_or_gradient_fill {
        score += WEIGHT_IMAGE_OR_GRADIENT;
    }
    if !signals.contains_text {
        score += WEIGHT_NO_TEXT;
    }
    if signals.name_matches {
        score += WEIGHT_NAME_MATCH;
    }
    score
}

pub fn is_background_like(signals: &BackgroundSignals) -> bool {
    background_score(signals) >= BACKGROUND_ACCEPTANCE_BAR
}

// ────────────────────────────────────────────────────────────────────────────
// Classifier
// ────────────────────────────────────────────────────────────────────────────

/// Resolves node roles for one content tree.
#[derive(Debug, Clone, Default)]
pub struct RoleClassifier {
    root_area: f64,
    ai_roles: HashMap<String, SemanticRole>,
}

impl RoleClassifier {
    /// `root` is the frame whose area drives background coverage. AI roles below
    /// `min_confidence` are discarded up front; of several roles for one node the most
    /// confident wins.
    pub fn new(root: &ContentNode, signals: Option<&AiSignals>, min_confidence: f64) -> Self {
        let mut best: HashMap<String, (SemanticRole, f64)> = HashMap::new();
        for assignment in signals.map(|s| s.roles.as_slice()).unwrap_or_default() {
            if assignment.confidence < min_confidence {
                continue;
            }
            let entry = best
                .entry(assignment.node_id.clone())
                .or_insert((assignment.role, assignment.confidence));
            if assignment.confidence > entry.1 {
                *entry = (assignment.role, assignment.confidence);
            }
        }

        Self {
            root_area: root.bounds.area(),
            ai_roles: best.into_iter().map(|(id, (role, _))| (id, role)).collect(),
        }
    }

    /// Re-keys AI roles from source ids to clone ids. `clone_to_source` maps each clone
    /// id to the source id it was copied from; roles for unmapped ids are dropped.
    pub fn rekeyed(mut self, clone_to_source: &HashMap<String, String>) -> Self {
        let by_source = std::mem::take(&mut self.ai_roles);
        self.ai_roles = clone_to_source
            .iter()
            .filter_map(|(clone_id, source_id)| {
                by_source.get(source_id).map(|role| (clone_id.clone(), *role))
            })
            .collect();
        self
    }

    pub fn ai_role(&self, node_id: &str) -> Option<SemanticRole> {
        self.ai_roles.get(node_id).copied()
    }

    /// `z_index` is the node's position among its siblings, 0 being the bottom.
    pub fn classify(&self, node: &ContentNode, z_index: usize) -> ResolvedRole {
        const TAG_PRIORITY: [AuthoringTag; 5] = [
            AuthoringTag::Overlay,
            AuthoringTag::HeroBleed,
            AuthoringTag::Subject,
            AuthoringTag::HeroImage,
            AuthoringTag::Hero,
        ];
        if let Some(tag) = TAG_PRIORITY.into_iter().find(|t| node.has_tag(*t)) {
            return ResolvedRole {
                role: NodeRole::from_tag(tag),
                source: RoleSource::Tag,
            };
        }

        if let Some(role) = self.ai_role(&node.id) {
            return ResolvedRole {
                role: NodeRole::from_semantic(role),
                source: RoleSource::Ai,
            };
        }

        if is_background_like(&BackgroundSignals::from_node(node, z_index, self.root_area)) {
            return ResolvedRole {
                role: NodeRole::Background,
                source: RoleSource::Heuristic,
            };
        }

        ResolvedRole {
            role: NodeRole::Content,
            source: RoleSource::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geometry::Rect;
    use crate::models::node::NodeType;
    use crate::signals::models::RoleAssignment;

    fn make_root() -> ContentNode {
        ContentNode::new("root", NodeType::Frame, Rect::new(0.0, 0.0, 1000.0, 1000.0))
    }

    fn make_signals(roles: &[(&str, SemanticRole, f64)]) -> AiSignals {
        AiSignals {
            roles: roles
                .iter()
                .map(|(id, role, confidence)| RoleAssignment {
                    node_id: id.to_string(),
                    role: *role,
                    confidence: *confidence,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn full_bleed(id: &str) -> ContentNode {
        ContentNode::new(id, NodeType::Rectangle, Rect::new(0.0, 0.0, 1000.0, 960.0))
    }

    #[test]
    fn test_score_is_zero_below_coverage_gate() {
        let signals = BackgroundSignals {
            coverage: 0.89,
            bottom_of_stack: true,
            image_or_gradient_fill: true,
            contains_text: false,
            name_matches: true,
        };
        assert_eq!(background_score(&signals), 0.0);
    }

    #[test]
    fn test_each_supporting_signal_alone_clears_the_bar() {
        let base = BackgroundSignals {
            coverage: 0.95,
            contains_text: true,
            ..Default::default()
        };
        assert!(!is_background_like(&base), "coverage alone is not enough");
        assert!(is_background_like(&BackgroundSignals { bottom_of_stack: true, ..base }));
        assert!(is_background_like(&BackgroundSignals { image_or_gradient_fill: true, ..base }));
        assert!(is_background_like(&BackgroundSignals { contains_text: false, ..base }));
        assert!(is_background_like(&BackgroundSignals { name_matches: true, ..base }));
    }

    #[test]
    fn test_name_keywords_match_whole_words() {
        assert!(name_matches_background("Background"));
        assert!(name_matches_background("bg-image"));
        assert!(name_matches_background("Hero Backdrop 2"));
        assert!(!name_matches_background("database"));
        assert!(!name_matches_background("Headline"));
    }

    #[test]
    fn test_tag_beats_ai_and_heuristic() {
        let root = make_root();
        let node = full_bleed("n1").with_tag(AuthoringTag::Overlay);
        let signals = make_signals(&[("n1", SemanticRole::Logo, 0.99)]);
        let classifier = RoleClassifier::new(&root, Some(&signals), 0.6);
        let resolved = classifier.classify(&node, 0);
        assert_eq!(resolved.role, NodeRole::Overlay);
        assert_eq!(resolved.source, RoleSource::Tag);
    }

    #[test]
    fn test_ai_role_respects_confidence() {
        let root = make_root();
        let node = ContentNode::new("n1", NodeType::Vector, Rect::new(0.0, 0.0, 80.0, 80.0));
        let signals = make_signals(&[("n1", SemanticRole::Decorative, 0.4)]);
        let weak = RoleClassifier::new(&root, Some(&signals), 0.6);
        assert_eq!(weak.classify(&node, 3).role, NodeRole::Content);

        let signals = make_signals(&[("n1", SemanticRole::Decorative, 0.4), ("n1", SemanticRole::Logo, 0.8)]);
        let strong = RoleClassifier::new(&root, Some(&signals), 0.6);
        assert_eq!(strong.classify(&node, 3).role, NodeRole::Semantic(SemanticRole::Logo));
    }

    #[test]
    fn test_heuristic_background() {
        let root = make_root();
        let classifier = RoleClassifier::new(&root, None, 0.6);
        let bottom = classifier.classify(&full_bleed("bg"), 0);
        assert_eq!(bottom.role, NodeRole::Background);
        assert_eq!(bottom.source, RoleSource::Heuristic);

        let text_card = full_bleed("card").with_children(vec![ContentNode::new(
            "t",
            NodeType::Text,
            Rect::new(10.0, 10.0, 100.0, 20.0),
        )]);
        assert_eq!(classifier.classify(&text_card, 2).role, NodeRole::Content);
    }

    #[test]
    fn test_rekeyed_maps_source_roles_onto_clone_ids() {
        let root = make_root();
        let signals = make_signals(&[("hero", SemanticRole::HeroImage, 0.9)]);
        let map = HashMap::from([("hero@story".to_string(), "hero".to_string())]);
        let classifier = RoleClassifier::new(&root, Some(&signals), 0.6).rekeyed(&map);
        assert_eq!(classifier.ai_role("hero@story"), Some(SemanticRole::HeroImage));
        assert_eq!(classifier.ai_role("hero"), None);
    }
}
