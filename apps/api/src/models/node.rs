//! Content tree model — the snapshot of a source composition handed to the engine.
#![allow(dead_code)]
//!
//! Bounds are parent-relative, the way design tools store them. A child belongs to
//! exactly one parent: children are owned `Vec`s, never shared.

use serde::{Deserialize, Serialize};

use crate::models::geometry::{Axis, Insets, Rect};

// ────────────────────────────────────────────────────────────────────────────
// Node attributes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Frame,
    Text,
    Vector,
    Rectangle,
    Instance,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillKind {
    Solid,
    Image,
    Gradient,
    #[default]
    None,
}

/// Tags placed on a node by the template author. Always outrank heuristics and AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthoringTag {
    /// Platform chrome preview or watermark drawn over everything. Exempt from safe-area checks.
    Overlay,
    /// Imagery meant to bleed past the frame edge. Exempt from safe-area checks.
    HeroBleed,
    Subject,
    Hero,
    HeroImage,
}

/// Whether a child participates in its parent's flow or is placed freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Positioning {
    #[default]
    Auto,
    Absolute,
}

// ────────────────────────────────────────────────────────────────────────────
// Flow layout
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingMode {
    #[default]
    Fixed,
    Hug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryAlign {
    #[default]
    Min,
    Center,
    Max,
    SpaceBetween,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterAlign {
    #[default]
    Min,
    Center,
    Max,
}

/// Auto-arrangement settings of a flow container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLayout {
    pub direction: Axis,
    #[serde(default)]
    pub primary_sizing: SizingMode,
    #[serde(default)]
    pub counter_sizing: SizingMode,
    #[serde(default)]
    pub wrap: bool,
    #[serde(default)]
    pub primary_align: PrimaryAlign,
    #[serde(default)]
    pub counter_align: CounterAlign,
    #[serde(default)]
    pub item_spacing: f64,
    #[serde(default)]
    pub padding: Insets,
}

// ────────────────────────────────────────────────────────────────────────────
// ContentNode
// ────────────────────────────────────────────────────────────────────────────

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub node_type: NodeType,
    /// Parent-relative bounds.
    pub bounds: Rect,
    #[serde(default)]
    pub fill: FillKind,
    #[serde(default)]
    pub tags: Vec<AuthoringTag>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// `Some` when this node auto-arranges its children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_layout: Option<FlowLayout>,
    #[serde(default)]
    pub positioning: Positioning,
    /// Child stretches along its parent's primary axis to absorb leftover space.
    #[serde(default)]
    pub layout_grow: bool,
    #[serde(default)]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    pub fn new(id: impl Into<String>, node_type: NodeType, bounds: Rect) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            node_type,
            bounds,
            fill: FillKind::None,
            tags: Vec::new(),
            visible: true,
            locked: false,
            font_size: None,
            flow_layout: None,
            positioning: Positioning::Auto,
            layout_grow: false,
            children: Vec::new(),
        }
    }

    pub fn with_fill(mut self, fill: FillKind) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_tag(mut self, tag: AuthoringTag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_flow_layout(mut self, layout: FlowLayout) -> Self {
        self.flow_layout = Some(layout);
        self
    }

    pub fn with_children(mut self, children: Vec<ContentNode>) -> Self {
        self.children = children;
        self
    }

    pub fn has_tag(&self, tag: AuthoringTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    pub fn is_flow_container(&self) -> bool {
        self.flow_layout.is_some()
    }

    /// Recursively checks for any text descendant (including self).
    pub fn contains_text(&self) -> bool {
        self.is_text() || self.children.iter().any(ContentNode::contains_text)
    }

    /// Children that take part in the parent's flow (visible, not absolutely positioned).
    pub fn flow_children(&self) -> impl Iterator<Item = &ContentNode> {
        self.children
            .iter()
            .filter(|c| c.visible && c.positioning == Positioning::Auto)
    }

    /// `(flow, absolute)` child counts.
    pub fn child_counts(&self) -> (usize, usize) {
        let flow = self.flow_children().count();
        let absolute = self
            .children
            .iter()
            .filter(|c| c.positioning == Positioning::Absolute)
            .count();
        (flow, absolute)
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &str) -> Option<&ContentNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Total number of nodes in this subtree, self included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(ContentNode::subtree_len).sum::<usize>()
    }
}
