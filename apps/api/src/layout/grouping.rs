//! Element grouping — proximity clusters of freely placed children.
//!
//! Clusters let the absolute planner move related elements (a headline and its
//! logo, a stack of text lines) as one unit instead of letting them drift apart.
//!
//! # Rules
//! - Elements whose centres are within `PROXIMITY_THRESHOLD` (Euclidean) join the
//!   same cluster; clustering is transitive.
//! - text + logo-like → `text_logo`; ≥ 2 text and no logo → `text_cluster`;
//!   anything else → `isolated`.
//! - Clusters over `MAX_GROUP_SIZE` are split top-to-bottom.

use serde::Serialize;

use crate::models::geometry::{Point, Rect};
use crate::models::node::{ContentNode, FillKind, NodeType};

pub const PROXIMITY_THRESHOLD: f64 = 50.0;
/// Raster/vector nodes at or under this size on both sides read as logos.
pub const LOGO_MAX_SIDE: f64 = 120.0;
const MAX_GROUP_SIZE: usize = 4;
const MAX_SPLIT_SIZE: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Text,
    LogoLike,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupType {
    TextLogo,
    TextCluster,
    Isolated,
}

/// One element as seen by the grouper: id, bounds in the container's space, kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedElement {
    pub id: String,
    pub bounds: Rect,
    pub kind: ElementKind,
}

impl GroupedElement {
    pub fn from_node(node: &ContentNode) -> Self {
        Self {
            id: node.id.clone(),
            bounds: node.bounds,
            kind: classify_element(node),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementGroup {
    pub elements: Vec<GroupedElement>,
    pub group_type: GroupType,
    pub bounds: Rect,
    pub centroid: Point,
}

impl ElementGroup {
    fn from_elements(elements: Vec<GroupedElement>, group_type: GroupType) -> Self {
        let bounds = elements
            .iter()
            .skip(1)
            .fold(elements[0].bounds, |acc, e| acc.union(&e.bounds));
        let n = elements.len() as f64;
        let (sx, sy) = elements.iter().fold((0.0, 0.0), |(sx, sy), e| {
            let c = e.bounds.center();
            (sx + c.x, sy + c.y)
        });
        Self {
            elements,
            group_type,
            bounds,
            centroid: Point::new(sx / n, sy / n),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }
}

/// Component instances and small raster/vector art read as logos.
pub fn classify_element(node: &ContentNode) -> ElementKind {
    if node.is_text() {
        return ElementKind::Text;
    }
    let small = node.bounds.width <= LOGO_MAX_SIDE && node.bounds.height <= LOGO_MAX_SIDE;
    let raster_or_vector = node.node_type == NodeType::Vector || node.fill == FillKind::Image;
    if node.node_type == NodeType::Instance || (small && raster_or_vector) {
        ElementKind::LogoLike
    } else {
        ElementKind::Other
    }
}

fn classify_group(elements: &[GroupedElement]) -> GroupType {
    let texts = elements.iter().filter(|e| e.kind == ElementKind::Text).count();
    let logos = elements.iter().filter(|e| e.kind == ElementKind::LogoLike).count();
    if texts >= 1 && logos >= 1 {
        GroupType::TextLogo
    } else if texts >= 2 {
        GroupType::TextCluster
    } else {
        GroupType::Isolated
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Clustering
// ────────────────────────────────────────────────────────────────────────────

/// Disjoint-set forest with path compression and union by rank.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union(&mut self, x: usize, y: usize) {
        let (rx, ry) = (self.find(x), self.find(y));
        if rx == ry {
            return;
        }
        match self.rank[rx].cmp(&self.rank[ry]) {
            std::cmp::Ordering::Less => self.parent[rx] = ry,
            std::cmp::Ordering::Greater => self.parent[ry] = rx,
            std::cmp::Ordering::Equal => {
                self.parent[ry] = rx;
                self.rank[rx] += 1;
            }
        }
    }
}

/// Clusters elements by centre-to-centre proximity.
///
/// Groups come back in the order of their first member; members keep input order.
pub fn detect_element_groups(elements: &[GroupedElement]) -> Vec<ElementGroup> {
    let n = elements.len();
    let mut uf = UnionFind::new(n);
    for i in 0..n {
        let ci = elements[i].bounds.center();
        for j in (i + 1)..n {
            if ci.distance_to(&elements[j].bounds.center()) <= PROXIMITY_THRESHOLD {
                uf.union(i, j);
            }
        }
    }

    let mut roots: Vec<usize> = Vec::new();
    let mut buckets: Vec<Vec<GroupedElement>> = Vec::new();
    for (i, element) in elements.iter().enumerate() {
        let root = uf.find(i);
        match roots.iter().position(|&r| r == root) {
            Some(slot) => buckets[slot].push(element.clone()),
            None => {
                roots.push(root);
                buckets.push(vec![element.clone()]);
            }
        }
    }

    buckets
        .into_iter()
        .map(|members| {
            let group_type = classify_group(&members);
            ElementGroup::from_elements(members, group_type)
        })
        .collect()
}

/// Splits clusters larger than `MAX_GROUP_SIZE`.
///
/// Members are sorted top to bottom; a new sub-cluster starts whenever the vertical gap
/// to the previous member exceeds half the proximity threshold or the running
/// sub-cluster already holds `MAX_SPLIT_SIZE` members. A split `text_logo` cluster is
/// no longer one unit and is demoted to `text_cluster`.
pub fn optimize_group_sizes(groups: Vec<ElementGroup>) -> Vec<ElementGroup> {
    let mut out = Vec::with_capacity(groups.len());
    for group in groups {
        if group.len() <= MAX_GROUP_SIZE {
            out.push(group);
            continue;
        }

        let original_type = group.group_type;
        let mut members = group.elements;
        members.sort_by(|a, b| a.bounds.y.total_cmp(&b.bounds.y));

        let mut current: Vec<GroupedElement> = Vec::new();
        let mut pieces: Vec<Vec<GroupedElement>> = Vec::new();
        for member in members {
            if let Some(prev) = current.last() {
                let gap = member.bounds.y - prev.bounds.bottom();
                if gap > PROXIMITY_THRESHOLD / 2.0 || current.len() >= MAX_SPLIT_SIZE {
                    pieces.push(std::mem::take(&mut current));
                }
            }
            current.push(member);
        }
        if !current.is_empty() {
            pieces.push(current);
        }

        for piece in pieces {
            let group_type = match classify_group(&piece) {
                _ if piece.len() == 1 => GroupType::Isolated,
                GroupType::TextLogo => GroupType::TextCluster,
                _ if original_type == GroupType::TextLogo => GroupType::TextCluster,
                other => other,
            };
            out.push(ElementGroup::from_elements(piece, group_type));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: &str, kind: ElementKind, x: f64, y: f64, w: f64, h: f64) -> GroupedElement {
        GroupedElement {
            id: id.to_string(),
            bounds: Rect::new(x, y, w, h),
            kind,
        }
    }

    #[test]
    fn test_elements_40_apart_merge() {
        let elements = vec![
            element("a", ElementKind::Text, 0.0, 0.0, 20.0, 20.0),
            element("b", ElementKind::Text, 40.0, 0.0, 20.0, 20.0),
        ];
        let groups = detect_element_groups(&elements);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].group_type, GroupType::TextCluster);
        assert_eq!(groups[0].bounds, Rect::new(0.0, 0.0, 60.0, 20.0));
        assert_eq!(groups[0].centroid, Point::new(30.0, 10.0));
    }

    #[test]
    fn test_elements_80_apart_stay_isolated() {
        let elements = vec![
            element("a", ElementKind::Text, 0.0, 0.0, 20.0, 20.0),
            element("b", ElementKind::Text, 80.0, 0.0, 20.0, 20.0),
        ];
        let groups = detect_element_groups(&elements);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.group_type == GroupType::Isolated));
    }

    #[test]
    fn test_text_next_to_logo_is_text_logo() {
        let elements = vec![
            element("title", ElementKind::Text, 0.0, 0.0, 40.0, 20.0),
            element("logo", ElementKind::LogoLike, 30.0, 10.0, 30.0, 30.0),
        ];
        let groups = detect_element_groups(&elements);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].group_type, GroupType::TextLogo);
    }

    #[test]
    fn test_clustering_is_transitive() {
        // a–b and b–c are close; a–c are 90 apart.
        let elements = vec![
            element("a", ElementKind::Other, 0.0, 0.0, 10.0, 10.0),
            element("b", ElementKind::Other, 45.0, 0.0, 10.0, 10.0),
            element("c", ElementKind::Other, 90.0, 0.0, 10.0, 10.0),
        ];
        let groups = detect_element_groups(&elements);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
    }

    #[test]
    fn test_classify_element_logo_rules() {
        let instance = ContentNode::new("i", NodeType::Instance, Rect::new(0.0, 0.0, 500.0, 500.0));
        let small_image = ContentNode::new("img", NodeType::Rectangle, Rect::new(0.0, 0.0, 120.0, 80.0))
            .with_fill(FillKind::Image);
        let big_image = ContentNode::new("hero", NodeType::Rectangle, Rect::new(0.0, 0.0, 400.0, 300.0))
            .with_fill(FillKind::Image);
        let text = ContentNode::new("t", NodeType::Text, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(classify_element(&instance), ElementKind::LogoLike);
        assert_eq!(classify_element(&small_image), ElementKind::LogoLike);
        assert_eq!(classify_element(&big_image), ElementKind::Other);
        assert_eq!(classify_element(&text), ElementKind::Text);
    }

    #[test]
    fn test_small_groups_are_not_split() {
        let elements: Vec<GroupedElement> = (0..4)
            .map(|i| element(&format!("t{i}"), ElementKind::Text, 0.0, i as f64 * 12.0, 30.0, 10.0))
            .collect();
        let groups = optimize_group_sizes(detect_element_groups(&elements));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 4);
    }

    #[test]
    fn test_large_group_splits_at_three_members() {
        // Six tightly stacked text lines: one cluster, split into 3 + 3.
        let elements: Vec<GroupedElement> = (0..6)
            .map(|i| element(&format!("t{i}"), ElementKind::Text, 0.0, i as f64 * 12.0, 30.0, 10.0))
            .collect();
        let groups = detect_element_groups(&elements);
        assert_eq!(groups.len(), 1);
        let split = optimize_group_sizes(groups);
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].len(), 3);
        assert_eq!(split[1].len(), 3);
        assert!(split.iter().all(|g| g.group_type == GroupType::TextCluster));
        assert_eq!(split[1].elements[0].id, "t3");
    }

    #[test]
    fn test_split_breaks_on_vertical_gap() {
        let mut elements: Vec<GroupedElement> = (0..5)
            .map(|i| element(&format!("t{i}"), ElementKind::Text, 0.0, i as f64 * 12.0, 30.0, 10.0))
            .collect();
        elements[4].bounds.y = 80.0; // 34px below t3
        // Built directly: proximity alone would not have merged t4.
        let group = ElementGroup::from_elements(elements, GroupType::TextCluster);
        let split = optimize_group_sizes(vec![group]);
        assert_eq!(split.len(), 3);
        assert_eq!(split[0].len(), 3);
        assert_eq!(split[1].len(), 1);
        assert_eq!(split[1].group_type, GroupType::Isolated);
        assert_eq!(split[2].elements[0].id, "t4");
    }

    #[test]
    fn test_split_text_logo_is_demoted() {
        let mut elements: Vec<GroupedElement> = (0..4)
            .map(|i| element(&format!("t{i}"), ElementKind::Text, 0.0, i as f64 * 12.0, 30.0, 10.0))
            .collect();
        elements.push(element("logo", ElementKind::LogoLike, 0.0, 48.0, 20.0, 10.0));
        let group = ElementGroup::from_elements(elements, GroupType::TextLogo);
        let split = optimize_group_sizes(vec![group]);
        assert_eq!(split.len(), 2);
        assert!(
            split.iter().all(|g| g.group_type == GroupType::TextCluster),
            "no piece of a split text-logo cluster keeps the text-logo type"
        );
    }
}
