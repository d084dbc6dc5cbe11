//! Isolated per-target clones of a source tree.
//!
//! Every target pass mutates its own clone, so interleaved passes never observe each
//! other's in-progress geometry. Source ids are recovered by zipping the two trees.

use std::collections::HashMap;

use tracing::warn;

use crate::models::node::ContentNode;

pub fn clone_id(source_id: &str, target_id: &str) -> String {
    format!("{source_id}@{target_id}")
}

/// Deep copy of `source` with every id rewritten to `<source-id>@<target-id>`.
pub fn clone_for_target(source: &ContentNode, target_id: &str) -> ContentNode {
    let mut clone = source.clone();
    rename(&mut clone, target_id);
    clone
}

fn rename(node: &mut ContentNode, target_id: &str) {
    node.id = clone_id(&node.id, target_id);
    for child in &mut node.children {
        rename(child, target_id);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloneIdMap {
    pub clone_to_source: HashMap<String, String>,
    /// Nodes where the two trees diverged and descent stopped.
    pub mismatches: usize,
}

/// Zips `source` and `clone` index by index into a clone-id → source-id map.
///
/// Where the shapes diverge (different node types or child counts) it stops
/// descending at that node and counts a mismatch instead of truncating silently.
pub fn map_clone_ids(source: &ContentNode, clone: &ContentNode) -> CloneIdMap {
    let mut map = CloneIdMap::default();
    zip_nodes(source, clone, &mut map);
    if map.mismatches > 0 {
        warn!(
            source = %source.id,
            mismatches = map.mismatches,
            "Clone tree diverged from source; some AI roles will not apply"
        );
    }
    map
}

fn zip_nodes(source: &ContentNode, clone: &ContentNode, map: &mut CloneIdMap) {
    if source.node_type != clone.node_type {
        warn!(source = %source.id, clone = %clone.id, "Node type mismatch between source and clone");
        map.mismatches += 1;
        return;
    }
    map.clone_to_source.insert(clone.id.clone(), source.id.clone());

    if source.children.len() != clone.children.len() {
        warn!(
            source = %source.id,
            source_children = source.children.len(),
            clone_children = clone.children.len(),
            "Child count mismatch between source and clone"
        );
        map.mismatches += 1;
        return;
    }
    for (s, c) in source.children.iter().zip(&clone.children) {
        zip_nodes(s, c, map);
    }
}
