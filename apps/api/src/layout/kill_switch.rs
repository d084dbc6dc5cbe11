//! Leaderboard kill switch.
//!
//! Below a fixed target height no recomposition of hero or subject imagery stays
//! legible, so those nodes are hidden outright instead of being laid out.

use serde::Serialize;
use tracing::info;

use crate::analysis::roles::RoleClassifier;
use crate::models::node::ContentNode;
use crate::models::target::TargetSpec;

pub const DEFAULT_HEIGHT_THRESHOLD: f64 = 110.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KillSwitchConfig {
    pub height_threshold: f64,
}

impl Default for KillSwitchConfig {
    fn default() -> Self {
        Self {
            height_threshold: DEFAULT_HEIGHT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillSwitchReport {
    pub activated: bool,
    /// Nodes hidden by this call; nodes that were already hidden are not listed.
    pub hidden_node_ids: Vec<String>,
    pub target_height: f64,
    pub threshold: f64,
}

/// Hides every hero/subject descendant of `frame` when `target` is shorter than the
/// threshold. A no-op at or above it. Idempotent: a second call hides nothing new.
pub fn apply_leaderboard_kill_switch(
    frame: &mut ContentNode,
    target: &TargetSpec,
    config: KillSwitchConfig,
    classifier: &RoleClassifier,
) -> KillSwitchReport {
    let mut report = KillSwitchReport {
        activated: false,
        hidden_node_ids: Vec::new(),
        target_height: target.height,
        threshold: config.height_threshold,
    };
    if target.height >= config.height_threshold {
        return report;
    }

    report.activated = true;
    hide_hero_content(frame, classifier, &mut report.hidden_node_ids);
    info!(
        target = target.id,
        height = target.height,
        hidden = report.hidden_node_ids.len(),
        "Leaderboard kill switch activated"
    );
    report
}

fn hide_hero_content(node: &mut ContentNode, classifier: &RoleClassifier, hidden: &mut Vec<String>) {
    for (z_index, child) in node.children.iter_mut().enumerate() {
        if !child.visible {
            continue;
        }
        if classifier.classify(child, z_index).role.is_hero_content() {
            child.visible = false;
            hidden.push(child.id.clone());
            continue;
        }
        hide_hero_content(child, classifier, hidden);
    }
}
