// Adaptive Layout Retargeting core.
// Pure, deterministic geometry: profile buckets, padding/spacing redistribution,
// absolute-child reflow, margin rebalancing, safe areas and the leaderboard kill switch.

pub mod absolute;
pub mod flow;
pub mod grouping;
pub mod kill_switch;
pub mod margins;
pub mod padding;
pub mod profile;
pub mod safe_area;
pub mod snapshot;

pub use profile::{resolve_layout_profile, LayoutProfile};

/// Every tunable threshold the engine consumes, passed explicitly into each call.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Symmetric safe-area fallback, as a fraction of the target's width/height.
    pub safe_area_ratio: f64,
    /// Targets shorter than this hide hero/subject content outright.
    pub leaderboard_height_threshold: f64,
    /// Minimum confidence for an AI role assignment to influence classification.
    pub ai_role_min_confidence: f64,
    /// Minimum confidence for an AI QA flag to surface as a warning.
    pub ai_qa_min_confidence: f64,
    /// Allowed centroid drift, as a fraction of the frame dimension.
    pub misalignment_tolerance: f64,
    pub min_legible_font_px: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            safe_area_ratio: 0.05,
            leaderboard_height_threshold: kill_switch::DEFAULT_HEIGHT_THRESHOLD,
            ai_role_min_confidence: 0.6,
            ai_qa_min_confidence: 0.5,
            misalignment_tolerance: 0.1,
            min_legible_font_px: 9.0,
        }
    }
}
