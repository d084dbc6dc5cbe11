//! Safe-area resolution.
//!
//! Some destinations reserve fixed chrome (captions, action rails, progress bars) that
//! overlays the canvas. Those use explicit per-side insets; everything else falls back
//! to a symmetric ratio of the target's width and height.

use serde::Serialize;

use crate::layout::profile::is_extreme_vertical;
use crate::models::geometry::{Insets, Rect};
use crate::models::target::TargetSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayConstraint {
    Min,
    Max,
    Center,
    Stretch,
    Scale,
}

/// How the (external) overlay renderer pins the chrome preview to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverlayAnchor {
    pub horizontal: OverlayConstraint,
    pub vertical: OverlayConstraint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetConfig {
    pub insets: Insets,
    pub overlay_label: String,
    pub overlay_anchor: OverlayAnchor,
}

struct SafeAreaOverride {
    target_id: &'static str,
    insets: Insets,
    label: &'static str,
}

/// Fixed chrome of vertical-video platforms, in destination pixels.
const SAFE_AREA_OVERRIDES: &[SafeAreaOverride] = &[
    SafeAreaOverride {
        target_id: "tiktok-vertical",
        insets: Insets::new(60.0, 140.0, 150.0, 480.0),
        label: "TikTok UI",
    },
    SafeAreaOverride {
        target_id: "instagram-story",
        insets: Insets::new(60.0, 60.0, 250.0, 340.0),
        label: "Instagram Story UI",
    },
    SafeAreaOverride {
        target_id: "youtube-shorts",
        insets: Insets::new(60.0, 190.0, 140.0, 400.0),
        label: "YouTube Shorts UI",
    },
];

const VERTICAL_VIDEO_LABEL: &str = "Platform UI";
const DEFAULT_LABEL: &str = "Safe area";

fn find_override(target_id: &str) -> Option<&'static SafeAreaOverride> {
    SAFE_AREA_OVERRIDES.iter().find(|o| o.target_id == target_id)
}

/// Per-side safe insets: explicit override if one exists, otherwise
/// `width * ratio` left/right and `height * ratio` top/bottom.
pub fn resolve_safe_area_insets(target: &TargetSpec, safe_area_ratio: f64) -> Insets {
    if let Some(o) = find_override(target.id) {
        return o.insets;
    }
    let ratio = safe_area_ratio.max(0.0);
    let x = target.width * ratio;
    let y = target.height * ratio;
    Insets::new(x, x, y, y)
}

/// The destination frame minus its safe insets.
pub fn safe_bounds(target: &TargetSpec, safe_area_ratio: f64) -> Rect {
    Rect::from_size(target.size()).inset(&resolve_safe_area_insets(target, safe_area_ratio))
}

/// Insets plus overlay label and anchoring for the overlay renderer.
pub fn resolve_target_config(target: &TargetSpec, safe_area_ratio: f64) -> TargetConfig {
    let insets = resolve_safe_area_insets(target, safe_area_ratio);
    let vertical_video = is_extreme_vertical(target.aspect_ratio());

    let overlay_label = find_override(target.id)
        .map(|o| o.label)
        .unwrap_or(if vertical_video {
            VERTICAL_VIDEO_LABEL
        } else {
            DEFAULT_LABEL
        })
        .to_string();

    let overlay_anchor = if vertical_video {
        OverlayAnchor {
            horizontal: OverlayConstraint::Stretch,
            vertical: OverlayConstraint::Stretch,
        }
    } else {
        OverlayAnchor {
            horizontal: OverlayConstraint::Scale,
            vertical: OverlayConstraint::Scale,
        }
    };

    TargetConfig {
        insets,
        overlay_label,
        overlay_anchor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::target::find_target;

    #[test]
    fn test_override_wins_over_ratio() {
        let t = find_target("tiktok-vertical").unwrap();
        let insets = resolve_safe_area_insets(t, 0.05);
        assert_eq!(insets.bottom, 480.0);
        assert!(insets.bottom > insets.top, "platform UI covers the bottom");
    }

    #[test]
    fn test_ratio_fallback_is_symmetric_per_axis() {
        let t = find_target("display-leaderboard").unwrap();
        let insets = resolve_safe_area_insets(t, 0.05);
        assert_eq!(insets.left, 728.0 * 0.05);
        assert_eq!(insets.right, insets.left);
        assert_eq!(insets.top, 90.0 * 0.05);
        assert_eq!(insets.bottom, insets.top);
    }

    #[test]
    fn test_safe_bounds_subtracts_insets() {
        let t = find_target("display-rectangle").unwrap();
        let r = safe_bounds(t, 0.1);
        assert_eq!(r, Rect::new(30.0, 25.0, 240.0, 200.0));
    }

    #[test]
    fn test_target_config_vertical_video_defaults() {
        let pin = find_target("pinterest-pin").unwrap();
        let cfg = resolve_target_config(pin, 0.05);
        assert_eq!(cfg.overlay_label, DEFAULT_LABEL, "2:3 is not a vertical-video shape");

        let story = find_target("instagram-story").unwrap();
        let cfg = resolve_target_config(story, 0.05);
        assert_eq!(cfg.overlay_label, "Instagram Story UI");
        assert_eq!(cfg.overlay_anchor.vertical, OverlayConstraint::Stretch);
    }

    #[test]
    fn test_negative_ratio_clamps_to_zero() {
        let t = find_target("youtube-cover").unwrap();
        assert_eq!(resolve_safe_area_insets(t, -0.2), Insets::default());
    }
}
