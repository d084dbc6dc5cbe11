//! Margin normalization — rebalances lopsided content margins after a large shape change.

use crate::layout::profile::LayoutProfile;
use crate::models::geometry::Insets;

/// Aspect-ratio delta above which a change counts as significant.
const SIGNIFICANT_RATIO_CHANGE: f64 = 1.0;
const ASYMMETRY_THRESHOLD_ORIENTED: f64 = 0.6;
const ASYMMETRY_THRESHOLD_SQUARE: f64 = 0.48;
const ORIGINAL_WEIGHT: f64 = 0.25;
const TARGET_WEIGHT: f64 = 0.75;

/// `|a - b| / (a + b)`; zero when both are zero.
pub fn asymmetry_ratio(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum <= 0.0 {
        return 0.0;
    }
    (a - b).abs() / sum
}

fn threshold_for(profile: LayoutProfile) -> f64 {
    match profile {
        LayoutProfile::Square => ASYMMETRY_THRESHOLD_SQUARE,
        LayoutProfile::Vertical | LayoutProfile::Horizontal => ASYMMETRY_THRESHOLD_ORIENTED,
    }
}

fn blend(original: f64, target: f64) -> f64 {
    ORIGINAL_WEIGHT * original + TARGET_WEIGHT * target
}

/// Rebalances asymmetric margins when the aspect ratio changes significantly.
///
/// Returns `None` only for `None` input. Margins pass through untouched when the change
/// is small and the profile is unchanged. Otherwise each axis whose asymmetry exceeds
/// the profile threshold is blended 25/75 toward its target split: an even split, except
/// vertical margins on a vertical target which keep twice as much room below as above.
pub fn normalize_content_margins(
    margins: Option<Insets>,
    source_profile: LayoutProfile,
    target_profile: LayoutProfile,
    source_aspect_ratio: f64,
    target_aspect_ratio: f64,
) -> Option<Insets> {
    let margins = margins?;

    let aspect_ratio_change = (source_aspect_ratio - target_aspect_ratio).abs();
    let significant = aspect_ratio_change > SIGNIFICANT_RATIO_CHANGE || source_profile != target_profile;
    if !significant {
        return Some(margins);
    }

    let threshold = threshold_for(target_profile);
    let mut out = margins;

    if asymmetry_ratio(margins.left, margins.right) > threshold {
        let even = (margins.left + margins.right) / 2.0;
        out.left = blend(margins.left, even);
        out.right = blend(margins.right, even);
    }

    if asymmetry_ratio(margins.top, margins.bottom) > threshold {
        let total = margins.top + margins.bottom;
        let (top_target, bottom_target) = if target_profile == LayoutProfile::Vertical {
            (total / 3.0, total * 2.0 / 3.0)
        } else {
            (total / 2.0, total / 2.0)
        };
        out.top = blend(margins.top, top_target);
        out.bottom = blend(margins.bottom, bottom_target);
    }

    tracing::debug!(before = ?margins, after = ?out, "Normalized content margins");
    Some(out.clamp_non_negative())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_margins_skip() {
        assert_eq!(
            normalize_content_margins(None, LayoutProfile::Square, LayoutProfile::Vertical, 1.0, 0.56),
            None
        );
    }

    #[test]
    fn test_small_change_same_profile_is_noop() {
        let m = Insets::new(10.0, 300.0, 5.0, 400.0);
        let out = normalize_content_margins(
            Some(m),
            LayoutProfile::Horizontal,
            LayoutProfile::Horizontal,
            1.78,
            2.63,
        );
        assert_eq!(out, Some(m));
    }

    #[test]
    fn test_horizontal_axis_blends_toward_average() {
        // 100 vs 300: asymmetry 0.5 > 0.48 (square target)
        let m = Insets::new(100.0, 300.0, 50.0, 50.0);
        let out = normalize_content_margins(
            Some(m),
            LayoutProfile::Horizontal,
            LayoutProfile::Square,
            1.78,
            1.0,
        )
        .unwrap();
        assert_eq!(out.left, 0.25 * 100.0 + 0.75 * 200.0);
        assert_eq!(out.right, 0.25 * 300.0 + 0.75 * 200.0);
        assert_eq!(out.top, 50.0);
        assert_eq!(out.left + out.right, 400.0, "total horizontal margin is preserved");
    }

    #[test]
    fn test_vertical_target_biases_bottom() {
        // 0 vs 300: asymmetry 1.0 > 0.6
        let m = Insets::new(40.0, 40.0, 0.0, 300.0);
        let out = normalize_content_margins(
            Some(m),
            LayoutProfile::Square,
            LayoutProfile::Vertical,
            1.0,
            0.5625,
        )
        .unwrap();
        assert_eq!(out.top, 0.75 * 100.0);
        assert_eq!(out.bottom, 0.25 * 300.0 + 0.75 * 200.0);
        assert!(out.bottom > out.top);
    }

    #[test]
    fn test_below_threshold_axis_untouched() {
        // 100 vs 200: asymmetry 0.333 < 0.6
        let m = Insets::new(100.0, 200.0, 100.0, 200.0);
        let out = normalize_content_margins(
            Some(m),
            LayoutProfile::Square,
            LayoutProfile::Horizontal,
            1.0,
            8.0,
        )
        .unwrap();
        assert_eq!(out, m);
    }

    #[test]
    fn test_negative_margins_clamped() {
        let m = Insets::new(-50.0, 10.0, 0.0, 0.0);
        let out = normalize_content_margins(
            Some(m),
            LayoutProfile::Square,
            LayoutProfile::Horizontal,
            1.0,
            8.0,
        )
        .unwrap();
        assert!(out.left >= 0.0 && out.right >= 0.0);
    }
}
