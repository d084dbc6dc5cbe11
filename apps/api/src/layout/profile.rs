//! Coarse aspect-ratio buckets that drive layout strategy.

use serde::{Deserialize, Serialize};

use crate::models::geometry::Size;

/// Below this ratio a canvas reads as vertical.
pub const SQUARE_MIN_RATIO: f64 = 0.8;
/// Above this ratio a canvas reads as horizontal.
pub const SQUARE_MAX_RATIO: f64 = 1.25;

/// Targets at or below this ratio are tall enough to force a vertical stack.
pub const EXTREME_VERTICAL_RATIO: f64 = 0.6;
/// Targets at or above this ratio are wide enough to force a horizontal row.
pub const EXTREME_HORIZONTAL_RATIO: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutProfile {
    Vertical,
    Horizontal,
    Square,
}

/// Buckets `width / max(height, 1)` against the two square thresholds.
pub fn resolve_layout_profile(dimensions: Size) -> LayoutProfile {
    let aspect_ratio = dimensions.aspect_ratio();
    if aspect_ratio < SQUARE_MIN_RATIO {
        LayoutProfile::Vertical
    } else if aspect_ratio > SQUARE_MAX_RATIO {
        LayoutProfile::Horizontal
    } else {
        LayoutProfile::Square
    }
}

pub fn is_extreme_vertical(aspect_ratio: f64) -> bool {
    aspect_ratio <= EXTREME_VERTICAL_RATIO
}

pub fn is_extreme_horizontal(aspect_ratio: f64) -> bool {
    aspect_ratio >= EXTREME_HORIZONTAL_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_hd_is_horizontal() {
        assert_eq!(resolve_layout_profile(Size::new(1920.0, 1080.0)), LayoutProfile::Horizontal);
    }

    #[test]
    fn test_portrait_hd_is_vertical() {
        assert_eq!(resolve_layout_profile(Size::new(1080.0, 1920.0)), LayoutProfile::Vertical);
    }

    #[test]
    fn test_equal_sides_are_square() {
        assert_eq!(resolve_layout_profile(Size::new(1000.0, 1000.0)), LayoutProfile::Square);
    }

    #[test]
    fn test_near_square_display_rectangle_is_square() {
        // 300x250 = 1.2, inside the square band
        assert_eq!(resolve_layout_profile(Size::new(300.0, 250.0)), LayoutProfile::Square);
    }

    #[test]
    fn test_zero_height_does_not_panic() {
        assert_eq!(resolve_layout_profile(Size::new(100.0, 0.0)), LayoutProfile::Horizontal);
        assert_eq!(resolve_layout_profile(Size::new(0.0, 0.0)), LayoutProfile::Vertical);
    }

    #[test]
    fn test_extreme_ratios() {
        assert!(is_extreme_vertical(1080.0 / 1920.0));
        assert!(!is_extreme_vertical(1080.0 / 1350.0));
        assert!(is_extreme_horizontal(728.0 / 90.0));
        assert!(!is_extreme_horizontal(1920.0 / 1080.0));
    }
}
