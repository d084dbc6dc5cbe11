//! Static catalog of named destination formats.
//!
//! Consumed as plain configuration data. A target id that is not in the catalog is a
//! caller error (`EngineError::UnknownTarget`), never something to recover from.

use serde::Serialize;

use crate::errors::EngineError;
use crate::models::geometry::Size;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub width: f64,
    pub height: f64,
}

impl TargetSpec {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.size().aspect_ratio()
    }
}

const fn target(
    id: &'static str,
    label: &'static str,
    description: &'static str,
    width: f64,
    height: f64,
) -> TargetSpec {
    TargetSpec {
        id,
        label,
        description,
        width,
        height,
    }
}

/// Ordered catalog. Order is the display order of the variant picker.
pub const TARGET_CATALOG: &[TargetSpec] = &[
    target("instagram-square", "Instagram Square", "Feed post, 1:1", 1080.0, 1080.0),
    target("instagram-portrait", "Instagram Portrait", "Feed post, 4:5", 1080.0, 1350.0),
    target("instagram-story", "Instagram Story", "Stories and Reels, 9:16", 1080.0, 1920.0),
    target("tiktok-vertical", "TikTok Vertical", "Full-screen video, 9:16", 1080.0, 1920.0),
    target("youtube-shorts", "YouTube Shorts", "Shorts cover, 9:16", 1080.0, 1920.0),
    target("youtube-cover", "YouTube Cover", "Channel banner, 16:9", 2560.0, 1440.0),
    target("youtube-thumbnail", "YouTube Thumbnail", "Video thumbnail, 16:9", 1280.0, 720.0),
    target("facebook-cover", "Facebook Cover", "Page cover photo", 820.0, 312.0),
    target("linkedin-banner", "LinkedIn Banner", "Profile background, 4:1", 1584.0, 396.0),
    target("twitter-header", "X Header", "Profile header, 3:1", 1500.0, 500.0),
    target("pinterest-pin", "Pinterest Pin", "Standard pin, 2:3", 1000.0, 1500.0),
    target("display-leaderboard", "Leaderboard", "IAB display, 728x90", 728.0, 90.0),
    target("display-rectangle", "Medium Rectangle", "IAB display, 300x250", 300.0, 250.0),
    target("display-skyscraper", "Wide Skyscraper", "IAB display, 160x600", 160.0, 600.0),
    target("display-mobile-banner", "Mobile Banner", "IAB display, 320x50", 320.0, 50.0),
];

/// Looks up a catalog entry by id.
pub fn find_target(id: &str) -> Result<&'static TargetSpec, EngineError> {
    TARGET_CATALOG
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| EngineError::UnknownTarget(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_target() {
        let t = find_target("display-leaderboard").unwrap();
        assert_eq!(t.width, 728.0);
        assert_eq!(t.height, 90.0);
    }

    #[test]
    fn test_unknown_target_is_an_error() {
        assert_eq!(
            find_target("myspace-banner"),
            Err(EngineError::UnknownTarget("myspace-banner".to_string()))
        );
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let mut ids: Vec<&str> = TARGET_CATALOG.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), TARGET_CATALOG.len());
    }
}
