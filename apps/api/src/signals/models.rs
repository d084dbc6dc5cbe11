//! Post-sanitization AI signal types and their closed vocabularies.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Vocabularies
// ────────────────────────────────────────────────────────────────────────────

/// Semantic role an AI provider may assign to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticRole {
    Hero,
    HeroImage,
    Subject,
    Logo,
    BrandMark,
    Title,
    Headline,
    Subtitle,
    Body,
    Caption,
    Cta,
    Button,
    Badge,
    Price,
    Legal,
    Icon,
    Container,
    Background,
    Decorative,
    Overlay,
    Unknown,
}

const ROLE_VOCABULARY: &[(&str, SemanticRole)] = &[
    ("hero", SemanticRole::Hero),
    ("hero_image", SemanticRole::HeroImage),
    ("subject", SemanticRole::Subject),
    ("logo", SemanticRole::Logo),
    ("brand_mark", SemanticRole::BrandMark),
    ("title", SemanticRole::Title),
    ("headline", SemanticRole::Headline),
    ("subtitle", SemanticRole::Subtitle),
    ("body", SemanticRole::Body),
    ("caption", SemanticRole::Caption),
    ("cta", SemanticRole::Cta),
    ("button", SemanticRole::Button),
    ("badge", SemanticRole::Badge),
    ("price", SemanticRole::Price),
    ("legal", SemanticRole::Legal),
    ("icon", SemanticRole::Icon),
    ("container", SemanticRole::Container),
    ("background", SemanticRole::Background),
    ("decorative", SemanticRole::Decorative),
    ("overlay", SemanticRole::Overlay),
    ("unknown", SemanticRole::Unknown),
];

impl SemanticRole {
    /// Looks up an already-normalized (snake_case) label.
    pub fn from_label(label: &str) -> Option<Self> {
        ROLE_VOCABULARY
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, role)| *role)
    }
}

/// QA finding codes an AI provider may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QaCode {
    LowContrast,
    TextTooSmall,
    TextOverflow,
    TextClipped,
    TextOverlap,
    LogoTooSmall,
    LogoClipped,
    LogoDistorted,
    FaceClipped,
    FaceObscured,
    SubjectClipped,
    SubjectOffCenter,
    CtaMissing,
    CtaTooSmall,
    CtaObscured,
    OutsideSafeArea,
    Misaligned,
    ElementOverlap,
    Crowded,
    ExcessiveWhitespace,
    Unbalanced,
    ImageDistorted,
    ImageLowResolution,
    ImageCropped,
    BackgroundGap,
    HierarchyUnclear,
    ReadabilityPoor,
    ColorClash,
    BrandInconsistent,
    EdgeTension,
    Other,
}

const QA_VOCABULARY: &[(&str, QaCode)] = &[
    ("LOW_CONTRAST", QaCode::LowContrast),
    ("TEXT_TOO_SMALL", QaCode::TextTooSmall),
    ("TEXT_OVERFLOW", QaCode::TextOverflow),
    ("TEXT_CLIPPED", QaCode::TextClipped),
    ("TEXT_OVERLAP", QaCode::TextOverlap),
    ("LOGO_TOO_SMALL", QaCode::LogoTooSmall),
    ("LOGO_CLIPPED", QaCode::LogoClipped),
    ("LOGO_DISTORTED", QaCode::LogoDistorted),
    ("FACE_CLIPPED", QaCode::FaceClipped),
    ("FACE_OBSCURED", QaCode::FaceObscured),
    ("SUBJECT_CLIPPED", QaCode::SubjectClipped),
    ("SUBJECT_OFF_CENTER", QaCode::SubjectOffCenter),
    ("CTA_MISSING", QaCode::CtaMissing),
    ("CTA_TOO_SMALL", QaCode::CtaTooSmall),
    ("CTA_OBSCURED", QaCode::CtaObscured),
    ("OUTSIDE_SAFE_AREA", QaCode::OutsideSafeArea),
    ("MISALIGNED", QaCode::Misaligned),
    ("ELEMENT_OVERLAP", QaCode::ElementOverlap),
    ("CROWDED", QaCode::Crowded),
    ("EXCESSIVE_WHITESPACE", QaCode::ExcessiveWhitespace),
    ("UNBALANCED", QaCode::Unbalanced),
    ("IMAGE_DISTORTED", QaCode::ImageDistorted),
    ("IMAGE_LOW_RESOLUTION", QaCode::ImageLowResolution),
    ("IMAGE_CROPPED", QaCode::ImageCropped),
    ("BACKGROUND_GAP", QaCode::BackgroundGap),
    ("HIERARCHY_UNCLEAR", QaCode::HierarchyUnclear),
    ("READABILITY_POOR", QaCode::ReadabilityPoor),
    ("COLOR_CLASH", QaCode::ColorClash),
    ("BRAND_INCONSISTENT", QaCode::BrandInconsistent),
    ("EDGE_TENSION", QaCode::EdgeTension),
    ("OTHER", QaCode::Other),
];

impl QaCode {
    /// Looks up an already upper-cased code.
    pub fn from_code(code: &str) -> Option<Self> {
        QA_VOCABULARY
            .iter()
            .find(|(name, _)| *name == code)
            .map(|(_, qa)| *qa)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    #[default]
    Warn,
    Error,
}

// ────────────────────────────────────────────────────────────────────────────
// Signal bundle
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub node_id: String,
    pub role: SemanticRole,
    /// In `[0, 1]`.
    pub confidence: f64,
}

/// Normalized point of interest; `x`/`y` in `[0, 1]` of the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocalPoint {
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaFlag {
    pub code: QaCode,
    pub severity: Severity,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

/// Normalized face box; all values are fractions of the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
}

/// Sanitized advisory signals. Only `sanitizer` constructs this from provider data, and
/// never with all four lists empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AiSignals {
    pub roles: Vec<RoleAssignment>,
    pub focal_points: Vec<FocalPoint>,
    pub qa: Vec<QaFlag>,
    pub face_regions: Vec<FaceRegion>,
}

impl AiSignals {
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
            && self.focal_points.is_empty()
            && self.qa.is_empty()
            && self.face_regions.is_empty()
    }
}
