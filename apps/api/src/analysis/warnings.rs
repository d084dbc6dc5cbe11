//! Variant QA warnings.
//!
//! # Rules
//! - Geometric warnings come first, in detection order, then AI warnings.
//! - Only geometric checks may emit `error`. AI findings are re-coded into the stable
//!   `AI_*` vocabulary and capped at `warn`.
//! - AI findings below the configured confidence are dropped entirely.

use serde::Serialize;

use crate::analysis::bounds::combine_child_bounds;
use crate::analysis::roles::RoleClassifier;
use crate::layout::kill_switch::KillSwitchReport;
use crate::layout::safe_area::safe_bounds;
use crate::layout::EngineConfig;
use crate::models::geometry::Rect;
use crate::models::node::ContentNode;
use crate::models::target::TargetSpec;
use crate::signals::{AiSignals, QaCode, Severity};

/// Sub-pixel slack for containment checks.
const CONTAINMENT_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    OutsideSafeArea,
    ContentClipped,
    Misaligned,
    TextTooSmall,
    KillSwitchActivated,
    AiLowContrast,
    AiTextTooSmall,
    AiTextOverflow,
    AiLogoIssue,
    AiFaceClipped,
    AiSubjectClipped,
    AiCtaIssue,
    AiOutsideSafeArea,
    AiMisaligned,
    AiOverlap,
    AiCrowded,
    AiUnbalanced,
    AiImageQuality,
    AiGeneric,
}

impl WarningCode {
    /// Stable internal code for an AI QA finding.
    pub fn from_ai(code: QaCode) -> Self {
        match code {
            QaCode::LowContrast | QaCode::ColorClash => WarningCode::AiLowContrast,
            QaCode::TextTooSmall | QaCode::ReadabilityPoor => WarningCode::AiTextTooSmall,
            QaCode::TextOverflow | QaCode::TextClipped => WarningCode::AiTextOverflow,
            QaCode::LogoTooSmall | QaCode::LogoClipped | QaCode::LogoDistorted => WarningCode::AiLogoIssue,
            QaCode::FaceClipped | QaCode::FaceObscured => WarningCode::AiFaceClipped,
            QaCode::SubjectClipped => WarningCode::AiSubjectClipped,
            QaCode::CtaMissing | QaCode::CtaTooSmall | QaCode::CtaObscured => WarningCode::AiCtaIssue,
            QaCode::OutsideSafeArea => WarningCode::AiOutsideSafeArea,
            QaCode::Misaligned => WarningCode::AiMisaligned,
            QaCode::TextOverlap | QaCode::ElementOverlap => WarningCode::AiOverlap,
            QaCode::Crowded => WarningCode::AiCrowded,
            QaCode::Unbalanced
            | QaCode::ExcessiveWhitespace
            | QaCode::SubjectOffCenter
            | QaCode::EdgeTension => WarningCode::AiUnbalanced,
            QaCode::ImageDistorted
            | QaCode::ImageLowResolution
            | QaCode::ImageCropped
            | QaCode::BackgroundGap => WarningCode::AiImageQuality,
            QaCode::HierarchyUnclear | QaCode::BrandInconsistent | QaCode::Other => WarningCode::AiGeneric,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantWarning {
    pub code: WarningCode,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VariantWarning {
    fn new(code: WarningCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: Some(message.into()),
        }
    }
}

/// Everything the collector reads about one finished variant.
#[derive(Debug, Clone, Copy)]
pub struct WarningInput<'a> {
    /// The retargeted frame, sized to the target.
    pub frame: &'a ContentNode,
    pub target: &'a TargetSpec,
    pub classifier: &'a RoleClassifier,
    pub signals: Option<&'a AiSignals>,
    pub kill_switch: Option<&'a KillSwitchReport>,
}

/// Audits a finished variant: geometric checks followed by surviving AI QA findings.
pub fn collect_warnings(input: &WarningInput<'_>, config: &EngineConfig) -> Vec<VariantWarning> {
    let mut warnings = geometric_warnings(input, config);
    if let Some(signals) = input.signals {
        warnings.extend(ai_warnings(signals, config.ai_qa_min_confidence));
    }
    warnings
}

fn geometric_warnings(input: &WarningInput<'_>, config: &EngineConfig) -> Vec<VariantWarning> {
    let mut warnings = Vec::new();
    let frame_rect = Rect::from_size(input.frame.bounds.size());

    if let Some(content) = combine_child_bounds(input.frame, input.classifier) {
        let safe = safe_bounds(input.target, config.safe_area_ratio);
        if !safe.contains_rect(&content, CONTAINMENT_TOLERANCE) {
            warnings.push(VariantWarning::new(
                WarningCode::OutsideSafeArea,
                Severity::Warn,
                format!("Content extends beyond the {} safe area", input.target.label),
            ));
        }
        if !frame_rect.contains_rect(&content, CONTAINMENT_TOLERANCE) {
            warnings.push(VariantWarning::new(
                WarningCode::ContentClipped,
                Severity::Error,
                "Content is clipped by the frame edge",
            ));
        }

        let (content_center, frame_center) = (content.center(), frame_rect.center());
        let dx = (content_center.x - frame_center.x).abs() / frame_rect.width.max(1.0);
        let dy = (content_center.y - frame_center.y).abs() / frame_rect.height.max(1.0);
        if dx > config.misalignment_tolerance || dy > config.misalignment_tolerance {
            warnings.push(VariantWarning::new(
                WarningCode::Misaligned,
                Severity::Warn,
                format!("Content centre is off by {:.0}% / {:.0}%", dx * 100.0, dy * 100.0),
            ));
        }
    }

    let mut small = Vec::new();
    collect_small_text(input.frame, config.min_legible_font_px, &mut small);
    if let Some(smallest) = small.iter().copied().reduce(f64::min) {
        warnings.push(VariantWarning::new(
            WarningCode::TextTooSmall,
            Severity::Warn,
            format!(
                "{} text layer(s) below {}px (smallest {:.1}px)",
                small.len(),
                config.min_legible_font_px,
                smallest
            ),
        ));
    }

    if let Some(report) = input.kill_switch.filter(|r| r.activated && !r.hidden_node_ids.is_empty()) {
        warnings.push(VariantWarning::new(
            WarningCode::KillSwitchActivated,
            Severity::Info,
            format!(
                "Hid {} hero/subject layer(s): target height {}px is below {}px",
                report.hidden_node_ids.len(),
                report.target_height,
                report.threshold
            ),
        ));
    }

    warnings
}

fn collect_small_text(node: &ContentNode, min_px: f64, out: &mut Vec<f64>) {
    for child in node.children.iter().filter(|c| c.visible) {
        if let Some(size) = child.font_size.filter(|_| child.is_text()) {
            if size < min_px {
                out.push(size);
            }
        }
        collect_small_text(child, min_px, out);
    }
}

fn ai_warnings(signals: &AiSignals, min_confidence: f64) -> impl Iterator<Item = VariantWarning> + '_ {
    signals
        .qa
        .iter()
        .filter(move |flag| flag.confidence >= min_confidence)
        .map(|flag| VariantWarning {
            code: WarningCode::from_ai(flag.code),
            severity: flag.severity.min(Severity::Warn),
            message: flag.message.clone(),
        })
}
