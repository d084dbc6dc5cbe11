//! Retarget pipeline — turns one source composition into one variant per target.
//!
//! # Steps
//! 1. Clone the source for the target and map clone ids back to source ids.
//! 2. Leaderboard kill switch on the clone.
//! 3. Profiles, safe insets and the content box (whole frame when nothing qualifies).
//! 4. Uniform scale `min(safe_w / content_w, safe_h / content_h)`, kept strictly positive.
//! 5. Flow roots: snapshot, expansion plans, margin normalization, flow placement.
//!    Absolute roots: proportional centre mapping, stretched backgrounds, frame-mapped
//!    overlays, group reflow, margin normalization.
//! 6. Warnings over the finished frame.
//!
//! # Rules
//! - The source tree is never mutated.
//! - A node that refuses new geometry is logged and skipped with its subtree; siblings
//!   and the rest of the pass carry on.
//! - Structural errors (unknown target, snapshot misuse) fail the whole pass.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::bounds::combine_child_bounds;
use crate::analysis::roles::{NodeRole, RoleClassifier};
use crate::analysis::warnings::{collect_warnings, VariantWarning, WarningInput};
use crate::errors::{EngineError, MutationError};
use crate::layout::absolute::{map_bounds_between, plan_absolute_child_positions, AbsolutePlanInput};
use crate::layout::flow::{flow_content_extent, flow_cross_extent, layout_flow_children};
use crate::layout::grouping::GroupedElement;
use crate::layout::kill_switch::{apply_leaderboard_kill_switch, KillSwitchConfig, KillSwitchReport};
use crate::layout::margins::normalize_content_margins;
use crate::layout::padding::{
    plan_auto_layout_expansion, plan_auto_layout_expansion_with_floors, EdgeGaps, EdgeSplit,
};
use crate::layout::safe_area::{resolve_target_config, safe_bounds, TargetConfig};
use crate::layout::snapshot::{AutoLayoutSnapshot, AxisPlans, SnapshotStore};
use crate::layout::{resolve_layout_profile, EngineConfig, LayoutProfile};
use crate::models::geometry::{Axis, Insets, Rect, Size};
use crate::models::node::{ContentNode, SizingMode};
use crate::models::target::{find_target, TargetSpec};
use crate::retarget::clone::{clone_for_target, map_clone_ids};
use crate::signals::AiSignals;

/// Floor for the uniform scale factor.
const MIN_SCALE: f64 = 0.01;
const SHIFT_EPSILON: f64 = 1e-6;

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStrategy {
    Flow,
    Absolute,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetargetVariant {
    pub variant_id: Uuid,
    pub target: TargetSpec,
    pub strategy: LayoutStrategy,
    pub source_profile: LayoutProfile,
    pub target_profile: LayoutProfile,
    pub scale: f64,
    pub target_config: TargetConfig,
    /// Content box of the finished frame, in frame coordinates.
    pub content_box: Option<Rect>,
    pub frame: ContentNode,
    pub kill_switch: KillSwitchReport,
    pub warnings: Vec<VariantWarning>,
    /// Nodes whose geometry could not be applied.
    pub skipped_node_ids: Vec<String>,
    pub structural_mismatches: usize,
    pub generated_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry points
// ────────────────────────────────────────────────────────────────────────────

/// Retargets `source` into every id in `target_ids`, each on its own clone.
///
/// All ids are resolved before any work starts: one unknown id fails the request.
pub fn retarget_many(
    source: &ContentNode,
    target_ids: &[String],
    signals: Option<&AiSignals>,
    config: &EngineConfig,
) -> Result<Vec<RetargetVariant>, EngineError> {
    let targets = target_ids
        .iter()
        .map(|id| find_target(id))
        .collect::<Result<Vec<_>, _>>()?;

    targets
        .into_iter()
        .map(|target| retarget(source, target, signals, config))
        .collect()
}

/// Retargets `source` into a single `target`.
pub fn retarget(
    source: &ContentNode,
    target: &TargetSpec,
    signals: Option<&AiSignals>,
    config: &EngineConfig,
) -> Result<RetargetVariant, EngineError> {
    let source_size = source.bounds.size();
    if !source.bounds.is_finite() || source_size.width <= 0.0 || source_size.height <= 0.0 {
        return Err(EngineError::InvalidDimensions {
            width: source_size.width,
            height: source_size.height,
        });
    }

    let mut frame = clone_for_target(source, target.id);
    let ids = map_clone_ids(source, &frame);
    let classifier =
        RoleClassifier::new(&frame, signals, config.ai_role_min_confidence).rekeyed(&ids.clone_to_source);

    let kill_switch = apply_leaderboard_kill_switch(
        &mut frame,
        target,
        KillSwitchConfig {
            height_threshold: config.leaderboard_height_threshold,
        },
        &classifier,
    );

    let target_config = resolve_target_config(target, config.safe_area_ratio);
    let safe = safe_bounds(target, config.safe_area_ratio);
    let content = combine_child_bounds(&frame, &classifier).unwrap_or_else(|| Rect::from_size(source_size));

    let ctx = PassContext {
        target,
        classifier: &classifier,
        source_size,
        source_profile: resolve_layout_profile(source_size),
        target_profile: resolve_layout_profile(target.size()),
        safe,
        safe_insets: target_config.insets,
        content,
        scale: scale_factor(&content, &safe),
    };
    debug!(
        target = target.id,
        scale = ctx.scale,
        source_profile = ?ctx.source_profile,
        target_profile = ?ctx.target_profile,
        "Retarget pass planned"
    );

    let mut pass = Pass::default();
    let strategy = if frame.is_flow_container() {
        pass.retarget_flow_root(&mut frame, &ctx)?;
        LayoutStrategy::Flow
    } else {
        pass.retarget_absolute_root(&mut frame, &ctx)?;
        LayoutStrategy::Absolute
    };

    let final_classifier =
        RoleClassifier::new(&frame, signals, config.ai_role_min_confidence).rekeyed(&ids.clone_to_source);
    let warnings = collect_warnings(
        &WarningInput {
            frame: &frame,
            target,
            classifier: &final_classifier,
            signals,
            kill_switch: Some(&kill_switch),
        },
        config,
    );
    let content_box = combine_child_bounds(&frame, &final_classifier);

    info!(
        target = target.id,
        strategy = ?strategy,
        scale = ctx.scale,
        warnings = warnings.len(),
        skipped = pass.skipped.len(),
        "Variant generated"
    );

    Ok(RetargetVariant {
        variant_id: Uuid::new_v4(),
        target: *target,
        strategy,
        source_profile: ctx.source_profile,
        target_profile: ctx.target_profile,
        scale: ctx.scale,
        target_config,
        content_box,
        frame,
        kill_switch,
        warnings,
        skipped_node_ids: pass.skipped,
        structural_mismatches: ids.mismatches,
        generated_at: Utc::now(),
    })
}

/// Uniform factor that fits `content` inside `safe`. Never zero, negative or non-finite.
pub fn scale_factor(content: &Rect, safe: &Rect) -> f64 {
    let scale = (safe.width / content.width.max(1.0)).min(safe.height / content.height.max(1.0));
    if scale.is_finite() {
        scale.max(MIN_SCALE)
    } else {
        1.0
    }
}

/// Applies new bounds to one node, refusing what a design tool would refuse.
pub fn try_set_bounds(node: &mut ContentNode, bounds: Rect) -> Result<(), MutationError> {
    if node.locked {
        return Err(MutationError::Locked(node.id.clone()));
    }
    if !bounds.is_finite() {
        return Err(MutationError::NonFiniteGeometry(node.id.clone()));
    }
    let had_area = node.bounds.width > 0.0 && node.bounds.height > 0.0;
    if bounds.width < 0.0 || bounds.height < 0.0 || (had_area && (bounds.width == 0.0 || bounds.height == 0.0)) {
        return Err(MutationError::UnsupportedResize(node.id.clone()));
    }
    node.bounds = bounds;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Pass internals
// ────────────────────────────────────────────────────────────────────────────

struct PassContext<'a> {
    target: &'a TargetSpec,
    classifier: &'a RoleClassifier,
    source_size: Size,
    source_profile: LayoutProfile,
    target_profile: LayoutProfile,
    safe: Rect,
    safe_insets: Insets,
    /// Source content box in frame coordinates.
    content: Rect,
    scale: f64,
}

impl PassContext<'_> {
    fn normalize_margins(&self, margins: Insets) -> Insets {
        normalize_content_margins(
            Some(margins),
            self.source_profile,
            self.target_profile,
            self.source_size.aspect_ratio(),
            self.target.aspect_ratio(),
        )
        .unwrap_or(margins)
    }
}

#[derive(Default)]
struct Pass {
    snapshots: SnapshotStore,
    skipped: Vec<String>,
}

impl Pass {
    fn apply(&mut self, node: &mut ContentNode, bounds: Rect) -> bool {
        match try_set_bounds(node, bounds) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Skipping node");
                let id = e.node_id().to_string();
                if !self.skipped.contains(&id) {
                    self.skipped.push(id);
                }
                false
            }
        }
    }

    /// Scales `node`'s descendants by `scale` about `node`'s origin. Nested flow
    /// containers are snapshotted first and restored at the same scale.
    fn scale_subtree(&mut self, node: &mut ContentNode, scale: f64) -> Result<(), EngineError> {
        if !node.is_flow_container() {
            return self.scale_children(node, scale);
        }
        self.snapshots.capture(node)?;
        self.scale_children(node, scale)?;
        let snapshot = self.snapshots.take(&node.id)?;
        node.flow_layout = Some(snapshot.restore(scale, None));
        layout_flow_children(node);
        Ok(())
    }

    fn scale_children(&mut self, node: &mut ContentNode, scale: f64) -> Result<(), EngineError> {
        for child in &mut node.children {
            let bounds = child.bounds.scaled(scale);
            self.scale_node_into(child, bounds, scale)?;
        }
        Ok(())
    }

    /// Moves `node` to `bounds` and scales its content by `scale`; skipped when refused.
    fn scale_node_into(&mut self, node: &mut ContentNode, bounds: Rect, scale: f64) -> Result<(), EngineError> {
        if !self.apply(node, bounds) {
            return Ok(());
        }
        node.font_size = node.font_size.map(|size| size * scale);
        self.scale_subtree(node, scale)
    }

    // ── Flow root ───────────────────────────────────────────────────────────

    fn retarget_flow_root(&mut self, frame: &mut ContentNode, ctx: &PassContext<'_>) -> Result<(), EngineError> {
        self.snapshots.capture(frame)?;
        self.scale_children(frame, ctx.scale)?;
        let snapshot = self.snapshots.take(&frame.id)?;

        let plans = plan_root_expansion(&snapshot, frame, ctx);
        debug!(primary = ?plans.primary, counter = ?plans.counter, "Flow root expansion planned");

        let mut layout = snapshot.restore(ctx.scale, Some(&plans));
        let normalized = ctx.normalize_margins(layout.padding).clamp_non_negative();
        layout.padding = hold_safe_insets(normalized, &ctx.safe_insets).rounded();
        layout.primary_sizing = SizingMode::Fixed;
        layout.counter_sizing = SizingMode::Fixed;

        frame.bounds = Rect::new(frame.bounds.x, frame.bounds.y, ctx.target.width, ctx.target.height);
        frame.flow_layout = Some(layout);
        layout_flow_children(frame);
        Ok(())
    }

    // ── Absolute root ───────────────────────────────────────────────────────

    fn retarget_absolute_root(&mut self, frame: &mut ContentNode, ctx: &PassContext<'_>) -> Result<(), EngineError> {
        let source_rect = Rect::from_size(ctx.source_size);
        let dest_rect = Rect::from_size(ctx.target.size());
        let width_ratio = dest_rect.width / source_rect.width;
        let height_ratio = dest_rect.height / source_rect.height;
        let fit_scale = width_ratio.min(height_ratio);
        let cover_scale = width_ratio.max(height_ratio);

        let safe_center = ctx.safe.center();
        let dest_content = Rect::new(
            safe_center.x - ctx.content.width * ctx.scale / 2.0,
            safe_center.y - ctx.content.height * ctx.scale / 2.0,
            ctx.content.width * ctx.scale,
            ctx.content.height * ctx.scale,
        );

        frame.bounds = Rect::new(frame.bounds.x, frame.bounds.y, ctx.target.width, ctx.target.height);

        let mut content_indices = Vec::new();
        for (z_index, child) in frame.children.iter_mut().enumerate() {
            let role = ctx.classifier.classify(child, z_index).role;
            let (bounds, scale) = match role {
                NodeRole::Background => (dest_rect, cover_scale),
                NodeRole::Overlay | NodeRole::HeroBleed => (
                    map_bounds_between(&child.bounds, &source_rect, &dest_rect, fit_scale),
                    fit_scale,
                ),
                _ => (
                    map_bounds_between(&child.bounds, &ctx.content, &dest_content, ctx.scale),
                    ctx.scale,
                ),
            };
            self.scale_node_into(child, bounds, scale)?;
            if child.visible && !role.is_excluded_from_content() {
                content_indices.push(z_index);
            }
        }

        self.reflow_groups(frame, &content_indices, ctx)?;
        self.normalize_absolute_margins(frame, &content_indices, &dest_rect, ctx);
        Ok(())
    }

    fn reflow_groups(
        &mut self,
        frame: &mut ContentNode,
        content_indices: &[usize],
        ctx: &PassContext<'_>,
    ) -> Result<(), EngineError> {
        let elements: Vec<GroupedElement> = content_indices
            .iter()
            .map(|&i| GroupedElement::from_node(&frame.children[i]))
            .collect();
        let positions = plan_absolute_child_positions(&AbsolutePlanInput {
            profile: ctx.target_profile,
            safe_bounds: ctx.safe,
            children: &elements,
            target_aspect_ratio: Some(ctx.target.aspect_ratio()),
        });

        for position in positions {
            let Some(child) = frame.children.iter_mut().find(|c| c.id == position.id) else {
                continue;
            };
            if child.bounds == position.bounds {
                continue;
            }
            let shrink = if child.bounds.width > 0.0 {
                position.bounds.width / child.bounds.width
            } else {
                1.0
            };
            if (shrink - 1.0).abs() < SHIFT_EPSILON {
                self.apply(child, position.bounds);
            } else {
                self.scale_node_into(child, position.bounds, shrink)?;
            }
        }
        Ok(())
    }

    /// Shifts content so lopsided margins are rebalanced; normalization preserves each
    /// axis' margin sum, so a translation is enough.
    fn normalize_absolute_margins(
        &mut self,
        frame: &mut ContentNode,
        content_indices: &[usize],
        dest_rect: &Rect,
        ctx: &PassContext<'_>,
    ) {
        let Some(content) = content_indices
            .iter()
            .map(|&i| frame.children[i].bounds)
            .reduce(|a, b| a.union(&b))
        else {
            return;
        };
        let margins = Insets::between(dest_rect, &content);
        let normalized = ctx.normalize_margins(margins);
        let dx = clamp_shift(normalized.left - margins.left, Axis::Horizontal, &content, &ctx.safe);
        let dy = clamp_shift(normalized.top - margins.top, Axis::Vertical, &content, &ctx.safe);
        if dx.abs() < SHIFT_EPSILON && dy.abs() < SHIFT_EPSILON {
            return;
        }
        debug!(dx, dy, "Shifting content to rebalance margins");
        for &i in content_indices {
            let child = &mut frame.children[i];
            let shifted = child.bounds.translated(dx, dy);
            self.apply(child, shifted);
        }
    }
}

/// Expansion plans for a flow root whose children are already scaled.
fn plan_root_expansion(snapshot: &AutoLayoutSnapshot, frame: &ContentNode, ctx: &PassContext<'_>) -> AxisPlans {
    let layout = &snapshot.layout;
    let padding = layout.padding.scaled(ctx.scale);
    let spacing = layout.item_spacing * ctx.scale;
    let target_size = ctx.target.size();

    let plan_axis = |axis: Axis, content_len: f64, flow_child_count: usize| {
        let (pad_start, pad_end) = axis.insets(&padding);
        let (safe_start, safe_end) = axis.insets(&ctx.safe_insets);
        let total_extra = axis.length(&target_size) - content_len - pad_start - pad_end;
        let floors = EdgeSplit::new((safe_start - pad_start).max(0.0), (safe_end - pad_end).max(0.0));
        let gaps = Some(EdgeGaps::new(pad_start, pad_end));
        if floors.start == floors.end {
            plan_auto_layout_expansion(total_extra, floors.start, gaps, flow_child_count, spacing)
        } else {
            plan_auto_layout_expansion_with_floors(total_extra, floors, gaps, flow_child_count, spacing)
        }
    };

    let primary = layout.direction;
    let counter = primary.cross();
    AxisPlans {
        primary: plan_axis(
            primary,
            flow_content_extent(frame, primary, spacing),
            snapshot.flow_child_count,
        ),
        counter: plan_axis(counter, flow_cross_extent(frame, counter), 1),
    }
}

/// Moves padding from one edge to the other until both edges clear their safe inset,
/// as far as the axis total allows. The per-axis sum is unchanged.
fn hold_safe_insets(padding: Insets, safe: &Insets) -> Insets {
    let (left, right) = rebalance_edges(padding.left, padding.right, safe.left, safe.right);
    let (top, bottom) = rebalance_edges(padding.top, padding.bottom, safe.top, safe.bottom);
    Insets::new(left, right, top, bottom)
}

fn rebalance_edges(start: f64, end: f64, safe_start: f64, safe_end: f64) -> (f64, f64) {
    if start < safe_start {
        let moved = (safe_start - start).min((end - safe_end).max(0.0));
        (start + moved, end - moved)
    } else if end < safe_end {
        let moved = (safe_end - end).min((start - safe_start).max(0.0));
        (start - moved, end + moved)
    } else {
        (start, end)
    }
}

/// Limits a margin-rebalancing shift so content that fits the safe area stays inside it.
fn clamp_shift(shift: f64, axis: Axis, content: &Rect, safe: &Rect) -> f64 {
    let (start, len) = axis.span(content);
    let (safe_start, safe_len) = axis.span(safe);
    if len > safe_len {
        return shift;
    }
    let lo = (safe_start - start).min(0.0);
    let hi = (safe_start + safe_len - start - len).max(0.0);
    shift.clamp(lo, hi)
}
