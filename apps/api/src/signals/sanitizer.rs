//! Sanitization of untrusted AI provider output.
//!
//! # Rules
//! - Every numeric field is forced into a valid range; an entry with an unusable required
//!   field (no node id, non-numeric coordinates, unknown vocabulary) is dropped.
//! - A payload that is not an object, or that sanitizes to four empty lists, yields `None`.
//! - Keys are accepted in camelCase or snake_case.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::models::{
    AiSignals, FaceRegion, FocalPoint, QaCode, QaFlag, RoleAssignment, SemanticRole, Severity,
};

const DEFAULT_CONFIDENCE: f64 = 0.5;
const FACE_MIN_SIDE: f64 = 0.03;
const FACE_MAX_SIDE: f64 = 0.8;

// ────────────────────────────────────────────────────────────────────────────
// Scalars
// ────────────────────────────────────────────────────────────────────────────

/// Maps a value onto `[0, 1]`. Values in `(1, 100]` are read as percentages; anything
/// else is clamped. Non-finite input yields `None` so the caller's default applies.
pub fn clamp_to_unit(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let scaled = if value > 1.0 && value <= 100.0 {
        value / 100.0
    } else {
        value
    };
    Some(scaled.clamp(0.0, 1.0))
}

/// [`clamp_to_unit`] over a JSON number or a plain numeric string.
pub fn parse_unit(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().and_then(clamp_to_unit),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(clamp_to_unit),
        _ => None,
    }
}

/// Lower snake_case: camel boundaries split, spaces and dashes become underscores,
/// runs of underscores collapse.
pub fn normalize_role_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev_lower_or_digit = false;
    for ch in raw.trim().chars() {
        if ch.is_uppercase() && prev_lower_or_digit {
            out.push('_');
        }
        prev_lower_or_digit = ch.is_lowercase() || ch.is_ascii_digit();
        match ch {
            ' ' | '-' => out.push('_'),
            c => out.extend(c.to_lowercase()),
        }
    }

    let mut collapsed = String::with_capacity(out.len());
    for ch in out.chars() {
        if ch == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(ch);
    }
    collapsed.trim_matches('_').to_string()
}

fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

fn list<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    match field(obj, keys) {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

fn confidence_of(obj: &Map<String, Value>) -> f64 {
    obj.get("confidence")
        .and_then(parse_unit)
        .unwrap_or(DEFAULT_CONFIDENCE)
}

fn non_empty_str<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    field(obj, keys)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Entries
// ────────────────────────────────────────────────────────────────────────────

fn sanitize_role(entry: &Value) -> Option<RoleAssignment> {
    let obj = entry.as_object()?;
    let node_id = non_empty_str(obj, &["nodeId", "node_id"])?;
    let label = non_empty_str(obj, &["role"])?;
    let role = SemanticRole::from_label(&normalize_role_label(label))?;
    Some(RoleAssignment {
        node_id: node_id.to_string(),
        role,
        confidence: confidence_of(obj),
    })
}

fn sanitize_focal_point(entry: &Value) -> Option<FocalPoint> {
    let obj = entry.as_object()?;
    let x = obj.get("x")?.as_f64()?;
    let y = obj.get("y")?.as_f64()?;
    Some(FocalPoint {
        x: x.clamp(0.0, 1.0),
        y: y.clamp(0.0, 1.0),
        confidence: confidence_of(obj),
    })
}

fn sanitize_face_region(entry: &Value) -> Option<FaceRegion> {
    let obj = entry.as_object()?;
    let x = obj.get("x")?.as_f64()?;
    let y = obj.get("y")?.as_f64()?;
    let width = obj.get("width").or_else(|| obj.get("w"))?.as_f64()?;
    let height = obj.get("height").or_else(|| obj.get("h"))?.as_f64()?;
    Some(FaceRegion {
        x: x.clamp(0.0, 1.0),
        y: y.clamp(0.0, 1.0),
        width: width.clamp(FACE_MIN_SIDE, FACE_MAX_SIDE),
        height: height.clamp(FACE_MIN_SIDE, FACE_MAX_SIDE),
        confidence: confidence_of(obj),
    })
}

fn sanitize_qa(entry: &Value) -> Option<QaFlag> {
    let obj = entry.as_object()?;
    let raw_code = non_empty_str(obj, &["code"])?;
    let code = QaCode::from_code(&raw_code.to_uppercase().replace(['-', ' '], "_"))?;
    let severity = match obj.get("severity").and_then(Value::as_str) {
        Some("info") => Severity::Info,
        Some("error") => Severity::Error,
        _ => Severity::Warn,
    };
    Some(QaFlag {
        code,
        severity,
        confidence: confidence_of(obj),
        message: non_empty_str(obj, &["message"]).map(str::to_string),
        node_id: non_empty_str(obj, &["nodeId", "node_id"]).map(str::to_string),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Payload
// ────────────────────────────────────────────────────────────────────────────

/// Sanitizes a parsed provider payload. Never panics, whatever the input shape.
pub fn sanitize_ai_signals(raw: &Value) -> Option<AiSignals> {
    let obj = raw.as_object()?;

    let signals = AiSignals {
        roles: list(obj, &["roles"]).iter().filter_map(sanitize_role).collect(),
        focal_points: list(obj, &["focalPoints", "focal_points"])
            .iter()
            .filter_map(sanitize_focal_point)
            .collect(),
        qa: list(obj, &["qa"]).iter().filter_map(sanitize_qa).collect(),
        face_regions: list(obj, &["faceRegions", "face_regions"])
            .iter()
            .filter_map(sanitize_face_region)
            .collect(),
    };

    if signals.is_empty() {
        debug!("AI payload sanitized to nothing");
        return None;
    }
    debug!(
        roles = signals.roles.len(),
        focal_points = signals.focal_points.len(),
        qa = signals.qa.len(),
        faces = signals.face_regions.len(),
        "AI signals sanitized"
    );
    Some(signals)
}

/// Parses provider text that may be wrapped in markdown code fences, then sanitizes it.
pub fn parse_ai_payload(text: &str) -> Option<AiSignals> {
    match serde_json::from_str::<Value>(strip_json_fences(text)) {
        Ok(value) => sanitize_ai_signals(&value),
        Err(e) => {
            warn!(error = %e, "AI payload is not valid JSON; ignoring");
            None
        }
    }
}

fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    stripped
        .trim_start()
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(stripped.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clamp_to_unit_percentages_and_bounds() {
        assert_eq!(clamp_to_unit(0.4), Some(0.4));
        assert_eq!(clamp_to_unit(76.0), Some(0.76));
        assert_eq!(clamp_to_unit(150.0), Some(1.0));
        assert_eq!(clamp_to_unit(-3.0), Some(0.0));
        assert_eq!(clamp_to_unit(1.0), Some(1.0));
        assert_eq!(clamp_to_unit(f64::NAN), None);
        assert_eq!(clamp_to_unit(f64::INFINITY), None);
    }

    #[test]
    fn test_parse_unit_accepts_numeric_strings_only() {
        assert_eq!(parse_unit(&json!("76")), Some(0.76));
        assert_eq!(parse_unit(&json!(" 0.25 ")), Some(0.25));
        assert_eq!(parse_unit(&json!("76%")), None);
        assert_eq!(parse_unit(&json!(true)), None);
        assert_eq!(parse_unit(&Value::Null), None);
    }

    #[test]
    fn test_normalize_role_label() {
        assert_eq!(normalize_role_label("HeroImage"), "hero_image");
        assert_eq!(normalize_role_label("brand-mark"), "brand_mark");
        assert_eq!(normalize_role_label("  Hero  Image "), "hero_image");
        assert_eq!(normalize_role_label("CTA"), "cta");
        assert_eq!(normalize_role_label("hero__image"), "hero_image");
    }

    #[test]
    fn test_non_object_payload_is_none() {
        assert!(sanitize_ai_signals(&json!([1, 2, 3])).is_none());
        assert!(sanitize_ai_signals(&json!("roles")).is_none());
        assert!(sanitize_ai_signals(&Value::Null).is_none());
    }

    #[test]
    fn test_all_empty_payload_is_none() {
        let raw = json!({ "roles": [], "focalPoints": "nope", "qa": [{ "code": "NOT_A_CODE" }] });
        assert!(sanitize_ai_signals(&raw).is_none());
    }

    #[test]
    fn test_role_entries_sanitized() {
        let raw = json!({
            "roles": [
                { "nodeId": "n1", "role": "HeroImage", "confidence": 76 },
                { "nodeId": "n2", "role": "brand-mark" },
                { "nodeId": "", "role": "logo" },
                { "role": "logo" },
                { "nodeId": "n3", "role": "spaceship" },
                { "node_id": "n4", "role": "cta", "confidence": "0.9" }
            ]
        });
        let signals = sanitize_ai_signals(&raw).unwrap();
        assert_eq!(signals.roles.len(), 3);
        assert_eq!(signals.roles[0].role, SemanticRole::HeroImage);
        assert!((signals.roles[0].confidence - 0.76).abs() < 1e-9);
        assert_eq!(signals.roles[1].role, SemanticRole::BrandMark);
        assert_eq!(signals.roles[1].confidence, DEFAULT_CONFIDENCE);
        assert_eq!(signals.roles[2].node_id, "n4");
        assert!((signals.roles[2].confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_focal_points_and_faces_clamped() {
        let raw = json!({
            "focalPoints": [{ "x": 1.4, "y": -0.2 }, { "x": "0.5", "y": 0.5 }],
            "faceRegions": [{ "x": 0.2, "y": 0.3, "width": 0.001, "height": 0.95 }]
        });
        let signals = sanitize_ai_signals(&raw).unwrap();
        assert_eq!(signals.focal_points.len(), 1);
        assert_eq!(signals.focal_points[0].x, 1.0);
        assert_eq!(signals.focal_points[0].y, 0.0);

        let face = &signals.face_regions[0];
        assert_eq!(face.width, FACE_MIN_SIDE);
        assert_eq!(face.height, FACE_MAX_SIDE);
    }

    #[test]
    fn test_qa_entries_sanitized() {
        let raw = json!({
            "qa": [
                { "code": "low_contrast", "severity": "error", "confidence": 0.8 },
                { "code": "TEXT_TOO_SMALL", "severity": "catastrophic" },
                { "code": "made up" }
            ]
        });
        let signals = sanitize_ai_signals(&raw).unwrap();
        assert_eq!(signals.qa.len(), 2);
        assert_eq!(signals.qa[0].code, QaCode::LowContrast);
        assert_eq!(signals.qa[0].severity, Severity::Error);
        assert_eq!(signals.qa[1].severity, Severity::Warn);
        assert_eq!(signals.qa[1].confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_parse_ai_payload_with_fences() {
        let text = "```json\n{\"roles\":[{\"nodeId\":\"a\",\"role\":\"logo\"}]}\n```";
        let signals = parse_ai_payload(text).unwrap();
        assert_eq!(signals.roles[0].role, SemanticRole::Logo);
        assert!(parse_ai_payload("not json at all").is_none());
    }

    #[test]
    fn test_strip_json_fences_variants() {
        assert_eq!(strip_json_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_json_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_json_fences("  {}  "), "{}");
    }

    // Seeded LCG; the fuzz case is reproducible.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            self.0 >> 33
        }

        fn value(&mut self, depth: u32) -> Value {
            let pick = if depth > 3 { self.next() % 5 } else { self.next() % 7 };
            match pick {
                0 => Value::Null,
                1 => Value::from(self.next() % 2 == 0),
                2 => Value::from((self.next() as f64 - 1e9) / 1e7),
                3 => {
                    let words = ["hero", "Logo", "x", "low-contrast", "76", "error"];
                    Value::from(words[(self.next() % 6) as usize])
                }
                4 => Value::from(self.next() % 300),
                5 => Value::Array((0..self.next() % 4).map(|_| self.value(depth + 1)).collect()),
                _ => {
                    let keys = ["roles", "qa", "focalPoints", "faceRegions", "nodeId", "role", "x", "y", "width", "height", "confidence", "code", "severity"];
                    let mut map = Map::new();
                    for _ in 0..self.next() % 6 {
                        let key = keys[(self.next() % keys.len() as u64) as usize];
                        map.insert(key.to_string(), self.value(depth + 1));
                    }
                    Value::Object(map)
                }
            }
        }
    }

    #[test]
    fn test_fuzzed_payloads_always_in_range() {
        let mut rng = Lcg(0xC0FFEE);
        for _ in 0..2_000 {
            let raw = rng.value(0);
            let Some(signals) = sanitize_ai_signals(&raw) else {
                continue;
            };
            assert!(!signals.is_empty());
            let unit = |v: f64| (0.0..=1.0).contains(&v);
            for r in &signals.roles {
                assert!(!r.node_id.is_empty());
                assert!(unit(r.confidence));
            }
            for p in &signals.focal_points {
                assert!(unit(p.x) && unit(p.y) && unit(p.confidence));
            }
            for f in &signals.face_regions {
                assert!(unit(f.x) && unit(f.y) && unit(f.confidence));
                assert!((FACE_MIN_SIDE..=FACE_MAX_SIDE).contains(&f.width));
                assert!((FACE_MIN_SIDE..=FACE_MAX_SIDE).contains(&f.height));
            }
            for q in &signals.qa {
                assert!(unit(q.confidence));
            }
        }
    }
}
