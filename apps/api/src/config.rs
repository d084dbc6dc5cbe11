use std::str::FromStr;

use anyhow::{Context, Result};

use crate::layout::EngineConfig;

/// Application configuration loaded from environment variables.
/// Every variable is optional; a malformed value is a startup error.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub safe_area_ratio: f64,
    pub leaderboard_height_threshold: f64,
    pub ai_role_min_confidence: f64,
    pub ai_qa_min_confidence: f64,
    pub misalignment_tolerance: f64,
    pub min_legible_font_px: f64,
}

impl Default for Config {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            safe_area_ratio: engine.safe_area_ratio,
            leaderboard_height_threshold: engine.leaderboard_height_threshold,
            ai_role_min_confidence: engine.ai_role_min_confidence,
            ai_qa_min_confidence: engine.ai_qa_min_confidence,
            misalignment_tolerance: engine.misalignment_tolerance,
            min_legible_font_px: engine.min_legible_font_px,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: env_or("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            safe_area_ratio: env_or("SAFE_AREA_RATIO", defaults.safe_area_ratio)?,
            leaderboard_height_threshold: env_or(
                "LEADERBOARD_HEIGHT_THRESHOLD",
                defaults.leaderboard_height_threshold,
            )?,
            ai_role_min_confidence: env_or("AI_ROLE_MIN_CONFIDENCE", defaults.ai_role_min_confidence)?,
            ai_qa_min_confidence: env_or("AI_QA_MIN_CONFIDENCE", defaults.ai_qa_min_confidence)?,
            misalignment_tolerance: env_or("MISALIGNMENT_TOLERANCE", defaults.misalignment_tolerance)?,
            min_legible_font_px: env_or("MIN_LEGIBLE_FONT_PX", defaults.min_legible_font_px)?,
        })
    }

    /// Engine thresholds derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            safe_area_ratio: self.safe_area_ratio,
            leaderboard_height_threshold: self.leaderboard_height_threshold,
            ai_role_min_confidence: self.ai_role_min_confidence,
            ai_qa_min_confidence: self.ai_qa_min_confidence,
            misalignment_tolerance: self.misalignment_tolerance,
            min_legible_font_px: self.min_legible_font_px,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(key, std::env::var(key).ok(), default)
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: '{value}'")),
    }
}
