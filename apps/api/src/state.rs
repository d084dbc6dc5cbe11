use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::layout::EngineConfig;
use crate::signals::AiSignals;

/// Sanitized AI bundles per source document. `None` records "asked, nothing usable".
pub type SignalCache = Arc<RwLock<HashMap<String, Option<AiSignals>>>>;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Thresholds handed to every retarget pass.
    pub engine: EngineConfig,
    /// The AI provider is called once per source document; every target pass reuses
    /// the cached result.
    pub signal_cache: SignalCache,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            engine: config.engine_config(),
            signal_cache: Arc::default(),
        }
    }
}
