// Advisory AI signals.
// The provider's raw JSON never reaches the engine: `sanitizer` is the single gate that
// turns it into the typed `models::AiSignals`, or into nothing at all.

pub mod models;
pub mod sanitizer;

pub use models::{AiSignals, QaCode, SemanticRole, Severity};
pub use sanitizer::{parse_ai_payload, sanitize_ai_signals};
