//! Engine configuration.

use crate::domain::ModelVariant;

const FAMILY_HISTORY_EXTENSION_ENV: &str = "CARDIORISK_FAMILY_HISTORY_EXTENSION";

/// Configuration for the risk engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    /// Formula variant to evaluate
    pub model: ModelVariant,
}

impl EngineConfig {
    /// Load config overrides from environment (best-effort).
    ///
    /// Supported:
    /// - CARDIORISK_FAMILY_HISTORY_EXTENSION=true|false
    ///
    /// Unrecognized values keep the default.
    #[must_use]
    pub fn from_env_or_default() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var(FAMILY_HISTORY_EXTENSION_ENV) {
            if let Some(enabled) = parse_flag(&v) {
                cfg.model = if enabled {
                    ModelVariant::FamilyHistoryExtended
                } else {
                    ModelVariant::Published
                };
            }
        }

        cfg
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}
