//! Game configuration with environment overrides.

use serde::{Deserialize, Serialize};

use crate::verdict::{NormalizerPolicy, DEFAULT_SCORE};

/// Configuration for one game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Rounds per session.
    pub total_rounds: u32,
    /// Countdown budget per round, in seconds.
    pub round_seconds: u32,
    /// Score assigned when the judge's output carries no recoverable
    /// score marker.
    pub default_score: u8,
    /// Whether a degraded (unparseable) judge response is surfaced to the
    /// player as a notice, or silently normalized with a warn-level log.
    pub surface_degraded: bool,
    /// Bound on each judge request; a hung call becomes a timeout error
    /// that the fallback path absorbs.
    pub request_timeout_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_rounds: 3,
            round_seconds: 120,
            default_score: DEFAULT_SCORE,
            surface_degraded: false,
            request_timeout_secs: 30,
        }
    }
}

impl GameConfig {
    /// Load defaults with `OBJECTION_*` environment overrides.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            total_rounds: env_parse("OBJECTION_ROUNDS", defaults.total_rounds),
            round_seconds: env_parse("OBJECTION_ROUND_SECONDS", defaults.round_seconds),
            default_score: env_parse("OBJECTION_DEFAULT_SCORE", defaults.default_score),
            surface_degraded: env_parse("OBJECTION_SURFACE_DEGRADED", defaults.surface_degraded),
            request_timeout_secs: env_parse(
                "OBJECTION_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
        }
    }

    /// Normalizer policy derived from this config.
    pub fn normalizer_policy(&self) -> NormalizerPolicy {
        NormalizerPolicy {
            default_score: self.default_score,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
