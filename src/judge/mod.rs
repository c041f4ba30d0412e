//! Judge sources — the external capability that rates an argument.
//!
//! Both operations are unreliable: any call may fail, time out, or return
//! malformed content. Callers must always make forward progress, so this
//! module also carries the fixed fallback values substituted when a call
//! cannot be completed.

pub mod canned;
pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

use crate::verdict::{RawJudgeOutput, Verdict};

/// Topic substituted when prompt generation fails.
pub const FALLBACK_PROMPT: &str =
    "Should social media companies be held accountable for misinformation?";

/// Verdict substituted when the judge call itself fails (transport error
/// or timeout). A debate-practice game must never dead-end on API
/// flakiness, so the worst case is a neutral score, not an error screen.
pub fn fallback_verdict() -> Verdict {
    Verdict::new(
        75,
        "Decent argument.",
        "Try adding stronger supporting evidence.",
    )
}

/// Errors from a judge source.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("judge request failed: {0}")]
    RequestFailed(String),

    #[error("no API key configured for {0}")]
    MissingApiKey(String),

    #[error("judge response unusable: {0}")]
    ParseError(String),

    #[error("judge request timed out after {0}s")]
    Timeout(u64),
}

/// External capability: "given a case description and an argument,
/// produce a rating."
#[async_trait]
pub trait JudgeSource: Send + Sync {
    /// Generate a debate topic for the given 1-based round.
    async fn generate_prompt(&self, round: u32) -> Result<String, JudgeError>;

    /// Rate an argument against a topic. The output may be any of the
    /// shapes the normalizer accepts.
    async fn judge_argument(
        &self,
        prompt: &str,
        argument: &str,
    ) -> Result<RawJudgeOutput, JudgeError>;
}

pub use canned::CannedJudge;
pub use gemini::GeminiJudge;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_verdict_is_well_formed() {
        let v = fallback_verdict();
        assert_eq!(v.score, 75);
        assert!(!v.verdict_text.is_empty());
        assert!(!v.feedback_text.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = JudgeError::RequestFailed("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));

        let err = JudgeError::Timeout(30);
        assert!(err.to_string().contains("30s"));
    }
}
