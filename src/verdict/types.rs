//! Verdict data model — raw judge output, canonical verdicts, and shapes.

use serde::{Deserialize, Serialize};

/// Raw output from a judge source, before normalization.
///
/// Judges are unreliable formatters: they may return a structured object,
/// a JSON string, a labeled `SCORE:/VERDICT:/FEEDBACK:` block, or plain
/// prose. The normalizer accepts all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawJudgeOutput {
    /// Free text from the model (possibly containing embedded JSON).
    Text(String),
    /// An already-decoded structured value with untrusted field types.
    Structured(serde_json::Value),
}

impl RawJudgeOutput {
    /// Convenience constructor for text output.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

impl From<serde_json::Value> for RawJudgeOutput {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::Text(s),
            other => Self::Structured(other),
        }
    }
}

/// Which parsing stage recovered the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictShape {
    /// Input was already a structured object.
    Structured,
    /// Entire string decoded as a JSON object.
    StrictJson,
    /// A JSON object was extracted from surrounding text.
    EmbeddedJson,
    /// A `SCORE:` label or `nn/100` marker was found in the text.
    Labeled,
    /// No score marker recoverable — policy default applied.
    Prose,
}

impl VerdictShape {
    /// Whether this shape means the judge failed to follow the format and
    /// the score is a policy default rather than a model-derived value.
    pub fn is_degraded(self) -> bool {
        self == Self::Prose
    }
}

impl std::fmt::Display for VerdictShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structured => write!(f, "structured"),
            Self::StrictJson => write!(f, "strict_json"),
            Self::EmbeddedJson => write!(f, "embedded_json"),
            Self::Labeled => write!(f, "labeled"),
            Self::Prose => write!(f, "prose"),
        }
    }
}

/// Canonical judgment for one round.
///
/// Invariants: `score` is always in `[0, 100]`; `verdict_text` and
/// `feedback_text` are always present, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Score clamped to 0–100. Never absent, even when the source
    /// provided none.
    pub score: u8,
    /// The ruling narrative. Empty string when unrecoverable.
    pub verdict_text: String,
    /// Actionable improvement tip. Independently optional from the
    /// verdict narrative; empty string when absent.
    pub feedback_text: String,
}

impl Verdict {
    pub fn new(score: u8, verdict_text: &str, feedback_text: &str) -> Self {
        Self {
            score: score.min(100),
            verdict_text: verdict_text.to_string(),
            feedback_text: feedback_text.to_string(),
        }
    }

    /// Compact one-line summary for logs.
    pub fn summary_line(&self) -> String {
        format!("{}/100 | {}", self.score, self.verdict_text)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SCORE: {}", self.score)?;
        if !self.verdict_text.is_empty() {
            write!(f, "\nVERDICT: {}", self.verdict_text)?;
        }
        if !self.feedback_text.is_empty() {
            write!(f, "\nFEEDBACK: {}", self.feedback_text)?;
        }
        Ok(())
    }
}

/// A normalized verdict together with the shape that produced it, so
/// callers can apply the degraded-response policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub verdict: Verdict,
    pub shape: VerdictShape,
}
