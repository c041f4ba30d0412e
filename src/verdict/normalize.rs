//! Verdict normalization pipeline — strict-then-loose parsing with an
//! explicit fallback chain.
//!
//! ```text
//! RawJudgeOutput
//!   ├─ Structured object        → coerce fields          (Structured)
//!   └─ Text
//!       ├─ whole string is JSON → coerce fields          (StrictJson)
//!       ├─ embedded {...} block → coerce fields          (EmbeddedJson)
//!       ├─ SCORE: / nn/100      → label extraction       (Labeled)
//!       └─ anything else        → policy default score   (Prose)
//! ```
//!
//! `normalize` never fails: every input produces a well-formed [`Verdict`]
//! with a score in `[0, 100]`. Parsing failure degrades to the policy
//! default because mid-game the caller has no recovery path.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{RawJudgeOutput, Resolution, Verdict, VerdictShape};

/// Score assigned when no score marker is recoverable from the judge's
/// output. The observed behavior upstream is inconsistent (0, 70, and 75
/// at different call sites); this crate standardizes on 70 — a neutral
/// "benefit of the doubt" value matching the most common site.
pub const DEFAULT_SCORE: u8 = 70;

/// Tunable normalization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerPolicy {
    /// Score used when no marker is found (pipeline stage 5).
    pub default_score: u8,
}

impl Default for NormalizerPolicy {
    fn default() -> Self {
        Self {
            default_score: DEFAULT_SCORE,
        }
    }
}

impl NormalizerPolicy {
    /// Run the full pipeline, reporting which stage recovered the verdict.
    pub fn resolve(&self, raw: &RawJudgeOutput) -> Resolution {
        match raw {
            RawJudgeOutput::Structured(value) => match value.as_object() {
                Some(_) => Resolution {
                    verdict: verdict_from_value(value),
                    shape: VerdictShape::Structured,
                },
                // A structured non-object (array, bare number) carries no
                // field contract — route its rendering through the text
                // stages instead.
                None => self.resolve_text(&value.to_string()),
            },
            RawJudgeOutput::Text(text) => self.resolve_text(text),
        }
    }

    fn resolve_text(&self, text: &str) -> Resolution {
        // Stage 2: the entire string is a serialized object.
        if let Ok(value) = serde_json::from_str::<Value>(text) {
            if value.is_object() {
                return Resolution {
                    verdict: verdict_from_value(&value),
                    shape: VerdictShape::StrictJson,
                };
            }
        }

        // Stage 3: greedy first-`{`-to-last-`}` substring decode.
        if let Some(slice) = braced_slice(text) {
            if let Ok(value) = serde_json::from_str::<Value>(slice) {
                if value.is_object() {
                    return Resolution {
                        verdict: verdict_from_value(&value),
                        shape: VerdictShape::EmbeddedJson,
                    };
                }
            }
        }

        // Stage 4: label extraction. Feedback is independently optional,
        // so it is extracted whether or not a score marker exists.
        let feedback = feedback_segment(text).unwrap_or_default();

        if let Some(score) = labeled_score(text) {
            let verdict_text = verdict_segment(text).unwrap_or_else(|| text.trim().to_string());
            return Resolution {
                verdict: Verdict {
                    score,
                    verdict_text,
                    feedback_text: feedback,
                },
                shape: VerdictShape::Labeled,
            };
        }

        // Stage 5: no score-bearing marker anywhere — policy default, raw
        // text verbatim as the narrative.
        Resolution {
            verdict: Verdict {
                score: self.default_score.min(100),
                verdict_text: text.to_string(),
                feedback_text: feedback,
            },
            shape: VerdictShape::Prose,
        }
    }
}

/// Normalize a raw judge output under the default policy.
///
/// Pure and idempotent: the same input always yields the same verdict.
pub fn normalize(raw: &RawJudgeOutput) -> Verdict {
    NormalizerPolicy::default().resolve(raw).verdict
}

// ── Pipeline stages ──────────────────────────────────────────────────

/// Stage 1: coerce a structured object's untrusted fields.
fn verdict_from_value(value: &Value) -> Verdict {
    let score = value
        .get("score")
        .and_then(coerce_number)
        .map(clamp_score)
        .unwrap_or(0);

    Verdict {
        score,
        verdict_text: string_field(value, &["verdict", "verdict_text", "verdictText"]),
        feedback_text: string_field(value, &["feedback", "feedback_text", "feedbackText"]),
    }
}

/// Coerce a JSON value to a number: numbers pass through, string
/// numerals (including float strings like `"87.5"`) are parsed after
/// stripping surrounding whitespace and punctuation. Anything else is
/// unrecoverable.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_matches(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
            .parse::<f64>()
            .ok(),
        _ => None,
    }
}

/// Clamp to `[0, 100]`, rounding float scores to the nearest integer
/// (87.5 → 88). NaN degrades to 0.
fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

fn string_field(value: &Value, keys: &[&str]) -> String {
    for key in keys {
        match value.get(key) {
            Some(Value::String(s)) => return s.clone(),
            Some(Value::Null) | None => continue,
            Some(other) => return other.to_string(),
        }
    }
    String::new()
}

/// Stage 3 helper: the first substring that looks like a complete
/// bracket-delimited object — greedy, first `{` to last `}`.
fn braced_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Stage 4: primary `SCORE: nn` marker, secondary `nn/100` marker.
fn labeled_score(text: &str) -> Option<u8> {
    static SCORE_LABEL: OnceLock<Regex> = OnceLock::new();
    static OUT_OF_100: OnceLock<Regex> = OnceLock::new();

    let label = SCORE_LABEL
        .get_or_init(|| Regex::new(r"(?i)score\s*:\s*(\d{1,3})").expect("valid score regex"));
    let ratio =
        OUT_OF_100.get_or_init(|| Regex::new(r"\b(\d{1,3})\s*/\s*100").expect("valid ratio regex"));

    let capture = label
        .captures(text)
        .or_else(|| ratio.captures(text))?
        .get(1)?;

    // 1–3 digits always fit in u16; clamp handles 3-digit overshoot.
    let digits: u16 = capture.as_str().parse().ok()?;
    Some(clamp_score(f64::from(digits)))
}

/// Everything after a `FEEDBACK:` marker, trimmed.
fn feedback_segment(text: &str) -> Option<String> {
    static FEEDBACK: OnceLock<Regex> = OnceLock::new();
    let re = FEEDBACK
        .get_or_init(|| Regex::new(r"(?is)feedback\s*:\s*(.*)").expect("valid feedback regex"));
    let segment = re.captures(text)?.get(1)?.as_str().trim();
    (!segment.is_empty()).then(|| segment.to_string())
}

/// The `VERDICT:`-prefixed segment, if one is identifiable — up to a
/// following `FEEDBACK:` label or the end of the text.
fn verdict_segment(text: &str) -> Option<String> {
    static VERDICT: OnceLock<Regex> = OnceLock::new();
    let re = VERDICT.get_or_init(|| {
        Regex::new(r"(?is)verdict\s*:\s*(.*?)(?:\n\s*feedback\s*:|\z)").expect("valid verdict regex")
    });
    let segment = re.captures(text)?.get(1)?.as_str().trim();
    (!segment.is_empty()).then(|| segment.to_string())
}
