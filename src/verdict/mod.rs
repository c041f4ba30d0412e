//! Verdict Normalization — canonical judgments from unreliable judges.
//!
//! The judge model refuses to reliably follow formatting instructions, so
//! raw output arrives in at least four shapes: a structured object, a
//! strict JSON string, a labeled `SCORE:/VERDICT:/FEEDBACK:` block, or
//! unstructured prose. This module resolves all of them into one
//! canonical [`Verdict`] through a strict-then-loose pipeline that never
//! fails — see [`normalize`].

pub mod normalize;
pub mod types;

pub use normalize::{normalize, NormalizerPolicy, DEFAULT_SCORE};
pub use types::{RawJudgeOutput, Resolution, Verdict, VerdictShape};
