//! Objection! — debate-practice game core.
//!
//! A player receives (or supplies) a debate topic, writes a timed
//! argument, and an AI judge returns a score and narrative verdict. The
//! library provides:
//!
//! - [`verdict`] — normalization of unreliable judge output into a
//!   canonical `{score, verdict_text, feedback_text}` record
//! - [`game`] — the round state machine, cancellable countdown, and the
//!   async engine that drives a session to its final aggregate
//! - [`judge`] — the external judge capability: a Gemini-backed client
//!   and a deterministic offline source
//!
//! Every external call is treated as unreliable; the engine substitutes
//! fixed fallbacks so a session can never dead-end on API flakiness.

pub mod config;
pub mod game;
pub mod judge;
pub mod verdict;

// Re-export key game types
pub use game::{
    GameEngine, GameError, GamePhase, GameSession, PromptChoice, RoundOutcome, TickOutcome,
};

// Re-export key judge types
pub use judge::{fallback_verdict, CannedJudge, GeminiJudge, JudgeError, JudgeSource,
    FALLBACK_PROMPT};

// Re-export key verdict types
pub use verdict::{
    normalize, NormalizerPolicy, RawJudgeOutput, Resolution, Verdict, VerdictShape, DEFAULT_SCORE,
};

pub use config::GameConfig;
