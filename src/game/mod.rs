//! Round State Machine — one debate session end-to-end.
//!
//! # Game Flow
//!
//! ```text
//! Idle → Input → Playing → Judging → Results
//!   ▲      ▲       │          │         │
//!   │      │       └─ submit ─┘         ├─ rounds left → Input
//!   │      │          or expiry         └─ last round  → End
//!   │      └────────────────────────────────────┘           │
//!   └─────────────────────── restart ───────────────────────┘
//! ```
//!
//! The session ([`GameSession`]) is the pure state machine; the engine
//! ([`GameEngine`]) drives it asynchronously against a judge source,
//! owning the cancellable countdown and the fallback policy.

pub mod engine;
pub mod session;
pub mod timer;

pub use engine::{GameEngine, PromptChoice, RoundOutcome};
pub use session::{
    GameError, GamePhase, GameSession, PhaseTransition, TickOutcome, TransitionError,
};
pub use timer::Countdown;
