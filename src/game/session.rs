//! Game state machine — phases, transitions, and per-session tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::verdict::Verdict;

/// Phase of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Session created but not started.
    Idle,
    /// Waiting for a debate topic (generated or custom).
    Input,
    /// Player is composing an argument against the countdown.
    Playing,
    /// Argument submitted — judge call in flight.
    Judging,
    /// Verdict displayed for the current round.
    Results,
    /// All rounds complete — final aggregate available.
    End,
}

impl GamePhase {
    /// Valid transitions from this phase.
    pub fn valid_transitions(self) -> &'static [GamePhase] {
        match self {
            Self::Idle => &[Self::Input],
            Self::Input => &[Self::Playing],
            Self::Playing => &[Self::Judging],
            Self::Judging => &[Self::Results],
            Self::Results => &[Self::Input, Self::End],
            Self::End => &[Self::Idle],
        }
    }

    /// Whether the session has finished all rounds.
    pub fn is_end(self) -> bool {
        self == Self::End
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Input => write!(f, "input"),
            Self::Playing => write!(f, "playing"),
            Self::Judging => write!(f, "judging"),
            Self::Results => write!(f, "results"),
            Self::End => write!(f, "end"),
        }
    }
}

/// A phase transition record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: GamePhase,
    pub to: GamePhase,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

/// Error for invalid state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition {from} → {to}: {reason}")]
pub struct TransitionError {
    pub from: GamePhase,
    pub to: GamePhase,
    pub reason: String,
}

/// Errors from session operations. User-input variants are non-fatal
/// validation messages and cause no state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("please enter a debate topic first")]
    EmptyPrompt,
    #[error("please write your argument before submitting")]
    EmptyArgument,
    /// Submit arrived while a judge call is already in flight. Guards
    /// against double score accumulation.
    #[error("a judge call is already in flight for this round")]
    JudgeInFlight,
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Outcome of a single countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still composing — seconds remaining.
    Running(u32),
    /// Countdown hit zero — submission must be forced.
    Expired,
    /// Tick arrived outside `Playing` and was dropped (stale-tick safety).
    Ignored,
}

/// One playthrough: phase, current round, per-round buffers, and the
/// score aggregate. Owned exclusively by its driver — no shared state
/// crosses session boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    /// Current phase.
    pub phase: GamePhase,
    /// 1-based round index, bounded by `total_rounds`.
    pub current_round: u32,
    /// Fixed round count for the session.
    pub total_rounds: u32,
    /// Countdown budget each round starts with.
    pub round_seconds: u32,
    /// Topic for the current round. Immutable once `Playing` is entered.
    pub prompt: String,
    /// Player's argument buffer. Mutable until submit.
    pub argument: String,
    /// Seconds remaining in the current round.
    pub time_left: u32,
    /// Verdict for the current round; present only in `Results`.
    pub verdict: Option<Verdict>,
    /// Completed round scores, in order.
    pub scores: Vec<u8>,
    /// Running sum of `scores`.
    pub total_score: u32,
    /// Transition history.
    pub transitions: Vec<PhaseTransition>,
}

impl GameSession {
    /// Create a session in `Idle`.
    pub fn new(total_rounds: u32, round_seconds: u32) -> Self {
        Self {
            phase: GamePhase::Idle,
            current_round: 1,
            total_rounds,
            round_seconds,
            prompt: String::new(),
            argument: String::new(),
            time_left: round_seconds,
            verdict: None,
            scores: Vec::new(),
            total_score: 0,
            transitions: Vec::new(),
        }
    }

    /// Transition to a new phase with a reason.
    pub fn transition(&mut self, to: GamePhase, reason: &str) -> Result<(), TransitionError> {
        if !self.phase.valid_transitions().contains(&to) {
            return Err(TransitionError {
                from: self.phase,
                to,
                reason: format!(
                    "not a valid transition (allowed: {:?})",
                    self.phase.valid_transitions()
                ),
            });
        }

        self.transitions.push(PhaseTransition {
            from: self.phase,
            to,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
        self.phase = to;
        Ok(())
    }

    /// Start the session (Idle → Input), resetting the round index and
    /// the aggregate.
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.transition(GamePhase::Input, "session started")?;
        self.current_round = 1;
        self.scores.clear();
        self.total_score = 0;
        Ok(())
    }

    /// Enter `Playing` with the given topic: countdown reset, argument
    /// buffer cleared, prompt frozen.
    pub fn begin_round(&mut self, prompt: &str) -> Result<(), GameError> {
        self.transition(GamePhase::Playing, "round began")?;
        self.prompt = prompt.to_string();
        self.argument.clear();
        self.time_left = self.round_seconds;
        self.verdict = None;
        Ok(())
    }

    /// Accept a player-typed topic. Blank input is rejected with a
    /// validation message and no state change.
    pub fn accept_custom_prompt(&mut self, text: &str) -> Result<(), GameError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(GameError::EmptyPrompt);
        }
        self.begin_round(trimmed)
    }

    /// Update the argument buffer. Ignored outside `Playing`, so the
    /// submitted text can never change after the fact.
    pub fn set_argument(&mut self, text: &str) {
        if self.phase == GamePhase::Playing {
            self.argument = text.to_string();
        }
    }

    /// Apply one countdown tick. Ticks outside `Playing` are dropped so
    /// a stale tick can never fire an auto-submit after submission.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != GamePhase::Playing {
            return TickOutcome::Ignored;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.time_left)
        }
    }

    /// Explicit submit action: rejects a blank argument.
    pub fn submit(&mut self) -> Result<(), GameError> {
        if self.argument.trim().is_empty() {
            if self.phase == GamePhase::Judging {
                return Err(GameError::JudgeInFlight);
            }
            return Err(GameError::EmptyArgument);
        }
        self.submit_inner("argument submitted")
    }

    /// Forced submit on countdown expiry: whatever argument text exists
    /// goes to the judge, even empty. The round must always terminate.
    pub fn submit_forced(&mut self) -> Result<(), GameError> {
        self.submit_inner("time expired, submission forced")
    }

    fn submit_inner(&mut self, reason: &str) -> Result<(), GameError> {
        if self.phase == GamePhase::Judging {
            return Err(GameError::JudgeInFlight);
        }
        self.transition(GamePhase::Judging, reason)?;
        Ok(())
    }

    /// Resolve the in-flight judge call: store the verdict and append its
    /// score to the aggregate exactly once.
    pub fn record_verdict(&mut self, verdict: Verdict) -> Result<(), GameError> {
        self.transition(GamePhase::Results, "verdict recorded")?;
        self.scores.push(verdict.score);
        self.total_score += u32::from(verdict.score);
        self.verdict = Some(verdict);
        Ok(())
    }

    /// Advance past the results screen: next round when rounds remain,
    /// otherwise the end screen. Returns the phase entered.
    pub fn advance(&mut self) -> Result<GamePhase, GameError> {
        if self.current_round < self.total_rounds {
            self.transition(GamePhase::Input, "next round")?;
            self.current_round += 1;
            self.prompt.clear();
            self.argument.clear();
            self.verdict = None;
        } else {
            self.transition(GamePhase::End, "all rounds complete")?;
        }
        Ok(self.phase)
    }

    /// Restart after the end screen: clears the entire aggregate.
    pub fn restart(&mut self) -> Result<(), TransitionError> {
        self.transition(GamePhase::Idle, "restart")?;
        self.current_round = 1;
        self.prompt.clear();
        self.argument.clear();
        self.time_left = self.round_seconds;
        self.verdict = None;
        self.scores.clear();
        self.total_score = 0;
        Ok(())
    }

    /// Whether more rounds remain after the current one.
    pub fn has_rounds_remaining(&self) -> bool {
        self.current_round < self.total_rounds
    }

    /// Arithmetic mean of all round scores, rounded to nearest integer.
    /// Reported as `mean/100`.
    pub fn final_score(&self) -> u8 {
        if self.scores.is_empty() {
            return 0;
        }
        (f64::from(self.total_score) / self.scores.len() as f64).round() as u8
    }

    /// Compact status line.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] round {}/{} | {}s left | {} scored",
            self.phase,
            self.current_round,
            self.total_rounds,
            self.time_left,
            self.scores.len()
        )
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(3, 120)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_session() -> GameSession {
        let mut session = GameSession::default();
        session.start().unwrap();
        session.begin_round("Should homework be abolished?").unwrap();
        session
    }

    #[test]
    fn test_new_session() {
        let session = GameSession::default();
        assert_eq!(session.phase, GamePhase::Idle);
        assert_eq!(session.current_round, 1);
        assert_eq!(session.total_rounds, 3);
        assert_eq!(session.time_left, 120);
        assert!(session.scores.is_empty());
    }

    #[test]
    fn test_start_resets_aggregate() {
        let mut session = GameSession::default();
        session.total_score = 99;
        session.scores.push(99);
        session.start().unwrap();
        assert_eq!(session.phase, GamePhase::Input);
        assert!(session.scores.is_empty());
        assert_eq!(session.total_score, 0);
    }

    #[test]
    fn test_begin_round_resets_clock_and_argument() {
        let mut session = GameSession::default();
        session.start().unwrap();
        session.argument = "stale".to_string();
        session.time_left = 7;
        session.begin_round("topic").unwrap();
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.prompt, "topic");
        assert_eq!(session.argument, "");
        assert_eq!(session.time_left, 120);
    }

    #[test]
    fn test_blank_custom_prompt_rejected_without_transition() {
        let mut session = GameSession::default();
        session.start().unwrap();
        let err = session.accept_custom_prompt("   ").unwrap_err();
        assert_eq!(err, GameError::EmptyPrompt);
        assert_eq!(session.phase, GamePhase::Input);
    }

    #[test]
    fn test_custom_prompt_trimmed() {
        let mut session = GameSession::default();
        session.start().unwrap();
        session.accept_custom_prompt("  my topic  ").unwrap();
        assert_eq!(session.prompt, "my topic");
        assert_eq!(session.phase, GamePhase::Playing);
    }

    #[test]
    fn test_argument_frozen_outside_playing() {
        let mut session = playing_session();
        session.set_argument("draft one");
        session.submit().unwrap();
        session.set_argument("sneaky edit");
        assert_eq!(session.argument, "draft one");
    }

    #[test]
    fn test_blank_submit_rejected() {
        let mut session = playing_session();
        session.set_argument("  \n ");
        let err = session.submit().unwrap_err();
        assert_eq!(err, GameError::EmptyArgument);
        assert_eq!(session.phase, GamePhase::Playing);
    }

    #[test]
    fn test_forced_submit_with_empty_argument() {
        let mut session = playing_session();
        session.submit_forced().unwrap();
        assert_eq!(session.phase, GamePhase::Judging);
        assert_eq!(session.argument, "");
    }

    #[test]
    fn test_double_submit_guard() {
        let mut session = playing_session();
        session.set_argument("my argument");
        session.submit().unwrap();
        let err = session.submit().unwrap_err();
        assert_eq!(err, GameError::JudgeInFlight);

        session.record_verdict(Verdict::new(80, "", "")).unwrap();
        // Exactly one score landed.
        assert_eq!(session.scores, vec![80]);
    }

    #[test]
    fn test_tick_counts_down_and_expires() {
        let mut session = GameSession::new(3, 2);
        session.start().unwrap();
        session.begin_round("t").unwrap();
        assert_eq!(session.tick(), TickOutcome::Running(1));
        assert_eq!(session.tick(), TickOutcome::Expired);
    }

    #[test]
    fn test_stale_tick_ignored() {
        let mut session = playing_session();
        session.set_argument("arg");
        session.submit().unwrap();
        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert_eq!(session.phase, GamePhase::Judging);
    }

    #[test]
    fn test_record_verdict_requires_judging() {
        let mut session = playing_session();
        let err = session.record_verdict(Verdict::new(50, "", "")).unwrap_err();
        assert!(matches!(err, GameError::Transition(_)));
        assert!(session.scores.is_empty());
    }

    #[test]
    fn test_three_rounds_mean() {
        let mut session = GameSession::default();
        session.start().unwrap();
        for _ in 0..3 {
            session.begin_round("topic").unwrap();
            session.set_argument("case in point");
            session.submit().unwrap();
            session.record_verdict(Verdict::new(80, "ok", "")).unwrap();
            session.advance().unwrap();
        }
        assert_eq!(session.phase, GamePhase::End);
        assert_eq!(session.final_score(), 80);
    }

    #[test]
    fn test_mean_rounds_to_nearest() {
        let mut session = GameSession::default();
        session.start().unwrap();
        for score in [70, 71, 71] {
            session.begin_round("topic").unwrap();
            session.set_argument("a");
            session.submit().unwrap();
            session.record_verdict(Verdict::new(score, "", "")).unwrap();
            session.advance().unwrap();
        }
        // 212 / 3 = 70.66… → 71
        assert_eq!(session.final_score(), 71);
    }

    #[test]
    fn test_advance_clears_round_state() {
        let mut session = playing_session();
        session.set_argument("arg");
        session.submit().unwrap();
        session.record_verdict(Verdict::new(60, "v", "f")).unwrap();
        session.advance().unwrap();
        assert_eq!(session.phase, GamePhase::Input);
        assert_eq!(session.current_round, 2);
        assert_eq!(session.prompt, "");
        assert_eq!(session.argument, "");
        assert!(session.verdict.is_none());
        // Score is retained in the aggregate.
        assert_eq!(session.scores, vec![60]);
    }

    #[test]
    fn test_restart_clears_everything() {
        let mut session = GameSession::new(1, 120);
        session.start().unwrap();
        session.begin_round("t").unwrap();
        session.set_argument("a");
        session.submit().unwrap();
        session.record_verdict(Verdict::new(90, "", "")).unwrap();
        assert_eq!(session.advance().unwrap(), GamePhase::End);

        session.restart().unwrap();
        assert_eq!(session.phase, GamePhase::Idle);
        assert_eq!(session.current_round, 1);
        assert!(session.scores.is_empty());
        assert_eq!(session.total_score, 0);
    }

    #[test]
    fn test_invalid_transition() {
        let mut session = GameSession::default();
        let err = session.transition(GamePhase::Playing, "skip").unwrap_err();
        assert_eq!(err.from, GamePhase::Idle);
        assert_eq!(err.to, GamePhase::Playing);
    }

    #[test]
    fn test_transition_history() {
        let mut session = playing_session();
        session.submit_forced().unwrap();
        assert_eq!(session.transitions.len(), 3);
        assert_eq!(session.transitions[0].from, GamePhase::Idle);
        assert_eq!(session.transitions[2].to, GamePhase::Judging);
    }

    #[test]
    fn test_final_score_empty() {
        assert_eq!(GameSession::default().final_score(), 0);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(GamePhase::Idle.to_string(), "idle");
        assert_eq!(GamePhase::Input.to_string(), "input");
        assert_eq!(GamePhase::Playing.to_string(), "playing");
        assert_eq!(GamePhase::Judging.to_string(), "judging");
        assert_eq!(GamePhase::Results.to_string(), "results");
        assert_eq!(GamePhase::End.to_string(), "end");
    }

    #[test]
    fn test_status_line() {
        let session = playing_session();
        let line = session.status_line();
        assert!(line.contains("[playing]"));
        assert!(line.contains("round 1/3"));
    }

    #[test]
    fn test_error_messages_are_user_visible() {
        assert!(GameError::EmptyPrompt.to_string().contains("debate topic"));
        assert!(GameError::EmptyArgument.to_string().contains("argument"));
    }
}
