//! Game engine — drives one session end-to-end.
//!
//! Ties together the session state machine, the cancellable countdown,
//! the judge source, and the verdict normalizer. Every external call is
//! treated as unreliable: a failed topic generation substitutes the
//! fixed fallback topic, a failed or malformed judge call substitutes
//! the fallback verdict. The round always terminates.

use std::sync::Arc;

use tracing::{info, warn};

use super::session::{GameError, GamePhase, GameSession, TickOutcome};
use super::timer::Countdown;
use crate::config::GameConfig;
use crate::judge::{fallback_verdict, JudgeSource, FALLBACK_PROMPT};
use crate::verdict::{Verdict, VerdictShape};

/// How the round's topic is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptChoice {
    /// Ask the judge source for a topic (fallback topic on failure).
    Generated,
    /// Player-supplied topic (blank input rejected).
    Custom(String),
}

/// Result of a completed round.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    /// 1-based round index.
    pub round: u32,
    /// Normalized verdict.
    pub verdict: Verdict,
    /// Parsing stage that produced the verdict.
    pub shape: VerdictShape,
    /// Whether the judge call failed and the fixed fallback was used.
    pub fallback: bool,
    /// User-visible notice, present only when policy says to surface
    /// degradation.
    pub notice: Option<String>,
}

/// Async driver for one game session. One engine per session; no state
/// is shared across sessions.
pub struct GameEngine {
    session: GameSession,
    judge: Arc<dyn JudgeSource>,
    config: GameConfig,
    countdown: Option<Countdown>,
}

impl GameEngine {
    pub fn new(judge: Arc<dyn JudgeSource>, config: GameConfig) -> Self {
        let session = GameSession::new(config.total_rounds, config.round_seconds);
        Self {
            session,
            judge,
            config,
            countdown: None,
        }
    }

    /// Start the session (Idle → Input).
    pub fn start(&mut self) -> Result<(), GameError> {
        self.session.start()?;
        Ok(())
    }

    /// Acquire a topic and enter `Playing`, starting the countdown.
    ///
    /// Topic generation never blocks the player: any judge failure
    /// substitutes [`FALLBACK_PROMPT`].
    pub async fn start_round(&mut self, choice: PromptChoice) -> Result<String, GameError> {
        match choice {
            PromptChoice::Custom(text) => self.session.accept_custom_prompt(&text)?,
            PromptChoice::Generated => {
                let round = self.session.current_round;
                let topic = match self.judge.generate_prompt(round).await {
                    Ok(topic) => topic,
                    Err(e) => {
                        warn!(round, error = %e, "topic generation failed, using fallback");
                        FALLBACK_PROMPT.to_string()
                    }
                };
                self.session.begin_round(&topic)?;
            }
        }
        self.countdown = Some(Countdown::start(self.session.round_seconds));
        info!(
            round = self.session.current_round,
            seconds = self.session.round_seconds,
            "round started"
        );
        Ok(self.session.prompt.clone())
    }

    /// Update the player's argument buffer.
    pub fn set_argument(&mut self, text: &str) {
        self.session.set_argument(text);
    }

    /// Await the next countdown tick and apply it to the session.
    /// Returns `None` when no countdown is running.
    pub async fn next_tick(&mut self) -> Option<TickOutcome> {
        let countdown = self.countdown.as_mut()?;
        countdown.tick().await?;
        Some(self.session.tick())
    }

    /// Explicit submit action. Blank arguments are rejected; a second
    /// submit while the judge call is in flight is rejected by the
    /// session guard, so exactly one score lands per round.
    pub async fn submit(&mut self) -> Result<RoundOutcome, GameError> {
        self.session.submit()?;
        self.resolve_round().await
    }

    /// Forced submit on countdown expiry — whatever argument exists goes
    /// to the judge, even empty.
    pub async fn submit_expired(&mut self) -> Result<RoundOutcome, GameError> {
        self.session.submit_forced()?;
        self.resolve_round().await
    }

    /// Run the single in-flight judge call and record the verdict.
    /// Precondition: session is in `Judging`.
    async fn resolve_round(&mut self) -> Result<RoundOutcome, GameError> {
        // Leaving Playing: the tick task dies with the handle, so no
        // stale auto-submit can follow.
        self.countdown.take();

        let round = self.session.current_round;
        let (verdict, shape, fallback) = match self
            .judge
            .judge_argument(&self.session.prompt, &self.session.argument)
            .await
        {
            Ok(raw) => {
                let resolution = self.config.normalizer_policy().resolve(&raw);
                if resolution.shape.is_degraded() {
                    warn!(round, shape = %resolution.shape, "judge output had no score marker");
                }
                (resolution.verdict, resolution.shape, false)
            }
            Err(e) => {
                warn!(round, error = %e, "judge call failed, substituting fallback verdict");
                (fallback_verdict(), VerdictShape::Structured, true)
            }
        };

        let notice = match (fallback, shape.is_degraded() && self.config.surface_degraded) {
            (true, _) => Some("Judge AI was unreachable; a neutral verdict was applied.".to_string()),
            (false, true) => {
                Some("Judge AI ignored the scoring format; a default score was applied.".to_string())
            }
            _ => None,
        };

        self.session.record_verdict(verdict.clone())?;
        info!(round, score = verdict.score, %shape, "round judged");

        Ok(RoundOutcome {
            round,
            verdict,
            shape,
            fallback,
            notice,
        })
    }

    /// Advance past the results screen. Returns the phase entered
    /// (`Input` for the next round, or `End`).
    pub fn advance(&mut self) -> Result<GamePhase, GameError> {
        self.session.advance()
    }

    /// Restart a finished session from the end screen.
    pub fn restart(&mut self) -> Result<(), GameError> {
        self.countdown.take();
        self.session.restart()?;
        Ok(())
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Final aggregate, `mean/100` over all rounds.
    pub fn final_score(&self) -> u8 {
        self.session.final_score()
    }
}
