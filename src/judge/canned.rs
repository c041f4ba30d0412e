//! Offline judge source — deterministic topics and scoring.
//!
//! Used when no API key is configured and as the mock in integration
//! tests. Scores are a simple function of argument length and connective
//! use, emitted as a labeled text block so the normalizer's loose path
//! gets exercised end-to-end.

use async_trait::async_trait;

use super::{JudgeError, JudgeSource};
use crate::verdict::RawJudgeOutput;

const TOPICS: &[&str] = &[
    "Should homework be abolished in secondary schools?",
    "Is it ever ethical for self-driving cars to prioritize passengers over pedestrians?",
    "Should governments be allowed to regulate speech on private platforms?",
    "Is a universal basic income a right or a hazard?",
    "Should juries be replaced by panels of professional judges?",
];

/// Deterministic judge for offline play and tests.
#[derive(Debug, Clone, Default)]
pub struct CannedJudge;

impl CannedJudge {
    pub fn new() -> Self {
        Self
    }

    fn score(argument: &str) -> u8 {
        let trimmed = argument.trim();
        if trimmed.is_empty() {
            return 5;
        }
        let words = trimmed.split_whitespace().count() as u32;
        let mut score = 50 + words.min(35);
        for connective in ["because", "therefore", "however", "evidence"] {
            if trimmed.to_lowercase().contains(connective) {
                score += 2;
            }
        }
        score.min(95) as u8
    }
}

#[async_trait]
impl JudgeSource for CannedJudge {
    async fn generate_prompt(&self, round: u32) -> Result<String, JudgeError> {
        let index = round.saturating_sub(1) as usize % TOPICS.len();
        Ok(TOPICS[index].to_string())
    }

    async fn judge_argument(
        &self,
        _prompt: &str,
        argument: &str,
    ) -> Result<RawJudgeOutput, JudgeError> {
        let score = Self::score(argument);
        let (verdict, feedback) = if argument.trim().is_empty() {
            (
                "No argument was presented, so the case is forfeit.",
                "Submit before the clock runs out next time.",
            )
        } else if score >= 80 {
            (
                "A well-developed case with clear reasoning.",
                "Sharpen the conclusion to land the strongest point last.",
            )
        } else {
            (
                "The position is stated but underdeveloped.",
                "Extend the argument with evidence and address the counterpoint.",
            )
        };
        Ok(RawJudgeOutput::Text(format!(
            "SCORE: {score}\nVERDICT: {verdict}\nFEEDBACK: {feedback}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::normalize;

    #[tokio::test]
    async fn test_topics_cycle_by_round() {
        let judge = CannedJudge::new();
        let first = judge.generate_prompt(1).await.unwrap();
        let wrapped = judge.generate_prompt(1 + TOPICS.len() as u32).await.unwrap();
        assert_eq!(first, wrapped);
    }

    #[tokio::test]
    async fn test_empty_argument_scores_low() {
        let judge = CannedJudge::new();
        let raw = judge.judge_argument("topic", "   ").await.unwrap();
        let verdict = normalize(&raw);
        assert_eq!(verdict.score, 5);
        assert!(verdict.feedback_text.contains("clock"));
    }

    #[tokio::test]
    async fn test_longer_arguments_score_higher() {
        let judge = CannedJudge::new();
        let short = normalize(&judge.judge_argument("t", "I disagree.").await.unwrap());
        let long = normalize(
            &judge
                .judge_argument(
                    "t",
                    "I disagree because the evidence shows otherwise; therefore the \
                     policy fails on its own terms, and however you weigh the costs \
                     the burden of proof has not been met by the proposition side.",
                )
                .await
                .unwrap(),
        );
        assert!(long.score > short.score);
        assert!(long.score <= 95);
    }

    #[tokio::test]
    async fn test_output_is_labeled_block() {
        let judge = CannedJudge::new();
        let raw = judge.judge_argument("t", "a case").await.unwrap();
        match raw {
            RawJudgeOutput::Text(text) => {
                assert!(text.starts_with("SCORE: "));
                assert!(text.contains("VERDICT: "));
                assert!(text.contains("FEEDBACK: "));
            }
            other => panic!("expected text output, got {other:?}"),
        }
    }

    #[test]
    fn test_scoring_deterministic() {
        assert_eq!(CannedJudge::score("same input"), CannedJudge::score("same input"));
    }
}
