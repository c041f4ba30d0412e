//! Gemini-backed judge source.
//!
//! Thin client over the generative-language API. The request timeout on
//! the HTTP client is the bound that converts a hung call into a
//! [`JudgeError`] the game engine can absorb via its fallback path.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{JudgeError, JudgeSource};
use crate::verdict::RawJudgeOutput;

const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Judge source backed by the Gemini generateContent endpoint.
#[derive(Debug)]
pub struct GeminiJudge {
    api_key: String,
    model: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl GeminiJudge {
    pub fn new(api_key: String) -> Result<Self, JudgeError> {
        Self::with_timeout(api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Build with an explicit request timeout. The transport must bound
    /// every call so a hung request resolves to an error the game engine
    /// can absorb.
    pub fn with_timeout(api_key: String, timeout: Duration) -> Result<Self, JudgeError> {
        if api_key.trim().is_empty() {
            return Err(JudgeError::MissingApiKey(DEFAULT_MODEL.to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| JudgeError::RequestFailed(e.to_string()))?;
        Ok(Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: timeout.as_secs(),
            client,
        })
    }

    /// Difficulty wording grades up with the round index.
    fn difficulty(round: u32) -> &'static str {
        match round {
            1 => "moderately challenging",
            2 => "more complex",
            _ => "the most difficult",
        }
    }

    async fn generate(&self, text: &str) -> Result<String, JudgeError> {
        let request_body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": text }]
            }],
            "generationConfig": {
                "temperature": 0.7,
                "maxOutputTokens": 1024
            }
        });

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JudgeError::Timeout(self.timeout_secs)
                } else {
                    JudgeError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::RequestFailed(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        let resp_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| JudgeError::ParseError(e.to_string()))?;

        let content = resp_json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("")
            .to_string();

        debug!(model = %self.model, chars = content.len(), "judge response received");
        Ok(content)
    }
}

#[async_trait]
impl JudgeSource for GeminiJudge {
    async fn generate_prompt(&self, round: u32) -> Result<String, JudgeError> {
        let request = format!(
            "Generate a thought-provoking ethical or legal debate prompt for a practice \
             debate. Make it {}. Return ONLY the debate prompt as a single question or \
             scenario, nothing else.",
            Self::difficulty(round)
        );
        let topic = self.generate(&request).await?;
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(JudgeError::ParseError("empty topic from model".to_string()));
        }
        Ok(topic.to_string())
    }

    async fn judge_argument(
        &self,
        prompt: &str,
        argument: &str,
    ) -> Result<RawJudgeOutput, JudgeError> {
        let request = format!(
            "You are Judge AI in a debate competition.\n\n\
             CASE: {prompt}\n\n\
             LAWYER'S ARGUMENT:\n{argument}\n\n\
             Evaluate this argument and provide:\n\
             1. A score out of 100\n\
             2. Brief feedback on strengths and weaknesses\n\
             3. Your verdict\n\n\
             Format your response EXACTLY as:\n\
             SCORE: [number]\n\
             VERDICT: [Your ruling in 2-3 sentences]\n\
             FEEDBACK: [Constructive feedback in 2-3 sentences]"
        );
        // Even an empty body is handed to the normalizer — degradation is
        // its job, not the transport's.
        let text = self.generate(&request).await?;
        Ok(RawJudgeOutput::Text(text))
    }
}
