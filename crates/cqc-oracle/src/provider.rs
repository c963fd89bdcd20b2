use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use cqc_core::types::Language;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input to the single abstract Oracle operation (spec §4.3).
#[derive(Debug, Clone, Serialize)]
pub struct OracleRequest {
    pub utterance: String,
    pub lang_hint: Option<Language>,
    /// Slot names the caller wants filled, e.g. `["goal", "budget_max"]`.
    pub slot_schema: Vec<String>,
    /// Knowledge snippets to ground the answer in, from `cqc-knowledge`.
    pub knowledge_snippets: Vec<String>,
}

/// Schema-enforced result. Fields the model returned but that don't parse
/// against `slot_schema` are dropped rather than surfacing a parse error
/// (spec §4.3: "any unparsable field is dropped").
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OracleExtraction {
    pub lang: Option<Language>,
    pub slots_filled: HashMap<String, String>,
    pub free_text_answer: Option<String>,
    #[serde(default)]
    pub confidence: f32,
}

/// Common interface for the AI Oracle (spec §4.3). One operation: turn an
/// utterance into structured slot fills plus an optional free-text answer.
#[async_trait]
pub trait AiOracle: Send + Sync {
    fn name(&self) -> &str;

    async fn extract(&self, req: &OracleRequest) -> Result<OracleExtraction, OracleError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("response did not match the expected schema: {0}")]
    Parse(String),

    #[error("oracle call timed out")]
    Timeout,

    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

impl From<OracleError> for cqc_core::CqcError {
    fn from(e: OracleError) -> Self {
        match e {
            OracleError::Http(err) => cqc_core::CqcError::TransientDependency(err.to_string()),
            OracleError::Timeout => cqc_core::CqcError::TransientDependency("oracle timeout".into()),
            OracleError::Api { status, message } if status >= 500 => {
                cqc_core::CqcError::TransientDependency(format!("oracle {status}: {message}"))
            }
            OracleError::Api { status, message } => {
                cqc_core::CqcError::FatalDependency(format!("oracle {status}: {message}"))
            }
            OracleError::Parse(msg) => cqc_core::CqcError::FatalDependency(msg),
            OracleError::Unavailable(msg) => cqc_core::CqcError::TransientDependency(msg),
        }
    }
}

/// An OpenAI-compatible chat-completions backed Oracle. The system prompt
/// instructs the model to return a single JSON object matching
/// `OracleExtraction`'s shape; fields outside that shape are ignored by
/// `serde`'s default struct deserialization rather than erroring the call.
pub struct HttpOracle {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpOracle {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn system_prompt(req: &OracleRequest) -> String {
        let schema = req.slot_schema.join(", ");
        let snippets = if req.knowledge_snippets.is_empty() {
            String::new()
        } else {
            format!("\nRelevant context:\n{}", req.knowledge_snippets.join("\n"))
        };
        format!(
            "Extract the following slots from the user's message if present: {schema}. \
             Respond with a single JSON object: {{\"lang\": <language code or null>, \
             \"slots_filled\": {{...}}, \"free_text_answer\": <string or null>, \
             \"confidence\": <0..1>}}.{snippets}"
        )
    }
}

#[async_trait]
impl AiOracle for HttpOracle {
    fn name(&self) -> &str {
        "http-oracle"
    }

    async fn extract(&self, req: &OracleRequest) -> Result<OracleExtraction, OracleError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": Self::system_prompt(req)},
                {"role": "user", "content": req.utterance},
            ],
            "response_format": {"type": "json_object"},
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(Duration::from_millis(cqc_core::config::ORACLE_TIMEOUT_MS))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = resp.json().await?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| OracleError::Parse("missing choices[0].message.content".into()))?;

        serde_json::from_str(content).map_err(|e| OracleError::Parse(e.to_string()))
    }
}
