//! HTTP clients for the remote generation and persistence services.
//!
//! The remote system is opaque: question generation, explanations, and the
//! final prompt synthesis all happen on the other side of seven plain
//! request/response endpoints. This module defines the two trait seams the
//! session machine drives (`GenerationService`, `PersistenceService`) and
//! the single reqwest-backed `ServiceClient` that implements both.
//!
//! Error payloads follow the service's shape `{"detail": "..."}`; when a
//! response has no usable detail the client falls back to a fixed
//! per-operation message so the user always sees something actionable.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::phase::Phase;
use crate::session::{Answer, Question, SessionSnapshot};

/// Explanation of a pending question and each of its options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub question_explanation: String,
    /// Option text mapped to its explanation.
    pub option_explanations: HashMap<String, String>,
}

/// One row in the saved-session manager view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSummary {
    pub id: String,
    #[serde(default)]
    pub idea: String,
    /// ISO-8601 timestamp of the save, as recorded by the service.
    #[serde(default)]
    pub timestamp: String,
    /// Progress display such as "7/20".
    #[serde(default)]
    pub progress: String,
}

/// Acknowledgement returned by a save.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveAck {
    pub message: String,
    pub id: String,
}

/// Produces questions, explanations, and the final prompt.
#[async_trait]
pub trait GenerationService {
    async fn generate_question(
        &self,
        idea: &str,
        history: &[Answer],
        total_questions: usize,
        current_phase: Phase,
    ) -> Result<Question>;

    async fn explain_question(
        &self,
        idea: &str,
        question: &str,
        options: &[String],
    ) -> Result<Explanation>;

    async fn generate_prompt(
        &self,
        idea: &str,
        answers: &[Answer],
        selected_phases: &[Phase],
    ) -> Result<String>;
}

/// Stores and retrieves session snapshots keyed by id.
#[async_trait]
pub trait PersistenceService {
    async fn save_progress(&self, snapshot: &SessionSnapshot) -> Result<SaveAck>;

    async fn list_saves(&self) -> Result<Vec<SaveSummary>>;

    async fn load_progress(&self, id: &str) -> Result<SessionSnapshot>;

    /// Returns the service's acknowledgement message.
    async fn delete_save(&self, id: &str) -> Result<String>;
}

#[derive(Serialize)]
struct QuestionRequest<'a> {
    idea: &'a str,
    history: &'a [Answer],
    total_questions: usize,
    current_phase: Phase,
}

#[derive(Serialize)]
struct ExplainRequest<'a> {
    idea: &'a str,
    question: &'a str,
    options: &'a [String],
}

#[derive(Serialize)]
struct PromptRequest<'a> {
    idea: &'a str,
    answers: &'a [Answer],
    selected_phases: &'a [Phase],
}

#[derive(Deserialize)]
struct PromptResponse {
    prompt: String,
}

#[derive(Deserialize)]
struct ListSavesResponse {
    #[serde(default)]
    saves: Vec<SaveSummary>,
}

#[derive(Deserialize)]
struct DeleteAck {
    message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// HTTP client for both remote services.
pub struct ServiceClient {
    base_url: String,
    client: reqwest::Client,
}

impl ServiceClient {
    /// Build a client for the service at `base_url`. The timeout applies to
    /// every request; generation calls can be slow, so callers should pass
    /// the configured value rather than a short ad-hoc one.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check a response status, extracting the service's `detail` message
    /// when present and falling back to `fallback` otherwise.
    async fn check(resp: reqwest::Response, fallback: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let detail = resp
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .filter(|d| !d.trim().is_empty());
        match detail {
            Some(detail) => anyhow::bail!("{}", detail),
            None => {
                tracing::debug!(%status, "service returned no error detail");
                anyhow::bail!("{}", fallback)
            }
        }
    }
}

#[async_trait]
impl GenerationService for ServiceClient {
    async fn generate_question(
        &self,
        idea: &str,
        history: &[Answer],
        total_questions: usize,
        current_phase: Phase,
    ) -> Result<Question> {
        let resp = self
            .client
            .post(self.url("/generate-question"))
            .json(&QuestionRequest {
                idea,
                history,
                total_questions,
                current_phase,
            })
            .send()
            .await
            .context("Failed to generate question")?;
        Self::check(resp, "Failed to generate question")
            .await?
            .json::<Question>()
            .await
            .context("Failed to parse question response")
    }

    async fn explain_question(
        &self,
        idea: &str,
        question: &str,
        options: &[String],
    ) -> Result<Explanation> {
        let resp = self
            .client
            .post(self.url("/explain-question"))
            .json(&ExplainRequest {
                idea,
                question,
                options,
            })
            .send()
            .await
            .context("Failed to get explanation")?;
        Self::check(resp, "Failed to get explanation")
            .await?
            .json::<Explanation>()
            .await
            .context("Failed to parse explanation response")
    }

    async fn generate_prompt(
        &self,
        idea: &str,
        answers: &[Answer],
        selected_phases: &[Phase],
    ) -> Result<String> {
        let resp = self
            .client
            .post(self.url("/generate-prompt"))
            .json(&PromptRequest {
                idea,
                answers,
                selected_phases,
            })
            .send()
            .await
            .context("Failed to generate final prompt")?;
        let parsed = Self::check(resp, "Failed to generate final prompt")
            .await?
            .json::<PromptResponse>()
            .await
            .context("Failed to parse prompt response")?;
        Ok(parsed.prompt)
    }
}

#[async_trait]
impl PersistenceService for ServiceClient {
    async fn save_progress(&self, snapshot: &SessionSnapshot) -> Result<SaveAck> {
        let resp = self
            .client
            .post(self.url("/save-progress"))
            .json(snapshot)
            .send()
            .await
            .context("Failed to save progress")?;
        Self::check(resp, "Failed to save progress")
            .await?
            .json::<SaveAck>()
            .await
            .context("Failed to parse save acknowledgement")
    }

    async fn list_saves(&self) -> Result<Vec<SaveSummary>> {
        let resp = self
            .client
            .get(self.url("/list-saves"))
            .send()
            .await
            .context("Failed to list saves")?;
        let parsed = Self::check(resp, "Failed to list saves")
            .await?
            .json::<ListSavesResponse>()
            .await
            .context("Failed to parse saves list")?;
        Ok(parsed.saves)
    }

    async fn load_progress(&self, id: &str) -> Result<SessionSnapshot> {
        let resp = self
            .client
            .get(self.url(&format!("/load-progress/{}", id)))
            .send()
            .await
            .context("Failed to load progress")?;
        Self::check(resp, "Failed to load progress")
            .await?
            .json::<SessionSnapshot>()
            .await
            .context("Failed to parse saved session")
    }

    async fn delete_save(&self, id: &str) -> Result<String> {
        let resp = self
            .client
            .delete(self.url(&format!("/delete-save/{}", id)))
            .send()
            .await
            .context("Failed to delete save")?;
        let parsed = Self::check(resp, "Failed to delete save")
            .await?
            .json::<DeleteAck>()
            .await
            .context("Failed to parse delete acknowledgement")?;
        Ok(parsed.message)
    }
}
