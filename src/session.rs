//! The interview session and its state machine.
//!
//! A `Session` owns the full state of one interview-to-prompt run. Its
//! lifecycle is modeled as an explicit `Stage` enum instead of a pair of
//! nullable fields, so a pending question and a finished prompt can never
//! coexist:
//!
//! ```text
//! Idle -> Interviewing <-> AwaitingQuestion -> AwaitingSummary -> Finalized
//!   ^                                                                 |
//!   +------------------------- restart ------------------------------+
//! ```
//!
//! `AwaitingQuestion` is the mid-interview state with no question pending:
//! entered transiently while a fetch is in flight, and left standing when a
//! fetch fails or a resumed save needs its next question. Recovery is always
//! [`Session::fetch_next_question`] — an appended answer is never rolled
//! back.
//!
//! Operations are async and take the service seams as arguments; the caller
//! owns the session exclusively and awaits one operation at a time.

use serde::{Deserialize, Serialize};

use crate::api::{GenerationService, PersistenceService, SaveAck};
use crate::errors::SessionError;
use crate::phase::{ALL_PHASES, Phase, select_phase};

/// Default question count for a fresh session.
pub const DEFAULT_TOTAL_QUESTIONS: usize = 20;

/// A question awaiting an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
}

/// One answered question, as recorded in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub selected_option: String,
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Nothing started yet.
    Idle,
    /// Mid-interview with a question pending.
    Interviewing(Question),
    /// Mid-interview, no question pending; the next fetch re-enters
    /// `Interviewing`.
    AwaitingQuestion,
    /// History is full; the final prompt has not been generated yet.
    AwaitingSummary,
    /// The synthesized prompt document.
    Finalized(String),
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Interviewing(_) => "interviewing",
            Stage::AwaitingQuestion => "awaiting the next question",
            Stage::AwaitingSummary => "awaiting the summary",
            Stage::Finalized(_) => "finalized",
        }
    }
}

/// Persisted form of a session, which is also the save-progress request
/// body. Field names match the service's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub idea: String,
    pub total_questions: usize,
    pub history: Vec<Answer>,
    pub current_phase: Phase,
    #[serde(default)]
    pub selected_phases: Vec<Phase>,
    #[serde(default)]
    pub final_prompt: String,
}

/// The full mutable state of one interview run.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Assigned at first save, stable afterwards.
    id: Option<String>,
    idea: String,
    total_questions: usize,
    selected_phases: Vec<Phase>,
    history: Vec<Answer>,
    stage: Stage,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            id: None,
            idea: String::new(),
            total_questions: DEFAULT_TOTAL_QUESTIONS,
            selected_phases: ALL_PHASES.to_vec(),
            history: Vec::new(),
            stage: Stage::Idle,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // ── accessors ────────────────────────────────────────────────────

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn idea(&self) -> &str {
        &self.idea
    }

    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    pub fn selected_phases(&self) -> &[Phase] {
        &self.selected_phases
    }

    pub fn history(&self) -> &[Answer] {
        &self.history
    }

    pub fn answered(&self) -> usize {
        self.history.len()
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn current_question(&self) -> Option<&Question> {
        match &self.stage {
            Stage::Interviewing(question) => Some(question),
            _ => None,
        }
    }

    pub fn final_prompt(&self) -> Option<&str> {
        match &self.stage {
            Stage::Finalized(prompt) => Some(prompt),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.history.len() >= self.total_questions
    }

    /// The phase governing the next question, per the sequencer.
    pub fn current_phase(&self) -> Phase {
        select_phase(
            self.history.len(),
            self.total_questions,
            &self.selected_phases,
        )
    }

    // ── operations ───────────────────────────────────────────────────

    /// Begin the interview: fix the idea, question count, and phase
    /// selection, then fetch the first question. An empty phase selection
    /// resolves to the full canonical list. On failure the session stays
    /// `Idle`.
    pub async fn start(
        &mut self,
        generation: &dyn GenerationService,
        idea: String,
        total_questions: usize,
        selected_phases: Vec<Phase>,
    ) -> Result<(), SessionError> {
        if self.stage != Stage::Idle {
            return Err(SessionError::InvalidTransition {
                operation: "start",
                state: self.stage.name(),
            });
        }

        let phases = if selected_phases.is_empty() {
            ALL_PHASES.to_vec()
        } else {
            selected_phases
        };
        let first_phase = select_phase(0, total_questions, &phases);

        let question = generation
            .generate_question(&idea, &[], total_questions, first_phase)
            .await
            .map_err(SessionError::service)?;

        self.idea = idea;
        self.total_questions = total_questions;
        self.selected_phases = phases;
        self.history.clear();
        self.stage = Stage::Interviewing(question);
        Ok(())
    }

    /// Record an answer to the pending question.
    ///
    /// Appends to history, then either completes the interview
    /// (`AwaitingSummary`) or fetches the next question. If the fetch fails
    /// the answer is kept and the session is left in `AwaitingQuestion`;
    /// call [`Self::fetch_next_question`] to retry.
    ///
    /// A no-op when no question is pending mid-interview.
    pub async fn answer(
        &mut self,
        generation: &dyn GenerationService,
        selected_option: String,
    ) -> Result<(), SessionError> {
        let question = match &self.stage {
            Stage::Interviewing(question) => question.clone(),
            Stage::AwaitingQuestion => return Ok(()),
            _ => {
                return Err(SessionError::InvalidTransition {
                    operation: "answer",
                    state: self.stage.name(),
                });
            }
        };

        self.history.push(Answer {
            question: question.text,
            selected_option,
        });

        if self.is_complete() {
            self.stage = Stage::AwaitingSummary;
            return Ok(());
        }

        self.stage = Stage::AwaitingQuestion;
        self.fetch_next_question(generation).await
    }

    /// Fetch the next question for a session with none pending. This is the
    /// recovery path after a failed fetch and the resume path after loading
    /// an incomplete save.
    pub async fn fetch_next_question(
        &mut self,
        generation: &dyn GenerationService,
    ) -> Result<(), SessionError> {
        if self.stage != Stage::AwaitingQuestion {
            return Err(SessionError::InvalidTransition {
                operation: "fetch the next question",
                state: self.stage.name(),
            });
        }
        if self.is_complete() {
            self.stage = Stage::AwaitingSummary;
            return Ok(());
        }

        let question = generation
            .generate_question(
                &self.idea,
                &self.history,
                self.total_questions,
                self.current_phase(),
            )
            .await
            .map_err(SessionError::service)?;
        self.stage = Stage::Interviewing(question);
        Ok(())
    }

    /// Request the synthesized prompt document. Valid once the history is
    /// full (`AwaitingSummary`); also accepted from the degraded
    /// no-question state as long as at least one answer exists. On failure
    /// the state is unchanged.
    pub async fn generate_final(
        &mut self,
        generation: &dyn GenerationService,
    ) -> Result<(), SessionError> {
        let admissible = matches!(self.stage, Stage::AwaitingSummary)
            || (matches!(self.stage, Stage::AwaitingQuestion) && !self.history.is_empty());
        if !admissible {
            return Err(SessionError::InvalidTransition {
                operation: "generate the final prompt",
                state: self.stage.name(),
            });
        }

        let prompt = generation
            .generate_prompt(&self.idea, &self.history, &self.selected_phases)
            .await
            .map_err(SessionError::service)?;
        self.stage = Stage::Finalized(prompt);
        Ok(())
    }

    /// Persist a snapshot of the session, assigning a fresh id on first
    /// save. A failed save leaves the in-memory session untouched (the id,
    /// once assigned, is kept for the retry).
    pub async fn save(
        &mut self,
        persistence: &dyn PersistenceService,
    ) -> Result<SaveAck, SessionError> {
        if self.stage == Stage::Idle {
            return Err(SessionError::InvalidTransition {
                operation: "save",
                state: self.stage.name(),
            });
        }

        let id = self
            .id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone();
        let snapshot = SessionSnapshot {
            id,
            idea: self.idea.clone(),
            total_questions: self.total_questions,
            history: self.history.clone(),
            current_phase: self.current_phase(),
            selected_phases: self.selected_phases.clone(),
            final_prompt: self.final_prompt().unwrap_or_default().to_string(),
        };

        persistence.save_progress(&snapshot).await.map_err(|err| {
            tracing::warn!(error = %err, "save failed; session state kept in memory");
            SessionError::service(err)
        })
    }

    /// Replace this session wholesale from a persisted snapshot. Always a
    /// destructive reset; if the snapshot is incomplete the next question
    /// is fetched immediately so the interview can continue.
    pub async fn load(
        &mut self,
        persistence: &dyn PersistenceService,
        generation: &dyn GenerationService,
        id: &str,
    ) -> Result<(), SessionError> {
        self.restart();

        let snapshot = persistence
            .load_progress(id)
            .await
            .map_err(SessionError::service)?;

        self.id = Some(snapshot.id);
        self.idea = snapshot.idea;
        self.total_questions = snapshot.total_questions;
        self.history = snapshot.history;
        self.selected_phases = if snapshot.selected_phases.is_empty() {
            ALL_PHASES.to_vec()
        } else {
            snapshot.selected_phases
        };

        if !snapshot.final_prompt.is_empty() {
            self.stage = Stage::Finalized(snapshot.final_prompt);
            return Ok(());
        }

        self.stage = Stage::AwaitingQuestion;
        // Moves to AwaitingSummary on its own when the history is already full.
        self.fetch_next_question(generation).await
    }

    /// Reset every field to the fresh-session defaults. Idempotent, no side
    /// effects.
    pub fn restart(&mut self) {
        *self = Session::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted generation service: pops pre-loaded question results in
    /// order; bails when the script runs dry so unexpected fetches fail
    /// tests loudly.
    struct ScriptedGeneration {
        questions: Mutex<Vec<Result<Question, String>>>,
        prompt: Mutex<Option<Result<String, String>>>,
    }

    impl ScriptedGeneration {
        fn new() -> Self {
            Self {
                questions: Mutex::new(Vec::new()),
                prompt: Mutex::new(None),
            }
        }

        fn push_question(self, text: &str, options: &[&str]) -> Self {
            self.questions.lock().unwrap().insert(
                0,
                Ok(Question {
                    text: text.to_string(),
                    options: options.iter().map(|o| o.to_string()).collect(),
                }),
            );
            self
        }

        fn push_question_failure(self, message: &str) -> Self {
            self.questions
                .lock()
                .unwrap()
                .insert(0, Err(message.to_string()));
            self
        }

        fn with_prompt(self, prompt: &str) -> Self {
            *self.prompt.lock().unwrap() = Some(Ok(prompt.to_string()));
            self
        }

        fn with_prompt_failure(self, message: &str) -> Self {
            *self.prompt.lock().unwrap() = Some(Err(message.to_string()));
            self
        }
    }

    #[async_trait]
    impl GenerationService for ScriptedGeneration {
        async fn generate_question(
            &self,
            _idea: &str,
            _history: &[Answer],
            _total_questions: usize,
            _current_phase: Phase,
        ) -> Result<Question> {
            match self.questions.lock().unwrap().pop() {
                Some(Ok(question)) => Ok(question),
                Some(Err(message)) => anyhow::bail!("{}", message),
                None => anyhow::bail!("unexpected generate_question call"),
            }
        }

        async fn explain_question(
            &self,
            _idea: &str,
            _question: &str,
            _options: &[String],
        ) -> Result<crate::api::Explanation> {
            anyhow::bail!("unexpected explain_question call")
        }

        async fn generate_prompt(
            &self,
            _idea: &str,
            _answers: &[Answer],
            _selected_phases: &[Phase],
        ) -> Result<String> {
            match self.prompt.lock().unwrap().take() {
                Some(Ok(prompt)) => Ok(prompt),
                Some(Err(message)) => anyhow::bail!("{}", message),
                None => anyhow::bail!("unexpected generate_prompt call"),
            }
        }
    }

    /// In-memory persistence keyed by id.
    #[derive(Default)]
    struct MemoryPersistence {
        saves: Mutex<HashMap<String, SessionSnapshot>>,
        fail_saves: bool,
    }

    impl MemoryPersistence {
        fn failing() -> Self {
            Self {
                saves: Mutex::new(HashMap::new()),
                fail_saves: true,
            }
        }
    }

    #[async_trait]
    impl PersistenceService for MemoryPersistence {
        async fn save_progress(&self, snapshot: &SessionSnapshot) -> Result<SaveAck> {
            if self.fail_saves {
                anyhow::bail!("Failed to save progress");
            }
            self.saves
                .lock()
                .unwrap()
                .insert(snapshot.id.clone(), snapshot.clone());
            Ok(SaveAck {
                message: "Progress saved".into(),
                id: snapshot.id.clone(),
            })
        }

        async fn list_saves(&self) -> Result<Vec<crate::api::SaveSummary>> {
            Ok(Vec::new())
        }

        async fn load_progress(&self, id: &str) -> Result<SessionSnapshot> {
            self.saves
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Save file not found"))
        }

        async fn delete_save(&self, id: &str) -> Result<String> {
            self.saves.lock().unwrap().remove(id);
            Ok("Save deleted successfully".into())
        }
    }

    async fn started_session(total: usize) -> (Session, ScriptedGeneration) {
        let generation =
            ScriptedGeneration::new().push_question("What is the main goal?", &["Speed", "Scale"]);
        let mut session = Session::new();
        session
            .start(&generation, "a recipe app".into(), total, vec![])
            .await
            .unwrap();
        (session, generation)
    }

    // ── start ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn start_enters_interviewing_with_first_question() {
        let (session, _) = started_session(20).await;
        let question = session.current_question().unwrap();
        assert_eq!(question.text, "What is the main goal?");
        assert_eq!(session.answered(), 0);
        assert_eq!(session.idea(), "a recipe app");
    }

    #[tokio::test]
    async fn start_resolves_empty_phase_selection_to_canonical() {
        let (session, _) = started_session(20).await;
        assert_eq!(session.selected_phases(), &ALL_PHASES);
    }

    #[tokio::test]
    async fn start_failure_stays_idle() {
        let generation = ScriptedGeneration::new().push_question_failure("Failed to generate question");
        let mut session = Session::new();
        let err = session
            .start(&generation, "x".into(), 20, vec![])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate question");
        assert_eq!(*session.stage(), Stage::Idle);
        assert!(session.idea().is_empty());
    }

    #[tokio::test]
    async fn start_twice_is_invalid() {
        let (mut session, generation) = started_session(20).await;
        let err = session
            .start(&generation, "again".into(), 20, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
    }

    // ── answer ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn answer_appends_history_and_fetches_next() {
        let (mut session, generation) = started_session(20).await;
        let generation = generation.push_question("Which database?", &["PostgreSQL", "SQLite"]);

        session.answer(&generation, "Speed".into()).await.unwrap();

        assert_eq!(session.answered(), 1);
        assert_eq!(session.history()[0].question, "What is the main goal?");
        assert_eq!(session.history()[0].selected_option, "Speed");
        assert_eq!(session.current_question().unwrap().text, "Which database?");
    }

    #[tokio::test]
    async fn answer_at_boundary_awaits_summary_without_fetch() {
        // The scripted service has no further question: any fetch would fail.
        let (mut session, generation) = started_session(1).await;
        session.answer(&generation, "Speed".into()).await.unwrap();
        assert_eq!(*session.stage(), Stage::AwaitingSummary);
        assert!(session.current_question().is_none());
    }

    #[tokio::test]
    async fn single_question_scenario() {
        let generation = ScriptedGeneration::new().push_question("Only question?", &["Y", "N"]);
        let mut session = Session::new();
        session
            .start(&generation, "X".into(), 1, vec![Phase::CoreFeatures])
            .await
            .unwrap();
        session.answer(&generation, "Y".into()).await.unwrap();

        assert_eq!(*session.stage(), Stage::AwaitingSummary);
        assert_eq!(
            session.history(),
            &[Answer {
                question: "Only question?".into(),
                selected_option: "Y".into(),
            }]
        );
    }

    #[tokio::test]
    async fn answer_fetch_failure_keeps_answer_and_allows_retry() {
        let (mut session, generation) = started_session(20).await;
        let generation = generation.push_question_failure("Failed to generate question");

        let err = session.answer(&generation, "Speed".into()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate question");
        assert_eq!(session.answered(), 1, "answer must not be rolled back");
        assert_eq!(*session.stage(), Stage::AwaitingQuestion);

        let generation = generation.push_question("Retry worked?", &["Yes"]);
        session.fetch_next_question(&generation).await.unwrap();
        assert_eq!(session.current_question().unwrap().text, "Retry worked?");
        assert_eq!(session.answered(), 1);
    }

    #[tokio::test]
    async fn answer_without_pending_question_is_noop() {
        let (mut session, generation) = started_session(20).await;
        let generation = generation.push_question_failure("boom");
        let _ = session.answer(&generation, "Speed".into()).await;
        assert_eq!(*session.stage(), Stage::AwaitingQuestion);

        session.answer(&generation, "Scale".into()).await.unwrap();
        assert_eq!(session.answered(), 1, "no-op must not record an answer");
    }

    #[tokio::test]
    async fn answer_from_idle_is_invalid() {
        let generation = ScriptedGeneration::new();
        let mut session = Session::new();
        let err = session.answer(&generation, "x".into()).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
    }

    // ── generate_final ───────────────────────────────────────────────

    #[tokio::test]
    async fn generate_final_transitions_to_finalized() {
        let (mut session, generation) = started_session(1).await;
        session.answer(&generation, "Speed".into()).await.unwrap();

        let generation = generation.with_prompt("# Build a recipe app");
        session.generate_final(&generation).await.unwrap();

        assert_eq!(session.final_prompt(), Some("# Build a recipe app"));
        assert!(session.current_question().is_none());
    }

    #[tokio::test]
    async fn generate_final_failure_keeps_awaiting_summary() {
        let (mut session, generation) = started_session(1).await;
        session.answer(&generation, "Speed".into()).await.unwrap();

        let generation = generation.with_prompt_failure("Failed to generate final prompt");
        let err = session.generate_final(&generation).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate final prompt");
        assert_eq!(*session.stage(), Stage::AwaitingSummary);
    }

    #[tokio::test]
    async fn generate_final_from_degraded_state_with_answers() {
        let (mut session, generation) = started_session(20).await;
        let generation = generation.push_question_failure("boom");
        let _ = session.answer(&generation, "Speed".into()).await;
        assert_eq!(*session.stage(), Stage::AwaitingQuestion);

        let generation = generation.with_prompt("early prompt");
        session.generate_final(&generation).await.unwrap();
        assert_eq!(session.final_prompt(), Some("early prompt"));
    }

    #[tokio::test]
    async fn generate_final_from_idle_is_invalid() {
        let generation = ScriptedGeneration::new();
        let mut session = Session::new();
        let err = session.generate_final(&generation).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
    }

    // ── save / load ──────────────────────────────────────────────────

    #[tokio::test]
    async fn save_assigns_id_once_and_reuses_it() {
        let (mut session, _) = started_session(20).await;
        let persistence = MemoryPersistence::default();

        let first = session.save(&persistence).await.unwrap();
        let assigned = session.id().unwrap().to_string();
        assert_eq!(first.id, assigned);

        let second = session.save(&persistence).await.unwrap();
        assert_eq!(second.id, assigned, "re-saving must reuse the id");
    }

    #[tokio::test]
    async fn save_from_idle_is_invalid() {
        let persistence = MemoryPersistence::default();
        let mut session = Session::new();
        let err = session.save(&persistence).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn save_failure_keeps_in_memory_state() {
        let (mut session, generation) = started_session(20).await;
        let generation = generation.push_question("Q2", &["A"]);
        session.answer(&generation, "Speed".into()).await.unwrap();

        let persistence = MemoryPersistence::failing();
        let before = session.clone();
        let err = session.save(&persistence).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to save progress");

        // The id assignment is the one permitted difference.
        assert_eq!(session.history(), before.history());
        assert_eq!(session.stage(), before.stage());
        assert!(session.id().is_some());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let (mut session, generation) = started_session(2).await;
        let generation = generation.push_question("Q2", &["A", "B"]);
        session.answer(&generation, "Speed".into()).await.unwrap();

        let persistence = MemoryPersistence::default();
        let ack = session.save(&persistence).await.unwrap();

        // Loading fetches the next question for the incomplete snapshot.
        let generation = generation.push_question("Resumed question", &["C"]);
        let mut restored = Session::new();
        restored
            .load(&persistence, &generation, &ack.id)
            .await
            .unwrap();

        assert_eq!(restored.id(), session.id());
        assert_eq!(restored.idea(), session.idea());
        assert_eq!(restored.total_questions(), session.total_questions());
        assert_eq!(restored.history(), session.history());
        assert_eq!(restored.selected_phases(), session.selected_phases());
        assert_eq!(
            restored.current_question().unwrap().text,
            "Resumed question"
        );
    }

    #[tokio::test]
    async fn load_finalized_snapshot_skips_question_fetch() {
        let (mut session, generation) = started_session(1).await;
        session.answer(&generation, "Speed".into()).await.unwrap();
        let generation = generation.with_prompt("done");
        session.generate_final(&generation).await.unwrap();

        let persistence = MemoryPersistence::default();
        let ack = session.save(&persistence).await.unwrap();

        // Empty script: any fetch would fail the test.
        let mut restored = Session::new();
        restored
            .load(&persistence, &ScriptedGeneration::new(), &ack.id)
            .await
            .unwrap();
        assert_eq!(restored.final_prompt(), Some("done"));
    }

    #[tokio::test]
    async fn load_full_but_unfinalized_snapshot_awaits_summary() {
        let (mut session, generation) = started_session(1).await;
        session.answer(&generation, "Speed".into()).await.unwrap();

        let persistence = MemoryPersistence::default();
        let ack = session.save(&persistence).await.unwrap();

        let mut restored = Session::new();
        restored
            .load(&persistence, &ScriptedGeneration::new(), &ack.id)
            .await
            .unwrap();
        assert_eq!(*restored.stage(), Stage::AwaitingSummary);
    }

    #[tokio::test]
    async fn load_unknown_id_resets_and_surfaces_error() {
        let (mut session, _) = started_session(20).await;
        let persistence = MemoryPersistence::default();

        let err = session
            .load(&persistence, &ScriptedGeneration::new(), "missing")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Save file not found");
        assert_eq!(*session.stage(), Stage::Idle);
    }

    #[tokio::test]
    async fn load_question_fetch_failure_leaves_resumable_state() {
        let (mut session, generation) = started_session(2).await;
        let generation = generation.push_question("Q2", &["A"]);
        session.answer(&generation, "Speed".into()).await.unwrap();

        let persistence = MemoryPersistence::default();
        let ack = session.save(&persistence).await.unwrap();

        let failing = ScriptedGeneration::new().push_question_failure("Failed to generate question");
        let mut restored = Session::new();
        let err = restored
            .load(&persistence, &failing, &ack.id)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate question");
        assert_eq!(*restored.stage(), Stage::AwaitingQuestion);
        assert_eq!(restored.answered(), 1);

        let retry = ScriptedGeneration::new().push_question("Back on track", &["A"]);
        restored.fetch_next_question(&retry).await.unwrap();
        assert_eq!(restored.current_question().unwrap().text, "Back on track");
    }

    // ── restart ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn restart_resets_everything() {
        let (mut session, _) = started_session(5).await;
        session.restart();

        assert_eq!(*session.stage(), Stage::Idle);
        assert!(session.id().is_none());
        assert!(session.idea().is_empty());
        assert_eq!(session.total_questions(), DEFAULT_TOTAL_QUESTIONS);
        assert_eq!(session.selected_phases(), &ALL_PHASES);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn restart_is_idempotent() {
        let (mut session, _) = started_session(5).await;
        session.restart();
        let once = session.clone();
        session.restart();
        assert_eq!(session, once);
    }

    // ── snapshot serde ───────────────────────────────────────────────

    #[test]
    fn snapshot_wire_format_uses_snake_case_names() {
        let snapshot = SessionSnapshot {
            id: "abc".into(),
            idea: "a recipe app".into(),
            total_questions: 20,
            history: vec![Answer {
                question: "Q".into(),
                selected_option: "A".into(),
            }],
            current_phase: Phase::TechStack,
            selected_phases: vec![Phase::CoreFeatures, Phase::TechStack],
            final_prompt: String::new(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["total_questions"], 20);
        assert_eq!(json["current_phase"], "Tech Stack");
        assert_eq!(json["history"][0]["selected_option"], "A");
        assert_eq!(json["final_prompt"], "");
    }

    #[test]
    fn snapshot_tolerates_missing_optional_fields() {
        // Older saves carry no phase selection and no final prompt.
        let json = r#"{
            "id": "1718000000000",
            "idea": "legacy save",
            "total_questions": 10,
            "history": [],
            "current_phase": "Core Features",
            "timestamp": "2026-08-30T12:00:00"
        }"#;
        let snapshot: SessionSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.selected_phases.is_empty());
        assert!(snapshot.final_prompt.is_empty());
    }
}
