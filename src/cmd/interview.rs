//! Interview commands — `promptsmith start` and `promptsmith resume`.
//!
//! The interactive loop renders the session's current stage and turns user
//! choices into state-machine operations. Operations are awaited one at a
//! time, so the session is single-flight by construction; every service
//! failure is shown and the same action can be re-triggered.

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, MultiSelect, Select, theme::ColorfulTheme};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use promptsmith::api::{GenerationService, ServiceClient};
use promptsmith::config::Config;
use promptsmith::phase::{ALL_PHASES, Phase};
use promptsmith::session::{Session, Stage};
use promptsmith::ui;

/// What the user chose to do after the loop ended.
enum LoopOutcome {
    Done,
    RestartRequested,
}

/// Begin a new interview. Missing inputs (idea, phase selection) are
/// gathered interactively; `--yes` skips the optional prompts and takes
/// the defaults.
pub async fn cmd_start(
    config: &Config,
    idea: Option<String>,
    questions: Option<usize>,
    phases: Option<String>,
    output: Option<PathBuf>,
    yes: bool,
) -> Result<()> {
    let client = ServiceClient::new(&config.service.url, config.timeout())?;
    let total_questions = questions.unwrap_or(config.interview.questions);
    anyhow::ensure!(total_questions > 0, "Question count must be positive");

    let mut idea = idea;
    let mut phases = phases;
    let mut session = Session::new();

    loop {
        let idea_text = match idea.take() {
            Some(text) => text,
            None => Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Describe your project idea")
                .interact_text()
                .context("Failed to read project idea")?,
        };
        let selected = match phases.take() {
            Some(arg) => parse_phases(&arg)?,
            None if yes => ALL_PHASES.to_vec(),
            None => prompt_phases()?,
        };

        let bar = ui::spinner("Preparing the first question...");
        let started = session
            .start(&client, idea_text, total_questions, selected)
            .await;
        bar.finish_and_clear();
        started?;

        match run_interview(&mut session, &client, output.as_deref(), yes).await? {
            LoopOutcome::Done => return Ok(()),
            LoopOutcome::RestartRequested => session.restart(),
        }
    }
}

/// Load a saved session by id and continue where it left off.
pub async fn cmd_resume(
    config: &Config,
    id: &str,
    output: Option<PathBuf>,
    yes: bool,
) -> Result<()> {
    let client = ServiceClient::new(&config.service.url, config.timeout())?;
    let mut session = Session::new();

    let bar = ui::spinner("Loading saved session...");
    let loaded = session.load(&client, &client, id).await;
    bar.finish_and_clear();
    if let Err(err) = loaded {
        // A failed question fetch after a successful load is recoverable
        // inside the loop; a failed load is not.
        if matches!(session.stage(), Stage::Idle) {
            return Err(err.into());
        }
        ui::print_error(&err.to_string());
    }

    println!(
        "Resumed '{}' ({}/{} answered)",
        session.idea(),
        session.answered(),
        session.total_questions()
    );

    match run_interview(&mut session, &client, output.as_deref(), yes).await? {
        LoopOutcome::Done => Ok(()),
        LoopOutcome::RestartRequested => {
            session.restart();
            cmd_start(config, None, None, None, output, yes).await
        }
    }
}

/// Drive the session until the user quits or the prompt is finalized.
async fn run_interview(
    session: &mut Session,
    client: &ServiceClient,
    output: Option<&Path>,
    yes: bool,
) -> Result<LoopOutcome> {
    loop {
        match session.stage().clone() {
            Stage::Interviewing(question) => {
                ui::print_question_header(
                    session.current_phase(),
                    session.answered() + 1,
                    session.total_questions(),
                );
                ui::print_question(&question);

                let mut items = question.options.clone();
                items.push("Other (write in)".into());
                items.push("Explain this question".into());
                items.push("Save progress".into());
                items.push("Quit".into());

                let selection = Select::with_theme(&ColorfulTheme::default())
                    .with_prompt("Your answer")
                    .items(&items)
                    .default(0)
                    .interact()
                    .context("Failed to read answer selection")?;

                let option_count = question.options.len();
                if selection < option_count {
                    submit_answer(session, client, items[selection].clone()).await;
                } else if selection == option_count {
                    let text: String = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt("Your answer")
                        .interact_text()
                        .context("Failed to read free-text answer")?;
                    submit_answer(session, client, text).await;
                } else if selection == option_count + 1 {
                    explain(session, client, &question).await;
                } else if selection == option_count + 2 {
                    save(session, client).await;
                } else {
                    offer_save(session, client, yes).await;
                    return Ok(LoopOutcome::Done);
                }
            }

            Stage::AwaitingQuestion => {
                let items = [
                    "Retry fetching the next question",
                    "Generate the final prompt now",
                    "Save progress",
                    "Quit",
                ];
                let selection = Select::with_theme(&ColorfulTheme::default())
                    .with_prompt("No question is pending")
                    .items(&items)
                    .default(0)
                    .interact()
                    .context("Failed to read recovery selection")?;
                match selection {
                    0 => {
                        let bar = ui::spinner("Fetching the next question...");
                        let result = session.fetch_next_question(client).await;
                        bar.finish_and_clear();
                        if let Err(err) = result {
                            ui::print_error(&err.to_string());
                        }
                    }
                    1 => generate_final(session, client).await,
                    2 => save(session, client).await,
                    _ => {
                        offer_save(session, client, yes).await;
                        return Ok(LoopOutcome::Done);
                    }
                }
            }

            Stage::AwaitingSummary => {
                ui::print_summary(session.idea(), session.history());
                let items = ["Generate the final prompt", "Save progress", "Quit"];
                let selection = Select::with_theme(&ColorfulTheme::default())
                    .with_prompt("All questions answered")
                    .items(&items)
                    .default(0)
                    .interact()
                    .context("Failed to read summary selection")?;
                match selection {
                    0 => generate_final(session, client).await,
                    1 => save(session, client).await,
                    _ => {
                        offer_save(session, client, yes).await;
                        return Ok(LoopOutcome::Done);
                    }
                }
            }

            Stage::Finalized(prompt) => {
                ui::print_final_prompt(&prompt);
                if let Some(path) = output {
                    std::fs::write(path, &prompt).with_context(|| {
                        format!("Failed to write prompt to: {}", path.display())
                    })?;
                    println!("Prompt written to {}", path.display());
                }
                offer_save(session, client, yes).await;

                if !yes
                    && Confirm::with_theme(&ColorfulTheme::default())
                        .with_prompt("Start a new interview?")
                        .default(false)
                        .interact()
                        .unwrap_or(false)
                {
                    return Ok(LoopOutcome::RestartRequested);
                }
                return Ok(LoopOutcome::Done);
            }

            Stage::Idle => return Ok(LoopOutcome::Done),
        }
    }
}

async fn submit_answer(session: &mut Session, client: &ServiceClient, selected_option: String) {
    let bar = ui::spinner("Recording answer...");
    let result = session.answer(client, selected_option).await;
    bar.finish_and_clear();
    if let Err(err) = result {
        // The answer is kept; the loop offers a retry from AwaitingQuestion.
        ui::print_error(&err.to_string());
    }
}

async fn explain(
    session: &Session,
    client: &ServiceClient,
    question: &promptsmith::session::Question,
) {
    let bar = ui::spinner("Asking for an explanation...");
    let result = client
        .explain_question(session.idea(), &question.text, &question.options)
        .await;
    bar.finish_and_clear();
    match result {
        Ok(explanation) => ui::print_explanation(&explanation, &question.options),
        Err(err) => ui::print_error(&err.to_string()),
    }
}

async fn generate_final(session: &mut Session, client: &ServiceClient) {
    let bar = ui::spinner("Synthesizing the final prompt...");
    let result = session.generate_final(client).await;
    bar.finish_and_clear();
    if let Err(err) = result {
        ui::print_error(&err.to_string());
    }
}

async fn save(session: &mut Session, client: &ServiceClient) {
    let bar = ui::spinner("Saving progress...");
    let result = session.save(client).await;
    bar.finish_and_clear();
    match result {
        Ok(ack) => ui::print_saved(&ack.id),
        Err(err) => ui::print_error(&err.to_string()),
    }
}

/// Offer a save on the way out, unless `--yes` suppressed prompts.
async fn offer_save(session: &mut Session, client: &ServiceClient, yes: bool) {
    if yes || matches!(session.stage(), Stage::Idle) {
        return;
    }
    let wants_save = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Save this session?")
        .default(true)
        .interact()
        .unwrap_or(false);
    if wants_save {
        save(session, client).await;
    }
}

/// Parse a comma-separated phase list, e.g. "Core Features,Tech Stack".
pub fn parse_phases(arg: &str) -> Result<Vec<Phase>> {
    arg.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Phase::from_str)
        .collect()
}

fn prompt_phases() -> Result<Vec<Phase>> {
    let labels: Vec<&str> = ALL_PHASES.iter().map(|p| p.label()).collect();
    let defaults = vec![true; labels.len()];
    let chosen = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Which phases should the interview cover?")
        .items(&labels)
        .defaults(&defaults)
        .interact()
        .context("Failed to read phase selection")?;
    Ok(chosen.into_iter().map(|index| ALL_PHASES[index]).collect())
}
