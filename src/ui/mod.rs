//! Terminal presentation for the interview.
//!
//! Network waits render an `indicatif` spinner; everything else is styled
//! line output via `console`. No state is kept here — the session owns the
//! data, these functions only draw it.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::api::{Explanation, SaveSummary};
use crate::phase::Phase;
use crate::session::{Answer, Question};

/// Spinner shown while a service call is in flight. Callers must
/// `finish_and_clear` it when the call resolves.
pub fn spinner(msg: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("spinner template is a valid static string"),
    );
    bar.set_message(msg.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Header line shown above each question: phase, progress, and a save hint.
pub fn print_question_header(phase: Phase, number: usize, total: usize) {
    println!();
    println!(
        "{} {}  {}",
        style(format!("Question {}/{}", number, total)).bold(),
        style(format!("· {}", phase)).cyan(),
        style("(progress can be saved from the menu)").dim()
    );
}

pub fn print_question(question: &Question) {
    println!();
    println!("  {}", style(&question.text).bold());
}

pub fn print_explanation(explanation: &Explanation, options: &[String]) {
    println!();
    println!("  {}", style(&explanation.question_explanation).italic());
    for option in options {
        if let Some(text) = explanation.option_explanations.get(option) {
            println!("    {} {}", style(option).cyan(), style(text).dim());
        }
    }
    println!();
}

/// Answer recap shown before final prompt generation.
pub fn print_summary(idea: &str, history: &[Answer]) {
    println!();
    println!("{}", style("Interview complete").green().bold());
    println!("  Idea: {}", style(idea).bold());
    println!();
    for (index, answer) in history.iter().enumerate() {
        println!("  {} {}", style(format!("{:>2}.", index + 1)).dim(), answer.question);
        println!("      {}", style(&answer.selected_option).cyan());
    }
}

pub fn print_final_prompt(prompt: &str) {
    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", prompt);
    println!("{}", style("─".repeat(60)).dim());
}

/// Render a service timestamp for display. The service emits ISO-8601,
/// sometimes without an offset; anything unparseable is shown as-is.
fn format_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        })
        .unwrap_or_else(|_| raw.to_string())
}

pub fn print_saves(saves: &[SaveSummary]) {
    if saves.is_empty() {
        println!("No saved sessions found.");
        return;
    }
    println!("{}", style("Saved sessions:").bold());
    for save in saves {
        println!(
            "  {}  {}  {}  {}",
            style(&save.id).cyan(),
            style(format!("[{}]", save.progress)).yellow(),
            save.idea,
            style(format_timestamp(&save.timestamp)).dim()
        );
    }
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), message);
}

pub fn print_saved(id: &str) {
    println!("{} id: {}", style("Progress saved.").green(), style(id).cyan());
}
