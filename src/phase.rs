//! Interview phases and the phase sequencer.
//!
//! This module provides:
//! - `Phase` — the eight canonical topical phases an interview walks through
//! - `select_phase` — the proportional mapping from an answered-question
//!   count to the phase that governs the next question
//!
//! Phases serialize as their human-readable labels (e.g. "Tech Stack"),
//! which is also the wire format the generation service expects.

use serde::{Deserialize, Serialize};

/// A topical grouping of interview questions.
///
/// The variant order is the canonical interview order: a full interview
/// moves from feature discovery toward operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "Core Features")]
    CoreFeatures,
    #[serde(rename = "Tech Stack")]
    TechStack,
    #[serde(rename = "UI/UX Design")]
    UiUxDesign,
    #[serde(rename = "Data Strategy")]
    DataStrategy,
    #[serde(rename = "Security & Privacy")]
    SecurityPrivacy,
    #[serde(rename = "Testing Strategy")]
    TestingStrategy,
    #[serde(rename = "DevOps & Scalability")]
    DevOpsScalability,
    #[serde(rename = "Observability & Maintenance")]
    ObservabilityMaintenance,
}

/// All phases in canonical order. A session that selects no phases falls
/// back to this full list.
pub const ALL_PHASES: [Phase; 8] = [
    Phase::CoreFeatures,
    Phase::TechStack,
    Phase::UiUxDesign,
    Phase::DataStrategy,
    Phase::SecurityPrivacy,
    Phase::TestingStrategy,
    Phase::DevOpsScalability,
    Phase::ObservabilityMaintenance,
];

impl Phase {
    /// The human-readable label, identical to the wire representation.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::CoreFeatures => "Core Features",
            Phase::TechStack => "Tech Stack",
            Phase::UiUxDesign => "UI/UX Design",
            Phase::DataStrategy => "Data Strategy",
            Phase::SecurityPrivacy => "Security & Privacy",
            Phase::TestingStrategy => "Testing Strategy",
            Phase::DevOpsScalability => "DevOps & Scalability",
            Phase::ObservabilityMaintenance => "Observability & Maintenance",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Phase {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ALL_PHASES
            .iter()
            .find(|p| p.label().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown phase '{}'. Valid phases: {}",
                    s,
                    ALL_PHASES.map(|p| p.label()).join(", ")
                )
            })
    }
}

/// Select the phase that governs the next question.
///
/// Buckets the question index proportionally across the selected phases:
/// `index = floor(answered / total * selected.len())`, clamped so the
/// completion boundary (`answered == total`) lands on the last phase
/// instead of one past the end.
///
/// An empty `selected` slice returns the first canonical phase rather than
/// failing. `total` must be positive; that is the caller's precondition and
/// is not checked here.
pub fn select_phase(answered: usize, total: usize, selected: &[Phase]) -> Phase {
    let Some(last) = selected.last() else {
        return Phase::CoreFeatures;
    };
    let index = answered * selected.len() / total;
    selected.get(index).copied().unwrap_or(*last)
}
