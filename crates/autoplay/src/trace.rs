use crate::{AutoAction, AutoplayError};
use barter_core::Event;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RunStatus {
    Won,
    Lost,
    MaxTicks,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRecord {
    pub tick: u32,
    pub state: String,
    pub action: AutoAction,
    #[serde(default)]
    pub card: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundRecord {
    pub round: u32,
    pub tick: u32,
    pub opp_cards: Vec<String>,
    pub player_cards: Vec<String>,
    /// One symbol per slot: `+`, `=` or `-`.
    pub outcomes: String,
    pub willingness_after: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutoplayResult {
    pub status: RunStatus,
    pub seed: u64,
    pub policy: String,
    pub ticks: u32,
    pub simulated_seconds: f32,
    pub final_willingness: f32,
    pub rounds: Vec<RoundRecord>,
    pub actions: Vec<ActionRecord>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl AutoplayResult {
    pub fn to_text_report(&self) -> String {
        let mut lines = vec![
            format!("status: {}", run_status_label(self.status)),
            format!(
                "seed: {} policy: {} ticks: {} simulated: {:.1}s",
                self.seed, self.policy, self.ticks, self.simulated_seconds
            ),
            format!("final willingness: {:.1}", self.final_willingness),
            String::new(),
            "rounds:".to_string(),
        ];
        if self.rounds.is_empty() {
            lines.push("  (none)".to_string());
        }
        for round in &self.rounds {
            lines.push(format!(
                "  round {:>3} @ tick {:>5} | {} | willingness {:.1}",
                round.round, round.tick, round.outcomes, round.willingness_after
            ));
            lines.push(format!("    opponent: {}", round.opp_cards.join(", ")));
            lines.push(format!("    player:   {}", round.player_cards.join(", ")));
        }
        lines.push(String::new());
        lines.push(format!("actions: {}", self.actions.len()));
        for record in &self.actions {
            let card = record
                .card
                .as_deref()
                .map(|card| format!(" ({card})"))
                .unwrap_or_default();
            lines.push(format!(
                "  tick {:>5} [{}] {}{card}",
                record.tick,
                record.state,
                record.action.short_label()
            ));
        }
        lines.push(format!("events: {}", self.events.len()));
        lines.join("\n")
    }
}

fn run_status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Won => "Won",
        RunStatus::Lost => "Lost",
        RunStatus::MaxTicks => "MaxTicks",
    }
}

pub fn write_json(path: &Path, result: &AutoplayResult) -> Result<(), AutoplayError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(result)?;
    fs::write(path, body)?;
    Ok(())
}

pub fn write_text(path: &Path, result: &AutoplayResult) -> Result<(), AutoplayError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, result.to_text_report())?;
    Ok(())
}
