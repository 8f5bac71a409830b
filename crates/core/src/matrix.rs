use crate::{Card, MatrixRule, Outcome};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// One authored cell: how the opponent reacts when `player` answers `opp`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseEntry {
    pub opp: Card,
    pub player: Card,
    pub outcome: Outcome,
}

impl ResponseEntry {
    pub fn new(opp: impl Into<Card>, player: impl Into<Card>, outcome: Outcome) -> Self {
        Self {
            opp: opp.into(),
            player: player.into(),
            outcome,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    #[error("response matrix {0:?} was queried before initialize()")]
    NotInitialized(String),
    #[error("card {card} is not an opponent card of matrix {matrix:?}")]
    UnknownOpponentCard { matrix: String, card: Card },
}

/// Opponent preferences, authored sparsely; unlisted pairs fall back to
/// `default_outcome`.
#[derive(Debug, Clone)]
pub struct ResponseMatrix {
    id: String,
    opp_cards: Vec<Card>,
    entries: Vec<ResponseEntry>,
    default_outcome: Outcome,
    table: Option<HashMap<Card, HashMap<Card, Outcome>>>,
}

impl ResponseMatrix {
    pub fn new(rule: &MatrixRule) -> Self {
        Self {
            id: rule.id.clone(),
            opp_cards: rule.opp_cards.clone(),
            entries: rule.entries.clone(),
            default_outcome: rule.default_outcome,
            table: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn opp_cards(&self) -> &[Card] {
        &self.opp_cards
    }

    pub fn default_outcome(&self) -> Outcome {
        self.default_outcome
    }

    pub fn is_initialized(&self) -> bool {
        self.table.is_some()
    }

    /// Rebuilds the lookup table from the authored entries. Safe to call
    /// any number of times.
    pub fn initialize(&mut self) {
        let valid: HashSet<&Card> = self.opp_cards.iter().collect();
        let mut table: HashMap<Card, HashMap<Card, Outcome>> = self
            .opp_cards
            .iter()
            .map(|card| (card.clone(), HashMap::new()))
            .collect();
        for entry in &self.entries {
            if !valid.contains(&entry.opp) {
                log::warn!(
                    "matrix {:?}: skipping entry for unknown opponent card {}",
                    self.id,
                    entry.opp
                );
                continue;
            }
            let row = table.entry(entry.opp.clone()).or_default();
            if row.contains_key(&entry.player) {
                log::warn!(
                    "matrix {:?}: duplicate entry {} / {}, keeping the first",
                    self.id,
                    entry.opp,
                    entry.player
                );
                continue;
            }
            row.insert(entry.player.clone(), entry.outcome);
        }
        self.table = Some(table);
    }

    pub fn lookup(&self, opp: &Card, player: &Card) -> Result<Outcome, MatrixError> {
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| MatrixError::NotInitialized(self.id.clone()))?;
        let row = table
            .get(opp)
            .ok_or_else(|| MatrixError::UnknownOpponentCard {
                matrix: self.id.clone(),
                card: opp.clone(),
            })?;
        Ok(row.get(player).copied().unwrap_or(self.default_outcome))
    }

    /// Outcome of `player` answering `opp`. Caller errors are logged and read
    /// as Neutral.
    pub fn get_match(&self, opp: &Card, player: &Card) -> Outcome {
        match self.lookup(opp, player) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("{err}");
                Outcome::Neutral
            }
        }
    }
}
