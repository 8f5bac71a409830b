use serde::{Deserialize, Serialize};
use std::fmt;

/// A tone card. Two cards are the same card when their ids match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card {
    id: String,
}

impl Card {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<&str> for Card {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PileKind {
    Draw,
    Hand,
    Discard,
}

impl PileKind {
    pub const ALL: [PileKind; 3] = [PileKind::Draw, PileKind::Hand, PileKind::Discard];

    pub fn label(self) -> &'static str {
        match self {
            Self::Draw => "draw",
            Self::Hand => "hand",
            Self::Discard => "discard",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Participant {
    Opponent,
    Player,
}

impl Participant {
    pub fn label(self) -> &'static str {
        match self {
            Self::Opponent => "opponent",
            Self::Player => "player",
        }
    }
}

/// Result of pairing an opponent card with a player card.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Outcome {
    pub fn symbol(self) -> char {
        match self {
            Self::Positive => '+',
            Self::Neutral => '=',
            Self::Negative => '-',
        }
    }
}

pub fn cards_from_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<Card> {
    ids.into_iter().map(Card::new).collect()
}
