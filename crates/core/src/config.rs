use crate::{Card, NeutralStrategy, Outcome, ResponseEntry};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const WILLINGNESS_MIN: f32 = 0.0;
pub const WILLINGNESS_MAX: f32 = 100.0;
pub const DEFAULT_CARDS_TO_PLAY: usize = 3;
pub const DEFAULT_HISTORY_LEN: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WillingnessRule {
    pub starting: f32,
    pub per_match: f32,
    pub per_fail: f32,
    /// Percentage points lost per second while a turn is live.
    pub decay_per_second: f32,
    /// Growth of the decay rate, in points per second per second.
    pub decay_acceleration: f32,
}

impl Default for WillingnessRule {
    fn default() -> Self {
        Self {
            starting: 50.0,
            per_match: 5.0,
            per_fail: -5.0,
            decay_per_second: 1.0,
            decay_acceleration: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingRule {
    pub opp_turn_seconds: f32,
    pub compute_seconds: f32,
    /// Route every n-th finished round through the review state.
    pub info_every_rounds: Option<u32>,
}

impl Default for TimingRule {
    fn default() -> Self {
        Self {
            opp_turn_seconds: 1.0,
            compute_seconds: 1.5,
            info_every_rounds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParticipantRule {
    pub starting_deck: Vec<Card>,
    #[serde(default = "default_draw_size")]
    pub base_draw_size: usize,
}

impl ParticipantRule {
    pub fn new(starting_deck: Vec<Card>) -> Self {
        Self {
            starting_deck,
            base_draw_size: default_draw_size(),
        }
    }
}

fn default_draw_size() -> usize {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatrixRule {
    #[serde(default)]
    pub id: String,
    pub opp_cards: Vec<Card>,
    #[serde(default)]
    pub entries: Vec<ResponseEntry>,
    #[serde(default)]
    pub default_outcome: Outcome,
}

/// How submissions of the wrong length are treated. Both log the mismatch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPolicy {
    /// Store the malformed array anyway.
    #[default]
    Lenient,
    /// Keep the previous value.
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BarterConfig {
    #[serde(default = "default_cards_to_play")]
    pub cards_to_play: usize,
    #[serde(default)]
    pub willingness: WillingnessRule,
    #[serde(default)]
    pub timing: TimingRule,
    #[serde(default = "default_history_len")]
    pub history_len: usize,
    #[serde(default)]
    pub submission: SubmissionPolicy,
    #[serde(default)]
    pub neutral: NeutralStrategy,
    pub matrix: MatrixRule,
    pub opponent: ParticipantRule,
    pub player: ParticipantRule,
}

fn default_cards_to_play() -> usize {
    DEFAULT_CARDS_TO_PLAY
}

fn default_history_len() -> usize {
    DEFAULT_HISTORY_LEN
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("cards_to_play must be at least 1")]
    NoSlots,
    #[error("starting willingness {0} is outside 0-100")]
    StartingWillingness(f32),
    #[error("{name} must be a finite, non-negative number (got {value})")]
    InvalidTunable { name: &'static str, value: f32 },
    #[error("info_every_rounds must be at least 1")]
    ZeroInfoInterval,
    #[error("{0} starting deck is empty")]
    EmptyDeck(&'static str),
    #[error("{who} draws {draw} cards but must play {play}")]
    HandTooSmall {
        who: &'static str,
        draw: usize,
        play: usize,
    },
    #[error("matrix has no opponent cards")]
    NoOpponentCards,
    #[error("opponent deck card {0} is not a matrix opponent card")]
    UnknownOpponentDeckCard(Card),
}

impl BarterConfig {
    pub fn new(matrix: MatrixRule, opponent: ParticipantRule, player: ParticipantRule) -> Self {
        Self {
            cards_to_play: default_cards_to_play(),
            willingness: WillingnessRule::default(),
            timing: TimingRule::default(),
            history_len: default_history_len(),
            submission: SubmissionPolicy::default(),
            neutral: NeutralStrategy::default(),
            matrix,
            opponent,
            player,
        }
    }

    /// Authoring checks. The runtime tolerates every one of these, so callers
    /// decide whether a failure is fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cards_to_play == 0 {
            return Err(ConfigError::NoSlots);
        }
        let start = self.willingness.starting;
        if !(WILLINGNESS_MIN..=WILLINGNESS_MAX).contains(&start) {
            return Err(ConfigError::StartingWillingness(start));
        }
        for (name, value) in [
            ("opp_turn_seconds", self.timing.opp_turn_seconds),
            ("compute_seconds", self.timing.compute_seconds),
            ("decay_per_second", self.willingness.decay_per_second),
            ("decay_acceleration", self.willingness.decay_acceleration),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTunable { name, value });
            }
        }
        if self.timing.info_every_rounds == Some(0) {
            return Err(ConfigError::ZeroInfoInterval);
        }
        for (who, rule) in [("opponent", &self.opponent), ("player", &self.player)] {
            if rule.starting_deck.is_empty() {
                return Err(ConfigError::EmptyDeck(who));
            }
        }
        if self.player.base_draw_size < self.cards_to_play {
            return Err(ConfigError::HandTooSmall {
                who: "player",
                draw: self.player.base_draw_size,
                play: self.cards_to_play,
            });
        }
        if self.matrix.opp_cards.is_empty() {
            return Err(ConfigError::NoOpponentCards);
        }
        if let Some(card) = self
            .opponent
            .starting_deck
            .iter()
            .find(|card| !self.matrix.opp_cards.contains(card))
        {
            return Err(ConfigError::UnknownOpponentDeckCard(card.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards_from_ids;

    fn sample() -> BarterConfig {
        let tones = cards_from_ids(["anger", "bluff", "direct", "flirt"]);
        BarterConfig::new(
            MatrixRule {
                id: "test".to_string(),
                opp_cards: tones.clone(),
                entries: Vec::new(),
                default_outcome: Outcome::Neutral,
            },
            ParticipantRule::new(tones.clone()),
            ParticipantRule::new(tones),
        )
    }

    #[test]
    fn sample_is_valid() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn rejects_out_of_range_start() {
        let mut config = sample();
        config.willingness.starting = 120.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::StartingWillingness(120.0))
        );
    }

    #[test]
    fn rejects_negative_decay_rate() {
        let mut config = sample();
        config.willingness.decay_per_second = -10.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidTunable {
                name: "decay_per_second",
                value: -10.0
            })
        );
    }

    #[test]
    fn rejects_small_player_hand() {
        let mut config = sample();
        config.player.base_draw_size = 2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::HandTooSmall { draw: 2, play: 3, .. })
        ));
    }

    #[test]
    fn rejects_opponent_card_outside_matrix() {
        let mut config = sample();
        config.opponent.starting_deck.push(Card::new("sulk"));
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownOpponentDeckCard(Card::new("sulk")))
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let raw = r#"{
            "matrix": { "opp_cards": ["a"] },
            "opponent": { "starting_deck": ["a", "a", "a"] },
            "player": { "starting_deck": ["x", "y", "z"] }
        }"#;
        let config: BarterConfig = serde_json::from_str(raw).expect("parse");
        assert_eq!(config.cards_to_play, 3);
        assert_eq!(config.history_len, 3);
        assert_eq!(config.willingness, WillingnessRule::default());
        assert_eq!(config.timing.compute_seconds, 1.5);
        assert_eq!(config.submission, SubmissionPolicy::Lenient);
        assert_eq!(config.neutral, NeutralStrategy::RandomHand);
        assert_eq!(config.player.base_draw_size, 3);
        assert_eq!(config.matrix.default_outcome, Outcome::Neutral);
        assert_eq!(config.validate(), Ok(()));
    }
}
