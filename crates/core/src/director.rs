use crate::{
    BarterConfig, Card, Event, EventBus, NeutralStrategy, Outcome, RepeatTarget, ResponseMatrix,
    SubmissionPolicy, WILLINGNESS_MAX, WILLINGNESS_MIN,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RoundError {
    #[error("willingness {0} is outside 0-100")]
    WillingnessOutOfRange(f32),
    #[error("expected {expected} {what}, got {got}")]
    WrongLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("slot {index} is outside 0..{slots}")]
    SlotOutOfRange { index: usize, slots: usize },
}

/// What both sides put on the table in one round, slot by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSubmission {
    pub opp_cards: Option<Vec<Card>>,
    pub player_cards: Vec<Option<Card>>,
    pub outcomes: Option<Vec<Outcome>>,
}

impl RoundSubmission {
    pub fn empty(slots: usize) -> Self {
        Self {
            opp_cards: None,
            player_cards: vec![None; slots],
            outcomes: None,
        }
    }

    pub fn card_at(&self, side: RepeatTarget, slot: usize) -> Option<&Card> {
        match side {
            RepeatTarget::Opponent => self.opp_cards.as_ref()?.get(slot),
            RepeatTarget::Player => self.player_cards.get(slot)?.as_ref(),
        }
    }

    pub fn player_complete(&self) -> bool {
        !self.player_cards.is_empty() && self.player_cards.iter().all(Option::is_some)
    }
}

/// Per-slot outcomes and the willingness change they add up to.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundScore {
    pub outcomes: Vec<Outcome>,
    pub delta: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundSettings {
    pub cards_to_play: usize,
    pub starting_willingness: f32,
    pub per_match: f32,
    pub per_fail: f32,
    pub decay_per_second: f32,
    pub decay_acceleration: f32,
    pub history_len: usize,
    pub submission: SubmissionPolicy,
}

impl RoundSettings {
    pub fn from_config(config: &BarterConfig) -> Self {
        Self {
            cards_to_play: config.cards_to_play,
            starting_willingness: config.willingness.starting,
            per_match: config.willingness.per_match,
            per_fail: config.willingness.per_fail,
            decay_per_second: config.willingness.decay_per_second,
            decay_acceleration: config.willingness.decay_acceleration,
            history_len: config.history_len,
            submission: config.submission,
        }
    }

    pub fn delta_for(&self, outcome: Outcome) -> f32 {
        match outcome {
            Outcome::Positive => self.per_match,
            Outcome::Negative => self.per_fail,
            Outcome::Neutral => 0.0,
        }
    }
}

/// The single source of truth for an active negotiation: willingness, the
/// current submissions and the rounds already played.
#[derive(Debug, Clone)]
pub struct RoundState {
    settings: RoundSettings,
    willingness: f32,
    current_decay: f32,
    current: RoundSubmission,
    last_round_neutrals: Vec<bool>,
    history: Vec<RoundSubmission>,
    matrix: ResponseMatrix,
    neutral: NeutralStrategy,
}

impl RoundState {
    pub fn new(settings: RoundSettings, matrix: ResponseMatrix, neutral: NeutralStrategy) -> Self {
        let slots = settings.cards_to_play;
        Self {
            willingness: settings.starting_willingness.clamp(WILLINGNESS_MIN, WILLINGNESS_MAX),
            current_decay: settings.decay_per_second,
            current: RoundSubmission::empty(slots),
            last_round_neutrals: vec![false; slots],
            history: Vec::new(),
            settings,
            matrix,
            neutral,
        }
    }

    pub fn from_config(config: &BarterConfig) -> Self {
        Self::new(
            RoundSettings::from_config(config),
            ResponseMatrix::new(&config.matrix),
            config.neutral.clone(),
        )
    }

    pub fn settings(&self) -> &RoundSettings {
        &self.settings
    }

    pub fn cards_to_play(&self) -> usize {
        self.settings.cards_to_play
    }

    pub fn matrix(&self) -> &ResponseMatrix {
        &self.matrix
    }

    pub fn matrix_mut(&mut self) -> &mut ResponseMatrix {
        &mut self.matrix
    }

    pub fn neutral(&self) -> &NeutralStrategy {
        &self.neutral
    }

    pub fn willingness(&self) -> f32 {
        self.willingness
    }

    pub fn current_decay(&self) -> f32 {
        self.current_decay
    }

    pub fn submission(&self) -> &RoundSubmission {
        &self.current
    }

    pub fn opp_cards(&self) -> Option<&[Card]> {
        self.current.opp_cards.as_deref()
    }

    pub fn player_cards(&self) -> &[Option<Card>] {
        &self.current.player_cards
    }

    pub fn match_array(&self) -> Option<&[Outcome]> {
        self.current.outcomes.as_deref()
    }

    /// Past rounds, most recent first.
    pub fn history(&self) -> &[RoundSubmission] {
        &self.history
    }

    pub fn last_round_neutrals(&self) -> &[bool] {
        &self.last_round_neutrals
    }

    pub fn try_initialize_willingness(&mut self, value: f32) -> Result<(), RoundError> {
        if !(WILLINGNESS_MIN..=WILLINGNESS_MAX).contains(&value) {
            return Err(RoundError::WillingnessOutOfRange(value));
        }
        self.willingness = value;
        self.current_decay = self.settings.decay_per_second;
        Ok(())
    }

    /// Seeds willingness for a new negotiation. Out-of-range values are
    /// logged and leave the previous value in place.
    pub fn initialize_willingness(&mut self, value: f32) {
        if let Err(err) = self.try_initialize_willingness(value) {
            log::error!("initialize willingness failed: {err}");
        }
    }

    pub fn decay_willingness(&mut self, dt: f32) {
        self.current_decay += self.settings.decay_acceleration * dt;
        self.willingness = (self.willingness - self.current_decay * dt)
            .clamp(WILLINGNESS_MIN, WILLINGNESS_MAX);
    }

    pub fn nudge_willingness(&mut self, delta: f32) {
        self.willingness = (self.willingness + delta).clamp(WILLINGNESS_MIN, WILLINGNESS_MAX);
    }

    pub fn set_opp_cards(&mut self, cards: Option<Vec<Card>>, events: &mut EventBus) {
        if !self.accept_length("opponent cards", cards.as_ref().map(Vec::len)) {
            return;
        }
        self.current.opp_cards = cards.clone();
        events.push(Event::OppCardsSet(cards));
    }

    pub fn try_set_player_card(
        &mut self,
        card: Option<Card>,
        index: usize,
        events: &mut EventBus,
    ) -> Result<bool, RoundError> {
        let slots = self.current.player_cards.len();
        if index >= slots {
            return Err(RoundError::SlotOutOfRange { index, slots });
        }
        let was_complete = self.current.player_complete();
        self.current.player_cards[index] = card;
        events.push(Event::PlayerCardsSet(self.current.player_cards.clone()));
        let completed = !was_complete && self.current.player_complete();
        if completed {
            events.push(Event::PlayerAllCardsSet);
        }
        Ok(completed)
    }

    /// Fills (or empties, with `None`) one player slot. Returns true when this
    /// call completed the set, which is also when `PlayerAllCardsSet` fires.
    pub fn set_player_card(
        &mut self,
        card: Option<Card>,
        index: usize,
        events: &mut EventBus,
    ) -> bool {
        match self.try_set_player_card(card, index, events) {
            Ok(completed) => completed,
            Err(err) => {
                log::error!("set player card failed: {err}");
                false
            }
        }
    }

    pub fn clear_player_cards(&mut self, events: &mut EventBus) {
        self.current.player_cards = vec![None; self.settings.cards_to_play];
        events.push(Event::PlayerCardsSet(self.current.player_cards.clone()));
    }

    pub fn set_match_array(&mut self, outcomes: Option<Vec<Outcome>>, events: &mut EventBus) {
        if !self.accept_length("outcomes", outcomes.as_ref().map(Vec::len)) {
            return;
        }
        self.current.outcomes = outcomes.clone();
        events.push(Event::MatchArraySet(outcomes));
    }

    pub fn reset_neutrals(&mut self) {
        self.last_round_neutrals = vec![false; self.settings.cards_to_play];
    }

    pub fn set_neutral(&mut self, slot: usize) {
        match self.last_round_neutrals.get_mut(slot) {
            Some(flag) => *flag = true,
            None => log::error!(
                "set neutral failed: {}",
                RoundError::SlotOutOfRange {
                    index: slot,
                    slots: self.last_round_neutrals.len()
                }
            ),
        }
    }

    pub fn was_neutral(&self, slot: usize) -> bool {
        self.last_round_neutrals.get(slot).copied().unwrap_or(false)
    }

    /// Pairs the current submissions through the response matrix. Missing or
    /// incomplete player cards score every slot Negative.
    pub fn score_submission(&self) -> RoundScore {
        let slots = self.settings.cards_to_play;
        let outcomes = match self.current.opp_cards.as_deref() {
            None => {
                log::error!("scoring a round with no opponent cards, treating it as neutral");
                vec![Outcome::Neutral; slots]
            }
            Some(_) if !self.current.player_complete() => vec![Outcome::Negative; slots],
            Some(opp) => opp
                .iter()
                .zip(&self.current.player_cards)
                .map(|(opp, player)| match player {
                    Some(player) => self.matrix.get_match(opp, player),
                    None => Outcome::Negative,
                })
                .collect(),
        };
        let delta: f32 = outcomes.iter().map(|o| self.settings.delta_for(*o)).sum();
        RoundScore { outcomes, delta }
    }

    /// Pushes the current submissions onto the history, dropping the oldest
    /// rounds past capacity.
    pub fn log_round(&mut self) {
        self.history.insert(0, self.current.clone());
        self.history.truncate(self.settings.history_len);
    }

    /// Resets everything for a fresh negotiation: starting willingness, empty
    /// submissions, no history and no neutral slots.
    pub fn begin(&mut self, events: &mut EventBus) {
        self.initialize_willingness(self.settings.starting_willingness);
        self.history.clear();
        self.reset_neutrals();
        self.set_opp_cards(None, events);
        self.clear_player_cards(events);
        self.set_match_array(None, events);
    }

    pub fn trigger_win(&self, events: &mut EventBus) {
        log::info!("negotiation won at willingness {:.1}", self.willingness);
        events.push(Event::Won);
    }

    pub fn trigger_lose(&self, events: &mut EventBus) {
        log::info!("negotiation lost");
        events.push(Event::Lost);
    }

    fn accept_length(&self, what: &'static str, len: Option<usize>) -> bool {
        let expected = self.settings.cards_to_play;
        match len {
            Some(got) if got != expected => {
                let err = RoundError::WrongLength {
                    what,
                    expected,
                    got,
                };
                log::error!("{err}");
                self.settings.submission == SubmissionPolicy::Lenient
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cards_from_ids, MatrixRule, ParticipantRule, ResponseEntry};

    fn config() -> BarterConfig {
        let tones = cards_from_ids(["a", "b", "c", "x"]);
        BarterConfig::new(
            MatrixRule {
                id: "m".to_string(),
                opp_cards: tones.clone(),
                entries: vec![
                    ResponseEntry::new("a", "a", Outcome::Positive),
                    ResponseEntry::new("c", "c", Outcome::Positive),
                    ResponseEntry::new("b", "b", Outcome::Negative),
                ],
                default_outcome: Outcome::Neutral,
            },
            ParticipantRule::new(tones.clone()),
            ParticipantRule::new(tones),
        )
    }

    fn round() -> RoundState {
        let mut round = RoundState::from_config(&config());
        round.matrix_mut().initialize();
        round
    }

    fn count(events: &mut EventBus, wanted: &Event) -> usize {
        events.drain().filter(|event| event == wanted).count()
    }

    #[test]
    fn initialize_rejects_out_of_range() {
        let mut round = round();
        round.initialize_willingness(80.0);
        round.initialize_willingness(101.0);
        round.initialize_willingness(-1.0);
        assert_eq!(round.willingness(), 80.0);
        assert_eq!(
            round.try_initialize_willingness(150.0),
            Err(RoundError::WillingnessOutOfRange(150.0))
        );
    }

    #[test]
    fn nudge_clamps() {
        let mut round = round();
        round.initialize_willingness(98.0);
        round.nudge_willingness(10.0);
        assert_eq!(round.willingness(), 100.0);
        round.initialize_willingness(3.0);
        round.nudge_willingness(-10.0);
        assert_eq!(round.willingness(), 0.0);
    }

    #[test]
    fn decay_accelerates_and_floors_at_zero() {
        let mut config = config();
        config.willingness.decay_per_second = 1.0;
        config.willingness.decay_acceleration = 1.0;
        let mut round = RoundState::from_config(&config);
        round.initialize_willingness(10.0);
        round.decay_willingness(1.0);
        assert_eq!(round.current_decay(), 2.0);
        assert_eq!(round.willingness(), 8.0);
        round.decay_willingness(10.0);
        assert_eq!(round.willingness(), 0.0);
    }

    #[test]
    fn negative_decay_is_capped_at_max() {
        let mut config = config();
        config.willingness.starting = 95.0;
        config.willingness.decay_per_second = -10.0;
        let mut round = RoundState::from_config(&config);
        round.initialize_willingness(95.0);
        round.decay_willingness(0.9);
        assert_eq!(round.willingness(), WILLINGNESS_MAX);
        round.decay_willingness(5.0);
        assert_eq!(round.willingness(), WILLINGNESS_MAX);
    }

    #[test]
    fn all_cards_set_fires_once_per_fill() {
        let mut round = round();
        let mut events = EventBus::default();
        assert!(!round.set_player_card(Some(Card::new("a")), 0, &mut events));
        assert!(!round.set_player_card(Some(Card::new("b")), 1, &mut events));
        assert_eq!(count(&mut events, &Event::PlayerAllCardsSet), 0);
        assert!(round.set_player_card(Some(Card::new("c")), 2, &mut events));
        assert_eq!(count(&mut events, &Event::PlayerAllCardsSet), 1);
        // Swapping a card in a full set is not a new fill.
        assert!(!round.set_player_card(Some(Card::new("x")), 2, &mut events));
        assert_eq!(count(&mut events, &Event::PlayerAllCardsSet), 0);
        round.set_player_card(None, 1, &mut events);
        assert!(round.set_player_card(Some(Card::new("b")), 1, &mut events));
        assert_eq!(count(&mut events, &Event::PlayerAllCardsSet), 1);
    }

    #[test]
    fn player_slot_out_of_range_is_ignored() {
        let mut round = round();
        let mut events = EventBus::default();
        assert_eq!(
            round.try_set_player_card(Some(Card::new("a")), 3, &mut events),
            Err(RoundError::SlotOutOfRange { index: 3, slots: 3 })
        );
        assert!(!round.set_player_card(Some(Card::new("a")), 7, &mut events));
        assert!(events.is_empty());
        assert!(round.player_cards().iter().all(Option::is_none));
    }

    #[test]
    fn lenient_policy_stores_wrong_length() {
        let mut round = round();
        let mut events = EventBus::default();
        round.set_opp_cards(Some(cards_from_ids(["a", "b"])), &mut events);
        assert_eq!(round.opp_cards().map(<[Card]>::len), Some(2));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn strict_policy_keeps_previous_value() {
        let mut config = config();
        config.submission = SubmissionPolicy::Strict;
        let mut round = RoundState::from_config(&config);
        let mut events = EventBus::default();
        round.set_opp_cards(Some(cards_from_ids(["a", "b", "c"])), &mut events);
        round.set_opp_cards(Some(cards_from_ids(["a"])), &mut events);
        round.set_match_array(Some(vec![Outcome::Positive]), &mut events);
        assert_eq!(round.opp_cards().map(<[Card]>::len), Some(3));
        assert_eq!(round.match_array(), None);
        assert_eq!(events.len(), 1);
        round.set_opp_cards(None, &mut events);
        assert_eq!(round.opp_cards(), None);
    }

    #[test]
    fn scores_pairs_through_the_matrix() {
        let mut round = round();
        let mut events = EventBus::default();
        round.set_opp_cards(Some(cards_from_ids(["a", "b", "c"])), &mut events);
        for (slot, id) in ["a", "x", "c"].into_iter().enumerate() {
            round.set_player_card(Some(Card::new(id)), slot, &mut events);
        }
        let score = round.score_submission();
        assert_eq!(
            score.outcomes,
            vec![Outcome::Positive, Outcome::Neutral, Outcome::Positive]
        );
        assert_eq!(score.delta, 10.0);
    }

    #[test]
    fn incomplete_submission_is_all_negative() {
        let mut round = round();
        let mut events = EventBus::default();
        round.set_opp_cards(Some(cards_from_ids(["a", "b", "c"])), &mut events);
        round.set_player_card(Some(Card::new("a")), 0, &mut events);
        let score = round.score_submission();
        assert_eq!(score.outcomes, vec![Outcome::Negative; 3]);
        assert_eq!(score.delta, -15.0);
    }

    #[test]
    fn history_is_bounded_and_newest_first() {
        let mut round = round();
        let mut events = EventBus::default();
        for id in ["a", "b", "c", "x"] {
            round.set_opp_cards(Some(cards_from_ids([id, id, id])), &mut events);
            round.log_round();
        }
        let firsts: Vec<&str> = round
            .history()
            .iter()
            .filter_map(|past| past.card_at(RepeatTarget::Opponent, 0))
            .map(Card::id)
            .collect();
        assert_eq!(firsts, vec!["x", "c", "b"]);
    }

    #[test]
    fn neutral_flags_reset_and_set() {
        let mut round = round();
        round.set_neutral(1);
        round.set_neutral(9);
        assert_eq!(round.last_round_neutrals(), &[false, true, false]);
        round.reset_neutrals();
        assert!(!round.was_neutral(1));
    }

    #[test]
    fn begin_starts_from_a_clean_table() {
        let mut round = round();
        let mut events = EventBus::default();
        round.set_opp_cards(Some(cards_from_ids(["a", "b", "c"])), &mut events);
        round.set_player_card(Some(Card::new("a")), 0, &mut events);
        round.log_round();
        round.set_neutral(2);
        round.nudge_willingness(30.0);

        round.begin(&mut events);
        assert_eq!(round.willingness(), 50.0);
        assert!(round.history().is_empty());
        assert!(!round.was_neutral(2));
        assert_eq!(round.opp_cards(), None);
        assert_eq!(round.match_array(), None);
        assert!(round.player_cards().iter().all(Option::is_none));
    }
}
