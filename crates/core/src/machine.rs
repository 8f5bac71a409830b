use crate::{
    BarterConfig, Card, CardPileManager, Event, EventBus, Participant, RngState, RoundState,
};
use serde::{Deserialize, Serialize};

mod compute;
mod opponent;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TurnState {
    Init,
    OppTurn,
    PlayerTurn,
    Compute,
    Info,
    EndWin,
    EndLoss,
}

impl TurnState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::OppTurn => "Opponent Turn",
            Self::PlayerTurn => "Player Turn",
            Self::Compute => "Compute",
            Self::Info => "Info",
            Self::EndWin => "Win",
            Self::EndLoss => "Loss",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::EndWin | Self::EndLoss)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NegotiationOutcome {
    Won,
    Lost,
}

/// Accumulated time in a timed state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Timer {
    pub elapsed: f32,
    pub duration: f32,
}

impl Timer {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
        }
    }

    pub fn restart(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MachineSettings {
    pub opp_turn_seconds: f32,
    pub compute_seconds: f32,
    pub info_every_rounds: Option<u32>,
}

impl MachineSettings {
    pub fn from_config(config: &BarterConfig) -> Self {
        Self {
            opp_turn_seconds: config.timing.opp_turn_seconds,
            compute_seconds: config.timing.compute_seconds,
            info_every_rounds: config.timing.info_every_rounds,
        }
    }
}

/// Drives one negotiation: opponent turn, player turn, compute, repeat until
/// willingness reaches either bound.
///
/// Time only moves through [`TurnStateMachine::tick`]; the player acts through
/// [`TurnStateMachine::set_player_card`]. Everything observable is queued as
/// [`Event`]s for the presentation layer to drain.
#[derive(Debug)]
pub struct TurnStateMachine {
    settings: MachineSettings,
    round: RoundState,
    opponent: CardPileManager,
    player: CardPileManager,
    rng: RngState,
    events: EventBus,
    state: Option<TurnState>,
    opp_timer: Timer,
    compute_timer: Timer,
    rounds_played: u32,
}

impl TurnStateMachine {
    pub fn new(
        settings: MachineSettings,
        round: RoundState,
        opponent: CardPileManager,
        player: CardPileManager,
        rng: RngState,
    ) -> Self {
        Self {
            opp_timer: Timer::new(settings.opp_turn_seconds),
            compute_timer: Timer::new(settings.compute_seconds),
            settings,
            round,
            opponent,
            player,
            rng,
            events: EventBus::default(),
            state: None,
            rounds_played: 0,
        }
    }

    pub fn from_config(config: &BarterConfig, seed: u64) -> Self {
        Self::new(
            MachineSettings::from_config(config),
            RoundState::from_config(config),
            CardPileManager::new(Participant::Opponent, &config.opponent),
            CardPileManager::new(Participant::Player, &config.player),
            RngState::from_seed(seed),
        )
    }

    pub fn settings(&self) -> &MachineSettings {
        &self.settings
    }

    pub fn state(&self) -> Option<TurnState> {
        self.state
    }

    pub fn state_name(&self) -> &'static str {
        self.state.map_or("Not Started", TurnState::name)
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_some_and(TurnState::is_terminal)
    }

    pub fn outcome(&self) -> Option<NegotiationOutcome> {
        match self.state? {
            TurnState::EndWin => Some(NegotiationOutcome::Won),
            TurnState::EndLoss => Some(NegotiationOutcome::Lost),
            _ => None,
        }
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn willingness(&self) -> f32 {
        self.round.willingness()
    }

    pub fn opponent(&self) -> &CardPileManager {
        &self.opponent
    }

    pub fn player(&self) -> &CardPileManager {
        &self.player
    }

    pub fn piles(&self, participant: Participant) -> &CardPileManager {
        match participant {
            Participant::Opponent => &self.opponent,
            Participant::Player => &self.player,
        }
    }

    pub fn rng_seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn opp_timer(&self) -> Timer {
        self.opp_timer
    }

    pub fn compute_timer(&self) -> Timer {
        self.compute_timer
    }

    pub fn pending_events(&self) -> &[Event] {
        self.events.pending()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain().collect()
    }

    /// Enters Init. Calling it again starts a fresh negotiation.
    pub fn start(&mut self) {
        self.set_state(TurnState::Init);
    }

    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("ignoring tick with dt {dt}");
            return;
        }
        let Some(state) = self.state else {
            return;
        };
        match state {
            TurnState::OppTurn => {
                if self.decay_or_lose(dt) {
                    return;
                }
                if self.opp_timer.advance(dt) {
                    self.set_state(TurnState::PlayerTurn);
                }
            }
            TurnState::PlayerTurn => {
                self.decay_or_lose(dt);
            }
            TurnState::Compute => {
                if self.decay_or_lose(dt) {
                    return;
                }
                if self.compute_timer.advance(dt) {
                    let next = if self.info_due() {
                        TurnState::Info
                    } else {
                        TurnState::OppTurn
                    };
                    self.set_state(next);
                }
            }
            TurnState::Init | TurnState::Info | TurnState::EndWin | TurnState::EndLoss => {}
        }
    }

    /// Puts a card into a player slot. Only accepted during the player's turn;
    /// completing the set moves straight on to Compute. Returns whether the
    /// card was taken.
    pub fn set_player_card(&mut self, card: Option<Card>, slot: usize) -> bool {
        if self.state != Some(TurnState::PlayerTurn) {
            log::warn!(
                "player card for slot {slot} ignored during {}",
                self.state_name()
            );
            return false;
        }
        match self.round.try_set_player_card(card, slot, &mut self.events) {
            Ok(completed) => {
                if completed {
                    self.set_state(TurnState::Compute);
                }
                true
            }
            Err(err) => {
                log::error!("set player card failed: {err}");
                false
            }
        }
    }

    /// Puts the player's hand card at `hand_index` into `slot`.
    pub fn play_from_hand(&mut self, hand_index: usize, slot: usize) -> bool {
        let Some(card) = self.player.hand().get(hand_index).cloned() else {
            log::error!(
                "player hand has no card at {hand_index} (len {})",
                self.player.hand().len()
            );
            return false;
        };
        self.set_player_card(Some(card), slot)
    }

    /// Leaves the review state once the presentation layer is done with it.
    pub fn acknowledge_info(&mut self) {
        if self.state == Some(TurnState::Info) {
            self.set_state(TurnState::OppTurn);
        } else {
            log::warn!("acknowledge_info ignored during {}", self.state_name());
        }
    }

    fn set_state(&mut self, next: TurnState) {
        let mut pending = Some(next);
        while let Some(to) = pending.take() {
            let from = self.state;
            if let Some(old) = from {
                self.exit(old, to);
            }
            self.state = Some(to);
            log::debug!(
                "entered {} from {}",
                to.name(),
                from.map_or("nothing", TurnState::name)
            );
            pending = self.enter(to);
            self.events.push(Event::StateChanged { from, to });
        }
    }

    fn enter(&mut self, state: TurnState) -> Option<TurnState> {
        match state {
            TurnState::Init => {
                self.enter_init();
                Some(TurnState::OppTurn)
            }
            TurnState::OppTurn => {
                self.enter_opp_turn();
                None
            }
            TurnState::PlayerTurn => {
                let slots = self.round.cards_to_play();
                if self.player.hand().len() < slots {
                    log::error!(
                        "player must play {slots} cards but holds {}",
                        self.player.hand().len()
                    );
                }
                None
            }
            TurnState::Compute => self.enter_compute(),
            TurnState::Info => None,
            TurnState::EndWin => {
                self.round.trigger_win(&mut self.events);
                None
            }
            TurnState::EndLoss => {
                self.round.trigger_lose(&mut self.events);
                None
            }
        }
    }

    fn exit(&mut self, state: TurnState, to: TurnState) {
        if state == TurnState::Compute && !to.is_terminal() {
            self.reset_table();
        }
    }

    fn enter_init(&mut self) {
        self.round.matrix_mut().initialize();
        self.round.begin(&mut self.events);
        self.rounds_played = 0;
        for piles in [&mut self.opponent, &mut self.player] {
            piles.initialize();
            piles.shuffle(crate::PileKind::Draw, &mut self.rng, &mut self.events);
            piles.draw_hand(&mut self.rng, &mut self.events);
        }
    }

    /// Applies decay and reports whether it ended the negotiation.
    fn decay_or_lose(&mut self, dt: f32) -> bool {
        self.round.decay_willingness(dt);
        if self.round.willingness() <= 0.0 {
            self.set_state(TurnState::EndLoss);
            return true;
        }
        false
    }

    fn info_due(&self) -> bool {
        self.settings
            .info_every_rounds
            .is_some_and(|every| every > 0 && self.rounds_played % every == 0)
    }
}
