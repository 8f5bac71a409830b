use crate::{
    ActionRecord, AutoAction, AutoplayConfig, AutoplayError, AutoplayResult, RoundRecord,
    RunStatus,
};
use barter_core::{
    BarterConfig, Card, Event, NegotiationOutcome, RngState, TurnState, TurnStateMachine,
};

/// Mixed into the run seed so the player's choices don't mirror the table's
/// shuffles.
const POLICY_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Runs a negotiation headless: ticks the machine at a fixed rate and plays
/// the player's turns with a scripted policy.
#[derive(Debug)]
pub struct Simulator {
    pub machine: TurnStateMachine,
    config: AutoplayConfig,
    rng: RngState,
    ticks: u32,
    think_elapsed: f32,
    rounds: Vec<RoundRecord>,
    actions: Vec<ActionRecord>,
    events: Vec<Event>,
}

impl Simulator {
    pub fn new(machine: TurnStateMachine, config: AutoplayConfig) -> Result<Self, AutoplayError> {
        config.validate()?;
        Ok(Self {
            machine,
            rng: RngState::from_seed(config.seed ^ POLICY_SEED_SALT),
            config,
            ticks: 0,
            think_elapsed: 0.0,
            rounds: Vec::new(),
            actions: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Validates `barter` and builds a machine seeded from `config.seed`.
    pub fn from_config(barter: &BarterConfig, config: AutoplayConfig) -> Result<Self, AutoplayError> {
        barter.validate()?;
        let machine = TurnStateMachine::from_config(barter, config.seed);
        Self::new(machine, config)
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }

    pub fn status(&self) -> Option<RunStatus> {
        match self.machine.outcome()? {
            NegotiationOutcome::Won => Some(RunStatus::Won),
            NegotiationOutcome::Lost => Some(RunStatus::Lost),
        }
    }

    pub fn apply_action(&mut self, action: &AutoAction) -> Result<(), AutoplayError> {
        let state = self.machine.state_name().to_string();
        let mut card = None;
        match action {
            AutoAction::Start => self.machine.start(),
            AutoAction::PlayCard { hand_index, slot } => {
                card = self.machine.player().hand().get(*hand_index).map(Card::to_string);
                if !self.machine.play_from_hand(*hand_index, *slot) {
                    return Err(AutoplayError::InvalidAction(format!(
                        "{} rejected during {state}",
                        action.short_label()
                    )));
                }
            }
            AutoAction::AcknowledgeInfo => {
                if self.machine.state() != Some(TurnState::Info) {
                    return Err(AutoplayError::InvalidAction(format!(
                        "nothing to acknowledge during {state}"
                    )));
                }
                self.machine.acknowledge_info();
            }
        }
        self.actions.push(ActionRecord {
            tick: self.ticks,
            state,
            action: action.clone(),
            card,
        });
        self.collect();
        Ok(())
    }

    /// Acts for the player if it is due, then advances time by one tick.
    pub fn step(&mut self) -> Result<(), AutoplayError> {
        if self.machine.state().is_none() {
            self.apply_action(&AutoAction::Start)?;
        }
        match self.machine.state() {
            Some(TurnState::PlayerTurn) => {
                if self.think_elapsed >= self.config.think_seconds {
                    self.think_elapsed = 0.0;
                    let plays = self.config.policy.choose(&self.machine, &mut self.rng);
                    for action in plays {
                        if self.machine.state() != Some(TurnState::PlayerTurn) {
                            break;
                        }
                        self.apply_action(&action)?;
                    }
                } else {
                    self.think_elapsed += self.config.tick_seconds;
                }
            }
            Some(TurnState::Info) if self.config.acknowledge_info => {
                self.apply_action(&AutoAction::AcknowledgeInfo)?;
            }
            _ => {}
        }
        if !self.machine.is_finished() {
            self.machine.tick(self.config.tick_seconds);
            self.ticks += 1;
            self.collect();
        }
        Ok(())
    }

    pub fn run(mut self) -> Result<AutoplayResult, AutoplayError> {
        while !self.machine.is_finished() && self.ticks < self.config.max_ticks {
            self.step()?;
        }
        let status = self.status().unwrap_or(RunStatus::MaxTicks);
        log::info!(
            "autoplay finished: {status:?} after {} ticks and {} rounds",
            self.ticks,
            self.rounds.len()
        );
        Ok(AutoplayResult {
            status,
            seed: self.config.seed,
            policy: self.config.policy.label().to_string(),
            ticks: self.ticks,
            simulated_seconds: self.ticks as f32 * self.config.tick_seconds,
            final_willingness: self.machine.willingness(),
            rounds: self.rounds,
            actions: self.actions,
            events: self.events,
        })
    }

    /// Drains the machine's events and records every scored round.
    fn collect(&mut self) {
        for event in self.machine.drain_events() {
            if let Event::MatchArraySet(Some(outcomes)) = &event {
                let submission = self.machine.round().submission();
                self.rounds.push(RoundRecord {
                    round: self.rounds.len() as u32 + 1,
                    tick: self.ticks,
                    opp_cards: submission
                        .opp_cards
                        .iter()
                        .flatten()
                        .map(Card::to_string)
                        .collect(),
                    player_cards: submission
                        .player_cards
                        .iter()
                        .map(|card| card.as_ref().map_or("-".to_string(), Card::to_string))
                        .collect(),
                    outcomes: outcomes.iter().map(|outcome| outcome.symbol()).collect(),
                    willingness_after: self.machine.willingness(),
                });
            }
            self.events.push(event);
        }
    }
}
