use crate::AutoAction;
use barter_core::{Outcome, RngState, TurnStateMachine};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the scripted player fills its slots.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerPolicy {
    /// Distinct hand cards in random order.
    Random,
    /// Reads the opponent's matrix and answers each slot with its best hand card.
    #[default]
    Greedy,
}

impl PlayerPolicy {
    pub fn label(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Greedy => "greedy",
        }
    }

    /// One `PlayCard` per slot. Hand cards are reused only when the hand is
    /// smaller than the number of slots.
    pub fn choose(self, machine: &TurnStateMachine, rng: &mut RngState) -> Vec<AutoAction> {
        let slots = machine.round().cards_to_play();
        let held = machine.player().hand().len();
        if held == 0 {
            return Vec::new();
        }
        let picks = match self {
            Self::Random => random_indices(held, slots, rng),
            Self::Greedy => greedy_indices(machine, slots, rng),
        };
        picks
            .into_iter()
            .enumerate()
            .map(|(slot, hand_index)| AutoAction::PlayCard { hand_index, slot })
            .collect()
    }
}

impl FromStr for PlayerPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "random" => Ok(Self::Random),
            "greedy" => Ok(Self::Greedy),
            other => Err(format!("unknown policy {other:?} (expected random or greedy)")),
        }
    }
}

pub fn outcome_value(outcome: Outcome) -> i32 {
    match outcome {
        Outcome::Positive => 1,
        Outcome::Neutral => 0,
        Outcome::Negative => -1,
    }
}

fn random_indices(held: usize, slots: usize, rng: &mut RngState) -> Vec<usize> {
    let mut order: Vec<usize> = (0..held).collect();
    rng.shuffle(&mut order);
    (0..slots).map(|slot| order[slot % held]).collect()
}

fn greedy_indices(machine: &TurnStateMachine, slots: usize, rng: &mut RngState) -> Vec<usize> {
    let Some(opp_cards) = machine.round().opp_cards() else {
        return random_indices(machine.player().hand().len(), slots, rng);
    };
    let hand = machine.player().hand();
    let matrix = machine.round().matrix();
    let mut used = vec![false; hand.len()];
    let mut picks = Vec::with_capacity(slots);
    for slot in 0..slots {
        let best = opp_cards.get(slot).and_then(|opp| {
            (0..hand.len())
                .filter(|index| !used[*index] || used.iter().all(|taken| *taken))
                .max_by_key(|index| {
                    let value = matrix.lookup(opp, &hand[*index]).map_or(0, outcome_value);
                    // Prefer the leftmost card among equals.
                    (value, std::cmp::Reverse(*index))
                })
        });
        let index = best.unwrap_or(slot % hand.len());
        used[index] = true;
        picks.push(index);
    }
    picks
}
