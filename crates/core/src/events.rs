use crate::{Card, Outcome, Participant, PileKind, TurnState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddedCard {
    pub card: Card,
    pub to_back: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemovedCard {
    pub card: Card,
    pub former_index: usize,
}

/// Cards that entered or left a hand during one pile operation.
///
/// A delta with no added and no removed cards marks a reorder of the hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandDelta {
    pub added: Vec<AddedCard>,
    pub add_source: PileKind,
    pub removed: Vec<RemovedCard>,
    pub removed_destination: PileKind,
}

impl HandDelta {
    pub fn new(add_source: PileKind, removed_destination: PileKind) -> Self {
        Self {
            added: Vec::new(),
            add_source,
            removed: Vec::new(),
            removed_destination,
        }
    }

    pub fn reorder() -> Self {
        Self::new(PileKind::Hand, PileKind::Hand)
    }

    pub fn is_reorder(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    HandUpdated {
        participant: Participant,
        delta: HandDelta,
    },
    Drew {
        participant: Participant,
        count: usize,
    },
    Shuffled { participant: Participant },
    OppCardsSet(Option<Vec<Card>>),
    PlayerCardsSet(Vec<Option<Card>>),
    PlayerAllCardsSet,
    MatchArraySet(Option<Vec<Outcome>>),
    StateChanged {
        from: Option<TurnState>,
        to: TurnState,
    },
    Won,
    Lost,
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn pending(&self) -> &[Event] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
