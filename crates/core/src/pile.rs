use crate::{
    AddedCard, Card, Event, EventBus, HandDelta, Participant, ParticipantRule, PileKind,
    RemovedCard, RngState,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PileError {
    #[error("index {index} is outside the {} pile (len {len})", .pile.label())]
    OutOfRange {
        pile: PileKind,
        index: usize,
        len: usize,
    },
    #[error("card is already in the hand")]
    AlreadyInHand,
}

/// Draw, hand and discard piles for one side of the table.
///
/// Every operation that touches the hand reports it as a single
/// [`HandDelta`] on the event bus.
#[derive(Debug, Clone)]
pub struct CardPileManager {
    participant: Participant,
    starting_deck: Vec<Card>,
    base_draw_size: usize,
    draw: Vec<Card>,
    hand: Vec<Card>,
    discard: Vec<Card>,
}

impl CardPileManager {
    pub fn new(participant: Participant, rule: &ParticipantRule) -> Self {
        Self {
            participant,
            starting_deck: rule.starting_deck.clone(),
            base_draw_size: rule.base_draw_size,
            draw: Vec::new(),
            hand: Vec::new(),
            discard: Vec::new(),
        }
    }

    /// Builds a manager with explicit pile contents, top of each pile last.
    pub fn from_piles(
        participant: Participant,
        base_draw_size: usize,
        draw: Vec<Card>,
        hand: Vec<Card>,
        discard: Vec<Card>,
    ) -> Self {
        let mut starting_deck = draw.clone();
        starting_deck.extend(hand.iter().cloned());
        starting_deck.extend(discard.iter().cloned());
        Self {
            participant,
            starting_deck,
            base_draw_size,
            draw,
            hand,
            discard,
        }
    }

    pub fn participant(&self) -> Participant {
        self.participant
    }

    pub fn base_draw_size(&self) -> usize {
        self.base_draw_size
    }

    pub fn pile(&self, kind: PileKind) -> &[Card] {
        match kind {
            PileKind::Draw => &self.draw,
            PileKind::Hand => &self.hand,
            PileKind::Discard => &self.discard,
        }
    }

    pub fn draw_pile(&self) -> &[Card] {
        &self.draw
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard
    }

    pub fn total_cards(&self) -> usize {
        self.draw.len() + self.hand.len() + self.discard.len()
    }

    /// Empties every pile and refills the draw pile with fresh copies of the
    /// starting deck.
    pub fn initialize(&mut self) {
        self.hand.clear();
        self.discard.clear();
        self.draw = self.starting_deck.clone();
        log::debug!(
            "{} piles initialized with {} cards",
            self.participant.label(),
            self.draw.len()
        );
    }

    pub fn shuffle(&mut self, kind: PileKind, rng: &mut RngState, events: &mut EventBus) {
        rng.shuffle(self.pile_mut(kind));
        if kind == PileKind::Hand {
            self.announce(events, HandDelta::reorder());
        }
    }

    /// Shuffles the discard pile and appends it to the back of the draw pile.
    /// Cards already in the draw pile keep their order.
    pub fn shuffle_discard_into_draw(&mut self, rng: &mut RngState, events: &mut EventBus) {
        rng.shuffle(&mut self.discard);
        let recycled = self.discard.len();
        self.draw.append(&mut self.discard);
        log::debug!(
            "{} recycled {recycled} discards into draw ({} total)",
            self.participant.label(),
            self.draw.len()
        );
        events.push(Event::Shuffled {
            participant: self.participant,
        });
    }

    /// Moves up to `n` cards from the top of the draw pile to the back of the
    /// hand, recycling the discard pile first when the draw pile is short.
    /// Returns how many cards were actually drawn.
    pub fn draw(&mut self, n: usize, rng: &mut RngState, events: &mut EventBus) -> usize {
        if self.draw.len() < n && !self.discard.is_empty() {
            self.shuffle_discard_into_draw(rng, events);
        }
        let count = n.min(self.draw.len());
        if count < n {
            log::debug!(
                "{} drew {count} of {n} requested cards",
                self.participant.label()
            );
        }
        if count == 0 {
            return 0;
        }
        let mut delta = HandDelta::new(PileKind::Draw, PileKind::Hand);
        for _ in 0..count {
            let Some(card) = self.draw.pop() else {
                break;
            };
            self.hand.push(card.clone());
            delta.added.push(AddedCard {
                card,
                to_back: true,
            });
        }
        self.announce(events, delta);
        events.push(Event::Drew {
            participant: self.participant,
            count,
        });
        count
    }

    pub fn draw_hand(&mut self, rng: &mut RngState, events: &mut EventBus) -> usize {
        self.draw(self.base_draw_size, rng, events)
    }

    pub fn try_discard(&mut self, index: usize, events: &mut EventBus) -> Result<Card, PileError> {
        if index >= self.hand.len() {
            return Err(PileError::OutOfRange {
                pile: PileKind::Hand,
                index,
                len: self.hand.len(),
            });
        }
        let card = self.hand.remove(index);
        self.discard.insert(0, card.clone());
        let mut delta = HandDelta::new(PileKind::Hand, PileKind::Discard);
        delta.removed.push(RemovedCard {
            card: card.clone(),
            former_index: index,
        });
        self.announce(events, delta);
        Ok(card)
    }

    /// Moves the hand card at `index` to the front of the discard pile.
    /// A bad index is logged and ignored.
    pub fn discard(&mut self, index: usize, events: &mut EventBus) {
        if let Err(err) = self.try_discard(index, events) {
            log::error!("{} discard failed: {err}", self.participant.label());
        }
    }

    pub fn discard_hand(&mut self, events: &mut EventBus) {
        if self.hand.is_empty() {
            return;
        }
        let mut delta = HandDelta::new(PileKind::Hand, PileKind::Discard);
        // Back to front so the remaining indices stay valid.
        for index in (0..self.hand.len()).rev() {
            let card = self.hand.remove(index);
            self.discard.insert(0, card.clone());
            delta.removed.push(RemovedCard {
                card,
                former_index: index,
            });
        }
        self.announce(events, delta);
    }

    pub fn search(&self, kind: PileKind, card: &Card) -> Option<usize> {
        self.pile(kind).iter().position(|candidate| candidate == card)
    }

    /// Pulls one card out of the draw or discard pile onto the back of the
    /// hand, returning its new hand index.
    pub fn try_move_to_hand(
        &mut self,
        kind: PileKind,
        index: usize,
        events: &mut EventBus,
    ) -> Result<usize, PileError> {
        if kind == PileKind::Hand {
            return Err(PileError::AlreadyInHand);
        }
        let source = self.pile_mut(kind);
        if index >= source.len() {
            return Err(PileError::OutOfRange {
                pile: kind,
                index,
                len: source.len(),
            });
        }
        let card = source.remove(index);
        self.hand.push(card.clone());
        let mut delta = HandDelta::new(kind, PileKind::Hand);
        delta.added.push(AddedCard {
            card,
            to_back: true,
        });
        self.announce(events, delta);
        Ok(self.hand.len() - 1)
    }

    pub fn move_to_hand(
        &mut self,
        kind: PileKind,
        index: usize,
        events: &mut EventBus,
    ) -> Option<usize> {
        match self.try_move_to_hand(kind, index, events) {
            Ok(hand_index) => Some(hand_index),
            Err(err) => {
                log::error!("{} move to hand failed: {err}", self.participant.label());
                None
            }
        }
    }

    fn pile_mut(&mut self, kind: PileKind) -> &mut Vec<Card> {
        match kind {
            PileKind::Draw => &mut self.draw,
            PileKind::Hand => &mut self.hand,
            PileKind::Discard => &mut self.discard,
        }
    }

    fn announce(&self, events: &mut EventBus, delta: HandDelta) {
        events.push(Event::HandUpdated {
            participant: self.participant,
            delta,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards_from_ids;

    fn hand_deltas(events: &mut EventBus) -> Vec<HandDelta> {
        events
            .drain()
            .filter_map(|event| match event {
                Event::HandUpdated { delta, .. } => Some(delta),
                _ => None,
            })
            .collect()
    }

    fn manager(ids: &[&str]) -> CardPileManager {
        let rule = ParticipantRule::new(cards_from_ids(ids.iter().copied()));
        let mut piles = CardPileManager::new(Participant::Player, &rule);
        piles.initialize();
        piles
    }

    #[test]
    fn initialize_resets_every_pile() {
        let mut rng = RngState::from_seed(3);
        let mut events = EventBus::default();
        let mut piles = manager(&["a", "b", "c", "d"]);
        piles.draw(2, &mut rng, &mut events);
        piles.discard(0, &mut events);
        piles.initialize();
        assert_eq!(piles.draw_pile().len(), 4);
        assert!(piles.hand().is_empty());
        assert!(piles.discard_pile().is_empty());
    }

    #[test]
    fn draw_takes_from_the_top() {
        let mut rng = RngState::from_seed(3);
        let mut events = EventBus::default();
        let mut piles = manager(&["a", "b", "c", "d"]);
        assert_eq!(piles.draw(2, &mut rng, &mut events), 2);
        assert_eq!(piles.hand(), cards_from_ids(["d", "c"]).as_slice());
        let deltas = hand_deltas(&mut events);
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].added.len(), 2);
        assert_eq!(deltas[0].add_source, PileKind::Draw);
        assert!(deltas[0].added.iter().all(|added| added.to_back));
    }

    #[test]
    fn draw_from_empty_piles_is_quiet() {
        let mut rng = RngState::from_seed(3);
        let mut events = EventBus::default();
        let mut piles = manager(&[]);
        assert_eq!(piles.draw(3, &mut rng, &mut events), 0);
        assert!(hand_deltas(&mut events).is_empty());
    }

    #[test]
    fn short_draw_with_no_discards_skips_the_recycle() {
        let mut rng = RngState::from_seed(3);
        let mut events = EventBus::default();
        let mut piles = manager(&["a"]);
        assert_eq!(piles.draw(3, &mut rng, &mut events), 1);
        assert!(!events
            .drain()
            .any(|event| matches!(event, Event::Shuffled { .. })));
    }

    #[test]
    fn discard_goes_to_front_of_discard() {
        let mut rng = RngState::from_seed(3);
        let mut events = EventBus::default();
        let mut piles = manager(&["a", "b", "c"]);
        piles.draw(3, &mut rng, &mut events);
        events.drain().for_each(drop);
        piles.discard(0, &mut events);
        piles.discard(0, &mut events);
        assert_eq!(piles.discard_pile(), cards_from_ids(["b", "c"]).as_slice());
        let deltas = hand_deltas(&mut events);
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].removed[0].former_index, 0);
        assert_eq!(deltas[0].removed_destination, PileKind::Discard);
    }

    #[test]
    fn discard_out_of_range_is_a_no_op() {
        let mut rng = RngState::from_seed(3);
        let mut events = EventBus::default();
        let mut piles = manager(&["a", "b"]);
        piles.draw(1, &mut rng, &mut events);
        events.drain().for_each(drop);
        assert_eq!(
            piles.try_discard(1, &mut events),
            Err(PileError::OutOfRange {
                pile: PileKind::Hand,
                index: 1,
                len: 1
            })
        );
        piles.discard(5, &mut events);
        assert_eq!(piles.hand().len(), 1);
        assert!(events.is_empty());
    }

    #[test]
    fn discard_hand_emits_one_delta() {
        let mut rng = RngState::from_seed(3);
        let mut events = EventBus::default();
        let mut piles = manager(&["a", "b", "c"]);
        piles.draw(3, &mut rng, &mut events);
        let hand = piles.hand().to_vec();
        events.drain().for_each(drop);
        piles.discard_hand(&mut events);
        assert!(piles.hand().is_empty());
        assert_eq!(piles.discard_pile(), hand.as_slice());
        let deltas = hand_deltas(&mut events);
        assert_eq!(deltas.len(), 1);
        let indices: Vec<usize> = deltas[0].removed.iter().map(|r| r.former_index).collect();
        assert_eq!(indices, vec![2, 1, 0]);
    }

    #[test]
    fn hand_shuffle_reports_reorder() {
        let mut rng = RngState::from_seed(9);
        let mut events = EventBus::default();
        let mut piles = manager(&["a", "b", "c"]);
        piles.draw(3, &mut rng, &mut events);
        events.drain().for_each(drop);
        piles.shuffle(PileKind::Hand, &mut rng, &mut events);
        let deltas = hand_deltas(&mut events);
        assert_eq!(deltas.len(), 1);
        assert!(deltas[0].is_reorder());
        piles.shuffle(PileKind::Draw, &mut rng, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn recycle_keeps_existing_draw_order() {
        let mut rng = RngState::from_seed(11);
        let mut events = EventBus::default();
        let mut piles = CardPileManager::from_piles(
            Participant::Opponent,
            3,
            cards_from_ids(["x", "y"]),
            Vec::new(),
            cards_from_ids(["a", "b", "c", "d"]),
        );
        piles.shuffle_discard_into_draw(&mut rng, &mut events);
        assert_eq!(&piles.draw_pile()[..2], cards_from_ids(["x", "y"]).as_slice());
        assert_eq!(piles.draw_pile().len(), 6);
        assert!(piles.discard_pile().is_empty());
        assert_eq!(
            events.drain().collect::<Vec<_>>(),
            vec![Event::Shuffled {
                participant: Participant::Opponent
            }]
        );
    }

    #[test]
    fn search_then_move_to_hand() {
        let mut events = EventBus::default();
        let mut piles = CardPileManager::from_piles(
            Participant::Opponent,
            3,
            cards_from_ids(["a", "b"]),
            cards_from_ids(["c"]),
            cards_from_ids(["d"]),
        );
        let card = Card::new("d");
        assert_eq!(piles.search(PileKind::Hand, &card), None);
        let index = piles.search(PileKind::Discard, &card).expect("in discard");
        assert_eq!(piles.move_to_hand(PileKind::Discard, index, &mut events), Some(1));
        assert_eq!(piles.hand(), cards_from_ids(["c", "d"]).as_slice());
        assert_eq!(
            piles.try_move_to_hand(PileKind::Hand, 0, &mut events),
            Err(PileError::AlreadyInHand)
        );
        assert_eq!(piles.move_to_hand(PileKind::Draw, 7, &mut events), None);
        assert_eq!(piles.total_cards(), 4);
    }
}
