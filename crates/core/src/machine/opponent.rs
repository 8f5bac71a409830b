use super::*;
use crate::neutral::random_from_hand;
use crate::*;

impl TurnStateMachine {
    pub(super) fn enter_opp_turn(&mut self) {
        self.opp_timer.restart();
        let cards = self.choose_opp_cards();
        self.round.set_opp_cards(cards, &mut self.events);
    }

    /// Picks one opponent card per slot. Slots that went Neutral last round
    /// follow the neutral strategy; the rest are drawn at random from the hand
    /// with replacement.
    fn choose_opp_cards(&mut self) -> Option<Vec<Card>> {
        let slots = self.round.cards_to_play();
        let held = self.opponent.hand().len();
        if held < slots {
            log::warn!("opponent holds {held} cards for {slots} slots");
        }
        let mut chosen = Vec::with_capacity(slots);
        for slot in 0..slots {
            let pick = if self.round.was_neutral(slot) {
                self.round
                    .neutral()
                    .pick(&self.round, &self.opponent, slot, &mut self.rng)
            } else {
                random_from_hand(&self.opponent, &mut self.rng)
            };
            let Some(pick) = pick else {
                log::error!("opponent has no card to play in slot {slot}");
                return None;
            };
            if pick.pile != PileKind::Hand {
                self.opponent
                    .move_to_hand(pick.pile, pick.index, &mut self.events);
            }
            chosen.push(pick.card);
        }
        log::debug!(
            "opponent plays {}",
            chosen
                .iter()
                .map(Card::id)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Some(chosen)
    }
}
