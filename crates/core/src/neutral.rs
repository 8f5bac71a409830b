use crate::{Card, CardPileManager, PileKind, RngState, RoundState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RepeatTarget {
    Opponent,
    Player,
}

/// What a participant commits to a slot whose last outcome was Neutral.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NeutralStrategy {
    /// Any card from the hand.
    #[default]
    RandomHand,
    /// Whatever the chosen side played in that slot last round.
    Repeat(RepeatTarget),
    /// Always the same card.
    Search(Card),
}

/// A card chosen by a [`NeutralStrategy`], along with where it sits now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeutralPick {
    pub card: Card,
    pub pile: PileKind,
    pub index: usize,
}

impl NeutralStrategy {
    /// Looks for the strategy's target card in the hand, then the draw pile,
    /// then the discard pile; falls back to a random hand card. Does not
    /// touch the piles, so a pick outside the hand still has to be moved
    /// there by the caller. `None` only when nothing matched and the hand is
    /// empty.
    pub fn pick(
        &self,
        round: &RoundState,
        piles: &CardPileManager,
        slot: usize,
        rng: &mut RngState,
    ) -> Option<NeutralPick> {
        let target = match self {
            Self::RandomHand => None,
            Self::Repeat(side) => round
                .history()
                .first()
                .and_then(|last| last.card_at(*side, slot)),
            Self::Search(card) => Some(card),
        };
        if let Some(card) = target {
            if let Some(found) = search_piles(piles, card) {
                return Some(found);
            }
            log::debug!("neutral target {card} not found, picking at random");
        }
        random_from_hand(piles, rng)
    }

    pub fn get_card(
        &self,
        round: &RoundState,
        piles: &CardPileManager,
        slot: usize,
        rng: &mut RngState,
    ) -> Option<Card> {
        self.pick(round, piles, slot, rng).map(|pick| pick.card)
    }
}

fn search_piles(piles: &CardPileManager, card: &Card) -> Option<NeutralPick> {
    [PileKind::Hand, PileKind::Draw, PileKind::Discard]
        .into_iter()
        .find_map(|pile| {
            piles.search(pile, card).map(|index| NeutralPick {
                card: card.clone(),
                pile,
                index,
            })
        })
}

pub(crate) fn random_from_hand(piles: &CardPileManager, rng: &mut RngState) -> Option<NeutralPick> {
    let index = rng.index(piles.hand().len())?;
    Some(NeutralPick {
        card: piles.hand()[index].clone(),
        pile: PileKind::Hand,
        index,
    })
}
