use super::*;
use crate::*;

impl TurnStateMachine {
    /// Scores the round, applies the willingness change and remembers which
    /// slots went Neutral. Hitting the ceiling ends the negotiation at once.
    pub(super) fn enter_compute(&mut self) -> Option<TurnState> {
        self.compute_timer.restart();
        let score = self.round.score_submission();
        self.round
            .set_match_array(Some(score.outcomes.clone()), &mut self.events);
        self.round.nudge_willingness(score.delta);
        self.round.log_round();
        self.round.reset_neutrals();
        for (slot, outcome) in score.outcomes.iter().enumerate() {
            if *outcome == Outcome::Neutral {
                self.round.set_neutral(slot);
            }
        }
        self.rounds_played += 1;
        log::debug!(
            "round {} scored {} ({:+}), willingness {:.1}",
            self.rounds_played,
            score.outcomes.iter().map(|o| o.symbol()).collect::<String>(),
            score.delta,
            self.round.willingness()
        );
        if self.round.willingness() >= WILLINGNESS_MAX {
            return Some(TurnState::EndWin);
        }
        None
    }

    /// Clears the table between rounds: submissions go, hands are discarded
    /// and both sides redraw from a reshuffled deck.
    pub(super) fn reset_table(&mut self) {
        self.round.set_opp_cards(None, &mut self.events);
        self.round.clear_player_cards(&mut self.events);
        self.round.set_match_array(None, &mut self.events);
        for piles in [&mut self.opponent, &mut self.player] {
            piles.discard_hand(&mut self.events);
            piles.shuffle_discard_into_draw(&mut self.rng, &mut self.events);
            piles.draw_hand(&mut self.rng, &mut self.events);
        }
    }
}
