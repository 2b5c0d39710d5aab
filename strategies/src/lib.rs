pub mod input_strategy;

use std::cmp::Ordering;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use types::{Card, Placement, PlacementStrategy, PlacementView};

pub use crate::input_strategy::InputStrategy;

/// Any card from the hand into any slot.
#[derive(Debug)]
pub struct RandomStrategy {
    rng: StdRng,
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomStrategy {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PlacementStrategy for RandomStrategy {
    fn select_placement(&mut self, view: &PlacementView) -> Placement {
        let card = view
            .hand
            .choose(&mut self.rng)
            .expect("Should always have a card in hand when asked to place");
        let position = self.rng.gen_range(view.slot_range());
        Placement {
            card_id: card.id.clone(),
            position,
            time_taken: 0,
        }
    }
}

/// Knows every date: plays the first card in hand into its earliest correct
/// slot.
#[derive(Debug, Default)]
pub struct DefaultStrategy {}

impl PlacementStrategy for DefaultStrategy {
    fn select_placement(&mut self, view: &PlacementView) -> Placement {
        let card = view
            .hand
            .first()
            .expect("Should always have a card in hand when asked to place");
        Placement {
            card_id: card.id.clone(),
            position: view.position_base + earlier_count(&view.ranked_against, card),
            time_taken: 1,
        }
    }
}

fn earlier_count(cards: &[Card], card: &Card) -> usize {
    let key = card.chrono_key();
    cards
        .iter()
        .filter(|other| other.chrono_key().chrono_cmp(&key) == Ordering::Less)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{CardId, Difficulty};

    fn card(id: &str, year: i32) -> Card {
        Card {
            id: CardId::new(id),
            title: id.to_string(),
            year,
            month: None,
            day: None,
            category: "history".to_string(),
            difficulty: Difficulty::Easy,
        }
    }

    #[test]
    fn test_default_strategy_solo_slot() {
        let deal = vec![card("a", 100), card("b", 300), card("c", 200)];
        let view = PlacementView {
            timeline: vec![deal[1].clone()],
            hand: vec![deal[2].clone(), deal[0].clone()],
            ranked_against: deal,
            position_base: 1,
        };
        let placement = DefaultStrategy::default().select_placement(&view);
        assert_eq!(placement.card_id, CardId::new("c"));
        assert_eq!(placement.position, 2);
    }

    #[test]
    fn test_default_strategy_insertion_index() {
        let timeline = vec![card("a", -50), card("b", 1200)];
        let view = PlacementView {
            timeline: timeline.clone(),
            hand: vec![card("x", 1500)],
            ranked_against: timeline,
            position_base: 0,
        };
        let placement = DefaultStrategy::default().select_placement(&view);
        assert_eq!(placement.position, 2);
    }

    #[test]
    fn test_random_strategy_stays_in_range() {
        let timeline = vec![card("a", 1), card("b", 2), card("c", 3)];
        let view = PlacementView {
            timeline: timeline.clone(),
            hand: vec![card("x", 10), card("y", 20)],
            ranked_against: timeline,
            position_base: 0,
        };
        let mut strategy = RandomStrategy::seeded(7);
        for _ in 0..100 {
            let placement = strategy.select_placement(&view);
            assert!(view.slot_range().contains(&placement.position));
            assert!(view.hand.iter().any(|c| c.id == placement.card_id));
        }
    }
}
