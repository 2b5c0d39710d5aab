use std::{fmt::Debug, ops::RangeInclusive};

use crate::card::{Card, CardId};

/// What a seat is shown when it is asked to place a card.
#[derive(Clone, Debug)]
pub struct PlacementView {
    /// Cards already on the timeline, in timeline order.
    pub timeline: Vec<Card>,
    pub hand: Vec<Card>,
    /// Cards a position is ranked against. For solo games this is the whole
    /// deal; in multiplayer it is the current timeline.
    pub ranked_against: Vec<Card>,
    /// 1 when positions are 1-based slots of the finished timeline, 0 when
    /// they are insertion indices into the current one.
    pub position_base: usize,
}

impl PlacementView {
    pub fn slot_range(&self) -> RangeInclusive<usize> {
        let last_offset = if self.position_base == 0 {
            self.ranked_against.len()
        } else {
            self.ranked_against.len().saturating_sub(1)
        };
        self.position_base..=self.position_base + last_offset
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub card_id: CardId,
    pub position: usize,
    /// Seconds spent deciding.
    pub time_taken: u32,
}

pub trait PlacementStrategy: Debug + Send {
    fn select_placement(&mut self, view: &PlacementView) -> Placement;
}
