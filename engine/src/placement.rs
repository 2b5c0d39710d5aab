//! Chronological correctness of a placement.
//!
//! Two position conventions exist. Solo games use 1-based slots of the
//! finished timeline (the whole deal is known up front), multiplayer games use
//! 0-based insertion indices into the timeline as it stands.

use std::{cmp::Ordering, ops::RangeInclusive};

use types::{Card, CardId, ChronoKey};

/// Result of a placement: the game as saved and whether the card landed in a
/// chronologically valid slot.
#[derive(Clone, Debug)]
pub struct PlacementOutcome<G> {
    pub game: G,
    pub is_correct: bool,
    /// Earliest position that would have been accepted.
    pub correct_position: usize,
}

/// Lower-bound insertion point of `candidate_year` into the non-decreasing
/// `ordered_years`.
pub fn correct_index(ordered_years: &[i32], candidate_year: i32) -> usize {
    ordered_years.partition_point(|&year| year < candidate_year)
}

/// Every insertion index into `keys` that keeps the timeline chronological.
/// The band is wider than one slot when the candidate ties with cards already
/// there, since any order among equal dates is accepted.
pub fn correct_range(keys: &[ChronoKey], candidate: &ChronoKey) -> RangeInclusive<usize> {
    let (before, equal) = keys
        .iter()
        .fold((0, 0), |(before, equal), key| match key.chrono_cmp(candidate) {
            Ordering::Less => (before + 1, equal),
            Ordering::Equal => (before, equal + 1),
            Ordering::Greater => (before, equal),
        });
    before..=before + equal
}

/// 1-based ranks the card at `idx` may hold once every card in `keys` is on
/// the timeline.
pub fn rank_band(keys: &[ChronoKey], idx: usize) -> RangeInclusive<usize> {
    let others: Vec<ChronoKey> = keys
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != idx)
        .map(|(_, key)| *key)
        .collect();
    let band = correct_range(&others, &keys[idx]);
    band.start() + 1..=band.end() + 1
}

/// Whether `chosen_position` (1-based) is a rank `card_id` can hold among
/// `all_cards`, the full set of cards that will end up on the timeline.
pub fn is_placement_correct(all_cards: &[Card], card_id: &CardId, chosen_position: usize) -> bool {
    placement_band(all_cards, card_id).map_or(false, |band| band.contains(&chosen_position))
}

/// 1-based ranks `card_id` may hold among `all_cards`.
pub fn placement_band(all_cards: &[Card], card_id: &CardId) -> Option<RangeInclusive<usize>> {
    let keys: Vec<ChronoKey> = all_cards.iter().map(Card::chrono_key).collect();
    let idx = all_cards.iter().position(|card| &card.id == card_id)?;
    Some(rank_band(&keys, idx))
}

/// Whether inserting `candidate` at `position` (0-based) keeps `timeline`
/// chronological.
pub fn is_insertion_correct(timeline: &[Card], candidate: &Card, position: usize) -> bool {
    insertion_band(timeline, candidate).contains(&position)
}

pub fn insertion_band(timeline: &[Card], candidate: &Card) -> RangeInclusive<usize> {
    let keys: Vec<ChronoKey> = timeline.iter().map(Card::chrono_key).collect();
    correct_range(&keys, &candidate.chrono_key())
}
