//! Deck generator - two copies of every card value in shuffled order.

use crate::rng::SimpleRng;
use crate::types::CardValue;

/// Concatenate `distinct` with itself and shuffle the result.
///
/// The output has length `2 * distinct.len()` and contains every input
/// element exactly twice.
pub fn shuffled_pairs<T: Copy>(distinct: &[T], rng: &mut SimpleRng) -> Vec<T> {
    let mut cards = Vec::with_capacity(distinct.len() * 2);
    cards.extend_from_slice(distinct);
    cards.extend_from_slice(distinct);
    rng.shuffle(&mut cards);
    cards
}

/// The cards in play for one game, in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<CardValue>,
}

impl Deck {
    pub fn shuffled(values: &[CardValue], rng: &mut SimpleRng) -> Self {
        Self {
            cards: shuffled_pairs(values, rng),
        }
    }

    /// Build a deck in a fixed order (tests, replays).
    pub fn from_cards(cards: Vec<CardValue>) -> Self {
        Self { cards }
    }

    /// Reshuffle in place, keeping the allocation.
    pub fn reshuffle(&mut self, values: &[CardValue], rng: &mut SimpleRng) {
        self.cards.clear();
        self.cards.extend_from_slice(values);
        self.cards.extend_from_slice(values);
        rng.shuffle(&mut self.cards);
    }

    pub fn get(&self, index: usize) -> Option<CardValue> {
        self.cards.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[CardValue] {
        &self.cards
    }

    /// Deck positions holding `value`.
    pub fn positions_of(&self, value: CardValue) -> impl Iterator<Item = usize> + '_ {
        self.cards
            .iter()
            .enumerate()
            .filter(move |(_, v)| **v == value)
            .map(|(i, _)| i)
    }

    /// True when every value appears exactly twice.
    pub fn is_paired(&self) -> bool {
        let mut sorted = self.cards.clone();
        sorted.sort_unstable();
        sorted.len() % 2 == 0
            && sorted.chunks(2).all(|c| c[0] == c[1])
            && sorted.windows(3).all(|w| !(w[0] == w[1] && w[1] == w[2]))
    }
}
