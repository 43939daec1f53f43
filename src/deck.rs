//! Remaining-card tracking over the 52-card universe.

use crate::cards::{Card, DECK};
use crate::error::{CardLocation, EquityError, EquityResult};

/// A set of cards as a 64-bit mask, bit `i` = `DECK[i]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CardMask(u64);

impl CardMask {
    pub fn new() -> Self {
        CardMask(0)
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    pub fn contains(&self, card: Card) -> bool {
        self.0 & (1u64 << card.index()) != 0
    }

    /// Adds `card`; returns `false` if it was already present.
    pub fn insert(&mut self, card: Card) -> bool {
        let bit = 1u64 << card.index();
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Cards in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Card> + '_ {
        DECK.iter().copied().filter(move |c| self.contains(*c))
    }

    /// Builds a mask from `cards`, failing on the first repeat.
    pub fn from_unique(cards: &[Card]) -> EquityResult<CardMask> {
        let mut mask = CardMask::new();
        for &card in cards {
            if !mask.insert(card) {
                return Err(EquityError::DuplicateCard {
                    card,
                    first: CardLocation::Hand,
                    second: CardLocation::Hand,
                });
            }
        }
        Ok(mask)
    }
}

impl FromIterator<Card> for CardMask {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        let mut mask = CardMask::new();
        for card in iter {
            mask.insert(card);
        }
        mask
    }
}

/// The deck minus `committed`, in canonical order (rank-major, suit-minor).
pub fn remaining(committed: &[Card]) -> EquityResult<Vec<Card>> {
    let dead = CardMask::from_unique(committed)?;
    Ok(DECK.iter().copied().filter(|c| !dead.contains(*c)).collect())
}
