use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::cards::{Card, Rank};
use crate::deck::CardMask;
use crate::error::{EquityError, EquityResult};
use crate::lookup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

pub const ALL_CATEGORIES: [HandCategory; 9] = [
    HandCategory::HighCard,
    HandCategory::OnePair,
    HandCategory::TwoPair,
    HandCategory::ThreeOfAKind,
    HandCategory::Straight,
    HandCategory::Flush,
    HandCategory::FullHouse,
    HandCategory::FourOfAKind,
    HandCategory::StraightFlush,
];

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandCategory::HighCard => write!(f, "High Card"),
            HandCategory::OnePair => write!(f, "One Pair"),
            HandCategory::TwoPair => write!(f, "Two Pair"),
            HandCategory::ThreeOfAKind => write!(f, "Three of a Kind"),
            HandCategory::Straight => write!(f, "Straight"),
            HandCategory::Flush => write!(f, "Flush"),
            HandCategory::FullHouse => write!(f, "Full House"),
            HandCategory::FourOfAKind => write!(f, "Four of a Kind"),
            HandCategory::StraightFlush => write!(f, "Straight Flush"),
        }
    }
}

/// Strength of the best five-card hand, directly comparable.
///
/// Layout: category in bits 20..24, then up to five 4-bit rank values
/// (2..=14), most significant first and left-aligned. Which ranks are
/// stored depends on the category:
///
/// - straight / straight flush: the high card (5 for the wheel)
/// - quads: quad rank, side card
/// - full house: trip rank, pair rank
/// - flush / high card: five ranks, descending
/// - trips: trip rank, two kickers
/// - two pair: high pair, low pair, kicker
/// - one pair: pair rank, three kickers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct HandRank(u32);

impl HandRank {
    const CATEGORY_SHIFT: u32 = 20;

    /// Packs `len` rank nibbles (already packed high-first in `ranks`) under `category`.
    pub(crate) fn from_parts(category: HandCategory, ranks: u32, len: u32) -> HandRank {
        HandRank(((category as u32) << Self::CATEGORY_SHIFT) | (ranks << (4 * (5 - len))))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn category(self) -> HandCategory {
        ALL_CATEGORIES[(self.0 >> Self::CATEGORY_SHIFT) as usize]
    }

    /// Tie-break rank values in comparison order, e.g. `[14, 13]` for aces full of kings.
    pub fn kickers(self) -> Vec<u8> {
        (0..5)
            .rev()
            .map(|i| ((self.0 >> (4 * i)) & 0xF) as u8)
            .take_while(|&v| v != 0)
            .collect()
    }

    pub fn is_royal(self) -> bool {
        self == HandRank::from_parts(HandCategory::StraightFlush, Rank::Ace.value() as u32, 1)
    }
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ranks: Vec<Rank> = self
            .kickers()
            .into_iter()
            .filter_map(Rank::from_value)
            .collect();
        let first = match ranks.first() {
            Some(&r) => r,
            None => return write!(f, "{}", self.category()),
        };
        match self.category() {
            HandCategory::StraightFlush if self.is_royal() => write!(f, "Royal Flush"),
            HandCategory::StraightFlush | HandCategory::Straight | HandCategory::Flush => {
                write!(f, "{}, {} high", self.category(), first.name())
            }
            HandCategory::FullHouse if ranks.len() == 2 => {
                write!(f, "Full House, {} full of {}", first.plural(), ranks[1].plural())
            }
            HandCategory::TwoPair if ranks.len() >= 2 => {
                write!(f, "Two Pair, {} and {}", first.plural(), ranks[1].plural())
            }
            HandCategory::FourOfAKind | HandCategory::ThreeOfAKind | HandCategory::OnePair => {
                write!(f, "{}, {}", self.category(), first.plural())
            }
            category => write!(f, "{}, {}", category, first.name()),
        }
    }
}

/// Ranks the best five-card hand out of 5 to 7 distinct cards.
pub fn evaluate(cards: &[Card]) -> EquityResult<HandRank> {
    if !(5..=7).contains(&cards.len()) {
        return Err(EquityError::InvalidHandSize {
            what: "evaluated hand".to_string(),
            got: cards.len(),
            expected: "5 to 7",
        });
    }
    CardMask::from_unique(cards)?;
    Ok(lookup::rank_cards(cards))
}

pub fn evaluate_hand(hole_cards: &[Card], board: &[Card]) -> EquityResult<HandRank> {
    let mut all_cards: Vec<Card> = Vec::with_capacity(hole_cards.len() + board.len());
    all_cards.extend_from_slice(hole_cards);
    all_cards.extend_from_slice(board);
    evaluate(&all_cards)
}

pub fn compare_hands(hand1: &[Card], hand2: &[Card], board: &[Card]) -> EquityResult<Ordering> {
    let r1 = evaluate_hand(hand1, board)?;
    let r2 = evaluate_hand(hand2, board)?;
    Ok(r1.cmp(&r2))
}

/// Slow evaluator that scores every five-card subset with explicit
/// category rules. Cross-checks the table evaluator.
pub mod reference {
    use itertools::Itertools;

    use super::{HandCategory, HandRank};
    use crate::cards::Card;

    fn pack(ranks: &[u8]) -> u32 {
        ranks.iter().fold(0u32, |acc, &r| (acc << 4) | r as u32)
    }

    fn hand(category: HandCategory, ranks: &[u8]) -> HandRank {
        HandRank::from_parts(category, pack(ranks), ranks.len() as u32)
    }

    fn straight_high(values: &[u8]) -> Option<u8> {
        let unique: Vec<u8> = values.iter().copied().dedup().collect();
        if unique.len() != 5 {
            return None;
        }
        if unique[0] - unique[4] == 4 {
            return Some(unique[0]);
        }
        // Wheel: A-2-3-4-5
        if unique == [14, 5, 4, 3, 2] {
            return Some(5);
        }
        None
    }

    pub fn rank_five(cards: &[Card]) -> HandRank {
        let mut values: Vec<u8> = cards.iter().map(|c| c.value()).collect();
        values.sort_unstable_by(|a, b| b.cmp(a));

        let flush = cards.windows(2).all(|w| w[0].suit == w[1].suit);
        let straight = straight_high(&values);

        // Five distinct ranks: no pairs can coexist with these.
        match (flush, straight) {
            (true, Some(high)) => return hand(HandCategory::StraightFlush, &[high]),
            (true, None) => return hand(HandCategory::Flush, &values),
            (false, Some(high)) => return hand(HandCategory::Straight, &[high]),
            (false, None) => {}
        }

        // (count, value), count desc then value desc
        let mut groups: Vec<(usize, u8)> = values
            .iter()
            .copied()
            .dedup_with_count()
            .collect();
        groups.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        let by_group: Vec<u8> = groups.iter().map(|&(_, v)| v).collect();

        match (groups[0].0, groups.get(1).map(|g| g.0)) {
            (4, _) => hand(HandCategory::FourOfAKind, &by_group),
            (3, Some(2)) => hand(HandCategory::FullHouse, &by_group),
            (3, _) => hand(HandCategory::ThreeOfAKind, &by_group),
            (2, Some(2)) => hand(HandCategory::TwoPair, &by_group),
            (2, _) => hand(HandCategory::OnePair, &by_group),
            _ => hand(HandCategory::HighCard, &values),
        }
    }

    /// Best rank over all five-card subsets; `None` below five cards.
    pub fn best_of(cards: &[Card]) -> Option<HandRank> {
        cards
            .iter()
            .copied()
            .combinations(5)
            .map(|five| rank_five(&five))
            .max()
    }
}
