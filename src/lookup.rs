//! Table-driven 5-7 card ranking.
//!
//! Two 8192-entry tables indexed by a 13-bit rank mask (deuce = bit 0) are
//! built on first use and shared read-only for the life of the process:
//!
//! - `STRAIGHTS`: high card of the best straight in the mask (5 for the
//!   wheel, 0 for none).
//! - `TOP_RANKS`: the five highest ranks in the mask, packed as 4-bit rank
//!   values, highest first.
//!
//! A hand is reduced in one pass to per-suit rank masks plus bit-sliced
//! multiplicity masks (ranks seen at least once/twice/three times/four
//! times). Every category then resolves with a couple of table reads and
//! bit operations. Nothing is allocated.

use once_cell::sync::Lazy;

use crate::cards::Card;
use crate::hand_evaluator::{HandCategory, HandRank};

const RANK_MASKS: usize = 1 << 13;
const WHEEL: u16 = 0b1_0000_0000_1111;

static STRAIGHTS: Lazy<Box<[u8; RANK_MASKS]>> = Lazy::new(|| {
    let mut table = Box::new([0u8; RANK_MASKS]);
    for (mask, slot) in table.iter_mut().enumerate() {
        let mask = mask as u16;
        *slot = (4..13u16)
            .rev()
            .find(|&high| {
                let run = 0b1_1111 << (high - 4);
                mask & run == run
            })
            .map(|high| high as u8 + 2)
            .unwrap_or(if mask & WHEEL == WHEEL { 5 } else { 0 });
    }
    table
});

static TOP_RANKS: Lazy<Box<[u32; RANK_MASKS]>> = Lazy::new(|| {
    let mut table = Box::new([0u32; RANK_MASKS]);
    for (mask, slot) in table.iter_mut().enumerate() {
        let mut packed = 0u32;
        let mut taken = 0;
        for bit in (0..13).rev() {
            if taken == 5 {
                break;
            }
            if mask & (1 << bit) != 0 {
                packed = (packed << 4) | (bit as u32 + 2);
                taken += 1;
            }
        }
        *slot = packed << (4 * (5 - taken));
    }
    table
});

/// Forces both tables to be built now rather than on the first evaluation.
pub fn warm_up() {
    Lazy::force(&STRAIGHTS);
    Lazy::force(&TOP_RANKS);
}

#[inline]
fn top(table: &[u32; RANK_MASKS], mask: u16, n: u32) -> u32 {
    table[mask as usize] >> (4 * (5 - n))
}

#[inline]
fn highest_bit(mask: u16) -> u16 {
    15 - mask.leading_zeros() as u16
}

#[inline]
fn rank_of_bit(bit: u16) -> u32 {
    bit as u32 + 2
}

/// Ranks 5 to 7 distinct cards. Callers guarantee the count and uniqueness.
pub(crate) fn rank_cards(cards: &[Card]) -> HandRank {
    let straights: &[u8; RANK_MASKS] = &STRAIGHTS;
    let top_ranks: &[u32; RANK_MASKS] = &TOP_RANKS;

    let mut suits = [0u16; 4];
    let (mut one, mut two, mut three, mut four) = (0u16, 0u16, 0u16, 0u16);
    for card in cards {
        let bit = card.rank_bit();
        suits[card.suit as usize] |= bit;
        four |= three & bit;
        three |= two & bit;
        two |= one & bit;
        one |= bit;
    }

    // With at most 7 cards a flush excludes quads and full houses.
    for &suited in &suits {
        if suited.count_ones() >= 5 {
            return match straights[suited as usize] {
                0 => HandRank::from_parts(HandCategory::Flush, top(top_ranks, suited, 5), 5),
                high => HandRank::from_parts(HandCategory::StraightFlush, high as u32, 1),
            };
        }
    }

    if four != 0 {
        let quad = highest_bit(four);
        let kicker = top(top_ranks, one & !(1 << quad), 1);
        return HandRank::from_parts(
            HandCategory::FourOfAKind,
            (rank_of_bit(quad) << 4) | kicker,
            2,
        );
    }

    if three != 0 {
        let trips = highest_bit(three);
        let pair_pool = two & !(1 << trips);
        if pair_pool != 0 {
            return HandRank::from_parts(
                HandCategory::FullHouse,
                (rank_of_bit(trips) << 4) | rank_of_bit(highest_bit(pair_pool)),
                2,
            );
        }
    }

    let high = straights[one as usize];
    if high != 0 {
        return HandRank::from_parts(HandCategory::Straight, high as u32, 1);
    }

    if three != 0 {
        let trips = highest_bit(three);
        let kickers = top(top_ranks, one & !(1 << trips), 2);
        return HandRank::from_parts(
            HandCategory::ThreeOfAKind,
            (rank_of_bit(trips) << 8) | kickers,
            3,
        );
    }

    if two != 0 {
        let high_pair = highest_bit(two);
        let rest = two & !(1 << high_pair);
        if rest != 0 {
            let low_pair = highest_bit(rest);
            let kicker = top(top_ranks, one & !(1 << high_pair) & !(1 << low_pair), 1);
            return HandRank::from_parts(
                HandCategory::TwoPair,
                (rank_of_bit(high_pair) << 8) | (rank_of_bit(low_pair) << 4) | kicker,
                3,
            );
        }
        let kickers = top(top_ranks, one & !(1 << high_pair), 3);
        return HandRank::from_parts(
            HandCategory::OnePair,
            (rank_of_bit(high_pair) << 12) | kickers,
            4,
        );
    }

    HandRank::from_parts(HandCategory::HighCard, top(top_ranks, one, 5), 5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_table_marks_wheel_and_broadway() {
        assert_eq!(STRAIGHTS[WHEEL as usize], 5);
        assert_eq!(STRAIGHTS[0b1_1111_0000_0000], 14);
        assert_eq!(STRAIGHTS[0b0_0000_0001_1111], 6);
        // A-2-3-4-5-6 is a six-high straight, not the wheel
        assert_eq!(STRAIGHTS[0b1_0000_0001_1111], 6);
        assert_eq!(STRAIGHTS[0b1_0101_0101_0101], 0);
    }

    #[test]
    fn top_ranks_keeps_five_highest() {
        // A K Q J T 9 8 -> A K Q J T
        let mask = 0b1_1111_1100_0000;
        assert_eq!(TOP_RANKS[mask], 0xEDCBA);
        assert_eq!(top(&TOP_RANKS, mask as u16, 2), 0xED);
        // only deuce and trey present
        assert_eq!(TOP_RANKS[0b11], 0x32000);
    }
}
