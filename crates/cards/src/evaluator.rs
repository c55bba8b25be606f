use super::card::Card;
use super::hand::Hand;
use super::kicks::Kickers;
use super::rank::Rank;
use super::ranking::Ranking;
use super::suit::Suit;

/// Bitwise search for the best five-card ranking in a set of cards.
///
/// Categories are probed strongest-first, each with a mask trick over the
/// 52-bit hand: nibble popcounts for n-of-a-kind, per-suit rank masks for
/// flushes, and a shift-AND cascade for straights (with the wheel as the
/// one special case).
///
/// Hands with fewer than five cards still evaluate (straights and flushes
/// simply cannot occur), which powers the incremental best-hand hint in
/// the player view. Those partial values are never used to settle a pot.
pub struct Evaluator(Hand);

impl From<Hand> for Evaluator {
    fn from(h: Hand) -> Self {
        debug_assert!(h.size() > 0);
        Self(h)
    }
}

impl Evaluator {
    pub fn find_ranking(&self) -> Ranking {
        None.or_else(|| self.find_straight_flush())
            .or_else(|| self.find_4_oak())
            .or_else(|| self.find_full_house())
            .or_else(|| self.find_flush())
            .or_else(|| self.find_straight())
            .or_else(|| self.find_3_oak())
            .or_else(|| self.find_two_pair())
            .or_else(|| self.find_pair())
            .or_else(|| self.find_high_card())
            .expect("at least one card in hand")
    }
    pub fn find_kickers(&self, ranking: Ranking) -> Kickers {
        let n = ranking.n_kickers();
        if n == 0 {
            return Kickers::default();
        }
        let mut bits = self.rank_mask() & !ranking.consumed();
        while bits.count_ones() as usize > n {
            bits &= bits - 1;
        }
        Kickers::from(bits)
    }

    //

    fn find_straight_flush(&self) -> Option<Ranking> {
        self.find_flush_suit()
            .and_then(|suit| Self::find_straight_high(self.suit_mask(suit)))
            .map(|high| match high {
                Rank::Ace => Ranking::RoyalFlush,
                high => Ranking::StraightFlush(high),
            })
    }
    fn find_4_oak(&self) -> Option<Ranking> {
        self.find_n_oak_below(4, None).map(Ranking::FourOAK)
    }
    fn find_full_house(&self) -> Option<Ranking> {
        self.find_n_oak_below(3, None).and_then(|trips| {
            self.find_n_oak_below(2, Some(trips))
                .map(|pair| Ranking::FullHouse(trips, pair))
        })
    }
    fn find_flush(&self) -> Option<Ranking> {
        self.find_flush_suit()
            .map(|suit| Ranking::Flush(Rank::from(self.suit_mask(suit))))
    }
    fn find_straight(&self) -> Option<Ranking> {
        Self::find_straight_high(self.rank_mask()).map(Ranking::Straight)
    }
    fn find_3_oak(&self) -> Option<Ranking> {
        self.find_n_oak_below(3, None).map(Ranking::ThreeOAK)
    }
    fn find_two_pair(&self) -> Option<Ranking> {
        self.find_n_oak_below(2, None).and_then(|hi| {
            self.find_n_oak_below(2, Some(hi))
                .map(|lo| Ranking::TwoPair(hi, lo))
        })
    }
    fn find_pair(&self) -> Option<Ranking> {
        self.find_n_oak_below(2, None).map(Ranking::OnePair)
    }
    fn find_high_card(&self) -> Option<Ranking> {
        match self.rank_mask() {
            0 => None,
            mask => Some(Ranking::HighCard(Rank::from(mask))),
        }
    }

    //

    /// Highest rank appearing at least n times, strictly below the given
    /// ceiling when one is set.
    fn find_n_oak_below(&self, n: usize, below: Option<Rank>) -> Option<Rank> {
        let ceiling = below.map(u8::from).unwrap_or(13);
        (0..ceiling)
            .rev()
            .map(Rank::from)
            .find(|rank| self.count(*rank) >= n)
    }
    /// High card of a straight within a rank mask, if any. The wheel
    /// (A-2-3-4-5) plays as a five-high straight.
    fn find_straight_high(mask: u16) -> Option<Rank> {
        const WHEEL: u16 = 0b1_0000_0000_1111;
        let mut bits = mask;
        bits &= bits << 1;
        bits &= bits << 1;
        bits &= bits << 1;
        bits &= bits << 1;
        if bits > 0 {
            Some(Rank::from(bits))
        } else if mask & WHEEL == WHEEL {
            Some(Rank::Five)
        } else {
            None
        }
    }
    fn find_flush_suit(&self) -> Option<Suit> {
        Suit::all()
            .into_iter()
            .find(|suit| self.suit_mask(*suit).count_ones() >= 5)
    }

    //

    /// How many cards of this rank are present (the rank's nibble popcount).
    fn count(&self, rank: Rank) -> usize {
        ((u64::from(self.0) >> (4 * rank as u64)) & 0xF).count_ones() as usize
    }
    /// Which ranks are present, suit-blind.
    fn rank_mask(&self) -> u16 {
        Vec::<Card>::from(self.0)
            .iter()
            .map(|c| u16::from(c.rank()))
            .fold(0, |acc, r| acc | r)
    }
    /// Which ranks are present within one suit.
    fn suit_mask(&self, suit: Suit) -> u16 {
        Vec::<Card>::from(self.0)
            .iter()
            .filter(|c| c.suit() == suit)
            .map(|c| u16::from(c.rank()))
            .fold(0, |acc, r| acc | r)
    }
}
