use super::rank::Rank;
use super::suit::Suit;
use rvb_core::Arbitrary;

/// One of the 52 distinct cards: a (rank, suit) pair.
///
/// The u8 form is `rank * 4 + suit`; the u64 form is a one-hot bit in the
/// 52-bit [`Hand`](super::hand::Hand) bitstring.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub fn rank(&self) -> Rank {
        self.rank
    }
    pub fn suit(&self) -> Suit {
        self.suit
    }
}

impl From<(Rank, Suit)> for Card {
    fn from((rank, suit): (Rank, Suit)) -> Self {
        Self { rank, suit }
    }
}

/// u8 isomorphism
impl From<Card> for u8 {
    fn from(c: Card) -> u8 {
        (c.rank as u8) * 4 + (c.suit as u8)
    }
}
impl From<u8> for Card {
    fn from(n: u8) -> Self {
        debug_assert!(n < 52);
        Self {
            rank: Rank::from(n / 4),
            suit: Suit::from(n % 4),
        }
    }
}

/// u64 isomorphism (one-hot bit)
impl From<Card> for u64 {
    fn from(c: Card) -> u64 {
        1 << u8::from(c)
    }
}
impl From<u64> for Card {
    fn from(n: u64) -> Self {
        debug_assert!(n.count_ones() == 1);
        Self::from((n.trailing_zeros() as u8).min(51))
    }
}

/// str isomorphism, e.g. "As", "Td", "9♥"
impl TryFrom<&str> for Card {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let s = s.trim();
        let split = s
            .char_indices()
            .nth_back(0)
            .map(|(i, _)| i)
            .ok_or_else(|| format!("empty card str"))?;
        Ok(Self {
            rank: Rank::try_from(&s[..split])?,
            suit: Suit::try_from(&s[split..])?,
        })
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl Arbitrary for Card {
    fn random() -> Self {
        use rand::Rng;
        Self::from(rand::rng().random_range(0..52u8))
    }
}
