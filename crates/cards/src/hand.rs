use super::card::Card;

/// An unordered set of cards as a 52-bit bitstring in a u64.
///
/// Set algebra (union, complement, membership) is one instruction each,
/// which is what makes the bitwise [`Evaluator`](super::evaluator::Evaluator)
/// cheap.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hand(u64);

impl Hand {
    const MASK: u64 = (1 << 52) - 1;

    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }
    /// Number of cards in the set.
    pub const fn size(&self) -> usize {
        self.0.count_ones() as usize
    }
    /// Set union. The operands are expected to be disjoint.
    pub fn add(a: Self, b: Self) -> Self {
        debug_assert!(a.0 & b.0 == 0);
        Self(a.0 | b.0)
    }
    /// Set difference.
    pub fn remove(a: Self, b: Self) -> Self {
        Self(a.0 & !b.0)
    }
    /// Membership test.
    pub fn contains(&self, card: &Card) -> bool {
        self.0 & u64::from(*card) != 0
    }
    /// The 52-card complement: everything not in this set.
    pub fn complement(&self) -> Self {
        Self(!self.0 & Self::MASK)
    }
}

/// u64 isomorphism
impl From<u64> for Hand {
    fn from(n: u64) -> Self {
        Self(n & Self::MASK)
    }
}
impl From<Hand> for u64 {
    fn from(hand: Hand) -> Self {
        hand.0
    }
}

impl From<Card> for Hand {
    fn from(card: Card) -> Self {
        Self(u64::from(card))
    }
}

/// Vec<Card> isomorphism: OR the one-hot bits together / pluck them back
/// out lowest card first.
impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Self(cards.into_iter().map(u64::from).fold(0, |h, c| h | c))
    }
}
impl From<Hand> for Vec<Card> {
    fn from(hand: Hand) -> Self {
        let mut bits = hand.0;
        let mut cards = Vec::with_capacity(hand.size());
        while bits != 0 {
            cards.push(Card::from(bits.trailing_zeros() as u8));
            bits &= bits - 1;
        }
        cards
    }
}

/// str isomorphism, whitespace-separated cards: "As Kd 7c"
impl TryFrom<&str> for Hand {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.split_whitespace()
            .map(Card::try_from)
            .collect::<Result<Vec<Card>, _>>()
            .map(Self::from)
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let cards = Vec::<Card>::from(*self)
            .into_iter()
            .map(|c| c.to_string())
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "{}", cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_full() {
        assert_eq!(Hand::empty().size(), 0);
        assert_eq!(Hand::empty().complement().size(), 52);
    }

    #[test]
    fn union_and_difference() {
        let a = Hand::try_from("As Kd").unwrap();
        let b = Hand::try_from("7c").unwrap();
        let both = Hand::add(a, b);
        assert_eq!(both.size(), 3);
        assert_eq!(Hand::remove(both, b), a);
    }

    #[test]
    fn contains_cards_it_was_built_from() {
        let hand = Hand::try_from("As Kd 7c").unwrap();
        assert!(hand.contains(&Card::try_from("Kd").unwrap()));
        assert!(!hand.contains(&Card::try_from("Kc").unwrap()));
    }

    #[test]
    fn str_roundtrip() {
        let hand = Hand::try_from("2c Th As").unwrap();
        assert_eq!(hand, Hand::try_from(hand.to_string().as_str()).unwrap());
    }
}
