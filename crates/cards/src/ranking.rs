use super::rank::Rank;

/// A hand's category plus the ranks that define it.
///
/// Derived `Ord` gives the poker ordering because variants are declared
/// weakest first and each variant's rank fields are compared in
/// significance order. Kickers are carried separately by
/// [`Strength`](super::strength::Strength).
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub enum Ranking {
    HighCard(Rank),        // 4 kickers
    OnePair(Rank),         // 3 kickers
    TwoPair(Rank, Rank),   // 1 kicker
    ThreeOAK(Rank),        // 2 kickers
    Straight(Rank),        // 0 kickers
    Flush(Rank),           // 0 kickers
    FullHouse(Rank, Rank), // 0 kickers
    FourOAK(Rank),         // 1 kicker
    StraightFlush(Rank),   // 0 kickers
    RoyalFlush,            // 0 kickers
}

impl Ranking {
    /// How many kicker cards break ties for this category.
    pub const fn n_kickers(&self) -> usize {
        match self {
            Ranking::HighCard(_) => 4,
            Ranking::OnePair(_) => 3,
            Ranking::ThreeOAK(_) => 2,
            Ranking::FourOAK(_) | Ranking::TwoPair(_, _) => 1,
            _ => 0,
        }
    }
    /// Rank bits consumed by the made hand, to be excluded from kickers.
    pub fn consumed(&self) -> u16 {
        match *self {
            Ranking::TwoPair(hi, lo) => u16::from(hi) | u16::from(lo),
            Ranking::HighCard(hi)
            | Ranking::OnePair(hi)
            | Ranking::ThreeOAK(hi)
            | Ranking::FourOAK(hi) => u16::from(hi),
            _ => 0,
        }
    }
}

impl std::fmt::Display for Ranking {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Ranking::HighCard(r) => write!(f, "High Card {}", r),
            Ranking::OnePair(r) => write!(f, "Pair of {}s", r),
            Ranking::TwoPair(a, b) => write!(f, "Two Pair, {}s and {}s", a, b),
            Ranking::ThreeOAK(r) => write!(f, "Three of a Kind, {}s", r),
            Ranking::Straight(r) => write!(f, "Straight to {}", r),
            Ranking::Flush(r) => write!(f, "Flush, {} high", r),
            Ranking::FullHouse(a, b) => write!(f, "Full House, {}s over {}s", a, b),
            Ranking::FourOAK(r) => write!(f, "Four of a Kind, {}s", r),
            Ranking::StraightFlush(r) => write!(f, "Straight Flush to {}", r),
            Ranking::RoyalFlush => write!(f, "Royal Flush"),
        }
    }
}
