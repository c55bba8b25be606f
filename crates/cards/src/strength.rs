use super::evaluator::Evaluator;
use super::hand::Hand;
use super::kicks::Kickers;
use super::ranking::Ranking;

/// A fully-evaluated hand value for comparison.
///
/// Lexicographic ordering: [`Ranking`] first, then [`Kickers`]. Equality is
/// a true tie for pot-splitting purposes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub struct Strength {
    ranking: Ranking,
    kicks: Kickers,
}

impl Strength {
    pub fn ranking(&self) -> Ranking {
        self.ranking
    }
    pub fn kickers(&self) -> Kickers {
        self.kicks
    }
}

impl From<Hand> for Strength {
    fn from(hand: Hand) -> Self {
        Self::from(Evaluator::from(hand))
    }
}

impl From<Evaluator> for Strength {
    fn from(e: Evaluator) -> Self {
        let ranking = e.find_ranking();
        let kicks = e.find_kickers(ranking);
        Self::from((ranking, kicks))
    }
}

impl From<(Ranking, Kickers)> for Strength {
    fn from((ranking, kicks): (Ranking, Kickers)) -> Self {
        Self { ranking, kicks }
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.ranking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvb_core::Arbitrary;

    fn sample() -> Strength {
        use super::super::card::Card;
        let mut cards = std::collections::HashSet::new();
        while cards.len() < 7 {
            cards.insert(Card::random());
        }
        Strength::from(Hand::from(cards.into_iter().collect::<Vec<Card>>()))
    }

    /// compare(h, h) == 0, antisymmetry, and transitivity over random
    /// 7-card samples.
    #[test]
    fn total_order() {
        for _ in 0..512 {
            let (a, b, c) = (sample(), sample(), sample());
            assert_eq!(a.cmp(&a), std::cmp::Ordering::Equal);
            assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
            if a <= b && b <= c {
                assert!(a <= c);
            }
        }
    }

    #[test]
    fn kickers_break_ties() {
        let better = Strength::from(Hand::try_from("As Ad Kc 9h 5d").unwrap());
        let worse = Strength::from(Hand::try_from("Ah Ac Qs 9c 5s").unwrap());
        assert!(better > worse);
        assert_eq!(better.ranking(), worse.ranking());
    }

    #[test]
    fn identical_values_tie() {
        let a = Strength::from(Hand::try_from("As Ad 5c 5h 9s Kc Qd").unwrap());
        let b = Strength::from(Hand::try_from("Ah Ac 5d 5s 9h Kd Js").unwrap());
        assert_eq!(a, b);
    }
}
