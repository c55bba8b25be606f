use rvb_cards::Card;

/// A rigged-hand fixture for privileged mode.
///
/// Deterministic test scaffolding, not gameplay: the next hand's deck is
/// stacked so the requesting player's hole cards plus the board realize
/// the chosen category. Board cards are picked so they add nothing on
/// their own (no board pairs, straights, or flushes beyond the target).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixture {
    RoyalFlush,
    StraightFlush,
    Quads,
    FullHouse,
    Flush,
    Straight,
    Trips,
    TwoPair,
    Pair,
    HighCard,
}

impl Fixture {
    /// The rigged player's hole cards.
    pub fn hole(&self) -> [Card; 2] {
        let (a, b) = match self {
            Self::RoyalFlush => ("Ah", "Kh"),
            Self::StraightFlush => ("9h", "8h"),
            Self::Quads => ("As", "Ah"),
            Self::FullHouse => ("As", "Ah"),
            Self::Flush => ("Ah", "9h"),
            Self::Straight => ("9s", "8d"),
            Self::Trips => ("As", "Ah"),
            Self::TwoPair => ("As", "Kh"),
            Self::Pair => ("As", "Ah"),
            Self::HighCard => ("Ah", "9s"),
        };
        [Card::try_from(a).unwrap(), Card::try_from(b).unwrap()]
    }
    /// The five community cards, in deal order.
    pub fn board(&self) -> [Card; 5] {
        let cards = match self {
            Self::RoyalFlush => ["Qh", "Jh", "Th", "2c", "7d"],
            Self::StraightFlush => ["7h", "6h", "5h", "2c", "Kd"],
            Self::Quads => ["Ad", "Ac", "7d", "2c", "9h"],
            Self::FullHouse => ["Ad", "Kc", "Ks", "2c", "7d"],
            Self::Flush => ["Kh", "7h", "2h", "8s", "Jd"],
            Self::Straight => ["7h", "6c", "5s", "Kd", "2h"],
            Self::Trips => ["Ad", "7c", "9h", "2s", "Kd"],
            Self::TwoPair => ["Ad", "Kc", "7d", "2s", "9h"],
            Self::Pair => ["7c", "9h", "2s", "Kd", "4c"],
            Self::HighCard => ["Kd", "7c", "4s", "2h", "Jd"],
        };
        cards.map(|c| Card::try_from(c).unwrap())
    }
}

impl TryFrom<&str> for Fixture {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "royal_flush" => Ok(Self::RoyalFlush),
            "straight_flush" => Ok(Self::StraightFlush),
            "quads" | "four_of_a_kind" => Ok(Self::Quads),
            "full_house" => Ok(Self::FullHouse),
            "flush" => Ok(Self::Flush),
            "straight" => Ok(Self::Straight),
            "trips" | "three_of_a_kind" => Ok(Self::Trips),
            "two_pair" => Ok(Self::TwoPair),
            "pair" => Ok(Self::Pair),
            "high_card" => Ok(Self::HighCard),
            other => Err(format!("unknown hand type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvb_cards::Hand;
    use rvb_cards::Ranking;
    use rvb_cards::Strength;

    fn realized(fixture: Fixture) -> Ranking {
        let cards = fixture
            .hole()
            .into_iter()
            .chain(fixture.board())
            .collect::<Vec<Card>>();
        Strength::from(Hand::from(cards)).ranking()
    }

    #[test]
    fn fixtures_realize_their_category() {
        use rvb_cards::Rank::*;
        assert_eq!(realized(Fixture::RoyalFlush), Ranking::RoyalFlush);
        assert_eq!(realized(Fixture::StraightFlush), Ranking::StraightFlush(Nine));
        assert_eq!(realized(Fixture::Quads), Ranking::FourOAK(Ace));
        assert_eq!(realized(Fixture::FullHouse), Ranking::FullHouse(Ace, King));
        assert_eq!(realized(Fixture::Flush), Ranking::Flush(Ace));
        assert_eq!(realized(Fixture::Straight), Ranking::Straight(Nine));
        assert_eq!(realized(Fixture::Trips), Ranking::ThreeOAK(Ace));
        assert_eq!(realized(Fixture::TwoPair), Ranking::TwoPair(Ace, King));
        assert_eq!(realized(Fixture::Pair), Ranking::OnePair(Ace));
        assert_eq!(realized(Fixture::HighCard), Ranking::HighCard(Ace));
    }

    #[test]
    fn no_duplicate_cards_in_any_fixture() {
        for fixture in [
            Fixture::RoyalFlush,
            Fixture::StraightFlush,
            Fixture::Quads,
            Fixture::FullHouse,
            Fixture::Flush,
            Fixture::Straight,
            Fixture::Trips,
            Fixture::TwoPair,
            Fixture::Pair,
            Fixture::HighCard,
        ] {
            let cards = fixture
                .hole()
                .into_iter()
                .chain(fixture.board())
                .collect::<Vec<Card>>();
            assert_eq!(Hand::from(cards).size(), 7);
        }
    }
}
