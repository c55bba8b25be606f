use super::card::Card;
use super::hand::Hand;

/// A player's two private hole cards.
///
/// Wraps a [`Hand`] with the constraint that exactly two cards are present.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Hole(Hand);

impl Hole {
    pub fn cards(&self) -> Vec<Card> {
        Vec::<Card>::from(self.0)
    }
}

impl From<Hole> for Hand {
    fn from(hole: Hole) -> Self {
        hole.0
    }
}

impl From<(Card, Card)> for Hole {
    fn from((a, b): (Card, Card)) -> Self {
        debug_assert!(a != b);
        Self(Hand::add(Hand::from(a), Hand::from(b)))
    }
}

impl TryFrom<&str> for Hole {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let hand = Hand::try_from(s)?;
        match hand.size() {
            2 => Ok(Self(hand)),
            _ => Err("hole must contain exactly two cards".into()),
        }
    }
}

impl std::fmt::Display for Hole {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_two() {
        assert!(Hole::try_from("As Kd").is_ok());
        assert!(Hole::try_from("As").is_err());
        assert!(Hole::try_from("As Kd 2c").is_err());
    }
}
