use super::card::Card;
use super::hand::Hand;

/// The community cards visible to all players: 0 to 5 of them.
///
/// A hand may carry a second board when run-it-twice is active; each board
/// is an independent value of this type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board(Hand);

impl Board {
    /// An empty board (preflop state).
    pub const fn empty() -> Self {
        Self(Hand::empty())
    }
    /// Adds newly dealt cards. Panics in debug if they overlap the board.
    pub fn add(&mut self, cards: Hand) {
        debug_assert!(self.0.size() + cards.size() <= 5);
        self.0 = Hand::add(self.0, cards);
    }
    /// Number of cards dealt so far.
    pub fn size(&self) -> usize {
        self.0.size()
    }
    /// The cards in canonical (low-to-high) order.
    pub fn cards(&self) -> Vec<Card> {
        Vec::<Card>::from(self.0)
    }
}

impl From<Board> for Hand {
    fn from(board: Board) -> Self {
        board.0
    }
}
impl From<Hand> for Board {
    fn from(hand: Hand) -> Self {
        debug_assert!(hand.size() <= 5);
        Self(hand)
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_street_by_street() {
        let mut board = Board::empty();
        board.add(Hand::try_from("2c 7d Jh").unwrap());
        assert_eq!(board.size(), 3);
        board.add(Hand::try_from("Qs").unwrap());
        board.add(Hand::try_from("As").unwrap());
        assert_eq!(board.size(), 5);
    }
}
