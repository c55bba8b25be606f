use super::card::Card;
use super::hand::Hand;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// The shuffled remainder of a 52-card deck.
///
/// Cards are drawn from the top (the end of the vector). Shuffling is an
/// unbiased Fisher–Yates; live rooms use the OS-seeded generator behind
/// [`rand::rng`], while tests pin a [`SmallRng`] seed for reproducibility.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// A fresh deck shuffled with the thread-local CSPRNG.
    pub fn shuffled() -> Self {
        let mut cards = Self::fresh();
        cards.shuffle(&mut rand::rng());
        Self { cards }
    }
    /// A deterministic deck for tests.
    pub fn seeded(seed: u64) -> Self {
        let mut cards = Self::fresh();
        cards.shuffle(&mut SmallRng::seed_from_u64(seed));
        Self { cards }
    }
    /// A deck whose first draws are exactly `top`, in order, with the
    /// remaining cards shuffled beneath them. Used by rigged-hand fixtures.
    pub fn stacked(top: Vec<Card>) -> Self {
        let planted = Hand::from(top.clone());
        debug_assert!(planted.size() == top.len());
        let mut rest = Vec::<Card>::from(planted.complement());
        rest.shuffle(&mut rand::rng());
        let mut cards = rest;
        cards.extend(top.into_iter().rev());
        Self { cards }
    }

    /// Removes and returns the top card.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }
    /// Discards the top card face-down before dealing a street.
    pub fn burn(&mut self) -> Option<Card> {
        self.cards.pop()
    }
    /// Draws `n` cards as a set. Panics if the deck runs dry, which cannot
    /// happen within a single hand of ten-handed hold'em.
    pub fn deal(&mut self, n: usize) -> Hand {
        (0..n)
            .map(|_| self.draw().expect("deck holds enough for one hand"))
            .map(Hand::from)
            .fold(Hand::empty(), Hand::add)
    }
    /// Cards left undrawn.
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    fn fresh() -> Vec<Card> {
        (0..52u8).map(Card::from).collect()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::shuffled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_52_unique() {
        let mut deck = Deck::shuffled();
        let mut seen = HashSet::new();
        while let Some(card) = deck.draw() {
            assert!(seen.insert(u8::from(card)));
        }
        assert_eq!(seen.len(), 52);
    }

    #[test]
    fn seeded_decks_repeat() {
        let mut a = Deck::seeded(271828);
        let mut b = Deck::seeded(271828);
        for _ in 0..52 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn stacked_draws_in_order() {
        let top = vec![
            Card::try_from("As").unwrap(),
            Card::try_from("Kd").unwrap(),
            Card::try_from("2c").unwrap(),
        ];
        let mut deck = Deck::stacked(top.clone());
        assert_eq!(deck.remaining(), 52);
        for card in top {
            assert_eq!(deck.draw(), Some(card));
        }
    }

    #[test]
    fn deal_removes_from_remainder() {
        let mut deck = Deck::seeded(7);
        let flop = deck.deal(3);
        assert_eq!(flop.size(), 3);
        assert_eq!(deck.remaining(), 49);
    }

    /// Coarse uniformity check: over many shuffles of a small slice, every
    /// permutation shows up with roughly equal frequency.
    #[test]
    fn shuffle_is_roughly_uniform() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut counts = std::collections::HashMap::new();
        let trials = 24_000usize;
        for _ in 0..trials {
            let mut xs = [0u8, 1, 2, 3];
            xs.shuffle(&mut rng);
            *counts.entry(xs).or_insert(0usize) += 1;
        }
        assert_eq!(counts.len(), 24);
        let expected = trials / 24;
        for (_, n) in counts {
            assert!(n > expected * 8 / 10, "permutation underrepresented");
            assert!(n < expected * 12 / 10, "permutation overrepresented");
        }
    }
}
