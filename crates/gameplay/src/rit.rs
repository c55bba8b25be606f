use rvb_core::Position;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Run-it-twice offer state.
///
/// Offered at most once per hand, when betting closes with every live seat
/// all-in and at least one street undealt. Activation requires a unanimous
/// accept; the deadline lives in the actor's timer schedule, not here, so
/// the table stays deterministic.
#[derive(Debug, Default, Clone)]
pub struct Rit {
    offered: bool,
    decided: bool,
    accepted: bool,
    voters: BTreeSet<Position>,
    votes: BTreeMap<Position, bool>,
}

impl Rit {
    /// Opens the offer to the given live all-in seats.
    pub fn offer(&mut self, voters: impl IntoIterator<Item = Position>) {
        self.offered = true;
        self.voters = voters.into_iter().collect();
    }
    /// An offer is open and awaiting votes.
    pub fn open(&self) -> bool {
        self.offered && !self.decided
    }
    /// The offer resolved in favor of two boards.
    pub fn active(&self) -> bool {
        self.decided && self.accepted
    }
    pub fn offered(&self) -> bool {
        self.offered
    }
    pub fn voters(&self) -> impl Iterator<Item = Position> + '_ {
        self.voters.iter().copied()
    }
    pub fn vote_of(&self, seat: Position) -> Option<bool> {
        self.votes.get(&seat).copied()
    }

    /// Records a vote. Returns false when the seat is not an eligible,
    /// un-voted participant of an open offer.
    pub fn vote(&mut self, seat: Position, accept: bool) -> bool {
        if !self.open() || !self.voters.contains(&seat) || self.votes.contains_key(&seat) {
            return false;
        }
        self.votes.insert(seat, accept);
        true
    }
    /// A voter left the hand; their say is no longer required.
    pub fn excuse(&mut self, seat: Position) {
        self.voters.remove(&seat);
        self.votes.remove(&seat);
    }
    /// Resolves the offer when the outcome is known: immediately on any
    /// decline (unanimity is already impossible), otherwise once every
    /// eligible voter has spoken. Returns the decision when just reached.
    pub fn tally(&mut self) -> Option<bool> {
        if !self.open() {
            return None;
        }
        if self.votes.values().any(|v| !v) {
            self.decided = true;
            self.accepted = false;
            return Some(false);
        }
        if self.votes.len() < self.voters.len() {
            return None;
        }
        self.decided = true;
        self.accepted = !self.voters.is_empty();
        Some(self.accepted)
    }
    /// The voting window elapsed: missing votes count as declines.
    pub fn expire(&mut self) -> Option<bool> {
        if !self.open() {
            return None;
        }
        self.decided = true;
        self.accepted = !self.voters.is_empty()
            && self.voters.len() == self.votes.len()
            && self.votes.values().all(|v| *v);
        Some(self.accepted)
    }
}
