/// The hand lifecycle states.
///
/// WAITING ↔ (PRE_FLOP → FLOP → TURN → RIVER → SHOWDOWN) cycles while the
/// game is running. The all-in fast-forward and run-it-twice paths move
/// through the same street states, just without betting turns.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    #[default]
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Phase {
    /// True for the four betting streets.
    pub const fn is_betting(&self) -> bool {
        matches!(self, Phase::Preflop | Phase::Flop | Phase::Turn | Phase::River)
    }
    /// The street that follows this one.
    pub const fn next_street(&self) -> Phase {
        match self {
            Phase::Waiting => Phase::Preflop,
            Phase::Preflop => Phase::Flop,
            Phase::Flop => Phase::Turn,
            Phase::Turn => Phase::River,
            Phase::River | Phase::Showdown => Phase::Showdown,
        }
    }
    /// Community cards revealed on entry to this street.
    pub const fn n_revealed(&self) -> usize {
        match self {
            Phase::Flop => 3,
            Phase::Turn | Phase::River => 1,
            _ => 0,
        }
    }
    /// Wire label.
    pub const fn label(&self) -> &'static str {
        match self {
            Phase::Waiting => "waiting",
            Phase::Preflop => "pre_flop",
            Phase::Flop => "flop",
            Phase::Turn => "turn",
            Phase::River => "river",
            Phase::Showdown => "showdown",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streets_progress_to_showdown() {
        let mut phase = Phase::Preflop;
        let mut dealt = 0;
        while phase != Phase::Showdown {
            phase = phase.next_street();
            dealt += phase.n_revealed();
        }
        assert_eq!(dealt, 5);
    }
}
