use rvb_core::Chips;

/// A betting decision submitted by a seated player.
///
/// The `Raise` amount is the *increment above the current bet*, not the
/// total: raising "by 40" over a bet of 20 makes the total 60. `AllIn` is
/// shorthand for committing the entire remaining bankroll, whatever that
/// turns out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fold,
    Check,
    Call,
    Raise(Chips),
    AllIn,
}

impl Action {
    /// Wire label for this action kind.
    pub const fn label(&self) -> &'static str {
        match self {
            Action::Fold => "fold",
            Action::Check => "check",
            Action::Call => "call",
            Action::Raise(_) => "raise",
            Action::AllIn => "all-in",
        }
    }
    /// The raise increment, when there is one.
    pub const fn amount(&self) -> Option<Chips> {
        match self {
            Action::Raise(n) => Some(*n),
            _ => None,
        }
    }
}

/// (kind, amount) isomorphism with the wire form. "bet" is accepted as an
/// alias for "raise" since an opening bet is a raise over zero.
impl TryFrom<(&str, Option<Chips>)> for Action {
    type Error = String;
    fn try_from((kind, amount): (&str, Option<Chips>)) -> Result<Self, Self::Error> {
        match kind.trim().to_lowercase().as_str() {
            "fold" => Ok(Action::Fold),
            "check" => Ok(Action::Check),
            "call" => Ok(Action::Call),
            "all-in" | "allin" | "all_in" => Ok(Action::AllIn),
            "bet" | "raise" => amount
                .map(Action::Raise)
                .ok_or_else(|| "raise requires an amount".to_string()),
            other => Err(format!("unknown action: {}", other)),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Action::Raise(n) => write!(f, "raise {}", n),
            other => write!(f, "{}", other.label()),
        }
    }
}
