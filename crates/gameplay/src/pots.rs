use rvb_core::Chips;
use rvb_core::Position;
use rvb_cards::Strength;
use std::collections::BTreeMap;

/// One seat's chips committed to the hand, with whether it can still win.
///
/// Folded players and players who left mid-hand contribute dead chips:
/// their money flows into whichever layers match the depth they reached,
/// but they are never eligible to win any layer.
#[derive(Debug, Clone)]
pub struct Contribution {
    pub seat: Option<Position>,
    pub amount: Chips,
    pub live: bool,
}

/// One layer of the pot, cut at a distinct live contribution level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotLayer {
    pub amount: Chips,
    pub eligible: Vec<Position>,
}

/// Chips awarded out of one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotResult {
    pub amount: Chips,
    pub winners: Vec<Position>,
}

/// Cuts the hand's contributions into side-pot layers, main pot first.
///
/// Levels are the distinct per-hand totals among live seats, ascending.
/// Layer `ℓ` collects `min(c, ℓ) − min(c, prev)` from every contributor
/// `c`; its eligible winners are the live seats that reached depth `ℓ`.
/// A layer with a single eligible seat is the uncalled portion returned to
/// a lone deep raiser. Dead chips above the deepest live level (possible
/// only if every deeper seat left the room mid-hand) are folded into the
/// final layer so no chips evaporate.
pub fn layers(contributions: &[Contribution]) -> Vec<PotLayer> {
    let mut levels = contributions
        .iter()
        .filter(|c| c.live)
        .map(|c| c.amount)
        .collect::<Vec<Chips>>();
    levels.sort_unstable();
    levels.dedup();
    let mut pots = Vec::with_capacity(levels.len());
    let mut prev = 0;
    for level in levels {
        let amount = contributions
            .iter()
            .map(|c| c.amount.min(level) - c.amount.min(prev))
            .sum::<Chips>();
        let eligible = contributions
            .iter()
            .filter(|c| c.live && c.amount >= level)
            .filter_map(|c| c.seat)
            .collect::<Vec<Position>>();
        if amount > 0 {
            pots.push(PotLayer { amount, eligible });
        }
        prev = level;
    }
    let stray = contributions.iter().map(|c| c.amount).sum::<Chips>()
        - pots.iter().map(|p| p.amount).sum::<Chips>();
    if stray > 0 {
        if let Some(last) = pots.last_mut() {
            last.amount += stray;
        }
    }
    pots
}

/// Awards one layer to the best eligible hand(s).
///
/// Ties split evenly; any integer remainder goes in full to the winner
/// nearest clockwise from the small-blind seat, so the award is
/// independent of iteration order.
pub fn award(
    layer: &PotLayer,
    strengths: &BTreeMap<Position, Strength>,
    sb: Position,
    n_seats: usize,
) -> PotResult {
    let best = layer
        .eligible
        .iter()
        .filter_map(|seat| strengths.get(seat))
        .max()
        .copied();
    let winners = layer
        .eligible
        .iter()
        .filter(|seat| strengths.get(seat).copied() == best)
        .copied()
        .collect::<Vec<Position>>();
    debug_assert!(!winners.is_empty(), "layer with no eligible winner");
    PotResult {
        amount: layer.amount,
        winners: order_from(&winners, sb, n_seats),
    }
}

/// Splits an awarded layer into per-seat payouts. The remainder goes to
/// the first winner, which [`award`] placed nearest clockwise from the SB.
pub fn payouts(result: &PotResult) -> Vec<(Position, Chips)> {
    let n = result.winners.len() as Chips;
    let share = result.amount / n;
    let bonus = result.amount % n;
    result
        .winners
        .iter()
        .enumerate()
        .map(|(i, seat)| (*seat, share + if i == 0 { bonus } else { 0 }))
        .collect()
}

/// Reorders seats clockwise starting from (and including) the anchor seat.
fn order_from(seats: &[Position], anchor: Position, n_seats: usize) -> Vec<Position> {
    let mut ordered = seats.to_vec();
    ordered.sort_by_key(|seat| (seat + n_seats - anchor) % n_seats);
    ordered
}
