use rvb_core::Chips;
use rvb_core::JOURNAL_DEPTH;
use rvb_core::Position;
use rvb_cards::Hand;
use rvb_gameplay::Table;
use serde::Serialize;
use std::collections::VecDeque;

/// One settled hand, as remembered by the room.
#[derive(Debug, Clone, Serialize)]
pub struct HandRecord {
    pub hand: u64,
    pub pot: Chips,
    pub board: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_board: Option<Vec<String>>,
    pub payouts: Vec<(Position, Chips)>,
    pub winners: Vec<String>,
    pub walked: bool,
}

impl HandRecord {
    /// Captures the hand that just settled on this table.
    pub fn settle(table: &Table) -> Option<Self> {
        let showdown = table.showdown()?;
        let cards = |hand: Hand| {
            Vec::<rvb_cards::Card>::from(hand)
                .into_iter()
                .map(|c| c.to_string())
                .collect::<Vec<String>>()
        };
        Some(Self {
            hand: table.hand_number(),
            pot: showdown.total_awarded(),
            board: cards(Hand::from(table.board())),
            second_board: table.second_board().map(|b| cards(Hand::from(b))),
            payouts: showdown.payouts.clone(),
            winners: showdown
                .payouts
                .iter()
                .filter_map(|(seat, _)| table.player_at(*seat))
                .map(|p| p.name().to_string())
                .collect(),
            walked: showdown.walked,
        })
    }
}

/// In-memory ring of recently settled hands. Nothing persists: the journal
/// dies with the room.
#[derive(Debug, Default)]
pub struct Journal {
    entries: VecDeque<HandRecord>,
}

impl Journal {
    pub fn record(&mut self, record: HandRecord) {
        if self.entries.len() == JOURNAL_DEPTH {
            self.entries.pop_front();
        }
        self.entries.push_back(record);
    }
    pub fn recent(&self) -> impl Iterator<Item = &HandRecord> {
        self.entries.iter().rev()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
