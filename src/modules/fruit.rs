use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modules::slot::{AgentId, PerAgent, Slot};

/// Reward for eating an apple.
pub const REWARD_APPLE: f64 = 1.0;
/// Reward for eating a banana, paid to both agents.
pub const REWARD_BANANA: f64 = 5.0;
/// Penalty paid by the other agent when a lemon is eaten.
pub const REWARD_LEMON: f64 = -20.0;
/// Cost of living for a step in which nothing was gained or lost.
pub const REWARD_NOTHING: f64 = -0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FruitKind {
    Apple,
    Banana,
    Lemon,
}

impl FruitKind {
    pub const fn label(self) -> &'static str {
        match self {
            FruitKind::Apple => "apple",
            FruitKind::Banana => "banana",
            FruitKind::Lemon => "lemon",
        }
    }

    /// Marker drawn by the renderer. Invisible apples use the lowercase form.
    pub const fn marker(self) -> char {
        match self {
            FruitKind::Apple => 'A',
            FruitKind::Banana => 'B',
            FruitKind::Lemon => 'L',
        }
    }
}

impl fmt::Display for FruitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Fruit held on one agent's board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub apples: BTreeSet<Slot>,
    pub bananas: BTreeSet<Slot>,
    pub lemons: BTreeSet<Slot>,
}

impl Board {
    pub fn fruits(&self, kind: FruitKind) -> &BTreeSet<Slot> {
        match kind {
            FruitKind::Apple => &self.apples,
            FruitKind::Banana => &self.bananas,
            FruitKind::Lemon => &self.lemons,
        }
    }

    pub(crate) fn fruits_mut(&mut self, kind: FruitKind) -> &mut BTreeSet<Slot> {
        match kind {
            FruitKind::Apple => &mut self.apples,
            FruitKind::Banana => &mut self.bananas,
            FruitKind::Lemon => &mut self.lemons,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.apples.is_empty() && self.bananas.is_empty() && self.lemons.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.apples.clear();
        self.bananas.clear();
        self.lemons.clear();
    }
}

/// Which apple entries each observer can perceive on each board.
///
/// Entries are keyed by `(observer, board_owner)`. A freshly spawned apple
/// pair is revealed to a single observer on both boards; the other observer
/// sees neither entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    by_observer: PerAgent<PerAgent<BTreeSet<Slot>>>,
}

impl Visibility {
    pub fn visible_to(&self, observer: AgentId, board_owner: AgentId) -> &BTreeSet<Slot> {
        &self.by_observer[observer][board_owner]
    }

    pub fn sees(&self, observer: AgentId, board_owner: AgentId, slot: Slot) -> bool {
        self.visible_to(observer, board_owner).contains(&slot)
    }

    pub(crate) fn reveal(&mut self, observer: AgentId, board_owner: AgentId, slot: Slot) {
        self.by_observer[observer][board_owner].insert(slot);
    }

    /// Drops an entry, returning whether it was present.
    pub(crate) fn conceal(&mut self, observer: AgentId, board_owner: AgentId, slot: Slot) -> bool {
        self.by_observer[observer][board_owner].remove(&slot)
    }

    pub fn is_empty(&self) -> bool {
        self.by_observer
            .values()
            .all(|boards| boards.values().all(BTreeSet::is_empty))
    }

    pub(crate) fn clear(&mut self) {
        for observer in AgentId::ALL {
            for board_owner in AgentId::ALL {
                self.by_observer[observer][board_owner].clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(i: usize) -> Slot {
        Slot::new(i).unwrap()
    }

    #[test]
    fn visibility_is_tracked_per_observer_and_board() {
        let mut vis = Visibility::default();
        vis.reveal(AgentId::Player1, AgentId::Player2, slot(4));

        assert!(vis.sees(AgentId::Player1, AgentId::Player2, slot(4)));
        assert!(!vis.sees(AgentId::Player2, AgentId::Player2, slot(4)));
        assert!(!vis.sees(AgentId::Player1, AgentId::Player1, slot(4)));

        assert!(vis.conceal(AgentId::Player1, AgentId::Player2, slot(4)));
        assert!(!vis.conceal(AgentId::Player1, AgentId::Player2, slot(4)));
        assert!(vis.is_empty());
    }

    #[test]
    fn board_clear_empties_every_kind() {
        let mut board = Board::default();
        board.fruits_mut(FruitKind::Apple).insert(slot(1));
        board.fruits_mut(FruitKind::Banana).insert(slot(2));
        board.fruits_mut(FruitKind::Lemon).insert(slot(3));
        assert!(!board.is_empty());
        assert!(board.fruits(FruitKind::Banana).contains(&slot(2)));

        board.clear();
        assert!(board.is_empty());
    }
}
