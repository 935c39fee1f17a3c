use std::fmt;
use std::ops::{Index, IndexMut};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of slots on each board.
pub const N_SLOTS: usize = 10;

/// A validated position on a board, always in `0..N_SLOTS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Slot(u8);

impl Slot {
    pub const FIRST: Slot = Slot(0);

    pub const fn new(index: usize) -> Option<Self> {
        if index < N_SLOTS {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = Slot> {
        (0..N_SLOTS as u8).map(Slot)
    }

    /// Uniformly random slot.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Slot(rng.gen_range(0..N_SLOTS as u8))
    }
}

impl TryFrom<usize> for Slot {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Slot::new(value).ok_or_else(|| format!("slot {} out of range 0..{}", value, N_SLOTS))
    }
}

impl From<Slot> for usize {
    fn from(slot: Slot) -> usize {
        slot.index()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two players. Also names the board each player owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgentId {
    #[serde(rename = "player_1")]
    Player1,
    #[serde(rename = "player_2")]
    Player2,
}

impl AgentId {
    /// Both agents in resolution order.
    pub const ALL: [AgentId; 2] = [AgentId::Player1, AgentId::Player2];

    pub const fn index(self) -> usize {
        match self {
            AgentId::Player1 => 0,
            AgentId::Player2 => 1,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            AgentId::Player1 => AgentId::Player2,
            AgentId::Player2 => AgentId::Player1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            AgentId::Player1 => "player_1",
            AgentId::Player2 => "player_2",
        }
    }

    /// Digit drawn for this agent by the renderer.
    pub const fn marker(self) -> char {
        match self {
            AgentId::Player1 => '1',
            AgentId::Player2 => '2',
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Exactly one value per agent, indexed by [`AgentId`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerAgent<T> {
    values: [T; 2],
}

impl<T> PerAgent<T> {
    pub const fn new(player_1: T, player_2: T) -> Self {
        Self {
            values: [player_1, player_2],
        }
    }

    pub fn from_fn(mut f: impl FnMut(AgentId) -> T) -> Self {
        Self::new(f(AgentId::Player1), f(AgentId::Player2))
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &T)> {
        AgentId::ALL.into_iter().zip(self.values.iter())
    }

    pub fn map<U>(self, mut f: impl FnMut(AgentId, T) -> U) -> PerAgent<U> {
        let [a, b] = self.values;
        PerAgent::new(f(AgentId::Player1, a), f(AgentId::Player2, b))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }
}

impl<T: Clone> PerAgent<T> {
    pub fn splat(value: T) -> Self {
        Self::new(value.clone(), value)
    }
}

impl<T> Index<AgentId> for PerAgent<T> {
    type Output = T;

    fn index(&self, agent: AgentId) -> &T {
        &self.values[agent.index()]
    }
}

impl<T> IndexMut<AgentId> for PerAgent<T> {
    fn index_mut(&mut self, agent: AgentId) -> &mut T {
        &mut self.values[agent.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_rejects_out_of_range() {
        assert!(Slot::new(N_SLOTS - 1).is_some());
        assert!(Slot::new(N_SLOTS).is_none());
        assert_eq!(Slot::all().count(), N_SLOTS);
    }

    #[test]
    fn agents_mirror_each_other() {
        for agent in AgentId::ALL {
            assert_eq!(agent.other().other(), agent);
            assert_eq!(AgentId::ALL[agent.index()], agent);
        }
        assert_eq!(AgentId::Player1.name(), "player_1");
    }

    #[test]
    fn per_agent_indexes_by_agent() {
        let mut values = PerAgent::new(1, 2);
        values[AgentId::Player2] += 10;
        assert_eq!(values[AgentId::Player1], 1);
        assert_eq!(values[AgentId::Player2], 12);
        let doubled = values.map(|_, v| v * 2);
        assert_eq!(doubled, PerAgent::new(2, 24));
    }

    #[test]
    fn slot_serializes_as_plain_index() {
        let slot = Slot::new(7).unwrap();
        assert_eq!(serde_json::to_string(&slot).unwrap(), "7");
        assert!(serde_json::from_str::<Slot>("12").is_err());
    }
}
