use serde::{Deserialize, Serialize};

use crate::modules::fruit::{Board, Visibility};
use crate::modules::slot::{AgentId, N_SLOTS, PerAgent, Slot};

/// Boards per observation: the observer's own board first, then the opponent's.
pub const N_BOARDS: usize = 2;
pub const N_CHANNELS: usize = 6;

pub const CHANNEL_STATIC_FALSE: usize = 0;
pub const CHANNEL_STATIC_TRUE: usize = 1;
pub const CHANNEL_AGENT_LOCATIONS: usize = 2;
pub const CHANNEL_APPLE_LOCATIONS: usize = 3;
pub const CHANNEL_BANANA_LOCATIONS: usize = 4;
pub const CHANNEL_LEMON_LOCATIONS: usize = 5;

const OWN_BOARD: usize = 0;
const OPPONENT_BOARD: usize = 1;

/// Boolean tensor of shape `[N_BOARDS, N_SLOTS, N_CHANNELS]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    cells: [[[bool; N_CHANNELS]; N_SLOTS]; N_BOARDS],
}

impl Default for Observation {
    fn default() -> Self {
        Self {
            cells: [[[false; N_CHANNELS]; N_SLOTS]; N_BOARDS],
        }
    }
}

impl Observation {
    pub const SHAPE: [usize; 3] = [N_BOARDS, N_SLOTS, N_CHANNELS];

    pub fn shape(&self) -> [usize; 3] {
        Self::SHAPE
    }

    pub fn get(&self, board: usize, slot: usize, channel: usize) -> bool {
        self.cells[board][slot][channel]
    }

    fn set(&mut self, board: usize, slot: Slot, channel: usize) {
        self.cells[board][slot.index()][channel] = true;
    }

    /// Slots of `board` with `channel` set, in ascending order.
    pub fn slots_with(&self, board: usize, channel: usize) -> impl Iterator<Item = usize> + '_ {
        (0..N_SLOTS).filter(move |&slot| self.cells[board][slot][channel])
    }
}

/// Observation descriptor shared by both agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSpace {
    pub shape: [usize; 3],
}

impl Default for ObservationSpace {
    fn default() -> Self {
        Self {
            shape: Observation::SHAPE,
        }
    }
}

impl ObservationSpace {
    pub fn contains(&self, observation: &Observation) -> bool {
        observation.shape() == self.shape
    }
}

/// Discrete action descriptor: the action is the slot to stand on next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpace {
    pub n: usize,
}

impl Default for ActionSpace {
    fn default() -> Self {
        Self { n: N_SLOTS }
    }
}

impl ActionSpace {
    pub fn contains(&self, action: usize) -> bool {
        action < self.n
    }
}

/// Projects world state into `observer`'s frame, where its own board is
/// board 0 and the opponent's board is board 1.
pub(crate) fn encode(
    observer: AgentId,
    locations: &PerAgent<Slot>,
    boards: &PerAgent<Board>,
    visibility: &Visibility,
) -> Observation {
    let opponent = observer.other();
    let frame = |agent: AgentId| {
        if agent == observer {
            OWN_BOARD
        } else {
            OPPONENT_BOARD
        }
    };

    let mut obs = Observation::default();
    for board in obs.cells.iter_mut() {
        for slot in board.iter_mut() {
            slot[CHANNEL_STATIC_FALSE] = false;
            slot[CHANNEL_STATIC_TRUE] = true;
        }
    }

    for (agent, location) in locations.iter() {
        obs.set(frame(agent), *location, CHANNEL_AGENT_LOCATIONS);
    }

    for board_owner in AgentId::ALL {
        for slot in visibility.visible_to(observer, board_owner) {
            obs.set(frame(board_owner), *slot, CHANNEL_APPLE_LOCATIONS);
        }
    }

    for slot in &boards[opponent].bananas {
        obs.set(OPPONENT_BOARD, *slot, CHANNEL_BANANA_LOCATIONS);
    }
    for slot in &boards[opponent].lemons {
        obs.set(OPPONENT_BOARD, *slot, CHANNEL_LEMON_LOCATIONS);
    }

    obs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(i: usize) -> Slot {
        Slot::new(i).unwrap()
    }

    #[test]
    fn own_board_is_always_first() {
        let locations = PerAgent::new(slot(2), slot(7));
        let boards = PerAgent::<Board>::default();
        let visibility = Visibility::default();

        let p1 = encode(AgentId::Player1, &locations, &boards, &visibility);
        let p2 = encode(AgentId::Player2, &locations, &boards, &visibility);

        assert!(p1.get(0, 2, CHANNEL_AGENT_LOCATIONS));
        assert!(p1.get(1, 7, CHANNEL_AGENT_LOCATIONS));
        assert!(p2.get(0, 7, CHANNEL_AGENT_LOCATIONS));
        assert!(p2.get(1, 2, CHANNEL_AGENT_LOCATIONS));
        assert_eq!(p1.slots_with(0, CHANNEL_AGENT_LOCATIONS).count(), 1);
    }

    #[test]
    fn static_channels_are_constant() {
        let obs = encode(
            AgentId::Player2,
            &PerAgent::splat(slot(0)),
            &PerAgent::default(),
            &Visibility::default(),
        );
        for board in 0..N_BOARDS {
            for s in 0..N_SLOTS {
                assert!(!obs.get(board, s, CHANNEL_STATIC_FALSE));
                assert!(obs.get(board, s, CHANNEL_STATIC_TRUE));
            }
        }
        assert!(ObservationSpace::default().contains(&obs));
    }

    #[test]
    fn apples_follow_the_observers_visibility() {
        let mut visibility = Visibility::default();
        visibility.reveal(AgentId::Player2, AgentId::Player1, slot(5));
        visibility.reveal(AgentId::Player2, AgentId::Player2, slot(5));
        visibility.conceal(AgentId::Player2, AgentId::Player2, slot(5));
        let locations = PerAgent::new(slot(0), slot(1));
        let boards = PerAgent::<Board>::default();

        let p1 = encode(AgentId::Player1, &locations, &boards, &visibility);
        let p2 = encode(AgentId::Player2, &locations, &boards, &visibility);

        assert_eq!(p1.slots_with(0, CHANNEL_APPLE_LOCATIONS).count(), 0);
        assert_eq!(p1.slots_with(1, CHANNEL_APPLE_LOCATIONS).count(), 0);
        // Player 2 still sees the entry on player 1's board, which is its board 1.
        assert_eq!(p2.slots_with(1, CHANNEL_APPLE_LOCATIONS).collect::<Vec<_>>(), vec![5]);
        assert_eq!(p2.slots_with(0, CHANNEL_APPLE_LOCATIONS).count(), 0);
    }

    #[test]
    fn only_opponent_bananas_and_lemons_are_shown() {
        let mut boards = PerAgent::<Board>::default();
        boards[AgentId::Player1].bananas.insert(slot(3));
        boards[AgentId::Player2].lemons.insert(slot(4));
        boards[AgentId::Player2].lemons.insert(slot(6));
        let locations = PerAgent::new(slot(0), slot(1));
        let visibility = Visibility::default();

        let p1 = encode(AgentId::Player1, &locations, &boards, &visibility);
        let p2 = encode(AgentId::Player2, &locations, &boards, &visibility);

        assert_eq!(p1.slots_with(1, CHANNEL_BANANA_LOCATIONS).count(), 0);
        assert_eq!(
            p1.slots_with(1, CHANNEL_LEMON_LOCATIONS).collect::<Vec<_>>(),
            vec![4, 6]
        );
        assert_eq!(p2.slots_with(1, CHANNEL_BANANA_LOCATIONS).collect::<Vec<_>>(), vec![3]);
        assert_eq!(p2.slots_with(1, CHANNEL_LEMON_LOCATIONS).count(), 0);
        for board in 0..N_BOARDS {
            assert_eq!(p1.slots_with(board, CHANNEL_BANANA_LOCATIONS).count(), 0);
        }
        assert_eq!(p2.slots_with(0, CHANNEL_LEMON_LOCATIONS).count(), 0);
    }
}
