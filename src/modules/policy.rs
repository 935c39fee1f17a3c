use std::fmt;

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::modules::observation::{
    CHANNEL_AGENT_LOCATIONS, CHANNEL_APPLE_LOCATIONS, Observation,
};
use crate::modules::slot::{AgentId, N_SLOTS};

/// Boundary to whatever picks actions: a trained model or a scripted player.
pub trait Policy {
    /// Slot the agent should move to, given its own observation.
    fn act(&mut self, agent: AgentId, observation: &Observation) -> usize;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Uniformly random slot every step
    Random,
    /// Walk to a visible apple on the own board, otherwise stay put
    Greedy,
}

impl PolicyKind {
    pub const fn label(self) -> &'static str {
        match self {
            PolicyKind::Random => "random",
            PolicyKind::Greedy => "greedy",
        }
    }

    pub fn build(self, seed: Option<u64>) -> Box<dyn Policy> {
        match self {
            PolicyKind::Random => Box::new(RandomPolicy::new(seed)),
            PolicyKind::Greedy => Box::new(GreedyPolicy),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _agent: AgentId, _observation: &Observation) -> usize {
        self.rng.gen_range(0..N_SLOTS)
    }
}

/// Eats the lowest visible apple on its own board; never moves otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyPolicy;

impl Policy for GreedyPolicy {
    fn act(&mut self, _agent: AgentId, observation: &Observation) -> usize {
        let own_board = 0;
        if let Some(apple) = observation
            .slots_with(own_board, CHANNEL_APPLE_LOCATIONS)
            .next()
        {
            return apple;
        }
        observation
            .slots_with(own_board, CHANNEL_AGENT_LOCATIONS)
            .next()
            .unwrap_or(0)
    }
}
