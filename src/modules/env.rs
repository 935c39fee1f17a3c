use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::modules::config::EnvConfig;
use crate::modules::error::EnvError;
use crate::modules::fruit::{
    Board, FruitKind, REWARD_APPLE, REWARD_BANANA, REWARD_LEMON, REWARD_NOTHING, Visibility,
};
use crate::modules::metrics::{AgentInfo, AgentMetrics, Metric};
use crate::modules::observation::{self, ActionSpace, Observation, ObservationSpace};
use crate::modules::slot::{AgentId, PerAgent, Slot};
use crate::modules::view;

/// Steps after which both agents are done.
pub const EPISODE_LENGTH: u64 = 500;
/// Every fruit is cleared, then one spawn event happens, on this cadence.
pub const FRUIT_PERIOD: u64 = 5;
/// Cadence of banana spawns, when bananas are enabled.
pub const BANANA_PERIOD: u64 = 25;
/// Cadence of banana-plus-lemons spawns, when lemons are enabled.
pub const LEMON_PERIOD: u64 = 100;
/// Lemons placed on the lemon side per lemon spawn.
pub const LEMONS_PER_SPAWN: usize = 5;

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    AppleEaten {
        agent: AgentId,
        slot: Slot,
        visible: bool,
    },
    BananaEaten {
        agent: AgentId,
        slot: Slot,
    },
    LemonEaten {
        agent: AgentId,
        slot: Slot,
    },
    FruitsCleared {
        i_step: u64,
    },
    ApplePairSpawned {
        slot: Slot,
        visible_to: AgentId,
    },
    BananaSpawned {
        board: AgentId,
        slot: Slot,
    },
    LemonsSpawned {
        board: AgentId,
        slots: Vec<Slot>,
    },
}

#[derive(Clone, Debug)]
pub struct StepResult {
    pub observations: PerAgent<Observation>,
    pub rewards: PerAgent<f64>,
    pub dones: PerAgent<bool>,
    pub infos: PerAgent<AgentInfo>,
    pub events: Vec<Event>,
}

/// The Fruit Slots engine: two agents, two boards, one seeded generator.
///
/// `step` is the only mutating entry point besides `reset`; callers running
/// rollouts in parallel should own one engine per rollout.
#[derive(Debug)]
pub struct FruitSlotsEnv {
    config: EnvConfig,
    loggable_metrics: &'static [Metric],
    rng: StdRng,
    i_step: u64,
    finished: bool,
    locations: PerAgent<Slot>,
    boards: PerAgent<Board>,
    visibility: Visibility,
    metrics: PerAgent<AgentMetrics>,
}

impl FruitSlotsEnv {
    pub fn new(config: EnvConfig) -> Result<Self, EnvError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut env = Self {
            config,
            loggable_metrics: Metric::enabled(config.produce_bananas, config.produce_lemons),
            rng,
            i_step: 0,
            finished: false,
            locations: PerAgent::splat(Slot::FIRST),
            boards: PerAgent::default(),
            visibility: Visibility::default(),
            metrics: PerAgent::default(),
        };
        env.reset(None);
        Ok(env)
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn action_space(&self) -> ActionSpace {
        ActionSpace::default()
    }

    pub fn observation_space(&self) -> ObservationSpace {
        ObservationSpace::default()
    }

    pub fn i_step(&self) -> u64 {
        self.i_step
    }

    /// Whether a step has already reported both agents done.
    pub fn is_done(&self) -> bool {
        self.finished
    }

    pub fn agent_location(&self, agent: AgentId) -> Slot {
        self.locations[agent]
    }

    pub fn agent_locations(&self) -> &PerAgent<Slot> {
        &self.locations
    }

    pub fn board(&self, owner: AgentId) -> &Board {
        &self.boards[owner]
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn metrics(&self, agent: AgentId) -> &AgentMetrics {
        &self.metrics[agent]
    }

    pub fn loggable_metrics(&self) -> &'static [Metric] {
        self.loggable_metrics
    }

    /// Starts a new episode. `Some(seed)` reseeds the generator; `None`
    /// continues the current random stream.
    pub fn reset(&mut self, seed: Option<u64>) -> PerAgent<Observation> {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.metrics = PerAgent::default();
        let rng = &mut self.rng;
        // Agents may start on the same slot.
        self.locations = PerAgent::from_fn(|_| Slot::random(rng));
        self.i_step = 0;
        self.finished = false;
        self.remove_all_fruits();
        debug!(
            player_1 = %self.locations[AgentId::Player1],
            player_2 = %self.locations[AgentId::Player2],
            "episode reset"
        );
        self.observations()
    }

    pub fn observe(&self, agent: AgentId) -> Observation {
        observation::encode(agent, &self.locations, &self.boards, &self.visibility)
    }

    pub fn observations(&self) -> PerAgent<Observation> {
        PerAgent::from_fn(|agent| self.observe(agent))
    }

    pub fn render(&self) -> String {
        view::render(self)
    }

    /// Advances the world by one synchronized step. Each action is the slot
    /// the agent moves to.
    pub fn step(&mut self, actions: PerAgent<usize>) -> Result<StepResult, EnvError> {
        if self.finished {
            return Err(EnvError::EpisodeFinished {
                i_step: self.i_step,
            });
        }
        let targets = PerAgent::new(
            parse_action(AgentId::Player1, actions[AgentId::Player1])?,
            parse_action(AgentId::Player2, actions[AgentId::Player2])?,
        );

        let done = self.i_step >= EPISODE_LENGTH;
        let candidates = Self::spawn_candidates(&targets);
        let mut rewards = PerAgent::splat(0.0);
        let mut events = Vec::new();

        for agent in AgentId::ALL {
            self.resolve_agent(agent, targets[agent], &mut rewards, &mut events);
        }

        for agent in AgentId::ALL {
            self.metrics[agent].add(Metric::CumulativeReward, rewards[agent]);
        }
        let infos =
            PerAgent::from_fn(|agent| AgentInfo::new(self.metrics[agent], self.loggable_metrics));

        self.i_step += 1;
        self.schedule_fruits(&candidates, &mut events);
        if done {
            self.finished = true;
            debug!(i_step = self.i_step, "episode finished");
        }
        trace!(
            i_step = self.i_step,
            reward_1 = rewards[AgentId::Player1],
            reward_2 = rewards[AgentId::Player2],
            "step resolved"
        );

        Ok(StepResult {
            observations: self.observations(),
            rewards,
            dones: PerAgent::splat(done),
            infos,
            events,
        })
    }

    /// Slots not chosen as an action this step. Actions are the agents' new
    /// locations, so slots just vacated stay eligible.
    fn spawn_candidates(targets: &PerAgent<Slot>) -> Vec<Slot> {
        Slot::all()
            .filter(|slot| !targets.values().any(|t| t == slot))
            .collect()
    }

    fn resolve_agent(
        &mut self,
        agent: AgentId,
        slot: Slot,
        rewards: &mut PerAgent<f64>,
        events: &mut Vec<Event>,
    ) {
        let other = agent.other();

        if self.boards[agent].fruits_mut(FruitKind::Apple).remove(&slot) {
            rewards[agent] += REWARD_APPLE;
            let visible = self.visibility.conceal(agent, agent, slot);
            if visible {
                self.metrics[agent].add(Metric::CumulativeVisibleAppleReward, REWARD_APPLE);
            } else {
                // Only the other agent could see this apple; drop its stale entry.
                self.visibility.conceal(other, agent, slot);
                self.metrics[agent].add(Metric::CumulativeInvisibleAppleReward, REWARD_APPLE);
            }
            debug!(%agent, %slot, visible, "apple eaten");
            events.push(Event::AppleEaten {
                agent,
                slot,
                visible,
            });
        }

        if self.boards[agent].fruits_mut(FruitKind::Banana).remove(&slot) {
            for receiver in [agent, other] {
                rewards[receiver] += REWARD_BANANA;
                self.metrics[receiver].add(Metric::CumulativeBananaReward, REWARD_BANANA);
            }
            debug!(%agent, %slot, "banana eaten");
            events.push(Event::BananaEaten { agent, slot });
        }

        if self.boards[agent].fruits_mut(FruitKind::Lemon).remove(&slot) {
            rewards[agent] = REWARD_NOTHING;
            rewards[other] = REWARD_LEMON;
            self.metrics[other].add(Metric::CumulativeLemonReward, REWARD_LEMON);
            debug!(%agent, %slot, "lemon eaten");
            events.push(Event::LemonEaten { agent, slot });
        }

        if rewards[agent] == 0.0 {
            rewards[agent] = REWARD_NOTHING;
        }

        self.locations[agent] = slot;
    }

    fn schedule_fruits(&mut self, candidates: &[Slot], events: &mut Vec<Event>) {
        if self.i_step % FRUIT_PERIOD != 0 {
            return;
        }
        self.remove_all_fruits();
        events.push(Event::FruitsCleared {
            i_step: self.i_step,
        });

        let mut pool = candidates.to_vec();
        if self.config.produce_lemons && self.i_step % LEMON_PERIOD == 0 {
            let banana_side = random_agent(&mut self.rng);
            let lemon_side = banana_side.other();
            let (picked, _) = pool.partial_shuffle(&mut self.rng, LEMONS_PER_SPAWN + 1);
            let Some((&banana, lemons)) = picked.split_first() else {
                return;
            };
            self.boards[banana_side].bananas.insert(banana);
            self.boards[lemon_side].lemons.extend(lemons.iter().copied());
            debug!(%banana_side, %banana, ?lemons, "banana and lemons spawned");
            events.push(Event::BananaSpawned {
                board: banana_side,
                slot: banana,
            });
            events.push(Event::LemonsSpawned {
                board: lemon_side,
                slots: lemons.to_vec(),
            });
        } else if self.config.produce_bananas && self.i_step % BANANA_PERIOD == 0 {
            let Some(&banana) = pool.choose(&mut self.rng) else {
                return;
            };
            let side = random_agent(&mut self.rng);
            self.boards[side].bananas.insert(banana);
            debug!(%side, %banana, "banana spawned");
            events.push(Event::BananaSpawned {
                board: side,
                slot: banana,
            });
        } else {
            let Some(&apple) = pool.choose(&mut self.rng) else {
                return;
            };
            for owner in AgentId::ALL {
                self.boards[owner].apples.insert(apple);
            }
            let observer = random_agent(&mut self.rng);
            for owner in AgentId::ALL {
                self.visibility.reveal(observer, owner, apple);
            }
            debug!(%apple, %observer, "apple pair spawned");
            events.push(Event::ApplePairSpawned {
                slot: apple,
                visible_to: observer,
            });
        }
    }

    fn remove_all_fruits(&mut self) {
        for owner in AgentId::ALL {
            self.boards[owner].clear();
        }
        self.visibility.clear();
    }

    #[cfg(test)]
    pub(crate) fn boards_mut(&mut self) -> &mut PerAgent<Board> {
        &mut self.boards
    }

    #[cfg(test)]
    pub(crate) fn visibility_mut(&mut self) -> &mut Visibility {
        &mut self.visibility
    }

    #[cfg(test)]
    pub(crate) fn set_i_step(&mut self, i_step: u64) {
        self.i_step = i_step;
    }
}

fn parse_action(agent: AgentId, action: usize) -> Result<Slot, EnvError> {
    Slot::new(action).ok_or(EnvError::InvalidAction { agent, action })
}

fn random_agent(rng: &mut StdRng) -> AgentId {
    if rng.gen_bool(0.5) {
        AgentId::Player2
    } else {
        AgentId::Player1
    }
}
