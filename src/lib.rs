pub mod modules;

pub use modules::config::{EnvConfig, HOME_PATH_VAR, HomePaths};
pub use modules::env::{
    BANANA_PERIOD, EPISODE_LENGTH, Event, FRUIT_PERIOD, FruitSlotsEnv, LEMON_PERIOD,
    LEMONS_PER_SPAWN, StepResult,
};
pub use modules::error::EnvError;
pub use modules::fruit::{
    Board, FruitKind, REWARD_APPLE, REWARD_BANANA, REWARD_LEMON, REWARD_NOTHING, Visibility,
};
pub use modules::metrics::{AgentInfo, AgentMetrics, LOGGABLE_METRICS_KEY, Metric};
pub use modules::monitor::{
    EPISODE_BUFFER_LEN, EPISODE_LENGTH_KEY, EpisodeMonitor, EpisodeRecord, RolloutSummary,
    load_summary, save_summary, summary_file_path,
};
pub use modules::observation::{
    ActionSpace, CHANNEL_AGENT_LOCATIONS, CHANNEL_APPLE_LOCATIONS, CHANNEL_BANANA_LOCATIONS,
    CHANNEL_LEMON_LOCATIONS, CHANNEL_STATIC_FALSE, CHANNEL_STATIC_TRUE, N_BOARDS, N_CHANNELS,
    Observation, ObservationSpace,
};
pub use modules::policy::{GreedyPolicy, Policy, PolicyKind, RandomPolicy};
pub use modules::slot::{AgentId, N_SLOTS, PerAgent, Slot};
pub use modules::view::{
    EnvSnapshot, load_snapshot, render, save_snapshot, snapshot_file_path,
};
