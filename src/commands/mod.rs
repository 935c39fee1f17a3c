use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fruit_slots::{
    AgentId, EnvConfig, EnvSnapshot, Event, FruitSlotsEnv, HomePaths, PerAgent, PolicyKind,
    StepResult, save_snapshot,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod model;
mod rollout;

use model::run_model_path;
use rollout::run_rollout;

#[derive(Parser)]
#[command(
    name = "fruit-slots",
    version,
    about = "Fruit Slots: a two-agent reward-shaping testbed",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Play one episode and print the board after every step
    Play {
        #[command(flatten)]
        env: EnvArgs,
        /// Policy driving both agents
        #[arg(long, default_value_t = PolicyKind::Greedy, value_enum)]
        policy: PolicyKind,
        /// Delay between steps in milliseconds
        #[arg(short = 'd', long, default_value_t = 0)]
        delay_ms: u64,
        /// Write a JSON snapshot of the world after every step under the logs directory
        #[arg(long, default_value_t = false)]
        snapshots: bool,
    },
    /// Run many episodes and report mean loggable metrics
    Rollout {
        #[command(flatten)]
        env: EnvArgs,
        /// Policy driving both agents
        #[arg(long, default_value_t = PolicyKind::Random, value_enum)]
        policy: PolicyKind,
        /// Number of episodes to run
        #[arg(short = 'e', long, default_value_t = 10)]
        episodes: u64,
        /// Skip writing the summary JSON under the logs directory
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Print where the trained model for a configuration lives
    ModelPath {
        #[command(flatten)]
        env: EnvArgs,
        /// Agent index for per-agent models (omit for the shared model)
        #[arg(long)]
        agent: Option<usize>,
    },
}

#[derive(Args, Clone, Copy, Debug)]
pub struct EnvArgs {
    /// Disable banana production (also requires --no-lemons)
    #[arg(long, default_value_t = false)]
    no_bananas: bool,
    /// Disable lemon production
    #[arg(long, default_value_t = false)]
    no_lemons: bool,
    /// RNG seed for reproducible episodes
    #[arg(long)]
    seed: Option<u64>,
}

impl EnvArgs {
    pub fn config(self) -> EnvConfig {
        EnvConfig {
            produce_bananas: !self.no_bananas,
            produce_lemons: !self.no_lemons,
            seed: self.seed,
        }
    }
}

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let paths = HomePaths::from_env();
    if let Err(err) = dispatch(cli.command, &paths) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn dispatch(command: Command, paths: &HomePaths) -> Result<()> {
    match command {
        Command::Play {
            env,
            policy,
            delay_ms,
            snapshots,
        } => {
            let snapshot_dir = snapshots.then(|| paths.logs().join("snapshots"));
            run_play(
                env.config(),
                policy,
                Duration::from_millis(delay_ms),
                snapshot_dir.as_deref(),
            )
        }
        Command::Rollout {
            env,
            policy,
            episodes,
            no_save,
        } => run_rollout(env.config(), policy, episodes, !no_save, paths),
        Command::ModelPath { env, agent } => run_model_path(env.config(), agent, paths),
    }
}

fn run_play(
    config: EnvConfig,
    policy: PolicyKind,
    delay: Duration,
    snapshot_dir: Option<&Path>,
) -> Result<()> {
    let mut env = FruitSlotsEnv::new(config).context("building environment")?;
    let mut policy = policy.build(config.seed.map(|s| s.wrapping_add(1)));

    info!("Starting playing...");
    let mut observations = env.reset(None);
    println!("{}", env.render());
    println!();

    loop {
        let actions = PerAgent::from_fn(|agent| policy.act(agent, &observations[agent]));
        let result = env.step(actions).context("stepping environment")?;
        print_step(&env, &actions, &result);
        if let Some(dir) = snapshot_dir {
            persist_snapshot(&env, dir);
        }
        observations = result.observations;

        if result.dones.values().all(|done| *done) {
            break;
        }
        if delay > Duration::ZERO {
            std::thread::sleep(delay);
        }
    }

    for agent in AgentId::ALL {
        let metrics = env.metrics(agent);
        info!(
            %agent,
            reward = metrics.cumulative_reward,
            visible_apples = metrics.cumulative_visible_apple_reward,
            invisible_apples = metrics.cumulative_invisible_apple_reward,
            "episode totals"
        );
    }
    info!("Done playing.");
    Ok(())
}

fn persist_snapshot(env: &FruitSlotsEnv, dir: &Path) {
    if let Err(err) = save_snapshot(dir, &EnvSnapshot::capture(env)) {
        warn!("failed to write step snapshot: {}", err);
    }
}

fn print_step(env: &FruitSlotsEnv, actions: &PerAgent<usize>, result: &StepResult) {
    println!(
        "Actions: {} / {}",
        actions[AgentId::Player1],
        actions[AgentId::Player2]
    );
    println!("{}", env.render());
    println!(
        "Rewards: {} / {}",
        result.rewards[AgentId::Player1],
        result.rewards[AgentId::Player2]
    );
    for event in &result.events {
        println!(" - {}", describe_event(event));
    }
    println!();
}

fn describe_event(event: &Event) -> String {
    match event {
        Event::AppleEaten {
            agent,
            slot,
            visible,
        } => {
            let kind = if *visible { "visible" } else { "invisible" };
            format!("{} ate a {} apple at slot {}", agent, kind, slot)
        }
        Event::BananaEaten { agent, slot } => {
            format!("{} ate a banana at slot {}", agent, slot)
        }
        Event::LemonEaten { agent, slot } => {
            format!("{} ate a lemon at slot {}", agent, slot)
        }
        Event::FruitsCleared { i_step } => format!("fruits cleared at step {}", i_step),
        Event::ApplePairSpawned { slot, visible_to } => {
            format!("apple pair spawned at slot {} (visible to {})", slot, visible_to)
        }
        Event::BananaSpawned { board, slot } => {
            format!("banana spawned on {}'s board at slot {}", board, slot)
        }
        Event::LemonsSpawned { board, slots } => {
            let slots: Vec<String> = slots.iter().map(|s| s.to_string()).collect();
            format!(
                "lemons spawned on {}'s board at slots {}",
                board,
                slots.join(",")
            )
        }
    }
}
