use anyhow::{Context, Result, bail};
use fruit_slots::{
    EnvConfig, EpisodeMonitor, FruitSlotsEnv, HomePaths, PerAgent, PolicyKind, save_summary,
};
use tracing::{debug, info};

pub(super) fn run_rollout(
    config: EnvConfig,
    kind: PolicyKind,
    episodes: u64,
    save: bool,
    paths: &HomePaths,
) -> Result<()> {
    if episodes == 0 {
        bail!("episodes must be at least 1");
    }

    let mut env = FruitSlotsEnv::new(config).context("building environment")?;
    let mut policy = kind.build(config.seed.map(|s| s.wrapping_add(1)));
    let mut monitor = EpisodeMonitor::new(env.loggable_metrics());

    info!(episodes, policy = %kind, "starting rollout");
    for episode in 1..=episodes {
        let mut observations = env.reset(None);
        loop {
            let actions = PerAgent::from_fn(|agent| policy.act(agent, &observations[agent]));
            let result = env.step(actions).context("stepping environment")?;
            observations = result.observations;
            if result.dones.values().all(|done| *done) {
                monitor.record(env.i_step(), &result.infos);
                break;
            }
        }
        debug!(episode, "episode finished");
    }

    println!("{} episode(s):", monitor.total_episodes());
    for (key, value) in monitor.means() {
        println!(" - {} = {:.3}", key, value);
    }

    if save {
        let summary = monitor.summary(format!("rollout-{}", kind));
        let path = save_summary(&paths.logs(), &summary).context("saving rollout summary")?;
        info!("Wrote rollout summary to {}", path.display());
    }
    Ok(())
}
