use anyhow::Result;
use fruit_slots::{EnvConfig, HomePaths};

pub(super) fn run_model_path(
    config: EnvConfig,
    agent: Option<usize>,
    paths: &HomePaths,
) -> Result<()> {
    config.validate()?;
    let path = paths.agent_model_path(agent, &config);
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("note: no model at this path yet; train before you can use the agents");
    }
    Ok(())
}
