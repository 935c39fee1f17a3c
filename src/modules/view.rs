use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::modules::env::FruitSlotsEnv;
use crate::modules::error::EnvError;
use crate::modules::fruit::{Board, FruitKind};
use crate::modules::metrics::AgentMetrics;
use crate::modules::slot::{AgentId, N_SLOTS, PerAgent, Slot};

/// Text view of both boards, player 1's board on the first row.
///
/// Later draws win when several markers share a slot: agents, then apples,
/// then bananas, then lemons.
pub fn render(env: &FruitSlotsEnv) -> String {
    let mut rows = [[' '; N_SLOTS]; 2];

    for agent in AgentId::ALL {
        let location = env.agent_location(agent);
        rows[agent.index()][location.index()] = agent.marker();
    }

    for owner in AgentId::ALL {
        let row = &mut rows[owner.index()];
        for slot in &env.board(owner).apples {
            let visible = env.visibility().sees(owner, owner, *slot);
            let marker = FruitKind::Apple.marker();
            row[slot.index()] = if visible {
                marker
            } else {
                marker.to_ascii_lowercase()
            };
        }
    }

    for kind in [FruitKind::Banana, FruitKind::Lemon] {
        for owner in AgentId::ALL {
            for slot in env.board(owner).fruits(kind) {
                rows[owner.index()][slot.index()] = kind.marker();
            }
        }
    }

    let line = "-".repeat(N_SLOTS);
    let [first, second] = rows.map(|row| row.iter().collect::<String>());
    format!("/{line}\\\n|{first}|\n|{second}|\n\\{line}/")
}

/// Serializable copy of the engine state, for export and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvSnapshot {
    pub i_step: u64,
    pub agent_locations: PerAgent<Slot>,
    pub boards: PerAgent<Board>,
    /// Apple entries each agent can see, per board owner.
    pub visible_apples: PerAgent<PerAgent<BTreeSet<Slot>>>,
    pub metrics: PerAgent<AgentMetrics>,
}

impl EnvSnapshot {
    pub fn capture(env: &FruitSlotsEnv) -> Self {
        Self {
            i_step: env.i_step(),
            agent_locations: *env.agent_locations(),
            boards: PerAgent::from_fn(|owner| env.board(owner).clone()),
            visible_apples: PerAgent::from_fn(|observer| {
                PerAgent::from_fn(|owner| env.visibility().visible_to(observer, owner).clone())
            }),
            metrics: PerAgent::from_fn(|agent| *env.metrics(agent)),
        }
    }
}

pub fn snapshot_file_path(dir: &Path, i_step: u64) -> PathBuf {
    dir.join(format!("step_{:06}.json", i_step))
}

pub fn save_snapshot(dir: &Path, snapshot: &EnvSnapshot) -> Result<PathBuf, EnvError> {
    fs::create_dir_all(dir)?;
    let path = snapshot_file_path(dir, snapshot.i_step);
    let json = serde_json::to_vec_pretty(snapshot)?;
    fs::write(&path, json)?;
    Ok(path)
}

pub fn load_snapshot(path: &Path) -> Result<Option<EnvSnapshot>, EnvError> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    let snapshot = serde_json::from_slice(&bytes)?;
    Ok(Some(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::config::EnvConfig;

    fn slot(i: usize) -> Slot {
        Slot::new(i).unwrap()
    }

    fn env_at(p1: usize, p2: usize) -> FruitSlotsEnv {
        let mut env = FruitSlotsEnv::new(EnvConfig::default().with_seed(17)).unwrap();
        env.step(PerAgent::new(p1, p2)).unwrap();
        env
    }

    #[test]
    fn renders_two_bordered_rows() {
        let env = env_at(0, 9);
        let text = env.render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "/----------\\");
        assert_eq!(lines[1], "|1         |");
        assert_eq!(lines[2], "|         2|");
        assert_eq!(lines[3], "\\----------/");
    }

    #[test]
    fn apples_are_upper_case_only_for_their_observer() {
        let mut env = env_at(0, 0);
        for owner in AgentId::ALL {
            env.boards_mut()[owner].apples.insert(slot(4));
            env.visibility_mut().reveal(AgentId::Player2, owner, slot(4));
        }

        let text = env.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "|1   a     |");
        assert_eq!(lines[2], "|2   A     |");
    }

    #[test]
    fn lemons_draw_over_everything() {
        let mut env = env_at(3, 0);
        let board = &mut env.boards_mut()[AgentId::Player1];
        board.apples.insert(slot(3));
        board.bananas.insert(slot(5));
        board.lemons.insert(slot(3));
        board.lemons.insert(slot(5));

        let text = env.render();
        assert_eq!(text.lines().nth(1), Some("|   L L    |"));
    }

    #[test]
    fn snapshot_round_trips_through_disk() {
        let mut env = env_at(1, 2);
        env.boards_mut()[AgentId::Player2].lemons.insert(slot(8));
        let snapshot = EnvSnapshot::capture(&env);

        let dir = std::env::temp_dir().join(format!("fruit_slots_view_{}", std::process::id()));
        let path = save_snapshot(&dir, &snapshot).unwrap();
        assert_eq!(path, snapshot_file_path(&dir, 1));

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded, Some(snapshot));
        assert_eq!(load_snapshot(&dir.join("missing.json")).unwrap(), None);
        let _ = fs::remove_dir_all(&dir);
    }
}
