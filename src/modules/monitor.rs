use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modules::error::EnvError;
use crate::modules::metrics::{AgentInfo, Metric};
use crate::modules::slot::PerAgent;

/// Finished episodes kept for the rolling means.
pub const EPISODE_BUFFER_LEN: usize = 100;
/// Key of the mean episode length in [`EpisodeMonitor::means`].
pub const EPISODE_LENGTH_KEY: &str = "rollout/mean_episode_length";

/// Final metrics of one agent in one finished episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub length: u64,
    pub values: Vec<(Metric, f64)>,
}

impl EpisodeRecord {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, v)| *v)
    }
}

/// Collects per-agent episode outcomes and reports rolling means of every
/// loggable metric, one record per agent per episode.
#[derive(Debug, Clone)]
pub struct EpisodeMonitor {
    loggable_metrics: &'static [Metric],
    episodes: VecDeque<EpisodeRecord>,
    total_episodes: u64,
}

impl EpisodeMonitor {
    pub fn new(loggable_metrics: &'static [Metric]) -> Self {
        Self {
            loggable_metrics,
            episodes: VecDeque::with_capacity(EPISODE_BUFFER_LEN),
            total_episodes: 0,
        }
    }

    /// Records the last infos of a finished episode.
    pub fn record(&mut self, length: u64, infos: &PerAgent<AgentInfo>) {
        for info in infos.values() {
            if self.episodes.len() == EPISODE_BUFFER_LEN {
                self.episodes.pop_front();
            }
            self.episodes.push_back(EpisodeRecord {
                length,
                values: info.values().collect(),
            });
        }
        self.total_episodes += 1;
    }

    pub fn total_episodes(&self) -> u64 {
        self.total_episodes
    }

    pub fn buffered(&self) -> usize {
        self.episodes.len()
    }

    /// Mean step count of the buffered episodes.
    pub fn mean_length(&self) -> Option<f64> {
        if self.episodes.is_empty() {
            return None;
        }
        let total: u64 = self.episodes.iter().map(|record| record.length).sum();
        Some(total as f64 / self.episodes.len() as f64)
    }

    pub fn mean(&self, metric: Metric) -> Option<f64> {
        let values: Vec<f64> = self
            .episodes
            .iter()
            .filter_map(|record| record.get(metric))
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// `rollout/mean_<metric>` for every loggable metric with data, then
    /// `rollout/mean_episode_length`.
    pub fn means(&self) -> Vec<(String, f64)> {
        let mut means: Vec<(String, f64)> = self
            .loggable_metrics
            .iter()
            .filter_map(|metric| {
                self.mean(*metric)
                    .map(|value| (format!("rollout/mean_{}", metric.name()), value))
            })
            .collect();
        if let Some(length) = self.mean_length() {
            means.push((EPISODE_LENGTH_KEY.to_string(), length));
        }
        means
    }

    pub fn summary(&self, label: impl Into<String>) -> RolloutSummary {
        RolloutSummary {
            label: label.into(),
            created_at: Utc::now(),
            episodes: self.total_episodes,
            means: self.means(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutSummary {
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub episodes: u64,
    pub means: Vec<(String, f64)>,
}

pub fn summary_file_path(logs_dir: &Path, summary: &RolloutSummary) -> PathBuf {
    let stamp = summary.created_at.format("%Y%m%d-%H%M%S");
    logs_dir.join(format!("{}_{}.json", summary.label, stamp))
}

pub fn save_summary(logs_dir: &Path, summary: &RolloutSummary) -> Result<PathBuf, EnvError> {
    fs::create_dir_all(logs_dir)?;
    let path = summary_file_path(logs_dir, summary);
    let json = serde_json::to_vec_pretty(summary)?;
    fs::write(&path, json)?;
    Ok(path)
}

pub fn load_summary(path: &Path) -> Result<RolloutSummary, EnvError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::metrics::AgentMetrics;

    fn info(reward: f64, banana: f64, loggable: &'static [Metric]) -> AgentInfo {
        let metrics = AgentMetrics {
            cumulative_reward: reward,
            cumulative_banana_reward: banana,
            ..AgentMetrics::default()
        };
        AgentInfo::new(metrics, loggable)
    }

    #[test]
    fn means_cover_only_loggable_metrics() {
        let loggable = Metric::enabled(true, false);
        let mut monitor = EpisodeMonitor::new(loggable);
        monitor.record(
            501,
            &PerAgent::new(info(10.0, 5.0, loggable), info(20.0, 5.0, loggable)),
        );
        monitor.record(
            301,
            &PerAgent::new(info(30.0, 0.0, loggable), info(40.0, 0.0, loggable)),
        );

        assert_eq!(monitor.total_episodes(), 2);
        assert_eq!(monitor.mean(Metric::CumulativeReward), Some(25.0));
        assert_eq!(monitor.mean(Metric::CumulativeBananaReward), Some(2.5));
        assert_eq!(monitor.mean(Metric::CumulativeLemonReward), None);

        assert_eq!(monitor.mean_length(), Some(401.0));

        let means = monitor.means();
        assert_eq!(means.len(), 5);
        assert_eq!(means[0].0, "rollout/mean_cumulative_reward");
        assert_eq!(means[4], (EPISODE_LENGTH_KEY.to_string(), 401.0));
    }

    #[test]
    fn empty_monitor_reports_nothing() {
        let monitor = EpisodeMonitor::new(Metric::enabled(true, true));
        assert_eq!(monitor.mean_length(), None);
        assert!(monitor.means().is_empty());
    }

    #[test]
    fn buffer_is_bounded() {
        let loggable = Metric::enabled(false, false);
        let mut monitor = EpisodeMonitor::new(loggable);
        for i in 0..(EPISODE_BUFFER_LEN as u64) {
            let reward = i as f64;
            let infos = PerAgent::splat(info(reward, 0.0, loggable));
            monitor.record(1, &infos);
        }
        assert_eq!(monitor.buffered(), EPISODE_BUFFER_LEN);
        assert_eq!(monitor.total_episodes(), EPISODE_BUFFER_LEN as u64);
        // Only the last 50 episodes (two records each) remain.
        assert_eq!(monitor.mean(Metric::CumulativeReward), Some(74.5));
    }

    #[test]
    fn summary_is_saved_under_logs() {
        let loggable = Metric::enabled(true, true);
        let mut monitor = EpisodeMonitor::new(loggable);
        monitor.record(
            501,
            &PerAgent::new(info(1.0, 0.0, loggable), info(3.0, 0.0, loggable)),
        );
        let summary = monitor.summary("rollout-greedy");

        let dir =
            std::env::temp_dir().join(format!("fruit_slots_monitor_{}", std::process::id()));
        let path = save_summary(&dir, &summary).unwrap();
        assert!(path.starts_with(&dir));
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with("rollout-greedy_"));

        let loaded = load_summary(&path).unwrap();
        assert_eq!(loaded.episodes, 1);
        assert_eq!(loaded.means, summary.means);
        let _ = fs::remove_dir_all(&dir);
    }
}
