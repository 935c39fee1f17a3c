use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which an info record lists its enabled metrics.
pub const LOGGABLE_METRICS_KEY: &str = "loggable_metrics";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CumulativeReward,
    CumulativeVisibleAppleReward,
    CumulativeInvisibleAppleReward,
    CumulativeBananaReward,
    CumulativeLemonReward,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::CumulativeReward,
        Metric::CumulativeVisibleAppleReward,
        Metric::CumulativeInvisibleAppleReward,
        Metric::CumulativeBananaReward,
        Metric::CumulativeLemonReward,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Metric::CumulativeReward => "cumulative_reward",
            Metric::CumulativeVisibleAppleReward => "cumulative_visible_apple_reward",
            Metric::CumulativeInvisibleAppleReward => "cumulative_invisible_apple_reward",
            Metric::CumulativeBananaReward => "cumulative_banana_reward",
            Metric::CumulativeLemonReward => "cumulative_lemon_reward",
        }
    }

    /// Metrics active for a configuration. Lemons require bananas, so this is
    /// always a prefix of [`Metric::ALL`].
    pub fn enabled(produce_bananas: bool, produce_lemons: bool) -> &'static [Metric] {
        let all: &'static [Metric] = &Metric::ALL;
        match (produce_bananas, produce_lemons) {
            (true, true) => all,
            (true, false) => &all[..4],
            _ => &all[..3],
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-agent cumulative counters for one episode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub cumulative_reward: f64,
    pub cumulative_visible_apple_reward: f64,
    pub cumulative_invisible_apple_reward: f64,
    pub cumulative_banana_reward: f64,
    pub cumulative_lemon_reward: f64,
}

impl AgentMetrics {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::CumulativeReward => self.cumulative_reward,
            Metric::CumulativeVisibleAppleReward => self.cumulative_visible_apple_reward,
            Metric::CumulativeInvisibleAppleReward => self.cumulative_invisible_apple_reward,
            Metric::CumulativeBananaReward => self.cumulative_banana_reward,
            Metric::CumulativeLemonReward => self.cumulative_lemon_reward,
        }
    }

    pub(crate) fn add(&mut self, metric: Metric, amount: f64) {
        let field = match metric {
            Metric::CumulativeReward => &mut self.cumulative_reward,
            Metric::CumulativeVisibleAppleReward => &mut self.cumulative_visible_apple_reward,
            Metric::CumulativeInvisibleAppleReward => &mut self.cumulative_invisible_apple_reward,
            Metric::CumulativeBananaReward => &mut self.cumulative_banana_reward,
            Metric::CumulativeLemonReward => &mut self.cumulative_lemon_reward,
        };
        *field += amount;
    }
}

/// Snapshot of an agent's enabled metrics, handed to telemetry after each step.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentInfo {
    metrics: AgentMetrics,
    loggable_metrics: &'static [Metric],
}

impl AgentInfo {
    pub fn new(metrics: AgentMetrics, loggable_metrics: &'static [Metric]) -> Self {
        Self {
            metrics,
            loggable_metrics,
        }
    }

    /// Value of `metric`, or `None` when the configuration disables it.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.loggable_metrics
            .contains(&metric)
            .then(|| self.metrics.get(metric))
    }

    pub fn loggable_metrics(&self) -> &'static [Metric] {
        self.loggable_metrics
    }

    pub fn values(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.loggable_metrics
            .iter()
            .map(|metric| (*metric, self.metrics.get(*metric)))
    }

    /// Wire form consumed by telemetry: one key per enabled metric plus
    /// `loggable_metrics` listing them.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (metric, value) in self.values() {
            map.insert(metric.name().to_string(), Value::from(value));
        }
        map.insert(
            LOGGABLE_METRICS_KEY.to_string(),
            Value::from(
                self.loggable_metrics
                    .iter()
                    .map(|m| m.name())
                    .collect::<Vec<_>>(),
            ),
        );
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_metrics_follow_configuration() {
        assert_eq!(Metric::enabled(false, false).len(), 3);
        assert_eq!(
            Metric::enabled(true, false).last(),
            Some(&Metric::CumulativeBananaReward)
        );
        assert_eq!(Metric::enabled(true, true), &Metric::ALL);
    }

    #[test]
    fn info_hides_disabled_metrics() {
        let mut metrics = AgentMetrics::default();
        metrics.add(Metric::CumulativeBananaReward, 5.0);
        let info = AgentInfo::new(metrics, Metric::enabled(false, false));

        assert_eq!(info.get(Metric::CumulativeBananaReward), None);
        assert_eq!(info.get(Metric::CumulativeReward), Some(0.0));
    }

    #[test]
    fn info_json_lists_loggable_metrics() {
        let mut metrics = AgentMetrics::default();
        metrics.add(Metric::CumulativeReward, -0.1);
        let info = AgentInfo::new(metrics, Metric::enabled(true, false));
        let json = info.to_json();

        assert_eq!(json["cumulative_reward"], -0.1);
        assert_eq!(json["cumulative_banana_reward"], 0.0);
        assert!(json.get("cumulative_lemon_reward").is_none());
        assert_eq!(
            json[LOGGABLE_METRICS_KEY],
            serde_json::json!([
                "cumulative_reward",
                "cumulative_visible_apple_reward",
                "cumulative_invisible_apple_reward",
                "cumulative_banana_reward"
            ])
        );
    }
}
