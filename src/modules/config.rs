use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::modules::error::EnvError;

/// Environment variable overriding the home directory for logs and models.
pub const HOME_PATH_VAR: &str = "FRUIT_SLOTS_HOME_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvConfig {
    pub produce_bananas: bool,
    pub produce_lemons: bool,
    /// Seed for the engine's generator; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            produce_bananas: true,
            produce_lemons: true,
            seed: None,
        }
    }
}

impl EnvConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), EnvError> {
        if self.produce_lemons && !self.produce_bananas {
            return Err(EnvError::Configuration(
                "lemon production requires banana production".into(),
            ));
        }
        Ok(())
    }
}

/// Root directory for training logs and model artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomePaths {
    home: PathBuf,
}

impl HomePaths {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Reads `FRUIT_SLOTS_HOME_PATH`, falling back to `$HOME/.fruit_slots`.
    pub fn from_env() -> Self {
        if let Some(path) = env::var_os(HOME_PATH_VAR) {
            return Self::new(path);
        }
        let base = env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(".fruit_slots"))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn logs(&self) -> PathBuf {
        self.home.join("logs")
    }

    pub fn models(&self) -> PathBuf {
        self.home.join("models")
    }

    /// Path of the trained-policy artifact for a configuration.
    ///
    /// `i_agent` selects a per-agent model; `None` names the model shared by
    /// both agents.
    pub fn agent_model_path(&self, i_agent: Option<usize>, config: &EnvConfig) -> PathBuf {
        let mut name = String::from("agent-");
        match i_agent {
            Some(i) => name.push_str(&format!("{}-", i)),
            None => name.push_str("single-"),
        }
        name.push('a');
        if config.produce_bananas {
            name.push('b');
        }
        if config.produce_lemons {
            name.push('l');
        }
        name.push_str(".zip");
        self.models().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lemons_without_bananas_is_rejected() {
        let config = EnvConfig {
            produce_bananas: false,
            produce_lemons: true,
            seed: None,
        };
        assert!(matches!(
            config.validate(),
            Err(EnvError::Configuration(_))
        ));
        assert!(EnvConfig::default().validate().is_ok());
    }

    #[test]
    fn model_path_encodes_configuration() {
        let paths = HomePaths::new("/tmp/fs");
        let full = EnvConfig::default();
        let apples_only = EnvConfig {
            produce_bananas: false,
            produce_lemons: false,
            seed: None,
        };

        assert_eq!(
            paths.agent_model_path(None, &full),
            PathBuf::from("/tmp/fs/models/agent-single-abl.zip")
        );
        assert_eq!(
            paths.agent_model_path(Some(1), &apples_only),
            PathBuf::from("/tmp/fs/models/agent-1-a.zip")
        );
        assert_eq!(paths.logs(), PathBuf::from("/tmp/fs/logs"));
    }
}
