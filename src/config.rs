use crate::{
    agent::config::AgentConfig,
    error::{Error, Result},
    selector::SelectorConfig,
    session::SessionConfig,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Every tunable of a quiz run, loaded from TOML. Missing tables and keys
/// fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub agent: AgentConfig,
    pub selector: SelectorConfig,
    pub session: SessionConfig,
}

impl QuizConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.agent.validate()?;
        self.selector.validate()?;
        self.session.validate()
    }
}
