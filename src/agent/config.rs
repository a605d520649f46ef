use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Discount applied to the best next-state value
    pub gamma: f32,
    /// Initial exploration rate
    pub epsilon: f32,
    /// Exploration rate never decays below this
    pub epsilon_min: f32,
    /// Multiplied into the exploration rate after every learning step
    pub epsilon_decay: f32,
    /// Replay memory capacity
    pub memory_size: usize,
    /// Transitions sampled per learning step
    pub batch_size: usize,
    /// Learning rate for the value network optimizer
    pub learning_rate: f64,
    /// Hidden layer widths of the value network
    pub layer_sizes: Vec<usize>,
    pub random_seed: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            gamma: 0.95,
            epsilon: 1.0,
            epsilon_min: 0.05,
            epsilon_decay: 0.95,
            memory_size: 2000,
            batch_size: 8,
            learning_rate: 1e-3,
            layer_sizes: vec![32, 32],
            random_seed: 123,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::Config(format!(
                "agent.gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }
        if !(0.0..=1.0).contains(&self.epsilon_min) || self.epsilon_min > self.epsilon {
            return Err(Error::Config(format!(
                "agent.epsilon_min ({}) must be in [0, agent.epsilon ({})]",
                self.epsilon_min, self.epsilon
            )));
        }
        if self.epsilon > 1.0 {
            return Err(Error::Config(format!(
                "agent.epsilon must be at most 1, got {}",
                self.epsilon
            )));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(Error::Config(format!(
                "agent.epsilon_decay must be in (0, 1], got {}",
                self.epsilon_decay
            )));
        }
        if self.memory_size == 0 || self.batch_size == 0 {
            return Err(Error::Config(
                "agent.memory_size and agent.batch_size must be non-zero".into(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::Config(format!(
                "agent.learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.layer_sizes.contains(&0) {
            return Err(Error::Config("agent.layer_sizes must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        AgentConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_floor_above_initial_rate() {
        let config = AgentConfig {
            epsilon: 0.1,
            epsilon_min: 0.2,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_empty_memory() {
        let config = AgentConfig {
            memory_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
