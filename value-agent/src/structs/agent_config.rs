//! Hyper-parameters for the value-function agent.

use serde::{Deserialize, Serialize};

use crate::errors::agent_error::AgentError;

/// Agent shape and learning hyper-parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Length of the state vector fed to the approximator.
    pub state_size: usize,
    /// Number of discrete actions.
    pub action_size: usize,
    /// Hidden layer widths (ReLU); output head is linear.
    pub hidden_sizes: Vec<usize>,
    /// Discount factor.
    pub gamma: f32,
    /// Adam step size.
    pub learning_rate: f32,
    /// Initial exploration rate.
    pub epsilon: f32,
    /// Multiplicative decay applied after each trained minibatch.
    pub epsilon_decay: f32,
    /// Exploration floor.
    pub epsilon_min: f32,
    /// Minibatch size; replay is a no-op until the buffer holds this many.
    pub batch_size: usize,
    /// Replay ring buffer capacity.
    pub memory_capacity: usize,
    /// Optional seed for weight initialization (tests, reproducible runs).
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            state_size: 10,
            action_size: 50,
            hidden_sizes: vec![24, 24],
            gamma: 0.95,
            learning_rate: 0.001,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            epsilon_min: 0.01,
            batch_size: 32,
            memory_capacity: 2000,
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn new(state_size: usize, action_size: usize) -> Self {
        Self {
            state_size,
            action_size,
            ..Default::default()
        }
    }

    /// Validate config values.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.state_size == 0 {
            return Err(AgentError::InvalidConfig("state_size must be > 0".into()));
        }
        if self.action_size == 0 {
            return Err(AgentError::InvalidConfig("action_size must be > 0".into()));
        }
        if self.hidden_sizes.iter().any(|h| *h == 0) {
            return Err(AgentError::InvalidConfig("hidden layer width must be > 0".into()));
        }
        if self.batch_size == 0 || self.memory_capacity < self.batch_size {
            return Err(AgentError::InvalidConfig(
                "batch_size must be > 0 and <= memory_capacity".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(AgentError::InvalidConfig("gamma must be within [0, 1]".into()));
        }
        if !(0.0..=1.0).contains(&self.epsilon_min) || self.epsilon < self.epsilon_min {
            return Err(AgentError::InvalidConfig(
                "epsilon_min must be within [0, 1] and <= epsilon".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.epsilon_decay) {
            return Err(AgentError::InvalidConfig("epsilon_decay must be within [0, 1]".into()));
        }
        if self.learning_rate <= 0.0 {
            return Err(AgentError::InvalidConfig("learning_rate must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(AgentConfig::default().validate().is_ok());
    }

    #[test]
    fn batch_larger_than_memory_is_rejected() {
        let cfg = AgentConfig {
            batch_size: 64,
            memory_capacity: 32,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
