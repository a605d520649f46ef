pub mod config;
pub mod net;

use crate::{
    agent::config::AgentConfig,
    base::{ReplayMemory, Transition, ValueEstimator},
    error::{Error, Result},
    selector::{ActionMeta, ChainSelector, SelectorConfig},
    utils::{AvgTracker, Report},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

/// Exploration rate, only ever shrinks toward its floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Epsilon {
    value: f32,
    min: f32,
    decay: f32,
}

impl Epsilon {
    pub fn new(value: f32, min: f32, decay: f32) -> Self {
        Self {
            value: value.max(min),
            min,
            decay,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn decay(&mut self) {
        self.value = (self.value * self.decay).max(self.min);
    }
}

/// Epsilon-greedy DQN agent choosing which question to ask next.
///
/// Exploitation goes through the [`ChainSelector`], exploration picks a
/// question uniformly. Every random draw comes from the agent's own seeded
/// generator so a run is fully determined by `AgentConfig::random_seed`.
pub struct DqnAgent<E: ValueEstimator> {
    config: AgentConfig,
    estimator: E,
    selector: ChainSelector,
    memory: ReplayMemory,
    actions: Vec<ActionMeta>,
    epsilon: Epsilon,
    rng: StdRng,
}

impl<E: ValueEstimator> DqnAgent<E> {
    pub fn new(
        estimator: E,
        actions: Vec<ActionMeta>,
        config: AgentConfig,
        selector: SelectorConfig,
    ) -> Result<Self> {
        config.validate()?;
        if actions.is_empty() {
            return Err(Error::Config("the agent needs at least one action".into()));
        }
        Error::check_len("action metadata", estimator.action_count(), actions.len())?;

        Ok(Self {
            selector: ChainSelector::new(selector)?,
            memory: ReplayMemory::with_capacity(config.memory_size),
            epsilon: Epsilon::new(config.epsilon, config.epsilon_min, config.epsilon_decay),
            rng: StdRng::seed_from_u64(config.random_seed),
            estimator,
            actions,
            config,
        })
    }

    /// Picks the next question for `state`. When exploiting, the selector
    /// penalizes `prev_action` and its neighbours.
    pub fn act(&mut self, state: &[f32], prev_action: Option<usize>) -> Result<usize> {
        if self.rng.random::<f32>() < self.epsilon.value() {
            let action = self.rng.random_range(0..self.actions.len());
            debug!(action, epsilon = self.epsilon.value(), "exploring");
            return Ok(action);
        }

        let scores = self.estimator.predict(state)?;
        Error::check_len("predicted scores", self.actions.len(), scores.len())?;

        let action = self
            .selector
            .select(&scores, &self.actions, prev_action, &mut self.rng)?;
        debug!(action, ?prev_action, "exploiting");
        Ok(action)
    }

    pub fn remember(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    /// Fits the estimator on a random batch of stored transitions.
    ///
    /// Returns `Ok(None)` without touching the exploration rate while the
    /// replay memory holds fewer than `batch_size` transitions.
    pub fn learn(&mut self, batch_size: usize) -> Result<Option<Report>> {
        if batch_size == 0 {
            return Ok(None);
        }
        let Some(batch) = self.memory.sample(batch_size, &mut self.rng) else {
            debug!(
                stored = self.memory.len(),
                batch_size, "not enough transitions to learn yet"
            );
            return Ok(None);
        };

        let mut loss = AvgTracker::default();
        for transition in batch {
            let target = if transition.done {
                transition.reward
            } else {
                let next = self.estimator.predict(&transition.next_state)?;
                let best = next.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                transition.reward + self.config.gamma * best
            };

            let mut target_values = self.estimator.predict(&transition.state)?;
            let count = target_values.len();
            let slot = target_values
                .get_mut(transition.action)
                .ok_or(Error::InvalidAction {
                    action: transition.action,
                    count,
                })?;
            *slot = target;

            loss += self.estimator.update(&transition.state, &target_values)? as f64;
        }

        self.epsilon.decay();

        let mut report = Report::default();
        report["Value loss"] = loss.into();
        report["Batch size"] = batch_size.into();
        report["Epsilon"] = self.epsilon.value().into();
        Ok(Some(report))
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon.value()
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    pub fn actions(&self) -> &[ActionMeta] {
        &self.actions
    }
}
