use super::ValueEstimator;
use crate::error::{Error, Result};
use ahash::AHashMap;

/// Lookup-table estimator keyed on the exact bit pattern of the state.
///
/// Unseen states predict `initial_value` for every action.
#[derive(Debug, Clone)]
pub struct TabularEstimator {
    action_count: usize,
    learning_rate: f32,
    initial_value: f32,
    table: AHashMap<Vec<u32>, Vec<f32>>,
}

impl TabularEstimator {
    pub fn new(action_count: usize, learning_rate: f32) -> Self {
        Self {
            action_count,
            learning_rate,
            initial_value: 0.0,
            table: AHashMap::new(),
        }
    }

    pub fn with_initial_value(mut self, initial_value: f32) -> Self {
        self.initial_value = initial_value;
        self
    }

    pub fn num_states(&self) -> usize {
        self.table.len()
    }

    fn key(state: &[f32]) -> Vec<u32> {
        state.iter().map(|x| x.to_bits()).collect()
    }
}

impl ValueEstimator for TabularEstimator {
    fn action_count(&self) -> usize {
        self.action_count
    }

    fn predict(&self, state: &[f32]) -> Result<Vec<f32>> {
        Ok(self
            .table
            .get(&Self::key(state))
            .cloned()
            .unwrap_or_else(|| vec![self.initial_value; self.action_count]))
    }

    fn update(&mut self, state: &[f32], target: &[f32]) -> Result<f32> {
        Error::check_len("target", self.action_count, target.len())?;
        if target.iter().any(|x| !x.is_finite()) {
            return Err(Error::NonFinite("update target"));
        }

        let initial_value = self.initial_value;
        let action_count = self.action_count;
        let row = self
            .table
            .entry(Self::key(state))
            .or_insert_with(|| vec![initial_value; action_count]);

        let mut loss = 0.0;
        for (value, target) in row.iter_mut().zip(target) {
            let error = target - *value;
            loss += error * error;
            *value += self.learning_rate * error;
        }

        Ok(loss / action_count as f32)
    }
}
