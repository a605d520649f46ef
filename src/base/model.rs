use crate::error::Result;

/// Maps a state vector to one score per action.
///
/// Implementations are treated as black boxes by the agent: any failure in
/// `predict` or `update` is returned to the caller and ends the session.
pub trait ValueEstimator {
    fn action_count(&self) -> usize;

    fn predict(&self, state: &[f32]) -> Result<Vec<f32>>;

    /// Runs a single optimization step moving `predict(state)` toward `target`.
    /// Returns the loss of that step.
    fn update(&mut self, state: &[f32], target: &[f32]) -> Result<f32>;
}
