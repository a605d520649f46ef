mod memory;
mod model;
mod tabular;

pub use memory::{ReplayMemory, Transition};
pub use model::ValueEstimator;
pub use tabular::TabularEstimator;
