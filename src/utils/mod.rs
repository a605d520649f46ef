mod avg_tracker;
mod report;

pub use avg_tracker::AvgTracker;
pub use report::{Report, Reportable};
