use std::ops::AddAssign;

/// Running mean of the finite samples pushed into it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AvgTracker {
    sum: f64,
    samples: u64,
}

impl AvgTracker {
    pub fn new(sum: f64, samples: u64) -> Self {
        Self { sum, samples }
    }

    /// `None` until a finite sample has been seen.
    pub fn mean(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.sum / self.samples as f64)
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn push(&mut self, sample: f64) {
        if sample.is_finite() {
            self.sum += sample;
            self.samples += 1;
        }
    }
}

impl AddAssign<f64> for AvgTracker {
    fn add_assign(&mut self, sample: f64) {
        self.push(sample);
    }
}

impl AddAssign<AvgTracker> for AvgTracker {
    fn add_assign(&mut self, other: AvgTracker) {
        if other.sum.is_finite() {
            self.sum += other.sum;
            self.samples += other.samples;
        }
    }
}
