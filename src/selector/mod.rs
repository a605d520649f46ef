//! Structured action selection.
//!
//! Raw action scores are turned into a sampling distribution by relaxing a
//! chain of two-level nodes, one per action. Adjacent pairs are evolved with
//! a gate whose strength depends on both scores and on a penalty for sharing
//! the previous action, a topic or a difficulty level. The final distribution
//! is read from the per-node "selected" marginals.

pub mod chain;
pub mod linalg;

use crate::error::{Error, Result};
use chain::{Chain, PHYS};
use ndarray::Array2;
use rand::{
    Rng,
    distr::{Distribution, weighted::WeightedIndex},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

const PREV_ACTION_PENALTY: f64 = 0.5;
const SAME_TOPIC_PENALTY: f64 = 0.25;
const SAME_DIFFICULTY_PENALTY: f64 = 0.25;
const MAX_PENALTY: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Largest bond dimension kept after each two-site update
    pub bond_dim: usize,
    /// Evolution time step
    pub dt: f64,
    /// Number of left-to-right passes over the chain
    pub sweeps: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            bond_dim: 4,
            dt: 0.1,
            sweeps: 3,
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bond_dim == 0 {
            return Err(Error::Config("selector.bond_dim must be at least 1".into()));
        }
        if !self.dt.is_finite() || self.dt < 0.0 {
            return Err(Error::Config(format!(
                "selector.dt must be finite and non-negative, got {}",
                self.dt
            )));
        }
        Ok(())
    }
}

/// Structural information about one action (question).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionMeta {
    pub topic: usize,
    pub difficulty: i64,
}

impl ActionMeta {
    pub fn new(topic: usize, difficulty: i64) -> Self {
        Self { topic, difficulty }
    }
}

#[derive(Debug, Clone)]
pub struct ChainSelector {
    config: SelectorConfig,
}

impl ChainSelector {
    pub fn new(config: SelectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Sampling distribution over actions before any randomness is drawn.
    pub fn distribution(
        &self,
        scores: &[f32],
        meta: &[ActionMeta],
        prev_action: Option<usize>,
    ) -> Result<Vec<f64>> {
        let n = scores.len();
        Error::check_len("action metadata", n, meta.len())?;
        if n == 0 {
            return Err(Error::Sampling("no actions to choose from".into()));
        }
        if n < 2 {
            return Ok(vec![1.0]);
        }

        let scores: Vec<f64> = scores.iter().map(|&q| q as f64).collect();
        if scores.iter().any(|q| !q.is_finite()) {
            return Err(Error::NonFinite("action scores"));
        }

        let amplitudes: Vec<[f64; PHYS]> = softmax(&scores)
            .into_iter()
            .map(|p| [(1.0 - p).max(0.0).sqrt(), p.sqrt()])
            .collect();
        let mut chain = Chain::product(&amplitudes);

        let dt = self.config.dt;
        for _ in 0..self.config.sweeps {
            for i in 0..n - 1 {
                let coupling = scores[i] * scores[i + 1] - pair_penalty(i, meta, prev_action);
                if !coupling.is_finite() {
                    return Err(Error::NonFinite("pair coupling"));
                }

                chain.apply_two_site(i, &relaxation_gate(coupling, dt), self.config.bond_dim);
            }
        }

        let marginals = selection_weights(&chain.reduced_densities(), chain.log_scale())?;

        let total: f64 = marginals.iter().sum();
        if !total.is_finite() {
            return Err(Error::NonFinite("selection marginals"));
        }
        if total <= 0.0 {
            debug!(actions = n, "all selection marginals vanished, sampling uniformly");
            return Ok(vec![1.0 / n as f64; n]);
        }

        Ok(marginals.into_iter().map(|m| m / total).collect())
    }

    /// Samples an action index in `0..scores.len()`.
    pub fn select<R: Rng + ?Sized>(
        &self,
        scores: &[f32],
        meta: &[ActionMeta],
        prev_action: Option<usize>,
        rng: &mut R,
    ) -> Result<usize> {
        let probs = self.distribution(scores, meta, prev_action)?;
        if probs.len() < 2 {
            return Ok(0);
        }

        let dist = WeightedIndex::new(&probs).map_err(|e| Error::Sampling(e.to_string()))?;
        Ok(dist.sample(rng))
    }
}

/// Softmax with the maximum subtracted before exponentiating.
fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|q| (q - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn pair_penalty(i: usize, meta: &[ActionMeta], prev_action: Option<usize>) -> f64 {
    let (left, right) = (meta[i], meta[i + 1]);
    let mut penalty = 0.0;

    if prev_action.is_some_and(|prev| prev == i || prev == i + 1) {
        penalty += PREV_ACTION_PENALTY;
    }
    if left.topic == right.topic {
        penalty += SAME_TOPIC_PENALTY;
    }
    if left.difficulty == right.difficulty {
        penalty += SAME_DIFFICULTY_PENALTY;
    }

    penalty.min(MAX_PENALTY)
}

/// Unnormalized "selected" weights `(1 - N * z) / 2`, clipped at zero, where
/// `N` is the squared norm of the state (scale included) and `z` the
/// normalized `<Z>` of each site.
///
/// When `N > 1` every weight is divided by `N`. The normalized distribution
/// is unchanged and nothing overflows as `N` grows, in the limit only sites
/// with `z < 0` keep any weight.
fn selection_weights(densities: &[Array2<f64>], log_scale: f64) -> Result<Vec<f64>> {
    if log_scale.is_nan() || log_scale == f64::INFINITY {
        return Err(Error::NonFinite("chain scale"));
    }

    let mut sites = Vec::with_capacity(densities.len());
    for rho in densities {
        let (up, down) = (rho[[0, 0]], rho[[1, 1]]);
        if !up.is_finite() || !down.is_finite() {
            return Err(Error::NonFinite("selection marginals"));
        }
        sites.push((up + down, up - down));
    }
    if sites.is_empty() {
        return Ok(Vec::new());
    }

    let total_trace: f64 = sites.iter().map(|(trace, _)| trace).sum();
    let mean_trace = total_trace / sites.len() as f64;
    let log_norm = 2.0 * log_scale + mean_trace.ln();
    if log_norm.is_nan() {
        return Err(Error::NonFinite("chain norm"));
    }

    Ok(sites
        .into_iter()
        .map(|(trace, spin)| {
            let z = if trace > 0.0 { spin / trace } else { 0.0 };
            let weight = if log_norm <= 0.0 {
                (1.0 - log_norm.exp() * z) / 2.0
            } else {
                ((-log_norm).exp() - z) / 2.0
            };
            weight.max(0.0)
        })
        .collect())
}

/// `expm(-dt * H)` with `H = I - dt * coupling * I` on the pair space.
fn relaxation_gate(coupling: f64, dt: f64) -> Array2<f64> {
    let identity = Array2::<f64>::eye(PHYS * PHYS);
    let generator = &identity - &(&identity * (dt * coupling));
    linalg::expm(&(generator * -dt))
}
