use super::linalg::{Svd, svd};
use ndarray::{Array2, Array3, s};

/// Local dimension of every node: "not selected" and "selected".
pub const PHYS: usize = 2;

/// Singular values below this fraction of the largest one are discarded.
const TRUNCATION_CUTOFF: f64 = 1e-12;

/// Open-boundary chain of two-level nodes in matrix-product form.
///
/// Site `i` is stored as a `(left bond, PHYS, right bond)` tensor. The
/// represented state is `exp(log_scale)` times the stored tensors: every
/// two-site update moves the norm of the evolved pair into `log_scale`, so
/// the tensors stay near unit norm however large the applied gates are.
#[derive(Debug, Clone)]
pub struct Chain {
    sites: Vec<Array3<f64>>,
    log_scale: f64,
}

impl Chain {
    /// Product state with bond dimension 1 everywhere.
    pub fn product(amplitudes: &[[f64; PHYS]]) -> Self {
        let sites = amplitudes
            .iter()
            .map(|amps| Array3::from_shape_fn((1, PHYS, 1), |(_, phys, _)| amps[phys]))
            .collect();

        Self {
            sites,
            log_scale: 0.0,
        }
    }

    /// Log of the amplitude factor held outside the site tensors.
    /// `f64::NEG_INFINITY` once a gate has annihilated the state.
    pub fn log_scale(&self) -> f64 {
        self.log_scale
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Dimension of the bond to the right of every site except the last.
    pub fn bond_dims(&self) -> Vec<usize> {
        self.sites
            .iter()
            .take(self.len().saturating_sub(1))
            .map(|site| site.dim().2)
            .collect()
    }

    /// Applies a `PHYS^2 x PHYS^2` gate to sites `i` and `i + 1`.
    ///
    /// The pair is contracted into a single `(left * PHYS) x (PHYS * right)`
    /// matrix, evolved, then split again with an SVD keeping at most
    /// `max_bond` singular values. The kept singular values are normalized,
    /// their norm goes into the log scale, and they are absorbed into the
    /// right site.
    pub fn apply_two_site(&mut self, i: usize, gate: &Array2<f64>, max_bond: usize) {
        assert!(i + 1 < self.len(), "two-site gate at {i} is out of range");
        assert_eq!(gate.dim(), (PHYS * PHYS, PHYS * PHYS));

        let theta = {
            let left = &self.sites[i];
            let right = &self.sites[i + 1];
            let (dl, _, dm) = left.dim();
            let dr = right.dim().2;

            let mut theta = Array2::<f64>::zeros((dl * PHYS, PHYS * dr));
            for a in 0..dl {
                for s1 in 0..PHYS {
                    for s2 in 0..PHYS {
                        for c in 0..dr {
                            theta[[a * PHYS + s1, s2 * dr + c]] =
                                (0..dm)
                                    .map(|b| left[[a, s1, b]] * right[[b, s2, c]])
                                    .sum::<f64>();
                        }
                    }
                }
            }

            let mut evolved = Array2::<f64>::zeros(theta.dim());
            for a in 0..dl {
                for c in 0..dr {
                    for out in 0..PHYS * PHYS {
                        let (t1, t2) = (out / PHYS, out % PHYS);
                        evolved[[a * PHYS + t1, t2 * dr + c]] = (0..PHYS * PHYS)
                            .map(|inp| {
                                let (s1, s2) = (inp / PHYS, inp % PHYS);
                                gate[[out, inp]] * theta[[a * PHYS + s1, s2 * dr + c]]
                            })
                            .sum::<f64>();
                    }
                }
            }
            evolved
        };

        let dl = theta.nrows() / PHYS;
        let dr = theta.ncols() / PHYS;
        let Svd { u, mut s, vt } = svd(&theta);

        let cutoff = s[0] * TRUNCATION_CUTOFF;
        let keep = s
            .iter()
            .take(max_bond.max(1))
            .filter(|&&sigma| sigma > cutoff && sigma > 0.0)
            .count()
            .max(1);

        let norm = s
            .iter()
            .take(keep)
            .map(|sigma| sigma * sigma)
            .sum::<f64>()
            .sqrt();
        if norm > 0.0 {
            s.mapv_inplace(|sigma| sigma / norm);
            self.log_scale += norm.ln();
        } else {
            self.log_scale = f64::NEG_INFINITY;
        }

        self.sites[i] = Array3::from_shape_fn((dl, PHYS, keep), |(a, phys, j)| {
            u[[a * PHYS + phys, j]]
        });
        self.sites[i + 1] = Array3::from_shape_fn((keep, PHYS, dr), |(j, phys, c)| {
            s[j] * vt[[j, phys * dr + c]]
        });
    }

    /// Unnormalized single-site density matrices, every other node traced out.
    pub fn reduced_densities(&self) -> Vec<Array2<f64>> {
        let n = self.len();

        let mut left_envs = Vec::with_capacity(n + 1);
        left_envs.push(Array2::<f64>::ones((1, 1)));
        for (k, site) in self.sites.iter().enumerate() {
            let env = &left_envs[k];
            let mut next = Array2::<f64>::zeros((site.dim().2, site.dim().2));
            for phys in 0..PHYS {
                let a = site.slice(s![.., phys, ..]);
                next += &a.t().dot(env).dot(&a);
            }
            left_envs.push(next);
        }

        let mut right_envs = vec![Array2::<f64>::ones((1, 1)); n + 1];
        for (k, site) in self.sites.iter().enumerate().rev() {
            let mut next = Array2::<f64>::zeros((site.dim().0, site.dim().0));
            for phys in 0..PHYS {
                let a = site.slice(s![.., phys, ..]);
                next += &a.dot(&right_envs[k + 1]).dot(&a.t());
            }
            right_envs[k] = next;
        }

        self.sites
            .iter()
            .enumerate()
            .map(|(k, site)| {
                Array2::from_shape_fn((PHYS, PHYS), |(p, q)| {
                    let a_p = site.slice(s![.., p, ..]);
                    let a_q = site.slice(s![.., q, ..]);
                    let open = a_p.t().dot(&left_envs[k]).dot(&a_q);
                    (&open * &right_envs[k + 1]).sum()
                })
            })
            .collect()
    }

    /// `Tr(rho_i * op)` for every site.
    pub fn expectations(&self, op: &Array2<f64>) -> Vec<f64> {
        self.reduced_densities()
            .iter()
            .map(|rho| rho.dot(op).diag().sum())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn pauli_z() -> Array2<f64> {
        array![[1.0, 0.0], [0.0, -1.0]]
    }

    fn amplitudes(probs: &[f64]) -> Vec<[f64; PHYS]> {
        probs.iter().map(|p| [(1.0 - p).sqrt(), p.sqrt()]).collect()
    }

    // mixes the two nodes so the bond has to grow
    fn entangling_gate() -> Array2<f64> {
        let (c, s) = (0.8f64.cos(), 0.8f64.sin());
        array![
            [c, 0.0, 0.0, -s],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [s, 0.0, 0.0, c],
        ]
    }

    #[test]
    fn product_state_reproduces_marginals() {
        let probs = [0.1, 0.5, 0.7, 0.25];
        let chain = Chain::product(&amplitudes(&probs));

        for (z, p) in chain.expectations(&pauli_z()).iter().zip(probs) {
            assert!(((1.0 - z) / 2.0 - p).abs() < 1e-12);
        }
        assert_eq!(chain.bond_dims(), vec![1, 1, 1]);
    }

    #[test]
    fn identity_gate_keeps_state() {
        let probs = [0.3, 0.6, 0.2];
        let mut chain = Chain::product(&amplitudes(&probs));
        chain.apply_two_site(0, &Array2::eye(4), 4);
        chain.apply_two_site(1, &Array2::eye(4), 4);

        for (z, p) in chain.expectations(&pauli_z()).iter().zip(probs) {
            assert!(((1.0 - z) / 2.0 - p).abs() < 1e-12);
        }
        assert_eq!(chain.bond_dims(), vec![1, 1]);
    }

    #[test]
    fn scaled_gate_moves_into_log_scale() {
        let probs = [0.3, 0.6, 0.2];
        let mut chain = Chain::product(&amplitudes(&probs));
        chain.apply_two_site(1, &(Array2::<f64>::eye(4) * 0.5), 4);

        assert!((chain.log_scale() - 0.5f64.ln()).abs() < 1e-12);
        for (z, p) in chain.expectations(&pauli_z()).iter().zip(probs) {
            assert!(((1.0 - z) / 2.0 - p).abs() < 1e-12);
        }
    }

    #[test]
    fn huge_gates_stay_finite() {
        let probs = vec![0.4; 200];
        let mut chain = Chain::product(&amplitudes(&probs));
        let gate = Array2::<f64>::eye(4) * 1e100;
        for _ in 0..3 {
            for i in 0..probs.len() - 1 {
                chain.apply_two_site(i, &gate, 4);
            }
        }

        let expected = 3.0 * 199.0 * 1e100f64.ln();
        assert!((chain.log_scale() - expected).abs() < 1e-6 * expected);
        for rho in chain.reduced_densities() {
            assert!(rho.iter().all(|x| x.is_finite()));
            assert!((rho.diag().sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_gate_annihilates_state() {
        let mut chain = Chain::product(&amplitudes(&[0.5, 0.5]));
        chain.apply_two_site(0, &Array2::zeros((4, 4)), 4);
        assert_eq!(chain.log_scale(), f64::NEG_INFINITY);
    }

    #[test]
    fn entangling_gate_grows_bond_up_to_limit() {
        let probs = [0.4, 0.5, 0.6, 0.3];
        let mut unbounded = Chain::product(&amplitudes(&probs));
        let mut bounded = unbounded.clone();

        for _ in 0..3 {
            for i in 0..probs.len() - 1 {
                unbounded.apply_two_site(i, &entangling_gate(), 8);
                bounded.apply_two_site(i, &entangling_gate(), 1);
            }
        }

        assert!(unbounded.bond_dims().iter().any(|&d| d > 1));
        assert!(bounded.bond_dims().iter().all(|&d| d == 1));

        // the gate is orthogonal, so the untruncated state keeps unit norm
        let scale = (2.0 * unbounded.log_scale()).exp();
        for rho in unbounded.reduced_densities() {
            assert!((scale * rho.diag().sum() - 1.0).abs() < 1e-9);
        }
    }
}
