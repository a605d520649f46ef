//! Small dense linear algebra for the chain relaxation.
//!
//! Matrices here are at most `2 * bond_dim` wide, so straightforward
//! iterative methods are used instead of pulling in LAPACK.

use ndarray::{Array1, Array2};

const JACOBI_TOLERANCE: f64 = 1e-15;
const JACOBI_MAX_SWEEPS: usize = 64;
const TAYLOR_MAX_TERMS: usize = 32;

/// Thin singular value decomposition `m = u * diag(s) * vt`.
///
/// Singular values are sorted in descending order. Columns of `u` that belong
/// to a zero singular value are left as zeros.
#[derive(Debug, Clone)]
pub struct Svd {
    pub u: Array2<f64>,
    pub s: Array1<f64>,
    pub vt: Array2<f64>,
}

/// One-sided (Hestenes) Jacobi SVD.
pub fn svd(matrix: &Array2<f64>) -> Svd {
    let (rows, cols) = matrix.dim();
    let mut work = matrix.clone();
    let mut v = Array2::<f64>::eye(cols);

    for _ in 0..JACOBI_MAX_SWEEPS {
        let mut rotated = false;

        for p in 0..cols {
            for q in (p + 1)..cols {
                let (mut alpha, mut beta, mut gamma) = (0.0, 0.0, 0.0);
                for r in 0..rows {
                    let (x, y) = (work[[r, p]], work[[r, q]]);
                    alpha += x * x;
                    beta += y * y;
                    gamma += x * y;
                }

                if gamma.abs() <= JACOBI_TOLERANCE * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = c * t;

                rotate_columns(&mut work, p, q, c, s);
                rotate_columns(&mut v, p, q, c, s);
            }
        }

        if !rotated {
            break;
        }
    }

    let norms: Vec<f64> = (0..cols)
        .map(|j| work.column(j).iter().map(|x| x * x).sum::<f64>().sqrt())
        .collect();
    let mut order: Vec<usize> = (0..cols).collect();
    order.sort_by(|&a, &b| norms[b].total_cmp(&norms[a]));
    order.truncate(rows.min(cols));

    let rank = order.len();
    let mut u = Array2::zeros((rows, rank));
    let mut s = Array1::zeros(rank);
    let mut vt = Array2::zeros((rank, cols));

    for (k, &j) in order.iter().enumerate() {
        let sigma = norms[j];
        s[k] = sigma;
        if sigma > 0.0 {
            for r in 0..rows {
                u[[r, k]] = work[[r, j]] / sigma;
            }
        }
        for c in 0..cols {
            vt[[k, c]] = v[[c, j]];
        }
    }

    Svd { u, s, vt }
}

fn rotate_columns(m: &mut Array2<f64>, p: usize, q: usize, c: f64, s: f64) {
    for r in 0..m.nrows() {
        let (x, y) = (m[[r, p]], m[[r, q]]);
        m[[r, p]] = c * x - s * y;
        m[[r, q]] = s * x + c * y;
    }
}

/// Matrix exponential by scaling and squaring of a truncated Taylor series.
pub fn expm(a: &Array2<f64>) -> Array2<f64> {
    let n = a.nrows();
    let norm = a
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|x| x.abs()).sum::<f64>())
        .fold(0.0, f64::max);

    // scale until the series converges quickly
    let squarings = if norm > 0.5 {
        (norm / 0.5).log2().ceil() as u32
    } else {
        0
    };
    let scaled = a / 2f64.powi(squarings as i32);

    let mut result = Array2::<f64>::eye(n);
    let mut term = Array2::<f64>::eye(n);
    for k in 1..=TAYLOR_MAX_TERMS {
        term = term.dot(&scaled) / k as f64;
        result += &term;
        if term.iter().all(|x| x.abs() <= f64::EPSILON) {
            break;
        }
    }

    for _ in 0..squarings {
        result = result.dot(&result);
    }

    result
}
