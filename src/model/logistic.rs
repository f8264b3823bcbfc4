//! Binary logistic regression fitted by iteratively reweighted least
//! squares.
//!
//! Newton–Raphson on the log-likelihood: each step solves
//! `(XᵀWX) δ = Xᵀ(y − p)` with `W = diag(p(1−p))`. The converged `(XᵀWX)⁻¹`
//! is the coefficient covariance, which is what gives every estimate a
//! standard error.

use ndarray::{Array1, Array2, Axis};

use crate::error::FitError;

/// IRLS configuration. `tolerance` bounds the relative deviance change
/// between iterations, the same stopping rule R's `glm` uses.
#[derive(Debug, Clone)]
pub struct Irls {
    pub max_iter: usize,
    pub tolerance: f64,
}

impl Default for Irls {
    fn default() -> Self {
        Self {
            max_iter: 25,
            tolerance: 1e-8,
        }
    }
}

/// A converged fit: point estimates, their standard errors, and the fit
/// diagnostics downstream reporting needs.
#[derive(Debug, Clone)]
pub struct GlmFit {
    pub coefficients: Array1<f64>,
    pub standard_errors: Array1<f64>,
    pub log_likelihood: f64,
    pub deviance: f64,
    pub null_deviance: f64,
    pub iterations: usize,
}

impl Irls {
    /// Fits `y ~ x` where `y` holds 0.0/1.0 responses and `x` already
    /// contains the intercept column. `terms` names the columns of `x` and
    /// is used to report which term made the design singular.
    pub fn fit(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        terms: &[String],
    ) -> Result<GlmFit, FitError> {
        let n = x.nrows();
        let k = x.ncols();

        if n == 0 || k == 0 {
            return Err(FitError::EmptyDesign);
        }

        let positives = y.iter().filter(|&&v| v > 0.5).count();
        if positives == 0 || positives == n {
            return Err(FitError::SingleClass);
        }

        // A predictor with zero variance can never be estimated alongside
        // the intercept. Column 0 is the intercept itself.
        for j in 1..k {
            let col = x.column(j);
            let first = col[0];
            if col.iter().all(|&v| v == first) {
                return Err(FitError::RankDeficient {
                    term: term_name(terms, j),
                });
            }
        }

        let mut beta = Array1::<f64>::zeros(k);
        let mut last_deviance = f64::INFINITY;

        for iteration in 1..=self.max_iter {
            let eta = x.dot(&beta);
            let p = eta.mapv(sigmoid);
            let w = p.mapv(|pi| (pi * (1.0 - pi)).max(1e-10));

            let wx = x * &w.view().insert_axis(Axis(1));
            let xtwx = x.t().dot(&wx);
            let gradient = x.t().dot(&(y - &p));

            let delta = solve(&xtwx, &gradient)
                .map_err(|j| FitError::RankDeficient {
                    term: term_name(terms, j),
                })?;

            beta += &delta;

            let deviance = -2.0 * log_likelihood(y, &x.dot(&beta).mapv(sigmoid));
            if (last_deviance - deviance).abs() / (deviance.abs() + 0.1) < self.tolerance {
                return self.finish(x, y, beta, &xtwx, iteration, terms);
            }
            last_deviance = deviance;
        }

        Err(FitError::NotConverged {
            iterations: self.max_iter,
        })
    }

    fn finish(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        beta: Array1<f64>,
        xtwx: &Array2<f64>,
        iterations: usize,
        terms: &[String],
    ) -> Result<GlmFit, FitError> {
        let covariance = invert(xtwx).map_err(|j| FitError::RankDeficient {
            term: term_name(terms, j),
        })?;
        let standard_errors = Array1::from_iter(
            (0..beta.len()).map(|j| covariance[[j, j]].max(0.0).sqrt()),
        );

        let p = x.dot(&beta).mapv(sigmoid);
        let log_likelihood = log_likelihood(y, &p);
        let deviance = -2.0 * log_likelihood;

        let n = y.len() as f64;
        let mean = y.sum() / n;
        let null_deviance = -2.0 * n * (mean * mean.ln() + (1.0 - mean) * (1.0 - mean).ln());

        Ok(GlmFit {
            coefficients: beta,
            standard_errors,
            log_likelihood,
            deviance,
            null_deviance,
            iterations,
        })
    }
}

fn term_name(terms: &[String], j: usize) -> String {
    terms
        .get(j)
        .cloned()
        .unwrap_or_else(|| format!("column {j}"))
}

/// Numerically stable sigmoid.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let exp_z = z.exp();
        exp_z / (1.0 + exp_z)
    }
}

/// Bernoulli log-likelihood with clipped probabilities.
fn log_likelihood(y: &Array1<f64>, p: &Array1<f64>) -> f64 {
    let eps = 1e-15;
    y.iter()
        .zip(p.iter())
        .map(|(&yi, &pi)| {
            let pc = pi.clamp(eps, 1.0 - eps);
            yi * pc.ln() + (1.0 - yi) * (1.0 - pc).ln()
        })
        .sum()
}

/// Solves `a · x = b` by Gaussian elimination with partial pivoting.
/// A vanishing pivot means the system is singular; the offending column
/// index is returned so the caller can name the term.
fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, usize> {
    let k = a.nrows();
    let mut m = a.clone();
    let mut rhs = b.clone();
    let scale = a.iter().fold(1.0f64, |acc, v| acc.max(v.abs()));
    let threshold = 1e-12 * scale;

    for col in 0..k {
        let pivot_row = (col..k)
            .max_by(|&r1, &r2| m[[r1, col]].abs().total_cmp(&m[[r2, col]].abs()))
            .unwrap_or(col);
        if m[[pivot_row, col]].abs() < threshold {
            return Err(col);
        }
        if pivot_row != col {
            for j in 0..k {
                m.swap([pivot_row, j], [col, j]);
            }
            rhs.swap(pivot_row, col);
        }

        for row in (col + 1)..k {
            let factor = m[[row, col]] / m[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for j in col..k {
                m[[row, j]] -= factor * m[[col, j]];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = Array1::<f64>::zeros(k);
    for row in (0..k).rev() {
        let mut acc = rhs[row];
        for j in (row + 1)..k {
            acc -= m[[row, j]] * x[j];
        }
        x[row] = acc / m[[row, row]];
    }
    Ok(x)
}

/// Inverts a symmetric positive-definite matrix column by column via
/// [`solve`].
fn invert(a: &Array2<f64>) -> Result<Array2<f64>, usize> {
    let k = a.nrows();
    let mut inv = Array2::<f64>::zeros((k, k));
    for j in 0..k {
        let mut e = Array1::<f64>::zeros(k);
        e[j] = 1.0;
        let col = solve(a, &e)?;
        inv.column_mut(j).assign(&col);
    }
    Ok(inv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design(rows: &[(f64, f64)]) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec(
            (rows.len(), 2),
            rows.iter().flat_map(|&(xi, _)| [1.0, xi]).collect(),
        )
        .unwrap();
        let y = Array1::from_iter(rows.iter().map(|&(_, yi)| yi));
        (x, y)
    }

    fn terms() -> Vec<String> {
        vec!["(Intercept)".to_string(), "x".to_string()]
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(30.0) > 0.999);
        assert!(sigmoid(-30.0) < 0.001);
    }

    #[test]
    fn test_fit_recovers_positive_slope() {
        // Overlapping classes: mostly 0 below, mostly 1 above, mixed in the
        // middle so the likelihood has a finite maximum.
        let (x, y) = design(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (3.0, 0.0),
            (4.0, 1.0),
            (5.0, 0.0),
            (6.0, 1.0),
            (7.0, 0.0),
            (8.0, 1.0),
            (9.0, 1.0),
            (10.0, 1.0),
            (11.0, 1.0),
        ]);

        let fit = Irls::default().fit(&x, &y, &terms()).unwrap();
        assert!(fit.coefficients[1] > 0.0);
        assert!(fit.standard_errors.iter().all(|&se| se.is_finite() && se > 0.0));
        assert!(fit.iterations >= 1);
        assert!(fit.deviance >= 0.0);
        assert!(fit.deviance <= fit.null_deviance + 1e-9);
        assert!((fit.deviance + 2.0 * fit.log_likelihood).abs() < 1e-9);
    }

    #[test]
    fn test_single_class_is_rejected() {
        let (x, y) = design(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let err = Irls::default().fit(&x, &y, &terms()).unwrap_err();
        assert_eq!(err, FitError::SingleClass);
    }

    #[test]
    fn test_empty_design_is_rejected() {
        let x = Array2::<f64>::zeros((0, 2));
        let y = Array1::<f64>::zeros(0);
        let err = Irls::default().fit(&x, &y, &terms()).unwrap_err();
        assert_eq!(err, FitError::EmptyDesign);
    }

    #[test]
    fn test_zero_variance_column_is_rank_deficient() {
        let x = Array2::from_shape_vec((4, 2), vec![1.0, 5.0, 1.0, 5.0, 1.0, 5.0, 1.0, 5.0])
            .unwrap();
        let y = Array1::from_vec(vec![0.0, 1.0, 0.0, 1.0]);
        let err = Irls::default().fit(&x, &y, &terms()).unwrap_err();
        assert_eq!(
            err,
            FitError::RankDeficient {
                term: "x".to_string()
            }
        );
    }

    #[test]
    fn test_duplicated_column_is_rank_deficient() {
        // Third column repeats the second: XᵀWX is singular.
        let x = Array2::from_shape_vec(
            (4, 3),
            vec![
                1.0, 0.0, 0.0, //
                1.0, 1.0, 1.0, //
                1.0, 2.0, 2.0, //
                1.0, 3.0, 3.0,
            ],
        )
        .unwrap();
        let y = Array1::from_vec(vec![0.0, 1.0, 0.0, 1.0]);
        let all_terms = vec!["(Intercept)".to_string(), "x".to_string(), "x2".to_string()];
        let err = Irls::default().fit(&x, &y, &all_terms).unwrap_err();
        assert!(matches!(err, FitError::RankDeficient { .. }));
    }

    #[test]
    fn test_solve_round_trip() {
        let a = Array2::from_shape_vec((2, 2), vec![4.0, 1.0, 1.0, 3.0]).unwrap();
        let b = Array1::from_vec(vec![1.0, 2.0]);
        let x = solve(&a, &b).unwrap();
        let back = a.dot(&x);
        assert!((back[0] - 1.0).abs() < 1e-12);
        assert!((back[1] - 2.0).abs() < 1e-12);
    }
}
