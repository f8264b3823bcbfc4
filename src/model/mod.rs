//! Exploratory model: is a recorded incident a murder?
//!
//! One logistic regression of the murder flag on `year`, `hour`, and
//! `borough`. Borough enters as a categorical predictor with the
//! first-discovered label as the reference level; the unknown bucket, when
//! present, is its own trailing level.

pub mod logistic;

use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::error::{FitError, Result};
use crate::model::logistic::Irls;
use crate::schema::{Incident, Label, LabelSet, UNKNOWN_NAME};

/// One fitted term: estimate, Wald inference, and an R-style significance
/// code.
#[derive(Debug, Clone, Serialize)]
pub struct CoefficientEstimate {
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    pub z_value: f64,
    pub p_value: f64,
    pub significance: String,
}

/// The fitted-model summary handed to the reporting layer.
#[derive(Debug, Serialize)]
pub struct ModelSummary {
    pub response: String,
    pub reference_borough: Option<String>,
    pub n_obs: usize,
    pub iterations: usize,
    pub terms: Vec<CoefficientEstimate>,
    pub log_likelihood: f64,
    pub deviance: f64,
    pub null_deviance: f64,
    pub aic: f64,
}

/// Fits `is_murder ~ year + hour + borough` over the normalized records.
///
/// # Errors
///
/// [`crate::error::Error::ModelFit`] when the record set is empty, the
/// response has a single observed class, the design is rank-deficient
/// (e.g. a borough level with zero variance), or IRLS fails to converge.
pub fn fit_murder_model(incidents: &[Incident], boroughs: &LabelSet) -> Result<ModelSummary> {
    if incidents.is_empty() {
        return Err(FitError::EmptyDesign.into());
    }

    // Borough levels in discovery order; records that coerced to the unknown
    // bucket get a trailing level of their own.
    let mut levels: Vec<String> = boroughs.names().to_vec();
    let has_unknown = incidents
        .iter()
        .any(|inc| matches!(inc.borough, Label::Unknown));
    if has_unknown {
        levels.push(UNKNOWN_NAME.to_string());
    }

    let mut terms = vec![
        "(Intercept)".to_string(),
        "year".to_string(),
        "hour".to_string(),
    ];
    for level in levels.iter().skip(1) {
        terms.push(format!("borough[{level}]"));
    }

    let n = incidents.len();
    let k = terms.len();
    let mut x = Array2::<f64>::zeros((n, k));
    let mut y = Array1::<f64>::zeros(n);

    for (i, inc) in incidents.iter().enumerate() {
        x[[i, 0]] = 1.0;
        x[[i, 1]] = f64::from(inc.year);
        x[[i, 2]] = f64::from(inc.hour);

        let level = match inc.borough {
            Label::Known(id) => id as usize,
            Label::Unknown => levels.len() - 1,
        };
        if level > 0 {
            x[[i, 3 + (level - 1)]] = 1.0;
        }

        y[i] = if inc.is_murder { 1.0 } else { 0.0 };
    }

    let fit = Irls::default().fit(&x, &y, &terms)?;

    let estimates = terms
        .iter()
        .enumerate()
        .map(|(j, term)| {
            let estimate = fit.coefficients[j];
            let std_error = fit.standard_errors[j];
            let z_value = if std_error > 0.0 {
                estimate / std_error
            } else {
                f64::NAN
            };
            let p_value = two_sided_p(z_value);
            CoefficientEstimate {
                term: term.clone(),
                estimate,
                std_error,
                z_value,
                p_value,
                significance: significance_code(p_value).to_string(),
            }
        })
        .collect();

    Ok(ModelSummary {
        response: "is_murder".to_string(),
        reference_borough: levels.first().cloned(),
        n_obs: n,
        iterations: fit.iterations,
        terms: estimates,
        log_likelihood: fit.log_likelihood,
        deviance: fit.deviance,
        null_deviance: fit.null_deviance,
        aic: fit.deviance + 2.0 * k as f64,
    })
}

/// Two-sided p-value for a Wald z statistic under the normal approximation.
fn two_sided_p(z: f64) -> f64 {
    if !z.is_finite() {
        return f64::NAN;
    }
    (2.0 * (1.0 - normal_cdf(z.abs()))).clamp(0.0, 1.0)
}

fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Abramowitz & Stegun 7.1.26 rational approximation, |error| < 1.5e-7.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    sign * (1.0 - poly * (-x * x).exp())
}

/// R's printed significance codes.
fn significance_code(p: f64) -> &'static str {
    match p {
        p if p < 0.001 => "***",
        p if p < 0.01 => "**",
        p if p < 0.05 => "*",
        p if p < 0.1 => ".",
        _ => "",
    }
}
