//! Error taxonomy for the pipeline.
//!
//! Every failure is fatal to the run: this is a one-shot batch job with no
//! partial-result mode. Each variant carries the offending input and, where
//! it exists, the row position so the caller can report exactly what broke.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The dataset could not be fetched or read from disk.
    #[error("source unavailable: {source_loc}: {reason}")]
    SourceUnavailable { source_loc: String, reason: String },

    /// The content is not parseable as delimited tabular data, or a required
    /// column or value is structurally invalid.
    #[error("malformed input{}: {reason}", fmt_row(.row))]
    MalformedInput { reason: String, row: Option<usize> },

    /// A date cell did not parse as month/day/year.
    #[error("unparseable date {value:?} at row {row}")]
    DateParse { value: String, row: usize },

    /// A time cell did not parse as hour:minute:second.
    #[error("unparseable time {value:?} at row {row}")]
    TimeParse { value: String, row: usize },

    /// The regression could not be fitted.
    #[error("model fit failed: {0}")]
    ModelFit(#[from] FitError),
}

/// Degenerate or non-converging regression fits.
#[derive(Error, Debug, PartialEq)]
pub enum FitError {
    #[error("empty design matrix, nothing to fit")]
    EmptyDesign,

    #[error("response has a single observed class")]
    SingleClass,

    #[error("design matrix is rank-deficient at term {term:?}")]
    RankDeficient { term: String },

    #[error("IRLS did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },
}

fn fmt_row(row: &Option<usize>) -> String {
    match row {
        Some(r) => format!(" at row {r}"),
        None => String::new(),
    }
}
