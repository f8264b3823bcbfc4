//! Output formatting and persistence for summary tables and the fitted
//! model.
//!
//! These files are the hand-off surface for the reporting layer: plain CSV
//! for the three count summaries, pretty JSON for the model summary. No
//! chart or document rendering happens here.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Result;
use csv::WriterBuilder;
use tracing::info;

use crate::model::ModelSummary;

/// Writes the per-year counts as `year,count` rows, years ascending.
pub fn write_year_counts(path: &Path, counts: &BTreeMap<i32, u64>) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(["year", "count"])?;
    for (year, count) in counts {
        writer.write_record([year.to_string(), count.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the per-borough counts as `borough,count` rows in the order given.
pub fn write_borough_counts(path: &Path, counts: &[(String, u64)]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(["borough", "count"])?;
    for (borough, count) in counts {
        writer.write_record([borough.clone(), count.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the per-hour counts as `hour,count` rows. Hours with zero records
/// were omitted upstream, so the rows are sparse.
pub fn write_hour_counts(path: &Path, counts: &BTreeMap<u32, u64>) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(["hour", "count"])?;
    for (hour, count) in counts {
        writer.write_record([hour.to_string(), count.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the fitted-model summary as pretty-printed JSON.
pub fn write_model_summary(path: &Path, summary: &ModelSummary) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(summary)?)?;
    Ok(())
}

/// Logs the coefficient table and fit statistics at info level.
pub fn print_model_summary(summary: &ModelSummary) {
    info!(
        response = %summary.response,
        n_obs = summary.n_obs,
        iterations = summary.iterations,
        reference_borough = summary.reference_borough.as_deref().unwrap_or("-"),
        "Fitted logistic regression"
    );
    info!(
        "{:<22} {:>12} {:>12} {:>8} {:>10} {:>4}",
        "term", "estimate", "std_error", "z", "p", ""
    );
    for t in &summary.terms {
        info!(
            "{:<22} {:>12.6} {:>12.6} {:>8.3} {:>10.4} {:>4}",
            t.term, t.estimate, t.std_error, t.z_value, t.p_value, t.significance
        );
    }
    info!(
        log_likelihood = summary.log_likelihood,
        deviance = summary.deviance,
        null_deviance = summary.null_deviance,
        aic = summary.aic,
        "Fit diagnostics"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_write_year_counts_header_and_order() {
        let path = temp_path("incident_stats_test_years.csv");
        let counts = BTreeMap::from([(2021, 3u64), (2019, 1), (2020, 2)]);

        write_year_counts(&path, &counts).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["year,count", "2019,1", "2020,2", "2021,3"]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_borough_counts_preserves_given_order() {
        let path = temp_path("incident_stats_test_boroughs.csv");
        let counts = vec![("QUEENS".to_string(), 2u64), ("BRONX".to_string(), 1)];

        write_borough_counts(&path, &counts).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["borough,count", "QUEENS,2", "BRONX,1"]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_hour_counts_is_sparse() {
        let path = temp_path("incident_stats_test_hours.csv");
        let counts = BTreeMap::from([(10u32, 1u64), (23, 1)]);

        write_hour_counts(&path, &counts).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // 1 header + 2 data rows, nothing for the other 22 hours
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_model_summary_json_parses_back() {
        let path = temp_path("incident_stats_test_model.json");
        let summary = ModelSummary {
            response: "is_murder".to_string(),
            reference_borough: Some("BRONX".to_string()),
            n_obs: 2,
            iterations: 4,
            terms: vec![],
            log_likelihood: -1.0,
            deviance: 2.0,
            null_deviance: 2.5,
            aic: 8.0,
        };

        write_model_summary(&path, &summary).unwrap();
        print_model_summary(&summary);

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["response"], "is_murder");
        assert_eq!(parsed["n_obs"], 2);

        fs::remove_file(&path).unwrap();
    }
}
