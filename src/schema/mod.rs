//! Schema normalization: raw string rows into typed incident records.
//!
//! Dates and times must parse; a bad value aborts the run with the offending
//! cell and row position. Categorical columns are coerced against
//! vocabularies discovered from the data itself, with an explicit unknown
//! bucket. Columns with no downstream consumer are pruned here, apart from a
//! few kept as optional passthrough strings.

pub mod labels;

pub use labels::{Label, LabelSet, UNKNOWN_NAME};

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use crate::error::{Error, Result};
use crate::loader::RawTable;

const DATE_FORMAT: &str = "%m/%d/%Y";
const TIME_FORMAT: &str = "%H:%M:%S";

// Required input columns, spelled as in the export's header row.
const COL_DATE: &str = "OCCUR_DATE";
const COL_TIME: &str = "OCCUR_TIME";
const COL_BOROUGH: &str = "BORO";
const COL_PERP_AGE: &str = "PERP_AGE_GROUP";
const COL_PERP_SEX: &str = "PERP_SEX";
const COL_PERP_RACE: &str = "PERP_RACE";
const COL_VIC_AGE: &str = "VIC_AGE_GROUP";
const COL_VIC_SEX: &str = "VIC_SEX";
const COL_VIC_RACE: &str = "VIC_RACE";
const COL_JURISDICTION: &str = "JURISDICTION_CODE";
const COL_MURDER: &str = "STATISTICAL_MURDER_FLAG";

// Optional passthrough columns, kept verbatim when present.
const COL_PRECINCT: &str = "PRECINCT";
const COL_LOCATION_DESC: &str = "LOCATION_DESC";
const COL_LATITUDE: &str = "Latitude";
const COL_LONGITUDE: &str = "Longitude";

/// One normalized incident. Loaded once, enriched with `year`/`hour`, then
/// only read.
#[derive(Debug, Clone)]
pub struct Incident {
    pub occurred_date: NaiveDate,
    pub occurred_time: NaiveTime,
    pub year: i32,
    pub hour: u32,
    pub borough: Label,
    pub perpetrator_age_group: Label,
    pub perpetrator_sex: Label,
    pub perpetrator_race: Label,
    pub victim_age_group: Label,
    pub victim_sex: Label,
    pub victim_race: Label,
    pub jurisdiction_code: Label,
    pub is_murder: bool,
    pub precinct: Option<String>,
    pub location_desc: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// Per-column vocabularies discovered during normalization.
#[derive(Debug, Clone, Default)]
pub struct Vocabularies {
    pub borough: LabelSet,
    pub perpetrator_age_group: LabelSet,
    pub perpetrator_sex: LabelSet,
    pub perpetrator_race: LabelSet,
    pub victim_age_group: LabelSet,
    pub victim_sex: LabelSet,
    pub victim_race: LabelSet,
    pub jurisdiction_code: LabelSet,
}

/// Normalizer output: the typed record set plus the vocabularies needed to
/// render labels and build the model's design matrix.
#[derive(Debug, Default)]
pub struct NormalizedData {
    pub incidents: Vec<Incident>,
    pub vocab: Vocabularies,
}

/// Extracts the calendar year of a date. Applying this to an already-derived
/// record's date returns the stored `year` unchanged.
pub fn year_of(date: NaiveDate) -> i32 {
    date.year()
}

/// Extracts the hour-of-day (0–23) of a time.
pub fn hour_of(time: NaiveTime) -> u32 {
    time.hour()
}

/// Normalizes the raw table into typed incidents.
///
/// # Errors
///
/// [`Error::MalformedInput`] for a missing required column or an
/// uninterpretable outcome flag, [`Error::DateParse`] / [`Error::TimeParse`]
/// for unparseable cells. Row positions are 1-based over data rows.
pub fn normalize(table: &RawTable) -> Result<NormalizedData> {
    let date_col = require_column(table, COL_DATE)?;
    let time_col = require_column(table, COL_TIME)?;
    let murder_col = require_column(table, COL_MURDER)?;

    let borough_col = require_column(table, COL_BOROUGH)?;
    let perp_age_col = require_column(table, COL_PERP_AGE)?;
    let perp_sex_col = require_column(table, COL_PERP_SEX)?;
    let perp_race_col = require_column(table, COL_PERP_RACE)?;
    let vic_age_col = require_column(table, COL_VIC_AGE)?;
    let vic_sex_col = require_column(table, COL_VIC_SEX)?;
    let vic_race_col = require_column(table, COL_VIC_RACE)?;
    let jurisdiction_col = require_column(table, COL_JURISDICTION)?;

    let precinct_col = table.column(COL_PRECINCT);
    let location_col = table.column(COL_LOCATION_DESC);
    let latitude_col = table.column(COL_LATITUDE);
    let longitude_col = table.column(COL_LONGITUDE);

    // First pass: the enumerable value set of every categorical column is
    // whatever the loaded data actually contains.
    let vocab = Vocabularies {
        borough: observe(table, borough_col),
        perpetrator_age_group: observe(table, perp_age_col),
        perpetrator_sex: observe(table, perp_sex_col),
        perpetrator_race: observe(table, perp_race_col),
        victim_age_group: observe(table, vic_age_col),
        victim_sex: observe(table, vic_sex_col),
        victim_race: observe(table, vic_race_col),
        jurisdiction_code: observe(table, jurisdiction_col),
    };

    let mut incidents = Vec::with_capacity(table.len());

    for (i, cells) in table.rows.iter().enumerate() {
        let row = i + 1;

        let date_raw = cells[date_col].trim();
        let occurred_date =
            NaiveDate::parse_from_str(date_raw, DATE_FORMAT).map_err(|_| Error::DateParse {
                value: date_raw.to_string(),
                row,
            })?;

        let time_raw = cells[time_col].trim();
        let occurred_time =
            NaiveTime::parse_from_str(time_raw, TIME_FORMAT).map_err(|_| Error::TimeParse {
                value: time_raw.to_string(),
                row,
            })?;

        let is_murder = parse_flag(cells[murder_col].trim(), row)?;

        incidents.push(Incident {
            occurred_date,
            occurred_time,
            year: year_of(occurred_date),
            hour: hour_of(occurred_time),
            borough: vocab.borough.coerce(&cells[borough_col]),
            perpetrator_age_group: vocab.perpetrator_age_group.coerce(&cells[perp_age_col]),
            perpetrator_sex: vocab.perpetrator_sex.coerce(&cells[perp_sex_col]),
            perpetrator_race: vocab.perpetrator_race.coerce(&cells[perp_race_col]),
            victim_age_group: vocab.victim_age_group.coerce(&cells[vic_age_col]),
            victim_sex: vocab.victim_sex.coerce(&cells[vic_sex_col]),
            victim_race: vocab.victim_race.coerce(&cells[vic_race_col]),
            jurisdiction_code: vocab.jurisdiction_code.coerce(&cells[jurisdiction_col]),
            is_murder,
            precinct: passthrough(cells, precinct_col),
            location_desc: passthrough(cells, location_col),
            latitude: passthrough(cells, latitude_col),
            longitude: passthrough(cells, longitude_col),
        });
    }

    Ok(NormalizedData { incidents, vocab })
}

fn require_column(table: &RawTable, name: &str) -> Result<usize> {
    table.column(name).ok_or_else(|| Error::MalformedInput {
        reason: format!("missing required column {name}"),
        row: None,
    })
}

fn observe(table: &RawTable, col: usize) -> LabelSet {
    LabelSet::from_observed(table.rows.iter().map(|cells| cells[col].as_str()))
}

fn passthrough(cells: &[String], col: Option<usize>) -> Option<String> {
    let col = col?;
    let v = cells[col].trim();
    if v.is_empty() { None } else { Some(v.to_string()) }
}

/// The export has spelled its boolean flag several ways over the years.
fn parse_flag(raw: &str, row: usize) -> Result<bool> {
    match raw.to_ascii_uppercase().as_str() {
        "TRUE" | "YES" | "Y" | "1" => Ok(true),
        "FALSE" | "NO" | "N" | "0" => Ok(false),
        _ => Err(Error::MalformedInput {
            reason: format!("uninterpretable outcome flag {raw:?}"),
            row: Some(row),
        }),
    }
}
