//! Grouped summary counts over the normalized record set.
//!
//! Three independent summaries: per year, per borough, per hour-of-day.
//! Every summary's counts sum to the total record count; nothing is dropped
//! or double-counted. Hours with zero records are omitted (the hour map is
//! sparse), and the borough listing follows vocabulary discovery order with
//! the unknown bucket last.

use std::collections::BTreeMap;

use crate::schema::{Incident, Label, LabelSet, UNKNOWN_NAME};

/// Record count per calendar year. `BTreeMap` iteration gives ascending
/// years.
pub fn count_by_year(incidents: &[Incident]) -> BTreeMap<i32, u64> {
    let mut counts = BTreeMap::new();
    for inc in incidents {
        *counts.entry(inc.year).or_insert(0) += 1;
    }
    counts
}

/// Record count per borough label, in discovery order, with an `UNKNOWN`
/// entry appended when any record coerced to the unknown bucket.
pub fn count_by_borough(incidents: &[Incident], boroughs: &LabelSet) -> Vec<(String, u64)> {
    let mut known = vec![0u64; boroughs.len()];
    let mut unknown = 0u64;

    for inc in incidents {
        match inc.borough {
            Label::Known(id) => known[id as usize] += 1,
            Label::Unknown => unknown += 1,
        }
    }

    let mut counts: Vec<(String, u64)> = boroughs
        .names()
        .iter()
        .zip(known)
        .map(|(name, n)| (name.clone(), n))
        .collect();
    if unknown > 0 {
        counts.push((UNKNOWN_NAME.to_string(), unknown));
    }
    counts
}

/// Record count per hour-of-day. Hours with no records are omitted.
pub fn count_by_hour(incidents: &[Incident]) -> BTreeMap<u32, u64> {
    let mut counts = BTreeMap::new();
    for inc in incidents {
        *counts.entry(inc.hour).or_insert(0) += 1;
    }
    counts
}
