//! Categorical label sets.
//!
//! A categorical cell is coerced to an explicit tag: either an index into a
//! per-column vocabulary discovered at load time, or [`Label::Unknown`].
//! Nothing here is hardcoded to a particular column's value set.

use std::collections::HashMap;

/// Display name used for the unknown bucket everywhere a label is rendered.
pub const UNKNOWN_NAME: &str = "UNKNOWN";

/// A coerced categorical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Index into the owning [`LabelSet`] vocabulary.
    Known(u16),
    Unknown,
}

/// The vocabulary of one categorical column, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    values: Vec<String>,
    index: HashMap<String, u16>,
}

impl LabelSet {
    /// Builds a vocabulary from the distinct observed values of a column.
    ///
    /// Null markers never enter the vocabulary; they coerce to
    /// [`Label::Unknown`] instead. Order is first-seen order.
    pub fn from_observed<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = LabelSet::default();
        for raw in values {
            let v = raw.trim();
            if is_null_marker(v) || set.index.contains_key(v) {
                continue;
            }
            let id = set.values.len() as u16;
            set.index.insert(v.to_string(), id);
            set.values.push(v.to_string());
        }
        set
    }

    /// Maps a raw cell to a label. Null markers and values outside the
    /// vocabulary become [`Label::Unknown`]; coercion is never fatal.
    pub fn coerce(&self, raw: &str) -> Label {
        let v = raw.trim();
        if is_null_marker(v) {
            return Label::Unknown;
        }
        match self.index.get(v) {
            Some(&id) => Label::Known(id),
            None => Label::Unknown,
        }
    }

    /// Renders a label back to its vocabulary spelling.
    pub fn name(&self, label: Label) -> &str {
        match label {
            Label::Known(id) => &self.values[id as usize],
            Label::Unknown => UNKNOWN_NAME,
        }
    }

    /// Vocabulary entries in discovery order.
    pub fn names(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The dataset's own null conventions: blanks, `(null)`, `NA`/`N/A`, the
/// single-letter `U` used by the sex columns, and anything spelled with an
/// `UNKNOWN` prefix.
pub fn is_null_marker(v: &str) -> bool {
    v.is_empty()
        || v == "(null)"
        || v.eq_ignore_ascii_case("na")
        || v.eq_ignore_ascii_case("n/a")
        || v.eq_ignore_ascii_case("u")
        || v.to_ascii_uppercase().starts_with(UNKNOWN_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_order() {
        let set = LabelSet::from_observed(["BRONX", "QUEENS", "BRONX", "MANHATTAN"]);
        assert_eq!(set.names(), &["BRONX", "QUEENS", "MANHATTAN"]);
        assert_eq!(set.coerce("QUEENS"), Label::Known(1));
    }

    #[test]
    fn test_null_markers_excluded_from_vocabulary() {
        let set = LabelSet::from_observed(["", "UNKNOWN", "(null)", "BROOKLYN"]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.coerce(""), Label::Unknown);
        assert_eq!(set.coerce("UNKNOWN"), Label::Unknown);
    }

    #[test]
    fn test_unrecognized_value_coerces_to_unknown() {
        let set = LabelSet::from_observed(["BRONX", "BROOKLYN"]);
        assert_eq!(set.coerce("UNKNOWN_BORO"), Label::Unknown);
        assert_eq!(set.coerce("STATEN ISLAND"), Label::Unknown);
    }

    #[test]
    fn test_coercion_is_a_fixpoint() {
        // Coercing a label's own rendering yields the same label.
        let set = LabelSet::from_observed(["BRONX", "BROOKLYN"]);
        for label in [set.coerce("BROOKLYN"), set.coerce("nowhere")] {
            assert_eq!(set.coerce(set.name(label)), label);
        }
    }
}
