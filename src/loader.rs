//! CSV parsing into an in-memory raw table.
//!
//! Column names are preserved exactly as given by the header row; cells stay
//! strings. Typing is the normalizer's job.

use crate::error::{Error, Result};

/// The loaded dataset before any typing: a header row plus uniform-width
/// string rows.
#[derive(Debug)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Index of a named column, as spelled in the input header.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Parses raw bytes as comma-delimited tabular data with a header row.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if the bytes are not valid CSV: bad
/// UTF-8, a ragged row, or a missing header row. The row position of the
/// offending record is included when the parser reports one.
pub fn parse_table(bytes: &[u8]) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(malformed)?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() {
        return Err(Error::MalformedInput {
            reason: "missing header row".to_string(),
            row: None,
        });
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(malformed)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

fn malformed(e: csv::Error) -> Error {
    let row = e.position().map(|p| p.record() as usize);
    Error::MalformedInput {
        reason: e.to_string(),
        row,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let data = b"A,B\n1,2\n3,4\n";
        let table = parse_table(data).unwrap();
        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["3", "4"]);
    }

    #[test]
    fn test_headers_preserved_verbatim() {
        let data = b"OCCUR_DATE,Lon_Lat\n01/01/2020,x\n";
        let table = parse_table(data).unwrap();
        assert_eq!(table.column("OCCUR_DATE"), Some(0));
        assert_eq!(table.column("Lon_Lat"), Some(1));
        assert_eq!(table.column("lon_lat"), None);
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let data = b"A,B\n1,2\n3\n";
        let err = parse_table(data).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { .. }));
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let err = parse_table(b"").unwrap_err();
        assert!(matches!(err, Error::MalformedInput { .. }));
    }

    #[test]
    fn test_header_only_input_is_empty_table() {
        let table = parse_table(b"A,B\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }
}
