//! Delimiter and header inference for flat files without a schema.

use crate::utils::parse_numeric_field;

/// Delimiters tried against the first line, in tie-break order.
pub const CANDIDATE_DELIMITERS: [char; 4] = [',', '\t', ';', '|'];

/// Delimiter used when no candidate occurs on the first line.
pub const DEFAULT_DELIMITER: char = ',';

/// Layout of a delimited file, inferred from its first non-blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub delimiter: char,
    pub has_header: bool,
    pub columns: Vec<String>,
}

impl Schema {
    /// Infer delimiter, header presence and column names from `first_line`.
    pub fn infer(first_line: &str) -> Self {
        let delimiter = detect_delimiter(first_line);
        let has_header = has_header(first_line, delimiter);
        let columns = if has_header {
            first_line
                .split(delimiter)
                .map(|name| name.trim().to_string())
                .collect()
        } else {
            synthesize_column_names(first_line.split(delimiter).count())
        };

        Schema {
            delimiter,
            has_header,
            columns,
        }
    }
}

/// Pick the candidate with the most occurrences on `line`.
///
/// Ties keep the earlier candidate, so a line with no candidates (or a tie
/// involving the comma) yields a comma.
pub fn detect_delimiter(line: &str) -> char {
    let mut detected = DEFAULT_DELIMITER;
    let mut max_count = 0;

    for candidate in CANDIDATE_DELIMITERS {
        let count = line.matches(candidate).count();
        if count > max_count {
            max_count = count;
            detected = candidate;
        }
    }

    detected
}

/// A line is a header when none of its fields reads as a finite number.
///
/// A single numeric-looking token disables header detection for the whole line.
pub fn has_header(line: &str, delimiter: char) -> bool {
    !line
        .split(delimiter)
        .any(|field| parse_numeric_field(field.trim()).is_some())
}

/// `Column1..ColumnN`.
pub fn synthesize_column_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Column{i}")).collect()
}
