use crate::record::{to_records, Record};
use serde::{Deserialize, Serialize};

/// Header row plus data rows exactly as they appeared in the delimited text.
///
/// Rows are not required to match the header width; positional reads past the
/// end of a short row yield an empty field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimitedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DelimitedTable {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Returns the table with every header trimmed.
    pub fn strip_headers(mut self) -> Self {
        for header in &mut self.headers {
            let trimmed = header.trim();
            if trimmed.len() != header.len() {
                *header = trimmed.to_string();
            }
        }
        self
    }

    pub fn header_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn records(&self) -> Vec<Record> {
        to_records(&self.headers, &self.rows)
    }
}

/// Reads the field at `index`, treating cells past the end of a short row as empty.
pub fn cell(row: &[String], index: Option<usize>) -> &str {
    index
        .and_then(|i| row.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

/// Splits comma-delimited text into a header row and data rows.
///
/// Never fails: an unterminated quote swallows the remainder of the input into
/// the current field. `""` inside a quoted field is a literal quote, and `\r`
/// is dropped everywhere outside quotes.
pub fn parse_csv(text: &str) -> DelimitedTable {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // Something was consumed since the last row break.
    let mut pending = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            pending = true;
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                pending = true;
            }
            ',' => {
                current.push(std::mem::take(&mut field));
                pending = true;
            }
            '\n' => {
                current.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut current));
                pending = false;
            }
            '\r' => {}
            other => {
                field.push(other);
                pending = true;
            }
        }
    }

    if pending {
        current.push(field);
        rows.push(current);
    }

    let mut rows = rows.into_iter();
    let headers = rows.next().unwrap_or_default();
    DelimitedTable {
        headers,
        rows: rows.collect(),
    }
}
