//! Splits raw input lines into field strings
//!
//! A line starting with `[` is read as a JSON array; anything else is
//! delimited text read with the `csv` crate: a field may be wrapped in
//! double quotes and `""` inside quotes stands for a literal quote.

use csv::{ReaderBuilder, StringRecord};
use serde_json::Value;

use crate::errors::{RdfError, Result};

/// Line parser for delimited or JSON-array records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordParser {
    delimiter: u8,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl RecordParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Split a line into its fields
    pub fn parse_line(&self, line: &str) -> Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            parse_json_array(trimmed)
        } else {
            self.parse_delimited(line.trim_end_matches(['\r', '\n']))
        }
    }

    fn parse_delimited(&self, line: &str) -> Result<Vec<String>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(line.as_bytes());

        let mut record = StringRecord::new();
        if !reader.read_record(&mut record).map_err(malformed)? {
            return Ok(vec![String::new()]);
        }
        // A stray record terminator inside the line would start a second record
        if reader.read_record(&mut StringRecord::new()).map_err(malformed)? {
            return Err(RdfError::MalformedLine(format!(
                "embedded record break in {:?}",
                line
            )));
        }
        Ok(record.iter().map(str::to_string).collect())
    }
}

fn malformed(err: csv::Error) -> RdfError {
    RdfError::MalformedLine(err.to_string())
}

fn parse_json_array(line: &str) -> Result<Vec<String>> {
    let values: Vec<Value> = serde_json::from_str(line)
        .map_err(|e| RdfError::MalformedLine(format!("invalid JSON array: {}", e)))?;

    values
        .into_iter()
        .map(|value| match value {
            Value::String(s) => Ok(s),
            Value::Null => Ok(String::new()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(RdfError::MalformedLine(format!(
                "nested JSON value {} is not a field",
                other
            ))),
        })
        .collect()
}
