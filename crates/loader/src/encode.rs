//! Row encoding for spool lines.
//!
//! One row becomes one line: field values joined by `|`, nulls rendered
//! as `\N`, and literal `\` and `|` inside text escaped as `\\` and `\|`.
//! The record terminator (`\n`) is appended when the line hits the spool,
//! not here. The escaping pairs with the `ESCAPE` modifier on the load
//! command, so values decode back exactly.
//!
//! Newlines inside text values are not escaped. A value carrying the
//! record terminator breaks line framing; keep such values out of rows
//! until the escape set grows.
//!
//! Row arity is not validated against the table's field list; mismatches
//! surface when the warehouse loads the file.

use std::fmt::Write;

/// Field separator within a spool line.
pub const FIELD_DELIMITER: char = '|';

/// Marker the warehouse reads back as SQL NULL.
pub const NULL_TOKEN: &str = "\\N";

/// One row of datums, in table field order.
pub type Row = Vec<Datum>;

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::Text(value.to_string())
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Datum::Text(value)
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Datum::Int(value)
    }
}

impl From<i32> for Datum {
    fn from(value: i32) -> Self {
        Datum::Int(value.into())
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::Float(value)
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Datum::Bool(value)
    }
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Datum::Null,
        }
    }
}

/// Encodes `row` into a fresh string, without the record terminator.
pub fn encode_row(row: &[Datum]) -> String {
    let mut out = String::new();
    encode_row_into(&mut out, row);
    out
}

/// Encodes `row` into `out`, clearing it first. Lets the caller reuse one
/// buffer across many rows.
pub fn encode_row_into(out: &mut String, row: &[Datum]) {
    out.clear();
    for (index, datum) in row.iter().enumerate() {
        if index > 0 {
            out.push(FIELD_DELIMITER);
        }
        match datum {
            Datum::Null => out.push_str(NULL_TOKEN),
            Datum::Bool(value) => out.push_str(if *value { "true" } else { "false" }),
            Datum::Int(value) => {
                let _ = write!(out, "{value}");
            }
            Datum::Float(value) => {
                let _ = write!(out, "{value}");
            }
            Datum::Text(value) => push_escaped(out, value),
        }
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\|"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
#[path = "encode_test.rs"]
mod encode_test;
