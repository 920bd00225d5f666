//! CSV record codec
//!
//! The dialect shared by the complete backup and the list exports: comma
//! separated, `\n` terminated, fields quoted only when they contain a comma,
//! a double quote or a line break, and quotes escaped by doubling.
//!
//! Decoding never fails. An unterminated quote keeps the field open until
//! the end of the record, so a damaged row loses its tail instead of the
//! whole restore aborting.

use std::borrow::Cow;

/// Field separator
pub const SEPARATOR: char = ',';

/// Record terminator written by the encoder
pub const LINE_TERMINATOR: &str = "\n";

/// Encode a single field, quoting it only if needed
pub fn encode_field(field: &str) -> Cow<'_, str> {
    if field.contains([SEPARATOR, '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Encode a full record (without the terminator)
pub fn encode_record<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut record = String::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            record.push(SEPARATOR);
        }
        record.push_str(&encode_field(field.as_ref()));
    }
    record
}

/// Decode one record into its fields
///
/// A record always yields at least one field; the empty string decodes to
/// a single empty field.
pub fn decode_record(record: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = record.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            SEPARATOR if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    fields.push(current);
    fields
}

/// Split a document into records
///
/// Breaks on `\n`, `\r\n` or a lone `\r`, but only outside quotes, so a
/// quoted field may span lines. A trailing terminator does not produce an
/// extra empty record; blank lines in the middle do.
pub fn split_records(document: &str) -> Vec<&str> {
    let bytes = document.as_bytes();
    let mut records = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_quotes = !in_quotes,
            b'\n' | b'\r' if !in_quotes => {
                records.push(&document[start..i]);
                if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if start < bytes.len() {
        records.push(&document[start..]);
    }

    records
}
