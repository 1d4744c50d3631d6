// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field tokenizer for record bodies
//!
//! Splits a record body character by character: parenthesis nesting depth and
//! single/double quote runs are tracked independently, and the comma only
//! terminates a field at depth zero outside any quote run. Quote delimiters
//! are stripped from emitted fields, `$` decodes to null, `#id` to an
//! unresolved back-reference, and a parenthesized group recurses into the
//! same splitter.

use crate::record::{Field, RecordId};

/// Split a record body into raw top-level field slices.
///
/// A trailing empty field before the closing parenthesis is preserved as an
/// empty slice, not dropped.
pub fn split_fields(body: &str) -> Vec<&str> {
    if body.trim().is_empty() {
        return Vec::new();
    }
    let bytes = body.as_bytes();
    let mut fields = Vec::new();
    let mut depth = 0usize;
    let mut in_single = false;
    let mut in_double = false;
    let mut start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' if !in_double => {
                // doubled quote inside a run is an escaped quote
                if in_single && i + 1 < bytes.len() && bytes[i + 1] == b'\'' {
                    i += 2;
                    continue;
                }
                in_single = !in_single;
            }
            b'"' if !in_single => in_double = !in_double,
            b'(' if !in_single && !in_double => depth += 1,
            b')' if !in_single && !in_double => depth = depth.saturating_sub(1),
            b',' if depth == 0 && !in_single && !in_double => {
                fields.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    fields.push(&body[start..]);
    fields
}

/// Decode one raw field slice into a typed field.
pub fn parse_field(raw: &str) -> Field {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Field::Str(String::new());
    }
    if trimmed == "$" {
        return Field::Null;
    }
    if let Some(digits) = trimmed.strip_prefix('#') {
        if let Ok(id) = digits.parse::<u32>() {
            return Field::Ref(RecordId(id));
        }
    }
    if trimmed.starts_with('(') && trimmed.ends_with(')') {
        let inner = &trimmed[1..trimmed.len() - 1];
        let items = split_fields(inner).into_iter().map(parse_field).collect();
        return Field::Tuple(items);
    }
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        let inner = &trimmed[1..trimmed.len() - 1];
        return Field::Str(inner.replace("''", "'"));
    }
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        return Field::Str(trimmed[1..trimmed.len() - 1].to_string());
    }
    Field::Str(trimmed.to_string())
}

/// Tokenize a whole record body into typed fields.
pub fn tokenize_body(body: &str) -> Vec<Field> {
    split_fields(body).into_iter().map(parse_field).collect()
}
