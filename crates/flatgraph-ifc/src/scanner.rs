// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line scanner for exchange text
//!
//! Exchange documents are line oriented: one `#id=TYPE(body);` record per
//! line. Lines not matching that structural pattern (blank lines, section
//! markers, header fields) are skipped, never errors. The body close is
//! found with the same quote-aware scan the tokenizer uses, so a `);` inside
//! a quoted run does not terminate the record.

use memchr::memchr;
use nom::{bytes::complete::take_while1, character::complete::char, Parser};
use serde::{Deserialize, Serialize};

/// Iterator over lines with 1-based line numbers
pub(crate) struct RecordLines<'a> {
    content: &'a str,
    pos: usize,
    line_no: usize,
}

impl<'a> RecordLines<'a> {
    pub(crate) fn new(content: &'a str) -> Self {
        Self {
            content,
            pos: 0,
            line_no: 0,
        }
    }
}

impl<'a> Iterator for RecordLines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.content.len() {
            return None;
        }
        self.line_no += 1;
        let rest = &self.content.as_bytes()[self.pos..];
        let (line, advance) = match memchr(b'\n', rest) {
            Some(newline) => (&self.content[self.pos..self.pos + newline], newline + 1),
            None => (&self.content[self.pos..], rest.len()),
        };
        self.pos += advance;
        Some((self.line_no, line.trim_end_matches('\r')))
    }
}

/// Match one line against the `#<id>=<TYPE>(<body>);` structural pattern.
///
/// Returns `(id, type_name, body)` on a match, None otherwise.
pub(crate) fn match_record_line(line: &str) -> Option<(u32, &str, &str)> {
    let line = line.trim();
    let (rest, _) = char::<&str, nom::error::Error<&str>>('#').parse(line).ok()?;
    let (rest, digits) =
        take_while1::<_, &str, nom::error::Error<&str>>(|c: char| c.is_ascii_digit())
            .parse(rest)
            .ok()?;
    let id: u32 = digits.parse().ok()?;
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let (rest, type_name) = take_while1::<_, &str, nom::error::Error<&str>>(|c: char| {
        c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
    })
    .parse(rest)
    .ok()?;
    let rest = rest.trim_start().strip_prefix('(')?;
    let body_end = find_body_end(rest)?;
    let body = &rest[..body_end];
    let tail = rest[body_end + 1..].trim_start().strip_prefix(';')?;
    if !tail.trim().is_empty() {
        return None;
    }
    Some((id, type_name, body))
}

/// Find the closing parenthesis of a record body, honoring quote runs.
fn find_body_end(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut in_single = false;
    let mut in_double = false;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' if !in_double => {
                if in_single && i + 1 < bytes.len() && bytes[i + 1] == b'\'' {
                    i += 2;
                    continue;
                }
                in_single = !in_single;
            }
            b'"' if !in_single => in_double = !in_double,
            b'(' if !in_single && !in_double => depth += 1,
            b')' if !in_single && !in_double => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Header information extracted from the exchange file HEADER section
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderInfo {
    /// Schema version from FILE_SCHEMA
    pub schema_version: String,
    /// File name from FILE_NAME
    pub file_name: Option<String>,
    /// Timestamp from FILE_NAME
    pub timestamp: Option<String>,
}

/// Parse the HEADER section to extract metadata
pub fn parse_header(content: &str) -> HeaderInfo {
    let mut info = HeaderInfo::default();

    let header_start = content.find("HEADER;").unwrap_or(0);
    let header_end = content.find("ENDSEC;").unwrap_or(content.len());
    let header = &content[header_start..header_end];

    // FILE_SCHEMA(('IFC4'));
    if let Some(schema_start) = header.find("FILE_SCHEMA") {
        if let Some(paren_start) = header[schema_start..].find("((") {
            let start = schema_start + paren_start + 2;
            if let Some((schema, _)) = parse_header_string(&header[start..]) {
                info.schema_version = schema;
            }
        }
    }

    // FILE_NAME('name','timestamp',...);
    if let Some(name_start) = header.find("FILE_NAME") {
        if let Some(paren_start) = header[name_start..].find('(') {
            let start = name_start + paren_start + 1;
            if let Some((file_name, rest)) = parse_header_string(&header[start..]) {
                if !file_name.is_empty() {
                    info.file_name = Some(file_name);
                }
                if let Some(comma) = rest.find(',') {
                    if let Some((timestamp, _)) = parse_header_string(&rest[comma + 1..]) {
                        if !timestamp.is_empty() {
                            info.timestamp = Some(timestamp);
                        }
                    }
                }
            }
        }
    }

    info
}

/// Parse a quoted string from header content ('value')
fn parse_header_string(s: &str) -> Option<(String, &str)> {
    let s = s.trim_start();
    if !s.starts_with('\'') {
        if s.starts_with('$') {
            return Some((String::new(), &s[1..]));
        }
        return None;
    }

    let mut end = 1;
    let bytes = s.as_bytes();
    while end < bytes.len() {
        if bytes[end] == b'\'' {
            if end + 1 < bytes.len() && bytes[end + 1] == b'\'' {
                end += 2;
                continue;
            }
            break;
        }
        end += 1;
    }

    let value = s[1..end].replace("''", "'");
    Some((value, &s[end + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_plain_record_line() {
        let (id, type_name, body) =
            match_record_line("#12=IFCWALL('guid',$,'Wand 1',$,$,$,$,$);").unwrap();
        assert_eq!(id, 12);
        assert_eq!(type_name, "IFCWALL");
        assert_eq!(body, "'guid',$,'Wand 1',$,$,$,$,$");
    }

    #[test]
    fn test_non_matching_lines_are_skipped() {
        assert!(match_record_line("ISO-10303-21;").is_none());
        assert!(match_record_line("DATA;").is_none());
        assert!(match_record_line("").is_none());
        assert!(match_record_line("#12=broken(").is_none());
    }

    #[test]
    fn test_close_inside_quotes_does_not_terminate() {
        let (_, _, body) = match_record_line("#1=IFCPROPERTYSET('a);b',$,'P',$,(#2));").unwrap();
        assert_eq!(body, "'a);b',$,'P',$,(#2)");
    }

    #[test]
    fn test_whitespace_tolerated_around_equals() {
        let (id, type_name, _) = match_record_line("#3 = IFCSIUNIT(*,.LENGTHUNIT.,$,.METRE.);").unwrap();
        assert_eq!(id, 3);
        assert_eq!(type_name, "IFCSIUNIT");
    }

    #[test]
    fn test_record_lines_numbers() {
        let lines: Vec<(usize, &str)> = RecordLines::new("a\nb\r\nc").collect();
        assert_eq!(lines, vec![(1, "a"), (2, "b"), (3, "c")]);
    }

    #[test]
    fn test_parse_header() {
        let content = "ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION((''),'2;1');\nFILE_NAME('areaal.ifc','2024-06-01T10:00:00',('Beheerder'),(''),'','','');\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n";
        let info = parse_header(content);
        assert_eq!(info.schema_version, "IFC4");
        assert_eq!(info.file_name.as_deref(), Some("areaal.ifc"));
        assert_eq!(info.timestamp.as_deref(), Some("2024-06-01T10:00:00"));
    }
}
