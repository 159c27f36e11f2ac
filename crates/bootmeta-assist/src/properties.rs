//! A range-preserving parser for `.properties` configuration files.
//!
//! Tooling support, not full spec compliance: logical-line continuations,
//! `=`/`:`/whitespace separators, `#`/`!` comments and the usual backslash
//! escapes are handled; exotic corners of the format are not.

use crate::types::Span;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyEntry {
    pub key: String,
    pub value: String,
    pub key_span: Span,
    pub value_span: Span,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertiesFile {
    pub entries: Vec<PropertyEntry>,
}

impl PropertiesFile {
    #[must_use]
    pub fn entry_at(&self, offset: usize) -> Option<&PropertyEntry> {
        self.entries
            .iter()
            .find(|e| e.key_span.contains(offset) || e.value_span.contains(offset))
    }
}

/// One logical line: physical lines joined across `\` continuations, with a
/// map from each logical byte back to its original offset.
struct LogicalLine {
    bytes: Vec<u8>,
    offsets: Vec<usize>,
    span: Span,
}

/// Parse a `.properties` document into key/value entries with source spans.
#[must_use]
pub fn parse(text: &str) -> PropertiesFile {
    let bytes = text.as_bytes();
    let mut entries = Vec::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let before = pos;
        let line = next_logical_line(bytes, &mut pos);
        if let Some(entry) = split_entry(&line) {
            entries.push(entry);
        }
        // Guarantee forward progress.
        if pos == before {
            pos += 1;
        }
    }

    PropertiesFile { entries }
}

fn next_logical_line(bytes: &[u8], pos: &mut usize) -> LogicalLine {
    let start = *pos;
    let mut out = Vec::new();
    let mut offsets = Vec::new();

    loop {
        let seg_start = *pos;
        let mut eol = seg_start;
        while eol < bytes.len() && bytes[eol] != b'\n' {
            eol += 1;
        }
        let mut content_end = eol;
        if content_end > seg_start && bytes[content_end - 1] == b'\r' {
            content_end -= 1;
        }

        let continued = trailing_backslash_is_odd(&bytes[seg_start..content_end]);
        let take = if continued {
            content_end.saturating_sub(1)
        } else {
            content_end
        };
        for i in seg_start..take {
            out.push(bytes[i]);
            offsets.push(i);
        }

        *pos = if eol < bytes.len() { eol + 1 } else { eol };
        if !continued {
            break;
        }
        // The next physical line's leading whitespace is not part of the value.
        while *pos < bytes.len() && matches!(bytes[*pos], b' ' | b'\t' | b'\x0C') {
            *pos += 1;
        }
    }

    LogicalLine {
        bytes: out,
        offsets,
        span: Span::new(start, *pos),
    }
}

fn trailing_backslash_is_odd(line: &[u8]) -> bool {
    line.iter().rev().take_while(|b| **b == b'\\').count() % 2 == 1
}

fn split_entry(line: &LogicalLine) -> Option<PropertyEntry> {
    let bytes = &line.bytes;
    let mut i = 0usize;
    while i < bytes.len() && is_space(bytes[i]) {
        i += 1;
    }
    if i >= bytes.len() || bytes[i] == b'#' || bytes[i] == b'!' {
        return None;
    }

    let key_start = i;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'=' | b':' => break,
            b if is_space(b) => break,
            _ => i += 1,
        }
    }
    let key_end = i.min(bytes.len());

    while i < bytes.len() && is_space(bytes[i]) {
        i += 1;
    }
    if i < bytes.len() && matches!(bytes[i], b'=' | b':') {
        i += 1;
    }
    while i < bytes.len() && is_space(bytes[i]) {
        i += 1;
    }
    let value_start = i;

    Some(PropertyEntry {
        key: unescape(&bytes[key_start..key_end]),
        value: unescape(&bytes[value_start..]),
        key_span: span_of(line, key_start, key_end),
        value_span: span_of(line, value_start, bytes.len()),
    })
}

fn span_of(line: &LogicalLine, logical_start: usize, logical_end: usize) -> Span {
    if logical_start >= logical_end || logical_start >= line.offsets.len() {
        // Empty slice: anchor a zero-width span at the logical position.
        let at = line
            .offsets
            .get(logical_start)
            .copied()
            .unwrap_or(line.span.end);
        return Span::new(at, at);
    }
    let start = line.offsets[logical_start];
    let last = (logical_end - 1).min(line.offsets.len() - 1);
    Span::new(start, line.offsets[last] + 1)
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\x0C')
}

fn unescape(bytes: &[u8]) -> String {
    // Multi-byte UTF-8 sequences pass through untouched; escapes splice in
    // the encoded replacement. Decode once at the end.
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        i += 1;
        let Some(&b) = bytes.get(i) else {
            out.push(b'\\');
            break;
        };
        match b {
            b't' => out.push(b'\t'),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b'f' => out.push(b'\x0C'),
            b'u' => {
                if i + 4 < bytes.len() {
                    let code = bytes[i + 1..=i + 4]
                        .iter()
                        .fold(0u32, |acc, b| (acc << 4) | u32::from(hex_digit(*b)));
                    if let Some(ch) = char::from_u32(code) {
                        let mut buf = [0u8; 4];
                        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                        i += 4;
                    }
                } else {
                    out.push(b'u');
                }
            }
            other => out.push(other),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => 10 + (b - b'a'),
        b'A'..=b'F' => 10 + (b - b'A'),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn slice(text: &str, span: Span) -> &str {
        &text[span.start..span.end]
    }

    #[test]
    fn parses_entries_with_spans() {
        let text = "# config\nserver.port=8080\nspring.datasource.url : jdbc:h2:mem:test\n";
        let file = parse(text);
        assert_eq!(file.entries.len(), 2);

        let port = &file.entries[0];
        assert_eq!(port.key, "server.port");
        assert_eq!(port.value, "8080");
        assert_eq!(slice(text, port.key_span), "server.port");
        assert_eq!(slice(text, port.value_span), "8080");

        let url = &file.entries[1];
        assert_eq!(url.key, "spring.datasource.url");
        assert_eq!(url.value, "jdbc:h2:mem:test");
        assert_eq!(slice(text, url.value_span), "jdbc:h2:mem:test");
    }

    #[test]
    fn joins_continuation_lines() {
        let text = "spring.profiles.active=dev,\\\n    local\n";
        let file = parse(text);
        assert_eq!(file.entries.len(), 1);
        assert_eq!(file.entries[0].value, "dev,local");
        assert_eq!(slice(text, file.entries[0].key_span), "spring.profiles.active");
    }

    #[test]
    fn handles_escapes_and_bang_comments() {
        let text = "! note\ngreeting=hello\\u0021\ntabbed\\tkey=v\n";
        let file = parse(text);
        assert_eq!(file.entries.len(), 2);
        assert_eq!(file.entries[0].value, "hello!");
        assert_eq!(file.entries[1].key, "tabbed\tkey");
    }

    #[test]
    fn non_ascii_text_survives_intact() {
        let text = "greeting=héllo wörld\ncafe=caf\\u00e9\n";
        let file = parse(text);
        assert_eq!(file.entries[0].value, "héllo wörld");
        assert_eq!(slice(text, file.entries[0].value_span), "héllo wörld");
        assert_eq!(file.entries[1].value, "café");
    }

    #[test]
    fn key_without_separator_has_empty_value() {
        let file = parse("standalone\n");
        assert_eq!(file.entries.len(), 1);
        assert_eq!(file.entries[0].key, "standalone");
        assert_eq!(file.entries[0].value, "");
        assert!(file.entries[0].value_span.is_empty());
    }

    #[test]
    fn entry_at_finds_the_entry_under_the_cursor() {
        let text = "a.b=1\nc.d=2\n";
        let file = parse(text);
        let offset = text.find("c.d").unwrap() + 1;
        assert_eq!(file.entry_at(offset).unwrap().key, "c.d");
    }
}
