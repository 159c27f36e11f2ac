//! An indentation-outline scanner for `application.yml`-style documents.
//!
//! This is not a YAML parser. It recognizes the subset Spring configuration
//! files actually use: block mappings, block sequences and plain/quoted
//! scalars, and flattens them into dotted keys (`server.port`), with
//! sequence elements rendered as `[i]` (`spring.profiles[0]`). Anchors,
//! flow collections and multi-document streams are out of scope; lines the
//! scanner cannot place are skipped.

use crate::types::Span;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YamlEntry {
    /// Flattened dotted key, e.g. `servers[0].host`.
    pub key: String,
    pub value: String,
    pub key_span: Span,
    pub value_span: Span,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct YamlFile {
    pub entries: Vec<YamlEntry>,
}

impl YamlFile {
    #[must_use]
    pub fn entry_at(&self, offset: usize) -> Option<&YamlEntry> {
        self.entries
            .iter()
            .find(|e| e.key_span.contains(offset) || e.value_span.contains(offset))
    }
}

struct Frame {
    indent: usize,
    path: String,
    /// Next index for sequence items nested under this node.
    next_index: usize,
    /// Frames opened by a `-` item are popped by a sibling `-` at the same
    /// indent; mapping frames at that indent are their parent and survive.
    from_dash: bool,
}

/// Flatten a YAML document into dotted key/value entries with source spans.
#[must_use]
pub fn parse(text: &str) -> YamlFile {
    let mut entries = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut line_start = 0usize;

    for raw in text.split_inclusive('\n') {
        let start = line_start;
        line_start += raw.len();

        let line = raw.trim_end_matches(['\n', '\r']);
        let indent = line.bytes().take_while(|b| *b == b' ').count();
        let body = &line[indent..];
        if body.is_empty() || body.starts_with('#') || body.starts_with("---") {
            continue;
        }

        scan_line(text, start, indent, body, &mut stack, &mut entries);
    }

    YamlFile { entries }
}

fn scan_line(
    text: &str,
    line_start: usize,
    mut indent: usize,
    mut body: &str,
    stack: &mut Vec<Frame>,
    entries: &mut Vec<YamlEntry>,
) {
    // Sequence items: `- value`, `- key: value`, or nested `- - ...`.
    while let Some(rest) = body.strip_prefix('-') {
        if !rest.is_empty() && !rest.starts_with(' ') {
            // A plain scalar that merely starts with `-`.
            break;
        }
        pop_for_dash(stack, indent);
        let parent = stack.last_mut();
        let (parent_path, index) = match parent {
            Some(frame) => {
                let index = frame.next_index;
                frame.next_index += 1;
                (frame.path.clone(), index)
            }
            None => (String::new(), 0),
        };
        let item_path = format!("{parent_path}[{index}]");
        let dash_at = line_start + indent;

        let consumed = body.len() - rest.len() + (rest.len() - rest.trim_start().len());
        let content = rest.trim_start();
        if content.is_empty() || content.starts_with('#') {
            stack.push(Frame {
                indent,
                path: item_path,
                next_index: 0,
                from_dash: true,
            });
            return;
        }
        if !content.contains(':') {
            // Scalar element: the dash stands in for the key position.
            let value_at = line_start + indent + consumed;
            entries.push(YamlEntry {
                key: item_path,
                value: unquote(content).to_string(),
                key_span: Span::new(dash_at, dash_at + 1),
                value_span: Span::new(value_at, value_at + content.len()),
            });
            return;
        }

        // `- key: ...` opens a mapping scoped to this element.
        stack.push(Frame {
            indent,
            path: item_path,
            next_index: 0,
            from_dash: true,
        });
        indent += consumed;
        body = content;
    }

    let Some((raw_key, rest)) = body.split_once(':') else {
        // A bare scalar at mapping level; nothing to anchor it to.
        return;
    };
    let key = raw_key.trim_end();
    if key.is_empty() {
        return;
    }

    while stack.last().is_some_and(|frame| frame.indent >= indent) {
        stack.pop();
    }

    let parent_path = stack.last().map(|f| f.path.as_str()).unwrap_or("");
    let full = if parent_path.is_empty() {
        key.to_string()
    } else {
        format!("{parent_path}.{key}")
    };
    let key_at = line_start + indent;
    let key_span = Span::new(key_at, key_at + key.len());

    let value = rest.trim();
    if value.is_empty() || value.starts_with('#') {
        stack.push(Frame {
            indent,
            path: full,
            next_index: 0,
            from_dash: false,
        });
        return;
    }

    let value_offset = rest.len() - rest.trim_start().len();
    let value_at = key_at + raw_key.len() + 1 + value_offset;
    let value = strip_trailing_comment(value);
    entries.push(YamlEntry {
        key: full,
        value: unquote(value).to_string(),
        key_span,
        value_span: Span::new(value_at, value_at + value.len()),
    });
}

/// A `-` at some indent ends deeper blocks and any previous sibling element,
/// but not the mapping key that owns the sequence, which may sit at the same
/// indent.
fn pop_for_dash(stack: &mut Vec<Frame>, indent: usize) {
    while stack.last().is_some_and(|frame| {
        frame.indent > indent || (frame.from_dash && frame.indent == indent)
    }) {
        stack.pop();
    }
}

fn strip_trailing_comment(value: &str) -> &str {
    // Quoted scalars keep their `#`; plain scalars drop ` #...`.
    if value.starts_with('"') || value.starts_with('\'') {
        return value;
    }
    match value.find(" #") {
        Some(at) => value[..at].trim_end(),
        None => value,
    }
}

fn unquote(value: &str) -> &str {
    let v = value.trim();
    for quote in ['"', '\''] {
        if v.len() >= 2 && v.starts_with(quote) && v.ends_with(quote) {
            return &v[1..v.len() - 1];
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(file: &YamlFile) -> Vec<(&str, &str)> {
        file.entries
            .iter()
            .map(|e| (e.key.as_str(), e.value.as_str()))
            .collect()
    }

    #[test]
    fn flattens_nested_mappings() {
        let text = "server:\n  port: 8080\n  ssl:\n    enabled: true\nlogging:\n  level:\n    root: info\n";
        let file = parse(text);
        assert_eq!(
            keys(&file),
            vec![
                ("server.port", "8080"),
                ("server.ssl.enabled", "true"),
                ("logging.level.root", "info"),
            ]
        );

        let port = &file.entries[0];
        assert_eq!(&text[port.key_span.start..port.key_span.end], "port");
        assert_eq!(&text[port.value_span.start..port.value_span.end], "8080");
    }

    #[test]
    fn renders_sequence_elements_as_indexes() {
        let text = "spring:\n  profiles:\n    - dev\n    - local\n";
        let file = parse(text);
        assert_eq!(
            keys(&file),
            vec![
                ("spring.profiles[0]", "dev"),
                ("spring.profiles[1]", "local"),
            ]
        );
    }

    #[test]
    fn sequences_of_mappings_scope_keys_to_the_element() {
        let text = "servers:\n  - host: alpha\n    port: 1\n  - host: beta\n    port: 2\n";
        let file = parse(text);
        assert_eq!(
            keys(&file),
            vec![
                ("servers[0].host", "alpha"),
                ("servers[0].port", "1"),
                ("servers[1].host", "beta"),
                ("servers[1].port", "2"),
            ]
        );
    }

    #[test]
    fn dashes_at_parent_indent_still_belong_to_the_key() {
        let text = "profiles:\n- dev\n- prod\n";
        let file = parse(text);
        assert_eq!(keys(&file), vec![("profiles[0]", "dev"), ("profiles[1]", "prod")]);
    }

    #[test]
    fn strips_quotes_and_comments() {
        let text = "a: \"quoted # not a comment\"\nb: plain # comment\n# whole line\nc: 'single'\n";
        let file = parse(text);
        assert_eq!(
            keys(&file),
            vec![
                ("a", "quoted # not a comment"),
                ("b", "plain"),
                ("c", "single"),
            ]
        );
    }

    #[test]
    fn sibling_after_nested_block_pops_back_correctly() {
        let text = "server:\n  ssl:\n    enabled: true\n  port: 8080\nother: x\n";
        let file = parse(text);
        assert_eq!(
            keys(&file),
            vec![
                ("server.ssl.enabled", "true"),
                ("server.port", "8080"),
                ("other", "x"),
            ]
        );
    }
}
