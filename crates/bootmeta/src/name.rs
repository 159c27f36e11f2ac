//! Canonicalized Spring configuration property names.
//!
//! A [`PropertyName`] is an ordered sequence of elements; each element is
//! either a plain name segment (stored lowercase-dashed) or an indexed
//! segment (`[0]`, `['key']`) denoting a list index or map key. Equality and
//! hashing use the uniform form (lowercase, dashes stripped) so
//! `maxPoolSize`, `max-pool-size` and `max_pool_size` all name the same
//! element. Indexed elements compare as placeholders, ignoring the literal
//! index/key, so one metadata definition answers any index.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Textual form used when rendering a single element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Form {
    /// The element text as originally typed (camelCase preserved).
    Original,
    /// Canonical lowercase-with-dashes form.
    Dashed,
    /// Lowercase with dashes stripped; the form used for matching.
    Uniform,
}

#[derive(Clone, Debug)]
enum Element {
    Segment {
        original: String,
        dashed: String,
        uniform: String,
    },
    Index {
        literal: String,
    },
}

impl Element {
    fn render(&self, form: Form) -> &str {
        match self {
            Element::Segment {
                original,
                dashed,
                uniform,
            } => match form {
                Form::Original => original,
                Form::Dashed => dashed,
                Form::Uniform => uniform,
            },
            Element::Index { literal } => literal,
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Element::Segment { uniform: a, .. }, Element::Segment { uniform: b, .. }) => a == b,
            // Indexed elements are placeholders: any index matches any other.
            (Element::Index { .. }, Element::Index { .. }) => true,
            _ => false,
        }
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Element::Segment { uniform, .. } => {
                0u8.hash(state);
                uniform.hash(state);
            }
            Element::Index { .. } => 1u8.hash(state),
        }
    }
}

/// An immutable, canonicalized configuration key such as
/// `spring.datasource.hikari.max-pool-size[0]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct PropertyName {
    elements: Vec<Element>,
}

impl PropertyName {
    /// The empty (root) name.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse an arbitrary user-typed or machine-emitted key.
    ///
    /// Handles camelCase and underscores (normalized to dashes), `[0]` /
    /// `['key']` / `[key]` indexed segments, and blank input (which yields
    /// the empty name). Parsing never fails; malformed input produces
    /// best-effort elements.
    #[must_use]
    pub fn adapt(raw: &str) -> Self {
        Self::parse(raw, true)
    }

    /// Parse a metadata-file-declared name, already canonical
    /// lowercase-dashed, without camelCase normalization.
    #[must_use]
    pub fn of(machine: &str) -> Self {
        Self::parse(machine, false)
    }

    fn parse(raw: &str, normalize: bool) -> Self {
        let raw = raw.trim();
        let mut elements = Vec::new();
        let mut segment = String::new();
        let mut chars = raw.chars().peekable();

        let mut flush = |segment: &mut String, elements: &mut Vec<Element>| {
            if segment.is_empty() {
                return;
            }
            let original = std::mem::take(segment);
            let dashed = if normalize {
                to_dashed(&original)
            } else {
                original.to_ascii_lowercase()
            };
            let uniform = to_uniform(&dashed);
            elements.push(Element::Segment {
                original,
                dashed,
                uniform,
            });
        };

        while let Some(c) = chars.next() {
            match c {
                '.' => flush(&mut segment, &mut elements),
                '[' => {
                    flush(&mut segment, &mut elements);
                    let mut literal = String::new();
                    for c in chars.by_ref() {
                        if c == ']' {
                            break;
                        }
                        literal.push(c);
                    }
                    let literal = literal
                        .strip_prefix('\'')
                        .and_then(|s| s.strip_suffix('\''))
                        .unwrap_or(&literal)
                        .to_string();
                    elements.push(Element::Index { literal });
                }
                // A stray `]` is malformed; drop it and keep going.
                ']' => {}
                _ => segment.push(c),
            }
        }
        flush(&mut segment, &mut elements);

        Self { elements }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Render element `i` in the requested form.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    #[must_use]
    pub fn element(&self, i: usize, form: Form) -> &str {
        self.elements[i].render(form)
    }

    #[must_use]
    pub fn last_element(&self, form: Form) -> Option<&str> {
        self.elements.last().map(|e| e.render(form))
    }

    /// Whether element `i` is an indexed segment.
    #[must_use]
    pub fn is_indexed(&self, i: usize) -> bool {
        matches!(self.elements.get(i), Some(Element::Index { .. }))
    }

    /// Whether element `i` is an indexed segment holding a numeric index.
    #[must_use]
    pub fn is_numeric_index(&self, i: usize) -> bool {
        match self.elements.get(i) {
            Some(Element::Index { literal }) => literal.parse::<usize>().is_ok(),
            _ => false,
        }
    }

    #[must_use]
    pub fn is_last_element_indexed(&self) -> bool {
        matches!(self.elements.last(), Some(Element::Index { .. }))
    }

    /// The name with the last element removed; the empty name yields `None`.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.elements.is_empty() {
            return None;
        }
        Some(Self {
            elements: self.elements[..self.elements.len() - 1].to_vec(),
        })
    }

    /// The first `n` elements.
    #[must_use]
    pub fn chop(&self, n: usize) -> Self {
        Self {
            elements: self.elements[..n.min(self.elements.len())].to_vec(),
        }
    }

    /// The elements from `n` onward.
    #[must_use]
    pub fn sub_name(&self, n: usize) -> Self {
        Self {
            elements: self.elements[n.min(self.elements.len())..].to_vec(),
        }
    }

    /// Append one or more elements parsed from `suffix` (e.g. `"values"`,
    /// `"keys"`, or a dotted path).
    #[must_use]
    pub fn append(&self, suffix: &str) -> Self {
        let mut elements = self.elements.clone();
        elements.extend(Self::adapt(suffix).elements);
        Self { elements }
    }

    /// Append an indexed segment with the given literal.
    #[must_use]
    pub fn append_index(&self, literal: &str) -> Self {
        let mut elements = self.elements.clone();
        elements.push(Element::Index {
            literal: literal.to_string(),
        });
        Self { elements }
    }

    /// Whether this name's element sequence is a strict prefix of `other`'s.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.elements.len() < other.elements.len()
            && self.elements == other.elements[..self.elements.len()]
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for element in &self.elements {
            match element {
                Element::Segment { dashed, .. } => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(dashed)?;
                }
                Element::Index { literal } => {
                    write!(f, "[{literal}]")?;
                }
            }
            first = false;
        }
        Ok(())
    }
}

fn to_dashed(original: &str) -> String {
    let mut out = String::with_capacity(original.len());
    for c in original.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == '_' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

fn to_uniform(dashed: &str) -> String {
    dashed.chars().filter(|c| *c != '-').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn adapts_camel_case_to_dashed() {
        let name = PropertyName::adapt("spring.datasource.hikari.maxPoolSize");
        assert_eq!(name.to_string(), "spring.datasource.hikari.max-pool-size");
        assert_eq!(name.element(3, Form::Original), "maxPoolSize");
        assert_eq!(name.element(3, Form::Uniform), "maxpoolsize");
    }

    #[test]
    fn casing_and_separator_variants_are_equal() {
        let a = PropertyName::adapt("server.maxHttpHeaderSize");
        let b = PropertyName::of("server.max-http-header-size");
        let c = PropertyName::adapt("server.max_http_header_size");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn parses_indexed_segments() {
        let name = PropertyName::adapt("server.ssl.enabled-protocols[0]");
        assert_eq!(name.num_elements(), 4);
        assert!(name.is_last_element_indexed());
        assert!(name.is_numeric_index(3));
        assert_eq!(name.to_string(), "server.ssl.enabled-protocols[0]");

        let quoted = PropertyName::adapt("logging.level['org.springframework']");
        assert_eq!(quoted.element(2, Form::Original), "org.springframework");
        assert!(!quoted.is_numeric_index(2));
    }

    #[test]
    fn indexed_segments_compare_as_placeholders() {
        let a = PropertyName::adapt("spring.x[0].name");
        let b = PropertyName::adapt("spring.x[17].name");
        let c = PropertyName::adapt("spring.x['key'].name");
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn blank_input_is_the_root_name() {
        assert!(PropertyName::adapt("").is_empty());
        assert!(PropertyName::adapt("   ").is_empty());
        assert_eq!(PropertyName::adapt(""), PropertyName::root());
    }

    #[test]
    fn ancestor_relation_is_a_strict_prefix() {
        let parent = PropertyName::of("spring.datasource");
        let child = PropertyName::of("spring.datasource.url");
        assert!(parent.is_ancestor_of(&child));
        assert!(!child.is_ancestor_of(&parent));
        assert!(!parent.is_ancestor_of(&parent));
        assert!(PropertyName::root().is_ancestor_of(&parent));
    }

    #[test]
    fn parent_chop_and_sub_name() {
        let name = PropertyName::of("a.b.c.d");
        assert_eq!(name.parent().map(|p| p.to_string()).as_deref(), Some("a.b.c"));
        assert_eq!(name.chop(2).to_string(), "a.b");
        assert_eq!(name.sub_name(2).to_string(), "c.d");
        assert!(PropertyName::root().parent().is_none());
    }

    #[test]
    fn append_parses_suffixes() {
        let name = PropertyName::of("logging.level");
        assert_eq!(name.append("keys").to_string(), "logging.level.keys");
        assert_eq!(name.append("a.b").num_elements(), 4);
        assert_eq!(name.append_index("0").to_string(), "logging.level[0]");
    }

    #[test]
    fn canonical_round_trip() {
        for raw in [
            "spring.datasource.url",
            "server.ssl.enabled-protocols[0]",
            "logging.level[org.springframework]",
            "",
        ] {
            let name = PropertyName::of(raw);
            assert_eq!(PropertyName::of(&name.to_string()), name);
        }
    }

    #[test]
    fn malformed_input_is_best_effort() {
        let name = PropertyName::adapt("a..b");
        assert_eq!(name.to_string(), "a.b");

        let unclosed = PropertyName::adapt("a.b[0");
        assert_eq!(unclosed.num_elements(), 3);
        assert!(unclosed.is_last_element_indexed());

        let stray = PropertyName::adapt("a]b");
        assert_eq!(stray.to_string(), "ab");
    }
}
