//! Diagnostics and completion for Spring configuration files.
//!
//! Everything in here is driven by a [`MetadataIndex`]; callers hand in the
//! file text and get plain diagnostics/completion values back, so the same
//! analysis serves `.properties` and YAML documents alike.

use std::collections::HashMap;
use std::path::Path;

use bootmeta::{
    MetadataIndex, MetadataItem, MetadataProperty, PropertyName, ScalarKind, TypeShape,
};

use crate::properties;
use crate::types::{CompletionItem, Diagnostic, Span};
use crate::yaml;

pub const UNKNOWN_CONFIG_KEY: &str = "SPRING_UNKNOWN_CONFIG_KEY";
pub const DEPRECATED_CONFIG_KEY: &str = "SPRING_DEPRECATED_CONFIG_KEY";
pub const REMOVED_CONFIG_KEY: &str = "SPRING_REMOVED_CONFIG_KEY";
pub const DUPLICATE_CONFIG_KEY: &str = "SPRING_DUPLICATE_CONFIG_KEY";
pub const CONFIG_VALUE_MISMATCH: &str = "SPRING_CONFIG_VALUE_MISMATCH";

#[derive(Clone, Debug)]
struct ConfigEntry {
    key: String,
    value: String,
    key_span: Span,
    value_span: Span,
}

fn parse_config_entries(path: &Path, text: &str) -> Vec<ConfigEntry> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    match ext {
        "properties" => properties::parse(text)
            .entries
            .into_iter()
            .map(|e| ConfigEntry {
                key: e.key,
                value: e.value,
                key_span: e.key_span,
                value_span: e.value_span,
            })
            .collect(),
        "yml" | "yaml" => yaml::parse(text)
            .entries
            .into_iter()
            .map(|e| ConfigEntry {
                key: e.key,
                value: e.value,
                key_span: e.key_span,
                value_span: e.value_span,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// The property a config key binds to, if any: the key itself, a map-typed
/// ancestor (maps accept arbitrary sub-keys), or a collection ancestor for
/// `name[i]`-style elements.
fn binding_property<'a>(
    index: &'a dyn MetadataIndex,
    key: &str,
) -> Option<&'a MetadataProperty> {
    let property = index.nearest_parent_property(key)?;
    if property.can_bind(key) {
        return Some(property);
    }
    let name = PropertyName::adapt(key);
    if property.shape().is_collection() && property.name().is_ancestor_of(&name) {
        return Some(property);
    }
    None
}

/// Analyze one configuration file against the metadata index.
#[must_use]
pub fn diagnostics_for_config_file(
    path: &Path,
    text: &str,
    index: &dyn MetadataIndex,
) -> Vec<Diagnostic> {
    let entries = parse_config_entries(path, text);
    let mut diagnostics = Vec::new();

    // Spring resolves `.properties` sequentially; a repeated key silently
    // wins, which is worth flagging. YAML repetition changes nesting instead.
    if path.extension().and_then(|e| e.to_str()) == Some("properties") {
        let mut seen: HashMap<&str, Span> = HashMap::new();
        for entry in &entries {
            if let Some(previous) = seen.insert(entry.key.as_str(), entry.key_span) {
                for span in [entry.key_span, previous] {
                    diagnostics.push(Diagnostic::warning(
                        DUPLICATE_CONFIG_KEY,
                        format!("Duplicate configuration key '{}'", entry.key),
                        span,
                    ));
                }
            }
        }
    }

    // Without metadata every key would be "unknown"; stay quiet instead.
    if index.is_empty() {
        return diagnostics;
    }

    for entry in entries {
        let Some(property) = binding_property(index, &entry.key) else {
            if index.group(&entry.key).is_none() {
                diagnostics.push(Diagnostic::warning(
                    UNKNOWN_CONFIG_KEY,
                    format!("Unknown configuration key '{}'", entry.key),
                    entry.key_span,
                ));
            }
            continue;
        };

        if let Some(deprecation) = property.deprecation() {
            let mut message = if property.is_removed() {
                format!("Configuration key '{}' is no longer supported", entry.key)
            } else {
                format!("Configuration key '{}' is deprecated", entry.key)
            };
            if let Some(replacement) = &deprecation.replacement {
                message.push_str(&format!("; use '{replacement}' instead"));
            } else if let Some(reason) = &deprecation.reason {
                message.push_str(&format!(": {reason}"));
            }
            diagnostics.push(if property.is_removed() {
                Diagnostic::error(REMOVED_CONFIG_KEY, message, entry.key_span)
            } else {
                Diagnostic::warning(DEPRECATED_CONFIG_KEY, message, entry.key_span)
            });
        }

        if let Some(message) = check_value(index, property, &entry.value) {
            diagnostics.push(Diagnostic::warning(
                CONFIG_VALUE_MISMATCH,
                message,
                entry.value_span,
            ));
        }
    }

    diagnostics
}

/// Best-effort value validation: closed hint value sets and the scalar kinds
/// that have an unambiguous textual form. Placeholders are never checked.
fn check_value(
    index: &dyn MetadataIndex,
    property: &MetadataProperty,
    value: &str,
) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.contains("${") {
        return None;
    }

    if let Some(hint) = index.value_hint(property) {
        // Providers mean the literal values are suggestions, not a closed set.
        if hint.providers().is_empty() && !hint.values().is_empty() {
            let known = hint
                .values()
                .iter()
                .any(|v| v.render().eq_ignore_ascii_case(value));
            if !known {
                return Some(format!(
                    "'{}' is not a known value for '{}'",
                    value,
                    property.name()
                ));
            }
            return None;
        }
    }

    match property.shape() {
        TypeShape::Scalar(ScalarKind::Boolean) => {
            (!value.eq_ignore_ascii_case("true") && !value.eq_ignore_ascii_case("false")).then(
                || format!("Expected a boolean for '{}' but got '{value}'", property.name()),
            )
        }
        TypeShape::Scalar(ScalarKind::Integer) => value.parse::<i64>().is_err().then(|| {
            format!("Expected an integer for '{}' but got '{value}'", property.name())
        }),
        TypeShape::Scalar(ScalarKind::Float) => value.parse::<f64>().is_err().then(|| {
            format!("Expected a number for '{}' but got '{value}'", property.name())
        }),
        _ => None,
    }
}

/// Key candidates under `parent` matching the partial `query`, labeled with
/// the full dotted name. Removed properties never show up; deprecated ones do,
/// flagged.
#[must_use]
pub fn key_completions(
    index: &dyn MetadataIndex,
    parent: &str,
    query: &str,
) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = index
        .complete_key(parent, query)
        .into_iter()
        .map(|item| match item {
            MetadataItem::Property(p) => CompletionItem {
                label: p.name().to_string(),
                detail: p.ty().map(str::to_string),
                deprecated: p.deprecation().is_some(),
            },
            MetadataItem::Group(g) => CompletionItem {
                label: g.name().to_string(),
                detail: g.metadata().ty.clone(),
                deprecated: false,
            },
        })
        .collect();
    items.sort_by(|a, b| a.label.cmp(&b.label));
    items.dedup_by(|a, b| a.label == b.label);
    items
}

/// Map-key candidates for a map-typed property, from its `.keys` hint.
#[must_use]
pub fn map_key_completions(index: &dyn MetadataIndex, map_key: &str) -> Vec<CompletionItem> {
    let Some(property) = binding_property(index, map_key).filter(|p| p.is_map()) else {
        return Vec::new();
    };
    let Some(hint) = index.key_hint(property) else {
        return Vec::new();
    };
    hint.values()
        .iter()
        .map(|v| CompletionItem {
            label: v.render(),
            detail: v.description.clone(),
            deprecated: false,
        })
        .collect()
}

/// Value candidates for `key`, starting with `prefix`. Covers the direct
/// hint, the `.values` hint of a binding map ancestor, and boolean literals.
#[must_use]
pub fn value_completions(
    index: &dyn MetadataIndex,
    key: &str,
    prefix: &str,
) -> Vec<CompletionItem> {
    let Some(property) = binding_property(index, key) else {
        return Vec::new();
    };

    let mut items = Vec::new();
    if let Some(hint) = index.value_hint(property) {
        for value in hint.values() {
            items.push(CompletionItem {
                label: value.render(),
                detail: value.description.clone(),
                deprecated: false,
            });
        }
    }
    if matches!(property.shape(), TypeShape::Scalar(ScalarKind::Boolean)) {
        items.push(CompletionItem::new("true"));
        items.push(CompletionItem::new("false"));
    }

    items.retain(|item| item.label.starts_with(prefix));
    items.sort_by(|a, b| a.label.cmp(&b.label));
    items.dedup_by(|a, b| a.label == b.label);
    items
}

/// Completion inside a `.properties` document at `offset`.
#[must_use]
pub fn completions_in_properties(
    text: &str,
    offset: usize,
    index: &dyn MetadataIndex,
) -> Vec<CompletionItem> {
    let file = properties::parse(text);
    let Some(entry) = file.entry_at(offset) else {
        return Vec::new();
    };

    if entry.value_span.contains(offset) && !entry.key_span.contains(offset) {
        let typed = text[entry.value_span.start..offset].trim();
        return value_completions(index, &entry.key, typed);
    }

    let typed = text[entry.key_span.start..offset].trim();
    let mut items = key_completions(index, "", typed);

    // Inside a map subtree the metadata has no concrete sub-keys; offer the
    // `.keys` hint instead.
    if let Some((parent, _)) = typed.rsplit_once('.') {
        for candidate in map_key_completions(index, parent) {
            let label = format!("{parent}.{}", candidate.label);
            if label.starts_with(typed) && !items.iter().any(|i| i.label == label) {
                items.push(CompletionItem {
                    label,
                    detail: candidate.detail,
                    deprecated: false,
                });
            }
        }
    }

    items
}

/// Completion inside a YAML document at `offset`. Key candidates are the
/// next path segment under the enclosing mapping; value candidates use the
/// flattened key of the current line.
#[must_use]
pub fn completions_in_yaml(
    text: &str,
    offset: usize,
    index: &dyn MetadataIndex,
) -> Vec<CompletionItem> {
    // Value position: the cursor sits after `key:` on the current line.
    if let Some(entry) = yaml::parse(text).entry_at(offset) {
        if entry.value_span.contains(offset) && !entry.key_span.contains(offset) {
            let typed = text[entry.value_span.start..offset].trim();
            return value_completions(index, &entry.key, typed);
        }
    }

    let Some((parent, typed)) = yaml_key_context(text, offset) else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for candidate in key_completions(index, &parent, &typed) {
        if let Some(segment) = next_segment(&candidate.label, &parent) {
            if !items.iter().any(|i: &CompletionItem| i.label == segment) {
                items.push(CompletionItem {
                    label: segment,
                    detail: candidate.detail,
                    deprecated: candidate.deprecated,
                });
            }
        }
    }
    if !parent.is_empty() {
        for candidate in map_key_completions(index, &parent) {
            if candidate.label.starts_with(&typed)
                && !items.iter().any(|i| i.label == candidate.label)
            {
                items.push(candidate);
            }
        }
    }
    items.sort_by(|a, b| a.label.cmp(&b.label));
    items
}

/// The enclosing mapping path and the partial segment typed on the current
/// line, derived from the indentation outline above the cursor.
fn yaml_key_context(text: &str, offset: usize) -> Option<(String, String)> {
    let line_start = text[..offset.min(text.len())]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);

    let mut stack: Vec<(usize, String)> = Vec::new();
    for raw in text[..line_start].lines() {
        let line = raw.trim_end_matches('\r');
        let indent = line.bytes().take_while(|b| *b == b' ').count();
        let body = line[indent..].trim_end();
        if body.is_empty() || body.starts_with('#') {
            continue;
        }
        let Some((key, rest)) = body.split_once(':') else {
            continue;
        };
        let key = key.trim_end();
        if key.is_empty() {
            continue;
        }
        while stack.last().is_some_and(|(i, _)| *i >= indent) {
            stack.pop();
        }
        // Only a key that opens a nested block contributes to the path.
        if rest.trim().is_empty() {
            stack.push((indent, key.to_string()));
        }
    }

    let current = &text[line_start..offset.min(text.len())];
    let indent = current.bytes().take_while(|b| *b == b' ').count();
    while stack.last().is_some_and(|(i, _)| *i >= indent) {
        stack.pop();
    }

    let parent = stack
        .iter()
        .map(|(_, key)| key.as_str())
        .collect::<Vec<_>>()
        .join(".");

    let typed = current[indent..]
        .trim_start_matches('-')
        .trim_start()
        .split(|c: char| c == ':' || c.is_whitespace())
        .next()
        .unwrap_or("")
        .to_string();
    Some((parent, typed))
}

fn next_segment(full_key: &str, parent: &str) -> Option<String> {
    let remainder = if parent.is_empty() {
        full_key
    } else {
        full_key
            .strip_prefix(parent)
            .and_then(|r| r.strip_prefix('.'))?
    };
    let end = remainder
        .find(['.', '['])
        .unwrap_or(remainder.len());
    let segment = &remainder[..end];
    (!segment.is_empty()).then(|| segment.to_string())
}
