//! Editor-facing intelligence for Spring configuration files.
//!
//! Builds entirely on the [`bootmeta::MetadataIndex`] query boundary: parse
//! `application.properties` / `application.yml` with source spans, report
//! unknown/deprecated/removed/duplicate keys and best-effort value
//! mismatches, and produce key/value completion candidates. No host editor
//! types appear here; hosts map [`Diagnostic`] and [`CompletionItem`] onto
//! their own surfaces.

mod analysis;
mod types;

pub mod properties;
pub mod yaml;

pub use analysis::{
    completions_in_properties, completions_in_yaml, diagnostics_for_config_file, key_completions,
    map_key_completions, value_completions, CONFIG_VALUE_MISMATCH, DEPRECATED_CONFIG_KEY,
    DUPLICATE_CONFIG_KEY, REMOVED_CONFIG_KEY, UNKNOWN_CONFIG_KEY,
};
pub use types::{CompletionItem, Diagnostic, Severity, Span};
