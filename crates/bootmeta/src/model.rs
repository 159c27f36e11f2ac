//! Plain data records for Spring's configuration-metadata JSON format.
//!
//! These mirror the document shape emitted by the Spring Boot configuration
//! annotation processor (`META-INF/spring-configuration-metadata.json`) and
//! hand-authored supplements. Type strings are preserved verbatim, including
//! generics and `$` nested-class separators; interpreting them is the type
//! resolver's job (see [`crate::shape`]).

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One parsed metadata document: the top-level `groups`, `properties` and
/// `hints` arrays.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationMetadata {
    #[serde(default)]
    pub groups: Vec<GroupMetadata>,
    #[serde(default)]
    pub properties: Vec<PropertyMetadata>,
    #[serde(default)]
    pub hints: Vec<HintMetadata>,
}

impl ConfigurationMetadata {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.properties.is_empty() && self.hints.is_empty()
    }
}

/// A `properties` entry: a leaf-bindable configuration value (possibly a
/// map/collection root accepting arbitrary sub-keys).
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMetadata {
    #[serde(default)]
    pub name: String,
    /// Fully qualified declared type, e.g. `java.util.Map<java.lang.String,java.lang.String>`.
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub description: Option<String>,
    /// Opaque JSON default value.
    pub default_value: Option<Value>,
    pub deprecation: Option<Deprecation>,
    pub source_type: Option<String>,
}

/// A `groups` entry: a non-leaf configuration subtree backed by a nested
/// configuration object.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub description: Option<String>,
    pub source_type: Option<String>,
    /// Signature of the `@Bean`-style method that roots the nested object.
    pub source_method: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeprecationLevel {
    /// Still bindable; usage should be flagged but keeps working.
    #[default]
    Warning,
    /// No longer supported by the binder.
    Error,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deprecation {
    #[serde(default)]
    pub level: DeprecationLevel,
    pub reason: Option<String>,
    pub replacement: Option<String>,
}

/// A `hints` entry: legal/suggested values or keys for a property.
///
/// Map-typed properties conventionally carry two hints, `<name>.keys` and
/// `<name>.values`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HintMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub values: Vec<ValueHint>,
    #[serde(default)]
    pub providers: Vec<ProviderRef>,
}

/// One literal value suggestion inside a hint.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueHint {
    #[serde(default)]
    pub value: Value,
    pub description: Option<String>,
}

impl ValueHint {
    /// The value rendered the way it would appear in a config file.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// A value-provider descriptor inside a hint: a provider name from the
/// closed provider-kind set plus free-form parameters.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}
