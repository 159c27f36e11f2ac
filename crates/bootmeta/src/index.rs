//! Per-document metadata index and the query contract shared with the
//! aggregated index.
//!
//! A [`DocumentIndex`] owns flat name-keyed maps for properties, groups and
//! hints plus a [`NameTrie`] derived from the property/group names. The trie
//! always agrees with the maps; it exists only to answer prefix/subtree
//! queries for completion. Collaborators (completion, documentation,
//! inspections, navigation) query through [`MetadataIndex`] using dotted-path
//! strings; nothing host-specific crosses that boundary.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::hint::MetadataHint;
use crate::model::{
    ConfigurationMetadata, Deprecation, DeprecationLevel, GroupMetadata, PropertyMetadata,
};
use crate::name::{Form, PropertyName};
use crate::shape::{TypeShape, TypeShapeResolver};
use crate::trie::{NameTrie, TrieItem, TrieNode};

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("malformed configuration metadata in {source_name}")]
    MalformedDocument {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A property entry resolved against a [`TypeShapeResolver`].
#[derive(Clone, Debug, PartialEq)]
pub struct MetadataProperty {
    name: PropertyName,
    metadata: PropertyMetadata,
    shape: TypeShape,
}

impl MetadataProperty {
    #[must_use]
    pub fn name(&self) -> &PropertyName {
        &self.name
    }

    #[must_use]
    pub fn metadata(&self) -> &PropertyMetadata {
        &self.metadata
    }

    /// The declared type string, verbatim from the metadata file.
    #[must_use]
    pub fn ty(&self) -> Option<&str> {
        self.metadata.ty.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.metadata.description.as_deref()
    }

    #[must_use]
    pub fn deprecation(&self) -> Option<&Deprecation> {
        self.metadata.deprecation.as_ref()
    }

    /// Whether the property is deprecated at level ERROR, i.e. no longer
    /// bindable. Removed properties are excluded from completion candidates
    /// but stay reachable by exact lookup so documentation and navigation
    /// keep working.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        matches!(
            self.metadata.deprecation,
            Some(Deprecation {
                level: DeprecationLevel::Error,
                ..
            })
        )
    }

    #[must_use]
    pub fn shape(&self) -> TypeShape {
        self.shape
    }

    #[must_use]
    pub fn is_map(&self) -> bool {
        self.shape.is_map()
    }

    /// Whether `key` can be bound to this property: either the names match,
    /// or this property is map-shaped and an ancestor of `key` (a map binds
    /// arbitrarily deep sub-keys).
    #[must_use]
    pub fn can_bind(&self, key: &str) -> bool {
        let key = PropertyName::adapt(key);
        self.name == key || (self.is_map() && self.name.is_ancestor_of(&key))
    }
}

/// A group entry: a nested configuration object rooting a subtree.
#[derive(Clone, Debug, PartialEq)]
pub struct MetadataGroup {
    name: PropertyName,
    metadata: GroupMetadata,
}

impl MetadataGroup {
    #[must_use]
    pub fn name(&self) -> &PropertyName {
        &self.name
    }

    #[must_use]
    pub fn metadata(&self) -> &GroupMetadata {
        &self.metadata
    }
}

/// Either kind of name-anchored entry, as returned by exact lookups and
/// completion.
#[derive(Clone, Copy, Debug)]
pub enum MetadataItem<'a> {
    Property(&'a MetadataProperty),
    Group(&'a MetadataGroup),
}

impl<'a> MetadataItem<'a> {
    #[must_use]
    pub fn name(&self) -> &'a PropertyName {
        match self {
            MetadataItem::Property(p) => p.name(),
            MetadataItem::Group(g) => g.name(),
        }
    }

    #[must_use]
    pub fn as_property(&self) -> Option<&'a MetadataProperty> {
        match self {
            MetadataItem::Property(p) => Some(p),
            MetadataItem::Group(_) => None,
        }
    }
}

/// The query contract over one logical metadata index.
///
/// Lookups by dotted path never fail: an undefined path is `None`, and
/// callers fall back (e.g. to [`MetadataIndex::nearest_parent_property`]) as
/// a normal outcome.
pub trait MetadataIndex {
    fn property_by_name(&self, name: &PropertyName) -> Option<&MetadataProperty>;
    fn group_by_name(&self, name: &PropertyName) -> Option<&MetadataGroup>;
    fn hint_by_name(&self, name: &PropertyName) -> Option<&MetadataHint>;

    /// True iff no properties are present.
    fn is_empty(&self) -> bool;

    /// All properties, in no particular order.
    fn properties(&self) -> Vec<&MetadataProperty>;

    /// Key-completion candidates under `parent` matching the partial
    /// `query`. Deprecation-ERROR properties and the contents of indexed
    /// subtrees are excluded.
    fn complete_key(&self, parent: &str, query: &str) -> Vec<MetadataItem<'_>>;

    fn property(&self, name: &str) -> Option<&MetadataProperty> {
        self.property_by_name(&PropertyName::adapt(name))
    }

    fn group(&self, name: &str) -> Option<&MetadataGroup> {
        self.group_by_name(&PropertyName::adapt(name))
    }

    fn hint(&self, name: &str) -> Option<&MetadataHint> {
        self.hint_by_name(&PropertyName::adapt(name))
    }

    fn property_or_group(&self, name: &str) -> Option<MetadataItem<'_>> {
        let key = PropertyName::adapt(name);
        self.property_by_name(&key)
            .map(MetadataItem::Property)
            .or_else(|| self.group_by_name(&key).map(MetadataItem::Group))
    }

    /// Walk up the ancestor chain until a defined property is found. Supports
    /// map-typed properties binding sub-keys that are not individually
    /// declared.
    fn nearest_parent_property(&self, name: &str) -> Option<&MetadataProperty> {
        let mut key = PropertyName::adapt(name);
        loop {
            if let Some(property) = self.property_by_name(&key) {
                return Some(property);
            }
            key = key.parent()?;
            if key.is_empty() {
                return self.property_by_name(&key);
            }
        }
    }

    /// The hint for a property's values: a hint named exactly as the
    /// property, else `<property>.values` (the map value-hint convention).
    fn value_hint(&self, property: &MetadataProperty) -> Option<&MetadataHint> {
        self.hint_by_name(property.name())
            .or_else(|| self.hint_by_name(&property.name().append("values")))
    }

    /// The `<property>.keys` hint for map-typed properties.
    fn key_hint(&self, property: &MetadataProperty) -> Option<&MetadataHint> {
        self.hint_by_name(&property.name().append("keys"))
    }
}

/// Index over a single parsed metadata document.
#[derive(Clone, Debug, Default)]
pub struct DocumentIndex {
    source: String,
    properties: HashMap<PropertyName, MetadataProperty>,
    groups: HashMap<PropertyName, MetadataGroup>,
    hints: HashMap<PropertyName, MetadataHint>,
    trie: NameTrie,
}

impl DocumentIndex {
    /// Build an index from an already-parsed document. Construction never
    /// fails: entries with blank or duplicate names are logged and skipped.
    #[must_use]
    pub fn from_document(
        source: impl Into<String>,
        document: ConfigurationMetadata,
        resolver: &dyn TypeShapeResolver,
    ) -> Self {
        let mut index = Self {
            source: source.into(),
            ..Self::default()
        };
        for group in document.groups {
            index.add_group(group);
        }
        for hint in document.hints {
            index.add_hint(hint);
        }
        for property in document.properties {
            index.add_property(property, resolver);
        }
        index
    }

    /// Parse JSON bytes and build an index. Invalid JSON fails the whole
    /// document; a malformed entry inside a valid document is skipped.
    pub fn from_json_bytes(
        source: impl Into<String>,
        bytes: &[u8],
        resolver: &dyn TypeShapeResolver,
    ) -> Result<Self, MetadataError> {
        let source = source.into();
        let document = parse_document(&source, bytes)?;
        Ok(Self::from_document(source, document, resolver))
    }

    /// Identity of the metadata file this index was built from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The trie node at `path`, used as a completion search root.
    #[must_use]
    pub fn find_in_name_trie(&self, path: &str) -> Option<&TrieNode> {
        self.trie.node_at(&PropertyName::adapt(path.trim()))
    }

    fn add_property(&mut self, metadata: PropertyMetadata, resolver: &dyn TypeShapeResolver) {
        let name = PropertyName::of(&metadata.name);
        if name.is_empty() {
            tracing::warn!(source = %self.source, "skipping property with blank name");
            return;
        }
        if self.properties.contains_key(&name) {
            tracing::warn!(source = %self.source, property = %name, "skipping duplicate property");
            return;
        }
        let shape = metadata
            .ty
            .as_deref()
            .map(|ty| resolver.shape(ty))
            .unwrap_or(TypeShape::Unknown);
        self.trie.insert(&name, TrieItem::Property(name.clone()));
        self.properties.insert(
            name.clone(),
            MetadataProperty {
                name,
                metadata,
                shape,
            },
        );
    }

    fn add_group(&mut self, metadata: GroupMetadata) {
        let name = PropertyName::of(&metadata.name);
        if name.is_empty() {
            tracing::warn!(source = %self.source, "skipping group with blank name");
            return;
        }
        if self.groups.contains_key(&name) {
            tracing::warn!(source = %self.source, group = %name, "skipping duplicate group");
            return;
        }
        self.trie.insert(&name, TrieItem::Group(name.clone()));
        self.groups.insert(name.clone(), MetadataGroup { name, metadata });
    }

    fn add_hint(&mut self, metadata: crate::model::HintMetadata) {
        let name = PropertyName::of(&metadata.name);
        if name.is_empty() {
            tracing::warn!(source = %self.source, "skipping hint with blank name");
            return;
        }
        self.hints
            .insert(name.clone(), MetadataHint::from_metadata(name, metadata));
    }

    fn resolve_item(&self, item: &TrieItem) -> Option<MetadataItem<'_>> {
        match item {
            TrieItem::Property(name) => self
                .properties
                .get(name)
                .filter(|p| !p.is_removed())
                .map(MetadataItem::Property),
            TrieItem::Group(name) => self.groups.get(name).map(MetadataItem::Group),
        }
    }
}

impl MetadataIndex for DocumentIndex {
    fn property_by_name(&self, name: &PropertyName) -> Option<&MetadataProperty> {
        self.properties.get(name)
    }

    fn group_by_name(&self, name: &PropertyName) -> Option<&MetadataGroup> {
        self.groups.get(name)
    }

    fn hint_by_name(&self, name: &PropertyName) -> Option<&MetadataHint> {
        self.hints.get(name)
    }

    fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    fn properties(&self) -> Vec<&MetadataProperty> {
        self.properties.values().collect()
    }

    fn complete_key(&self, parent: &str, query: &str) -> Vec<MetadataItem<'_>> {
        let Some(root) = self.find_in_name_trie(parent) else {
            return Vec::new();
        };
        if root.is_indexed() {
            // An indexed context needs a concrete element first; there is
            // nothing useful to suggest.
            return Vec::new();
        }

        let query = PropertyName::adapt(query);
        let mut candidates: Vec<&TrieNode> = vec![root];
        for i in 0..query.num_elements() {
            let segment = query.element(i, Form::Uniform);
            let mut next = Vec::new();
            for node in candidates {
                if !node.is_indexed() {
                    next.extend(node.children_with_prefix(segment));
                }
            }
            candidates = next;
            if candidates.is_empty() {
                return Vec::new();
            }
        }

        let mut items = Vec::new();
        if query.is_empty() {
            root.collect_items(false, &mut items);
        } else {
            for node in candidates {
                node.collect_items(true, &mut items);
            }
        }

        let mut seen = HashSet::new();
        items
            .into_iter()
            .filter(|item| seen.insert(item.clone()))
            .filter_map(|item| self.resolve_item(&item))
            .collect()
    }
}

/// Deserialize leniently: the document must be valid JSON with the expected
/// top-level shape, but each array entry stands alone — one malformed entry
/// is skipped without aborting the rest.
fn parse_document(source: &str, bytes: &[u8]) -> Result<ConfigurationMetadata, MetadataError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|err| MetadataError::MalformedDocument {
            source_name: source.to_string(),
            source: err,
        })?;

    let mut document = ConfigurationMetadata::default();
    for entry in array_entries(&value, "groups") {
        match serde_json::from_value::<GroupMetadata>(entry.clone()) {
            Ok(group) if !group.name.trim().is_empty() => document.groups.push(group),
            Ok(_) => tracing::warn!(%source, "skipping group entry with empty name"),
            Err(err) => tracing::warn!(%source, %err, "skipping malformed group entry"),
        }
    }
    for entry in array_entries(&value, "properties") {
        match serde_json::from_value::<PropertyMetadata>(entry.clone()) {
            Ok(property) if !property.name.trim().is_empty() => {
                document.properties.push(property);
            }
            Ok(_) => tracing::warn!(%source, "skipping property entry with empty name"),
            Err(err) => tracing::warn!(%source, %err, "skipping malformed property entry"),
        }
    }
    for entry in array_entries(&value, "hints") {
        match serde_json::from_value::<crate::model::HintMetadata>(entry.clone()) {
            Ok(hint) if !hint.name.trim().is_empty() => document.hints.push(hint),
            Ok(_) => tracing::warn!(%source, "skipping hint entry with empty name"),
            Err(err) => tracing::warn!(%source, %err, "skipping malformed hint entry"),
        }
    }
    Ok(document)
}

fn array_entries<'a>(
    value: &'a serde_json::Value,
    key: &str,
) -> impl Iterator<Item = &'a serde_json::Value> {
    value
        .get(key)
        .and_then(serde_json::Value::as_array)
        .map(|entries| entries.iter())
        .into_iter()
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::DefaultShapeResolver;
    use pretty_assertions::assert_eq;

    fn index_of(json: &str) -> DocumentIndex {
        DocumentIndex::from_json_bytes("test-metadata", json.as_bytes(), &DefaultShapeResolver)
            .unwrap()
    }

    fn sample() -> DocumentIndex {
        index_of(
            r#"{
              "groups": [
                { "name": "server", "type": "com.example.ServerProperties" },
                { "name": "server.ssl", "type": "com.example.Ssl" }
              ],
              "properties": [
                { "name": "server.port", "type": "java.lang.Integer", "description": "HTTP port." },
                { "name": "server.ssl.enabled", "type": "java.lang.Boolean" },
                { "name": "logging.level",
                  "type": "java.util.Map<java.lang.String,java.lang.String>" },
                { "name": "spring.mvc.locale", "type": "java.util.Locale",
                  "deprecation": { "level": "error", "replacement": "spring.web.locale" } }
              ],
              "hints": [
                { "name": "logging.level.keys",
                  "values": [ { "value": "root" } ] },
                { "name": "logging.level.values",
                  "values": [ { "value": "info" }, { "value": "warn" } ] }
              ]
            }"#,
        )
    }

    #[test]
    fn exact_lookups_by_any_textual_form() {
        let index = sample();
        assert!(index.property("server.port").is_some());
        assert!(index.property("server.Port").is_some());
        assert!(index.group("server.ssl").is_some());
        assert!(index.property("server.missing").is_none());
        assert!(index
            .property_or_group("server")
            .is_some_and(|item| item.as_property().is_none()));
    }

    #[test]
    fn every_property_is_reachable_through_the_trie() {
        let index = sample();
        for property in index.properties() {
            let node = index
                .find_in_name_trie(&property.name().to_string())
                .unwrap();
            assert!(
                node.items().iter().any(|i| i.name() == property.name()),
                "trie node for {} does not anchor it",
                property.name()
            );
        }
    }

    #[test]
    fn nearest_parent_walks_the_ancestor_chain() {
        let index = sample();
        let found = index
            .nearest_parent_property("logging.level.org.springframework.web")
            .unwrap();
        assert_eq!(found.name().to_string(), "logging.level");
        assert!(index.nearest_parent_property("nothing.defined.here").is_none());
    }

    #[test]
    fn map_properties_bind_sub_keys() {
        let index = sample();
        let map = index.property("logging.level").unwrap();
        assert!(map.is_map());
        assert!(map.can_bind("logging.level"));
        assert!(map.can_bind("logging.level.org.example"));
        let scalar = index.property("server.port").unwrap();
        assert!(scalar.can_bind("server.port"));
        assert!(!scalar.can_bind("server.port.extra"));
    }

    #[test]
    fn hint_resolution_prefers_exact_then_values_suffix() {
        let index = sample();
        let map = index.property("logging.level").unwrap();
        let value_hint = index.value_hint(map).unwrap();
        assert_eq!(value_hint.name().to_string(), "logging.level.values");
        let key_hint = index.key_hint(map).unwrap();
        assert_eq!(key_hint.name().to_string(), "logging.level.keys");

        // A non-suffixed hint named exactly as the property wins.
        let index = index_of(
            r#"{
              "properties": [ { "name": "spring.jpa.ddl",
                "type": "java.util.Map<java.lang.String,java.lang.String>" } ],
              "hints": [
                { "name": "spring.jpa.ddl", "values": [ { "value": "exact" } ] },
                { "name": "spring.jpa.ddl.values", "values": [ { "value": "suffixed" } ] }
              ]
            }"#,
        );
        let property = index.property("spring.jpa.ddl").unwrap();
        let hint = index.value_hint(property).unwrap();
        assert_eq!(hint.values()[0].render(), "exact");
    }

    #[test]
    fn completion_walks_the_trie_and_matches_partial_segments() {
        let index = sample();

        let names = |items: Vec<MetadataItem<'_>>| {
            let mut names: Vec<String> = items.iter().map(|i| i.name().to_string()).collect();
            names.sort();
            names
        };

        // Everything under `server`, including the nested group and its leaf.
        let all = names(index.complete_key("server", ""));
        assert_eq!(all, vec!["server.port", "server.ssl", "server.ssl.enabled"]);

        // Partial segment narrows by prefix.
        let ports = names(index.complete_key("server", "po"));
        assert_eq!(ports, vec!["server.port"]);

        // Multi-element query walks one trie level per element.
        let nested = names(index.complete_key("", "server.ss"));
        assert_eq!(nested, vec!["server.ssl", "server.ssl.enabled"]);

        // Unknown roots yield nothing.
        assert!(index.complete_key("nope", "").is_empty());
    }

    #[test]
    fn removed_properties_are_excluded_from_completion_but_not_lookup() {
        let index = sample();
        let removed = index.property("spring.mvc.locale").unwrap();
        assert!(removed.is_removed());

        let candidates = index.complete_key("spring.mvc", "");
        assert!(candidates.is_empty());
        let candidates = index.complete_key("", "spring");
        assert!(!candidates
            .iter()
            .any(|item| item.name().to_string() == "spring.mvc.locale"));
    }

    #[test]
    fn malformed_entries_are_skipped_without_failing_the_document() {
        let index = index_of(
            r#"{
              "properties": [
                { "name": "" },
                { "name": "a.b", "type": "java.lang.String" },
                { "name": "c.d", "deprecation": "not-an-object" },
                { "name": "e.f" }
              ]
            }"#,
        );
        let mut names: Vec<String> = index
            .properties()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.b", "e.f"]);
    }

    #[test]
    fn invalid_json_fails_the_document() {
        let err = DocumentIndex::from_json_bytes("bad", b"{ not json", &DefaultShapeResolver)
            .unwrap_err();
        assert!(matches!(err, MetadataError::MalformedDocument { .. }));
    }

    #[test]
    fn duplicate_names_keep_the_first_entry() {
        let index = index_of(
            r#"{
              "properties": [
                { "name": "a.b", "description": "first" },
                { "name": "a.b", "description": "second" }
              ]
            }"#,
        );
        assert_eq!(index.property("a.b").unwrap().description(), Some("first"));
        assert_eq!(index.complete_key("a", "").len(), 1);
    }

    #[test]
    fn empty_index_reports_empty() {
        let index = index_of(r#"{ "groups": [ { "name": "server" } ] }"#);
        assert!(index.is_empty());
    }
}
