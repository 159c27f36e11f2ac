//! Composition of per-file indexes into one logical index.
//!
//! Constituents are consulted in priority order: `add_first` installs a
//! higher-priority index (a module's own metadata, or locally derived
//! indexes), `add_last` appends a lower-priority one (dependency jars in
//! classpath order). A name defined by two constituents is entirely shadowed
//! by the higher-priority one; there is no field-level merge.

use std::collections::HashSet;
use std::sync::Arc;

use crate::hint::MetadataHint;
use crate::index::{MetadataGroup, MetadataIndex, MetadataItem, MetadataProperty};
use crate::name::PropertyName;

type Constituent = Arc<dyn MetadataIndex + Send + Sync>;

/// An ordered list of constituent indexes answering the same query contract
/// as a single index.
///
/// The constituent list is immutable once the aggregate is shared; rebuilds
/// construct a fresh `AggregatedIndex` and swap the owning `Arc`, so readers
/// holding the previous one keep a consistent snapshot.
#[derive(Clone, Default)]
pub struct AggregatedIndex {
    constituents: Vec<Constituent>,
}

impl AggregatedIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a constituent at the front: it is consulted first and shadows
    /// every later constituent.
    pub fn add_first(&mut self, index: Constituent) {
        self.constituents.insert(0, index);
    }

    /// Append a constituent at the back, lowest priority.
    pub fn add_last(&mut self, index: Constituent) {
        self.constituents.push(index);
    }

    #[must_use]
    pub fn num_constituents(&self) -> usize {
        self.constituents.len()
    }
}

impl std::fmt::Debug for AggregatedIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregatedIndex")
            .field("constituents", &self.constituents.len())
            .finish()
    }
}

impl MetadataIndex for AggregatedIndex {
    fn property_by_name(&self, name: &PropertyName) -> Option<&MetadataProperty> {
        self.constituents
            .iter()
            .find_map(|c| c.property_by_name(name))
    }

    fn group_by_name(&self, name: &PropertyName) -> Option<&MetadataGroup> {
        self.constituents.iter().find_map(|c| c.group_by_name(name))
    }

    fn hint_by_name(&self, name: &PropertyName) -> Option<&MetadataHint> {
        self.constituents.iter().find_map(|c| c.hint_by_name(name))
    }

    fn is_empty(&self) -> bool {
        self.constituents.iter().all(|c| c.is_empty())
    }

    fn properties(&self) -> Vec<&MetadataProperty> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for constituent in &self.constituents {
            for property in constituent.properties() {
                if seen.insert(property.name().clone()) {
                    out.push(property);
                }
            }
        }
        out
    }

    fn complete_key(&self, parent: &str, query: &str) -> Vec<MetadataItem<'_>> {
        // A first-non-null delegation would hide later constituents whose
        // subtrees are disjoint from the first match, so candidates are
        // unioned; on duplicate names the earlier constituent wins.
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for constituent in &self.constituents {
            for item in constituent.complete_key(parent, query) {
                if seen.insert(item.name().clone()) {
                    out.push(item);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DocumentIndex;
    use crate::shape::DefaultShapeResolver;
    use pretty_assertions::assert_eq;

    fn doc(source: &str, json: &str) -> Constituent {
        Arc::new(
            DocumentIndex::from_json_bytes(source, json.as_bytes(), &DefaultShapeResolver)
                .unwrap(),
        )
    }

    #[test]
    fn first_constituent_shadows_later_definitions() {
        let own = doc(
            "module",
            r#"{ "properties": [ { "name": "x.y", "description": "module's own" } ] }"#,
        );
        let dependency = doc(
            "dependency",
            r#"{ "properties": [ { "name": "x.y", "description": "from dependency" },
                                 { "name": "x.z", "description": "only here" } ] }"#,
        );

        let mut aggregate = AggregatedIndex::new();
        aggregate.add_last(dependency);
        aggregate.add_first(own);

        assert_eq!(
            aggregate.property("x.y").unwrap().description(),
            Some("module's own")
        );
        assert_eq!(
            aggregate.property("x.z").unwrap().description(),
            Some("only here")
        );
    }

    #[test]
    fn completion_unions_disjoint_constituents() {
        let a = doc("a", r#"{ "properties": [ { "name": "server.port" } ] }"#);
        let b = doc("b", r#"{ "properties": [ { "name": "spring.mvc.locale" } ] }"#);

        let mut aggregate = AggregatedIndex::new();
        aggregate.add_last(a);
        aggregate.add_last(b);

        let mut names: Vec<String> = aggregate
            .complete_key("", "s")
            .iter()
            .map(|item| item.name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["server.port", "spring.mvc.locale"]);
    }

    #[test]
    fn duplicate_completion_candidates_keep_the_priority_definition() {
        let first = doc(
            "first",
            r#"{ "properties": [ { "name": "a.b", "description": "priority" } ] }"#,
        );
        let second = doc(
            "second",
            r#"{ "properties": [ { "name": "a.b", "description": "shadowed" } ] }"#,
        );

        let mut aggregate = AggregatedIndex::new();
        aggregate.add_last(second);
        aggregate.add_first(first);

        let items = aggregate.complete_key("a", "");
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].as_property().unwrap().description(),
            Some("priority")
        );
    }

    #[test]
    fn hint_and_ancestor_lookups_delegate_in_order() {
        let maps = doc(
            "maps",
            r#"{ "properties": [ { "name": "logging.level",
                   "type": "java.util.Map<java.lang.String,java.lang.String>" } ],
                 "hints": [ { "name": "logging.level.values",
                   "values": [ { "value": "debug" } ] } ] }"#,
        );
        let mut aggregate = AggregatedIndex::new();
        aggregate.add_last(maps);

        let property = aggregate
            .nearest_parent_property("logging.level.org.example")
            .unwrap();
        assert_eq!(property.name().to_string(), "logging.level");
        let hint = aggregate.value_hint(property).unwrap();
        assert_eq!(hint.values()[0].render(), "debug");
    }

    #[test]
    fn empty_only_when_all_constituents_are_empty() {
        let mut aggregate = AggregatedIndex::new();
        assert!(aggregate.is_empty());
        aggregate.add_last(doc("empty", r#"{}"#));
        assert!(aggregate.is_empty());
        aggregate.add_last(doc("full", r#"{ "properties": [ { "name": "a" } ] }"#));
        assert!(!aggregate.is_empty());
    }
}
