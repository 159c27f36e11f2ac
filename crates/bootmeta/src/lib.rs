//! In-memory index over Spring Boot configuration metadata.
//!
//! Ingests the JSON metadata documents emitted by the configuration
//! annotation processor (groups, properties, hints, value providers,
//! deprecation info), merges them across files and dependencies, and answers
//! dotted-path queries: exact lookup, nearest-ancestor resolution, prefix
//! completion over a per-segment name trie, and map key/value hint
//! disambiguation.
//!
//! Everything here is a pure value computation — no I/O, no host-framework
//! types. File discovery and reload live in `bootmeta-classpath`; editors and
//! inspections consume the [`MetadataIndex`] trait from `bootmeta-assist` or
//! their own glue.

mod aggregate;
mod hint;
mod index;
mod model;
mod name;
mod shape;
mod trie;

pub use aggregate::AggregatedIndex;
pub use hint::{MetadataHint, ProviderError, ProviderKind, ValueProvider};
pub use index::{
    DocumentIndex, MetadataError, MetadataGroup, MetadataIndex, MetadataItem, MetadataProperty,
};
pub use model::{
    ConfigurationMetadata, Deprecation, DeprecationLevel, GroupMetadata, HintMetadata,
    PropertyMetadata, ProviderRef, ValueHint,
};
pub use name::{Form, PropertyName};
pub use shape::{DefaultShapeResolver, ScalarKind, TypeShape, TypeShapeResolver};
pub use trie::{NameTrie, TrieItem, TrieNode};
