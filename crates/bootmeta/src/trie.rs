//! Per-segment prefix tree over [`PropertyName`] elements.
//!
//! Children are keyed by the uniform element text in a sorted map so a
//! partial segment resolves to its matches with a range scan, O(log n + k).
//! Indexed elements (`[0]`, `['key']`) collapse into a single child stored
//! under a sentinel key and flagged `indexed`; completion must not descend
//! past them, since suggesting children of an unspecified index is not
//! actionable.

use std::collections::BTreeMap;

use crate::name::{Form, PropertyName};

/// Sentinel child key for indexed elements. Parsed segments never contain
/// `[`, so it cannot collide with a real segment.
const INDEXED_KEY: &str = "[]";

/// Reference to a metadata item anchored at a trie node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrieItem {
    Property(PropertyName),
    Group(PropertyName),
}

impl TrieItem {
    #[must_use]
    pub fn name(&self) -> &PropertyName {
        match self {
            TrieItem::Property(name) | TrieItem::Group(name) => name,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TrieNode {
    children: BTreeMap<String, TrieNode>,
    items: Vec<TrieItem>,
    indexed: bool,
}

impl TrieNode {
    /// Whether this node was reached via an indexed segment.
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Items anchored exactly at this node.
    #[must_use]
    pub fn items(&self) -> &[TrieItem] {
        &self.items
    }

    pub fn children(&self) -> impl Iterator<Item = &TrieNode> {
        self.children.values()
    }

    /// Children whose uniform element text starts with `prefix` (all
    /// children for an empty prefix).
    pub fn children_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a TrieNode> {
        self.children
            .range(prefix.to_string()..)
            .take_while(move |(key, _)| key.starts_with(prefix))
            .map(|(_, node)| node)
    }

    /// Breadth-first collection of every item in this subtree. Descent stops
    /// at indexed nodes, though items anchored on an indexed node itself are
    /// still reported. Items on the search root are skipped unless
    /// `include_root_items` is set.
    pub fn collect_items(&self, include_root_items: bool, out: &mut Vec<TrieItem>) {
        let mut level: Vec<&TrieNode> = vec![self];
        let mut first = true;
        while !level.is_empty() {
            let mut next = Vec::new();
            for node in level {
                if !first || include_root_items {
                    out.extend(node.items.iter().cloned());
                }
                if !node.indexed {
                    next.extend(node.children.values());
                }
            }
            level = next;
            first = false;
        }
    }
}

/// Prefix tree mapping each path to the metadata items rooted there.
#[derive(Clone, Debug, Default)]
pub struct NameTrie {
    root: TrieNode,
}

impl NameTrie {
    /// Walk/create nodes for each element of `name`, attaching `item` at the
    /// terminal node.
    pub fn insert(&mut self, name: &PropertyName, item: TrieItem) {
        let mut node = &mut self.root;
        for i in 0..name.num_elements() {
            node = if name.is_indexed(i) {
                let child = node.children.entry(INDEXED_KEY.to_string()).or_default();
                child.indexed = true;
                child
            } else {
                node.children
                    .entry(name.element(i, Form::Uniform).to_string())
                    .or_default()
            };
        }
        node.items.push(item);
    }

    /// Resolve the node at `path`, or `None` if no inserted name traverses
    /// it. The empty path resolves to the root.
    #[must_use]
    pub fn node_at(&self, path: &PropertyName) -> Option<&TrieNode> {
        let mut node = &self.root;
        for i in 0..path.num_elements() {
            let key = if path.is_indexed(i) {
                INDEXED_KEY
            } else {
                path.element(i, Form::Uniform)
            };
            node = node.children.get(key)?;
        }
        Some(node)
    }

    #[must_use]
    pub fn root(&self) -> &TrieNode {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn trie_of(names: &[&str]) -> NameTrie {
        let mut trie = NameTrie::default();
        for raw in names {
            let name = PropertyName::of(raw);
            trie.insert(&name, TrieItem::Property(name.clone()));
        }
        trie
    }

    fn collected_names(node: &TrieNode, include_root: bool) -> Vec<String> {
        let mut items = Vec::new();
        node.collect_items(include_root, &mut items);
        let mut names: Vec<String> = items.iter().map(|i| i.name().to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn inserted_names_resolve_to_annotated_nodes() {
        let trie = trie_of(&["server.port", "server.address"]);
        let node = trie.node_at(&PropertyName::of("server.port")).unwrap();
        assert_eq!(node.items().len(), 1);
        assert_eq!(node.items()[0].name().to_string(), "server.port");
        assert!(trie.node_at(&PropertyName::of("server.missing")).is_none());
    }

    #[test]
    fn node_lookup_matches_adapted_forms() {
        let trie = trie_of(&["spring.datasource.hikari.max-pool-size"]);
        let node = trie
            .node_at(&PropertyName::adapt("spring.datasource.hikari.maxPoolSize"))
            .unwrap();
        assert_eq!(node.items().len(), 1);
    }

    #[test]
    fn prefix_scan_returns_matching_children() {
        let trie = trie_of(&["server.port", "server.servlet.path", "spring.mvc.locale"]);
        let root = trie.root();
        let matches: Vec<_> = root.children_with_prefix("s").collect();
        assert_eq!(matches.len(), 2);
        let matches: Vec<_> = root.children_with_prefix("spr").collect();
        assert_eq!(matches.len(), 1);
        let all: Vec<_> = root.children_with_prefix("").collect();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn collection_stops_descending_at_indexed_nodes() {
        let trie = trie_of(&[
            "server.ssl.enabled-protocols[0].name",
            "server.ssl.protocol",
        ]);
        let node = trie.node_at(&PropertyName::of("server.ssl")).unwrap();
        // `[0].name` sits below an indexed node and must not be suggested.
        assert_eq!(collected_names(node, false), vec!["server.ssl.protocol"]);
    }

    #[test]
    fn items_on_an_indexed_node_are_still_reported() {
        let mut trie = NameTrie::default();
        let name = PropertyName::of("a.b[0]");
        trie.insert(&name, TrieItem::Property(name.clone()));
        let node = trie.node_at(&PropertyName::of("a")).unwrap();
        assert_eq!(collected_names(node, false), vec!["a.b[0]"]);
    }

    #[test]
    fn root_items_are_skipped_unless_requested() {
        let trie = trie_of(&["server", "server.port"]);
        let node = trie.node_at(&PropertyName::of("server")).unwrap();
        assert_eq!(collected_names(node, false), vec!["server.port"]);
        assert_eq!(collected_names(node, true), vec!["server", "server.port"]);
    }
}
