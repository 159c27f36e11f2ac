//! Versioned snapshots of per-root indexes and per-module aggregation.
//!
//! A constituent index is an immutable value once built. [`MetadataFileRoot`]
//! wraps one class root with the source-file identity and last-known
//! modification token; [`MetadataFileRoot::current_or_rebuilt`] revalidates
//! the token and reloads only when stale, swapping the whole `Arc` so
//! readers holding the previous snapshot stay consistent. The owning module
//! service calls it once per read burst, not per query.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;

use bootmeta::{AggregatedIndex, DocumentIndex, MetadataIndex, TypeShapeResolver};

use crate::roots::{ClassRoot, ModificationToken};

struct LoadedState {
    file_identity: String,
    token: ModificationToken,
    index: Arc<DocumentIndex>,
}

/// One class root plus the current snapshot of its metadata index.
pub struct MetadataFileRoot {
    root: ClassRoot,
    // Per-root lock: concurrent readers of the same root never reload the
    // same file twice, while distinct roots reload independently.
    state: Mutex<Option<LoadedState>>,
}

impl MetadataFileRoot {
    #[must_use]
    pub fn new(root: ClassRoot) -> Self {
        Self {
            root,
            state: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn root(&self) -> &ClassRoot {
        &self.root
    }

    /// The current index for this root, reloading if the backing file
    /// changed. `None` when the root carries no (readable) metadata; the
    /// caller drops the root from aggregation on its next rebuild.
    pub fn current_or_rebuilt(
        &self,
        resolver: &dyn TypeShapeResolver,
    ) -> Option<Arc<DocumentIndex>> {
        let mut state = self.state.lock();

        let file = match self.root.metadata_file() {
            Ok(Some(file)) => file,
            Ok(None) => {
                *state = None;
                return None;
            }
            Err(err) => {
                tracing::warn!(root = %self.root.identity(), %err, "cannot probe metadata file");
                *state = None;
                return None;
            }
        };

        let identity = file.identity();
        let token = match file.modification_token() {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(file = %identity, %err, "cannot stat metadata file");
                *state = None;
                return None;
            }
        };

        if let Some(loaded) = state.as_ref() {
            if loaded.file_identity == identity && loaded.token == token {
                return Some(Arc::clone(&loaded.index));
            }
        }

        tracing::debug!(file = %identity, "reloading configuration metadata");
        let bytes = match file.read() {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(file = %identity, %err, "reading metadata file failed");
                // Keep serving the previous snapshot of the same file rather
                // than flapping on a transient read failure.
                return state
                    .as_ref()
                    .filter(|loaded| loaded.file_identity == identity)
                    .map(|loaded| Arc::clone(&loaded.index));
            }
        };

        match DocumentIndex::from_json_bytes(identity.clone(), &bytes, resolver) {
            Ok(index) => {
                let index = Arc::new(index);
                *state = Some(LoadedState {
                    file_identity: identity,
                    token,
                    index: Arc::clone(&index),
                });
                Some(index)
            }
            Err(err) => {
                tracing::warn!(file = %identity, %err, "parsing metadata file failed");
                state
                    .as_ref()
                    .filter(|loaded| loaded.file_identity == identity)
                    .map(|loaded| Arc::clone(&loaded.index))
            }
        }
    }
}

/// Shares one [`MetadataFileRoot`] per class root across modules, so a jar
/// referenced by many modules is loaded once.
#[derive(Default)]
pub struct MetadataRootCache {
    roots: Mutex<HashMap<String, Arc<MetadataFileRoot>>>,
}

impl MetadataRootCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_for(&self, root: ClassRoot) -> Arc<MetadataFileRoot> {
        let mut roots = self.roots.lock();
        Arc::clone(
            roots
                .entry(root.identity())
                .or_insert_with(|| Arc::new(MetadataFileRoot::new(root))),
        )
    }
}

struct ModuleState {
    class_roots: BTreeSet<String>,
    parts: Vec<Arc<DocumentIndex>>,
    index: Arc<AggregatedIndex>,
}

/// Per-module metadata service: aggregates the indexes of the module's class
/// roots, in classpath order, into one logical index.
pub struct ModuleMetadata {
    name: String,
    state: Mutex<ModuleState>,
}

impl ModuleMetadata {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(ModuleState {
                class_roots: BTreeSet::new(),
                parts: Vec::new(),
                index: Arc::new(AggregatedIndex::new()),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current aggregated index snapshot. Queries on the returned value
    /// never trigger I/O.
    #[must_use]
    pub fn index(&self) -> Arc<AggregatedIndex> {
        Arc::clone(&self.state.lock().index)
    }

    /// Revalidate every class root and publish a fresh aggregate when
    /// anything changed (class-root set, or a constituent reloaded). Called
    /// before each read burst, not per query; when all modification tokens
    /// are current this is one stat per root and no index work. An aggregate
    /// that came out empty does not replace a previously published one.
    pub fn refresh(
        &self,
        cache: &MetadataRootCache,
        class_roots: &[ClassRoot],
        resolver: &dyn TypeShapeResolver,
    ) {
        let identities: BTreeSet<String> =
            class_roots.iter().map(ClassRoot::identity).collect();

        let mut parts = Vec::new();
        for root in class_roots {
            let file_root = cache.root_for(root.clone());
            if let Some(index) = file_root.current_or_rebuilt(resolver) {
                if !index.is_empty() {
                    parts.push(index);
                }
            }
        }

        let mut state = self.state.lock();
        let unchanged = state.class_roots == identities
            && state.parts.len() == parts.len()
            && state
                .parts
                .iter()
                .zip(&parts)
                .all(|(a, b)| Arc::ptr_eq(a, b));
        if unchanged {
            return;
        }
        if parts.is_empty() {
            return;
        }

        tracing::debug!(module = %self.name, roots = identities.len(), "rebuilding module metadata");
        let mut aggregate = AggregatedIndex::new();
        for part in &parts {
            aggregate.add_last(Arc::clone(part) as _);
        }
        state.class_roots = identities;
        state.parts = parts;
        state.index = Arc::new(aggregate);
    }
}
