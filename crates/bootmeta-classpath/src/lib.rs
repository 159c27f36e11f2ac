//! Discovery and lifecycle of configuration-metadata documents on a module
//! classpath.
//!
//! Two file names are recognized per class root:
//! `META-INF/spring-configuration-metadata.json` (annotation-processor
//! output) and `META-INF/additional-spring-configuration-metadata.json`
//! (hand-authored, consulted only when the primary is absent). Roots may be
//! exploded directories or jars. Loaded indexes are published as immutable
//! snapshots and revalidated against a file modification token, so readers
//! never observe a partially rebuilt index.

use std::path::PathBuf;

use thiserror::Error;

mod roots;
mod snapshot;

pub use roots::{
    jar_roots_in, ClassRoot, MetadataFile, ModificationToken, ADDITIONAL_METADATA_FILE,
    METADATA_FILE,
};
pub use snapshot::{MetadataFileRoot, MetadataRootCache, ModuleMetadata};

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("i/o error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read archive {path}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}
