//! Class roots and the metadata files inside them.
//!
//! A class root is one classpath entry: an exploded directory (a module's
//! own output or `src/main/resources`) or a dependency jar. Each root
//! contributes at most one metadata document: the processor-generated file,
//! or the hand-authored additional file only when the primary is absent in
//! that root — when both exist, the processor has already merged the
//! additional entries into the primary.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;
use zip::ZipArchive;

use crate::ClasspathError;

pub const METADATA_FILE: &str = "META-INF/spring-configuration-metadata.json";
pub const ADDITIONAL_METADATA_FILE: &str = "META-INF/additional-spring-configuration-metadata.json";

/// One classpath entry that may carry configuration metadata.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassRoot {
    Dir(PathBuf),
    Jar(PathBuf),
}

impl ClassRoot {
    /// Classify a path: jar/zip files become [`ClassRoot::Jar`], everything
    /// else a directory root.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match path.extension().and_then(|e| e.to_str()) {
            Some("jar" | "zip") => ClassRoot::Jar(path),
            _ => ClassRoot::Dir(path),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ClassRoot::Dir(path) | ClassRoot::Jar(path) => path,
        }
    }

    /// Stable identity used to key caches and compare class-root sets.
    #[must_use]
    pub fn identity(&self) -> String {
        self.path().display().to_string()
    }

    /// Locate this root's metadata file, honoring the
    /// primary-before-additional rule. `Ok(None)` means the root carries no
    /// metadata.
    pub fn metadata_file(&self) -> Result<Option<MetadataFile>, ClasspathError> {
        for entry in [METADATA_FILE, ADDITIONAL_METADATA_FILE] {
            if self.contains(entry)? {
                return Ok(Some(MetadataFile {
                    root: self.clone(),
                    entry,
                }));
            }
        }
        Ok(None)
    }

    fn contains(&self, entry: &str) -> Result<bool, ClasspathError> {
        match self {
            ClassRoot::Dir(path) => Ok(path.join(entry).is_file()),
            ClassRoot::Jar(path) => {
                if !path.is_file() {
                    return Ok(false);
                }
                let archive = open_jar(path)?;
                Ok(archive.index_for_name(entry).is_some())
            }
        }
    }
}

/// The metadata document found inside one class root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataFile {
    root: ClassRoot,
    entry: &'static str,
}

impl MetadataFile {
    #[must_use]
    pub fn root(&self) -> &ClassRoot {
        &self.root
    }

    /// Identity string naming the document, e.g. `deps/web.jar!/META-INF/...`.
    #[must_use]
    pub fn identity(&self) -> String {
        match &self.root {
            ClassRoot::Dir(path) => path.join(self.entry).display().to_string(),
            ClassRoot::Jar(path) => format!("{}!/{}", path.display(), self.entry),
        }
    }

    /// Current modification token for staleness checks. For a jar this is
    /// the jar file itself; entries inside cannot change independently.
    pub fn modification_token(&self) -> Result<ModificationToken, ClasspathError> {
        let tracked = match &self.root {
            ClassRoot::Dir(path) => path.join(self.entry),
            ClassRoot::Jar(path) => path.clone(),
        };
        let metadata = std::fs::metadata(&tracked).map_err(|source| ClasspathError::Io {
            path: tracked.clone(),
            source,
        })?;
        Ok(ModificationToken {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }

    /// Read the document bytes.
    pub fn read(&self) -> Result<Vec<u8>, ClasspathError> {
        match &self.root {
            ClassRoot::Dir(path) => {
                let path = path.join(self.entry);
                std::fs::read(&path).map_err(|source| ClasspathError::Io { path, source })
            }
            ClassRoot::Jar(path) => {
                let mut archive = open_jar(path)?;
                let mut entry =
                    archive
                        .by_name(self.entry)
                        .map_err(|source| ClasspathError::Archive {
                            path: path.clone(),
                            source,
                        })?;
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry
                    .read_to_end(&mut bytes)
                    .map_err(|source| ClasspathError::Io {
                        path: path.clone(),
                        source,
                    })?;
                Ok(bytes)
            }
        }
    }
}

/// Opaque staleness token: file length plus last-modified time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModificationToken {
    len: u64,
    modified: Option<SystemTime>,
}

fn open_jar(path: &Path) -> Result<ZipArchive<File>, ClasspathError> {
    let file = File::open(path).map_err(|source| ClasspathError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ZipArchive::new(file).map_err(|source| ClasspathError::Archive {
        path: path.to_path_buf(),
        source,
    })
}

/// Collect the jar roots under `dir` (e.g. a resolved dependency directory),
/// sorted for a deterministic classpath order.
#[must_use]
pub fn jar_roots_in(dir: &Path) -> Vec<ClassRoot> {
    let mut roots: Vec<ClassRoot> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            matches!(
                entry.path().extension().and_then(|e| e.to_str()),
                Some("jar" | "zip")
            )
        })
        .map(|entry| ClassRoot::Jar(entry.into_path()))
        .collect();
    roots.sort();
    roots
}
