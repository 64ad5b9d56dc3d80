//! A single JSON file treated as one document.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A parsed document together with the exact text it was parsed from.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub document: T,
    pub raw: String,
}

/// Typed handle on a JSON file. Holds only the path.
#[derive(Debug, Clone)]
pub struct JsonDocument<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling snapshot path: `<path>.bak`.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    /// Strict read. `Ok(None)` when the file does not exist.
    pub fn read(&self) -> Result<Option<T>, DocumentError> {
        Ok(self.read_loaded()?.map(|loaded| loaded.document))
    }

    /// Strict read that also returns the file's text, for snapshots.
    pub fn read_loaded(&self) -> Result<Option<Loaded<T>>, DocumentError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(DocumentError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let document = serde_json::from_str(&raw).map_err(|source| DocumentError::Json {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(Loaded { document, raw }))
    }

    /// Best-effort read: `default` when the file is missing or unreadable.
    pub fn load(&self, default: T) -> T {
        match self.read() {
            Ok(Some(document)) => document,
            Ok(None) => {
                debug!("{} not found, using default", self.path.display());
                default
            }
            Err(e) => {
                warn!("{e}, using default");
                default
            }
        }
    }

    pub fn load_or_default(&self) -> T
    where
        T: Default,
    {
        self.load(T::default())
    }

    /// Write the document, creating parent directories. Failures are logged.
    pub fn save(&self, document: &T) -> bool {
        let written = serde_json::to_string_pretty(document)
            .map_err(|source| DocumentError::Json {
                path: self.path.clone(),
                source,
            })
            .and_then(|content| write_text(&self.path, &content));
        match written {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save document: {e}");
                false
            }
        }
    }

    /// Overwrite `<path>.bak` with `raw`, the text of the document as read.
    pub fn backup(&self, raw: &str) -> bool {
        match write_text(&self.backup_path(), raw) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to write backup: {e}");
                false
            }
        }
    }
}

fn write_text(path: &Path, content: &str) -> Result<(), DocumentError> {
    let io_err = |source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, content).map_err(io_err)
}
