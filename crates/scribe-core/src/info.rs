//! Resolution of a rule's free-text guidance.
//!
//! `info_path` wins over `info` when both are set. The file is read on every
//! call; callers that want caching keep the result themselves.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, instrument};

use crate::error::{RuleError, RuleResult};

/// Reads whole files on behalf of the rule engine.
pub trait FileReader: std::fmt::Debug + Send + Sync {
    /// Read the full contents of `path`.
    fn read_to_string(&self, path: &Utf8Path) -> std::io::Result<String>;
}

/// Reads from the local filesystem, resolving relative paths against `root`.
#[derive(Debug, Clone)]
pub struct FsReader {
    root: Utf8PathBuf,
}

impl FsReader {
    /// Create a reader rooted at a project directory.
    pub fn new<P: AsRef<Utf8Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl FileReader for FsReader {
    fn read_to_string(&self, path: &Utf8Path) -> std::io::Result<String> {
        std::fs::read_to_string(self.root.join(path))
    }
}

/// Resolve the effective info text.
///
/// Returns `Ok(None)` when neither source is configured.
#[instrument(skip(info, reader))]
pub fn resolve_info(
    info: Option<&str>,
    info_path: Option<&Utf8Path>,
    reader: &dyn FileReader,
) -> RuleResult<Option<String>> {
    if let Some(path) = info_path {
        debug!(%path, "reading info from file");
        let text = reader
            .read_to_string(path)
            .map_err(|source| RuleError::Resource {
                path: path.to_path_buf(),
                source,
            })?;
        return Ok(Some(text));
    }
    Ok(info.map(str::to_string))
}
