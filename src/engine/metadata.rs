// ABOUTME: Reference metadata captured from an existing destination before it is rewritten
// ABOUTME: Re-applies permission bits and, on unix, owning user and group to the new file

use std::fs::{self, File, Permissions};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::{EngineError, Result};

#[derive(Debug, Clone)]
pub struct ReferenceMetadata {
    path: PathBuf,
    permissions: Permissions,
    #[cfg(unix)]
    uid: u32,
    #[cfg(unix)]
    gid: u32,
}

impl ReferenceMetadata {
    /// Read metadata of an existing regular file; `None` when there is nothing to preserve
    pub fn capture(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        if !metadata.is_file() {
            return None;
        }

        #[cfg(unix)]
        use std::os::unix::fs::MetadataExt;

        Some(Self {
            path: path.to_path_buf(),
            permissions: metadata.permissions(),
            #[cfg(unix)]
            uid: metadata.uid(),
            #[cfg(unix)]
            gid: metadata.gid(),
        })
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    /// Set the captured permissions and ownership on `file`
    pub fn apply(&self, file: &File) -> Result<()> {
        debug!("Restoring metadata on {}", self.path.display());

        file.set_permissions(self.permissions.clone())
            .map_err(|source| self.error(source))?;

        #[cfg(unix)]
        self.apply_ownership(file)?;

        Ok(())
    }

    #[cfg(unix)]
    fn apply_ownership(&self, file: &File) -> Result<()> {
        use std::os::unix::fs::MetadataExt;

        let current = file.metadata().map_err(|source| self.error(source))?;
        if current.uid() == self.uid && current.gid() == self.gid {
            return Ok(());
        }

        std::os::unix::fs::fchown(file, Some(self.uid), Some(self.gid))
            .map_err(|source| self.error(source))
    }

    fn error(&self, source: std::io::Error) -> EngineError {
        EngineError::Metadata {
            path: self.path.clone(),
            source,
        }
    }
}
