//! Local-disk profile picture store.
//!
//! Contract: store bytes under a name, serve by path. Files land in a
//! single uploads directory as `{user_id}_profile.{ext}` and are served
//! by the API under `/uploads`.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};

/// Public URL prefix the API serves the uploads directory under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Maximum accepted extension length.
const MAX_EXT_LEN: usize = 8;

/// Profile picture store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct ProfileStorage {
    root: PathBuf,
}

impl ProfileStorage {
    /// Open (and create if missing) the uploads directory.
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| StorageError::config_error(format!("cannot create {:?}: {}", root, e)))?;
        Ok(Self { root })
    }

    /// Directory to mount for static serving.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store picture bytes for a user, replacing any previous upload with
    /// the same extension. Returns the public path to serve it from.
    pub async fn save_profile_picture(
        &self,
        user_id: &str,
        original_filename: &str,
        bytes: &[u8],
    ) -> StorageResult<String> {
        let ext = sanitize_extension(original_filename)?;
        let filename = format!("{}_profile.{}", user_id, ext);
        let path = self.root.join(&filename);

        tokio::fs::write(&path, bytes).await?;
        debug!(user_id, file = %filename, size = bytes.len(), "stored profile picture");

        Ok(format!("{}/{}", PUBLIC_PREFIX, filename))
    }

    /// Remove a previously stored picture by its public path. Best effort:
    /// a missing file is not an error, and the path must resolve inside
    /// the uploads directory.
    pub async fn remove_by_public_path(&self, public_path: &str) -> StorageResult<()> {
        let Some(filename) = public_path.strip_prefix(&format!("{}/", PUBLIC_PREFIX)) else {
            return Err(StorageError::invalid_filename(public_path.to_string()));
        };
        if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
            return Err(StorageError::invalid_filename(filename.to_string()));
        }

        match tokio::fs::remove_file(self.root.join(filename)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(file = filename, "failed to remove profile picture: {}", e);
                Err(e.into())
            }
        }
    }
}

/// Extract and validate a file extension. Blocks path traversal and
/// anything that is not a short alphanumeric suffix.
fn sanitize_extension(filename: &str) -> StorageResult<String> {
    let ext = filename
        .rsplit('.')
        .next()
        .filter(|e| *e != filename)
        .ok_or_else(|| StorageError::invalid_filename(format!("{} has no extension", filename)))?;

    if ext.is_empty()
        || ext.len() > MAX_EXT_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(StorageError::invalid_filename(format!(
            "unsupported extension: {}",
            ext
        )));
    }

    Ok(ext.to_ascii_lowercase())
}
