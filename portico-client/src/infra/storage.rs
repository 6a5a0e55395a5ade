//! Durable storage for the bearer token
//!
//! One global slot keyed by [`TOKEN_KEY`]. Access is synchronous: the token is
//! read on every outbound request and must be available without awaiting.

use std::fmt::Debug;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::domains::auth::errors::StorageError;

/// Fixed key the token is stored under
pub const TOKEN_KEY: &str = "auth_token";

pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value slot holding the persisted bearer token
pub trait TokenStore: Send + Sync + Debug {
    /// Read the token, if one is stored
    fn load(&self) -> StorageResult<Option<String>>;

    /// Replace the stored token
    fn save(&self, token: &str) -> StorageResult<()>;

    /// Delete the stored token. Clearing an empty slot succeeds.
    fn clear(&self) -> StorageResult<()>;
}

/// Token slot backed by a single file in the application data directory
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token as `<dir>/auth_token`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> StorageResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed(e)),
        }
    }

    fn save(&self, token: &str) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::WriteFailed)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(StorageError::WriteFailed)?;

        // `mode` only applies on creation; tighten a file left by an older write
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(StorageError::WriteFailed)?;
        }
        file.write_all(token.as_bytes())
            .map_err(StorageError::WriteFailed)?;

        log::debug!("[TokenStore] Token persisted to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                log::debug!("[TokenStore] Token removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::RemoveFailed(e)),
        }
    }
}

/// In-process token slot
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> StorageResult<Option<String>> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, token: &str) -> StorageResult<()> {
        *self.slot.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.slot.lock().take();
        Ok(())
    }
}
