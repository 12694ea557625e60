//! The single lazily opened connection to the on-device store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};

use rusqlite::Connection;
use tracing::info;

use super::error::{Result, StoreError};
use crate::paths::AppPaths;

/// Owner of the single connection to the on-device store.
///
/// The connection is opened on the first [`StorageHandle::acquire`] and reused
/// for the lifetime of the handle. `main` builds exactly one handle and hands
/// it to the UI, so there is no process-global state.
pub struct StorageHandle {
    path: PathBuf,
    conn: OnceLock<Mutex<Connection>>,
    /// Serializes the first open so racing callers never open twice.
    opening: Mutex<()>,
}

impl StorageHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            conn: OnceLock::new(),
            opening: Mutex::new(()),
        }
    }

    /// Handle for the fixed store file inside the application data directory.
    pub fn at(paths: &AppPaths) -> Self {
        Self::new(&paths.db_file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the connection has been opened yet.
    pub fn is_open(&self) -> bool {
        self.conn.get().is_some()
    }

    /// Return the live connection, opening the store on first use.
    pub fn acquire(&self) -> Result<MutexGuard<'_, Connection>> {
        let conn = match self.conn.get() {
            Some(conn) => conn,
            None => self.open_once()?,
        };
        conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn open_once(&self) -> Result<&Mutex<Connection>> {
        let _opening = self.opening.lock().map_err(|_| StoreError::Poisoned)?;
        if let Some(conn) = self.conn.get() {
            return Ok(conn);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| StoreError::StorageUnavailable {
                path: self.path.clone(),
                source: Box::new(err),
            })?;
        }

        let conn = Connection::open(&self.path).map_err(|err| StoreError::StorageUnavailable {
            path: self.path.clone(),
            source: Box::new(err),
        })?;
        info!(path = %self.path.display(), "opened breeding records store");

        Ok(self.conn.get_or_init(|| Mutex::new(conn)))
    }
}
