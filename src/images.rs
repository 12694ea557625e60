//! Durable copies of photos picked for dog profiles.
//!
//! A picked file may live somewhere transient (a download folder, a mounted
//! camera). Profiles only ever store the path returned by
//! [`ImageStore::persist`], which points into the application's own image
//! directory and stays valid after the original is gone.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use tracing::info;

pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `source` into the image directory and return the durable path.
    /// Files already inside the directory are returned unchanged.
    pub fn persist(&self, source: &Path) -> Result<PathBuf> {
        if !source.is_file() {
            return Err(anyhow!("image not found: {}", source.display()));
        }
        if self.contains(source) {
            return Ok(source.to_path_buf());
        }

        fs::create_dir_all(&self.dir).context("failed to create image directory")?;

        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        let stamp = Local::now().format("%Y%m%d%H%M%S%3f");
        let mut target = self.dir.join(format!("{stamp}-{file_name}"));
        let mut attempt = 1;
        while target.exists() {
            target = self.dir.join(format!("{stamp}-{attempt}-{file_name}"));
            attempt += 1;
        }

        fs::copy(source, &target)
            .with_context(|| format!("failed to copy image {}", source.display()))?;
        info!(source = %source.display(), target = %target.display(), "stored image");
        Ok(target)
    }

    fn contains(&self, path: &Path) -> bool {
        match (path.parent(), fs::canonicalize(&self.dir)) {
            (Some(parent), Ok(dir)) => fs::canonicalize(parent)
                .map(|parent| parent == dir)
                .unwrap_or(false),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn persisted_copy_outlives_the_source() {
        let scratch = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let source = scratch.path().join("asha.jpg");
        fs::write(&source, b"jpeg bytes").unwrap();

        let store = ImageStore::new(store_dir.path().join("images"));
        let durable = store.persist(&source).unwrap();
        fs::remove_file(&source).unwrap();

        assert!(durable.starts_with(store.dir()));
        assert!(durable.to_string_lossy().ends_with("asha.jpg"));
        assert_eq!(fs::read(&durable).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn repeated_persist_never_overwrites() {
        let scratch = TempDir::new().unwrap();
        let source = scratch.path().join("rex.png");
        fs::write(&source, b"png").unwrap();

        let store = ImageStore::new(scratch.path().join("images"));
        let first = store.persist(&source).unwrap();
        let second = store.persist(&source).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn stored_images_are_returned_as_is() {
        let scratch = TempDir::new().unwrap();
        let source = scratch.path().join("rex.png");
        fs::write(&source, b"png").unwrap();

        let store = ImageStore::new(scratch.path().join("images"));
        let durable = store.persist(&source).unwrap();
        assert_eq!(store.persist(&durable).unwrap(), durable);
    }

    #[test]
    fn missing_source_is_an_error() {
        let scratch = TempDir::new().unwrap();
        let store = ImageStore::new(scratch.path().join("images"));
        assert!(store.persist(&scratch.path().join("nope.jpg")).is_err());
    }
}
