use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".probreedics";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "probreedics.db";
/// Durable copies of picked photos live here.
const IMAGE_DIR_NAME: &str = "images";
const LOG_FILE_NAME: &str = "probreedics.log";

/// Every on-disk location the application touches. Nothing here is
/// configurable; the layout is fixed relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub db_file: PathBuf,
    pub image_dir: PathBuf,
    pub log_file: PathBuf,
}

impl AppPaths {
    /// Resolve the layout inside the user's home directory.
    pub fn resolve() -> Result<Self> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::under(base_dirs.home_dir().join(DATA_DIR_NAME)))
    }

    /// Build the same layout beneath an arbitrary data directory.
    pub fn under(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            db_file: data_dir.join(DB_FILE_NAME),
            image_dir: data_dir.join(IMAGE_DIR_NAME),
            log_file: data_dir.join(LOG_FILE_NAME),
            data_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_hangs_off_data_dir() {
        let paths = AppPaths::under("/tmp/kennel");
        assert_eq!(paths.db_file, Path::new("/tmp/kennel/probreedics.db"));
        assert_eq!(paths.image_dir, Path::new("/tmp/kennel/images"));
        assert_eq!(paths.log_file, Path::new("/tmp/kennel/probreedics.log"));
    }
}
