//! Shared helpers for locating the directory database.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// File name of the directory database.
pub const DATABASE_FILE: &str = "cuny_civic_network.db";

/// Gets the cross-platform default database path.
///
/// Returns the path as `{data_dir}/civic/cuny_civic_network.db` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn get_database_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("civic").join(DATABASE_FILE))
}

/// Resolves the database path from an explicit value, `CIVIC_DB`, or the default.
///
/// # Errors
///
/// Returns an error only when falling back to the default path fails.
pub fn resolve_database_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var("CIVIC_DB")
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path.trim()));
    }

    get_database_path()
}

/// Ensures the parent directory of the database file exists.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn get_database_path_returns_valid_path() {
        let path = get_database_path().unwrap();
        assert!(path.to_string_lossy().contains("civic"));
        assert!(path.ends_with(DATABASE_FILE));
    }

    #[test]
    #[serial]
    fn explicit_path_wins_over_environment() {
        unsafe {
            std::env::set_var("CIVIC_DB", "/tmp/from-env.db");
        }

        let path = resolve_database_path(Some(Path::new("/tmp/explicit.db"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/explicit.db"));

        let path = resolve_database_path(None).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/from-env.db"));

        unsafe {
            std::env::remove_var("CIVIC_DB");
        }
    }

    #[test]
    fn ensure_database_directory_creates_parents() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("deeper").join(DATABASE_FILE);

        ensure_database_directory(&db_path).unwrap();

        assert!(db_path.parent().unwrap().is_dir());
    }

    #[test]
    fn ensure_database_directory_accepts_bare_file_name() {
        assert!(ensure_database_directory(Path::new(DATABASE_FILE)).is_ok());
    }
}
