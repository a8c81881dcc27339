//! Atomic file replacement.
//!
//! Writes go to a uniquely named temporary file in the target's directory,
//! are synced, then renamed over the target. A reader sees either the old
//! record or the new one, never a torn write.
//!
//! Source and destination must share a filesystem. After a crash a
//! `.{filename}.{suffix}.tmp` file may remain; the store ignores it.

use crate::error::{LockingError, Result};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Atomically write bytes to a file, creating parent directories as needed.
///
/// # Errors
///
/// `LockingError::Storage` on any create, write, sync or rename failure.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            LockingError::Storage(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;
    replace(&temp_path, path)
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Remove a file, reporting whether it existed.
pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(LockingError::Storage(format!(
            "failed to remove '{}': {}",
            path.display(),
            e
        ))),
    }
}

/// Temp path next to the target. The random suffix keeps concurrent writers
/// to the same target from sharing a temp file.
fn generate_temp_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            LockingError::Storage(format!("invalid file path '{}'", target.display()))
        })?;

    let suffix = Uuid::new_v4().simple().to_string();
    Ok(parent.join(format!(".{}.{}.tmp", filename, &suffix[..8])))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        LockingError::Storage(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let written = file.write_all(content).and_then(|()| file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(path);
        return Err(LockingError::Storage(format!(
            "failed to write temporary file '{}': {}",
            path.display(),
            e
        )));
    }

    Ok(())
}

fn replace(source: &Path, target: &Path) -> Result<()> {
    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        LockingError::Storage(format!(
            "failed to atomically replace '{}': {}",
            target.display(),
            e
        ))
    })?;

    // Persist the directory entry too.
    #[cfg(unix)]
    {
        if let Some(parent) = target.parent()
            && let Ok(dir) = File::open(parent)
        {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn leftover_temp_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count()
    }

    #[test]
    fn test_atomic_write_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("post~1.lock");

        atomic_write(&file_path, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");
        assert_eq!(leftover_temp_files(temp_dir.path()), 0);
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("post~1.lock");
        fs::write(&file_path, "old record").unwrap();

        atomic_write_file(&file_path, "new record").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new record");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("locks").join("nested").join("a.lock");

        atomic_write(&file_path, b"nested").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "nested");
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let target = Path::new("/some/locks/post~1.lock");
        let temp = generate_temp_path(target).unwrap();
        let name = temp.file_name().unwrap().to_str().unwrap();

        assert_eq!(temp.parent().unwrap(), Path::new("/some/locks"));
        assert!(name.starts_with(".post~1.lock."));
        assert!(name.ends_with(".tmp"));
        assert_ne!(temp, generate_temp_path(target).unwrap());
    }

    #[test]
    fn test_concurrent_writers_to_same_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("shared.lock");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = file_path.clone();
                std::thread::spawn(move || {
                    atomic_write_file(&path, &format!("writer {}", i)).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(&file_path).unwrap();
        assert!(content.starts_with("writer "));
        assert_eq!(leftover_temp_files(temp_dir.path()), 0);
    }

    #[test]
    fn test_remove_if_exists() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("gone.lock");
        fs::write(&file_path, "x").unwrap();

        assert!(remove_if_exists(&file_path).unwrap());
        assert!(!remove_if_exists(&file_path).unwrap());
    }
}
