//! File operations module
//! Provides move, atomic write and open-external operations

use crate::{FsError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Move `source` into `target_dir`, optionally under a new file name.
///
/// The target directory is created if missing. An existing file at the
/// destination is never overwritten.
pub fn move_into(source: &Path, target_dir: &Path, new_name: Option<&str>) -> Result<PathBuf> {
    if !source.is_file() {
        return Err(FsError::NotFound(source.display().to_string()));
    }

    let file_name = match new_name {
        Some(name) => name.to_string(),
        None => source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| FsError::InvalidPath(source.display().to_string()))?,
    };

    if file_name.is_empty() || file_name.contains(['/', '\\']) {
        return Err(FsError::InvalidPath(file_name));
    }

    fs::create_dir_all(target_dir)?;
    let dest = target_dir.join(&file_name);

    if dest.exists() {
        return Err(FsError::AlreadyExists(dest.display().to_string()));
    }

    fs::rename(source, &dest)?;
    tracing::debug!("Moved {:?} -> {:?}", source, dest);

    Ok(dest)
}

/// Write `contents` to `path` through a sibling temp file and a rename,
/// so readers never observe a half-written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| FsError::InvalidPath(path.display().to_string()))?;

    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}

/// Open a file with the system default application
#[cfg(feature = "open-external")]
pub fn open_external(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(FsError::NotFound(path.display().to_string()));
    }

    open::that_detached(path).map_err(|e| FsError::OpenFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    tracing::info!("Opened {:?} with default application", path);
    Ok(())
}

#[cfg(not(feature = "open-external"))]
pub fn open_external(path: &Path) -> Result<()> {
    Err(FsError::OpenFailed {
        path: path.display().to_string(),
        reason: "open-external feature not enabled".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_into_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.png");
        fs::write(&source, b"png").unwrap();

        let dest = move_into(&source, &dir.path().join("tagged"), None).unwrap();
        assert_eq!(dest, dir.path().join("tagged").join("a.png"));
        assert!(!source.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"png");
    }

    #[test]
    fn test_move_into_renames() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.png");
        fs::write(&source, b"png").unwrap();

        let dest = move_into(&source, dir.path(), Some("b.png")).unwrap();
        assert_eq!(dest.file_name().unwrap(), "b.png");
    }

    #[test]
    fn test_move_into_never_clobbers() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("tagged");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("a.png"), b"old").unwrap();
        let source = dir.path().join("a.png");
        fs::write(&source, b"new").unwrap();

        let result = move_into(&source, &target, None);
        assert!(matches!(result, Err(FsError::AlreadyExists(_))));
        assert!(source.exists());
        assert_eq!(fs::read(target.join("a.png")).unwrap(), b"old");
    }

    #[test]
    fn test_move_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = move_into(&dir.path().join("gone.png"), dir.path(), None);
        assert!(matches!(result, Err(FsError::NotFound(_))));
    }

    #[test]
    fn test_write_atomic_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.json");
        write_atomic(&path, b"[1]").unwrap();
        write_atomic(&path, b"[1,2]").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"[1,2]");
        assert!(!dir.path().join("tags.json.tmp").exists());
    }
}
