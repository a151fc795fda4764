//! File writes that never leave a half-written target behind.

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tempfile::NamedTempFile;

/// Atomically write `content` to `path` using a tempfile in the same directory.
///
/// Parent directories are created as needed. A crash before the rename
/// leaves only a stray temp file; the target is either old or new, never partial.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, content: C) -> std::io::Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_ref())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Hand `path` to `uid:gid`, logging instead of failing.
///
/// Returns whether ownership was changed.
pub fn chown_best_effort(path: &Path, uid: u32, gid: u32) -> bool {
    match std::os::unix::fs::chown(path, Some(uid), Some(gid)) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                "could not chown {} to {uid}:{gid}: {e} (continuing)",
                path.display()
            );
            false
        }
    }
}

/// True if `path` is a regular file with any execute bit set.
///
/// Missing files, directories and unreadable metadata all count as false.
pub fn is_executable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/marker");
        atomic_write(&path, "data").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "data");
    }

    #[test]
    fn test_atomic_write_replaces_wholesale() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file");
        atomic_write(&path, "a much longer original line").unwrap();
        atomic_write(&path, "short").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "short");
        // no temp files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_is_executable() {
        let dir = TempDir::new().unwrap();
        let plain = dir.path().join("plain");
        fs::write(&plain, "x").unwrap();
        assert!(!is_executable(&plain));
        assert!(!is_executable(dir.path()));
        assert!(!is_executable(&dir.path().join("missing")));
    }
}
