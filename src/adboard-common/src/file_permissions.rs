//! Owner-only file helpers for credential files.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// Set restrictive permissions (0600 on Unix).
pub fn set_owner_only(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }

    Ok(())
}

/// Write `contents` to `path`, creating the file owner-only (0600 on Unix).
///
/// Existing files are truncated and re-restricted, so a file created with a
/// looser mode is tightened on the next write.
pub fn write_owner_only(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.flush()?;
    set_owner_only(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_owner_only_roundtrip() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("secret.json");
        write_owner_only(&path, b"{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
