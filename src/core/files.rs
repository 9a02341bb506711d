//! core::files
//!
//! Small filesystem helpers shared by the account store and the certificate
//! writer.
//!
//! # Invariants
//!
//! - Private material (keys, account records) is created with mode 0600
//!   before any content is written
//! - Whole-file rewrites are atomic (temp file + rename)
//! - `unique_file` never overwrites an existing file

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};

/// Mode for private keys and account records.
pub const PRIVATE_MODE: u32 = 0o600;

/// Mode for certificates and chains.
pub const PUBLIC_MODE: u32 = 0o644;

/// Mode for directories holding private material.
pub const PRIVATE_DIR_MODE: u32 = 0o700;

/// Create `dir` (and parents) with `mode`, or verify an existing one.
///
/// An existing directory whose permissions differ from `mode` is tightened to
/// `mode`.
pub fn make_or_verify_dir(dir: &Path, mode: u32) -> io::Result<()> {
    if dir.is_dir() {
        #[cfg(unix)]
        {
            let current = fs::metadata(dir)?.permissions().mode() & 0o777;
            if current != mode {
                fs::set_permissions(dir, fs::Permissions::from_mode(mode))?;
            }
        }
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(mode);
    builder.create(dir)
}

/// Open `path` for writing with `mode`, failing if it already exists.
fn create_new(path: &Path, mode: u32) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path)
}

/// Create a fresh file next to `template`, named `NNNN_<file name>`.
///
/// The counter starts at 0000 and increases until a free name is found.
/// Returns the open file and its path.
pub fn unique_file(template: &Path, mode: u32) -> io::Result<(File, PathBuf)> {
    let dir = template.parent().unwrap_or_else(|| Path::new("."));
    let name = template
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "template has no file name"))?;

    for count in 0u32.. {
        let candidate = dir.join(format!("{:04}_{}", count, name));
        match create_new(&candidate, mode) {
            Ok(file) => return Ok((file, candidate)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "no free file name left",
    ))
}

/// Write `contents` to a fresh unique file next to `template`.
pub fn write_unique(template: &Path, contents: &[u8], mode: u32) -> io::Result<PathBuf> {
    let (mut file, path) = unique_file(template, mode)?;
    file.write_all(contents)?;
    file.sync_all()?;
    Ok(path)
}

/// Replace `path` atomically with `contents`, created with `mode`.
pub fn write_atomic(path: &Path, contents: &[u8], mode: u32) -> io::Result<()> {
    let temp_path = path.with_extension("tmp");
    {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(mode);
        let mut file = options.open(&temp_path)?;

        // Tighten before writing in case the temp file already existed
        #[cfg(unix)]
        file.set_permissions(fs::Permissions::from_mode(mode))?;

        file.write_all(contents)?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn unique_file_counts_up() {
        let temp = TempDir::new().unwrap();
        let template = temp.path().join("cert.pem");

        let first = write_unique(&template, b"one", PUBLIC_MODE).unwrap();
        let second = write_unique(&template, b"two", PUBLIC_MODE).unwrap();

        assert_eq!(first, temp.path().join("0000_cert.pem"));
        assert_eq!(second, temp.path().join("0001_cert.pem"));
        assert_eq!(fs::read_to_string(&first).unwrap(), "one");
        assert_eq!(fs::read_to_string(&second).unwrap(), "two");
    }

    #[test]
    fn write_atomic_replaces_contents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("record.json");

        write_atomic(&path, b"old", PRIVATE_MODE).unwrap();
        write_atomic(&path, b"new", PRIVATE_MODE).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!path.with_extension("tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn private_files_are_owner_only() {
        let temp = TempDir::new().unwrap();
        let key = write_unique(&temp.path().join("key.pem"), b"k", PRIVATE_MODE).unwrap();
        let mode = fs::metadata(&key).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn make_or_verify_dir_tightens_permissions() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("accounts");
        fs::create_dir(&dir).unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

        make_or_verify_dir(&dir, PRIVATE_DIR_MODE).unwrap();
        let mode = fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
    }

    #[test]
    fn make_or_verify_dir_creates_parents() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("a/b/c");
        make_or_verify_dir(&dir, PRIVATE_DIR_MODE).unwrap();
        assert!(dir.is_dir());
    }
}
