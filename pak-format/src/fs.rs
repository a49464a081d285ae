//! Filesystem utilities for collecting the regular files of a source directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::file::Skipped;
use crate::record::validate_name;

/// A regular file found directly inside a scanned directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct Scan {
    pub files: Vec<SourceFile>,
    pub skipped: Vec<Skipped>,
}

/// Lists the regular files directly inside `dir`, in the order the platform yields them.
///
/// Directories, symlinks and other special files are passed over silently.
/// Files that cannot be stored (non-UTF-8 or overlong names) or whose
/// entries cannot be read are reported in [`Scan::skipped`].
pub fn scan_dir<P: AsRef<Path>>(dir: P) -> Result<Scan> {
    let dir = dir.as_ref();
    let not_found = |source| Error::SourceNotFound {
        path: dir.to_path_buf(),
        source,
    };

    let meta = std::fs::metadata(dir).map_err(not_found)?;
    if !meta.is_dir() {
        return Err(not_found(std::io::Error::new(
            std::io::ErrorKind::Other,
            "not a directory",
        )));
    }

    let mut scan = Scan::default();

    for item in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match item {
            Ok(v) => v,
            Err(e) if e.depth() == 0 => return Err(not_found(e.into())),
            Err(e) => {
                let name = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| dir.display().to_string());
                tracing::warn!(path = %name, error = %e, "skipping unreadable directory entry");
                scan.skipped.push(Skipped {
                    name,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            tracing::debug!(path = %entry.path().display(), "skipping non-regular file");
            continue;
        }

        let name = match entry.file_name().to_str() {
            Some(v) => v.to_string(),
            None => {
                tracing::warn!(path = %entry.path().display(), "skipping non-unicode file name");
                scan.skipped.push(Skipped {
                    name: entry.path().display().to_string(),
                    reason: "file name is not valid UTF-8".into(),
                });
                continue;
            }
        };

        if let Err(e) = validate_name(&name) {
            tracing::warn!(path = %entry.path().display(), error = %e, "skipping file");
            scan.skipped.push(Skipped {
                name: entry.path().display().to_string(),
                reason: e.to_string(),
            });
            continue;
        }

        scan.files.push(SourceFile {
            path: entry.into_path(),
            name,
        });
    }

    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn regular_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"abc").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.txt"), b"deep").unwrap();

        let scan = scan_dir(dir.path()).unwrap();
        let mut names = scan.files.iter().map(|f| f.name.as_str()).collect::<Vec<_>>();
        names.sort_unstable();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert!(scan.skipped.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_passed_over() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("real"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let scan = scan_dir(dir.path()).unwrap();
        assert_eq!(scan.files.len(), 1);
        assert_eq!(scan.files[0].name, "real");
    }

    #[test]
    fn missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_dir(dir.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceNotFound);
    }

    #[test]
    fn file_is_not_a_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, b"x").unwrap();
        let err = scan_dir(&file).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceNotFound);
    }
}
