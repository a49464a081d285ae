//! One function per archiver command.
//!
//! Each call owns the archive for its whole duration. Running two of them
//! against the same archive path at once, from one process or several, is
//! undefined.

use std::fs::File;
use std::path::Path;

use crate::error::{Error, Result};
use crate::file::{ArchiveReader, ArchiveWriter, BulkStats, Listing, Staging};
use crate::fs::{scan_dir, SourceFile};
use crate::record::{validate_name, Entry};

/// Packs every regular file directly inside `source` into a new archive at
/// `archive`, replacing any archive already there.
///
/// The container is built in a scratch file beside `archive` and renamed
/// into place only once complete. Files that cannot be read are skipped and
/// reported in the returned stats.
pub fn pack<P: AsRef<Path>, Q: AsRef<Path>>(archive: P, source: Q) -> Result<BulkStats> {
    let archive = archive.as_ref();
    let source = source.as_ref();
    let unwritable = |source| Error::DestinationUnwritable {
        path: archive.to_path_buf(),
        source,
    };

    let scan = scan_dir(source)?;
    let own_path = std::fs::canonicalize(archive).ok();

    let staging = Staging::new(archive).map_err(unwritable)?;
    let mut writer = staging.writer()?;
    let mut stats = BulkStats {
        skipped: scan.skipped,
        ..BulkStats::default()
    };

    for file in &scan.files {
        if own_path.is_some() && std::fs::canonicalize(&file.path).ok() == own_path {
            tracing::debug!(path = %file.path.display(), "not packing the archive into itself");
            continue;
        }

        match pack_file(&mut writer, file, &mut stats) {
            Err(Error::Io(e)) => return Err(unwritable(e)),
            other => other?,
        }
    }

    writer.finish().map_err(|e| match e {
        Error::Io(e) => unwritable(e),
        e => e,
    })?;
    staging.persist(archive).map_err(unwritable)?;

    tracing::info!(
        archive = %archive.display(),
        source = %source.display(),
        files = stats.files,
        bytes = stats.bytes,
        skipped = stats.skipped.len(),
        "packed archive"
    );

    Ok(stats)
}

/// Appends one scanned file, recording it in `stats` as packed or skipped.
///
/// Only failures of the container itself are returned.
fn pack_file(writer: &mut ArchiveWriter, file: &SourceFile, stats: &mut BulkStats) -> Result<()> {
    let mut value = match File::open(&file.path) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = %file.path.display(), error = %e, "skipping unreadable file");
            stats.skip(file.path.display().to_string(), e);
            return Ok(());
        }
    };

    let size = match value.metadata() {
        Ok(meta) => meta.len(),
        Err(e) => {
            tracing::warn!(path = %file.path.display(), error = %e, "skipping unreadable file");
            stats.skip(file.path.display().to_string(), e);
            return Ok(());
        }
    };

    match writer.insert(&file.name, size, &mut value) {
        Ok(entry) => {
            stats.files += 1;
            stats.bytes += entry.size;
            Ok(())
        }
        Err(e @ Error::UnreadableSource { .. }) => {
            tracing::warn!(path = %file.path.display(), error = %e, "skipping unreadable file");
            stats.skip(file.path.display().to_string(), e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Extracts every entry of `archive` into `dest`, creating `dest` if needed.
pub fn unpack<P: AsRef<Path>, Q: AsRef<Path>>(archive: P, dest: Q) -> Result<BulkStats> {
    ArchiveReader::open(archive)?.extract_all(dest)
}

/// Appends the file at `target` to `archive` under its base name, creating
/// the archive if it does not exist yet.
///
/// Existing records are neither read past their headers nor rewritten. If
/// anything fails after the archive was touched, it is cut back to its prior
/// length (or removed, if this call created it) and `Unmodified` is returned.
pub fn add<P: AsRef<Path>, Q: AsRef<Path>>(archive: P, target: Q) -> Result<Entry> {
    let archive = archive.as_ref();
    let target = target.as_ref();

    let name = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidName(target.display().to_string()))?;
    validate_name(name)?;

    let existing = match ArchiveWriter::open(archive) {
        Ok(writer) => Some(writer),
        Err(e) if e.is_missing_archive() => None,
        Err(e) => return Err(e),
    };

    if let Some(writer) = &existing {
        if writer.contains(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
    }

    if existing.is_some() {
        let same = match (std::fs::canonicalize(archive), std::fs::canonicalize(target)) {
            (Ok(a), Ok(t)) => a == t,
            _ => false,
        };
        if same {
            tracing::warn!(archive = %archive.display(), "refusing to add the archive to itself");
            return Err(Error::InvalidName(name.to_string()));
        }
    }

    let not_found = |source| Error::TargetNotFound {
        path: target.to_path_buf(),
        source,
    };
    let mut value = File::open(target).map_err(not_found)?;
    let meta = value.metadata().map_err(not_found)?;
    if !meta.is_file() {
        return Err(not_found(std::io::Error::new(
            std::io::ErrorKind::Other,
            "not a regular file",
        )));
    }

    let created = existing.is_none();
    let mut writer = match existing {
        Some(writer) => writer,
        None => ArchiveWriter::create(archive)?,
    };
    let start = writer.len();

    let outcome = writer
        .insert(name, meta.len(), &mut value)
        .and_then(|entry| writer.sync().map(|_| entry));

    match outcome {
        Ok(entry) => {
            tracing::info!(
                archive = %archive.display(),
                name = %entry.name,
                size = entry.size,
                "added file"
            );
            Ok(entry)
        }
        Err(e) => {
            let restored = if created {
                drop(writer);
                std::fs::remove_file(archive)
            } else {
                writer.rollback(start).map_err(into_io)
            };

            if let Err(rollback) = restored {
                tracing::error!(archive = %archive.display(), error = %rollback, "could not restore archive");
                return Err(e);
            }

            Err(Error::unmodified(archive, e))
        }
    }
}

/// Removes the entry called `name` from `archive`.
///
/// Every other record is streamed, in order and unchanged, into a scratch
/// file that is then renamed over the archive; until the rename the original
/// is untouched. Only the first record called `name` is removed.
pub fn delete<P: AsRef<Path>>(archive: P, name: &str) -> Result<Entry> {
    let archive = archive.as_ref();
    let mut reader = ArchiveReader::open(archive)?;
    let listing = reader.list()?;

    let target = listing
        .iter()
        .position(|l| l.entry.name == name)
        .ok_or_else(|| Error::NameNotFound(name.to_string()))?;

    let rewrite = |reader: &mut ArchiveReader| -> Result<()> {
        let staging = Staging::new(archive)?;
        let mut writer = staging.writer()?;

        for (i, loc) in listing.iter().enumerate() {
            if i == target {
                continue;
            }
            let mut payload = reader.payload(loc)?;
            writer.copy_record(&loc.entry, &mut payload)?;
        }

        writer.finish()?;
        staging.persist(archive)?;
        Ok(())
    };

    rewrite(&mut reader).map_err(|e| Error::unmodified(archive, e))?;

    let removed = listing.entries[target].entry.clone();
    tracing::info!(
        archive = %archive.display(),
        name = %removed.name,
        size = removed.size,
        "deleted file"
    );
    Ok(removed)
}

/// Decodes every entry of `archive`, seeking over payloads.
pub fn list<P: AsRef<Path>>(archive: P) -> Result<Listing> {
    ArchiveReader::open(archive)?.list()
}

/// Like [`list`], and additionally refuses duplicate or unsafe entry names.
pub fn verify<P: AsRef<Path>>(archive: P) -> Result<Listing> {
    ArchiveReader::open(archive)?.verify()
}

fn into_io(e: Error) -> std::io::Error {
    match e {
        Error::Io(e) => e,
        e => std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HEADER_LEN;

    #[test]
    fn vanished_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir(&src).unwrap();
        std::fs::write(src.join("gone"), b"abc").unwrap();
        std::fs::write(src.join("kept"), b"xy").unwrap();

        let scan = scan_dir(&src).unwrap();
        std::fs::remove_file(src.join("gone")).unwrap();

        let mut writer = ArchiveWriter::create(dir.path().join("test.pak")).unwrap();
        let mut stats = BulkStats::default();
        for file in &scan.files {
            pack_file(&mut writer, file, &mut stats).unwrap();
        }

        assert_eq!(stats.files, 1);
        assert_eq!(stats.bytes, 2);
        assert_eq!(stats.skipped.len(), 1);
        assert!(stats.skipped[0].name.ends_with("gone"));
        assert!(writer.contains("kept"));
        assert!(!writer.contains("gone"));
        assert_eq!(writer.len(), HEADER_LEN + crate::record::ENTRY_HEADER_LEN + 2);
    }
}
