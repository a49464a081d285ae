use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::{copy_exact, ArchiveReader, CopyError};
use crate::{
    error::{Error, Result},
    header::{ArchiveHeader, HEADER_LEN},
    record::{Entry, ENTRY_HEADER_LEN},
    ser::{write_entry_header, Serialize},
};

/// Appends records to a container file.
///
/// Every record is written whole or not at all: a failed insert truncates
/// the file back to where the record started.
#[derive(Debug)]
pub struct ArchiveWriter {
    pub(crate) file: File,
    pub(crate) path: PathBuf,
    pub(crate) pos: u64,
    pub(crate) names: HashSet<String>,
}

#[inline(always)]
fn write_header(file: &mut File, header: &[u8]) -> std::io::Result<()> {
    file.seek(SeekFrom::Start(0))?;
    file.write_all(header)?;
    file.set_len(header.len() as u64)
}

impl ArchiveWriter {
    /// This will create a new archive for writing, and error if the file already exists.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<ArchiveWriter> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| Error::DestinationUnwritable {
                path: path.clone(),
                source,
            })?;

        ArchiveWriter::with_header(file, path)
    }

    /// This will open an existing archive for appending, and error if the archive is not valid.
    ///
    /// Every entry header is decoded first, so a corrupt archive is refused
    /// and later inserts can reject duplicate names.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<ArchiveWriter> {
        let path = path.as_ref().to_path_buf();
        let (len, names) = {
            let mut reader = ArchiveReader::open(&path)?;
            let listing = reader.list()?;
            let names = listing
                .iter()
                .map(|l| l.entry.name.clone())
                .collect::<HashSet<_>>();
            (reader.len(), names)
        };

        let mut file = OpenOptions::new()
            .write(true)
            .open(&path)
            .map_err(|source| Error::OpenArchive {
                path: path.clone(),
                source,
            })?;
        file.seek(SeekFrom::Start(len))?;

        Ok(ArchiveWriter {
            file,
            path,
            pos: len,
            names,
        })
    }

    pub(crate) fn with_header(mut file: File, path: PathBuf) -> Result<ArchiveWriter> {
        let mut header = Vec::with_capacity(HEADER_LEN as usize);
        ArchiveHeader::default().write(&mut header)?;

        write_header(&mut file, &header).map_err(|source| Error::DestinationUnwritable {
            path: path.clone(),
            source,
        })?;

        Ok(ArchiveWriter {
            file,
            path,
            pos: HEADER_LEN,
            names: HashSet::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Length of the container written so far.
    pub fn len(&self) -> u64 {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos <= HEADER_LEN
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Appends one record holding exactly `size` bytes taken from `value`.
    ///
    /// Fails with `UnreadableSource` if `value` errors or ends before `size`
    /// bytes. On any failure the partial record is removed again.
    pub fn insert<R: Read + ?Sized>(
        &mut self,
        name: &str,
        size: u64,
        value: &mut R,
    ) -> Result<Entry> {
        let entry = Entry::new(name, size)?;

        if self.names.contains(&entry.name) {
            return Err(Error::DuplicateName(entry.name));
        }

        self.append(&entry, value)?;
        Ok(entry)
    }

    /// Appends a record taken from another archive as it is, without the
    /// name checks of [`ArchiveWriter::insert`].
    pub(crate) fn copy_record<R: Read + ?Sized>(
        &mut self,
        entry: &Entry,
        value: &mut R,
    ) -> Result<()> {
        self.append(entry, value)
    }

    fn append<R: Read + ?Sized>(&mut self, entry: &Entry, value: &mut R) -> Result<()> {
        let start = self.pos;
        if let Err(e) = self.write_record(entry, value) {
            tracing::debug!(name = %entry.name, start, error = %e, "rolling back partial record");
            self.rollback(start)?;
            return Err(e);
        }

        self.pos = start + entry.record_len();
        self.names.insert(entry.name.clone());

        tracing::debug!(
            name = %entry.name,
            offset = format_args!("{:#x}", start),
            size = entry.size,
            "inserted record"
        );

        Ok(())
    }

    #[inline(always)]
    fn write_record<R: Read + ?Sized>(&mut self, entry: &Entry, value: &mut R) -> Result<()> {
        let mut header = Vec::with_capacity(ENTRY_HEADER_LEN as usize);
        write_entry_header(entry, &mut header)?;
        self.file.write_all(&header)?;

        match copy_exact(value, &mut self.file, entry.size) {
            Ok(_) => Ok(()),
            Err(CopyError::Read(source)) => Err(Error::UnreadableSource {
                name: entry.name.clone(),
                source,
            }),
            Err(CopyError::Write(e)) => Err(e.into()),
        }
    }

    /// Cuts the container back to `len` bytes and continues writing there.
    pub(crate) fn rollback(&mut self, len: u64) -> Result<()> {
        self.file.set_len(len)?;
        self.file.seek(SeekFrom::Start(len))?;
        self.pos = len;
        Ok(())
    }

    /// Flushes everything written to stable storage.
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Syncs the container and returns its final length.
    pub fn finish(mut self) -> Result<u64> {
        self.sync()?;
        Ok(self.pos)
    }
}

/// A scratch container next to the archive it will replace.
///
/// Dropping it without [`Staging::persist`] deletes the scratch file, leaving
/// the archive untouched.
pub(crate) struct Staging {
    tmp: NamedTempFile,
}

impl Staging {
    pub(crate) fn new(archive: &Path) -> std::io::Result<Staging> {
        let dir = match archive.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix(".pak-").suffix(".tmp");

        // Ask for the mode a plain file create would get; the umask applies.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }

        let tmp = builder.tempfile_in(dir)?;

        tracing::debug!(path = %tmp.path().display(), "created staging file");
        Ok(Staging { tmp })
    }

    /// A writer over the scratch file, starting with a fresh header.
    pub(crate) fn writer(&self) -> Result<ArchiveWriter> {
        let file = self.tmp.as_file().try_clone()?;
        ArchiveWriter::with_header(file, self.tmp.path().to_path_buf())
    }

    /// Renames the scratch file over `archive`, keeping the permissions of
    /// the archive it replaces.
    pub(crate) fn persist(self, archive: &Path) -> std::io::Result<()> {
        match std::fs::metadata(archive) {
            Ok(meta) => self.tmp.as_file().set_permissions(meta.permissions())?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        self.tmp.persist(archive).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn short_source_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.pak");

        let mut writer = ArchiveWriter::create(&path).unwrap();
        writer.insert("a", 3, &mut &b"abc"[..]).unwrap();
        let before = writer.len();

        let err = writer.insert("b", 10, &mut &b"ab"[..]).unwrap_err();
        assert!(matches!(err, Error::UnreadableSource { ref name, .. } if name == "b"));
        assert_eq!(err.kind(), ErrorKind::TargetNotFound);
        assert_eq!(writer.len(), before);
        assert!(!writer.contains("b"));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), before);

        writer.insert("c", 1, &mut &b"c"[..]).unwrap();
        writer.finish().unwrap();

        let listing = ArchiveReader::open(&path).unwrap().list().unwrap();
        let names = listing
            .iter()
            .map(|l| l.entry.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn insert_rejects_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.pak");

        let mut writer = ArchiveWriter::create(&path).unwrap();
        writer.insert("a", 0, &mut &b""[..]).unwrap();
        let before = writer.len();

        let err = writer.insert("a", 1, &mut &b"x"[..]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateName);
        assert_eq!(writer.len(), before);
    }

    #[test]
    fn copy_record_keeps_foreign_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.pak");

        let mut writer = ArchiveWriter::create(&path).unwrap();
        for name in &["same", "same", "a/b"] {
            let entry = Entry {
                name: name.to_string(),
                size: 1,
            };
            writer.copy_record(&entry, &mut &b"x"[..]).unwrap();
        }
        writer.finish().unwrap();

        let listing = ArchiveReader::open(&path).unwrap().list().unwrap();
        assert_eq!(listing.file_count(), 3);
        assert_eq!(listing.entries()[2].entry.name, "a/b");
    }

    #[cfg(unix)]
    #[test]
    fn persist_keeps_archive_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.pak");
        std::fs::write(&path, b"old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        let staging = Staging::new(&path).unwrap();
        staging.writer().unwrap().finish().unwrap();
        staging.persist(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), HEADER_LEN);
    }
}
