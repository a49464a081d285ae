use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::{copy_exact, BulkStats, CopyError, Listing};
use crate::{
    de::{decode_entry, DeserializeOwned},
    error::{CorruptRecord, Error, Result},
    header::{ArchiveHeader, HEADER_LEN},
    record::{is_valid_name, EntryLocation},
};

/// Sequential reader over a container file.
///
/// The file length is taken once at open; every entry is checked against it
/// so a truncated container is reported instead of read past.
#[derive(Debug)]
pub struct ArchiveReader {
    pub(crate) file: BufReader<File>,
    pub(crate) path: PathBuf,
    pub(crate) header: ArchiveHeader,
    pub(crate) len: u64,
}

#[inline(always)]
fn read_header<R: Read + Seek>(file: &mut R) -> Result<ArchiveHeader> {
    file.seek(SeekFrom::Start(0))?;
    ArchiveHeader::deserialize_owned(file)
}

impl ArchiveReader {
    /// This will open an existing archive for reading, and error if it does not start
    /// with a valid header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<ArchiveReader> {
        let path = path.as_ref().to_path_buf();
        let open_error = |source| Error::OpenArchive {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(open_error)?;
        let len = file.metadata().map_err(open_error)?.len();
        let mut file = BufReader::new(file);
        let header = read_header(&mut file).map_err(|e| e.at(&path, 0))?;

        tracing::debug!(path = %path.display(), len, "opened archive");

        Ok(ArchiveReader {
            file,
            path,
            header,
            len,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Length of the container file in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the container holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.len <= HEADER_LEN
    }

    pub fn version(&self) -> u8 {
        self.header.version
    }

    /// Decodes the entry header at `offset`.
    ///
    /// Returns `Ok(None)` at the end of the container and `CorruptArchive`
    /// if the header is cut short or its payload runs past the end of the file.
    pub fn read_entry_at(&mut self, offset: u64) -> Result<Option<EntryLocation>> {
        self.file.seek(SeekFrom::Start(offset))?;
        let entry = match decode_entry(&mut self.file).map_err(|e| e.at(&self.path, offset))? {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let loc = EntryLocation { entry, offset };
        let remaining = self.len.saturating_sub(loc.data());
        if loc.entry.size > remaining {
            return Err(Error::CorruptArchive {
                path: self.path.clone(),
                offset,
                source: CorruptRecord::TruncatedPayload {
                    name: loc.entry.name,
                    size: loc.entry.size,
                    remaining,
                },
            });
        }

        Ok(Some(loc))
    }

    /// Lazily decodes every entry in physical order, skipping payloads.
    ///
    /// Calling this again restarts the scan from the first record.
    pub fn entries(&mut self) -> Entries<'_> {
        Entries {
            reader: self,
            next: Some(HEADER_LEN),
        }
    }

    /// Positions the reader at the payload of `loc` and returns a reader
    /// limited to exactly its bytes.
    pub fn payload(&mut self, loc: &EntryLocation) -> Result<impl Read + '_> {
        self.file.seek(SeekFrom::Start(loc.data()))?;
        Ok((&mut self.file).take(loc.entry.size))
    }

    /// Decodes every entry header without loading any payload.
    pub fn list(&mut self) -> Result<Listing> {
        let entries = self.entries().collect::<Result<Vec<_>>>()?;
        Ok(Listing { entries })
    }

    /// Like [`ArchiveReader::list`], but also refuses archives holding a name twice
    /// or a name that is not a plain file name.
    pub fn verify(&mut self) -> Result<Listing> {
        let listing = self.list()?;

        {
            let mut seen = HashSet::with_capacity(listing.file_count());
            for loc in &listing {
                let name = &loc.entry.name;
                let problem = if !is_valid_name(name) {
                    Some(CorruptRecord::UnsafeName(name.clone()))
                } else if !seen.insert(name.as_str()) {
                    Some(CorruptRecord::DuplicateName(name.clone()))
                } else {
                    None
                };

                if let Some(source) = problem {
                    return Err(Error::CorruptArchive {
                        path: self.path.clone(),
                        offset: loc.offset,
                        source,
                    });
                }
            }
        }

        Ok(listing)
    }

    /// Writes every entry into `dest` as a file of the same name, creating `dest`
    /// if needed.
    ///
    /// Entries whose output file cannot be created or written are skipped and
    /// reported; corruption and archive read failures abort.
    pub fn extract_all<P: AsRef<Path>>(&mut self, dest: P) -> Result<BulkStats> {
        let dest = dest.as_ref();
        std::fs::create_dir_all(dest).map_err(|source| Error::DestinationUnwritable {
            path: dest.to_path_buf(),
            source,
        })?;

        let mut stats = BulkStats::default();
        let mut pos = HEADER_LEN;

        while let Some(loc) = self.read_entry_at(pos)? {
            pos = loc.end();
            let name = &loc.entry.name;

            if !is_valid_name(name) {
                tracing::warn!(%name, "skipping entry that is not a plain file name");
                stats.skip(name.as_str(), CorruptRecord::UnsafeName(name.clone()));
                continue;
            }

            let out_path = dest.join(name);
            let mut out = match File::create(&out_path) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(path = %out_path.display(), error = %e, "skipping entry");
                    stats.skip(name.as_str(), e);
                    continue;
                }
            };

            let size = loc.entry.size;
            let copied = {
                let mut payload = self.payload(&loc)?;
                copy_exact(&mut payload, &mut out, size)
            };
            drop(out);

            match copied {
                Ok(n) => {
                    tracing::debug!(%name, bytes = n, "extracted");
                    stats.files += 1;
                    stats.bytes += n;
                }
                Err(CopyError::Write(e)) => {
                    tracing::warn!(path = %out_path.display(), error = %e, "skipping entry");
                    let _ = std::fs::remove_file(&out_path);
                    stats.skip(name.as_str(), e);
                }
                Err(CopyError::Read(e)) => {
                    let _ = std::fs::remove_file(&out_path);
                    return Err(e.into());
                }
            }
        }

        tracing::info!(
            archive = %self.path.display(),
            dest = %dest.display(),
            files = stats.files,
            bytes = stats.bytes,
            skipped = stats.skipped.len(),
            "unpacked archive"
        );

        Ok(stats)
    }
}

/// Iterator returned by [`ArchiveReader::entries`]. Stops after the first error.
pub struct Entries<'a> {
    reader: &'a mut ArchiveReader,
    next: Option<u64>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<EntryLocation>;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.next.take()?;
        match self.reader.read_entry_at(pos) {
            Ok(Some(loc)) => {
                self.next = Some(loc.end());
                Some(Ok(loc))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
