use std::io::{ErrorKind, Read, Write};

mod meta;
mod reader;
mod writer;

pub use self::meta::{BulkStats, Listing, Skipped};
pub use self::reader::{ArchiveReader, Entries};
pub use self::writer::ArchiveWriter;
pub(crate) use self::writer::Staging;

/// Payload bytes move between streams in chunks of this size.
pub(crate) const CHUNK_SIZE: usize = 64 * 1024;

/// Which side of a payload copy failed.
#[derive(Debug)]
pub(crate) enum CopyError {
    Read(std::io::Error),
    Write(std::io::Error),
}

/// Copies exactly `len` bytes from `reader` to `writer`.
///
/// A reader that runs dry before `len` bytes is a read failure
/// (`UnexpectedEof`); bytes past `len` are never read.
pub(crate) fn copy_exact<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    len: u64,
) -> Result<u64, CopyError> {
    let mut buf = vec![0u8; CHUNK_SIZE.min(len as usize)];
    let mut remaining = len;

    while remaining > 0 {
        let want = (remaining as usize).min(buf.len());
        let n = match reader.read(&mut buf[..want]) {
            Ok(0) => {
                return Err(CopyError::Read(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!("source ended {} bytes early", remaining),
                )))
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
        remaining -= n as u64;
    }

    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_exactly_len() {
        let src = vec![7u8; CHUNK_SIZE * 2 + 13];
        let mut out = vec![];
        let n = copy_exact(&mut &src[..], &mut out, CHUNK_SIZE as u64 + 5).unwrap();
        assert_eq!(n, CHUNK_SIZE as u64 + 5);
        assert_eq!(out.len(), CHUNK_SIZE + 5);
    }

    #[test]
    fn zero_len_reads_nothing() {
        let mut out = vec![];
        assert_eq!(copy_exact(&mut &b"abc"[..], &mut out, 0).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn short_source_is_a_read_error() {
        let mut out = vec![];
        match copy_exact(&mut &b"abc"[..], &mut out, 10) {
            Err(CopyError::Read(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn failing_sink_is_a_write_error() {
        let mut sink: &mut [u8] = &mut [0u8; 2];
        match copy_exact(&mut &b"abc"[..], &mut sink, 3) {
            Err(CopyError::Write(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
