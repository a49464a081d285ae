use std::io::{ErrorKind, Read};

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{CorruptRecord, Result};
use crate::header::{ArchiveHeader, HEADER_LEN, MAGIC_BYTES, VERSION};
use crate::record::{Entry, ENTRY_HEADER_LEN, MAX_ENTRY_SIZE, NAME_FIELD_LEN};

pub(crate) trait DeserializeOwned {
    fn deserialize_owned<R: Read>(reader: &mut R) -> Result<Self>
    where
        Self: Sized;
}

/// Reads until `buf` is full or the reader is exhausted, returning the byte count.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl DeserializeOwned for ArchiveHeader {
    fn deserialize_owned<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; HEADER_LEN as usize];
        let found = read_full(reader, &mut buf)?;
        if found < buf.len() {
            return Err(CorruptRecord::MissingHeader {
                expected: buf.len(),
                found,
            }
            .into());
        }

        if &buf[..4] != MAGIC_BYTES {
            return Err(CorruptRecord::BadMagic.into());
        }

        let version = buf[4];
        if version != VERSION {
            return Err(CorruptRecord::UnsupportedVersion(version).into());
        }

        if buf[5..].iter().any(|b| *b != 0) {
            return Err(CorruptRecord::BadReserved.into());
        }

        tracing::debug!(version, "deserialized ArchiveHeader");

        Ok(ArchiveHeader {
            magic_bytes: *MAGIC_BYTES,
            version,
        })
    }
}

fn parse_name(field: &[u8]) -> std::result::Result<String, CorruptRecord> {
    let end = field
        .iter()
        .position(|b| *b == 0)
        .ok_or(CorruptRecord::UnterminatedName)?;

    if field[end..].iter().any(|b| *b != 0) {
        return Err(CorruptRecord::BadPadding);
    }

    if end == 0 {
        return Err(CorruptRecord::EmptyName);
    }

    String::from_utf8(field[..end].to_vec()).map_err(|_| CorruptRecord::NonUtf8Name)
}

/// Decodes the next entry header.
///
/// Returns `Ok(None)` when the reader is exactly at its end, and a
/// [`CorruptRecord`] error when only part of a header remains. The payload
/// is left unread; the caller copies or skips exactly `size` bytes.
pub fn decode_entry<R: Read>(reader: &mut R) -> Result<Option<Entry>> {
    let mut buf = [0u8; ENTRY_HEADER_LEN as usize];
    let found = read_full(reader, &mut buf)?;

    if found == 0 {
        return Ok(None);
    }

    if found < buf.len() {
        return Err(CorruptRecord::TruncatedHeader {
            expected: buf.len(),
            found,
        }
        .into());
    }

    let name = parse_name(&buf[..NAME_FIELD_LEN])?;
    let size = LittleEndian::read_u64(&buf[NAME_FIELD_LEN..]);
    if size > MAX_ENTRY_SIZE {
        return Err(CorruptRecord::OversizedEntry(size).into());
    }

    tracing::debug!(%name, size, "deserialized Entry");

    Ok(Some(Entry { name, size }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ser::encode_entry;

    fn corrupt(err: Error) -> CorruptRecord {
        match err {
            Error::CorruptRecord(c) => c,
            other => panic!("expected corrupt record, got {:?}", other),
        }
    }

    #[test]
    fn end_of_archive() {
        let mut empty: &[u8] = &[];
        assert_eq!(decode_entry(&mut empty).unwrap(), None);
    }

    #[test]
    fn decodes_encoded() {
        let mut buf = encode_entry("b.txt", 0).unwrap();
        buf.extend(encode_entry("a.txt", 3).unwrap());
        buf.extend(b"abc");

        let mut reader = &buf[..];
        let b = decode_entry(&mut reader).unwrap().unwrap();
        assert_eq!(b, Entry::new("b.txt", 0).unwrap());
        let a = decode_entry(&mut reader).unwrap().unwrap();
        assert_eq!(a, Entry::new("a.txt", 3).unwrap());
        assert_eq!(reader, b"abc");
    }

    #[test]
    fn short_header() {
        let buf = encode_entry("a.txt", 3).unwrap();
        let err = decode_entry(&mut &buf[..100]).unwrap_err();
        assert_eq!(
            corrupt(err),
            CorruptRecord::TruncatedHeader {
                expected: ENTRY_HEADER_LEN as usize,
                found: 100
            }
        );
    }

    #[test]
    fn garbage_after_terminator() {
        let mut buf = encode_entry("a.txt", 3).unwrap();
        buf[10] = b'x';
        let err = decode_entry(&mut &buf[..]).unwrap_err();
        assert_eq!(corrupt(err), CorruptRecord::BadPadding);
    }

    #[test]
    fn empty_name() {
        let buf = vec![0u8; ENTRY_HEADER_LEN as usize];
        let err = decode_entry(&mut &buf[..]).unwrap_err();
        assert_eq!(corrupt(err), CorruptRecord::EmptyName);
    }

    #[test]
    fn unterminated_name() {
        let buf = vec![b'n'; ENTRY_HEADER_LEN as usize];
        let err = decode_entry(&mut &buf[..]).unwrap_err();
        assert_eq!(corrupt(err), CorruptRecord::UnterminatedName);
    }

    #[test]
    fn oversized_entry() {
        let mut buf = encode_entry("a.txt", 0).unwrap();
        buf[NAME_FIELD_LEN..].copy_from_slice(&u64::MAX.to_le_bytes());
        let err = decode_entry(&mut &buf[..]).unwrap_err();
        assert_eq!(corrupt(err), CorruptRecord::OversizedEntry(u64::MAX));
    }
}
