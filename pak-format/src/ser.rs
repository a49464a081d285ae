use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{Error, Result};
use crate::header::ArchiveHeader;
use crate::record::{
    validate_name, validate_size, Entry, ENTRY_HEADER_LEN, MAX_NAME_LEN, NAME_FIELD_LEN,
};

pub(crate) trait Serialize {
    fn write<W: Write>(&self, writer: &mut W) -> Result<()>;
}

impl Serialize for ArchiveHeader {
    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.magic_bytes)?;
        writer.write_u8(self.version)?;
        writer.write_all(&[0u8; 3])?; // reserved
        Ok(())
    }
}

impl Serialize for Entry {
    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        validate_name(&self.name)?;
        validate_size(self.size)?;
        write_entry_header(self, writer)
    }
}

/// Writes the header of an entry that was decoded from an existing archive.
///
/// Only the field width is checked, so names a reader accepted (duplicates,
/// path separators) are carried over as they are.
pub(crate) fn write_entry_header<W: Write>(entry: &Entry, writer: &mut W) -> Result<()> {
    if entry.name.len() > MAX_NAME_LEN {
        return Err(Error::NameTooLong {
            name: entry.name.clone(),
            len: entry.name.len(),
            max: MAX_NAME_LEN,
        });
    }

    let mut field = [0u8; NAME_FIELD_LEN];
    field[..entry.name.len()].copy_from_slice(entry.name.as_bytes());
    writer.write_all(&field)?;
    writer.write_u64::<LittleEndian>(entry.size)?;

    tracing::debug!(name = %entry.name, size = entry.size, "serialized Entry");
    Ok(())
}

/// Encodes the fixed-width header of one entry.
pub fn encode_entry(name: &str, size: u64) -> Result<Vec<u8>> {
    let entry = Entry::new(name, size)?;
    let mut buf = Vec::with_capacity(ENTRY_HEADER_LEN as usize);
    entry.write(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn fixed_width_layout() {
        let buf = encode_entry("a.txt", 3).unwrap();
        assert_eq!(buf.len() as u64, ENTRY_HEADER_LEN);
        assert_eq!(&buf[..5], b"a.txt");
        assert!(buf[5..NAME_FIELD_LEN].iter().all(|b| *b == 0));
        assert_eq!(&buf[NAME_FIELD_LEN..], &3u64.to_le_bytes());
    }

    #[test]
    fn longest_name_keeps_terminator() {
        let name = "n".repeat(MAX_NAME_LEN);
        let buf = encode_entry(&name, 0).unwrap();
        assert_eq!(buf[NAME_FIELD_LEN - 1], 0);
    }

    #[test]
    fn rejects_long_name() {
        let err = encode_entry(&"n".repeat(MAX_NAME_LEN + 1), 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameTooLong);
    }

    #[test]
    fn rejects_oversized() {
        let err = encode_entry("big", u64::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSize);
    }

    #[test]
    fn decoded_names_are_written_unchecked() {
        let entry = Entry {
            name: "a/b".into(),
            size: 2,
        };
        let mut buf = vec![];
        write_entry_header(&entry, &mut buf).unwrap();
        assert_eq!(buf.len() as u64, ENTRY_HEADER_LEN);
        assert_eq!(&buf[..4], b"a/b\0");

        let decoded = crate::de::decode_entry(&mut &buf[..]).unwrap().unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn rejects_path() {
        let err = encode_entry("../etc/passwd", 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidName);
    }
}
