use crate::error::{Error, Result};

/// Width of the NUL-padded name field of an entry header.
pub const NAME_FIELD_LEN: usize = 256;

/// Longest name, in bytes, that fits the name field with its terminator.
pub const MAX_NAME_LEN: usize = NAME_FIELD_LEN - 1;

/// Width of an encoded entry header: name field plus the `u64` size.
pub const ENTRY_HEADER_LEN: u64 = NAME_FIELD_LEN as u64 + 8;

/// Largest payload an entry may declare. Sizes are file offsets, which are signed.
pub const MAX_ENTRY_SIZE: u64 = i64::MAX as u64;

/// Metadata of one archived file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    /// Base name of the file. Unique within an archive.
    pub name: String,

    /// The exact number of payload bytes stored right after the header.
    pub size: u64,
}

impl Entry {
    /// Builds an entry, checking that it can be encoded.
    pub fn new<S: Into<String>>(name: S, size: u64) -> Result<Entry> {
        let name = name.into();
        validate_name(&name)?;
        validate_size(size)?;
        Ok(Entry { name, size })
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Bytes this entry occupies in the container, header included.
    #[inline(always)]
    pub fn record_len(&self) -> u64 {
        ENTRY_HEADER_LEN + self.size
    }
}

/// Where a decoded entry sits in its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLocation {
    pub entry: Entry,

    /// Offset of the entry header.
    pub offset: u64,
}

impl EntryLocation {
    /// Offset of the first payload byte.
    #[inline(always)]
    pub fn data(&self) -> u64 {
        self.offset + ENTRY_HEADER_LEN
    }

    /// Offset of the byte after the payload, where the next record starts.
    #[inline(always)]
    pub fn end(&self) -> u64 {
        self.data() + self.entry.size
    }
}

/// Whether `name` is a plain file name that can be stored and safely
/// unpacked: non-empty, short enough, no NUL, no separators, not `.`/`..`.
pub fn is_valid_name(name: &str) -> bool {
    validate_name(name).is_ok()
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.len() > MAX_NAME_LEN {
        return Err(Error::NameTooLong {
            name: name.to_string(),
            len: name.len(),
            max: MAX_NAME_LEN,
        });
    }

    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(|c| c == '\0' || c == '/' || c == '\\')
    {
        return Err(Error::InvalidName(name.to_string()));
    }

    Ok(())
}

pub(crate) fn validate_size(size: u64) -> Result<()> {
    if size > MAX_ENTRY_SIZE {
        return Err(Error::InvalidSize(size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn names() {
        assert!(is_valid_name("a.txt"));
        assert!(is_valid_name(".hidden"));
        assert!(is_valid_name("with space"));
        assert!(is_valid_name(&"x".repeat(MAX_NAME_LEN)));

        assert!(!is_valid_name(""));
        assert!(!is_valid_name("."));
        assert!(!is_valid_name(".."));
        assert!(!is_valid_name("dir/file"));
        assert!(!is_valid_name("dir\\file"));
        assert!(!is_valid_name("nul\0byte"));
        assert!(!is_valid_name(&"x".repeat(MAX_NAME_LEN + 1)));
    }

    #[test]
    fn new_reports_kind() {
        let err = Entry::new("x".repeat(300), 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameTooLong);

        let err = Entry::new("a", u64::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSize);

        let entry = Entry::new("a", 3).unwrap();
        assert_eq!(entry.record_len(), ENTRY_HEADER_LEN + 3);
    }

    #[test]
    fn location_offsets() {
        let loc = EntryLocation {
            entry: Entry::new("a", 10).unwrap(),
            offset: 8,
        };
        assert_eq!(loc.data(), 8 + ENTRY_HEADER_LEN);
        assert_eq!(loc.end(), 8 + ENTRY_HEADER_LEN + 10);
    }
}
