#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ArchiveHeader {
    pub(crate) magic_bytes: [u8; 4],
    pub(crate) version: u8,
}

// Make some attempt to not accidentally load plain text files,
// and also make it break almost immediately in any UTF-8 compliant text parser.
pub(crate) const MAGIC_BYTES: &[u8; 4] = b"\xffPAK";

pub(crate) const VERSION: u8 = 0x0;

/// Width of the file header: magic, version and three reserved bytes.
pub const HEADER_LEN: u64 = 8;

impl ArchiveHeader {
    pub(crate) fn new() -> ArchiveHeader {
        ArchiveHeader {
            magic_bytes: *MAGIC_BYTES,
            version: VERSION,
        }
    }
}

impl Default for ArchiveHeader {
    fn default() -> Self {
        ArchiveHeader::new()
    }
}
