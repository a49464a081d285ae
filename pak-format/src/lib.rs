//! Reading and writing pak archives: a single container file holding a flat
//! set of named files as a sequence of self-describing records.
//!
//! ```text
//! header   "\xffPAK" version:u8 reserved:[u8; 3]
//! record*  name:[u8; 256] (NUL padded) size:u64le payload:[u8; size]
//! ```

mod de;
mod error;
mod file;
pub mod fs;
mod header;
mod ops;
mod record;
mod ser;

pub use de::decode_entry;
pub use error::{CorruptRecord, Error, ErrorKind, Result};
pub use file::{ArchiveReader, ArchiveWriter, BulkStats, Entries, Listing, Skipped};
pub use header::HEADER_LEN;
pub use ops::{add, delete, list, pack, unpack, verify};
pub use record::{
    is_valid_name, Entry, EntryLocation, ENTRY_HEADER_LEN, MAX_ENTRY_SIZE, MAX_NAME_LEN,
    NAME_FIELD_LEN,
};
pub use ser::encode_entry;
