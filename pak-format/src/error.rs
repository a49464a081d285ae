use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Structural damage found while decoding a container.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CorruptRecord {
    #[error("Could not read file header: expected {expected} bytes, found {found}.")]
    MissingHeader { expected: usize, found: usize },

    #[error("Magic bytes invalid. Is this a valid pak archive?")]
    BadMagic,

    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(u8),

    #[error("Reserved header bytes are not zero")]
    BadReserved,

    #[error("Truncated entry header: expected {expected} bytes, found {found}")]
    TruncatedHeader { expected: usize, found: usize },

    #[error("Entry `{name}` claims {size} bytes but only {remaining} remain in the file")]
    TruncatedPayload {
        name: String,
        size: u64,
        remaining: u64,
    },

    #[error("Entry name is empty")]
    EmptyName,

    #[error("Entry name is not valid UTF-8")]
    NonUtf8Name,

    #[error("Entry name field has non-zero bytes after its terminator")]
    BadPadding,

    #[error("Entry name field is not NUL terminated")]
    UnterminatedName,

    #[error("Entry size {0} does not fit a file offset")]
    OversizedEntry(u64),

    #[error("Entry name `{0}` occurs more than once")]
    DuplicateName(String),

    #[error("Entry name `{0}` is not a plain file name")]
    UnsafeName(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SourceNotFound,
    DestinationUnwritable,
    TargetNotFound,
    DuplicateName,
    NameNotFound,
    NameTooLong,
    InvalidName,
    InvalidSize,
    CorruptArchive,
    Unmodified,
    OpenArchive,
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot open source directory. Path: '{}'", .path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write destination. Path: '{}'", .path.display())]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open file to add. Path: '{}'", .path.display())]
    TargetNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Reading source for entry `{name}` failed")]
    UnreadableSource {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Same file name already exists in the archive: {0}")]
    DuplicateName(String),

    #[error("No such file exists in the archive: {0}")]
    NameNotFound(String),

    #[error("Entry name is {len} bytes long, the limit is {max}: {name}")]
    NameTooLong { name: String, len: usize, max: usize },

    #[error("Not a valid entry name: {0:?}")]
    InvalidName(String),

    #[error("Entry size {0} is out of range")]
    InvalidSize(u64),

    #[error("Corrupt archive at offset {offset:#x}. Path: '{}'", .path.display())]
    CorruptArchive {
        path: PathBuf,
        offset: u64,
        #[source]
        source: CorruptRecord,
    },

    #[error("Archive left unmodified after a failed update. Path: '{}'", .path.display())]
    Unmodified {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("Cannot open archive. Path: '{}'", .path.display())]
    OpenArchive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    CorruptRecord(#[from] CorruptRecord),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Error::DestinationUnwritable { .. } => ErrorKind::DestinationUnwritable,
            Error::TargetNotFound { .. } | Error::UnreadableSource { .. } => {
                ErrorKind::TargetNotFound
            }
            Error::DuplicateName(_) => ErrorKind::DuplicateName,
            Error::NameNotFound(_) => ErrorKind::NameNotFound,
            Error::NameTooLong { .. } => ErrorKind::NameTooLong,
            Error::InvalidName(_) => ErrorKind::InvalidName,
            Error::InvalidSize(_) => ErrorKind::InvalidSize,
            Error::CorruptArchive { .. } | Error::CorruptRecord(_) => ErrorKind::CorruptArchive,
            Error::Unmodified { .. } => ErrorKind::Unmodified,
            Error::OpenArchive { .. } => ErrorKind::OpenArchive,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether this is an archive that could not be opened because it does not exist.
    pub fn is_missing_archive(&self) -> bool {
        match self {
            Error::OpenArchive { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    pub(crate) fn unmodified(path: &std::path::Path, source: Error) -> Error {
        Error::Unmodified {
            path: path.to_path_buf(),
            source: Box::new(source),
        }
    }

    /// Attaches the archive path and the offset of the failing record to a
    /// codec-level corruption error. Other errors pass through unchanged.
    pub(crate) fn at(self, path: &std::path::Path, offset: u64) -> Error {
        match self {
            Error::CorruptRecord(source) => Error::CorruptArchive {
                path: path.to_path_buf(),
                offset,
                source,
            },
            other => other,
        }
    }
}
