use nom::error::{ErrorKind, ParseError};
use std::fmt;
use std::io;
use std::path::Path;
use std::str::Utf8Error;
use thiserror::Error;

/// The error type which is returned by the pcap-ng block parsers
#[derive(Debug, PartialEq)]
pub enum PcapError<I: Sized> {
    /// No more data available
    Eof,
    /// Last block is incomplete, and no more data available
    UnexpectedEof,

    /// Not enough bytes in buffer to read a complete block
    Incomplete(usize),

    /// The stream does not start with a Section Header Block, or its byte-order magic is invalid
    HeaderNotRecognized,

    /// An error encountered during parsing
    NomError(I, ErrorKind),
    /// An error encountered during parsing (owned version)
    OwnedNomError(Vec<u8>, ErrorKind),

    /// The reader buffer is too small to hold a complete block
    BufferTooSmall,
}

impl<I> PcapError<I> {
    /// Creates a `PcapError` from input and error kind.
    pub fn from_data(input: I, errorkind: ErrorKind) -> Self {
        Self::NomError(input, errorkind)
    }
}

impl<I> PcapError<I>
where
    I: AsRef<[u8]> + Sized,
{
    /// Creates an owned `PcapError` object from borrowed data, cloning object.
    /// Owned object has `'static` lifetime.
    pub fn to_owned_vec(&self) -> PcapError<Vec<u8>> {
        match self {
            PcapError::Eof => PcapError::Eof,
            PcapError::UnexpectedEof => PcapError::UnexpectedEof,
            PcapError::Incomplete(n) => PcapError::Incomplete(*n),
            PcapError::HeaderNotRecognized => PcapError::HeaderNotRecognized,
            PcapError::NomError(i, e) => PcapError::OwnedNomError(i.as_ref().to_vec(), *e),
            PcapError::OwnedNomError(v, e) => PcapError::OwnedNomError(v.clone(), *e),
            PcapError::BufferTooSmall => PcapError::BufferTooSmall,
        }
    }
}

impl<I> ParseError<I> for PcapError<I> {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        PcapError::NomError(input, kind)
    }
    fn append(input: I, kind: ErrorKind, _other: Self) -> Self {
        PcapError::NomError(input, kind)
    }
}

impl<I> fmt::Display for PcapError<I>
where
    I: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PcapError::Eof => write!(f, "End of file"),
            PcapError::UnexpectedEof => write!(f, "Unexpected end of file (truncated block)"),
            PcapError::Incomplete(n) => write!(f, "Incomplete read: {} more bytes needed", n),
            PcapError::HeaderNotRecognized => write!(f, "Section header not recognized"),
            PcapError::NomError(_, ErrorKind::Verify)
            | PcapError::OwnedNomError(_, ErrorKind::Verify) => {
                write!(f, "Invalid block (bad length, trailing length mismatch or bad options)")
            }
            PcapError::NomError(_, e) | PcapError::OwnedNomError(_, e) => {
                write!(f, "Internal parser error {:?}", e)
            }
            PcapError::BufferTooSmall => write!(f, "Buffer is too small to hold a block"),
        }
    }
}

impl<I> std::error::Error for PcapError<I> where I: fmt::Debug {}

/// Broad category of an [`Error`], for callers that branch on the kind of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Filesystem-level failure
    Io,
    /// Container bytes violate the block or option layout
    Format,
    /// Requested packet ordinal is not in the capture
    Range,
    /// Comment bytes are not valid UTF-8
    Encoding,
    /// The edit cannot be expressed in the container (no options area, value too long)
    Unsupported,
}

/// Errors returned when loading, editing or saving a capture
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing a file failed
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The capture data is malformed
    #[error("malformed pcapng data at offset {offset}: {source}")]
    Format {
        offset: usize,
        #[source]
        source: PcapError<Vec<u8>>,
    },

    /// The packet number is outside `[1, count]`
    #[error("packet number {requested} out of range (capture has {count} packets)")]
    Range { requested: usize, count: usize },

    /// The comment of a packet is not valid text
    #[error("comment of packet {packet_number} is not valid UTF-8: {source}")]
    Encoding {
        packet_number: usize,
        raw: Vec<u8>,
        #[source]
        source: Utf8Error,
    },

    /// The packet block has no options area
    #[error("packet {packet_number} is stored in a {block}, which cannot carry a comment")]
    OptionsNotSupported {
        packet_number: usize,
        block: &'static str,
    },

    /// The comment does not fit in an option
    #[error("comment is {len} bytes long, an option holds at most 65535 bytes")]
    CommentTooLong { len: usize },

    /// A block could not be serialized
    #[error("could not serialize block {index}: {reason}")]
    Serialize { index: usize, reason: String },
}

impl Error {
    /// Returns a closure wrapping an `io::Error` with a description of the failed operation
    pub fn io<S: Into<String>>(context: S) -> impl FnOnce(io::Error) -> Error {
        let context = context.into();
        move |source| Error::Io { context, source }
    }

    pub(crate) fn io_path(action: &str, path: &Path) -> impl FnOnce(io::Error) -> Error {
        Error::io(format!("cannot {} {}", action, path.display()))
    }

    /// Returns the category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Io { .. } => ErrorCategory::Io,
            Error::Format { .. } | Error::Serialize { .. } => ErrorCategory::Format,
            Error::Range { .. } => ErrorCategory::Range,
            Error::Encoding { .. } => ErrorCategory::Encoding,
            Error::OptionsNotSupported { .. } | Error::CommentTooLong { .. } => {
                ErrorCategory::Unsupported
            }
        }
    }
}

/// Result type alias using the crate `Error` type.
pub type Result<T> = std::result::Result<T, Error>;
