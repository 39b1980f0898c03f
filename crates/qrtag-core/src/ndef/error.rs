//! Error type shared by the NDEF codec, the TLV parser and the Type 2
//! capability-container parser.

use thiserror::Error;

/// Errors that can occur while encoding or decoding NDEF data.
///
/// Every variant except [`NdefError::FieldTooLong`] describes data read from a
/// tag, so the station layer reports all of them as "this tag has no usable
/// structured record area".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NdefError {
    /// The byte slice ended before a length field said it would.
    #[error("truncated NDEF data: need {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// TNF value 0x07 is reserved by the NFC Forum.
    #[error("reserved TNF value 0x{0:02X}")]
    ReservedTnf(u8),

    /// The first record of a message did not carry the MB flag.
    #[error("first record is missing the message-begin flag")]
    MissingMessageBegin,

    /// A chunked record sequence was malformed.
    #[error("malformed chunked record: {0}")]
    BadChunk(&'static str),

    /// A record field exceeds what the wire format can express.
    #[error("{field} is {len} bytes, limit is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// A URI record payload is not valid UTF-8.
    #[error("URI record payload is not valid UTF-8")]
    InvalidUtf8,

    /// The capability container does not start with the NDEF magic number.
    #[error("tag is not NDEF formatted (capability container magic 0x{0:02X})")]
    NotFormatted(u8),

    /// The capability container declares a mapping version we cannot handle.
    #[error("unsupported NDEF mapping version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// The capability container denies read access.
    #[error("NDEF area is not readable (access byte 0x{0:02X})")]
    ReadDenied(u8),

    /// The capability container denies write access.
    #[error("NDEF area is read-only (access byte 0x{0:02X})")]
    WriteDenied(u8),

    /// No NDEF TLV was found in the data area.
    #[error("no NDEF message TLV in the tag data area")]
    NoNdefTlv,

    /// The encoded message does not fit the tag's data area.
    #[error("NDEF message needs {needed} bytes, tag data area holds {available}")]
    CapacityExceeded { needed: usize, available: usize },
}
