//! NDEF record model.
//!
//! An NDEF record is a typed payload.  The type is a pair of a *Type Name
//! Format* (TNF, 3 bits) and a type string whose meaning depends on the TNF.
//! qrtag only authors one kind of record, the NFC Forum well-known URI record
//! (`TNF = 1`, type `"U"`), but it reads whatever the tag holds and keeps
//! unknown records as opaque bytes so they can be listed.

use std::fmt;

use super::error::NdefError;
use super::uri;

/// Well-known type of the URI record.
pub const URI_RECORD_TYPE: &[u8] = b"U";

/// Type Name Format of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tnf {
    Empty = 0x00,
    WellKnown = 0x01,
    MediaType = 0x02,
    AbsoluteUri = 0x03,
    External = 0x04,
    Unknown = 0x05,
    /// Only valid on the middle/final chunks of a chunked record.
    Unchanged = 0x06,
}

impl TryFrom<u8> for Tnf {
    type Error = NdefError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Tnf::Empty),
            0x01 => Ok(Tnf::WellKnown),
            0x02 => Ok(Tnf::MediaType),
            0x03 => Ok(Tnf::AbsoluteUri),
            0x04 => Ok(Tnf::External),
            0x05 => Ok(Tnf::Unknown),
            0x06 => Ok(Tnf::Unchanged),
            other => Err(NdefError::ReservedTnf(other)),
        }
    }
}

/// A single NDEF record.
///
/// Equality compares TNF, type, id and payload, so the same URI stored with
/// two different prefix codes gives two unequal records.  Compare
/// [`Record::to_uri`] results to match on the URI itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub tnf: Tnf,
    pub record_type: Vec<u8>,
    pub id: Vec<u8>,
    pub payload: Vec<u8>,
}

impl Record {
    /// Builds a well-known URI record, abbreviating the scheme prefix.
    pub fn uri(uri: &str) -> Self {
        Self {
            tnf: Tnf::WellKnown,
            record_type: URI_RECORD_TYPE.to_vec(),
            id: Vec::new(),
            payload: uri::encode_uri_payload(uri),
        }
    }

    /// The empty record (`TNF = 0`), used for blank NDEF messages.
    pub fn empty() -> Self {
        Self {
            tnf: Tnf::Empty,
            record_type: Vec::new(),
            id: Vec::new(),
            payload: Vec::new(),
        }
    }

    pub fn is_uri(&self) -> bool {
        self.tnf == Tnf::WellKnown && self.record_type == URI_RECORD_TYPE
    }

    /// Returns the expanded URI if this is a URI record.
    ///
    /// # Errors
    ///
    /// Returns [`NdefError::InvalidUtf8`] for a URI record whose payload is
    /// not UTF-8.
    pub fn to_uri(&self) -> Result<Option<String>, NdefError> {
        if !self.is_uri() {
            return Ok(None);
        }
        uri::decode_uri_payload(&self.payload).map(Some)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Ok(Some(uri)) = self.to_uri() {
            return write!(f, "URI record: {uri}");
        }
        write!(
            f,
            "{:?} record: type {:?}, {} byte payload",
            self.tnf,
            String::from_utf8_lossy(&self.record_type),
            self.payload.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tnf_try_from_rejects_reserved_value() {
        assert_eq!(Tnf::try_from(0x07), Err(NdefError::ReservedTnf(0x07)));
        assert_eq!(Tnf::try_from(0x01), Ok(Tnf::WellKnown));
    }

    #[test]
    fn test_uri_record_round_trips_uri() {
        let rec = Record::uri("https://example.com");
        assert!(rec.is_uri());
        assert_eq!(rec.to_uri().unwrap().as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_equal_uris_give_equal_records() {
        assert_eq!(Record::uri("https://a.example"), Record::uri("https://a.example"));
        assert_ne!(Record::uri("https://a.example"), Record::uri("https://b.example"));
    }

    #[test]
    fn test_non_uri_record_has_no_uri() {
        let rec = Record {
            tnf: Tnf::MediaType,
            record_type: b"text/plain".to_vec(),
            id: Vec::new(),
            payload: b"hi".to_vec(),
        };
        assert_eq!(rec.to_uri(), Ok(None));
        assert_eq!(
            rec.to_string(),
            "MediaType record: type \"text/plain\", 2 byte payload"
        );
    }

    #[test]
    fn test_display_uri_record() {
        assert_eq!(
            Record::uri("https://connpass.com/event/1").to_string(),
            "URI record: https://connpass.com/event/1"
        );
    }
}
