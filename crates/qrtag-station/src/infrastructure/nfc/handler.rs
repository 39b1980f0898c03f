//! [`TagStation`] implementation on top of any [`TagReader`].

use qrtag_core::Record;
use tracing::{debug, info};

use super::{type2_tag::Type2Tag, TagReader};
use crate::application::tag_io::{TagError, TagStation};

/// Reads and writes NDEF records on Type 2 tags presented to `reader`.
pub struct NfcHandler<R> {
    reader: R,
}

impl<R: TagReader> NfcHandler<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    fn connect(&mut self) -> Result<Type2Tag<R::Channel>, TagError> {
        let channel = self.reader.connect()?;
        let mut tag = Type2Tag::new(channel);
        match tag.uid() {
            Ok(uid) => info!(uid = %hex(&uid), "tag connected"),
            Err(e) => debug!(error = %e, "tag connected, UID unavailable"),
        }
        Ok(tag)
    }
}

impl<R: TagReader> TagStation for NfcHandler<R> {
    fn write_uri(&mut self, uri: &str) -> Result<(), TagError> {
        let mut tag = self.connect()?;
        tag.write_records(&[Record::uri(uri)])?;
        drop(tag);
        debug!("waiting for tag removal");
        self.reader.wait_for_release()
    }

    fn get_records(&mut self) -> Result<Vec<Record>, TagError> {
        let mut tag = self.connect()?;
        let records = tag.read_records()?;
        debug!(count = records.len(), "records read");
        Ok(records)
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use qrtag_core::NdefError;

    use super::*;
    use crate::infrastructure::nfc::mock::{MockTagReader, TagMemory};

    #[test]
    fn test_write_uri_replaces_records_and_waits_for_release() {
        // Arrange
        let tag = TagMemory::ntag213()
            .with_records(&[Record::uri("https://old.example"), Record::empty()])
            .shared();
        let mut handler = NfcHandler::new(MockTagReader::new().with_touch(&tag).with_touch(&tag));

        // Act
        handler.write_uri("https://connpass.com/event/7/").unwrap();
        let records = handler.get_records().unwrap();

        // Assert
        assert_eq!(records, vec![Record::uri("https://connpass.com/event/7/")]);
        assert_eq!(handler.reader().releases(), 1);
    }

    #[test]
    fn test_get_records_does_not_wait_for_release() {
        let tag = TagMemory::ntag213().shared();
        let mut handler = NfcHandler::new(MockTagReader::new().with_touch(&tag));

        handler.get_records().unwrap();

        assert_eq!(handler.reader().releases(), 0);
    }

    #[test]
    fn test_test_uri_true_after_write() {
        let tag = TagMemory::ntag213().shared();
        let mut handler = NfcHandler::new(MockTagReader::new().with_touch(&tag).with_touch(&tag));

        handler.write_uri("https://a.example/x").unwrap();

        assert!(handler.test_uri("https://a.example/x").unwrap());
    }

    #[test]
    fn test_test_uri_false_for_other_tag() {
        let written = TagMemory::ntag213().shared();
        let other = TagMemory::ntag213()
            .with_records(&[Record::uri("https://b.example")])
            .shared();
        let mut handler =
            NfcHandler::new(MockTagReader::new().with_touch(&written).with_touch(&other));

        handler.write_uri("https://a.example").unwrap();

        assert!(!handler.test_uri("https://a.example").unwrap());
    }

    #[test]
    fn test_failed_write_does_not_wait_for_release() {
        let tag = TagMemory::unformatted(45).shared();
        let mut handler = NfcHandler::new(MockTagReader::new().with_touch(&tag));

        let err = handler.write_uri("https://a.example").unwrap_err();

        assert!(matches!(err, TagError::StructuredData(NdefError::NotFormatted(_))));
        assert_eq!(handler.reader().releases(), 0);
    }

    #[test]
    fn test_unplugged_reader_is_not_recoverable() {
        let mut handler = NfcHandler::new(MockTagReader::unplugged());

        let err = handler.get_records().unwrap_err();

        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_hex_formats_uid() {
        assert_eq!(hex(&[0x04, 0xA1, 0x0F]), "04:A1:0F");
    }
}
