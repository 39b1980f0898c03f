//! NFC Forum Type 2 tag access over a [`TagChannel`].
//!
//! Memory is addressed in 4-byte pages.  Page 3 holds the capability
//! container (CC); the NDEF data area starts at page 4 and is
//! `cc.data_area_size` bytes long.

use std::ops::RangeInclusive;

use qrtag_core::{
    ndef::{
        tlv::{parse_tlvs, TLV_NDEF, TLV_TERMINATOR},
        type2::{
            build_data_area, records_from_data_area, CapabilityContainer, CC_PAGE,
            DATA_AREA_FIRST_PAGE, PAGE_SIZE,
        },
    },
    Record,
};
use tracing::debug;

use super::{
    apdu::{self, READ_BLOCK_LEN},
    TagChannel,
};
use crate::application::tag_io::TagError;

/// A connected Type 2 tag.
pub struct Type2Tag<C> {
    channel: C,
}

impl<C: TagChannel> Type2Tag<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Reads the tag UID.
    pub fn uid(&mut self) -> Result<Vec<u8>, TagError> {
        let response = self.channel.transmit(&apdu::get_uid())?;
        Ok(apdu::response_data(&response)?.to_vec())
    }

    pub fn capability_container(&mut self) -> Result<CapabilityContainer, TagError> {
        let block = self.read_block(CC_PAGE)?;
        let mut cc = [0u8; PAGE_SIZE];
        cc.copy_from_slice(&block[..PAGE_SIZE]);
        Ok(CapabilityContainer::parse(cc)?)
    }

    /// Reads the whole NDEF data area described by `cc`.
    pub fn read_data_area(&mut self, cc: &CapabilityContainer) -> Result<Vec<u8>, TagError> {
        let size = cc.data_area_size;
        let mut area = Vec::with_capacity(size + READ_BLOCK_LEN);
        let mut page = DATA_AREA_FIRST_PAGE;
        while area.len() < size {
            area.extend_from_slice(&self.read_block(page)?);
            page = page
                .checked_add((READ_BLOCK_LEN / PAGE_SIZE) as u8)
                .ok_or_else(|| {
                    TagError::Transport("data area extends past page 255".to_string())
                })?;
        }
        area.truncate(size);
        Ok(area)
    }

    /// Writes `bytes` from the start of the data area, skipping pages whose
    /// content is already equal to `current`.
    ///
    /// The pages holding the NDEF TLV header are written first with a zero
    /// length and a terminator, then the message body, then the header again
    /// with the real length.  A tag pulled away part-way reads back as an
    /// empty message instead of a truncated one.
    pub fn write_data_area(&mut self, bytes: &[u8], current: &[u8]) -> Result<(), TagError> {
        let mut on_tag = current.to_vec();
        if on_tag.len() < bytes.len() {
            on_tag.resize(bytes.len(), 0x00);
        }
        if on_tag[..bytes.len()] == *bytes {
            debug!("data area unchanged");
            return Ok(());
        }

        let page_count = bytes.len().div_ceil(PAGE_SIZE);
        let header = ndef_header_pages(bytes);
        let mut written = 0usize;

        if let Some((pages, staged)) = &header {
            for index in pages.clone() {
                written += self.write_page(index, staged, &mut on_tag)?;
            }
        }
        for index in 0..page_count {
            if header.as_ref().is_some_and(|(pages, _)| pages.contains(&index)) {
                continue;
            }
            written += self.write_page(index, bytes, &mut on_tag)?;
        }
        if let Some((pages, _)) = &header {
            for index in pages.clone() {
                written += self.write_page(index, bytes, &mut on_tag)?;
            }
        }

        debug!(pages = written, "data area written");
        Ok(())
    }

    /// Writes page `index` of `source` unless `on_tag` already holds it.
    /// Returns the number of pages written.
    fn write_page(
        &mut self,
        index: usize,
        source: &[u8],
        on_tag: &mut [u8],
    ) -> Result<usize, TagError> {
        let offset = index * PAGE_SIZE;
        let end = (offset + PAGE_SIZE).min(source.len());
        let chunk = &source[offset..end];
        if on_tag[offset..end] == *chunk {
            return Ok(0);
        }
        let page = u8::try_from(usize::from(DATA_AREA_FIRST_PAGE) + index)
            .map_err(|_| TagError::Transport("data area extends past page 255".to_string()))?;
        let mut data = [0u8; PAGE_SIZE];
        data[..chunk.len()].copy_from_slice(chunk);
        let response = self.channel.transmit(&apdu::update_binary(page, &data))?;
        apdu::response_data(&response)?;
        on_tag[offset..end].copy_from_slice(chunk);
        Ok(1)
    }

    /// Reads every NDEF record on the tag.
    ///
    /// # Errors
    ///
    /// [`TagError::StructuredData`] for an unformatted, read-protected, or
    /// malformed tag; [`TagError::Transport`] when the exchange fails.
    pub fn read_records(&mut self) -> Result<Vec<Record>, TagError> {
        let cc = self.capability_container()?;
        cc.ensure_readable()?;
        let area = self.read_data_area(&cc)?;
        Ok(records_from_data_area(&area)?)
    }

    /// Replaces the tag's NDEF message with `records`.
    ///
    /// Lock and Memory Control TLVs ahead of the message are preserved.
    ///
    /// # Errors
    ///
    /// [`TagError::StructuredData`] for an unformatted or read-only tag, or
    /// when the message does not fit; [`TagError::Transport`] when the
    /// exchange fails.
    pub fn write_records(&mut self, records: &[Record]) -> Result<(), TagError> {
        let cc = self.capability_container()?;
        cc.ensure_writable()?;
        let current = self.read_data_area(&cc)?;
        let updated = build_data_area(&current, records, cc.data_area_size)?;
        self.write_data_area(&updated, &current)
    }

    fn read_block(&mut self, page: u8) -> Result<[u8; READ_BLOCK_LEN], TagError> {
        let response = self.channel.transmit(&apdu::read_binary(page))?;
        let data = apdu::response_data(&response)?;
        data.get(..READ_BLOCK_LEN)
            .and_then(|d| <[u8; READ_BLOCK_LEN]>::try_from(d).ok())
            .ok_or_else(|| {
                TagError::Transport(format!(
                    "short read at page {page}: {} bytes",
                    data.len()
                ))
            })
    }
}

/// Data-area page indices covering the NDEF TLV header of `bytes`, and a
/// copy of `bytes` in which that TLV is empty (`03 00 FE`).
fn ndef_header_pages(bytes: &[u8]) -> Option<(RangeInclusive<usize>, Vec<u8>)> {
    let block = parse_tlvs(bytes)
        .ok()?
        .into_iter()
        .find(|b| b.tag == TLV_NDEF)?;
    let empty = [TLV_NDEF, 0x00, TLV_TERMINATOR];
    let staged_end = block.start + empty.len();
    if staged_end > bytes.len() {
        return None;
    }
    let mut staged = bytes.to_vec();
    staged[block.start..staged_end].copy_from_slice(&empty);

    let header_end = block.value_start.max(staged_end);
    let pages = block.start / PAGE_SIZE..=(header_end - 1) / PAGE_SIZE;
    Some((pages, staged))
}

#[cfg(test)]
mod tests {
    use qrtag_core::NdefError;

    use super::*;
    use crate::infrastructure::nfc::mock::{MockChannel, SharedTag, TagMemory};

    fn connect(memory: TagMemory) -> (Type2Tag<MockChannel>, SharedTag) {
        let shared = memory.shared();
        (Type2Tag::new(MockChannel::new(shared.clone())), shared)
    }

    #[test]
    fn test_blank_tag_reads_no_records() {
        let (mut tag, _) = connect(TagMemory::ntag213());

        assert!(tag.read_records().unwrap().is_empty());
    }

    #[test]
    fn test_write_then_read_back() {
        let (mut tag, _) = connect(TagMemory::ntag213());

        tag.write_records(&[Record::uri("https://connpass.com/event/1/")])
            .unwrap();

        assert_eq!(
            tag.read_records().unwrap(),
            vec![Record::uri("https://connpass.com/event/1/")]
        );
    }

    #[test]
    fn test_unchanged_pages_are_not_rewritten() {
        let (mut tag, memory) = connect(TagMemory::ntag213());
        tag.write_records(&[Record::uri("https://a.example")]).unwrap();
        let writes_after_first = memory.lock().unwrap().page_writes();

        tag.write_records(&[Record::uri("https://a.example")]).unwrap();

        assert_eq!(memory.lock().unwrap().page_writes(), writes_after_first);
    }

    #[test]
    fn test_header_page_is_written_first_and_last() {
        // Arrange
        let (mut tag, memory) = connect(TagMemory::ntag213());
        let first_page = usize::from(DATA_AREA_FIRST_PAGE);

        // Act
        tag.write_records(&[Record::uri("https://connpass.com/event/123456/")])
            .unwrap();

        // Assert
        let memory = memory.lock().unwrap();
        let pages = memory.written_pages();
        assert!(pages.len() > 2);
        assert_eq!(pages.first(), Some(&first_page));
        assert_eq!(pages.last(), Some(&first_page));
    }

    #[test]
    fn test_interrupted_write_reads_back_as_empty_message() {
        // Arrange: the tag holds a URI and is pulled away after one page.
        let memory = TagMemory::ntag213()
            .with_records(&[Record::uri("https://old.example/page")])
            .fail_writes_after(1);
        let (mut tag, _) = connect(memory);

        // Act
        let err = tag
            .write_records(&[Record::uri("https://connpass.com/event/123456/")])
            .unwrap_err();

        // Assert
        assert!(matches!(err, TagError::Transport(_)));
        assert_eq!(tag.read_records().unwrap(), Vec::<Record>::new());
    }

    #[test]
    fn test_staged_header_marks_message_empty() {
        let bytes = [0x03, 0x05, 0xD1, 0x01, 0x01, 0x55, 0x00, 0xFE];

        let (pages, staged) = ndef_header_pages(&bytes).unwrap();

        assert_eq!(pages, 0..=0);
        assert_eq!(&staged[..3], &[0x03, 0x00, 0xFE]);
        assert_eq!(&staged[3..], &bytes[3..]);
    }

    #[test]
    fn test_unformatted_tag_is_structured_data_error() {
        let (mut tag, _) = connect(TagMemory::unformatted(45));

        let err = tag.read_records().unwrap_err();

        assert!(matches!(
            err,
            TagError::StructuredData(NdefError::NotFormatted(_))
        ));
    }

    #[test]
    fn test_read_only_tag_rejects_write() {
        let (mut tag, _) = connect(TagMemory::ntag213().read_only());

        let err = tag.write_records(&[Record::uri("https://a.example")]).unwrap_err();

        assert!(matches!(err, TagError::StructuredData(NdefError::WriteDenied(_))));
    }

    #[test]
    fn test_oversized_uri_is_capacity_error() {
        let (mut tag, _) = connect(TagMemory::ntag213());
        let long = format!("https://example.com/{}", "x".repeat(200));

        let err = tag.write_records(&[Record::uri(&long)]).unwrap_err();

        assert!(matches!(
            err,
            TagError::StructuredData(NdefError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_uid_is_returned() {
        let (mut tag, _) = connect(TagMemory::ntag213());

        assert_eq!(tag.uid().unwrap().len(), 7);
    }
}
