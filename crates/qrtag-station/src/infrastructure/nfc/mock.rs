//! In-memory NFC reader and Type 2 tag for unit and integration testing.
//!
//! [`TagMemory`] emulates NTAG21x page memory and answers the same PC/SC
//! pseudo-APDUs a real reader would.  [`MockTagReader`] hands out one
//! scripted "touch" per `connect`; when the script is exhausted it behaves as
//! if the operator pressed Ctrl-C while waiting.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use qrtag_core::{
    ndef::{
        tlv::{TLV_NDEF, TLV_TERMINATOR},
        type2::{build_data_area, CC_PAGE, DATA_AREA_FIRST_PAGE, NDEF_MAGIC, PAGE_SIZE},
    },
    Record,
};

use super::{
    apdu::{CLA_PSEUDO, INS_GET_DATA, INS_READ_BINARY, INS_UPDATE_BINARY, READ_BLOCK_LEN},
    TagChannel, TagReader,
};
use crate::application::tag_io::TagError;

/// Tag memory shared between a test and the mock reader.
pub type SharedTag = Arc<Mutex<TagMemory>>;

const NTAG213_PAGES: usize = 45;
/// NTAG213 user memory: pages 4..=39.
const NTAG213_DATA_AREA: usize = 144;

const SW_OK: [u8; 2] = [0x90, 0x00];
const SW_WRITE_FAILED: [u8; 2] = [0x63, 0x00];
const SW_SECURITY: [u8; 2] = [0x69, 0x82];
const SW_BAD_ADDRESS: [u8; 2] = [0x6A, 0x82];
const SW_BAD_INS: [u8; 2] = [0x6D, 0x00];
const SW_BAD_CLA: [u8; 2] = [0x6E, 0x00];

/// Page memory of one emulated Type 2 tag.
#[derive(Debug, Clone)]
pub struct TagMemory {
    pages: Vec<[u8; PAGE_SIZE]>,
    uid: [u8; 7],
    written_pages: Vec<usize>,
    fail_writes_after: Option<usize>,
}

impl TagMemory {
    /// A factory-fresh NTAG213: formatted, empty NDEF TLV, 144-byte data area.
    pub fn ntag213() -> Self {
        let mut tag = Self::unformatted(NTAG213_PAGES);
        tag.pages[usize::from(CC_PAGE)] = [NDEF_MAGIC, 0x10, (NTAG213_DATA_AREA / 8) as u8, 0x00];
        tag.pages[usize::from(DATA_AREA_FIRST_PAGE)] = [TLV_NDEF, 0x00, TLV_TERMINATOR, 0x00];
        tag
    }

    /// A tag of `pages` pages with no capability container.
    pub fn unformatted(pages: usize) -> Self {
        let uid = [0x04, 0x51, 0x7A, 0x12, 0x8B, 0x3C, 0x80];
        let mut memory = vec![[0u8; PAGE_SIZE]; pages.max(usize::from(DATA_AREA_FIRST_PAGE))];
        memory[0] = [uid[0], uid[1], uid[2], 0x88 ^ uid[0] ^ uid[1] ^ uid[2]];
        memory[1] = [uid[3], uid[4], uid[5], uid[6]];
        Self {
            pages: memory,
            uid,
            written_pages: Vec::new(),
            fail_writes_after: None,
        }
    }

    /// Marks the tag read-only in its capability container.
    pub fn read_only(mut self) -> Self {
        self.pages[usize::from(CC_PAGE)][3] = 0x0F;
        self
    }

    /// Stores `records` as the tag's NDEF message.
    ///
    /// # Panics
    ///
    /// Panics if the tag is unformatted or the records do not fit.
    pub fn with_records(mut self, records: &[Record]) -> Self {
        let current = self.data_area();
        let area = build_data_area(&current, records, NTAG213_DATA_AREA.min(current.len()))
            .expect("records must fit the emulated tag");
        for (i, chunk) in area.chunks(PAGE_SIZE).enumerate() {
            let page = &mut self.pages[usize::from(DATA_AREA_FIRST_PAGE) + i];
            page[..chunk.len()].copy_from_slice(chunk);
        }
        self
    }

    /// Makes every UPDATE BINARY after the first `count` fail, like a tag
    /// pulled away mid-write.
    pub fn fail_writes_after(mut self, count: usize) -> Self {
        self.fail_writes_after = Some(count);
        self
    }

    pub fn shared(self) -> SharedTag {
        Arc::new(Mutex::new(self))
    }

    /// Number of successful page writes so far.
    pub fn page_writes(&self) -> usize {
        self.written_pages.len()
    }

    /// Page numbers of the successful writes, in the order they happened.
    pub fn written_pages(&self) -> &[usize] {
        &self.written_pages
    }

    /// Data area bytes as advertised by the capability container.
    pub fn data_area(&self) -> Vec<u8> {
        let size = usize::from(self.pages[usize::from(CC_PAGE)][2]) * 8;
        self.pages
            .iter()
            .skip(usize::from(DATA_AREA_FIRST_PAGE))
            .flatten()
            .copied()
            .take(size)
            .collect()
    }

    /// Answers one command APDU.
    pub fn respond(&mut self, command: &[u8]) -> Vec<u8> {
        if command.len() < 5 || command[0] != CLA_PSEUDO {
            return SW_BAD_CLA.to_vec();
        }
        let page = usize::from(command[3]);
        match command[1] {
            INS_GET_DATA => {
                let mut response = self.uid.to_vec();
                response.extend_from_slice(&SW_OK);
                response
            }
            INS_READ_BINARY => {
                if page >= self.pages.len() {
                    return SW_BAD_ADDRESS.to_vec();
                }
                // Reads roll over to page 0, as on NTAG21x.
                let mut response: Vec<u8> = (0..READ_BLOCK_LEN / PAGE_SIZE)
                    .flat_map(|i| self.pages[(page + i) % self.pages.len()])
                    .collect();
                response.extend_from_slice(&SW_OK);
                response
            }
            INS_UPDATE_BINARY => self.update(page, &command[5..]).to_vec(),
            _ => SW_BAD_INS.to_vec(),
        }
    }

    fn update(&mut self, page: usize, data: &[u8]) -> [u8; 2] {
        if page < usize::from(CC_PAGE) {
            return SW_SECURITY;
        }
        if page >= self.pages.len() || data.len() != PAGE_SIZE {
            return SW_BAD_ADDRESS;
        }
        if self
            .fail_writes_after
            .is_some_and(|limit| self.written_pages.len() >= limit)
        {
            return SW_WRITE_FAILED;
        }
        self.pages[page].copy_from_slice(data);
        self.written_pages.push(page);
        SW_OK
    }
}

/// Link to an emulated tag.
pub struct MockChannel {
    tag: SharedTag,
}

impl MockChannel {
    pub fn new(tag: SharedTag) -> Self {
        Self { tag }
    }
}

impl TagChannel for MockChannel {
    fn transmit(&mut self, command: &[u8]) -> Result<Vec<u8>, TagError> {
        let mut tag = self
            .tag
            .lock()
            .map_err(|_| TagError::Transport("emulated tag lock poisoned".to_string()))?;
        Ok(tag.respond(command))
    }
}

/// A reader that presents scripted tag touches in order.
#[derive(Default)]
pub struct MockTagReader {
    touches: VecDeque<SharedTag>,
    unplugged: bool,
    connects: usize,
    releases: usize,
}

impl MockTagReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reader that fails every operation as if it had been unplugged.
    pub fn unplugged() -> Self {
        Self {
            unplugged: true,
            ..Self::default()
        }
    }

    /// Queues a touch of `tag`.  The same tag may be queued several times.
    pub fn with_touch(mut self, tag: &SharedTag) -> Self {
        self.touches.push_back(Arc::clone(tag));
        self
    }

    pub fn connects(&self) -> usize {
        self.connects
    }

    pub fn releases(&self) -> usize {
        self.releases
    }

    pub fn pending_touches(&self) -> usize {
        self.touches.len()
    }
}

impl TagReader for MockTagReader {
    type Channel = MockChannel;

    fn connect(&mut self) -> Result<MockChannel, TagError> {
        if self.unplugged {
            return Err(TagError::DeviceUnavailable("mock reader unplugged".to_string()));
        }
        let tag = self.touches.pop_front().ok_or(TagError::Cancelled)?;
        self.connects += 1;
        Ok(MockChannel::new(tag))
    }

    fn wait_for_release(&mut self) -> Result<(), TagError> {
        if self.unplugged {
            return Err(TagError::DeviceUnavailable("mock reader unplugged".to_string()));
        }
        self.releases += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::nfc::apdu;

    #[test]
    fn test_ntag213_has_formatted_cc() {
        let mut tag = TagMemory::ntag213();

        let response = tag.respond(&apdu::read_binary(CC_PAGE));

        assert_eq!(&response[..4], &[0xE1, 0x10, 0x12, 0x00]);
        assert_eq!(&response[16..], &[0x90, 0x00]);
    }

    #[test]
    fn test_write_to_uid_pages_is_refused() {
        let mut tag = TagMemory::ntag213();

        let response = tag.respond(&apdu::update_binary(1, &[0; 4]));

        assert_eq!(response, SW_SECURITY.to_vec());
        assert_eq!(tag.page_writes(), 0);
    }

    #[test]
    fn test_fail_writes_after_limit() {
        let mut tag = TagMemory::ntag213().fail_writes_after(1);

        assert_eq!(tag.respond(&apdu::update_binary(4, &[1; 4])), SW_OK.to_vec());
        assert_eq!(
            tag.respond(&apdu::update_binary(5, &[1; 4])),
            SW_WRITE_FAILED.to_vec()
        );
    }

    #[test]
    fn test_reader_without_touches_reports_cancelled() {
        let mut reader = MockTagReader::new();

        assert!(matches!(reader.connect(), Err(TagError::Cancelled)));
    }

    #[test]
    fn test_touches_are_presented_in_order() {
        let first = TagMemory::ntag213().shared();
        let second = TagMemory::unformatted(16).shared();
        let mut reader = MockTagReader::new().with_touch(&first).with_touch(&second);

        let mut channel = reader.connect().unwrap();
        let cc = channel.transmit(&apdu::read_binary(CC_PAGE)).unwrap();
        assert_eq!(cc[0], NDEF_MAGIC);

        let mut channel = reader.connect().unwrap();
        let cc = channel.transmit(&apdu::read_binary(CC_PAGE)).unwrap();
        assert_eq!(cc[0], 0x00);
        assert_eq!(reader.connects(), 2);
    }
}
