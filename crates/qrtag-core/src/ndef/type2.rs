//! NFC Forum Type 2 tag memory model (NTAG21x, MIFARE Ultralight).
//!
//! Type 2 tags are addressed in 4-byte *pages*:
//!
//! ```text
//! page 0..=2   UID, serial check bytes, static lock bytes
//! page 3       Capability Container (CC)
//!                [0] 0xE1      NDEF magic number
//!                [1] 0x10      mapping version 1.0
//!                [2] size      data area size / 8
//!                [3] access    high nibble read, low nibble write (0 = granted)
//! page 4..     data area: TLV blocks (see `tlv`)
//! ```
//!
//! This module only computes *what* to read and write; moving the bytes is
//! the station's job.

use super::error::NdefError;
use super::message::{decode_message, encode_message};
use super::record::Record;
use super::tlv::{encode_ndef_tlv, find_ndef_message, ndef_insert_offset};

pub const PAGE_SIZE: usize = 4;
pub const CC_PAGE: u8 = 3;
pub const DATA_AREA_FIRST_PAGE: u8 = 4;
pub const NDEF_MAGIC: u8 = 0xE1;
const SUPPORTED_MAJOR_VERSION: u8 = 1;

/// Parsed Capability Container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityContainer {
    pub major_version: u8,
    pub minor_version: u8,
    /// Size of the data area in bytes.
    pub data_area_size: usize,
    pub access: u8,
}

impl CapabilityContainer {
    /// Parses the four CC bytes from page 3.
    ///
    /// # Errors
    ///
    /// Returns [`NdefError::NotFormatted`] when the magic number is missing
    /// (the tag has no NDEF area) and [`NdefError::UnsupportedVersion`] for a
    /// major mapping version other than 1.
    pub fn parse(cc: [u8; 4]) -> Result<Self, NdefError> {
        if cc[0] != NDEF_MAGIC {
            return Err(NdefError::NotFormatted(cc[0]));
        }
        let major_version = cc[1] >> 4;
        let minor_version = cc[1] & 0x0F;
        if major_version != SUPPORTED_MAJOR_VERSION {
            return Err(NdefError::UnsupportedVersion {
                major: major_version,
                minor: minor_version,
            });
        }
        Ok(Self {
            major_version,
            minor_version,
            data_area_size: cc[2] as usize * 8,
            access: cc[3],
        })
    }

    pub fn is_readable(&self) -> bool {
        self.access >> 4 == 0
    }

    pub fn is_writable(&self) -> bool {
        self.access & 0x0F == 0
    }

    /// Fails with [`NdefError::ReadDenied`] unless reading is permitted.
    pub fn ensure_readable(&self) -> Result<(), NdefError> {
        if self.is_readable() {
            Ok(())
        } else {
            Err(NdefError::ReadDenied(self.access))
        }
    }

    /// Fails with [`NdefError::WriteDenied`] unless writing is permitted.
    pub fn ensure_writable(&self) -> Result<(), NdefError> {
        if self.is_writable() {
            Ok(())
        } else {
            Err(NdefError::WriteDenied(self.access))
        }
    }
}

/// Decodes the records stored in a Type 2 data area.
///
/// # Errors
///
/// Returns [`NdefError::NoNdefTlv`] if the area holds no NDEF message, or any
/// TLV/message decoding error.
pub fn records_from_data_area(area: &[u8]) -> Result<Vec<Record>, NdefError> {
    decode_message(find_ndef_message(area)?)
}

/// Builds the bytes to write at the start of the data area so that it holds
/// exactly `records`.
///
/// Lock/Memory Control TLVs at the front of `current_area` are kept.  The
/// result is zero-padded to a whole number of pages and never longer than
/// `capacity`.
///
/// # Errors
///
/// Returns [`NdefError::CapacityExceeded`] if the new content does not fit.
pub fn build_data_area(
    current_area: &[u8],
    records: &[Record],
    capacity: usize,
) -> Result<Vec<u8>, NdefError> {
    let keep = ndef_insert_offset(current_area).min(current_area.len());
    let message = encode_message(records)?;
    let tlv = encode_ndef_tlv(&message)?;

    let mut area = Vec::with_capacity(keep + tlv.len() + PAGE_SIZE);
    area.extend_from_slice(&current_area[..keep]);
    area.extend_from_slice(&tlv);

    if area.len() > capacity {
        return Err(NdefError::CapacityExceeded {
            needed: area.len(),
            available: capacity,
        });
    }

    let padded = area.len().div_ceil(PAGE_SIZE) * PAGE_SIZE;
    area.resize(padded.min(capacity), 0x00);
    Ok(area)
}
