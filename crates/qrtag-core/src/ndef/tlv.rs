//! TLV blocks in the data area of an NFC Forum Type 2 tag.
//!
//! The data area (starting at page 4) is a sequence of Tag-Length-Value
//! blocks:
//!
//! ```text
//! 0x00                      NULL TLV (one byte, no length)
//! 0x01 len value            Lock Control TLV
//! 0x02 len value            Memory Control TLV
//! 0x03 len value            NDEF Message TLV   <- what we read and write
//! 0xFD len value            Proprietary TLV
//! 0xFE                      Terminator TLV (one byte, no length)
//!
//! len: one byte 0x00..=0xFE, or 0xFF followed by a big-endian u16
//! ```

use super::error::NdefError;

pub const TLV_NULL: u8 = 0x00;
pub const TLV_LOCK_CONTROL: u8 = 0x01;
pub const TLV_MEMORY_CONTROL: u8 = 0x02;
pub const TLV_NDEF: u8 = 0x03;
pub const TLV_PROPRIETARY: u8 = 0xFD;
pub const TLV_TERMINATOR: u8 = 0xFE;

/// One parsed TLV block, as byte offsets into the data area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvBlock {
    pub tag: u8,
    /// Offset of the tag byte.
    pub start: usize,
    /// Offset of the first value byte.
    pub value_start: usize,
    pub value_len: usize,
}

impl TlvBlock {
    /// Offset one past the last value byte.
    pub fn end(&self) -> usize {
        self.value_start + self.value_len
    }
}

/// Parses the TLV blocks of `area` up to the terminator (inclusive) or the
/// end of the area.  NULL TLVs are skipped.
///
/// # Errors
///
/// Returns [`NdefError::Truncated`] if a length field or value runs past the
/// end of `area`.
pub fn parse_tlvs(area: &[u8]) -> Result<Vec<TlvBlock>, NdefError> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while pos < area.len() {
        let tag = area[pos];
        match tag {
            TLV_NULL => {
                pos += 1;
            }
            TLV_TERMINATOR => {
                blocks.push(TlvBlock {
                    tag,
                    start: pos,
                    value_start: pos + 1,
                    value_len: 0,
                });
                break;
            }
            _ => {
                let (value_len, header_len) = read_length(area, pos + 1)?;
                let value_start = pos + 1 + header_len;
                let available = area.len().saturating_sub(value_start);
                if value_len > available {
                    return Err(NdefError::Truncated {
                        offset: value_start,
                        needed: value_len,
                        available,
                    });
                }
                blocks.push(TlvBlock {
                    tag,
                    start: pos,
                    value_start,
                    value_len,
                });
                pos = value_start + value_len;
            }
        }
    }

    Ok(blocks)
}

/// Returns the value of the first NDEF Message TLV in `area`.
///
/// # Errors
///
/// Returns [`NdefError::NoNdefTlv`] if there is none, or a parse error.
pub fn find_ndef_message(area: &[u8]) -> Result<&[u8], NdefError> {
    let block = parse_tlvs(area)?
        .into_iter()
        .find(|b| b.tag == TLV_NDEF)
        .ok_or(NdefError::NoNdefTlv)?;
    Ok(&area[block.value_start..block.end()])
}

/// Encodes `message` as `NDEF TLV + Terminator TLV`.
///
/// # Errors
///
/// Returns [`NdefError::FieldTooLong`] above 65534 bytes, the largest length a
/// Type 2 TLV can express.
pub fn encode_ndef_tlv(message: &[u8]) -> Result<Vec<u8>, NdefError> {
    const MAX_LEN: usize = 0xFFFE;
    if message.len() > MAX_LEN {
        return Err(NdefError::FieldTooLong {
            field: "NDEF message",
            len: message.len(),
            max: MAX_LEN,
        });
    }

    let mut buf = Vec::with_capacity(message.len() + 5);
    buf.push(TLV_NDEF);
    if message.len() < 0xFF {
        buf.push(message.len() as u8);
    } else {
        buf.push(0xFF);
        buf.extend_from_slice(&(message.len() as u16).to_be_bytes());
    }
    buf.extend_from_slice(message);
    buf.push(TLV_TERMINATOR);
    Ok(buf)
}

/// Offset at which a new NDEF TLV should be placed.
///
/// Lock Control and Memory Control TLVs describe the tag itself and must stay
/// ahead of the NDEF TLV; everything from the first other block onwards is
/// replaced.
pub fn ndef_insert_offset(area: &[u8]) -> usize {
    let Ok(blocks) = parse_tlvs(area) else {
        return 0;
    };
    blocks
        .iter()
        .take_while(|b| matches!(b.tag, TLV_LOCK_CONTROL | TLV_MEMORY_CONTROL))
        .last()
        .map(TlvBlock::end)
        .unwrap_or(0)
}

fn read_length(area: &[u8], pos: usize) -> Result<(usize, usize), NdefError> {
    let first = *area.get(pos).ok_or(NdefError::Truncated {
        offset: pos,
        needed: 1,
        available: 0,
    })?;
    if first != 0xFF {
        return Ok((first as usize, 1));
    }
    match area.get(pos + 1..pos + 3) {
        Some(b) => Ok((u16::from_be_bytes([b[0], b[1]]) as usize, 3)),
        None => Err(NdefError::Truncated {
            offset: pos + 1,
            needed: 2,
            available: area.len().saturating_sub(pos + 1),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ndef_after_lock_control_and_nulls() {
        // Arrange: NULL, Lock Control (3 bytes), NDEF (2 bytes), Terminator
        let area = [
            0x00, 0x01, 0x03, 0xA0, 0x0C, 0x34, 0x03, 0x02, 0xAA, 0xBB, 0xFE, 0x00,
        ];

        // Act
        let msg = find_ndef_message(&area).unwrap();

        // Assert
        assert_eq!(msg, &[0xAA, 0xBB]);
    }

    #[test]
    fn test_find_ndef_in_blank_area() {
        assert_eq!(find_ndef_message(&[0x00; 16]), Err(NdefError::NoNdefTlv));
        assert_eq!(find_ndef_message(&[0xFE, 0x00]), Err(NdefError::NoNdefTlv));
    }

    #[test]
    fn test_empty_ndef_tlv() {
        let area = [0x03, 0x00, 0xFE];
        assert_eq!(find_ndef_message(&area).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_three_byte_length_form() {
        let message = vec![0x5A; 300];
        let tlv = encode_ndef_tlv(&message).unwrap();
        assert_eq!(&tlv[..4], &[0x03, 0xFF, 0x01, 0x2C]);
        assert_eq!(*tlv.last().unwrap(), TLV_TERMINATOR);
        assert_eq!(find_ndef_message(&tlv).unwrap(), message.as_slice());
    }

    #[test]
    fn test_length_254_still_uses_one_byte() {
        let tlv = encode_ndef_tlv(&[0u8; 254]).unwrap();
        assert_eq!(tlv[1], 0xFE);
        assert_eq!(tlv.len(), 254 + 3);
    }

    #[test]
    fn test_truncated_value_is_reported() {
        let area = [0x03, 0x10, 0xD1, 0x01];
        assert!(matches!(
            find_ndef_message(&area),
            Err(NdefError::Truncated { needed: 16, .. })
        ));
    }

    #[test]
    fn test_truncated_long_length() {
        let area = [0x03, 0xFF, 0x01];
        assert!(matches!(parse_tlvs(&area), Err(NdefError::Truncated { .. })));
    }

    #[test]
    fn test_insert_offset_keeps_control_tlvs() {
        let area = [0x01, 0x03, 0xA0, 0x0C, 0x34, 0x03, 0x00, 0xFE];
        assert_eq!(ndef_insert_offset(&area), 5);
    }

    #[test]
    fn test_insert_offset_zero_without_control_tlvs() {
        assert_eq!(ndef_insert_offset(&[0x03, 0x00, 0xFE]), 0);
        assert_eq!(ndef_insert_offset(&[0x00; 8]), 0);
    }
}
