//! PC/SC pseudo-APDUs for memory tags.
//!
//! Contactless readers following the PC/SC part 3 storage-card convention
//! (ACR122U, ACR1252U, most CCID readers) accept these class `FF` commands
//! and translate them into the tag's native READ/WRITE frames.
//!
//! | Command        | Bytes                        | Type 2 meaning            |
//! |----------------|------------------------------|---------------------------|
//! | GET DATA (UID) | `FF CA 00 00 00`             | tag UID                   |
//! | READ BINARY    | `FF B0 00 <page> 10`         | 16 bytes from `page`      |
//! | UPDATE BINARY  | `FF D6 00 <page> 04 <data>`  | write one 4-byte page     |

use qrtag_core::ndef::type2::PAGE_SIZE;

use crate::application::tag_io::TagError;

pub const CLA_PSEUDO: u8 = 0xFF;
pub const INS_GET_DATA: u8 = 0xCA;
pub const INS_READ_BINARY: u8 = 0xB0;
pub const INS_UPDATE_BINARY: u8 = 0xD6;

/// Bytes returned by one READ BINARY (four pages).
pub const READ_BLOCK_LEN: usize = 16;

pub const SW_SUCCESS: [u8; 2] = [0x90, 0x00];

pub fn get_uid() -> [u8; 5] {
    [CLA_PSEUDO, INS_GET_DATA, 0x00, 0x00, 0x00]
}

pub fn read_binary(page: u8) -> [u8; 5] {
    [CLA_PSEUDO, INS_READ_BINARY, 0x00, page, READ_BLOCK_LEN as u8]
}

pub fn update_binary(page: u8, data: &[u8; PAGE_SIZE]) -> [u8; 5 + PAGE_SIZE] {
    let mut apdu = [0u8; 5 + PAGE_SIZE];
    apdu[..5].copy_from_slice(&[
        CLA_PSEUDO,
        INS_UPDATE_BINARY,
        0x00,
        page,
        PAGE_SIZE as u8,
    ]);
    apdu[5..].copy_from_slice(data);
    apdu
}

/// Splits a response APDU into its data, failing unless the status word is
/// `90 00`.
///
/// # Errors
///
/// Returns [`TagError::Transport`] for a short response or an error status.
pub fn response_data(response: &[u8]) -> Result<&[u8], TagError> {
    let Some(split) = response.len().checked_sub(2) else {
        return Err(TagError::Transport(format!(
            "response too short ({} bytes)",
            response.len()
        )));
    };
    let (data, sw) = response.split_at(split);
    if sw != SW_SUCCESS {
        return Err(TagError::Transport(format!(
            "tag returned status {:02X} {:02X}",
            sw[0], sw[1]
        )));
    }
    Ok(data)
}
