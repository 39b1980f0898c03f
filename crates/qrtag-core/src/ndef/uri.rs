//! URI record payload encoding (NFC Forum URI RTD).
//!
//! Payload format:
//! ```text
//! [identifier_code:1][uri_field:N]
//! ```
//! The identifier code abbreviates a common scheme prefix.  For example
//! `https://connpass.com/event/1` is stored as `0x04` followed by
//! `connpass.com/event/1`, saving seven bytes of tag memory.

use super::error::NdefError;

/// Identifier-code table.  The index is the code.
pub const URI_PREFIXES: [&str; 36] = [
    "",
    "http://www.",
    "https://www.",
    "http://",
    "https://",
    "tel:",
    "mailto:",
    "ftp://anonymous:anonymous@",
    "ftp://ftp.",
    "ftps://",
    "sftp://",
    "smb://",
    "nfs://",
    "ftp://",
    "dav://",
    "news:",
    "telnet://",
    "imap:",
    "rtsp://",
    "urn:",
    "pop:",
    "sip:",
    "sips:",
    "tftp:",
    "btspp://",
    "btl2cap://",
    "btgoep://",
    "tcpobex://",
    "irdaobex://",
    "file://",
    "urn:epc:id:",
    "urn:epc:tag:",
    "urn:epc:pat:",
    "urn:epc:raw:",
    "urn:epc:",
    "urn:nfc:",
];

/// Returns the identifier code of the longest table prefix of `uri`.
pub fn prefix_code(uri: &str) -> u8 {
    URI_PREFIXES
        .iter()
        .enumerate()
        .filter(|(_, prefix)| uri.starts_with(*prefix))
        .max_by_key(|(_, prefix)| prefix.len())
        .map(|(code, _)| code as u8)
        .unwrap_or(0)
}

/// Encodes `uri` as a URI record payload.
pub fn encode_uri_payload(uri: &str) -> Vec<u8> {
    let code = prefix_code(uri);
    let rest = &uri[URI_PREFIXES[code as usize].len()..];
    let mut payload = Vec::with_capacity(1 + rest.len());
    payload.push(code);
    payload.extend_from_slice(rest.as_bytes());
    payload
}

/// Expands a URI record payload back into the full URI.
///
/// Codes outside the table are reserved; they are treated as "no prefix".
///
/// # Errors
///
/// Returns [`NdefError::Truncated`] for an empty payload and
/// [`NdefError::InvalidUtf8`] if the URI field is not UTF-8.
pub fn decode_uri_payload(payload: &[u8]) -> Result<String, NdefError> {
    let (&code, rest) = payload.split_first().ok_or(NdefError::Truncated {
        offset: 0,
        needed: 1,
        available: 0,
    })?;
    let prefix = URI_PREFIXES.get(code as usize).copied().unwrap_or("");
    let rest = std::str::from_utf8(rest).map_err(|_| NdefError::InvalidUtf8)?;
    Ok(format!("{prefix}{rest}"))
}
