//! NDEF message codec.
//!
//! Wire format of one record:
//! ```text
//! [flags|tnf:1][type_len:1][payload_len:1 or 4][id_len:1, if IL][type][id][payload]
//!
//! flags: MB 0x80  message begin
//!        ME 0x40  message end
//!        CF 0x20  chunk flag (more chunks follow)
//!        SR 0x10  short record (1-byte payload length)
//!        IL 0x08  id length present
//! ```
//! All multi-byte integers are big-endian.
//!
//! The encoder never produces chunked records.  The decoder reassembles them,
//! because some phone apps write large records in chunks.

use tracing::debug;

use super::error::NdefError;
use super::record::{Record, Tnf};

pub const FLAG_MB: u8 = 0x80;
pub const FLAG_ME: u8 = 0x40;
pub const FLAG_CF: u8 = 0x20;
pub const FLAG_SR: u8 = 0x10;
pub const FLAG_IL: u8 = 0x08;
const TNF_MASK: u8 = 0x07;

/// Encodes `records` into an NDEF message.
///
/// An empty slice encodes to an empty byte vector, which Type 2 tags store as
/// a zero-length NDEF TLV.
///
/// # Errors
///
/// Returns [`NdefError::FieldTooLong`] when a type or id exceeds 255 bytes,
/// and [`NdefError::BadChunk`] for a record using [`Tnf::Unchanged`].
pub fn encode_message(records: &[Record]) -> Result<Vec<u8>, NdefError> {
    let mut buf = Vec::new();
    let last = records.len().saturating_sub(1);

    for (i, rec) in records.iter().enumerate() {
        if rec.tnf == Tnf::Unchanged {
            return Err(NdefError::BadChunk("TNF unchanged on an unchunked record"));
        }
        check_len("record type", rec.record_type.len(), u8::MAX as usize)?;
        check_len("record id", rec.id.len(), u8::MAX as usize)?;
        check_len("payload", rec.payload.len(), u32::MAX as usize)?;

        let short = rec.payload.len() <= u8::MAX as usize;
        let mut header = rec.tnf as u8;
        if i == 0 {
            header |= FLAG_MB;
        }
        if i == last {
            header |= FLAG_ME;
        }
        if short {
            header |= FLAG_SR;
        }
        if !rec.id.is_empty() {
            header |= FLAG_IL;
        }

        buf.push(header);
        buf.push(rec.record_type.len() as u8);
        if short {
            buf.push(rec.payload.len() as u8);
        } else {
            buf.extend_from_slice(&(rec.payload.len() as u32).to_be_bytes());
        }
        if !rec.id.is_empty() {
            buf.push(rec.id.len() as u8);
        }
        buf.extend_from_slice(&rec.record_type);
        buf.extend_from_slice(&rec.id);
        buf.extend_from_slice(&rec.payload);
    }

    Ok(buf)
}

/// Decodes an NDEF message into its records.
///
/// Decoding stops at the first record carrying the ME flag; any bytes after it
/// are ignored.
///
/// # Errors
///
/// Returns [`NdefError`] when the message is truncated, the first record lacks
/// MB, a TNF is reserved, or a chunk sequence is malformed.
pub fn decode_message(bytes: &[u8]) -> Result<Vec<Record>, NdefError> {
    let mut records = Vec::new();
    if bytes.is_empty() {
        return Ok(records);
    }

    let mut cursor = Cursor { bytes, pos: 0 };
    let mut pending: Option<Record> = None;
    let mut first = true;

    loop {
        let header = cursor.u8()?;
        if first && header & FLAG_MB == 0 {
            return Err(NdefError::MissingMessageBegin);
        }
        first = false;

        let tnf = Tnf::try_from(header & TNF_MASK)?;
        let chunked = header & FLAG_CF != 0;
        let type_len = cursor.u8()? as usize;
        let payload_len = if header & FLAG_SR != 0 {
            cursor.u8()? as usize
        } else {
            cursor.u32()? as usize
        };
        let id_len = if header & FLAG_IL != 0 {
            cursor.u8()? as usize
        } else {
            0
        };
        let record_type = cursor.take(type_len)?.to_vec();
        let id = cursor.take(id_len)?.to_vec();
        let payload = cursor.take(payload_len)?;

        match pending.as_mut() {
            None => {
                if tnf == Tnf::Unchanged {
                    return Err(NdefError::BadChunk("TNF unchanged outside a chunked record"));
                }
                let rec = Record {
                    tnf,
                    record_type,
                    id,
                    payload: payload.to_vec(),
                };
                if chunked {
                    pending = Some(rec);
                } else {
                    records.push(rec);
                }
            }
            Some(acc) => {
                if tnf != Tnf::Unchanged || type_len != 0 || id_len != 0 {
                    return Err(NdefError::BadChunk(
                        "continuation chunk must use TNF unchanged with no type or id",
                    ));
                }
                acc.payload.extend_from_slice(payload);
                if !chunked {
                    if let Some(done) = pending.take() {
                        records.push(done);
                    }
                }
            }
        }

        if header & FLAG_ME != 0 {
            if pending.is_some() {
                return Err(NdefError::BadChunk("message ended inside a chunked record"));
            }
            break;
        }
    }

    let trailing = bytes.len() - cursor.pos;
    if trailing > 0 {
        debug!("ignoring {trailing} bytes after the NDEF message end");
    }
    Ok(records)
}

fn check_len(field: &'static str, len: usize, max: usize) -> Result<(), NdefError> {
    if len > max {
        return Err(NdefError::FieldTooLong { field, len, max });
    }
    Ok(())
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], NdefError> {
        let available = self.bytes.len() - self.pos;
        if n > available {
            return Err(NdefError::Truncated {
                offset: self.pos,
                needed: n,
                available,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, NdefError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, NdefError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}
