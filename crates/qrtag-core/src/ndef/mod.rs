//! NDEF (NFC Data Exchange Format) codec.
//!
//! # What is NDEF? (for beginners)
//!
//! NDEF is the NFC Forum's container format for data stored on a tag.  A tag
//! holds one *NDEF message*, which is a list of *records*.  Each record has a
//! type and a payload; a phone that reads a tag looks at the first record to
//! decide what to do.  qrtag writes a single well-known **URI record**, which
//! makes phones open the URI in a browser.
//!
//! The layers, from the inside out:
//!
//! - **`uri`**     – payload of a URI record (prefix code + rest of URI).
//! - **`record`**  – the [`Record`] type and its Type Name Format.
//! - **`message`** – records ⇄ bytes.
//! - **`tlv`**     – the message wrapped in a Type 2 tag TLV block.
//! - **`type2`**   – capability container and whole data-area layout.

pub mod error;
pub mod message;
pub mod record;
pub mod tlv;
pub mod type2;
pub mod uri;

pub use error::NdefError;
pub use message::{decode_message, encode_message};
pub use record::{Record, Tnf};
pub use type2::CapabilityContainer;
