//! NFC reader infrastructure.
//!
//! # How the pieces fit (for beginners)
//!
//! - A [`TagReader`] is the reader device.  `connect` blocks until a tag is
//!   on the reader and returns a [`TagChannel`] to talk to it.
//! - A [`TagChannel`] exchanges APDUs (smart-card commands) with that tag.
//!   PC/SC readers expose NFC Forum Type 2 tags (NTAG21x, Ultralight)
//!   through the "pseudo-APDUs" in [`apdu`].
//! - [`type2_tag::Type2Tag`] uses those APDUs to read the capability
//!   container and the data area, and to write pages back.
//! - [`handler::NfcHandler`] ties the above to the application's
//!   `TagStation` trait.
//!
//! # Testability
//!
//! [`mock::MockTagReader`] emulates Type 2 tag memory behind the same APDUs,
//! so everything above the PC/SC adapter runs in tests.

pub mod apdu;
pub mod handler;
pub mod mock;
pub mod type2_tag;

#[cfg(feature = "hardware")]
pub mod pcsc;

use crate::application::tag_io::TagError;

/// An open link to one tag on the reader.
pub trait TagChannel {
    /// Sends one command APDU and returns the full response, status word
    /// included.
    fn transmit(&mut self, command: &[u8]) -> Result<Vec<u8>, TagError>;
}

/// An NFC reader device.
pub trait TagReader {
    type Channel: TagChannel;

    /// Blocks until a tag is presented and connects to it.
    fn connect(&mut self) -> Result<Self::Channel, TagError>;

    /// Blocks until the reader field is empty again.
    fn wait_for_release(&mut self) -> Result<(), TagError>;
}
