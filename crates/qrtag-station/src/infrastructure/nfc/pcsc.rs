//! PC/SC reader adapter (pcsclite on Linux/macOS, WinSCard on Windows).
//!
//! Waiting for a tag uses `SCardGetStatusChange` in short slices so the
//! stop signal is noticed within one poll interval.

use std::{ffi::CString, time::Duration};

use pcsc::{Card, Context, Protocols, ReaderState, Scope, ShareMode, State, MAX_BUFFER_SIZE};
use tracing::{debug, info};

use super::{TagChannel, TagReader};
use crate::application::{stop_signal::StopSignal, tag_io::TagError};

/// One PC/SC reader.
pub struct PcscReader {
    context: Context,
    reader: CString,
    stop: StopSignal,
    poll_interval: Duration,
}

impl PcscReader {
    /// Connects to the smart-card service and picks the first reader whose
    /// name contains `name_filter` (any reader when empty).
    ///
    /// # Errors
    ///
    /// Returns [`TagError::DeviceUnavailable`] when the service is not
    /// running or no matching reader is attached.
    pub fn open(
        name_filter: &str,
        stop: StopSignal,
        poll_interval: Duration,
    ) -> Result<Self, TagError> {
        let context = Context::establish(Scope::User).map_err(device_error)?;
        let readers = context.list_readers_owned().map_err(device_error)?;
        let reader = readers
            .into_iter()
            .find(|name| name_filter.is_empty() || name.to_string_lossy().contains(name_filter))
            .ok_or_else(|| {
                TagError::DeviceUnavailable(if name_filter.is_empty() {
                    "no PC/SC reader attached".to_string()
                } else {
                    format!("no PC/SC reader matching {name_filter:?}")
                })
            })?;

        info!(reader = %reader.to_string_lossy(), "NFC reader opened");
        Ok(Self {
            context,
            reader,
            stop,
            poll_interval,
        })
    }

    /// Blocks until a card is present (`present == true`) or absent.
    fn wait_for(&self, present: bool) -> Result<(), TagError> {
        let mut states = [ReaderState::new(self.reader.clone(), State::UNAWARE)];
        loop {
            if self.stop.is_requested() {
                return Err(TagError::Cancelled);
            }
            match self
                .context
                .get_status_change(self.poll_interval, &mut states)
            {
                Ok(()) | Err(pcsc::Error::Timeout) => {}
                Err(e) => return Err(device_error(e)),
            }

            let event = states[0].event_state();
            if event.intersects(State::UNAVAILABLE | State::UNKNOWN) {
                return Err(TagError::DeviceUnavailable(
                    "NFC reader went away".to_string(),
                ));
            }
            let card_present = event.contains(State::PRESENT) && !event.contains(State::MUTE);
            if card_present == present {
                return Ok(());
            }
            states[0].sync_current_state();
        }
    }
}

impl TagReader for PcscReader {
    type Channel = PcscChannel;

    fn connect(&mut self) -> Result<PcscChannel, TagError> {
        self.wait_for(true)?;
        let card = self
            .context
            .connect(&self.reader, ShareMode::Shared, Protocols::ANY)
            .map_err(|e| match e {
                pcsc::Error::RemovedCard
                | pcsc::Error::NoSmartcard
                | pcsc::Error::UnpoweredCard => TagError::Transport(e.to_string()),
                e => device_error(e),
            })?;
        debug!("card connected");
        Ok(PcscChannel { card })
    }

    fn wait_for_release(&mut self) -> Result<(), TagError> {
        self.wait_for(false)
    }
}

/// A connected card.  Disconnects (leaving the card powered) when dropped.
pub struct PcscChannel {
    card: Card,
}

impl TagChannel for PcscChannel {
    fn transmit(&mut self, command: &[u8]) -> Result<Vec<u8>, TagError> {
        let mut buffer = [0u8; MAX_BUFFER_SIZE];
        let response = self
            .card
            .transmit(command, &mut buffer)
            .map_err(|e| TagError::Transport(e.to_string()))?;
        Ok(response.to_vec())
    }
}

fn device_error(e: pcsc::Error) -> TagError {
    TagError::DeviceUnavailable(e.to_string())
}
