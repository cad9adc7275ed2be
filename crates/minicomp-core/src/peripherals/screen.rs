//! Screen device: collects characters written to a write-bound address.

use super::MemIoDevice;

/// Character sink.
///
/// Written bytes accumulate until the host drains them with
/// [`Screen::take_output`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    pending: Vec<u8>,
}

impl Screen {
    /// Creates an empty screen.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Returns and clears everything written since the last call.
    pub fn take_output(&mut self) -> String {
        let bytes = std::mem::take(&mut self.pending);
        bytes.into_iter().map(char::from).collect()
    }

    /// Bytes written and not yet drained.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }
}

impl MemIoDevice for Screen {
    fn write(&mut self, value: u8) {
        log::trace!("screen <- {value:#04x}");
        self.pending.push(value);
    }
}
