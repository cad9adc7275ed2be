//! Memory-mapped device contract and the stock devices.

use std::cell::RefCell;
use std::rc::Rc;

/// Keyboard input queue device.
pub mod keyboard;
/// Character output device.
pub mod screen;

pub use keyboard::Keyboard;
pub use screen::Screen;

/// Device bound to a single address of the address space.
///
/// `peek` must return exactly what the next `read` would return without
/// changing device state; diagnostic views rely on it.
pub trait MemIoDevice {
    /// Reads a value; may consume device state.
    fn read(&mut self) -> u8 {
        0
    }

    /// Writes a value; the write is a pure side effect.
    fn write(&mut self, value: u8) {
        let _ = value;
    }

    /// Returns what `read` would return, without consuming it.
    fn peek(&self) -> u8 {
        0
    }
}

/// Shared handle to a bound device.
///
/// The same device may be bound for reads and writes and stay reachable
/// from the command layer, so bindings hold shared handles.
pub type SharedDevice = Rc<RefCell<dyn MemIoDevice>>;

/// Access direction of an I/O binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoDirection {
    /// Reads at the address are served by the device.
    Read,
    /// Writes at the address are forwarded to the device.
    Write,
}

/// Wraps a device into a concrete shared handle.
///
/// The concrete handle coerces to [`SharedDevice`] while the caller keeps
/// typed access.
#[must_use]
pub fn shared<D: MemIoDevice>(device: D) -> Rc<RefCell<D>> {
    Rc::new(RefCell::new(device))
}
