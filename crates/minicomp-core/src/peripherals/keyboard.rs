//! Keyboard device: a FIFO of pending key codes served at a read-bound address.

use std::collections::VecDeque;

use super::MemIoDevice;

/// Buffered keyboard.
///
/// `read` dequeues one key code (0 when empty); `peek` shows the head of
/// the queue without consuming it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    initial: Vec<u8>,
    buffer: VecDeque<u8>,
}

impl Keyboard {
    /// Creates a keyboard preloaded with `preload`, restored on [`Keyboard::reset`].
    #[must_use]
    pub fn new(preload: &str) -> Self {
        let initial = preload.bytes().collect::<Vec<_>>();
        Self {
            buffer: initial.iter().copied().collect(),
            initial,
        }
    }

    /// Appends the bytes of `text` to the queue.
    pub fn extend(&mut self, text: &str) {
        self.buffer.extend(text.bytes());
    }

    /// Drops every pending key code.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Restores the preload contents.
    pub fn reset(&mut self) {
        self.buffer = self.initial.iter().copied().collect();
    }

    /// Pending key codes in dequeue order.
    pub fn pending(&self) -> impl Iterator<Item = u8> + '_ {
        self.buffer.iter().copied()
    }

    /// Number of pending key codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` when no key codes are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl MemIoDevice for Keyboard {
    fn read(&mut self) -> u8 {
        self.buffer.pop_front().unwrap_or(0)
    }

    fn peek(&self) -> u8 {
        self.buffer.front().copied().unwrap_or(0)
    }
}
