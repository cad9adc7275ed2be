//! Contiguous backing storage mapped into the address space.

use crate::fault::LayoutError;
use crate::memory::map::ADDRESS_SPACE_BYTES;

/// A contiguous RAM or ROM region.
///
/// Covers the half-open interval `[start, start + length)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBlock {
    start: u16,
    read_only: bool,
    bytes: Box<[u8]>,
}

impl MemoryBlock {
    /// Allocates a zero-filled block and copies `initial` in at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::OutOfBounds`] when the block leaves the
    /// address space and [`LayoutError::InitialDataTooLarge`] when
    /// `initial` does not fit at `offset`.
    pub fn new(
        start: u16,
        length: usize,
        read_only: bool,
        initial: Option<&[u8]>,
        offset: usize,
    ) -> Result<Self, LayoutError> {
        usize::from(start)
            .checked_add(length)
            .filter(|end| *end <= ADDRESS_SPACE_BYTES)
            .ok_or(LayoutError::OutOfBounds { start, length })?;

        let mut bytes = vec![0; length].into_boxed_slice();
        if let Some(data) = initial {
            let end = offset
                .checked_add(data.len())
                .filter(|end| *end <= length)
                .ok_or(LayoutError::InitialDataTooLarge {
                    length,
                    offset,
                    data_len: data.len(),
                })?;
            bytes[offset..end].copy_from_slice(data);
        }

        Ok(Self {
            start,
            read_only,
            bytes,
        })
    }

    /// First address covered by the block.
    #[must_use]
    pub const fn start(&self) -> u16 {
        self.start
    }

    /// Number of bytes in the block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` for a zero-length block.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// One past the last covered address, as a `usize` so `0x10000` fits.
    #[must_use]
    pub fn end(&self) -> usize {
        usize::from(self.start) + self.bytes.len()
    }

    /// Whether writes need the read-only bypass.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Raw contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Half-open containment test.
    #[must_use]
    pub fn contains(&self, addr: u16) -> bool {
        let addr = usize::from(addr);
        addr >= usize::from(self.start) && addr < self.end()
    }

    /// Half-open intersection test against `[start, start + length)`.
    #[must_use]
    pub fn overlaps(&self, start: u16, length: usize) -> bool {
        let start = usize::from(start);
        start < self.end() && usize::from(self.start) < start.saturating_add(length)
    }

    pub(crate) fn get(&self, addr: u16) -> u8 {
        self.bytes[self.index(addr)]
    }

    pub(crate) fn set(&mut self, addr: u16, value: u8) {
        let index = self.index(addr);
        self.bytes[index] = value;
    }

    pub(crate) fn clear(&mut self) {
        self.bytes.fill(0);
    }

    fn index(&self, addr: u16) -> usize {
        usize::from(addr) - usize::from(self.start)
    }
}
