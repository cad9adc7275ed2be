//! The routed address space: storage blocks plus memory-mapped device bindings.

use std::collections::HashMap;
use std::fmt;

use crate::fault::{AccessError, LayoutError};
use crate::memory::block::MemoryBlock;
use crate::peripherals::{IoDirection, SharedDevice};

/// Byte-addressable 16-bit address space.
///
/// Accesses consult device bindings first, then the owning block. Block
/// lookup is a linear scan; layouts hold a handful of blocks.
#[derive(Default)]
pub struct AddressSpace {
    blocks: Vec<MemoryBlock>,
    io_read: HashMap<u16, SharedDevice>,
    io_write: HashMap<u16, SharedDevice>,
}

impl fmt::Debug for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reads = self.io_read.keys().copied().collect::<Vec<_>>();
        let mut writes = self.io_write.keys().copied().collect::<Vec<_>>();
        reads.sort_unstable();
        writes.sort_unstable();
        f.debug_struct("AddressSpace")
            .field(
                "blocks",
                &self
                    .blocks
                    .iter()
                    .map(|b| (b.start(), b.len(), b.is_read_only()))
                    .collect::<Vec<_>>(),
            )
            .field("io_read", &reads)
            .field("io_write", &writes)
            .finish()
    }
}

impl AddressSpace {
    /// Creates an empty address space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a new block of `length` bytes at `start`.
    ///
    /// `initial` is copied in at `offset`; the rest of the block is zeroed.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Overlap`] when `[start, start + length)`
    /// intersects an existing block, or the errors of [`MemoryBlock::new`].
    pub fn add_block(
        &mut self,
        start: u16,
        length: usize,
        read_only: bool,
        initial: Option<&[u8]>,
        offset: usize,
    ) -> Result<(), LayoutError> {
        if let Some(existing) = self.blocks.iter().find(|b| b.overlaps(start, length)) {
            return Err(LayoutError::Overlap {
                start,
                length,
                existing_start: existing.start(),
                existing_length: existing.len(),
            });
        }

        let block = MemoryBlock::new(start, length, read_only, initial, offset)?;
        log::debug!(
            "mapped {} block {start:#06x}..{:#06x}",
            if read_only { "read-only" } else { "writable" },
            block.end()
        );
        self.blocks.push(block);
        Ok(())
    }

    /// Binds `device` to `address` for one direction.
    ///
    /// A later registration for the same address and direction replaces
    /// the earlier one; the replaced handle is returned.
    pub fn register_io(
        &mut self,
        address: u16,
        device: SharedDevice,
        direction: IoDirection,
    ) -> Option<SharedDevice> {
        let bindings = match direction {
            IoDirection::Read => &mut self.io_read,
            IoDirection::Write => &mut self.io_write,
        };
        let previous = bindings.insert(address, device);
        if previous.is_some() {
            log::warn!("{direction:?} binding at {address:#06x} replaced");
        }
        previous
    }

    /// Writes `value` at `addr`.
    ///
    /// A write-bound device receives the value as a side effect. Otherwise
    /// the owning block stores `value & 0xFF`; `protect_read_only = false`
    /// is the firmware-patching bypass.
    ///
    /// # Errors
    ///
    /// [`AccessError::ReadOnly`] for a protected write to a read-only block,
    /// [`AccessError::NotMapped`] when no block covers `addr`.
    pub fn write(&mut self, addr: u16, value: u8, protect_read_only: bool) -> Result<(), AccessError> {
        if let Some(device) = self.io_write.get(&addr) {
            device.borrow_mut().write(value);
            return Ok(());
        }

        let block = self
            .blocks
            .iter_mut()
            .find(|b| b.contains(addr))
            .ok_or(AccessError::NotMapped { addr })?;
        if block.is_read_only() && protect_read_only {
            return Err(AccessError::ReadOnly { addr });
        }
        block.set(addr, value);
        Ok(())
    }

    /// Reads the byte at `addr`; a read-bound device may consume state.
    ///
    /// # Errors
    ///
    /// [`AccessError::NotMapped`] when neither a binding nor a block covers `addr`.
    pub fn read(&mut self, addr: u16) -> Result<u8, AccessError> {
        if let Some(device) = self.io_read.get(&addr) {
            return Ok(device.borrow_mut().read());
        }
        self.stored(addr)
    }

    /// Side-effect-free read: devices are asked to `peek`.
    ///
    /// # Errors
    ///
    /// [`AccessError::NotMapped`] when neither a binding nor a block covers `addr`.
    pub fn peek(&self, addr: u16) -> Result<u8, AccessError> {
        if let Some(device) = self.io_read.get(&addr) {
            return Ok(device.borrow().peek());
        }
        self.stored(addr)
    }

    /// Little-endian 16-bit read of `addr` and `addr + 1` (wrapping).
    ///
    /// # Errors
    ///
    /// Propagates the first failing byte read.
    pub fn read_word(&mut self, addr: u16) -> Result<u16, AccessError> {
        let lo = self.read(addr)?;
        let hi = self.read(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Zero-fills every writable block; read-only blocks are untouched.
    pub fn reset(&mut self) {
        for block in self.blocks.iter_mut().filter(|b| !b.is_read_only()) {
            block.clear();
        }
    }

    /// Copies `bytes` to consecutive addresses from `origin`, bypassing
    /// read-only protection.
    ///
    /// # Errors
    ///
    /// [`AccessError::NotMapped`] at the first address the image cannot
    /// reach; bytes before it are already written.
    pub fn load(&mut self, origin: u16, bytes: &[u8]) -> Result<(), AccessError> {
        for (offset, byte) in bytes.iter().enumerate() {
            let addr = u16::try_from(usize::from(origin) + offset)
                .map_err(|_| AccessError::NotMapped { addr: u16::MAX })?;
            self.write(addr, *byte, false)?;
        }
        Ok(())
    }

    /// Whether a storage block covers `addr`.
    #[must_use]
    pub fn is_mapped(&self, addr: u16) -> bool {
        self.block_at(addr).is_some()
    }

    /// Whether any device binding (either direction) sits at `addr`.
    #[must_use]
    pub fn has_binding(&self, addr: u16) -> bool {
        self.io_read.contains_key(&addr) || self.io_write.contains_key(&addr)
    }

    /// Whether a device serves reads at `addr`.
    #[must_use]
    pub fn has_read_binding(&self, addr: u16) -> bool {
        self.io_read.contains_key(&addr)
    }

    /// Block covering `addr`, if any.
    #[must_use]
    pub fn block_at(&self, addr: u16) -> Option<&MemoryBlock> {
        self.blocks.iter().find(|b| b.contains(addr))
    }

    /// All blocks in registration order.
    #[must_use]
    pub fn blocks(&self) -> &[MemoryBlock] {
        &self.blocks
    }

    fn stored(&self, addr: u16) -> Result<u8, AccessError> {
        self.block_at(addr)
            .map(|b| b.get(addr))
            .ok_or(AccessError::NotMapped { addr })
    }
}
