//! Fault taxonomy for address-space setup, memory access and processor steps.

use thiserror::Error;

/// Layout violations raised while declaring memory blocks.
///
/// These are programmer errors: a machine with an inconsistent layout is
/// never handed to the command layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum LayoutError {
    /// The new block intersects an existing block.
    #[error(
        "block {start:#06x}+{length:#x} overlaps existing block {existing_start:#06x}+{existing_length:#x}"
    )]
    Overlap {
        /// Start of the rejected block.
        start: u16,
        /// Length of the rejected block.
        length: usize,
        /// Start of the block it collides with.
        existing_start: u16,
        /// Length of the block it collides with.
        existing_length: usize,
    },
    /// The block extends past the end of the 64 KiB address space.
    #[error("block {start:#06x}+{length:#x} leaves the address space")]
    OutOfBounds {
        /// Start of the rejected block.
        start: u16,
        /// Length of the rejected block.
        length: usize,
    },
    /// The initial contents do not fit at the requested offset.
    #[error("initial data of {data_len} bytes at offset {offset} exceeds block length {length}")]
    InitialDataTooLarge {
        /// Declared block length.
        length: usize,
        /// Insertion offset into the block.
        offset: usize,
        /// Length of the supplied data.
        data_len: usize,
    },
}

/// Recoverable access failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum AccessError {
    /// Write targeted a read-only block with protection enabled.
    #[error("address {addr:#06x} is read-only")]
    ReadOnly {
        /// Rejected address.
        addr: u16,
    },
    /// No block or binding covers the address.
    #[error("address {addr:#06x} is not mapped")]
    NotMapped {
        /// Rejected address.
        addr: u16,
    },
}

impl AccessError {
    /// Address that caused the failure.
    #[must_use]
    pub const fn addr(self) -> u16 {
        match self {
            Self::ReadOnly { addr } | Self::NotMapped { addr } => addr,
        }
    }
}

/// Faults raised by a processor while stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CpuFault {
    /// The fetched opcode is not implemented by the processor.
    #[error("illegal opcode {opcode:#04x} at {pc:#06x}")]
    IllegalOpcode {
        /// Offending opcode byte.
        opcode: u8,
        /// Address it was fetched from.
        pc: u16,
    },
    /// An operand fetch, load or store was rejected by the address space.
    #[error("memory fault at pc {pc:#06x}: {source}")]
    Memory {
        /// Program counter of the faulting instruction.
        pc: u16,
        /// Underlying access failure.
        source: AccessError,
    },
}

/// Failures while building, reloading or patching a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum MachineError {
    /// The firmware image does not fit in the ROM block.
    #[error("firmware image of {len} bytes exceeds rom capacity of {capacity} bytes")]
    FirmwareTooLarge {
        /// Image length.
        len: usize,
        /// ROM block length.
        capacity: usize,
    },
    /// The configured layout is inconsistent.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// An image could not be written into mapped storage.
    #[error(transparent)]
    Access(#[from] AccessError),
}
