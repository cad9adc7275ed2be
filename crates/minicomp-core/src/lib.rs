//! Core crate for minicomp: a 64 KiB address space with read-only
//! protection and memory-mapped devices, plus a small reference processor.

/// Memory blocks, device routing and the default memory map.
pub mod memory;
pub use memory::{
    to_domain, AddressSpace, MemoryBlock, ADDRESS_MAX, ADDRESS_MIN, ADDRESS_SPACE_BYTES,
    KEYBOARD_ADDR, RAM_LENGTH, RAM_START, ROM_LENGTH, ROM_ORIGIN, SCREEN_ADDR,
};

/// Memory-mapped device contract and stock devices.
pub mod peripherals;
pub use peripherals::{shared, IoDirection, Keyboard, MemIoDevice, Screen, SharedDevice};

/// Fault taxonomy for setup, access and execution failures.
pub mod fault;
pub use fault::{AccessError, CpuFault, LayoutError, MachineError};

/// Register file and status bits.
pub mod state;
pub use state::{RegisterFile, FLAG_C, FLAG_I, FLAG_N, FLAG_V, FLAG_Z};

/// Processor contract consumed by hosts.
pub mod processor;
pub use processor::{Processor, StepOutcome};

/// Opcode decode table.
pub mod decoder;
pub use decoder::{decode, AddressingMode, Instruction, Operation};

/// Fixed instruction cycle costs.
pub mod timing;
pub use timing::{cycle_cost, CycleCostKind};

/// Reference processor.
pub mod execute;
pub use execute::{Cpu, BRK_VECTOR};

/// Machine aggregate and its configuration.
pub mod machine;
pub use machine::{Machine, MachineConfig, DEFAULT_KEYBOARD_PRELOAD, ECHO_FIRMWARE};

#[cfg(test)]
use proptest as _;
