//! Memory model: storage blocks, device routing and the default map.

/// Contiguous RAM/ROM storage.
pub mod block;
/// Default memory map and domain helpers.
pub mod map;
/// Routed address space.
pub mod space;

pub use block::MemoryBlock;
pub use map::{
    to_domain, ADDRESS_MAX, ADDRESS_MIN, ADDRESS_SPACE_BYTES, KEYBOARD_ADDR, RAM_LENGTH,
    RAM_START, ROM_LENGTH, ROM_ORIGIN, SCREEN_ADDR,
};
pub use space::AddressSpace;
