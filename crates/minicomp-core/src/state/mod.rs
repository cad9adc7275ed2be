//! Processor state model.

/// Register file and status bits.
pub mod registers;

pub use registers::{
    RegisterFile, FLAGS_RESET, FLAG_B, FLAG_C, FLAG_D, FLAG_I, FLAG_N, FLAG_V, FLAG_Z, SP_RESET,
    STACK_PAGE,
};
