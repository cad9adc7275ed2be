//! Register file of the reference processor.

/// Status bit: carry.
pub const FLAG_C: u8 = 1 << 0;
/// Status bit: zero result.
pub const FLAG_Z: u8 = 1 << 1;
/// Status bit: interrupt disable.
pub const FLAG_I: u8 = 1 << 2;
/// Status bit: decimal mode (stored, never honoured).
pub const FLAG_D: u8 = 1 << 3;
/// Status bit: break, only meaningful in pushed copies.
pub const FLAG_B: u8 = 1 << 4;
/// Status bit: signed overflow.
pub const FLAG_V: u8 = 1 << 6;
/// Status bit: negative result.
pub const FLAG_N: u8 = 1 << 7;

/// Status register value after reset.
pub const FLAGS_RESET: u8 = FLAG_I | FLAG_Z;
/// Stack pointer value after reset; the stack lives in page one.
pub const SP_RESET: u8 = 0xFF;
/// Base address of the hardware stack page.
pub const STACK_PAGE: u16 = 0x0100;

/// Side-effect-free view of the processor registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    pc: u16,
    sp: u8,
    a: u8,
    x: u8,
    y: u8,
    flags: u8,
}

impl RegisterFile {
    /// Register state after reset with execution starting at `entry`.
    #[must_use]
    pub const fn at_entry(entry: u16) -> Self {
        Self {
            pc: entry,
            sp: SP_RESET,
            a: 0,
            x: 0,
            y: 0,
            flags: FLAGS_RESET,
        }
    }

    /// Program counter.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes the program counter.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Stack pointer (offset into the stack page).
    #[must_use]
    pub const fn sp(&self) -> u8 {
        self.sp
    }

    /// Writes the stack pointer.
    pub const fn set_sp(&mut self, value: u8) {
        self.sp = value;
    }

    /// Accumulator.
    #[must_use]
    pub const fn a(&self) -> u8 {
        self.a
    }

    /// Writes the accumulator.
    pub const fn set_a(&mut self, value: u8) {
        self.a = value;
    }

    /// X index register.
    #[must_use]
    pub const fn x(&self) -> u8 {
        self.x
    }

    /// Writes the X index register.
    pub const fn set_x(&mut self, value: u8) {
        self.x = value;
    }

    /// Y index register.
    #[must_use]
    pub const fn y(&self) -> u8 {
        self.y
    }

    /// Writes the Y index register.
    pub const fn set_y(&mut self, value: u8) {
        self.y = value;
    }

    /// Raw status register.
    #[must_use]
    pub const fn flags(&self) -> u8 {
        self.flags
    }

    /// Overwrites the status register.
    pub const fn set_flags(&mut self, value: u8) {
        self.flags = value;
    }

    /// Returns `true` when `flag` is set.
    #[must_use]
    pub const fn flag_is_set(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }

    /// Sets or clears one status bit.
    pub const fn set_flag(&mut self, flag: u8, enabled: bool) {
        if enabled {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }

    /// Updates Z and N from a result byte.
    pub const fn set_nz(&mut self, value: u8) {
        self.set_flag(FLAG_Z, value == 0);
        self.set_flag(FLAG_N, value & 0x80 != 0);
    }
}
