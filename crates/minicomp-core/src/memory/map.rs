//! Default machine memory map and address-domain helpers.

/// Lowest valid address of the emulated address space.
pub const ADDRESS_MIN: u16 = 0x0000;
/// Highest valid address of the emulated address space.
pub const ADDRESS_MAX: u16 = 0xFFFF;
/// Size in bytes of the flat address space (64 KiB).
pub const ADDRESS_SPACE_BYTES: usize = ADDRESS_MAX as usize + 1;

/// Inclusive start address of the default RAM block.
pub const RAM_START: u16 = 0x0000;
/// Length in bytes of the default RAM block.
pub const RAM_LENGTH: usize = 0x1000;
/// Origin of the firmware (ROM) block.
pub const ROM_ORIGIN: u16 = 0xE000;
/// Length of the ROM block; it runs to the top of the address space.
pub const ROM_LENGTH: usize = ADDRESS_SPACE_BYTES - ROM_ORIGIN as usize;

/// Write-bound screen register.
pub const SCREEN_ADDR: u16 = 0x0400;
/// Read-bound keyboard register.
pub const KEYBOARD_ADDR: u16 = 0x0401;

/// Converts a signed address computation into a domain address.
///
/// Returns `None` for indices below `0` or above `0xFFFF`.
#[must_use]
pub fn to_domain(index: i64) -> Option<u16> {
    u16::try_from(index).ok()
}

const _: () = assert_default_layout();

const fn assert_default_layout() {
    assert!(
        RAM_START as usize + RAM_LENGTH <= ROM_ORIGIN as usize,
        "ram must end before rom"
    );
    assert!(
        ROM_ORIGIN as usize + ROM_LENGTH == ADDRESS_SPACE_BYTES,
        "rom must run to the top of the address space"
    );
    assert!(
        (SCREEN_ADDR as usize) < RAM_LENGTH && (KEYBOARD_ADDR as usize) < RAM_LENGTH,
        "device registers sit inside ram"
    );
}

#[cfg(test)]
mod tests {
    use super::{to_domain, ROM_LENGTH, ROM_ORIGIN};

    #[test]
    fn rom_covers_the_top_eight_kib() {
        assert_eq!(ROM_ORIGIN, 0xE000);
        assert_eq!(ROM_LENGTH, 0x2000);
    }

    #[test]
    fn domain_conversion_rejects_both_sides() {
        assert_eq!(to_domain(-1), None);
        assert_eq!(to_domain(0), Some(0));
        assert_eq!(to_domain(0xFFFF), Some(0xFFFF));
        assert_eq!(to_domain(0x1_0000), None);
    }
}
