//! Address-space routing properties: overlap, protection, reset and devices.

use std::cell::RefCell;
use std::rc::Rc;

use log as _;
use minicomp_core::{
    shared, AccessError, AddressSpace, IoDirection, Keyboard, LayoutError, MemIoDevice,
};
use proptest::prelude::*;
use rstest as _;
use thiserror as _;

/// A second interval that always shares at least one address with
/// `[a_start, a_start + a_len)`: it either starts inside it, or starts up to
/// `shift` bytes before it and runs past `a_start`.
fn intersecting(a_start: u16, a_len: usize, shift: i32, b_len: usize) -> (u16, usize) {
    let back = u16::try_from(shift.unsigned_abs()).unwrap_or(u16::MAX);
    if shift >= 0 {
        let inside = usize::from(back) % a_len;
        let b_start = u16::try_from(usize::from(a_start) + inside).expect("inside a");
        (b_start, b_len)
    } else {
        let b_start = a_start.saturating_sub(back);
        (b_start, usize::from(a_start - b_start) + b_len)
    }
}

proptest! {
    #[test]
    fn disjoint_blocks_both_map(
        a_start in 0u16..0x8000,
        a_len in 1usize..0x400,
        gap in 0usize..0x400,
        b_len in 1usize..0x400,
    ) {
        let b_start = usize::from(a_start) + a_len + gap;
        prop_assume!(b_start + b_len <= 0x1_0000);
        let b_start = u16::try_from(b_start).expect("bounded above");

        let mut space = AddressSpace::new();
        prop_assert!(space.add_block(a_start, a_len, false, None, 0).is_ok());
        prop_assert!(space.add_block(b_start, b_len, true, None, 0).is_ok());
    }

    #[test]
    fn intersecting_blocks_are_rejected(
        a_start in 0u16..0xE000,
        a_len in 1usize..0x800,
        shift in -0x7FF_i32..0x800,
        b_len in 1usize..0x400,
    ) {
        let (b_start, b_len) = intersecting(a_start, a_len, shift, b_len);

        let mut space = AddressSpace::new();
        space.add_block(a_start, a_len, false, None, 0).expect("first block fits");
        prop_assert_eq!(
            space.add_block(b_start, b_len, false, None, 0),
            Err(LayoutError::Overlap {
                start: b_start,
                length: b_len,
                existing_start: a_start,
                existing_length: a_len,
            })
        );
        prop_assert_eq!(space.blocks().len(), 1);
    }

    #[test]
    fn writable_addresses_read_back(addr in 0u16..0x1000, value: u8) {
        let mut space = AddressSpace::new();
        space.add_block(0, 0x1000, false, None, 0).expect("ram fits");
        space.write(addr, value, true).expect("ram is writable");
        prop_assert_eq!(space.read(addr), Ok(value));
    }

    #[test]
    fn read_only_needs_the_bypass(offset in 0u16..0x2000, value: u8) {
        let addr = 0xE000 + offset;
        let mut space = AddressSpace::new();
        space.add_block(0xE000, 0x2000, true, None, 0).expect("rom fits");

        prop_assert_eq!(
            space.write(addr, value, true),
            Err(AccessError::ReadOnly { addr })
        );
        prop_assert_eq!(space.read(addr), Ok(0));
        space.write(addr, value, false).expect("bypass writes rom");
        prop_assert_eq!(space.read(addr), Ok(value));
    }

    #[test]
    fn reset_zeroes_ram_and_preserves_rom(
        ram in proptest::collection::vec(any::<u8>(), 0x100),
        rom in proptest::collection::vec(any::<u8>(), 0x100),
    ) {
        let mut space = AddressSpace::new();
        space.add_block(0x0000, 0x100, false, Some(ram.as_slice()), 0).expect("ram fits");
        space.add_block(0xFF00, 0x100, true, Some(rom.as_slice()), 0).expect("rom fits");

        space.reset();

        for offset in 0u16..0x100 {
            prop_assert_eq!(space.peek(offset), Ok(0));
            prop_assert_eq!(space.peek(0xFF00 + offset), Ok(rom[usize::from(offset)]));
        }
    }

    #[test]
    fn peek_never_consumes(text in "[a-z]{1,8}", peeks in 1usize..16) {
        let keyboard = shared(Keyboard::new(&text));
        let mut space = AddressSpace::new();
        space.register_io(0x0401, keyboard.clone(), IoDirection::Read);

        let first = text.as_bytes()[0];
        for _ in 0..peeks {
            prop_assert_eq!(space.peek(0x0401), Ok(first));
        }
        prop_assert_eq!(keyboard.borrow().len(), text.len());
        prop_assert_eq!(space.read(0x0401), Ok(first));
        prop_assert_eq!(keyboard.borrow().len(), text.len() - 1);
    }
}

#[derive(Default)]
struct Recorder {
    written: Vec<u8>,
}

impl MemIoDevice for Recorder {
    fn write(&mut self, value: u8) {
        self.written.push(value);
    }
}

#[test]
fn one_device_serves_both_directions() {
    let device = Rc::new(RefCell::new(Keyboard::new("")));
    let mut space = AddressSpace::new();
    space.register_io(0x0010, device.clone(), IoDirection::Read);
    space.register_io(0x0010, device.clone(), IoDirection::Write);

    space.write(0x0010, b'z', true).expect("write binding accepts");
    // Keyboard ignores writes; the read side is still served by the device.
    assert_eq!(space.read(0x0010), Ok(0));
    assert!(space.has_binding(0x0010));
    assert!(!space.is_mapped(0x0010));
}

#[test]
fn last_registration_wins() {
    let first = shared(Recorder::default());
    let second = shared(Recorder::default());
    let mut space = AddressSpace::new();

    assert!(space
        .register_io(0x0400, first.clone(), IoDirection::Write)
        .is_none());
    assert!(space
        .register_io(0x0400, second.clone(), IoDirection::Write)
        .is_some());
    space.write(0x0400, 7, true).expect("bound write");

    assert!(first.borrow().written.is_empty());
    assert_eq!(second.borrow().written, vec![7]);
}

#[test]
fn write_binding_shadows_storage() {
    let screen = shared(Recorder::default());
    let mut space = AddressSpace::new();
    space.add_block(0, 0x1000, false, None, 0).expect("ram fits");
    space.register_io(0x0400, screen.clone(), IoDirection::Write);

    space.write(0x0400, b'A', true).expect("bound write");
    assert_eq!(screen.borrow().written, b"A".to_vec());
    assert_eq!(space.peek(0x0400), Ok(0));
}

#[test]
fn gap_reads_are_not_mapped() {
    let mut space = AddressSpace::new();
    space.add_block(0, 0x1000, false, None, 0).expect("ram fits");
    assert_eq!(
        space.read(0x1000),
        Err(AccessError::NotMapped { addr: 0x1000 })
    );
    assert_eq!(
        space.write(0x1000, 1, false),
        Err(AccessError::NotMapped { addr: 0x1000 })
    );
}
