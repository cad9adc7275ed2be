//! Default machine layout, echo firmware and processor contract.

use log as _;
use minicomp_core::{
    AccessError, CpuFault, Machine, MachineConfig, Processor, ECHO_FIRMWARE, KEYBOARD_ADDR,
    SCREEN_ADDR,
};
use proptest as _;
use rstest::rstest;
use thiserror as _;

fn boot() -> Machine {
    Machine::boot(MachineConfig::default(), ECHO_FIRMWARE).expect("default layout boots")
}

#[rstest]
#[case(0x0000, true)]
#[case(0x0FFF, true)]
#[case(SCREEN_ADDR, true)]
#[case(0x1000, false)]
#[case(0xDFFF, false)]
#[case(0xE000, true)]
#[case(0xFFFF, true)]
fn default_layout_maps_ram_and_rom_only(#[case] addr: u16, #[case] mapped: bool) {
    assert_eq!(boot().space().is_mapped(addr), mapped);
}

#[test]
fn devices_sit_at_their_registers() {
    let machine = boot();
    assert!(machine.space().has_read_binding(KEYBOARD_ADDR));
    assert!(machine.space().has_binding(SCREEN_ADDR));
    assert!(!machine.space().has_read_binding(SCREEN_ADDR));
    assert_eq!(machine.space().peek(KEYBOARD_ADDR), Ok(b'H'));
}

#[test]
fn echo_runs_until_keyboard_drains() {
    let mut machine = boot();
    for _ in 0..200 {
        machine.step(false).expect("echo loop never faults");
    }
    assert_eq!(machine.take_screen_output(), "Hello, World!!!");
    assert!(machine.keyboard().is_empty());

    machine.keyboard_mut().extend("ok");
    for _ in 0..20 {
        machine.step(true).expect("echo loop never faults");
    }
    assert_eq!(machine.take_screen_output(), "ok");
}

#[test]
fn rom_write_from_firmware_faults() {
    let mut machine = boot();
    // STA $e000
    machine.patch(&[0x8D, 0x00, 0xE0]).expect("patch fits");
    assert_eq!(
        machine.step(false),
        Err(CpuFault::Memory {
            pc: 0xE000,
            source: AccessError::ReadOnly { addr: 0xE000 }
        })
    );
    assert_eq!(machine.pc(), 0xE000);
}

#[test]
fn cycles_accumulate_across_steps() {
    let mut machine = boot();
    machine.step(false).expect("lda retires");
    machine.step(false).expect("beq retires");
    assert_eq!(machine.processor().cycles(), 4 + 2);
}
