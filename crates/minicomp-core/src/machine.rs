//! Machine aggregate: the default layout, its devices and a processor.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::execute::Cpu;
use crate::fault::{CpuFault, MachineError};
use crate::memory::{
    AddressSpace, KEYBOARD_ADDR, RAM_LENGTH, RAM_START, ROM_LENGTH, ROM_ORIGIN, SCREEN_ADDR,
};
use crate::peripherals::{shared, IoDirection, Keyboard, Screen};
use crate::processor::{Processor, StepOutcome};

/// Text queued in the keyboard at power-on.
pub const DEFAULT_KEYBOARD_PRELOAD: &str = "Hello, World!!!";

/// Built-in firmware: copy every non-zero keyboard byte to the screen.
///
/// ```text
/// e000  LDA $0401
/// e003  BEQ $e000
/// e005  STA $0400
/// e008  JMP $e000
/// ```
pub const ECHO_FIRMWARE: &[u8] = &[
    0xAD, 0x01, 0x04, // LDA $0401
    0xF0, 0xFB, // BEQ -5
    0x8D, 0x00, 0x04, // STA $0400
    0x4C, 0x00, 0xE0, // JMP $e000
];

/// Memory layout and device placement of a machine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineConfig {
    /// Start of the writable block.
    pub ram_start: u16,
    /// Length of the writable block.
    pub ram_length: usize,
    /// Origin of the firmware block; also the processor entry point.
    pub rom_origin: u16,
    /// Length of the firmware block.
    pub rom_length: usize,
    /// Write-bound screen register.
    pub screen_addr: u16,
    /// Read-bound keyboard register.
    pub keyboard_addr: u16,
    /// Keyboard contents after power-on and reset.
    pub keyboard_preload: String,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            ram_start: RAM_START,
            ram_length: RAM_LENGTH,
            rom_origin: ROM_ORIGIN,
            rom_length: ROM_LENGTH,
            screen_addr: SCREEN_ADDR,
            keyboard_addr: KEYBOARD_ADDR,
            keyboard_preload: DEFAULT_KEYBOARD_PRELOAD.to_owned(),
        }
    }
}

/// A complete machine: address space, devices, firmware and processor.
///
/// The address space is rebuilt wholesale on [`Machine::reset`] and
/// [`Machine::reload`]; the device handles survive and are rebound.
#[derive(Debug)]
pub struct Machine<P = Cpu> {
    config: MachineConfig,
    firmware: Vec<u8>,
    space: AddressSpace,
    processor: P,
    keyboard: Rc<RefCell<Keyboard>>,
    screen: Rc<RefCell<Screen>>,
}

impl Machine<Cpu> {
    /// Boots the reference processor over `firmware`.
    ///
    /// # Errors
    ///
    /// See [`Machine::with_processor`].
    pub fn boot(config: MachineConfig, firmware: &[u8]) -> Result<Self, MachineError> {
        let cpu = Cpu::new(config.rom_origin);
        Self::with_processor(config, firmware, cpu)
    }
}

impl<P: Processor> Machine<P> {
    /// Builds a machine around an arbitrary processor.
    ///
    /// # Errors
    ///
    /// [`MachineError::FirmwareTooLarge`] when the image exceeds the ROM
    /// block, [`MachineError::Layout`] when the configured blocks collide.
    pub fn with_processor(
        config: MachineConfig,
        firmware: &[u8],
        processor: P,
    ) -> Result<Self, MachineError> {
        let keyboard = shared(Keyboard::new(&config.keyboard_preload));
        let screen = shared(Screen::new());
        check_fits(&config, firmware)?;
        let space = build_space(&config, firmware, &keyboard, &screen)?;
        log::info!(
            "booted {} byte firmware at {:#06x}",
            firmware.len(),
            config.rom_origin
        );
        Ok(Self {
            config,
            firmware: firmware.to_vec(),
            space,
            processor,
            keyboard,
            screen,
        })
    }

    /// Clears RAM, restores the firmware, and resets processor and keyboard.
    ///
    /// Patches applied with [`Machine::patch`] are discarded.
    ///
    /// # Errors
    ///
    /// [`MachineError::Layout`] if the layout can no longer be built.
    pub fn reset(&mut self) -> Result<(), MachineError> {
        self.space = build_space(&self.config, &self.firmware, &self.keyboard, &self.screen)?;
        self.processor.reset();
        self.keyboard.borrow_mut().reset();
        log::info!("machine reset");
        Ok(())
    }

    /// Replaces the firmware image and resets the machine.
    ///
    /// # Errors
    ///
    /// [`MachineError::FirmwareTooLarge`] leaves the machine untouched.
    pub fn reload(&mut self, firmware: Vec<u8>) -> Result<(), MachineError> {
        check_fits(&self.config, &firmware)?;
        self.firmware = firmware;
        self.reset()
    }

    /// Overwrites ROM from its origin without touching the processor.
    ///
    /// # Errors
    ///
    /// [`MachineError::FirmwareTooLarge`] when the image exceeds the ROM block.
    pub fn patch(&mut self, image: &[u8]) -> Result<(), MachineError> {
        check_fits(&self.config, image)?;
        self.space.load(self.config.rom_origin, image)?;
        log::debug!("patched {} bytes at {:#06x}", image.len(), self.config.rom_origin);
        Ok(())
    }

    /// Runs one instruction.
    ///
    /// # Errors
    ///
    /// Propagates the processor's [`CpuFault`].
    pub fn step(&mut self, capture_stats: bool) -> Result<StepOutcome, CpuFault> {
        self.processor.step(&mut self.space, capture_stats)
    }

    /// Program counter of the processor.
    #[must_use]
    pub fn pc(&self) -> u16 {
        self.processor.registers().pc()
    }

    /// Layout in use.
    #[must_use]
    pub const fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Current firmware image (without patches).
    #[must_use]
    pub fn firmware(&self) -> &[u8] {
        &self.firmware
    }

    /// Address space.
    #[must_use]
    pub const fn space(&self) -> &AddressSpace {
        &self.space
    }

    /// Mutable address space.
    pub const fn space_mut(&mut self) -> &mut AddressSpace {
        &mut self.space
    }

    /// Processor.
    #[must_use]
    pub const fn processor(&self) -> &P {
        &self.processor
    }

    /// Keyboard device.
    #[must_use]
    pub fn keyboard(&self) -> Ref<'_, Keyboard> {
        self.keyboard.borrow()
    }

    /// Mutable keyboard device.
    #[must_use]
    pub fn keyboard_mut(&self) -> RefMut<'_, Keyboard> {
        self.keyboard.borrow_mut()
    }

    /// Drains everything written to the screen since the last call.
    #[must_use]
    pub fn take_screen_output(&self) -> String {
        self.screen.borrow_mut().take_output()
    }
}

fn check_fits(config: &MachineConfig, image: &[u8]) -> Result<(), MachineError> {
    if image.len() > config.rom_length {
        return Err(MachineError::FirmwareTooLarge {
            len: image.len(),
            capacity: config.rom_length,
        });
    }
    Ok(())
}

fn build_space(
    config: &MachineConfig,
    firmware: &[u8],
    keyboard: &Rc<RefCell<Keyboard>>,
    screen: &Rc<RefCell<Screen>>,
) -> Result<AddressSpace, MachineError> {
    let mut space = AddressSpace::new();
    space.add_block(config.ram_start, config.ram_length, false, None, 0)?;
    space.add_block(config.rom_origin, config.rom_length, true, Some(firmware), 0)?;
    space.register_io(config.screen_addr, screen.clone(), IoDirection::Write);
    space.register_io(config.keyboard_addr, keyboard.clone(), IoDirection::Read);
    Ok(space)
}
