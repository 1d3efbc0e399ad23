//! Cycle-driven Game Boy (DMG) emulation core.
//!
//! This crate contains the platform-agnostic emulator logic: CPU, bus,
//! timer, interrupts, background-only PPU, and ROM-only/MBC1 cartridges.
//! Frontends drive the core through the [`machine`] facade, one
//! instruction at a time.

/// System bus and address dispatch.
pub mod bus;

/// Cartridge mappers (ROM-only, MBC1) and header parsing.
pub mod cartridge;

/// LR35902 CPU core.
pub mod cpu;

/// Pluggable sink for diagnostic text emitted over the serial port.
pub mod diagnostics;

/// Interrupt controller: IF/IE and the IME state machine.
pub mod interrupts;

/// IO register block at 0xFF00-0xFF7F plus IE.
pub mod io;

/// Joypad input register and edge-triggered interrupt behavior.
pub mod joypad;

/// LCD register block with bit accessors.
pub mod lcd;

/// High-level facade that wires CPU, bus, and PPU into a single machine.
pub mod machine;

/// Opcode metadata table and disassembly helper.
pub mod opcodes;

/// Pixel Processing Unit (PPU) emulation.
pub mod ppu;

/// Serial unit and link cable plumbing.
pub mod serial;

/// Divider/timer unit.
pub mod timer;
