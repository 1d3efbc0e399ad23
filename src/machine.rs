use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::cpu::Cpu;
use crate::joypad::Button;
use crate::ppu::Ppu;
use crate::serial::LinkPort;

/// DMG master clock.
pub const CLOCK_SPEED_HZ: u32 = 4_194_304;

/// One LCD refresh: 154 lines of 456 cycles.
pub const CYCLES_PER_FRAME: u32 = 70224;

/// The assembled console: CPU, bus, and PPU.
///
/// `step()` runs one instruction and then advances the timer and PPU by
/// its cycle cost, so interrupts raised by those units are seen at the
/// start of the following instruction.
pub struct Machine {
    pub cpu: Cpu,
    pub bus: Bus,
    pub ppu: Ppu,
}

impl Machine {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            bus: Bus::new(),
            ppu: Ppu::new(),
        }
    }

    pub fn clock_speed_hz(&self) -> u32 {
        CLOCK_SPEED_HZ
    }

    pub fn load_cartridge(&mut self, cart: Cartridge) {
        self.bus.load_cart(cart);
    }

    pub fn connect_link(&mut self, port: Box<dyn LinkPort + Send>) {
        self.bus.io_mut().serial.connect(port);
    }

    pub fn set_button(&mut self, button: Button, down: bool) {
        let io = self.bus.io_mut();
        io.joypad.set_button(button, down, &mut io.interrupts);
    }

    /// Execute one instruction and catch the peripherals up. Returns the
    /// cycle cost.
    pub fn step(&mut self) -> u32 {
        let cycles = self.cpu.step(&mut self.bus);
        let io = self.bus.io_mut();
        io.timer.tick(cycles, &mut io.interrupts);
        self.ppu.tick(cycles, &mut self.bus);
        cycles
    }

    /// Run approximately one frame's worth of cycles. Bounded by cycle
    /// count rather than VBlank so it terminates with the LCD disabled.
    pub fn run_frame(&mut self) {
        let mut budget = CYCLES_PER_FRAME;
        while budget > 0 {
            budget = budget.saturating_sub(self.step());
        }
    }

    /// Reset to the post-boot state, keeping the loaded cartridge.
    pub fn reset(&mut self) {
        let cart = self.bus.eject_cart();
        self.cpu = Cpu::new();
        self.bus = Bus::new();
        self.ppu = Ppu::new();
        if let Some(c) = cart {
            self.bus.load_cart(c);
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
