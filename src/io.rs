use crate::interrupts::Interrupts;
use crate::joypad::Joypad;
use crate::lcd::Lcd;
use crate::serial::Serial;
use crate::timer::Timer;

/// IO register block covering 0xFF00-0xFF7F plus IE at 0xFFFF.
///
/// Routed registers go to their owning unit; anything unrouted falls into a
/// raw byte array so programs that poke unimplemented registers read back
/// what they wrote.
pub struct Io {
    pub joypad: Joypad,
    pub serial: Serial,
    pub timer: Timer,
    pub interrupts: Interrupts,
    pub lcd: Lcd,
    data: [u8; 0x80],
}

impl Io {
    pub fn new() -> Self {
        Self {
            joypad: Joypad::new(),
            serial: Serial::new(),
            timer: Timer::new(),
            interrupts: Interrupts::new(),
            lcd: Lcd::new(),
            data: [0; 0x80],
        }
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF00 => self.joypad.read(),
            0xFF01 | 0xFF02 => self.serial.read(addr),
            0xFF04..=0xFF07 => self.timer.read(addr),
            // Unused IF bits read back set.
            0xFF0F => self.interrupts.if_reg | 0xE0,
            0xFF40..=0xFF4B => self.lcd.read(addr),
            0xFFFF => self.interrupts.ie_reg,
            0xFF00..=0xFF7F => self.data[(addr - 0xFF00) as usize],
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, addr: u16, val: u8) {
        match addr {
            0xFF00 => self.joypad.write(val),
            0xFF01 | 0xFF02 => self.serial.write(addr, val, &mut self.interrupts),
            0xFF04..=0xFF07 => self.timer.write(addr, val),
            0xFF0F => self.interrupts.if_reg = val,
            0xFF40..=0xFF4B => self.lcd.write(addr, val),
            0xFFFF => self.interrupts.ie_reg = val,
            0xFF00..=0xFF7F => self.data[(addr - 0xFF00) as usize] = val,
            _ => {}
        }
    }
}

impl Default for Io {
    fn default() -> Self {
        Self::new()
    }
}
