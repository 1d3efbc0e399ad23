use crate::cartridge::Cartridge;
use crate::io::Io;

pub const VRAM_SIZE: usize = 0x2000;

/// System bus: routes CPU addresses to the cartridge, VRAM, or the IO
/// block, in that priority order. Addresses nothing claims land in a flat
/// backing array so WRAM, HRAM, echo RAM, and OAM behave as plain memory.
pub struct Bus {
    cart: Option<Cartridge>,
    vram: [u8; VRAM_SIZE],
    io: Io,
    fallback: Box<[u8; 0x10000]>,
}

impl Bus {
    pub fn new() -> Self {
        Self {
            cart: None,
            vram: [0; VRAM_SIZE],
            io: Io::new(),
            fallback: Box::new([0; 0x10000]),
        }
    }

    pub fn load_cart(&mut self, cart: Cartridge) {
        self.cart = Some(cart);
    }

    pub fn eject_cart(&mut self) -> Option<Cartridge> {
        self.cart.take()
    }

    pub fn cartridge_loaded(&self) -> bool {
        self.cart.is_some()
    }

    pub fn io(&self) -> &Io {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut Io {
        &mut self.io
    }

    pub fn vram(&self) -> &[u8] {
        &self.vram
    }

    pub fn vram_mut(&mut self) -> &mut [u8] {
        &mut self.vram
    }

    pub fn read_byte(&self, addr: u16) -> u8 {
        match addr {
            // Open bus when no cartridge is inserted.
            0x0000..=0x7FFF => self.cart.as_ref().map_or(0xFF, |c| c.read(addr)),
            0x8000..=0x9FFF => self.vram[(addr - 0x8000) as usize],
            0xA000..=0xBFFF if self.cart.is_some() => {
                self.cart.as_ref().map_or(0xFF, |c| c.read(addr))
            }
            0xFF00..=0xFF7F | 0xFFFF => self.io.read(addr),
            _ => self.fallback[addr as usize],
        }
    }

    pub fn write_byte(&mut self, addr: u16, val: u8) {
        match addr {
            // ROM-region writes drive the mapper's control registers.
            0x0000..=0x7FFF => {
                if let Some(cart) = self.cart.as_mut() {
                    cart.write(addr, val);
                }
            }
            0x8000..=0x9FFF => self.vram[(addr - 0x8000) as usize] = val,
            0xA000..=0xBFFF if self.cart.is_some() => {
                if let Some(cart) = self.cart.as_mut() {
                    cart.write(addr, val);
                }
            }
            0xFF00..=0xFF7F | 0xFFFF => self.io.write(addr, val),
            _ => self.fallback[addr as usize] = val,
        }
    }

    pub fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read_byte(addr) as u16;
        let hi = self.read_byte(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    pub fn write_word(&mut self, addr: u16, val: u16) {
        self.write_byte(addr, val as u8);
        self.write_byte(addr.wrapping_add(1), (val >> 8) as u8);
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
