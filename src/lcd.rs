/// PPU mode numbers as they appear in STAT bits 0-1.
pub const MODE_HBLANK: u8 = 0;
pub const MODE_VBLANK: u8 = 1;
pub const MODE_OAM: u8 = 2;
pub const MODE_TRANSFER: u8 = 3;

/// LCD register block at 0xFF40-0xFF4B.
///
/// Register bits are exposed through accessor methods rather than raw
/// masks at the call sites, so the PPU and CPU read the same definitions.
pub struct Lcd {
    lcdc: u8,
    stat: u8,
    pub scy: u8,
    pub scx: u8,
    ly: u8,
    pub lyc: u8,
    pub bgp: u8,
    pub obp0: u8,
    pub obp1: u8,
    pub wy: u8,
    pub wx: u8,
}

impl Lcd {
    pub fn new() -> Self {
        Self {
            // Post-boot: LCD on, background on, tile data at 0x8000.
            lcdc: 0x91,
            stat: 0x80 | MODE_OAM,
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: 0xFC,
            obp0: 0xFF,
            obp1: 0xFF,
            wy: 0,
            wx: 0,
        }
    }

    pub fn lcd_enabled(&self) -> bool {
        self.lcdc & 0x80 != 0
    }

    pub fn window_tile_map_base(&self) -> u16 {
        if self.lcdc & 0x40 != 0 { 0x9C00 } else { 0x9800 }
    }

    /// Tile data addressing: true = unsigned indices from 0x8000,
    /// false = signed indices around 0x9000.
    pub fn unsigned_tile_data(&self) -> bool {
        self.lcdc & 0x10 != 0
    }

    pub fn bg_tile_map_base(&self) -> u16 {
        if self.lcdc & 0x08 != 0 { 0x9C00 } else { 0x9800 }
    }

    pub fn bg_enabled(&self) -> bool {
        self.lcdc & 0x01 != 0
    }

    pub fn ly(&self) -> u8 {
        self.ly
    }

    pub fn set_ly(&mut self, ly: u8) {
        self.ly = ly;
        self.update_coincidence();
    }

    pub fn mode(&self) -> u8 {
        self.stat & 0x03
    }

    pub fn set_mode(&mut self, mode: u8) {
        self.stat = (self.stat & !0x03) | (mode & 0x03);
    }

    pub fn lyc_compare(&self) -> bool {
        self.ly == self.lyc
    }

    /// STAT interrupt source enables (bits 3-6).
    pub fn hblank_stat_enabled(&self) -> bool {
        self.stat & 0x08 != 0
    }

    pub fn vblank_stat_enabled(&self) -> bool {
        self.stat & 0x10 != 0
    }

    pub fn oam_stat_enabled(&self) -> bool {
        self.stat & 0x20 != 0
    }

    pub fn lyc_stat_enabled(&self) -> bool {
        self.stat & 0x40 != 0
    }

    fn update_coincidence(&mut self) {
        if self.lyc_compare() {
            self.stat |= 0x04;
        } else {
            self.stat &= !0x04;
        }
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF40 => self.lcdc,
            0xFF41 => self.stat | 0x80,
            0xFF42 => self.scy,
            0xFF43 => self.scx,
            0xFF44 => self.ly,
            0xFF45 => self.lyc,
            0xFF47 => self.bgp,
            0xFF48 => self.obp0,
            0xFF49 => self.obp1,
            0xFF4A => self.wy,
            0xFF4B => self.wx,
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, addr: u16, val: u8) {
        match addr {
            0xFF40 => self.lcdc = val,
            // Only the interrupt-source enables are writable.
            0xFF41 => self.stat = (self.stat & 0x87) | (val & 0x78),
            0xFF42 => self.scy = val,
            0xFF43 => self.scx = val,
            // LY is read-only.
            0xFF44 => {}
            0xFF45 => {
                self.lyc = val;
                self.update_coincidence();
            }
            0xFF47 => self.bgp = val,
            0xFF48 => self.obp0 = val,
            0xFF49 => self.obp1 = val,
            0xFF4A => self.wy = val,
            0xFF4B => self.wx = val,
            _ => {}
        }
    }
}

impl Default for Lcd {
    fn default() -> Self {
        Self::new()
    }
}
