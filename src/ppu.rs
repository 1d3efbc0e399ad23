use crate::bus::Bus;
use crate::interrupts::Interrupt;
use crate::lcd::{MODE_HBLANK, MODE_OAM, MODE_TRANSFER, MODE_VBLANK};

/// The renderer draws the full background map, not just the visible
/// 160x144 viewport.
pub const FRAME_WIDTH: usize = 256;
pub const FRAME_HEIGHT: usize = 256;

// Timing constants per LCD mode in T-cycles
const MODE2_CYCLES: u32 = 80; // OAM search
const MODE3_CYCLES: u32 = 172; // pixel transfer
const MODE0_CYCLES: u32 = 204; // HBlank
const LINE_CYCLES: u32 = 456; // one VBlank sub-period
const FIRST_VBLANK_LINE: u8 = 144;
const LINES_PER_FRAME: u8 = 154;

/// ARGB shades for the four DMG colors, white through black.
pub const DMG_PALETTE: [u32; 4] = [0xFFFFFFFF, 0xFFAAAAAA, 0xFF555555, 0xFF000000];

/// Background-only picture processor.
///
/// Driven in cycle batches after each CPU step. Walks the per-line mode
/// sequence OAM search -> pixel transfer -> HBlank, then ten 456-cycle
/// VBlank sub-periods for lines 144-153. A line's pixels are rendered in
/// one shot when pixel transfer begins.
pub struct Ppu {
    mode_clock: u32,
    framebuffer: Box<[u32; FRAME_WIDTH * FRAME_HEIGHT]>,
    frame_count: u64,
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            mode_clock: 0,
            framebuffer: Box::new([DMG_PALETTE[0]; FRAME_WIDTH * FRAME_HEIGHT]),
            frame_count: 0,
        }
    }

    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer[..]
    }

    /// Frames completed since power-on, bumped at each VBlank entry.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Advance the PPU by `cycles` CPU cycles. Dots accumulate only while
    /// the LCD is enabled.
    pub fn tick(&mut self, cycles: u32, bus: &mut Bus) {
        if !bus.io().lcd.lcd_enabled() {
            return;
        }
        self.mode_clock += cycles;

        loop {
            let mode = bus.io().lcd.mode();
            let budget = match mode {
                MODE_OAM => MODE2_CYCLES,
                MODE_TRANSFER => MODE3_CYCLES,
                MODE_HBLANK => MODE0_CYCLES,
                _ => LINE_CYCLES,
            };
            if self.mode_clock < budget {
                break;
            }
            self.mode_clock -= budget;

            match mode {
                MODE_OAM => {
                    self.render_scanline(bus);
                    bus.io_mut().lcd.set_mode(MODE_TRANSFER);
                }
                MODE_TRANSFER => {
                    let io = bus.io_mut();
                    io.lcd.set_mode(MODE_HBLANK);
                    if io.lcd.hblank_stat_enabled() {
                        io.interrupts.signal(Interrupt::LcdStat);
                    }
                }
                MODE_HBLANK => {
                    let io = bus.io_mut();
                    let ly = io.lcd.ly() + 1;
                    Self::advance_ly(io, ly);
                    if ly == FIRST_VBLANK_LINE {
                        io.lcd.set_mode(MODE_VBLANK);
                        io.interrupts.signal(Interrupt::VBlank);
                        if io.lcd.vblank_stat_enabled() {
                            io.interrupts.signal(Interrupt::LcdStat);
                        }
                        self.frame_count += 1;
                        #[cfg(feature = "ppu-trace")]
                        eprintln!("[ppu] vblank, frame {}", self.frame_count);
                    } else {
                        Self::enter_oam_search(io);
                    }
                }
                _ => {
                    let io = bus.io_mut();
                    let ly = io.lcd.ly() + 1;
                    if ly == LINES_PER_FRAME {
                        Self::advance_ly(io, 0);
                        Self::enter_oam_search(io);
                    } else {
                        Self::advance_ly(io, ly);
                    }
                }
            }
        }
    }

    fn advance_ly(io: &mut crate::io::Io, ly: u8) {
        io.lcd.set_ly(ly);
        if io.lcd.lyc_compare() && io.lcd.lyc_stat_enabled() {
            io.interrupts.signal(Interrupt::LcdStat);
        }
    }

    fn enter_oam_search(io: &mut crate::io::Io) {
        io.lcd.set_mode(MODE_OAM);
        if io.lcd.oam_stat_enabled() {
            io.interrupts.signal(Interrupt::LcdStat);
        }
    }

    /// Decode the current line's 32 background tile columns into the
    /// framebuffer.
    fn render_scanline(&mut self, bus: &Bus) {
        let lcd = &bus.io().lcd;
        let y = lcd.ly() as usize;
        if y >= FRAME_HEIGHT {
            return;
        }
        if !lcd.bg_enabled() {
            self.framebuffer[y * FRAME_WIDTH..(y + 1) * FRAME_WIDTH].fill(DMG_PALETTE[0]);
            return;
        }

        let vram = bus.vram();
        let map_base = (lcd.bg_tile_map_base() - 0x8000) as usize;
        let unsigned_indexing = lcd.unsigned_tile_data();
        let bgp = lcd.bgp;
        let tile_y = (y % 8) * 2;

        for col in 0..FRAME_WIDTH / 8 {
            let tile_index = vram[map_base + (y / 8) * 32 + col];
            let tile_addr = if unsigned_indexing {
                tile_index as usize * 16
            } else {
                (0x1000_i32 + tile_index as i8 as i32 * 16) as usize
            };
            let lo = vram[tile_addr + tile_y];
            let hi = vram[tile_addr + tile_y + 1];

            for px in 0..8 {
                let bit = 7 - px;
                let color_id = ((hi >> bit) & 1) << 1 | ((lo >> bit) & 1);
                let shade = (bgp >> (color_id * 2)) & 0x03;
                self.framebuffer[y * FRAME_WIDTH + col * 8 + px] = DMG_PALETTE[shade as usize];
            }
        }
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}
