use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

/// Cartridge hardware named by header byte 0x147.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapperType {
    RomOnly,
    Mbc1,
    Mbc1Ram,
    Mbc1RamBattery,
}

impl MapperType {
    fn from_header(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(MapperType::RomOnly),
            0x01 => Some(MapperType::Mbc1),
            0x02 => Some(MapperType::Mbc1Ram),
            0x03 => Some(MapperType::Mbc1RamBattery),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum CartridgeError {
    /// Header byte 0x147 names hardware this core does not emulate.
    UnsupportedType(u8),
    /// Header byte 0x148 disagrees with the actual image length.
    SizeMismatch { expected: usize, actual: usize },
    /// Header byte 0x148 is outside the defined 0x00-0x08 range.
    InvalidSizeCode(u8),
    /// The image is too short to contain a header at all.
    Truncated(usize),
    Io(io::Error),
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::UnsupportedType(byte) => {
                write!(
                    f,
                    "unsupported cartridge type {byte:#04X} (only ROM-only and MBC1 are emulated)"
                )
            }
            CartridgeError::SizeMismatch { expected, actual } => {
                write!(
                    f,
                    "ROM size mismatch: header declares {expected} bytes but image is {actual} bytes"
                )
            }
            CartridgeError::InvalidSizeCode(byte) => {
                write!(f, "ROM size code {byte:#04X} is not a defined cartridge size")
            }
            CartridgeError::Truncated(len) => {
                write!(f, "ROM image of {len} bytes is too short to hold a cartridge header")
            }
            CartridgeError::Io(err) => write!(f, "failed to read ROM image: {err}"),
        }
    }
}

impl Error for CartridgeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CartridgeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CartridgeError {
    fn from(err: io::Error) -> Self {
        CartridgeError::Io(err)
    }
}

/// Parsed view of the header fields this core cares about.
pub struct Header<'a> {
    data: &'a [u8],
}

impl<'a> Header<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, CartridgeError> {
        if data.len() < 0x150 {
            return Err(CartridgeError::Truncated(data.len()));
        }
        Ok(Self { data })
    }

    pub fn title(&self) -> String {
        self.data[0x134..=0x143]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
            .collect()
    }

    pub fn cart_type(&self) -> u8 {
        self.data[0x147]
    }

    pub fn size_code(&self) -> u8 {
        self.data[0x148]
    }

    /// Declared ROM size in bytes: 32 KiB shifted by the size byte.
    /// `None` when the byte is past 0x08, the largest defined code.
    pub fn rom_size(&self) -> Option<usize> {
        if self.size_code() <= 0x08 {
            Some((32 * 1024) << self.size_code())
        } else {
            None
        }
    }

    /// Number of 8 KiB external RAM banks.
    pub fn ram_banks(&self) -> usize {
        match self.data[0x149] {
            0x02 => 1,
            0x03 => 4,
            0x04 => 16,
            0x05 => 8,
            _ => 0,
        }
    }
}

/// Banking state, one variant per emulated mapper.
enum Mapper {
    RomOnly,
    Mbc1 {
        rom_bank: u8,
        secondary: u8,
        mode: u8,
        ram_enabled: bool,
    },
}

pub struct Cartridge {
    rom: Vec<u8>,
    ram: Vec<u8>,
    rom_banks: usize,
    ram_banks: usize,
    mapper: Mapper,
    title: String,
}

impl Cartridge {
    /// Validate the header and take ownership of the ROM image.
    pub fn load(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        let header = Header::new(&rom)?;

        let mapper_type = MapperType::from_header(header.cart_type())
            .ok_or(CartridgeError::UnsupportedType(header.cart_type()))?;
        let expected = header
            .rom_size()
            .ok_or(CartridgeError::InvalidSizeCode(header.size_code()))?;
        if expected != rom.len() {
            return Err(CartridgeError::SizeMismatch {
                expected,
                actual: rom.len(),
            });
        }

        let rom_banks = expected / ROM_BANK_SIZE;
        let ram_banks = header.ram_banks();
        let title = header.title();
        let mapper = match mapper_type {
            MapperType::RomOnly => Mapper::RomOnly,
            MapperType::Mbc1 | MapperType::Mbc1Ram | MapperType::Mbc1RamBattery => Mapper::Mbc1 {
                rom_bank: 1,
                secondary: 0,
                mode: 0,
                ram_enabled: false,
            },
        };

        log::info!(
            "loaded \"{title}\" ({mapper_type:?}, {rom_banks} ROM banks, {ram_banks} RAM banks)"
        );

        Ok(Self {
            rom,
            ram: vec![0; ram_banks * RAM_BANK_SIZE],
            rom_banks,
            ram_banks,
            mapper,
            title,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, CartridgeError> {
        Self::load(fs::read(path)?)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn read(&self, addr: u16) -> u8 {
        match (&self.mapper, addr) {
            (Mapper::RomOnly, 0x0000..=0x7FFF) => {
                self.rom.get(addr as usize).copied().unwrap_or(0xFF)
            }
            (Mapper::Mbc1 { secondary, mode, .. }, 0x0000..=0x3FFF) => {
                // Mode 1 maps the secondary bank bits over the fixed region.
                let bank = if *mode == 1 {
                    ((*secondary as usize) << 5) % self.rom_banks
                } else {
                    0
                };
                self.rom[bank * ROM_BANK_SIZE + addr as usize]
            }
            (Mapper::Mbc1 { rom_bank, secondary, .. }, 0x4000..=0x7FFF) => {
                let bank = (((*secondary as usize) << 5) | *rom_bank as usize) % self.rom_banks;
                self.rom[bank * ROM_BANK_SIZE + (addr as usize - 0x4000)]
            }
            (Mapper::Mbc1 { secondary, mode, ram_enabled, .. }, 0xA000..=0xBFFF) => {
                if !*ram_enabled || self.ram_banks == 0 {
                    return 0xFF;
                }
                let bank = self.ram_bank(*secondary, *mode);
                self.ram[bank * RAM_BANK_SIZE + (addr as usize - 0xA000)]
            }
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, addr: u16, val: u8) {
        let ram_banks = self.ram_banks;
        match (&mut self.mapper, addr) {
            (Mapper::RomOnly, _) => {}
            (Mapper::Mbc1 { ram_enabled, .. }, 0x0000..=0x1FFF) => {
                *ram_enabled = val & 0x0F == 0x0A;
            }
            (Mapper::Mbc1 { rom_bank, .. }, 0x2000..=0x3FFF) => {
                // 5-bit bank select; 0 always becomes 1.
                let bank = val & 0x1F;
                *rom_bank = if bank == 0 { 1 } else { bank };
            }
            (Mapper::Mbc1 { secondary, .. }, 0x4000..=0x5FFF) => {
                *secondary = val & 0x03;
            }
            (Mapper::Mbc1 { mode, .. }, 0x6000..=0x7FFF) => {
                *mode = val & 0x01;
            }
            (Mapper::Mbc1 { secondary, mode, ram_enabled, .. }, 0xA000..=0xBFFF) => {
                if !*ram_enabled || ram_banks == 0 {
                    return;
                }
                let bank = if *mode == 1 {
                    *secondary as usize % ram_banks
                } else {
                    0
                };
                self.ram[bank * RAM_BANK_SIZE + (addr as usize - 0xA000)] = val;
            }
            _ => {}
        }
    }

    fn ram_bank(&self, secondary: u8, mode: u8) -> usize {
        if mode == 1 {
            secondary as usize % self.ram_banks
        } else {
            0
        }
    }
}
