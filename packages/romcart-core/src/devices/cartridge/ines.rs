//! Helpers for parsing iNES ROM files

use log::debug;

use super::error::CartridgeError;
use super::nrom::NromMapper;
use super::options::LoadOptions;
use super::utils::{CartridgeFormat, CartridgeHeader, Image, Mapper};
use crate::devices::bus::BusPeekResult;

/// "NES" followed by an MS-DOS EOF
pub const INES_TAG: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];
pub const HEADER_SIZE: usize = 16;
pub const TRAINER_SIZE: usize = 512;
pub const PRG_BANK_SIZE: usize = 0x4000;
pub const CHR_BANK_SIZE: usize = 0x2000;
/// How many CHR banks of RAM to hand a cart that ships without CHR-ROM
pub const DEFAULT_CHR_RAM_BANKS: usize = 16;

/// Nametable arrangement, as wired on the cartridge
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

/// Interface for an iNES header
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct INesHeader {
    /// The size of the PRG chunk, in 16k chunks.
    pub prg_banks: usize,
    /// The size of the CHR chunk, in 8k chunks. 0 means the board uses CHR-RAM.
    pub chr_banks: usize,
    /// Mapper, mirroring, battery, trainer
    pub flags_6: INesFlags6,
    /// Mapper, VS/PlayChoice, NES 2.0 indicator
    pub flags_7: INesFlags7,
    pub mirroring: Mirroring,
    /// The iNES mapper number, assembled from both flag bytes
    pub mapper_id: u8,
}

impl INesHeader {
    pub fn prg_size(&self) -> usize {
        self.prg_banks * PRG_BANK_SIZE
    }

    pub fn chr_size(&self) -> usize {
        self.chr_banks * CHR_BANK_SIZE
    }

    pub fn has_trainer(&self) -> bool {
        self.flags_6.contains(INesFlags6::HAS_TRAINER)
    }

    pub fn has_battery(&self) -> bool {
        self.flags_6.contains(INesFlags6::HAS_PERSISTENT_MEMORY)
    }

    pub fn uses_chr_ram(&self) -> bool {
        self.chr_banks == 0
    }

    /// Where PRG-ROM begins in the image
    pub fn prg_offset(&self) -> usize {
        HEADER_SIZE + if self.has_trainer() { TRAINER_SIZE } else { 0 }
    }
}

impl CartridgeHeader for INesHeader {
    fn title(&self) -> &str {
        // iNES doesn't carry a title; front-ends use the file name
        ""
    }

    fn rom_banks(&self) -> usize {
        self.prg_banks
    }

    fn ram_banks(&self) -> usize {
        0
    }
}

/// Whether a buffer starts with the iNES tag
pub fn has_ines_tag(bytes: &[u8]) -> bool {
    bytes.len() >= INES_TAG.len() && bytes[..INES_TAG.len()] == INES_TAG
}

/** Given at least the first 16 bytes, parse out an iNES header */
pub fn parse_ines_header(bytes: &[u8]) -> Result<INesHeader, CartridgeError> {
    if !has_ines_tag(bytes) {
        return Err(CartridgeError::NotINes);
    }
    if bytes.len() < HEADER_SIZE {
        return Err(CartridgeError::TooShort {
            needed: HEADER_SIZE,
            actual: bytes.len(),
        });
    }
    let flags_6 = INesFlags6::from_bits_truncate(bytes[6]);
    let flags_7 = INesFlags7::from_bits_truncate(bytes[7]);
    if flags_7.intersects(INesFlags7::IS_INES_2_0) {
        return Err(CartridgeError::Nes2Unsupported);
    }

    let mirroring = if flags_6.contains(INesFlags6::USE_FOUR_SCREEN_VRAM) {
        Mirroring::FourScreen
    } else if flags_6.contains(INesFlags6::MIRRORING) {
        Mirroring::Horizontal
    } else {
        Mirroring::Vertical
    };
    let lower_mapper_nibble = (flags_6 & INesFlags6::LOWER_MAPPER_NIBBLE).bits() >> 4;
    let upper_mapper_nibble = (flags_7 & INesFlags7::UPPER_MAPPER_NIBBLE).bits();

    Ok(INesHeader {
        prg_banks: bytes[4] as usize,
        chr_banks: bytes[5] as usize,
        flags_6,
        flags_7,
        mirroring,
        mapper_id: upper_mapper_nibble | lower_mapper_nibble,
    })
}

bitflags! {
    pub struct INesFlags6: u8 {
        /** The mirroring mode. Set for horizontal, clear for vertical.
         *
         * Ignored when USE_FOUR_SCREEN_VRAM is set, and by mappers that
         * control mirroring themselves.
         */
        const MIRRORING = 0x01;
        /** Whether this rom contains a battery-backed RAM */
        const HAS_PERSISTENT_MEMORY = 0x02;
        /** Whether a 512-byte trainer sits between the header and PRG */
        const HAS_TRAINER = 0x04;
        /** Whether to use 4-screen VRAM instead of mirroring */
        const USE_FOUR_SCREEN_VRAM = 0x08;
        /** The lower nibble of the iNES mapper number */
        const LOWER_MAPPER_NIBBLE = 0xF0;
    }
}

bitflags! {
    pub struct INesFlags7: u8 {
        /** Whether this ROM was developed for the VS arcade */
        const VS_UNISYSTEM_ROM = 0x01;
        /** Whether this ROM was developed for the PlayChoice arcade.
         *
         * Note that this is rarely seen in the wild, but the presense of this bit
         * indicates that 8kb of hint screen data is included at the end of the
         * CHR section
         */
        const PLAYCHOICE_10 = 0x02;
        /** Any bit set here marks a NES 2.0 header */
        const IS_INES_2_0 = 0x0C;
        /** The upper nibble of the iNES mapper number */
        const UPPER_MAPPER_NIBBLE = 0xF0;
    }
}

/// The iNES mappers this crate knows how to drive
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NesMapper {
    Nrom(NromMapper),
}

impl NesMapper {
    /// Pick the mapper for an iNES mapper number
    pub fn from_id(id: u8, header: &INesHeader) -> Result<NesMapper, CartridgeError> {
        match id {
            0 => Ok(NesMapper::Nrom(NromMapper::new(header.uses_chr_ram()))),
            _ => Err(CartridgeError::UnsupportedMapper(id)),
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            NesMapper::Nrom(_) => 0,
        }
    }
}

impl Mapper for NesMapper {
    fn read(&self, addr: u16, rom: &[u8], ram: &[u8]) -> BusPeekResult {
        match self {
            NesMapper::Nrom(mapper) => mapper.read(addr, rom, ram),
        }
    }

    fn write(&mut self, addr: u16, value: u8, rom: &mut [u8], ram: &mut [u8]) -> bool {
        match self {
            NesMapper::Nrom(mapper) => mapper.write(addr, value, rom, ram),
        }
    }

    fn read_chr(&self, addr: u16, chr: &[u8]) -> BusPeekResult {
        match self {
            NesMapper::Nrom(mapper) => mapper.read_chr(addr, chr),
        }
    }

    fn write_chr(&mut self, addr: u16, value: u8, chr: &mut [u8]) -> bool {
        match self {
            NesMapper::Nrom(mapper) => mapper.write_chr(addr, value, chr),
        }
    }
}

/// The iNES cartridge family
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum INes {}

impl CartridgeFormat for INes {
    type Header = INesHeader;
    type Mapper = NesMapper;

    const NAME: &'static str = "iNES";
    const RAM_BANK_SIZE: usize = 0x2000;

    fn decode(buf: &[u8], _options: &LoadOptions) -> Result<Image<INes>, CartridgeError> {
        let header = parse_ines_header(buf)?;
        let mapper = NesMapper::from_id(header.mapper_id, &header)?;

        let prg_start = header.prg_offset();
        let prg_end = prg_start + header.prg_size();
        let chr_end = prg_end + header.chr_size();
        if buf.len() < chr_end {
            return Err(CartridgeError::SizeMismatch {
                expected: chr_end,
                actual: buf.len(),
            });
        }
        if buf.len() > chr_end {
            debug!(
                "Ignoring {} trailing bytes after CHR-ROM",
                buf.len() - chr_end
            );
        }

        let prg = buf[prg_start..prg_end].to_vec();
        let chr = if header.uses_chr_ram() {
            vec![0u8; DEFAULT_CHR_RAM_BANKS * CHR_BANK_SIZE]
        } else {
            buf[prg_end..chr_end].to_vec()
        };
        debug!(
            "iNES geometry: {} PRG bytes at {:#06X}, {} CHR bytes{}, {:?} mirroring",
            prg.len(),
            prg_start,
            chr.len(),
            if header.uses_chr_ram() { " (RAM)" } else { "" },
            header.mirroring
        );

        Ok(Image {
            header,
            rom: prg,
            ram: Vec::new(),
            chr,
            mapper,
        })
    }
}
