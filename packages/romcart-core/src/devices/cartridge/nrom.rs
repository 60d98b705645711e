use super::base::BaseMapper;
use super::utils::Mapper;
use crate::devices::bus::{cart_memory_map, BusPeekResult};

/// NROM, iNES mapper 0
///
/// PRG decoding is the fixed layout. On the PPU side, CHR fills $0000-$1FFF
/// and only accepts writes when the board carries CHR-RAM.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct NromMapper {
    base: BaseMapper,
    chr_is_ram: bool,
}

impl NromMapper {
    pub fn new(chr_is_ram: bool) -> NromMapper {
        NromMapper {
            base: BaseMapper,
            chr_is_ram,
        }
    }

    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }
}

impl Mapper for NromMapper {
    fn read(&self, addr: u16, rom: &[u8], ram: &[u8]) -> BusPeekResult {
        self.base.read(addr, rom, ram)
    }

    fn write(&mut self, addr: u16, value: u8, rom: &mut [u8], ram: &mut [u8]) -> bool {
        self.base.write(addr, value, rom, ram)
    }

    fn read_chr(&self, addr: u16, chr: &[u8]) -> BusPeekResult {
        match cart_memory_map::CHR.map(addr) {
            Some(offset) if !chr.is_empty() => {
                BusPeekResult::Result(chr[offset as usize % chr.len()])
            }
            _ => BusPeekResult::Unmapped,
        }
    }

    fn write_chr(&mut self, addr: u16, value: u8, chr: &mut [u8]) -> bool {
        if !self.chr_is_ram || chr.is_empty() {
            return false; // no-op: this is a ROM
        }
        match cart_memory_map::CHR.map(addr) {
            Some(offset) => {
                let len = chr.len();
                chr[offset as usize % len] = value;
                true
            }
            None => false,
        }
    }
}
