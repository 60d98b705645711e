use super::utils::Mapper;
use crate::devices::bus::{cart_memory_map, BusPeekResult};

/// The fixed, no-banking mapper
///
/// ROM sits at $0000-$7FFF and external RAM at $A000-$BFFF. Images smaller
/// than the ROM window are mirrored across it, and only the first 32k of a
/// larger image is ever visible.
///
/// There's no write protection: writes to the ROM window land in the image.
/// Some carts in the wild rely on this, so it stays.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct BaseMapper;

impl Mapper for BaseMapper {
    fn read(&self, addr: u16, rom: &[u8], ram: &[u8]) -> BusPeekResult {
        if let Some(offset) = cart_memory_map::ROM.map(addr) {
            if rom.is_empty() {
                return BusPeekResult::Unmapped;
            }
            return BusPeekResult::Result(rom[offset as usize % rom.len()]);
        }
        if let Some(offset) = cart_memory_map::RAM.map(addr) {
            return match ram.get(offset as usize) {
                Some(val) => BusPeekResult::Result(*val),
                None => BusPeekResult::Unmapped,
            };
        }
        BusPeekResult::Unmapped
    }

    fn write(&mut self, addr: u16, value: u8, rom: &mut [u8], ram: &mut [u8]) -> bool {
        if let Some(offset) = cart_memory_map::ROM.map(addr) {
            if rom.is_empty() {
                return false;
            }
            let len = rom.len();
            rom[offset as usize % len] = value;
            return true;
        }
        if let Some(offset) = cart_memory_map::RAM.map(addr) {
            if let Some(cell) = ram.get_mut(offset as usize) {
                *cell = value;
                return true;
            }
        }
        false
    }
}
