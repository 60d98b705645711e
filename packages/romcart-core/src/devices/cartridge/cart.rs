use log::info;

use super::error::CartridgeError;
use super::options::LoadOptions;
use super::utils::{CartridgeFormat, CartridgeHeader, Image, Mapper};
use crate::devices::bus::{BusDevice, BusPeekResult};

/// A loaded cartridge: its header, its memory, and the mapper wiring it up
///
/// This is the only thing the bus talks to. ROM, RAM and CHR are owned here
/// and lent to the mapper one access at a time.
pub struct Cartridge<F: CartridgeFormat> {
    header: F::Header,
    rom: Vec<u8>,
    ram: Vec<u8>,
    chr: Vec<u8>,
    mapper: F::Mapper,
}

impl<F: CartridgeFormat> Cartridge<F> {
    /// Given a buffer holding a whole ROM image, decode it into a cartridge
    pub fn from_rom(buf: &[u8], options: &LoadOptions) -> Result<Cartridge<F>, CartridgeError> {
        let Image {
            header,
            rom,
            ram,
            chr,
            mapper,
        } = F::decode(buf, options)?;

        let ram_size = header.ram_banks() * F::RAM_BANK_SIZE;
        if ram.len() != ram_size {
            return Err(CartridgeError::SizeMismatch {
                expected: ram_size,
                actual: ram.len(),
            });
        }

        info!(
            "Loaded {} cartridge \"{}\" ({} ROM banks, {} RAM banks)",
            F::NAME,
            header.title(),
            header.rom_banks(),
            header.ram_banks()
        );
        Ok(Cartridge {
            header,
            rom,
            ram,
            chr,
            mapper,
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file<P: AsRef<std::path::Path>>(
        path: P,
        options: &LoadOptions,
    ) -> Result<Cartridge<F>, CartridgeError> {
        let buf = std::fs::read(path)?;
        Cartridge::from_rom(&buf, options)
    }

    pub fn header(&self) -> &F::Header {
        &self.header
    }

    pub fn title(&self) -> &str {
        self.header.title()
    }

    pub fn rom_banks(&self) -> usize {
        self.header.rom_banks()
    }

    pub fn ram_banks(&self) -> usize {
        self.header.ram_banks()
    }

    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    pub fn chr(&self) -> &[u8] {
        &self.chr
    }

    pub fn mapper(&self) -> &F::Mapper {
        &self.mapper
    }

    /// Read from the CPU bus
    pub fn read(&self, addr: u16) -> BusPeekResult {
        self.mapper.read(addr, &self.rom, &self.ram)
    }

    /// Write to the CPU bus, returning whether the cartridge responded
    pub fn write(&mut self, addr: u16, value: u8) -> bool {
        self.mapper
            .write(addr, value, &mut self.rom, &mut self.ram)
    }

    /// Read from the PPU bus
    pub fn read_chr(&self, addr: u16) -> BusPeekResult {
        self.mapper.read_chr(addr, &self.chr)
    }

    /// Write to the PPU bus, returning whether the write landed
    pub fn write_chr(&mut self, addr: u16, value: u8) -> bool {
        self.mapper.write_chr(addr, value, &mut self.chr)
    }
}

impl<F: CartridgeFormat> BusDevice for Cartridge<F> {
    fn peek(&self, addr: u16) -> BusPeekResult {
        self.read(addr)
    }

    fn write(&mut self, addr: u16, value: u8) -> bool {
        Cartridge::write(self, addr, value)
    }
}
