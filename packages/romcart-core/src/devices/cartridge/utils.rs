use super::error::CartridgeError;
use super::options::LoadOptions;
use crate::devices::bus::BusPeekResult;

/// Trait for a mapper, the address decoder living on a cartridge
///
/// Mappers never own memory. The cartridge lends its ROM and RAM buffers on
/// every call, and a mapper must not hold on to them between calls. Decoding
/// is pure: the same address against the same buffers always lands on the
/// same location, though bank-switching mappers may keep bank registers that
/// writes update.
pub trait Mapper {
    /// Read from the CPU-visible address space
    fn read(&self, addr: u16, rom: &[u8], ram: &[u8]) -> BusPeekResult;

    /// Write to the CPU-visible address space, returning whether anything
    /// on the cartridge responded
    fn write(&mut self, addr: u16, value: u8, rom: &mut [u8], ram: &mut [u8]) -> bool;

    /// Read from the PPU-visible (CHR) address space
    ///
    /// Only NES cartridges sit on a second bus, so the default is unmapped.
    fn read_chr(&self, _addr: u16, _chr: &[u8]) -> BusPeekResult {
        BusPeekResult::Unmapped
    }

    /// Write to the PPU-visible (CHR) address space
    fn write_chr(&mut self, _addr: u16, _value: u8, _chr: &mut [u8]) -> bool {
        false
    }
}

/// Read-only metadata every cartridge family can describe
pub trait CartridgeHeader {
    /// The game title, or an empty string if the format doesn't carry one
    fn title(&self) -> &str;

    /// The number of ROM banks in the image
    fn rom_banks(&self) -> usize;

    /// The number of external RAM banks on the cartridge
    fn ram_banks(&self) -> usize;
}

/// A console family: how to decode its images, and which mappers it can pick
pub trait CartridgeFormat: Sized {
    type Header: CartridgeHeader;
    type Mapper: Mapper;

    /// A human-readable name for logs
    const NAME: &'static str;

    /// The fixed size of one external RAM bank
    const RAM_BANK_SIZE: usize;

    /// Decode a raw image into its header, memory, and mapper
    fn decode(buf: &[u8], options: &LoadOptions) -> Result<Image<Self>, CartridgeError>;
}

/// The decoded pieces of a cartridge, before they're assembled
pub struct Image<F: CartridgeFormat> {
    pub header: F::Header,
    pub rom: Vec<u8>,
    pub ram: Vec<u8>,
    /// CHR memory on the PPU bus. Empty for families without one.
    pub chr: Vec<u8>,
    pub mapper: F::Mapper,
}
