//! Cartridge loading and address decoding for GB/GBC and iNES images

mod base;
mod cart;
mod error;
mod gbc;
mod ines;
mod nrom;
mod options;
mod utils;

use std::fmt;

pub use base::BaseMapper;
pub use cart::Cartridge;
pub use error::CartridgeError;
pub use gbc::{
    header_checksum, parse_gbc_header, Capabilities, CartridgeKind, Gbc, GbcHeader, GbcMapper,
    MapperChip,
};
pub use ines::{
    has_ines_tag, parse_ines_header, INes, INesFlags6, INesFlags7, INesHeader, Mirroring,
    NesMapper,
};
pub use nrom::NromMapper;
pub use options::{LoadOptions, UnknownCartTypePolicy};
pub use utils::{CartridgeFormat, CartridgeHeader, Image, Mapper};

use crate::devices::bus::{BusDevice, BusPeekResult};

/// The console family a cartridge belongs to
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Console {
    Gbc,
    Nes,
}

impl fmt::Display for Console {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Console::Gbc => write!(f, "Game Boy / Game Boy Color"),
            Console::Nes => write!(f, "NES"),
        }
    }
}

/// A cartridge of either family, picked by looking at the image
pub enum AnyCartridge {
    Gbc(Cartridge<Gbc>),
    Nes(Cartridge<INes>),
}

/// Given a buffer to a ROM, return the cartridge it holds
///
/// Images starting with the iNES tag load as NES cartridges, everything else
/// is treated as a GB/GBC image.
pub fn from_rom(buf: &[u8], options: &LoadOptions) -> Result<AnyCartridge, CartridgeError> {
    if has_ines_tag(buf) {
        Ok(AnyCartridge::Nes(Cartridge::from_rom(buf, options)?))
    } else {
        Ok(AnyCartridge::Gbc(Cartridge::from_rom(buf, options)?))
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn from_file<P: AsRef<std::path::Path>>(
    path: P,
    options: &LoadOptions,
) -> Result<AnyCartridge, CartridgeError> {
    let buf = std::fs::read(path)?;
    from_rom(&buf, options)
}

impl AnyCartridge {
    pub fn console(&self) -> Console {
        match self {
            AnyCartridge::Gbc(_) => Console::Gbc,
            AnyCartridge::Nes(_) => Console::Nes,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            AnyCartridge::Gbc(cart) => cart.title(),
            AnyCartridge::Nes(cart) => cart.title(),
        }
    }

    pub fn rom_banks(&self) -> usize {
        match self {
            AnyCartridge::Gbc(cart) => cart.rom_banks(),
            AnyCartridge::Nes(cart) => cart.rom_banks(),
        }
    }

    pub fn ram_banks(&self) -> usize {
        match self {
            AnyCartridge::Gbc(cart) => cart.ram_banks(),
            AnyCartridge::Nes(cart) => cart.ram_banks(),
        }
    }

    pub fn ram(&self) -> &[u8] {
        match self {
            AnyCartridge::Gbc(cart) => cart.ram(),
            AnyCartridge::Nes(cart) => cart.ram(),
        }
    }
}

impl BusDevice for AnyCartridge {
    fn peek(&self, addr: u16) -> BusPeekResult {
        match self {
            AnyCartridge::Gbc(cart) => cart.read(addr),
            AnyCartridge::Nes(cart) => cart.read(addr),
        }
    }

    fn write(&mut self, addr: u16, value: u8) -> bool {
        match self {
            AnyCartridge::Gbc(cart) => cart.write(addr, value),
            AnyCartridge::Nes(cart) => cart.write(addr, value),
        }
    }
}
