pub mod bus;
pub mod cartridge;
