#[macro_use]
extern crate bitflags;

pub mod bindings;
pub mod devices;
