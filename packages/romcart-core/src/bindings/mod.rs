//! Front-end bindings for hosts other than the desktop inspector

pub mod wasm;
