/// WASM front-end for the cartridge loader
use crate::devices::bus::BusDevice;
use crate::devices::cartridge::{from_rom, AnyCartridge, LoadOptions};
use console_error_panic_hook;
use js_sys::Uint8Array;
use std::panic;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct CartridgeHandle {
    cart: AnyCartridge,
}

#[wasm_bindgen]
impl CartridgeHandle {
    /// Load a ROM image. Unknown GB cartridge types only load if `lenient`.
    #[wasm_bindgen(constructor)]
    pub fn new(buf: &[u8], lenient: bool) -> Result<CartridgeHandle, JsValue> {
        let options = if lenient {
            LoadOptions::lenient()
        } else {
            LoadOptions::default()
        };
        let cart = from_rom(buf, &options).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(CartridgeHandle { cart })
    }

    #[wasm_bindgen]
    pub fn title(&self) -> String {
        self.cart.title().to_string()
    }

    #[wasm_bindgen]
    pub fn console(&self) -> String {
        self.cart.console().to_string()
    }

    /// Read from the CPU bus, or undefined for open bus
    #[wasm_bindgen]
    pub fn read(&self, addr: u16) -> Option<u8> {
        self.cart.peek(addr).to_optional()
    }

    #[wasm_bindgen]
    pub fn write(&mut self, addr: u16, value: u8) -> bool {
        self.cart.write(addr, value)
    }

    /// Copy out cartridge RAM, e.g. for the page to stash a save
    #[wasm_bindgen]
    pub fn dump_ram(&self) -> Uint8Array {
        Uint8Array::from(self.cart.ram())
    }
}

/// Installs a global panic handler to make debugging easier
#[wasm_bindgen]
pub fn init_debug_hooks() {
    panic::set_hook(Box::new(console_error_panic_hook::hook));
}
