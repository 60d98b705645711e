/// The result of a deterministic read against a device on the bus
///
/// Devices that don't respond at an address return `Unmapped`, and it's up to
/// whoever owns the bus to decide what open-bus reads look like.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BusPeekResult {
    Unmapped,
    Result(u8),
}

impl BusPeekResult {
    /// Unwrap a BusPeekResult to an u8, falling back to the last bus value
    pub fn unwrap(&self, last_bus_value: u8) -> u8 {
        match self {
            BusPeekResult::Result(val) => *val,
            BusPeekResult::Unmapped => last_bus_value,
        }
    }

    /// Convert a BusPeekResult into an Option<u8>
    pub fn to_optional(&self) -> Option<u8> {
        match self {
            BusPeekResult::Result(val) => Some(*val),
            BusPeekResult::Unmapped => None,
        }
    }

    /// Whether the device responded to this read
    pub fn is_mapped(&self) -> bool {
        matches!(self, BusPeekResult::Result(_))
    }
}

/// Trait for an object that may be mounted to and driven by an address bus
pub trait BusDevice {
    /// Attempt to immutably and deterministically read from the device
    fn peek(&self, addr: u16) -> BusPeekResult;

    /// Write to the device at the given address
    ///
    /// Returns false if nothing on the device is wired to that address.
    fn write(&mut self, addr: u16, value: u8) -> bool;
}

/// An inclusive window of the address space
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Range {
    start: u16,
    end: u16,
    mask: u16,
}

impl Range {
    pub const fn new(start: u16, end: u16, mask: u16) -> Range {
        Range { start, end, mask }
    }

    pub const fn new_unmasked(start: u16, end: u16) -> Range {
        Range {
            start,
            end,
            mask: 0xFFFF,
        }
    }

    /// Given an address, return the local address or none if the global addr is outside this Range.
    pub fn map(&self, test_addr: u16) -> Option<u16> {
        if test_addr < self.start || test_addr > self.end {
            None
        } else {
            Some((test_addr - self.start) & self.mask)
        }
    }

    pub fn contains(&self, test_addr: u16) -> bool {
        self.map(test_addr).is_some()
    }
}

/// Address windows shared by the fixed, non-banking cartridge layouts
pub mod cart_memory_map {
    use super::Range;

    /// Switchable ROM would live here too, but the fixed layout only ever
    /// exposes the first 32k of the image
    pub const ROM: Range = Range::new_unmasked(0x0000, 0x7FFF);

    /// External cartridge RAM
    pub const RAM: Range = Range::new_unmasked(0xA000, 0xBFFF);

    /// CHR (pattern table) space on the PPU bus
    pub const CHR: Range = Range::new_unmasked(0x0000, 0x1FFF);
}
