#[derive(Debug, thiserror::Error)]
pub enum CartridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ROM too small (need at least {needed} bytes for the header, got {actual})")]
    TooShort { needed: usize, actual: usize },
    #[error("Not an iNES image (missing \"NES\\x1A\" tag)")]
    NotINes,
    #[error("NES 2.0 headers are not supported")]
    Nes2Unsupported,
    #[error("Unsupported cartridge type {code:#04X} ({name})")]
    UnsupportedCartType { code: u8, name: &'static str },
    #[error("Unsupported iNES mapper {0}")]
    UnsupportedMapper(u8),
    #[error("Unsupported ROM size code {0:#04X}")]
    UnsupportedRomSize(u8),
    #[error("Unsupported RAM size code {0:#04X}")]
    UnsupportedRamSize(u8),
    #[error("ROM size mismatch (header says {expected} bytes, image has {actual})")]
    SizeMismatch { expected: usize, actual: usize },
}
