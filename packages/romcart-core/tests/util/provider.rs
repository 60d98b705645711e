//! Synthesized ROM images, so the tests don't need game dumps on disk

pub const INES_TAG: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

/// The bits of a GB/GBC header the tests care about
pub struct GbcImage<'a> {
    pub title: &'a str,
    pub cart_type: u8,
    pub rom_size_code: u8,
    pub ram_size_code: u8,
    pub cgb_flag: u8,
    pub sgb_flag: u8,
    pub region: u8,
    pub version: u8,
}

impl<'a> Default for GbcImage<'a> {
    fn default() -> Self {
        GbcImage {
            title: "ROMCART",
            cart_type: 0x00,
            rom_size_code: 0x00,
            ram_size_code: 0x00,
            cgb_flag: 0x00,
            sgb_flag: 0x00,
            region: 0x00,
            version: 0x00,
        }
    }
}

impl<'a> GbcImage<'a> {
    /// Build the whole image, with ROM filled by `fill` past the header
    pub fn build_with(&self, fill: impl Fn(usize) -> u8) -> Vec<u8> {
        let size = 0x8000usize << self.rom_size_code;
        let mut buf: Vec<u8> = (0..size).map(fill).collect();
        for byte in &mut buf[0x100..0x150] {
            *byte = 0;
        }
        let title = self.title.as_bytes();
        buf[0x134..0x134 + title.len()].copy_from_slice(title);
        buf[0x143] = self.cgb_flag;
        buf[0x146] = self.sgb_flag;
        buf[0x147] = self.cart_type;
        buf[0x148] = self.rom_size_code;
        buf[0x149] = self.ram_size_code;
        buf[0x14A] = self.region;
        buf[0x14C] = self.version;
        buf[0x14D] = buf[0x134..=0x14C]
            .iter()
            .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1));
        buf
    }

    pub fn build(&self) -> Vec<u8> {
        self.build_with(|i| (i % 0xFB) as u8)
    }
}

/// Build an iNES image with PRG bytes tagged by bank and CHR bytes by offset
pub fn ines_image(prg_banks: u8, chr_banks: u8, flags_6: u8, flags_7: u8) -> Vec<u8> {
    let mut buf = INES_TAG.to_vec();
    buf.extend_from_slice(&[prg_banks, chr_banks, flags_6, flags_7]);
    buf.resize(16, 0);
    if flags_6 & 0x04 != 0 {
        buf.extend(std::iter::repeat(0xEE).take(512));
    }
    for bank in 0..prg_banks as usize {
        buf.extend((0..0x4000).map(|i| (bank as u8) ^ (i as u8)));
    }
    buf.extend((0..chr_banks as usize * 0x2000).map(|i| (i >> 4) as u8));
    buf
}
