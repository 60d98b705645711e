use anyhow::{anyhow, Context, Result};
use clap::Parser;
use romcart_core::devices::bus::{BusDevice, BusPeekResult};
use romcart_core::devices::cartridge::{self, AnyCartridge, LoadOptions};
use std::path::{Path, PathBuf};

mod picker;

use picker::RomPicker;

#[derive(Parser, Debug)]
#[command(about = "Inspect GB/GBC and iNES cartridge images")]
struct Args {
    /// Path to a .gb, .gbc or .nes ROM
    rom: Option<PathBuf>,

    /// Pick a ROM from this directory instead
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Which ROM in the --dir listing to load
    #[arg(long)]
    select: Option<usize>,

    /// Load unknown GB cartridge types with the fixed mapper instead of failing
    #[arg(long)]
    lenient: bool,

    /// Read an address from the cartridge (hex)
    #[arg(long, value_parser = parse_addr)]
    peek: Vec<u16>,

    /// Write to the cartridge before any reads, as ADDR=VALUE (hex)
    #[arg(long, value_parser = parse_poke)]
    poke: Vec<(u16, u8)>,
}

fn parse_hex(s: &str) -> Result<u32, String> {
    let digits = s
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .trim_start_matches('$');
    u32::from_str_radix(digits, 16).map_err(|e| format!("bad hex value {:?}: {}", s, e))
}

fn parse_addr(s: &str) -> Result<u16, String> {
    let value = parse_hex(s)?;
    u16::try_from(value).map_err(|_| format!("address {:?} is wider than 16 bits", s))
}

fn parse_poke(s: &str) -> Result<(u16, u8), String> {
    let (addr, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VALUE, got {:?}", s))?;
    let value = parse_hex(value)?;
    let value = u8::try_from(value).map_err(|_| format!("value in {:?} is wider than 8 bits", s))?;
    Ok((parse_addr(addr)?, value))
}

/// Work out which file to load, going through the picker when asked to
fn resolve_rom(args: &Args) -> Result<PathBuf> {
    if let Some(rom) = &args.rom {
        return Ok(rom.clone());
    }
    let dir = args
        .dir
        .as_ref()
        .ok_or_else(|| anyhow!("Pass a ROM path or --dir"))?;
    let mut picker = RomPicker::open(dir)?;
    match args.select {
        Some(index) => {
            picker.select(index)?;
            let chosen = picker
                .selected()
                .ok_or_else(|| anyhow!("No ROM selected in {}", picker.dir().display()))?;
            log::info!("Picked {}", chosen.display());
            Ok(chosen.to_path_buf())
        }
        None => {
            println!("ROMs in {}:", picker.dir().display());
            for (index, entry) in picker.entries().iter().enumerate() {
                println!("  [{}] {}", index, entry.display());
            }
            Err(anyhow!("Pick one with --select N"))
        }
    }
}

fn print_summary(cart: &AnyCartridge, path: &Path) {
    let title = match cart.title() {
        "" => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
        title => title.to_string(),
    };
    println!("{} ({})", title, cart.console());
    println!("  ROM banks:  {}", cart.rom_banks());
    println!("  RAM banks:  {}", cart.ram_banks());

    match cart {
        AnyCartridge::Gbc(cart) => {
            let header = cart.header();
            let kind = header.kind.map_or("unknown", |kind| kind.name);
            println!("  Type:       {:#04X} ({})", header.cart_type, kind);
            println!("  ROM size:   {:#X}", header.rom_size);
            println!("  RAM size:   {:#X}", cart.ram().len());
            println!("  Features:   {:?}", header.capabilities);
            println!("  Maker:      {:?}", header.manufacturer);
            println!(
                "  Licensee:   {:?} / {:#04X}",
                header.new_licensee, header.old_licensee
            );
            println!("  Region:     {:#04X}", header.region);
            println!("  Version:    {:#04X}", header.version);
            let verdict = match cartridge::header_checksum(cart.rom()) {
                Ok(checksum) if checksum == header.header_checksum => "ok",
                _ => "BAD",
            };
            println!(
                "  Checksum:   {:#04X} ({})",
                header.header_checksum, verdict
            );
        }
        AnyCartridge::Nes(cart) => {
            let header = cart.header();
            println!("  Mapper:     {}", header.mapper_id);
            println!("  PRG size:   {:#X}", header.prg_size());
            println!(
                "  CHR size:   {:#X}{}",
                cart.chr().len(),
                if header.uses_chr_ram() { " (RAM)" } else { "" }
            );
            println!("  Mirroring:  {:?}", header.mirroring);
            println!("  Trainer:    {}", header.has_trainer());
            println!("  Battery:    {}", header.has_battery());
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let path = resolve_rom(&args)?;
    let options = if args.lenient {
        LoadOptions::lenient()
    } else {
        LoadOptions::default()
    };
    let mut cart = cartridge::from_file(&path, &options)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    print_summary(&cart, &path);

    for &(addr, value) in &args.poke {
        let mapped = cart.write(addr, value);
        println!(
            "poke ${:04X} = ${:02X}{}",
            addr,
            value,
            if mapped { "" } else { " (unmapped)" }
        );
    }
    for &addr in &args.peek {
        match cart.peek(addr) {
            BusPeekResult::Result(value) => println!("peek ${:04X} = ${:02X}", addr, value),
            BusPeekResult::Unmapped => println!("peek ${:04X} = open bus", addr),
        }
    }
    Ok(())
}
