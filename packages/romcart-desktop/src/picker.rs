//! Non-interactive ROM picker
//!
//! The picker's directory and selection live in a value the caller owns and
//! passes around.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

const ROM_EXTENSIONS: [&str; 3] = ["gb", "gbc", "nes"];

#[derive(Debug)]
pub struct RomPicker {
    dir: PathBuf,
    entries: Vec<PathBuf>,
    selected: Option<usize>,
}

impl RomPicker {
    /// List every ROM image directly inside `dir`, sorted by name
    pub fn open(dir: &Path) -> Result<RomPicker> {
        let mut entries = Vec::new();
        let listing =
            std::fs::read_dir(dir).with_context(|| format!("Could not list {}", dir.display()))?;
        for entry in listing {
            let path = entry?.path();
            if path.is_file() && is_rom(&path) {
                entries.push(path);
            }
        }
        entries.sort();
        log::debug!("Found {} ROMs in {}", entries.len(), dir.display());
        Ok(RomPicker {
            dir: dir.to_path_buf(),
            entries,
            selected: None,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.entries.len() {
            bail!(
                "No ROM #{} in {} ({} found)",
                index,
                self.dir.display(),
                self.entries.len()
            );
        }
        self.selected = Some(index);
        Ok(())
    }

    pub fn selected(&self) -> Option<&Path> {
        self.selected.map(|index| self.entries[index].as_path())
    }
}

fn is_rom(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ROM_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
