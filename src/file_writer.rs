use crate::converter::ConvertedDevice;
use crate::error::{Error, Result};
use crate::kicad_models::*;
use log::info;
use regex::Regex;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

const KICAD_SYM_HEADER: &str = r#"(kicad_symbol_lib (version 20211014) (generator pinout2kicad_rs)
"#;

const KICAD_SYM_FOOTER: &str = r#")
"#;

/// Manages the output library structure.
pub struct KicadLibrary {
    pub path: PathBuf,
}

impl KicadLibrary {
    pub fn setup_directories(&self) -> Result<()> {
        fs::create_dir_all(self.path.join("symbols"))?;
        Ok(())
    }

    pub fn library_path(&self, family: &str) -> PathBuf {
        self.path.join("symbols").join(format!("{}.kicad_sym", family))
    }

    pub fn add_symbol(&self, family: &str, symbol: &KiSymbol) -> Result<bool> {
        let written = self.add_entries(
            family,
            vec![(symbol.name.clone(), symbol.to_kicad_lib_entry())],
        )?;
        Ok(!written.is_empty())
    }

    /// Derived symbols must come after the symbol they extend.
    pub fn add_derived_symbol(&self, family: &str, symbol: &DerivedSymbol) -> Result<bool> {
        let written = self.add_entries(
            family,
            vec![(symbol.name.clone(), symbol.to_kicad_lib_entry())],
        )?;
        Ok(!written.is_empty())
    }

    /// Writes a device's symbol and its derived symbols in a single append,
    /// so the library never holds a parent without its derived symbols.
    pub fn add_device(&self, family: &str, device: &ConvertedDevice) -> Result<Vec<String>> {
        let mut entries = vec![(
            device.symbol.name.clone(),
            device.symbol.to_kicad_lib_entry(),
        )];
        entries.extend(
            device
                .derived
                .iter()
                .map(|d| (d.name.clone(), d.to_kicad_lib_entry())),
        );
        self.add_entries(family, entries)
    }

    /// Appends entries to the family library, skipping names that are
    /// already there. Returns the names actually written.
    fn add_entries(&self, family: &str, entries: Vec<(String, String)>) -> Result<Vec<String>> {
        let lib_path = self.library_path(family);

        // --- Check for Duplicates ---
        let mut file_content = String::new();
        if lib_path.exists() {
            File::open(&lib_path)?.read_to_string(&mut file_content)?;
        }

        let mut names = Vec::new();
        let mut content = String::new();
        for (name, entry) in entries {
            let pattern = format!(r#"\(\s*symbol\s*"{}"\s"#, regex::escape(&escape_str(&name)));
            let re = Regex::new(&pattern).map_err(|e| Error::ParseError(e.to_string()))?;

            if re.is_match(&file_content) {
                info!("Symbol '{}' already exists in the library. Skipping.", name);
                continue;
            }
            content.push_str(&entry);
            names.push(name);
        }
        if names.is_empty() {
            return Ok(names);
        }

        // --- Open or Create the File ---
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lib_path)?;

        if file.metadata()?.len() == 0 {
            let mut buf = String::from(KICAD_SYM_HEADER);
            buf.push_str(&content);
            buf.push_str(KICAD_SYM_FOOTER);
            file.write_all(buf.as_bytes())?;
            info!("Created new symbol library and added {:?}.", names);
        } else {
            // Overwrite the closing ')' and put it back after the new entries
            content.push_str(KICAD_SYM_FOOTER);
            file.seek(SeekFrom::End(-(KICAD_SYM_FOOTER.len() as i64)))?;
            file.write_all(content.as_bytes())?;
            info!("Appended {:?} to the existing library.", names);
        }

        Ok(names)
    }
}
