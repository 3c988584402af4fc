// src/importer.rs

use crate::error::{Error, Result};
use crate::pin_models::RawPinRecord;

/// Pin-number cell for a pin that does not exist on a variant.
const ABSENT: &str = "-";

/// Pins of one table column (one device variant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinColumn {
    pub name: String,
    pub records: Vec<RawPinRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinTable {
    pub columns: Vec<PinColumn>,
}

fn parse_raw_line(line: &str) -> Vec<&str> {
    line.split(';').map(str::trim).collect()
}

/// Parses a semicolon separated pinout table.
///
/// The header names one column per variant followed by the name and type
/// columns. Every row carries a pin number per variant, then the signal
/// name and its electrical role. `-` marks a pin missing from a variant and
/// `3.4` lists several physical pins sharing one signal; those are expanded
/// into one record each.
pub fn parse_pin_table(text: &str) -> Result<PinTable> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines
        .next()
        .ok_or_else(|| Error::ParseError("Pin table is empty".to_string()))?;
    let header = parse_raw_line(header);
    if header.len() < 3 {
        return Err(Error::ParseError(format!(
            "Pin table header needs at least one variant column, got {:?}",
            header
        )));
    }
    let variant_count = header.len() - 2;

    let mut columns: Vec<PinColumn> = header[..variant_count]
        .iter()
        .map(|name| PinColumn {
            name: name.to_string(),
            records: Vec::new(),
        })
        .collect();

    for (line_idx, line) in lines {
        let fields = parse_raw_line(line);
        if fields.len() != header.len() {
            return Err(Error::ParseError(format!(
                "Line {}: expected {} fields, found {}",
                line_idx + 1,
                header.len(),
                fields.len()
            )));
        }
        let name = fields[variant_count];
        let role = fields[variant_count + 1];
        if name.is_empty() {
            return Err(Error::ParseError(format!(
                "Line {}: missing signal name",
                line_idx + 1
            )));
        }

        for (cell, column) in fields[..variant_count].iter().zip(columns.iter_mut()) {
            if cell.is_empty() || *cell == ABSENT {
                continue;
            }
            for number in cell.split('.') {
                column.records.push(RawPinRecord {
                    number: number.to_string(),
                    name: name.to_string(),
                    role: role.to_string(),
                });
            }
        }
    }

    Ok(PinTable { columns })
}
