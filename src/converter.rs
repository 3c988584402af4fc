// src/converter.rs

use crate::centering::center;
use crate::classifier::{ClassifiedPins, resolve_pin};
use crate::config::FamilyConfig;
use crate::error::Result;
use crate::kicad_models::*;
use crate::layout::layout;
use crate::pin_models::*;
use crate::ports::group_ports;
use log::{Level, log_enabled, trace};

/// A device's symbol and the symbols that extend it.
#[derive(Debug, Clone)]
pub struct ConvertedDevice {
    pub symbol: KiSymbol,
    pub derived: Vec<DerivedSymbol>,
}

/// Classifies, groups, lays out and centers one device's pins.
pub fn build_symbol(pins: Vec<Pin>) -> Result<Symbol> {
    let pin_count = pins.len();
    let classified = ClassifiedPins::from_pins(pins);
    let ports = group_ports(&classified.bus_members)?;
    let drawing = center(layout(&classified, &ports));
    debug_assert_eq!(drawing.pins.len(), pin_count);
    Ok(drawing)
}

/// Runs the full pipeline for one device. Nothing is returned unless every
/// pin was accepted.
pub fn convert_device(device: &Device, config: &FamilyConfig) -> Result<ConvertedDevice> {
    let pins = device
        .records
        .iter()
        .map(resolve_pin)
        .collect::<Result<Vec<_>>>()?;
    let metadata = config.metadata(&device.name, &device.package)?;
    let drawing = build_symbol(pins)?;

    let symbol = KiSymbol {
        name: device.name.clone(),
        reference: config.reference.clone(),
        metadata,
        drawing,
    };
    if log_enabled!(Level::Trace) {
        trace!("Layout of {}: {}", symbol.name, symbol.to_json()?);
    }

    let derived = device
        .derived_symbols
        .iter()
        .map(|name| {
            let metadata = config.metadata(name, &device.package)?;
            Ok(DerivedSymbol::inherit(&symbol, name, metadata))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ConvertedDevice { symbol, derived })
}
