// src/config.rs

use crate::error::{Error, Result};
use crate::importer::PinTable;
use crate::pin_models::{Device, DeviceMetadata};
use log::warn;
use serde::Deserialize;
use std::collections::BTreeMap;

fn default_reference() -> String {
    "U".to_string()
}

/// Per-family catalog: packages, footprints and the text published with
/// each symbol.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FamilyConfig {
    pub family: String,
    #[serde(default = "default_reference")]
    pub reference: String,
    #[serde(default)]
    pub datasheet: String,
    #[serde(default)]
    pub keywords: String,
    /// `{name}` and `{package}` are substituted per device.
    #[serde(default)]
    pub description: String,
    /// Device name -> package name.
    pub packages: BTreeMap<String, String>,
    /// Table columns that stand for several devices with identical pinouts.
    #[serde(default)]
    pub variants: BTreeMap<String, Vec<String>>,
    /// Package name -> footprint library id.
    #[serde(default)]
    pub footprints: BTreeMap<String, String>,
    #[serde(default)]
    pub footprint_required: bool,
    /// Package name -> footprint filter glob.
    #[serde(default)]
    pub footprint_filters: BTreeMap<String, String>,
    /// Device name -> symbols that extend it.
    #[serde(default)]
    pub derived_symbols: BTreeMap<String, Vec<String>>,
}

impl FamilyConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Expands the table columns into devices, in column order.
    pub fn devices(&self, table: &PinTable) -> Result<Vec<Device>> {
        let mut devices = Vec::new();
        for column in &table.columns {
            let names = match self.variants.get(&column.name) {
                Some(names) => names.clone(),
                None => vec![column.name.clone()],
            };
            for name in names {
                let package = self
                    .packages
                    .get(&name)
                    .ok_or_else(|| Error::UnknownPackage {
                        device: name.clone(),
                    })?
                    .clone();
                let derived_symbols = self.derived_symbols.get(&name).cloned().unwrap_or_default();
                devices.push(Device {
                    name,
                    package,
                    records: column.records.clone(),
                    derived_symbols,
                });
            }
        }
        Ok(devices)
    }

    /// Looks up the footprint and filter for a package and fills in the
    /// description template.
    pub fn metadata(&self, device: &str, package: &str) -> Result<DeviceMetadata> {
        let footprint = match self.footprints.get(package) {
            Some(footprint) => footprint.clone(),
            None if self.footprint_required => {
                return Err(Error::MissingFootprint {
                    device: device.to_string(),
                    package: package.to_string(),
                });
            }
            None => String::new(),
        };

        let footprint_filter = match self.footprint_filters.get(package) {
            Some(filter) => filter.clone(),
            None => {
                warn!(
                    "No footprint filters found for device {}, package {}",
                    device, package
                );
                String::new()
            }
        };

        Ok(DeviceMetadata {
            description: self
                .description
                .replace("{name}", device)
                .replace("{package}", package),
            keywords: self.keywords.clone(),
            datasheet: self.datasheet.clone(),
            footprint,
            footprint_filter,
        })
    }
}
