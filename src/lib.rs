// src/lib.rs

pub mod centering;
pub mod classifier;
pub mod config;
pub mod converter;
pub mod error;
pub mod file_writer;
pub mod importer;
pub mod kicad_models;
pub mod layout;
pub mod pin_models;
pub mod ports;

use crate::config::FamilyConfig;
use crate::converter::{ConvertedDevice, convert_device};
use crate::error::{Error, Result};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What `generate_library` wrote and which devices it had to skip.
#[derive(Debug)]
pub struct GenerationReport {
    pub library: PathBuf,
    pub written: Vec<String>,
    pub failed: Vec<(String, Error)>,
}

/// Lays out every device in parallel. Results come back in device order.
pub async fn convert_devices(
    devices: Vec<pin_models::Device>,
    config: Arc<FamilyConfig>,
) -> Vec<(String, Result<ConvertedDevice>)> {
    let handles: Vec<_> = devices
        .into_iter()
        .map(|device| {
            let config = Arc::clone(&config);
            let name = device.name.clone();
            let handle = tokio::task::spawn_blocking(move || convert_device(&device, &config));
            (name, handle)
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (name, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(Error::from(e)),
        };
        results.push((name, result));
    }
    results
}

/// Reads a pinout table and family catalog and writes one symbol per device
/// (plus derived symbols) into `<output_dir>/symbols/<family>.kicad_sym`.
///
/// A device that fails is left out entirely and reported; the rest are still
/// written.
pub async fn generate_library(
    table_path: &Path,
    config_path: &Path,
    output_dir: &Path,
) -> Result<GenerationReport> {
    let table_text = tokio::fs::read_to_string(table_path).await?;
    let config_text = tokio::fs::read_to_string(config_path).await?;

    let table = importer::parse_pin_table(&table_text)?;
    let config = Arc::new(FamilyConfig::from_json(&config_text)?);
    let devices = config.devices(&table)?;
    info!(
        "Generating {} symbols for family {}",
        devices.len(),
        config.family
    );

    let kicad_lib = file_writer::KicadLibrary {
        path: output_dir.to_path_buf(),
    };
    kicad_lib.setup_directories()?;

    let mut report = GenerationReport {
        library: kicad_lib.library_path(&config.family),
        written: Vec::new(),
        failed: Vec::new(),
    };

    for (name, result) in convert_devices(devices, Arc::clone(&config)).await {
        let converted = match result {
            Ok(converted) => converted,
            Err(e) => {
                error!("Skipping device {}: {}", name, e);
                report.failed.push((name, e));
                continue;
            }
        };

        match kicad_lib.add_device(&config.family, &converted) {
            Ok(names) => report.written.extend(names),
            Err(e) => {
                error!("Failed to write device {}: {}", name, e);
                report.failed.push((name, e));
            }
        }
    }

    info!(
        "Wrote {} symbols to {:?}, skipped {} devices",
        report.written.len(),
        report.library,
        report.failed.len()
    );
    Ok(report)
}
