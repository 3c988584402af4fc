// src/pin_models.rs
// Input side of the pipeline: pins as they come out of a pinout table.

use crate::error::{Error, Result};
use serde::Serialize;

/// Functional role of a pin as declared in the pinout table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElectricalRole {
    Upstream,
    Downstream,
    Overcurrent,
    Power,
    Input,
    Output,
    InOut,
    Reset,
    NoConnect,
    Clock,
    Boot,
}

/// KiCad electrical type a role is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KiPinType {
    Input,
    Output,
    Bidirectional,
    PowerIn,
    NoConnect,
}

impl ElectricalRole {
    /// Looks up a role by its table spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        let role = match name {
            "Upstream" => Self::Upstream,
            "Downstream" => Self::Downstream,
            "Overcurrent" => Self::Overcurrent,
            "Power" => Self::Power,
            "Input" => Self::Input,
            "Output" => Self::Output,
            "InOut" | "I/O" => Self::InOut,
            "Reset" => Self::Reset,
            "NC" => Self::NoConnect,
            "Clock" => Self::Clock,
            "Boot" => Self::Boot,
            _ => return None,
        };
        Some(role)
    }

    pub fn pin_type(self) -> KiPinType {
        match self {
            Self::Upstream | Self::Downstream | Self::InOut => KiPinType::Bidirectional,
            Self::Overcurrent | Self::Output => KiPinType::Output,
            Self::Power => KiPinType::PowerIn,
            Self::Input | Self::Reset | Self::Clock | Self::Boot => KiPinType::Input,
            Self::NoConnect => KiPinType::NoConnect,
        }
    }
}

/// One row of a pinout table for one variant, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPinRecord {
    pub number: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pin {
    pub number: String,
    pub name: String,
    pub role: ElectricalRole,
    pub alternate_functions: Vec<String>,
}

impl Pin {
    /// Builds a pin, rejecting role strings outside the recognized set.
    pub fn new(number: &str, name: &str, role: &str) -> Result<Self> {
        let role = ElectricalRole::from_name(role).ok_or_else(|| Error::UnknownRole {
            pin: name.to_string(),
            role: role.to_string(),
        })?;
        Ok(Self::with_role(number, name, role))
    }

    pub fn with_role(number: &str, name: &str, role: ElectricalRole) -> Self {
        Pin {
            number: number.to_string(),
            name: name.to_string(),
            role,
            alternate_functions: Vec::new(),
        }
    }
}

/// Text that travels with a symbol without being interpreted by layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceMetadata {
    pub description: String,
    pub keywords: String,
    pub datasheet: String,
    pub footprint: String,
    pub footprint_filter: String,
}

/// A single device variant ready for layout.
#[derive(Debug, Clone)]
pub struct Device {
    pub name: String,
    pub package: String,
    pub records: Vec<RawPinRecord>,
    pub derived_symbols: Vec<String>,
}
