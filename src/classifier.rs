// src/classifier.rs

use crate::error::{Error, Result};
use crate::pin_models::*;
use regex::Regex;
use std::sync::LazyLock;

/// Port pins are a `P`, a one-letter port name and a decimal index, e.g. `PA7`.
static BUS_MEMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^P([A-Z])([0-9]+)$").expect("valid bus member pattern"));

/// Pins whose table role is wrong for how they are actually used.
const ROLE_OVERRIDES: &[(&str, ElectricalRole)] = &[
    ("RCC_OSC_IN", ElectricalRole::Clock),
    ("RCC_OSC_OUT", ElectricalRole::Clock),
];

/// Multi-function names mapped to their primary function. An empty list keeps the name.
const NAME_ALIASES: &[(&str, &[&str])] = &[
    ("PC14OSC32_IN", &["PC14"]),
    ("PC15OSC32_OUT", &["PC15"]),
    ("PF11BOOT0", &["PF11"]),
    ("OSC_IN", &[]),
    ("OSC_OUT", &[]),
    ("VREF-", &["VREF-"]),
    ("VREFSD-", &["VREFSD-"]),
];

const POWER_REFERENCE_PREFIX: &str = "VREF";
const POSITIVE_SUPPLY_PREFIXES: &[&str] = &["VDD", "VBAT", "5V"];
const GROUND_PREFIXES: &[&str] = &["VSS", "GND"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerSide {
    Top,
    Bottom,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCategory {
    BusMember { port: char, index: u32 },
    Clock,
    Power(PowerSide),
    Reset,
    Boot,
    NoConnect,
    UsbUpstream,
    UsbDownstream,
    Overcurrent,
    Other,
}

/// Turns a table record into a pin, applying the override and alias tables.
pub fn resolve_pin(record: &RawPinRecord) -> Result<Pin> {
    let pin = match ROLE_OVERRIDES.iter().find(|(name, _)| *name == record.name) {
        Some((_, role)) => Pin::with_role(&record.number, &record.name, *role),
        None => Pin::new(&record.number, &record.name, &record.role)?,
    };

    apply_alias(pin, NAME_ALIASES)
}

fn apply_alias(mut pin: Pin, aliases: &[(&str, &[&str])]) -> Result<Pin> {
    let Some((_, candidates)) = aliases.iter().find(|(name, _)| *name == pin.name) else {
        return Ok(pin);
    };
    match candidates {
        [] => {}
        [primary] if *primary == pin.name => {}
        [primary] => {
            let original = std::mem::replace(&mut pin.name, primary.to_string());
            pin.alternate_functions.push(original);
        }
        _ => {
            return Err(Error::AmbiguousPinName {
                pin: pin.name.clone(),
                candidates: candidates.iter().map(|c| c.to_string()).collect(),
            });
        }
    }
    Ok(pin)
}

/// Splits a port pin name into its port letter and index.
///
/// Only input, output, bidirectional and clock pins are eligible; anything
/// else with a port-like name is left to the other rules.
pub fn bus_member(pin: &Pin) -> Option<(char, u32)> {
    if !matches!(
        pin.role,
        ElectricalRole::Input | ElectricalRole::Output | ElectricalRole::InOut | ElectricalRole::Clock
    ) {
        return None;
    }
    let caps = BUS_MEMBER.captures(&pin.name)?;
    let port = caps[1].chars().next()?;
    let index = caps[2].parse().ok()?;
    Some((port, index))
}

pub fn classify(pin: &Pin) -> PinCategory {
    if let Some((port, index)) = bus_member(pin) {
        return PinCategory::BusMember { port, index };
    }

    // These roles win over any name-based guess.
    match pin.role {
        ElectricalRole::Clock => return PinCategory::Clock,
        ElectricalRole::Reset => return PinCategory::Reset,
        ElectricalRole::Boot => return PinCategory::Boot,
        ElectricalRole::NoConnect => return PinCategory::NoConnect,
        _ => {}
    }

    if pin.role == ElectricalRole::Power || pin.name.starts_with(POWER_REFERENCE_PREFIX) {
        return PinCategory::Power(power_side(&pin.name));
    }

    match pin.role {
        ElectricalRole::Upstream => PinCategory::UsbUpstream,
        ElectricalRole::Downstream => PinCategory::UsbDownstream,
        ElectricalRole::Overcurrent => PinCategory::Overcurrent,
        _ => PinCategory::Other,
    }
}

fn power_side(name: &str) -> PowerSide {
    if POSITIVE_SUPPLY_PREFIXES.iter().any(|p| name.starts_with(p)) {
        PowerSide::Top
    } else if GROUND_PREFIXES.iter().any(|p| name.starts_with(p)) {
        PowerSide::Bottom
    } else {
        PowerSide::Left
    }
}

/// Pins of one device sorted into per-category buckets, in input order.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedPins {
    pub reset: Vec<Pin>,
    pub boot: Vec<Pin>,
    pub power_left: Vec<Pin>,
    pub power_top: Vec<Pin>,
    pub power_bottom: Vec<Pin>,
    pub clock: Vec<Pin>,
    pub other: Vec<Pin>,
    pub upstream: Vec<Pin>,
    pub downstream: Vec<Pin>,
    pub overcurrent: Vec<Pin>,
    pub no_connect: Vec<Pin>,
    pub bus_members: Vec<Pin>,
}

impl ClassifiedPins {
    pub fn from_pins(pins: Vec<Pin>) -> Self {
        let mut classified = ClassifiedPins::default();
        for pin in pins {
            let bucket = match classify(&pin) {
                PinCategory::BusMember { .. } => &mut classified.bus_members,
                PinCategory::Clock => &mut classified.clock,
                PinCategory::Power(PowerSide::Top) => &mut classified.power_top,
                PinCategory::Power(PowerSide::Bottom) => &mut classified.power_bottom,
                PinCategory::Power(PowerSide::Left) => &mut classified.power_left,
                PinCategory::Reset => &mut classified.reset,
                PinCategory::Boot => &mut classified.boot,
                PinCategory::NoConnect => &mut classified.no_connect,
                PinCategory::UsbUpstream => &mut classified.upstream,
                PinCategory::UsbDownstream => &mut classified.downstream,
                PinCategory::Overcurrent => &mut classified.overcurrent,
                PinCategory::Other => &mut classified.other,
            };
            bucket.push(pin);
        }
        classified
    }

    pub fn len(&self) -> usize {
        [
            &self.reset,
            &self.boot,
            &self.power_left,
            &self.power_top,
            &self.power_bottom,
            &self.clock,
            &self.other,
            &self.upstream,
            &self.downstream,
            &self.overcurrent,
            &self.no_connect,
            &self.bus_members,
        ]
        .iter()
        .map(|bucket| bucket.len())
        .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_alias_is_rejected() {
        let aliases: &[(&str, &[&str])] = &[("PB2BOOT1", &["PB2", "BOOT1"])];
        let pin = Pin::new("20", "PB2BOOT1", "InOut").unwrap();
        match apply_alias(pin, aliases) {
            Err(Error::AmbiguousPinName { pin, candidates }) => {
                assert_eq!(pin, "PB2BOOT1");
                assert_eq!(candidates, vec!["PB2", "BOOT1"]);
            }
            other => panic!("Expected AmbiguousPinName, got {:?}", other),
        }
    }

    #[test]
    fn test_unlisted_name_is_untouched() {
        let pin = Pin::new("1", "PA0", "InOut").unwrap();
        assert_eq!(apply_alias(pin.clone(), NAME_ALIASES).unwrap(), pin);
    }
}
