// src/ports.rs

use crate::classifier::bus_member;
use crate::error::{Error, Result};
use crate::pin_models::Pin;
use std::collections::BTreeMap;

/// Numbered pins sharing a port letter, keyed by index.
///
/// Gaps in the indices are kept as gaps: a port with members 0, 1 and 3
/// renders three pins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub name: char,
    pub members: BTreeMap<u32, Pin>,
}

impl Port {
    pub fn new(name: char) -> Self {
        Port {
            name,
            members: BTreeMap::new(),
        }
    }

    /// Members in ascending index order.
    pub fn pins(&self) -> Vec<Pin> {
        self.members.values().cloned().collect()
    }
}

/// Groups every port pin in `pins` by port letter. Pins that are not port
/// members are ignored.
pub fn group_ports(pins: &[Pin]) -> Result<BTreeMap<char, Port>> {
    let mut ports: BTreeMap<char, Port> = BTreeMap::new();
    for pin in pins {
        let Some((name, index)) = bus_member(pin) else {
            continue;
        };
        let port = ports.entry(name).or_insert_with(|| Port::new(name));
        if let Some(existing) = port.members.get(&index) {
            return Err(Error::DuplicatePortMember {
                port: name,
                index,
                pin: pin.number.clone(),
                existing: existing.number.clone(),
            });
        }
        port.members.insert(index, pin.clone());
    }
    Ok(ports)
}
