// src/kicad_models.rs

use crate::error::Result;
use crate::pin_models::*;
use glam::IVec2; // Grid coordinates, in mil
use serde::Serialize;
use std::fmt::Write;

pub const GRID_UNIT: i32 = 100;
pub const PIN_LENGTH: i32 = 200;

/// Computed drawing surface. Every coordinate is derived from the box size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Canvas {
    pub grid_unit: i32,
    pub pin_stanchion_length: i32,
    pub box_width: i32,
    pub box_height: i32,
}

impl Canvas {
    pub fn sized(box_width: i32, box_height: i32) -> Self {
        Canvas {
            grid_unit: GRID_UNIT,
            pin_stanchion_length: PIN_LENGTH,
            box_width,
            box_height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Direction a pin points from its outer end towards the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    Up,
    Down,
    Left,
    Right,
}

impl Orientation {
    pub fn rotation(self) -> i32 {
        match self {
            Orientation::Right => 0,
            Orientation::Up => 90,
            Orientation::Left => 180,
            Orientation::Down => 270,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Justify {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Label {
    pub pos: IVec2,
    pub justify: Justify,
    pub hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub start: IVec2,
    pub end: IVec2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedPin {
    pub pin: Pin,
    pub edge: Edge,
    pub pos: IVec2,
    pub orientation: Orientation,
    pub length: i32,
    pub visible: bool,
}

/// A fully placed symbol drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub canvas: Canvas,
    pub body: Rect,
    pub pins: Vec<PlacedPin>,
    pub reference: Label,
    pub value: Label,
    pub footprint: Label,
}

impl Symbol {
    /// Returns a copy with every coordinate moved by `offset`.
    pub fn translated(self, offset: IVec2) -> Symbol {
        let move_label = |label: Label| Label {
            pos: label.pos + offset,
            ..label
        };
        Symbol {
            canvas: self.canvas,
            body: Rect {
                start: self.body.start + offset,
                end: self.body.end + offset,
            },
            pins: self
                .pins
                .into_iter()
                .map(|p| PlacedPin {
                    pos: p.pos + offset,
                    ..p
                })
                .collect(),
            reference: move_label(self.reference),
            value: move_label(self.value),
            footprint: move_label(self.footprint),
        }
    }
}

/// A drawn symbol plus the metadata it is published with.
#[derive(Debug, Clone, Serialize)]
pub struct KiSymbol {
    pub name: String,
    pub reference: String,
    pub metadata: DeviceMetadata,
    pub drawing: Symbol,
}

/// A symbol that reuses its parent's drawing, copying only label placement.
#[derive(Debug, Clone)]
pub struct DerivedSymbol {
    pub name: String,
    pub extends: String,
    pub reference: String,
    pub metadata: DeviceMetadata,
    pub reference_label: Label,
    pub value_label: Label,
    pub footprint_label: Label,
}

impl DerivedSymbol {
    pub fn inherit(parent: &KiSymbol, name: &str, metadata: DeviceMetadata) -> Self {
        let drawing = &parent.drawing;
        DerivedSymbol {
            name: name.to_string(),
            extends: parent.name.clone(),
            reference: parent.reference.clone(),
            metadata,
            reference_label: Label {
                pos: drawing.reference.pos,
                justify: drawing.reference.justify,
                hidden: false,
            },
            value_label: Label {
                pos: drawing.value.pos,
                justify: drawing.value.justify,
                hidden: false,
            },
            footprint_label: Label {
                pos: drawing.footprint.pos,
                justify: drawing.footprint.justify,
                hidden: drawing.footprint.hidden,
            },
        }
    }
}

fn mil_to_mm(val: i32) -> f64 {
    (val as f64 * 254.0).round() / 10000.0
}

fn effects(justify: Option<Justify>, hidden: bool) -> String {
    let mut out = String::from("(effects (font (size 1.27 1.27))");
    match justify {
        Some(Justify::Left) => out.push_str(" (justify left)"),
        Some(Justify::Right) => out.push_str(" (justify right)"),
        None => {}
    }
    if hidden {
        out.push_str(" hide");
    }
    out.push(')');
    out
}

fn write_property(out: &mut String, id: u32, key: &str, value: &str, label: Option<&Label>) {
    let (x, y, justify, hidden) = match label {
        Some(l) => (mil_to_mm(l.pos.x), mil_to_mm(l.pos.y), Some(l.justify), l.hidden),
        None => (0.0, 0.0, None, true),
    };
    writeln!(
        out,
        "  (property \"{}\" \"{}\" (id {}) (at {} {} 0) {})",
        key,
        escape_str(value),
        id,
        x,
        y,
        effects(justify, hidden)
    )
    .unwrap();
}

fn write_properties(
    out: &mut String,
    name: &str,
    reference: &str,
    metadata: &DeviceMetadata,
    labels: [&Label; 3],
) {
    write_property(out, 0, "Reference", reference, Some(labels[0]));
    write_property(out, 1, "Value", name, Some(labels[1]));
    write_property(out, 2, "Footprint", &metadata.footprint, Some(labels[2]));
    write_property(out, 3, "Datasheet", &metadata.datasheet, None);
    write_property(out, 4, "ki_keywords", &metadata.keywords, None);
    write_property(out, 5, "ki_description", &metadata.description, None);
    write_property(out, 6, "ki_fp_filters", &metadata.footprint_filter, None);
}

fn pin_type_str(pin_type: KiPinType) -> &'static str {
    match pin_type {
        KiPinType::Input => "input",
        KiPinType::Output => "output",
        KiPinType::Bidirectional => "bidirectional",
        KiPinType::PowerIn => "power_in",
        KiPinType::NoConnect => "no_connect",
    }
}

/// Escapes a value for use inside a quoted S-expression string.
pub fn escape_str(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn escape_name(name: &str) -> String {
    let name = escape_str(name);
    if let Some(stripped) = name.strip_prefix('~') {
        format!("~{{{}}}", stripped)
    } else {
        name
    }
}

impl KiSymbol {
    /// Dumps the placed drawing and metadata as JSON, coordinates in mil.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_kicad_lib_entry(&self) -> String {
        let mut out = String::new();
        let d = &self.drawing;
        writeln!(
            &mut out,
            "(symbol \"{}\" (in_bom yes) (on_board yes)",
            escape_str(&self.name)
        )
        .unwrap();

        // --- Properties ---
        write_properties(
            &mut out,
            &self.name,
            &self.reference,
            &self.metadata,
            [&d.reference, &d.value, &d.footprint],
        );

        // --- Symbol Graphics ---
        let unit_name = escape_str(&self.name);
        writeln!(&mut out, "  (symbol \"{}_0_1\"", unit_name).unwrap();
        writeln!(&mut out, "    (rectangle (start {} {}) (end {} {}) (stroke (width 0.254) (type default) (color 0 0 0 0)) (fill (type background)))",
            mil_to_mm(d.body.start.x), mil_to_mm(d.body.start.y), mil_to_mm(d.body.end.x), mil_to_mm(d.body.end.y)).unwrap();
        writeln!(&mut out, "  )").unwrap();

        writeln!(&mut out, "  (symbol \"{}_1_1\"", unit_name).unwrap();
        for placed in &d.pins {
            let pin_type = pin_type_str(placed.pin.role.pin_type());
            writeln!(
                &mut out,
                "    (pin {} line (at {} {} {}) (length {}){}",
                pin_type,
                mil_to_mm(placed.pos.x),
                mil_to_mm(placed.pos.y),
                placed.orientation.rotation(),
                mil_to_mm(placed.length),
                if placed.visible { "" } else { " hide" }
            )
            .unwrap();
            writeln!(
                &mut out,
                r#"      (name "{}" (effects (font (size 1.27 1.27))))
      (number "{}" (effects (font (size 1.27 1.27))))"#,
                escape_name(&placed.pin.name),
                escape_str(&placed.pin.number)
            )
            .unwrap();
            for alt in &placed.pin.alternate_functions {
                writeln!(
                    &mut out,
                    "      (alternate \"{}\" {} line)",
                    escape_name(alt),
                    pin_type
                )
                .unwrap();
            }
            writeln!(&mut out, "    )").unwrap();
        }

        writeln!(&mut out, "  )\n)").unwrap(); // Close symbol "{name}_1_1" and main symbol
        out
    }
}

impl DerivedSymbol {
    pub fn to_kicad_lib_entry(&self) -> String {
        let mut out = String::new();
        writeln!(
            &mut out,
            "(symbol \"{}\" (extends \"{}\")",
            escape_str(&self.name),
            escape_str(&self.extends)
        )
        .unwrap();
        write_properties(
            &mut out,
            &self.name,
            &self.reference,
            &self.metadata,
            [
                &self.reference_label,
                &self.value_label,
                &self.footprint_label,
            ],
        );
        writeln!(&mut out, ")").unwrap();
        out
    }
}
