// src/layout.rs
//
// Places classified pins around a rectangular body. Coordinates are in mil
// with the body's lower-left corner at the origin; `centering` moves the
// result afterwards.

use crate::classifier::ClassifiedPins;
use crate::kicad_models::*;
use crate::pin_models::Pin;
use crate::ports::Port;
use glam::IVec2;
use log::debug;
use std::collections::BTreeMap;

/// Rough width of one character of pin name text, in mil.
const CHAR_WIDTH: i32 = 47;

/// Label anchors sit this far above the body.
const LABEL_OFFSET: i32 = 50;

/// Pins of one device assigned to the body edges.
#[derive(Debug, Clone, Default)]
pub struct EdgeGroups {
    pub left: Vec<Vec<Pin>>,
    pub right: Vec<Vec<Pin>>,
    pub top: Vec<Pin>,
    pub bottom: Vec<Pin>,
    pub no_connect: Vec<Pin>,
}

fn sorted_by_name(pins: &[Pin]) -> Vec<Pin> {
    let mut pins = pins.to_vec();
    pins.sort_by(|a, b| a.name.cmp(&b.name));
    pins
}

impl EdgeGroups {
    /// Orders the category buckets onto edges. Empty groups are dropped.
    pub fn assemble(classified: &ClassifiedPins, ports: &BTreeMap<char, Port>) -> Self {
        let left = [
            classified.reset.clone(),
            classified.boot.clone(),
            sorted_by_name(&classified.power_left),
            classified.clock.clone(),
            classified.other.clone(),
            classified.upstream.clone(),
        ];

        let mut right = vec![classified.downstream.clone(), classified.overcurrent.clone()];
        right.extend(ports.values().map(Port::pins));

        EdgeGroups {
            left: left.into_iter().filter(|g| !g.is_empty()).collect(),
            right: right.into_iter().filter(|g| !g.is_empty()).collect(),
            top: sorted_by_name(&classified.power_top),
            bottom: sorted_by_name(&classified.power_bottom),
            no_connect: classified.no_connect.clone(),
        }
    }
}

fn round_up(x: i32, y: i32) -> i32 {
    (x + y - 1).div_euclid(y) * y
}

fn group_label_width(group: &[Pin]) -> i32 {
    group
        .iter()
        .map(|p| p.name.chars().count() as i32 * CHAR_WIDTH)
        .max()
        .unwrap_or(0)
}

/// Widest label of any group on a side, rounded up to the grid. A side with
/// no groups is zero wide.
fn side_width(groups: &[Vec<Pin>]) -> i32 {
    let widest = groups.iter().map(|g| group_label_width(g)).max().unwrap_or(0);
    round_up(widest, GRID_UNIT)
}

/// One gap per group plus one slot per pin.
fn side_height(groups: &[Vec<Pin>]) -> i32 {
    groups
        .iter()
        .map(|g| GRID_UNIT + GRID_UNIT * g.len() as i32)
        .sum()
}

/// Box size and the horizontal split needed to place the top/bottom rows.
#[derive(Debug, Clone, Copy)]
struct Dimensions {
    canvas: Canvas,
    left_width: i32,
    middle_width: i32,
}

impl Dimensions {
    fn compute(groups: &EdgeGroups) -> Self {
        let left_height =
            side_height(&groups.left) + GRID_UNIT * groups.no_connect.len() as i32;
        let right_height = side_height(&groups.right);
        let box_height = left_height.max(right_height) + GRID_UNIT;

        let left_width = side_width(&groups.left);
        let right_width = side_width(&groups.right);
        let top_width = groups.top.len() as i32 * GRID_UNIT;
        let bottom_width = groups.bottom.len() as i32 * GRID_UNIT;
        let middle_width = GRID_UNIT + top_width.max(bottom_width);
        let box_width = left_width + middle_width + right_width;

        Dimensions {
            canvas: Canvas::sized(box_width, box_height),
            left_width,
            middle_width,
        }
    }

    /// First x of a centered top or bottom row.
    fn row_start(&self, row_width: i32) -> i32 {
        let x = self.left_width + (GRID_UNIT + self.middle_width) / 2 - row_width / 2;
        x.div_euclid(GRID_UNIT) * GRID_UNIT
    }
}

fn place(pin: &Pin, edge: Edge, pos: IVec2, orientation: Orientation) -> PlacedPin {
    PlacedPin {
        pin: pin.clone(),
        edge,
        pos,
        orientation,
        length: PIN_LENGTH,
        visible: true,
    }
}

/// Lays out one device. The result is anchored at the body's lower-left
/// corner.
pub fn layout(classified: &ClassifiedPins, ports: &BTreeMap<char, Port>) -> Symbol {
    let groups = EdgeGroups::assemble(classified, ports);
    let dims = Dimensions::compute(&groups);
    let Canvas {
        box_width,
        box_height,
        ..
    } = dims.canvas;

    debug!(
        "layout: {} left groups, {} right groups, {} top, {} bottom, {} nc; box {}x{}",
        groups.left.len(),
        groups.right.len(),
        groups.top.len(),
        groups.bottom.len(),
        groups.no_connect.len(),
        box_width,
        box_height
    );

    let mut pins = Vec::new();

    // Left side, top down
    let mut y = box_height - GRID_UNIT;
    for group in &groups.left {
        for pin in group {
            pins.push(place(pin, Edge::Left, IVec2::new(-PIN_LENGTH, y), Orientation::Right));
            y -= GRID_UNIT;
        }
        y -= GRID_UNIT;
    }

    // Right side, bottom up in reverse so it reads in group order from the top
    let mut y = GRID_UNIT;
    for group in groups.right.iter().rev() {
        for pin in group.iter().rev() {
            pins.push(place(
                pin,
                Edge::Right,
                IVec2::new(box_width + PIN_LENGTH, y),
                Orientation::Left,
            ));
            y += GRID_UNIT;
        }
        y += GRID_UNIT;
    }

    let mut x = dims.row_start(groups.top.len() as i32 * GRID_UNIT);
    for pin in &groups.top {
        pins.push(place(
            pin,
            Edge::Top,
            IVec2::new(x, box_height + PIN_LENGTH),
            Orientation::Down,
        ));
        x += GRID_UNIT;
    }
    let value_x = x;

    let mut x = dims.row_start(groups.bottom.len() as i32 * GRID_UNIT);
    for pin in &groups.bottom {
        pins.push(place(pin, Edge::Bottom, IVec2::new(x, -PIN_LENGTH), Orientation::Up));
        x += GRID_UNIT;
    }

    // NC pins sit flush against the left edge, hidden
    let mut y = GRID_UNIT;
    for pin in &groups.no_connect {
        pins.push(PlacedPin {
            length: 0,
            visible: false,
            ..place(pin, Edge::Left, IVec2::new(0, y), Orientation::Right)
        });
        y += GRID_UNIT;
    }

    Symbol {
        canvas: dims.canvas,
        body: Rect {
            start: IVec2::ZERO,
            end: IVec2::new(box_width, box_height),
        },
        pins,
        reference: Label {
            pos: IVec2::new(0, box_height + LABEL_OFFSET),
            justify: Justify::Left,
            hidden: false,
        },
        value: Label {
            pos: IVec2::new(value_x, box_height + LABEL_OFFSET),
            justify: Justify::Left,
            hidden: false,
        },
        footprint: Label {
            pos: IVec2::ZERO,
            justify: Justify::Right,
            hidden: true,
        },
    }
}
