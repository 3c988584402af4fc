// src/centering.rs

use crate::kicad_models::Symbol;
use glam::IVec2;

/// Where the body's lower-left corner lands once the symbol is centered.
pub fn centered_origin(symbol: &Symbol) -> IVec2 {
    let canvas = &symbol.canvas;
    let g = canvas.grid_unit;
    IVec2::new(
        -(canvas.box_width / 2 / g * g),
        -(canvas.box_height / 2 / g * g),
    )
}

/// Moves the whole drawing so the body sits around the origin, snapped to
/// the grid. The offset is measured from the current body corner, so a
/// symbol that is already centered comes back unchanged.
pub fn center(symbol: Symbol) -> Symbol {
    let offset = centered_origin(&symbol) - symbol.body.start;
    if offset == IVec2::ZERO {
        return symbol;
    }
    symbol.translated(offset)
}
