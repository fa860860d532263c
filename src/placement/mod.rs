// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::element::Orientation;
use crate::error::PlcError;

/// Target cell density used to derive a square canvas from the module area.
pub const TARGET_DENSITY: f64 = 0.6;

/// Side length of the square canvas holding `total_area` at [`TARGET_DENSITY`].
pub fn derived_canvas_side(total_area: f64) -> f64 {
    (total_area / TARGET_DENSITY).sqrt()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingParams {
    pub routes_per_micron_h: f64,
    pub routes_per_micron_v: f64,
    pub routes_used_by_macros_h: f64,
    pub routes_used_by_macros_v: f64,
    pub smoothing_factor: f64,
    pub overlap_threshold: f64,
}

/// Per-type node counts as written in the header. Advisory only; the
/// netlist is authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeCounts {
    pub macros: usize,
    pub macro_pins: usize,
    pub hard_macros: usize,
    pub hard_macro_pins: usize,
    pub soft_macros: usize,
    pub soft_macro_pins: usize,
    pub ports: usize,
    pub std_cells: usize,
}

/// One `index x y orientation fixed` row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub x: f64,
    pub y: f64,
    /// `None` for `-`: keep the element's current orientation.
    pub orientation: Option<Orientation>,
    /// `None` unless the row says `0` or `1`.
    pub fixed: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Placement {
    pub columns: u32,
    pub rows: u32,
    /// Canvas size from the `Width`/`Height` header, when given.
    pub canvas_width: Option<f64>,
    pub canvas_height: Option<f64>,
    pub total_area: f64,
    pub block_name: Option<String>,
    pub routing: RoutingParams,
    pub counts: NodeCounts,
    pub placements: BTreeMap<usize, PlacementRecord>,
    #[serde(skip)]
    pub diagnostics: Vec<PlcError>,
}

impl Placement {
    /// Header canvas size, or a square derived from `total_area`.
    pub fn canvas_size(&self) -> (f64, f64) {
        match (self.canvas_width, self.canvas_height) {
            (Some(width), Some(height)) => (width, height),
            _ => {
                let side = derived_canvas_side(self.total_area);
                (side, side)
            }
        }
    }
}

pub mod parser;
pub mod reader;
