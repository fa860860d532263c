// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Placement Netlist Library
//!
//! This library parses protobuf-text netlists and `.plc` placement files
//! used by macro placement flows, and merges them into one typed model of
//! ports, standard cells, macros and macro pins.

pub mod design;
pub mod element;
pub mod error;
pub mod export;
pub mod netlist;
pub mod placement;

// Re-export commonly used types
pub use design::Design;
pub use element::{
    Element, ElementKind, MacroBlock, MacroPin, Orientation, Port, Side, StdCell, TypeTag,
};
pub use error::{PlcError, PlcResult};
pub use netlist::{CategoryIndices, Netlist};
pub use placement::{Placement, PlacementRecord};
