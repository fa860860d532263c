// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Assembled design: a netlist with its placement applied and the connection
//! and pin-offset passes run.
//!
//! Read accessors never panic on a bad index: they return `None` or an error
//! value. Mutation goes through [`Design::set_position`],
//! [`Design::set_orientation`] and [`Design::set_fixed`]; callers sharing a
//! design across threads must serialize those.

mod assemble;

use std::collections::BTreeMap;
use std::path::Path;

use crate::element::{Connections, Element, ElementKind, Orientation, Sinks, TypeTag};
use crate::error::{PlcError, PlcResult};
use crate::netlist::parser::parse_netlist;
use crate::netlist::reader::NetlistReader;
use crate::netlist::{CategoryIndices, Netlist};
use crate::placement::parser::parse_placement;
use crate::placement::reader::PlacementReader;
use crate::placement::{derived_canvas_side, Placement};

#[derive(Debug, Clone)]
pub struct Design {
    netlist: Netlist,
    placement: Placement,
    placed: Vec<usize>,
    diagnostics: Vec<PlcError>,
}

impl Design {
    /// Merge `placement` into `netlist` and run the connection and pin-offset
    /// passes.
    pub fn assemble(mut netlist: Netlist, mut placement: Placement) -> Self {
        let mut diagnostics = std::mem::take(&mut netlist.diagnostics);
        diagnostics.append(&mut placement.diagnostics);

        let mut design = Self {
            netlist,
            placement,
            placed: Vec::new(),
            diagnostics,
        };
        design.apply_placement();
        design.aggregate_connections();
        design.orient_all_hard_macros();
        design.mark_macros_placed();
        design
    }

    /// Assemble a netlist without a placement file.
    pub fn from_netlist(netlist: Netlist) -> Self {
        Self::assemble(netlist, Placement::default())
    }

    /// Parse and assemble in-memory netlist and placement text.
    pub fn load(netlist: &str, placement: &str) -> PlcResult<Self> {
        let netlist = parse_netlist(netlist)?;
        Ok(Self::assemble(netlist, parse_placement(placement)))
    }

    pub fn load_files<P: AsRef<Path>, Q: AsRef<Path>>(
        netlist_path: P,
        placement_path: Option<Q>,
    ) -> PlcResult<Self> {
        let netlist = NetlistReader::new().read(netlist_path)?;
        let placement = match placement_path {
            Some(path) => PlacementReader::new().read(path)?,
            None => Placement::default(),
        };
        Ok(Self::assemble(netlist, placement))
    }

    pub fn netlist(&self) -> &Netlist {
        &self.netlist
    }

    /// Placement header data and the rows as read from the file.
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Attributes of the netlist's `__metadata__` record.
    pub fn metadata(&self) -> &BTreeMap<String, Vec<String>> {
        &self.netlist.metadata
    }

    /// Recoverable problems found while parsing and assembling.
    pub fn diagnostics(&self) -> &[PlcError] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.netlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.netlist.is_empty()
    }

    pub fn elements(&self) -> &[Element] {
        &self.netlist.elements
    }

    pub fn element(&self, index: usize) -> Option<&Element> {
        self.netlist.element(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.netlist.index_of(name)
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.netlist.name_of(index)
    }

    pub fn indices(&self) -> &CategoryIndices {
        &self.netlist.indices
    }

    pub fn macro_pins(&self, macro_name: &str) -> Option<&[String]> {
        self.netlist.pins_of(macro_name)
    }

    pub fn connections(&self, index: usize) -> Option<&Connections> {
        self.element(index).and_then(Element::connections)
    }

    pub fn sinks(&self, index: usize) -> Option<&Sinks> {
        self.element(index).and_then(Element::sinks)
    }

    /// Indices of the macros currently on the canvas.
    pub fn placed_macros(&self) -> &[usize] {
        &self.placed
    }

    pub fn grid(&self) -> (u32, u32) {
        (self.placement.columns, self.placement.rows)
    }

    pub fn node_type(&self, index: usize) -> Option<TypeTag> {
        match self.element(index) {
            Some(element) => Some(element.type_tag()),
            None => {
                log::warn!("[WARN] Node index {index} is out of range");
                None
            }
        }
    }

    pub fn is_soft_macro(&self, index: usize) -> bool {
        matches!(
            self.element(index).map(|element| &element.kind),
            Some(ElementKind::SoftMacro(_))
        )
    }

    pub fn is_hard_macro(&self, index: usize) -> bool {
        matches!(
            self.element(index).map(|element| &element.kind),
            Some(ElementKind::HardMacro(_))
        )
    }

    /// Index of the macro a pin belongs to. `None` for non-pins and for pins
    /// whose owner is missing or of the wrong kind.
    pub fn ref_node_index(&self, pin_index: usize) -> Option<usize> {
        let element = self.element(pin_index)?;
        let pin = element.as_pin()?;
        let owner = self.index_of(&pin.owner)?;
        let resolved = match element.kind {
            ElementKind::HardMacroPin(_) => self.is_hard_macro(owner),
            _ => self.is_soft_macro(owner),
        };
        resolved.then_some(owner)
    }

    /// Absolute position of a port or macro pin.
    pub fn pin_absolute_position(&self, pin_index: usize) -> PlcResult<(f64, f64)> {
        let element = self.element(pin_index).ok_or(PlcError::IndexOutOfRange {
            index: pin_index,
            len: self.len(),
        })?;

        match &element.kind {
            ElementKind::Port(_) => Ok(element.position),
            ElementKind::HardMacroPin(pin) | ElementKind::SoftMacroPin(pin) => {
                let owner = self.ref_node_index(pin_index).ok_or_else(|| {
                    PlcError::DanglingPinReference {
                        pin: element.name.clone(),
                        owner: pin.owner.clone(),
                    }
                })?;
                let (x, y) = self.netlist.elements[owner].position;
                Ok((x + pin.offset.0, y + pin.offset.1))
            }
            _ => Err(PlcError::InvalidOperation {
                element: element.name.clone(),
                message: format!("{} is not a pin or port", element.kind_name()),
            }),
        }
    }

    /// Sum of `width * height` over cells and macros.
    pub fn total_area(&self) -> f64 {
        self.netlist.elements.iter().map(Element::area).sum()
    }

    /// Header canvas size, or a square holding the current module area at
    /// the target density.
    pub fn canvas_size(&self) -> (f64, f64) {
        match (self.placement.canvas_width, self.placement.canvas_height) {
            (Some(width), Some(height)) => (width, height),
            _ => {
                let side = derived_canvas_side(self.total_area());
                (side, side)
            }
        }
    }

    fn element_mut(&mut self, index: usize) -> PlcResult<&mut Element> {
        let len = self.netlist.elements.len();
        self.netlist
            .elements
            .get_mut(index)
            .ok_or(PlcError::IndexOutOfRange { index, len })
    }

    pub fn set_position(&mut self, index: usize, x: f64, y: f64) -> PlcResult<()> {
        self.element_mut(index)?.position = (x, y);
        Ok(())
    }

    pub fn set_fixed(&mut self, index: usize, fixed: bool) -> PlcResult<()> {
        self.element_mut(index)?.fixed = fixed;
        Ok(())
    }

    /// Re-orient a cell or macro. Hard macro pin offsets follow immediately.
    pub fn set_orientation(&mut self, index: usize, orientation: Orientation) -> PlcResult<()> {
        let element = self.element_mut(index)?;
        let kind_name = element.kind_name();
        let hard_macro = match &mut element.kind {
            ElementKind::StdCell(cell) => {
                cell.orientation = Some(orientation);
                false
            }
            ElementKind::SoftMacro(block) => {
                block.orientation = orientation;
                false
            }
            ElementKind::HardMacro(block) => {
                block.orientation = orientation;
                true
            }
            ElementKind::Port(_) | ElementKind::SoftMacroPin(_) | ElementKind::HardMacroPin(_) => {
                return Err(PlcError::InvalidOperation {
                    element: element.name.clone(),
                    message: format!("only cells and macros can be oriented, not {kind_name}"),
                });
            }
        };
        if hard_macro {
            self.orient_pins(index);
        }
        Ok(())
    }
}
