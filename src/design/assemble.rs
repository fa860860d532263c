// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Merging a placement into a netlist, then the connection and pin-offset
//! passes that run over the merged model.

use super::Design;
use crate::element::{accumulate_connections, Connections, ElementKind, TypeTag};
use crate::error::{record, PlcError};
use crate::placement::PlacementRecord;

impl Design {
    /// Element a placement row addresses: the full element list first, then
    /// the port/macro subset for indices past its end.
    fn placement_target(&self, index: usize) -> Option<usize> {
        if index < self.netlist.elements.len() {
            Some(index)
        } else {
            // Mirrors the upstream placer's lookup. `modules` is a subset of
            // `elements`, so this only matters if the two lists diverge.
            self.netlist.indices.modules.get(index).copied()
        }
    }

    pub(super) fn apply_placement(&mut self) {
        let rows: Vec<(usize, PlacementRecord)> = self
            .placement
            .placements
            .iter()
            .map(|(index, row)| (*index, *row))
            .collect();

        let mut applied = 0;
        for (index, row) in rows {
            let Some(target) = self.placement_target(index) else {
                record(
                    &mut self.diagnostics,
                    PlcError::IndexOutOfRange {
                        index,
                        len: self.netlist.elements.len(),
                    },
                );
                continue;
            };
            if self.apply_row(target, &row) {
                applied += 1;
            }
        }
        log::info!("[INFO] Applied {applied} placement rows");
    }

    /// Returns `false` when the row was rejected.
    fn apply_row(&mut self, index: usize, row: &PlacementRecord) -> bool {
        let element = &mut self.netlist.elements[index];

        // Pin geometry comes from the owning macro; a row here is misaligned.
        if element.is_pin() {
            let error = PlcError::InvalidOperation {
                element: element.name.clone(),
                message: format!("placement row {index} addresses a macro pin, row skipped"),
            };
            record(&mut self.diagnostics, error);
            return false;
        }

        element.position = (row.x, row.y);
        if let Some(fixed) = row.fixed {
            element.fixed = fixed;
        }

        if let Some(orientation) = row.orientation {
            let kind_name = element.kind_name();
            match &mut element.kind {
                ElementKind::StdCell(cell) => cell.orientation = Some(orientation),
                ElementKind::SoftMacro(block) | ElementKind::HardMacro(block) => {
                    block.orientation = orientation
                }
                ElementKind::Port(_)
                | ElementKind::SoftMacroPin(_)
                | ElementKind::HardMacroPin(_) => {
                    let error = PlcError::InvalidOperation {
                        element: element.name.clone(),
                        message: format!("{kind_name} has no orientation, `{orientation}` ignored"),
                    };
                    record(&mut self.diagnostics, error);
                }
            }
        }
        true
    }

    /// Sum the weighted sink occurrences of every macro's pins into the
    /// macro's connection map.
    pub(super) fn aggregate_connections(&mut self) {
        let macros: Vec<usize> = self
            .netlist
            .indices
            .hard_macros
            .iter()
            .chain(&self.netlist.indices.soft_macros)
            .copied()
            .collect();

        for macro_index in macros {
            let name = &self.netlist.elements[macro_index].name;
            let table = if self.is_soft_macro(macro_index) {
                &self.netlist.soft_macro_pins
            } else {
                &self.netlist.hard_macro_pins
            };
            let Some(pin_names) = table.get(name) else {
                let error = PlcError::InvalidOperation {
                    element: name.clone(),
                    message: "macro has no pins, connection update skipped".to_string(),
                };
                record(&mut self.diagnostics, error);
                continue;
            };
            if self.node_type(macro_index) != Some(TypeTag::Macro) {
                continue;
            }

            let mut connections = Connections::new();
            for pin_name in pin_names {
                let pin = self
                    .netlist
                    .index_of(pin_name)
                    .and_then(|index| self.netlist.elements[index].as_pin());
                if let Some(pin) = pin {
                    accumulate_connections(&mut connections, &pin.sinks, pin.weight);
                }
            }

            // Rebuilt from the pins so re-assembling a design is stable.
            if let Some(block) = self.netlist.elements[macro_index].as_macro_mut() {
                block.connections = connections;
            }
        }

        self.report_dangling_pins();
    }

    /// Pins whose owner is not a macro of the matching kind.
    fn report_dangling_pins(&mut self) {
        let pins: Vec<usize> = self
            .netlist
            .indices
            .hard_macro_pins
            .iter()
            .chain(&self.netlist.indices.soft_macro_pins)
            .copied()
            .collect();

        for pin_index in pins {
            if self.ref_node_index(pin_index).is_some() {
                continue;
            }
            let element = &self.netlist.elements[pin_index];
            if let Some(pin) = element.as_pin() {
                let error = PlcError::DanglingPinReference {
                    pin: element.name.clone(),
                    owner: pin.owner.clone(),
                };
                record(&mut self.diagnostics, error);
            }
        }
    }

    /// Recompute the pin offsets of one hard macro from their baselines.
    pub(super) fn orient_pins(&mut self, macro_index: usize) {
        let element = &self.netlist.elements[macro_index];
        let ElementKind::HardMacro(block) = &element.kind else {
            return;
        };
        let orientation = block.orientation;
        let Some(pin_names) = self.netlist.hard_macro_pins.get(&element.name) else {
            return;
        };

        let pins: Vec<usize> = pin_names
            .iter()
            .filter_map(|pin_name| self.netlist.index_of(pin_name))
            .collect();
        for pin_index in pins {
            if let ElementKind::HardMacroPin(pin) = &mut self.netlist.elements[pin_index].kind {
                pin.orient(orientation);
            }
        }
    }

    pub(super) fn orient_all_hard_macros(&mut self) {
        for macro_index in self.netlist.indices.hard_macros.clone() {
            self.orient_pins(macro_index);
        }
    }

    /// All macros start out on the canvas.
    pub(super) fn mark_macros_placed(&mut self) {
        let macros: Vec<usize> = self
            .netlist
            .indices
            .hard_macros
            .iter()
            .chain(&self.netlist.indices.soft_macros)
            .copied()
            .collect();
        for &index in &macros {
            if let Some(block) = self.netlist.elements[index].as_macro_mut() {
                block.placed = true;
            }
        }
        self.placed = macros;
    }
}
