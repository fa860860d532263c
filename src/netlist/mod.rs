// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementKind};
use crate::error::PlcError;

/// Element indices split by variant. Every index appears in exactly one list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryIndices {
    pub ports: Vec<usize>,
    pub hard_macros: Vec<usize>,
    pub hard_macro_pins: Vec<usize>,
    pub soft_macros: Vec<usize>,
    pub soft_macro_pins: Vec<usize>,
    pub std_cells: Vec<usize>,
    /// Ports, hard macros and soft macros in parse order.
    pub modules: Vec<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Netlist {
    /// Node records in parse order; the position is the node index.
    pub elements: Vec<Element>,
    pub name_to_index: HashMap<String, usize>,
    pub indices: CategoryIndices,
    /// Hard macro name -> its pin names, in parse order.
    pub hard_macro_pins: HashMap<String, Vec<String>>,
    /// Soft macro name -> its pin names, in parse order.
    pub soft_macro_pins: HashMap<String, Vec<String>>,
    /// Attributes of the `__metadata__` header record.
    pub metadata: BTreeMap<String, Vec<String>>,
    #[serde(skip)]
    pub diagnostics: Vec<PlcError>,
}

impl Netlist {
    /// Append an element, assigning it the next index.
    pub(crate) fn push(&mut self, element: Element) {
        let index = self.elements.len();
        self.name_to_index.insert(element.name.clone(), index);

        let indices = &mut self.indices;
        match &element.kind {
            ElementKind::Port(_) => {
                indices.ports.push(index);
                indices.modules.push(index);
            }
            ElementKind::StdCell(_) => indices.std_cells.push(index),
            ElementKind::SoftMacro(_) => {
                indices.soft_macros.push(index);
                indices.modules.push(index);
            }
            ElementKind::HardMacro(_) => {
                indices.hard_macros.push(index);
                indices.modules.push(index);
            }
            ElementKind::SoftMacroPin(pin) => {
                indices.soft_macro_pins.push(index);
                self.soft_macro_pins
                    .entry(pin.owner.clone())
                    .or_default()
                    .push(element.name.clone());
            }
            ElementKind::HardMacroPin(pin) => {
                indices.hard_macro_pins.push(index);
                self.hard_macro_pins
                    .entry(pin.owner.clone())
                    .or_default()
                    .push(element.name.clone());
            }
        }

        self.elements.push(element);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.elements.get(index).map(|element| element.name.as_str())
    }

    /// Pin names of a hard or soft macro.
    pub fn pins_of(&self, macro_name: &str) -> Option<&[String]> {
        self.hard_macro_pins
            .get(macro_name)
            .or_else(|| self.soft_macro_pins.get(macro_name))
            .map(Vec::as_slice)
    }
}

pub mod lexer;
pub mod parser;
pub mod reader;
