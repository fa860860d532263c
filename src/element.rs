// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Circuit elements of a placement netlist.
//!
//! Every node record of the netlist becomes one [`Element`]: the fields all
//! elements share (name, position, fixed flag) plus one of six variants.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sink group -> sink names driven by a pin or port, in input order.
pub type Sinks = BTreeMap<String, Vec<String>>;

/// Sink group -> accumulated edge weight.
pub type Connections = BTreeMap<String, f64>;

/// Group a sink name belongs to: `macro/pin` -> `macro`, a port is its own group.
pub fn sink_group(sink_name: &str) -> &str {
    sink_name
        .rsplit_once('/')
        .map(|(group, _)| group)
        .unwrap_or(sink_name)
}

/// Add `weight` to `connections` once per sink occurrence.
pub fn accumulate_connections(connections: &mut Connections, sinks: &Sinks, weight: f64) {
    for names in sinks.values() {
        for name in names {
            *connections.entry(sink_group(name).to_string()).or_insert(0.0) += weight;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    N,
    S,
    E,
    W,
    FN,
    FS,
    FE,
    FW,
}

impl Orientation {
    pub const ALL: [Orientation; 8] = [
        Orientation::N,
        Orientation::S,
        Orientation::E,
        Orientation::W,
        Orientation::FN,
        Orientation::FS,
        Orientation::FE,
        Orientation::FW,
    ];

    /// Rotate/mirror an unrotated pin offset into this orientation.
    pub fn transform(self, (dx, dy): (f64, f64)) -> (f64, f64) {
        match self {
            Orientation::N => (dx, dy),
            Orientation::FN => (-dx, dy),
            Orientation::S => (-dx, -dy),
            Orientation::FS => (dx, -dy),
            Orientation::E => (dy, -dx),
            Orientation::FE => (-dy, -dx),
            Orientation::W => (-dy, dx),
            Orientation::FW => (dy, dx),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::N => "N",
            Orientation::S => "S",
            Orientation::E => "E",
            Orientation::W => "W",
            Orientation::FN => "FN",
            Orientation::FS => "FS",
            Orientation::FE => "FE",
            Orientation::FW => "FW",
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Orientation::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| format!("unknown orientation `{s}`"))
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas edge a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Side {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TOP" => Ok(Side::Top),
            "BOTTOM" => Ok(Side::Bottom),
            "LEFT" => Ok(Side::Left),
            "RIGHT" => Ok(Side::Right),
            _ => Err(format!("unknown port side `{s}`")),
        }
    }
}

/// Coarse node type as reported to placement consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Port,
    Macro,
    MacroPin,
}

impl TypeTag {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Port => "PORT",
            TypeTag::Macro => "MACRO",
            TypeTag::MacroPin => "MACRO_PIN",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Port {
    pub side: Side,
    pub sinks: Sinks,
    pub connections: Connections,
}

impl Port {
    /// Record the inputs driven by this port. Each occurrence weighs 1.
    pub fn add_sinks<'a>(&mut self, sink_names: impl IntoIterator<Item = &'a str>) {
        for sink in sink_names {
            let group = sink_group(sink).to_string();
            *self.connections.entry(group.clone()).or_insert(0.0) += 1.0;
            self.sinks.entry(group).or_default().push(sink.to_string());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StdCell {
    pub width: f64,
    pub height: f64,
    pub orientation: Option<Orientation>,
}

/// Body of a hard or soft macro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroBlock {
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
    pub connections: Connections,
    pub placed: bool,
}

impl MacroBlock {
    pub fn new(width: f64, height: f64, orientation: Orientation) -> Self {
        Self {
            width,
            height,
            orientation,
            connections: Connections::new(),
            placed: false,
        }
    }

    /// Add `weight` to the group of every sink occurrence.
    pub fn add_connections(&mut self, sinks: &Sinks, weight: f64) {
        accumulate_connections(&mut self.connections, sinks, weight);
    }
}

/// Pin of a hard or soft macro.
///
/// `baseline_offset` is the offset as parsed, in the unrotated macro frame.
/// `offset` is derived from it and the owning macro's orientation; soft
/// macro pins keep both at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroPin {
    pub owner: String,
    pub weight: f64,
    pub sinks: Sinks,
    pub offset: (f64, f64),
    pub baseline_offset: (f64, f64),
}

impl MacroPin {
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    pub fn new(owner: String, baseline_offset: (f64, f64)) -> Self {
        Self {
            owner,
            weight: Self::DEFAULT_WEIGHT,
            sinks: Sinks::new(),
            offset: baseline_offset,
            baseline_offset,
        }
    }

    pub fn add_sinks<'a>(&mut self, sink_names: impl IntoIterator<Item = &'a str>) {
        for sink in sink_names {
            self.sinks
                .entry(sink_group(sink).to_string())
                .or_default()
                .push(sink.to_string());
        }
    }

    /// Recompute `offset` from the baseline for the given macro orientation.
    pub fn orient(&mut self, orientation: Orientation) {
        self.offset = orientation.transform(self.baseline_offset);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    Port(Port),
    StdCell(StdCell),
    SoftMacro(MacroBlock),
    SoftMacroPin(MacroPin),
    HardMacro(MacroBlock),
    HardMacroPin(MacroPin),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub position: (f64, f64),
    pub fixed: bool,
    pub kind: ElementKind,
}

impl Element {
    pub fn new(name: String, position: (f64, f64), kind: ElementKind) -> Self {
        // Ports are terminals of the design and never move.
        let fixed = matches!(kind, ElementKind::Port(_));
        Self {
            name,
            position,
            fixed,
            kind,
        }
    }

    pub fn type_tag(&self) -> TypeTag {
        match self.kind {
            ElementKind::Port(_) => TypeTag::Port,
            ElementKind::StdCell(_) | ElementKind::SoftMacro(_) | ElementKind::HardMacro(_) => {
                TypeTag::Macro
            }
            ElementKind::SoftMacroPin(_) | ElementKind::HardMacroPin(_) => TypeTag::MacroPin,
        }
    }

    /// Record type as written in the netlist `type` attribute.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Port(_) => "PORT",
            ElementKind::StdCell(_) => "STDCELL",
            ElementKind::SoftMacro(_) => "macro",
            ElementKind::SoftMacroPin(_) => "macro_pin",
            ElementKind::HardMacro(_) => "MACRO",
            ElementKind::HardMacroPin(_) => "MACRO_PIN",
        }
    }

    pub fn size(&self) -> Option<(f64, f64)> {
        match &self.kind {
            ElementKind::StdCell(cell) => Some((cell.width, cell.height)),
            ElementKind::SoftMacro(block) | ElementKind::HardMacro(block) => {
                Some((block.width, block.height))
            }
            ElementKind::Port(_) | ElementKind::SoftMacroPin(_) | ElementKind::HardMacroPin(_) => {
                None
            }
        }
    }

    pub fn area(&self) -> f64 {
        self.size().map(|(w, h)| w * h).unwrap_or(0.0)
    }

    pub fn orientation(&self) -> Option<Orientation> {
        match &self.kind {
            ElementKind::StdCell(cell) => cell.orientation,
            ElementKind::SoftMacro(block) | ElementKind::HardMacro(block) => {
                Some(block.orientation)
            }
            ElementKind::Port(_) | ElementKind::SoftMacroPin(_) | ElementKind::HardMacroPin(_) => {
                None
            }
        }
    }

    pub fn connections(&self) -> Option<&Connections> {
        match &self.kind {
            ElementKind::Port(port) => Some(&port.connections),
            ElementKind::SoftMacro(block) | ElementKind::HardMacro(block) => {
                Some(&block.connections)
            }
            ElementKind::StdCell(_)
            | ElementKind::SoftMacroPin(_)
            | ElementKind::HardMacroPin(_) => None,
        }
    }

    pub fn sinks(&self) -> Option<&Sinks> {
        match &self.kind {
            ElementKind::Port(port) => Some(&port.sinks),
            ElementKind::SoftMacroPin(pin) | ElementKind::HardMacroPin(pin) => Some(&pin.sinks),
            ElementKind::StdCell(_) | ElementKind::SoftMacro(_) | ElementKind::HardMacro(_) => {
                None
            }
        }
    }

    pub fn as_pin(&self) -> Option<&MacroPin> {
        match &self.kind {
            ElementKind::SoftMacroPin(pin) | ElementKind::HardMacroPin(pin) => Some(pin),
            _ => None,
        }
    }

    pub fn as_macro(&self) -> Option<&MacroBlock> {
        match &self.kind {
            ElementKind::SoftMacro(block) | ElementKind::HardMacro(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_macro_mut(&mut self) -> Option<&mut MacroBlock> {
        match &mut self.kind {
            ElementKind::SoftMacro(block) | ElementKind::HardMacro(block) => Some(block),
            _ => None,
        }
    }

    pub fn is_pin(&self) -> bool {
        self.type_tag() == TypeTag::MacroPin
    }
}
