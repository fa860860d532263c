// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Netlist parser
//!
//! Drives the [`Lexer`] statement stream through an explicit state machine.
//! A node record looks like:
//!
//! ```text
//! node {
//!   name: "m0/pinA"
//!   input: "p0"
//!   attr {
//!     key: "type"
//!     value {
//!       placeholder: "MACRO_PIN"
//!     }
//!   }
//! }
//! ```
//!
//! Records are dispatched on their `type` attribute into [`Element`]s,
//! indexed in the order they appear.

use std::collections::BTreeMap;

use super::lexer::{Lexer, Statement, Token};
use super::Netlist;
use crate::element::{Element, ElementKind, MacroBlock, MacroPin, Orientation, Port, Side, StdCell};
use crate::error::{record, PlcError, PlcResult};

/// Name of the header record carrying design-wide attributes.
pub const METADATA_NODE: &str = "__metadata__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Between records; only `node {` is accepted.
    ExpectNode,
    ExpectName,
    /// Zero or more `input:` fields.
    ExpectInputs,
    /// Zero or more `attr {` blocks, then the closing `}` of the node.
    ExpectAttr,
    ExpectKey,
    ExpectValue,
    /// Fields of a `value { ... }` block.
    ExpectValueItem,
    ExpectAttrClose,
}

impl State {
    fn describe(self) -> &'static str {
        match self {
            State::ExpectNode => "`node {`",
            State::ExpectName => "`name:`",
            State::ExpectInputs => "`input:`",
            State::ExpectAttr => "`attr {` or `}`",
            State::ExpectKey => "`key:`",
            State::ExpectValue => "`value {`",
            State::ExpectValueItem => "a value field or `}`",
            State::ExpectAttrClose => "`}` closing the attr block",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Token consumed, continue in the given state.
    Advance(State),
    /// Token not consumed; feed it again in the given state.
    Lookahead(State),
    /// Token closed the current node record.
    Complete,
}

/// Raw contents of one `node { ... }` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRecord {
    pub line: usize,
    pub name: String,
    pub inputs: Vec<String>,
    pub attrs: BTreeMap<String, Vec<String>>,
}

impl NodeRecord {
    /// First value token of an attribute.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// Accumulates a node record while its tokens stream by.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    record: NodeRecord,
    key: Option<String>,
    values: Vec<String>,
}

impl RecordBuilder {
    pub fn start_line(&self) -> usize {
        self.record.line
    }

    pub fn finish(&mut self) -> NodeRecord {
        self.key = None;
        self.values.clear();
        std::mem::take(&mut self.record)
    }
}

fn unexpected(state: State, token: &Token) -> PlcError {
    let found = match &token.statement {
        Statement::Open(name) => format!("`{name} {{`"),
        Statement::Close => "`}`".to_string(),
        Statement::Field { key, .. } => format!("field `{key}`"),
    };
    PlcError::MalformedRecord {
        line: token.line,
        message: format!("expected {}, found {found}", state.describe()),
    }
}

/// Single state machine step.
pub fn transition(
    state: State,
    token: &Token,
    builder: &mut RecordBuilder,
) -> PlcResult<Transition> {
    let next = match (state, &token.statement) {
        (State::ExpectNode, Statement::Open(name)) if name == "node" => {
            builder.record.line = token.line;
            Transition::Advance(State::ExpectName)
        }
        (State::ExpectName, Statement::Field { key, value }) if key == "name" => {
            builder.record.name = value.clone();
            Transition::Advance(State::ExpectInputs)
        }
        (State::ExpectInputs, Statement::Field { key, value }) if key == "input" => {
            builder.record.inputs.push(value.clone());
            Transition::Advance(State::ExpectInputs)
        }
        (State::ExpectInputs, _) => Transition::Lookahead(State::ExpectAttr),
        (State::ExpectAttr, Statement::Open(name)) if name == "attr" => {
            Transition::Advance(State::ExpectKey)
        }
        (State::ExpectAttr, Statement::Close) => Transition::Complete,
        (State::ExpectKey, Statement::Field { key, value }) if key == "key" => {
            builder.key = Some(value.clone());
            Transition::Advance(State::ExpectValue)
        }
        (State::ExpectValue, Statement::Open(name)) if name == "value" => {
            Transition::Advance(State::ExpectValueItem)
        }
        (State::ExpectValueItem, Statement::Field { value, .. }) => {
            builder.values.push(value.clone());
            Transition::Advance(State::ExpectValueItem)
        }
        (State::ExpectValueItem, Statement::Close) => Transition::Advance(State::ExpectAttrClose),
        (State::ExpectAttrClose, Statement::Close) => {
            if let Some(key) = builder.key.take() {
                let values = std::mem::take(&mut builder.values);
                builder.record.attrs.insert(key, values);
            }
            Transition::Advance(State::ExpectAttr)
        }
        _ => return Err(unexpected(state, token)),
    };
    Ok(next)
}

/// Builds the [`Netlist`] from completed node records.
#[derive(Debug, Default)]
pub struct NetlistBuilder {
    netlist: Netlist,
}

impl NetlistBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn missing(&mut self, element: &str, attribute: &str) {
        record(
            &mut self.netlist.diagnostics,
            PlcError::MissingRequiredAttribute {
                element: element.to_string(),
                attribute: attribute.to_string(),
            },
        );
    }

    /// Numeric attribute, `None` when absent or unreadable.
    fn number(&mut self, node: &NodeRecord, key: &str) -> Option<f64> {
        let text = node.attr(key)?;
        match text.parse::<f64>() {
            Ok(value) => Some(value),
            Err(_) => {
                self.missing(&node.name, &format!("{key} (unreadable value `{text}`)"));
                None
            }
        }
    }

    /// Numeric attribute the record type requires; defaults to 0.0.
    fn required_number(&mut self, node: &NodeRecord, key: &str) -> f64 {
        if node.attr(key).is_none() {
            self.missing(&node.name, key);
            return 0.0;
        }
        self.number(node, key).unwrap_or(0.0)
    }

    fn orientation(&mut self, node: &NodeRecord) -> Option<Orientation> {
        let text = node.attr("orientation")?;
        match text.parse() {
            Ok(orientation) => Some(orientation),
            Err(_) => {
                self.missing(
                    &node.name,
                    &format!("orientation (unknown value `{text}`)"),
                );
                None
            }
        }
    }

    fn size(&mut self, node: &NodeRecord) -> (f64, f64) {
        (
            self.required_number(node, "width"),
            self.required_number(node, "height"),
        )
    }

    /// Owner of a pin: the name minus its last `/segment`, or the declared
    /// `macro_name` when the pin name has no hierarchy.
    fn pin_owner(&mut self, node: &NodeRecord, require_macro_name: bool) -> String {
        let declared = node.attr("macro_name").map(str::to_string);
        if declared.is_none() && require_macro_name {
            self.missing(&node.name, "macro_name");
        }
        match node.name.rsplit_once('/') {
            Some((owner, _)) => {
                if let Some(declared) = declared.filter(|declared| declared != owner) {
                    log::warn!(
                        "[WARN] {}: macro_name `{declared}` disagrees with pin path, using {owner}",
                        node.name
                    );
                }
                owner.to_string()
            }
            None => declared.unwrap_or_else(|| node.name.clone()),
        }
    }

    fn pin(&mut self, node: &NodeRecord, baseline_offset: (f64, f64), owner: String) -> MacroPin {
        let mut pin = MacroPin::new(owner, baseline_offset);
        if node.attr("weight").is_some() {
            if let Some(weight) = self.number(node, "weight") {
                pin.weight = weight;
            }
        }
        pin.add_sinks(node.inputs.iter().map(String::as_str));
        pin
    }

    fn build_kind(&mut self, node: &NodeRecord) -> PlcResult<ElementKind> {
        let Some(node_type) = node.attr("type") else {
            return Err(PlcError::MalformedRecord {
                line: node.line,
                message: format!("node `{}` has no `type` attribute", node.name),
            });
        };

        let kind = match node_type {
            "PORT" => {
                let side = match node.attr("side") {
                    Some(text) => text.parse().unwrap_or_else(|_| {
                        self.missing(&node.name, &format!("side (unknown value `{text}`)"));
                        Side::default()
                    }),
                    None => Side::default(),
                };
                let mut port = Port {
                    side,
                    ..Port::default()
                };
                port.add_sinks(node.inputs.iter().map(String::as_str));
                ElementKind::Port(port)
            }
            "STDCELL" => {
                let (width, height) = self.size(node);
                let orientation = self.orientation(node);
                ElementKind::StdCell(StdCell {
                    width,
                    height,
                    orientation,
                })
            }
            "macro" => {
                let (width, height) = self.size(node);
                let orientation = self.orientation(node).unwrap_or(Orientation::N);
                ElementKind::SoftMacro(MacroBlock::new(width, height, orientation))
            }
            "MACRO" => {
                let (width, height) = self.size(node);
                if node.attr("orientation").is_none() {
                    self.missing(&node.name, "orientation");
                }
                let orientation = self.orientation(node).unwrap_or(Orientation::N);
                ElementKind::HardMacro(MacroBlock::new(width, height, orientation))
            }
            "macro_pin" => {
                let owner = self.pin_owner(node, false);
                ElementKind::SoftMacroPin(self.pin(node, (0.0, 0.0), owner))
            }
            "MACRO_PIN" => {
                let offset = (
                    self.required_number(node, "x_offset"),
                    self.required_number(node, "y_offset"),
                );
                let owner = self.pin_owner(node, true);
                ElementKind::HardMacroPin(self.pin(node, offset, owner))
            }
            other => {
                return Err(PlcError::MalformedRecord {
                    line: node.line,
                    message: format!("node `{}` has unknown type `{other}`", node.name),
                })
            }
        };
        Ok(kind)
    }

    pub fn add_record(&mut self, node: NodeRecord) -> PlcResult<()> {
        if node.name == METADATA_NODE {
            log::debug!("[DBG] Skipping metadata header ({} attrs)", node.attrs.len());
            self.netlist.metadata.extend(node.attrs);
            return Ok(());
        }
        if self.netlist.name_to_index.contains_key(&node.name) {
            return Err(PlcError::MalformedRecord {
                line: node.line,
                message: format!("duplicate node name `{}`", node.name),
            });
        }

        let kind = self.build_kind(&node)?;

        // Upstream tooling sometimes omits coordinates.
        let mut position = [0.0; 2];
        for (slot, key) in position.iter_mut().zip(["x", "y"]) {
            if node.attr(key).is_none() {
                self.missing(&node.name, key);
            } else if let Some(value) = self.number(&node, key) {
                *slot = value;
            }
        }

        let element = Element::new(node.name, (position[0], position[1]), kind);
        self.netlist.push(element);
        Ok(())
    }

    pub fn finish(self) -> Netlist {
        self.netlist
    }
}

/// Parse a complete netlist. Structural errors abort the parse; data errors
/// on individual records end up in [`Netlist::diagnostics`].
pub fn parse_netlist(content: &str) -> PlcResult<Netlist> {
    let mut netlist = NetlistBuilder::new();
    let mut builder = RecordBuilder::default();
    let mut state = State::ExpectNode;
    let mut lookahead: Option<Token> = None;
    let mut lexer = Lexer::new(content);

    loop {
        let token = match lookahead.take() {
            Some(token) => token,
            None => match lexer.next() {
                Some(token) => token?,
                None => break,
            },
        };

        match transition(state, &token, &mut builder)? {
            Transition::Advance(next) => state = next,
            Transition::Lookahead(next) => {
                state = next;
                lookahead = Some(token);
            }
            Transition::Complete => {
                netlist.add_record(builder.finish())?;
                state = State::ExpectNode;
            }
        }
    }

    if state != State::ExpectNode {
        return Err(PlcError::TruncatedInput {
            line: builder.start_line(),
        });
    }

    Ok(netlist.finish())
}
