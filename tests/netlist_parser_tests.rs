// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Test cases for the protobuf-text netlist parser
//!
//! Tests cover:
//! - Every node type and its attributes
//! - The metadata header record
//! - Category index lists and the name/index bijection
//! - Recoverable and fatal record errors
//! - Loading from disk

use plc_netlist::element::{ElementKind, Orientation, Side};
use plc_netlist::netlist::parser::parse_netlist;
use plc_netlist::netlist::reader::NetlistReader;
use plc_netlist::PlcError;
use std::fs;

const NETLIST: &str = include_str!("data/design.pb.txt");

#[test]
fn test_parse_all_node_types() {
    let netlist = parse_netlist(NETLIST).unwrap();
    assert_eq!(netlist.len(), 9);
    assert!(netlist.diagnostics.is_empty(), "{:?}", netlist.diagnostics);

    let names: Vec<&str> = netlist.elements.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["p0", "M0", "M0/P1", "M0/P2", "S0", "S0/A", "S0/B", "c0", "p1"]
    );

    match &netlist.elements[0].kind {
        ElementKind::Port(port) => {
            assert_eq!(port.side, Side::Top);
            assert_eq!(port.connections["M0"], 2.0);
            assert_eq!(port.sinks["M0"], vec!["M0/P1", "M0/P2"]);
        }
        other => panic!("expected port, got {other:?}"),
    }
    assert!(netlist.elements[0].fixed);
    assert_eq!(netlist.elements[0].position, (0.0, 100.0));

    match &netlist.elements[1].kind {
        ElementKind::HardMacro(block) => {
            assert_eq!((block.width, block.height), (50.0, 40.0));
            assert_eq!(block.orientation, Orientation::N);
        }
        other => panic!("expected hard macro, got {other:?}"),
    }
    assert!(!netlist.elements[1].fixed);

    match &netlist.elements[2].kind {
        ElementKind::HardMacroPin(pin) => {
            assert_eq!(pin.owner, "M0");
            assert_eq!(pin.weight, 2.0);
            assert_eq!(pin.baseline_offset, (-10.0, 5.0));
        }
        other => panic!("expected hard macro pin, got {other:?}"),
    }

    match &netlist.elements[4].kind {
        ElementKind::SoftMacro(block) => assert_eq!(block.orientation, Orientation::N),
        other => panic!("expected soft macro, got {other:?}"),
    }
    match &netlist.elements[5].kind {
        ElementKind::SoftMacroPin(pin) => {
            assert_eq!(pin.owner, "S0");
            assert_eq!(pin.offset, (0.0, 0.0));
        }
        other => panic!("expected soft macro pin, got {other:?}"),
    }
    match &netlist.elements[7].kind {
        ElementKind::StdCell(cell) => assert_eq!(cell.orientation, None),
        other => panic!("expected standard cell, got {other:?}"),
    }
}

#[test]
fn test_metadata_is_not_an_element() {
    let netlist = parse_netlist(NETLIST).unwrap();
    assert!(netlist.index_of("__metadata__").is_none());
    assert_eq!(
        netlist.metadata["soft_macro_area_bloating_ratio"],
        vec!["1.0".to_string()]
    );
}

#[test]
fn test_name_index_bijection() {
    let netlist = parse_netlist(NETLIST).unwrap();
    assert_eq!(netlist.name_to_index.len(), netlist.len());
    for (index, element) in netlist.elements.iter().enumerate() {
        assert_eq!(netlist.index_of(&element.name), Some(index));
        assert_eq!(netlist.name_of(index), Some(element.name.as_str()));
    }
}

#[test]
fn test_category_indices_partition_elements() {
    let netlist = parse_netlist(NETLIST).unwrap();
    let indices = &netlist.indices;
    assert_eq!(indices.ports, vec![0, 8]);
    assert_eq!(indices.hard_macros, vec![1]);
    assert_eq!(indices.hard_macro_pins, vec![2, 3]);
    assert_eq!(indices.soft_macros, vec![4]);
    assert_eq!(indices.soft_macro_pins, vec![5, 6]);
    assert_eq!(indices.std_cells, vec![7]);
    assert_eq!(indices.modules, vec![0, 1, 4, 8]);

    let mut all: Vec<usize> = [
        &indices.ports,
        &indices.hard_macros,
        &indices.hard_macro_pins,
        &indices.soft_macros,
        &indices.soft_macro_pins,
        &indices.std_cells,
    ]
    .into_iter()
    .flatten()
    .copied()
    .collect();
    all.sort_unstable();
    assert_eq!(all, (0..netlist.len()).collect::<Vec<_>>());
}

#[test]
fn test_macro_pin_tables() {
    let netlist = parse_netlist(NETLIST).unwrap();
    assert_eq!(netlist.pins_of("M0").unwrap(), ["M0/P1", "M0/P2"]);
    assert_eq!(netlist.pins_of("S0").unwrap(), ["S0/A", "S0/B"]);
    assert!(netlist.pins_of("c0").is_none());
}

#[test]
fn test_missing_attributes_default_and_report() {
    let content = r#"
node {
  name: "M9"
  attr { key: "type" value { placeholder: "MACRO" } }
  attr { key: "width" value { f: 4 } }
  attr { key: "x" value { f: 1 } }
}
"#;
    let netlist = parse_netlist(content).unwrap();
    assert_eq!(netlist.len(), 1);
    let element = &netlist.elements[0];
    assert_eq!(element.size(), Some((4.0, 0.0)));
    assert_eq!(element.position, (1.0, 0.0));
    assert_eq!(element.orientation(), Some(Orientation::N));

    let missing: Vec<&str> = netlist
        .diagnostics
        .iter()
        .map(|d| match d {
            PlcError::MissingRequiredAttribute { element, attribute } => {
                assert_eq!(element, "M9");
                attribute.as_str()
            }
            other => panic!("unexpected diagnostic {other:?}"),
        })
        .collect();
    assert!(missing.contains(&"height"));
    assert!(missing.contains(&"orientation"));
    assert!(missing.contains(&"y"));
}

#[test]
fn test_duplicate_name_is_fatal() {
    let content = r#"
node {
  name: "p0"
  attr { key: "type" value { placeholder: "PORT" } }
}
node {
  name: "p0"
  attr { key: "type" value { placeholder: "PORT" } }
}
"#;
    assert!(matches!(
        parse_netlist(content),
        Err(PlcError::MalformedRecord { line: 6, .. })
    ));
}

#[test]
fn test_missing_type_is_fatal() {
    let content = r#"
node {
  name: "x"
  attr { key: "x" value { f: 1 } }
}
"#;
    assert!(matches!(
        parse_netlist(content),
        Err(PlcError::MalformedRecord { .. })
    ));
}

#[test]
fn test_truncated_record() {
    let content = "node {\n  name: \"p0\"\n  input: \"m0/a\"\n";
    assert!(matches!(
        parse_netlist(content),
        Err(PlcError::TruncatedInput { line: 1 })
    ));
}

#[test]
fn test_empty_netlist() {
    let netlist = parse_netlist("\n# nothing here\n").unwrap();
    assert!(netlist.is_empty());
}

#[test]
fn test_reader_loads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("netlist.pb.txt");
    fs::write(&path, NETLIST).unwrap();

    let netlist = NetlistReader::new().read(&path).unwrap();
    assert_eq!(netlist.len(), 9);
}

#[test]
fn test_reader_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = NetlistReader::new().read(dir.path().join("absent.pb.txt"));
    assert!(matches!(result, Err(PlcError::Io { .. })));
}
