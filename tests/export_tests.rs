// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use plc_netlist::export::{export_cells_to_csv, export_hard_macros_to_csv, placed_cells};
use plc_netlist::Design;
use std::fs;

const NETLIST: &str = include_str!("data/design.pb.txt");
const PLACEMENT: &str = include_str!("data/design.plc");

#[test]
fn test_placed_cells_in_index_order() {
    let design = Design::load(NETLIST, PLACEMENT).unwrap();
    let cells = placed_cells(&design);

    let names: Vec<&str> = cells.iter().map(|cell| cell.name.as_str()).collect();
    assert_eq!(names, vec!["M0", "S0", "c0"]);

    // M0 is centred at (150, 200) with a 50 x 40 footprint.
    assert_eq!((cells[0].x, cells[0].y), (125.0, 180.0));
    assert_eq!(cells[0].orientation, "E");
    assert_eq!(cells[2].orientation, "-");
}

#[test]
fn test_export_cells_csv() {
    let design = Design::load(NETLIST, PLACEMENT).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cells.csv");

    export_cells_to_csv(&design, &path).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines[0], "Name,Type,X,Y,Orientation,Width,Height,Fixed");
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "M0,MACRO,125.0,180.0,E,50.0,40.0,false");
    assert_eq!(lines[2], "S0,macro,390.0,390.0,FN,20.0,20.0,false");
    assert_eq!(lines[3], "c0,STDCELL,11.5,13.0,-,1.0,2.0,false");
}

#[test]
fn test_export_hard_macros_csv() {
    let design = Design::load(NETLIST, PLACEMENT).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("macros.csv");

    export_hard_macros_to_csv(&design, &path).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("M0,MACRO,"));
}

#[test]
fn test_export_to_missing_directory_fails() {
    let design = Design::load(NETLIST, PLACEMENT).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent").join("cells.csv");
    assert!(export_cells_to_csv(&design, &path).is_err());
}
