// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::design::Design;
use crate::element::{Element, ElementKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellCsvRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: &'static str,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Orientation")]
    pub orientation: String,
    #[serde(rename = "Width")]
    pub width: f64,
    #[serde(rename = "Height")]
    pub height: f64,
    #[serde(rename = "Fixed")]
    pub fixed: bool,
}

/// Convert a cell or macro to a record with its lower-left corner.
fn element_to_csv_record(element: &Element) -> Option<CellCsvRecord> {
    let (width, height) = element.size()?;
    let (x, y) = element.position;
    Some(CellCsvRecord {
        name: element.name.clone(),
        kind: element.kind_name(),
        x: x - width / 2.0,
        y: y - height / 2.0,
        orientation: element
            .orientation()
            .map(|o| o.to_string())
            .unwrap_or_else(|| "-".to_string()),
        width,
        height,
        fixed: element.fixed,
    })
}

/// Hard macros, soft macros and standard cells in index order.
pub fn placed_cells(design: &Design) -> Vec<CellCsvRecord> {
    design
        .elements()
        .iter()
        .filter_map(element_to_csv_record)
        .collect()
}

fn write_records<P: AsRef<Path>>(
    records: &[CellCsvRecord],
    file_path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(file_path)?;
    let mut writer = Writer::from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Export every placed cell and macro to a CSV file
pub fn export_cells_to_csv<P: AsRef<Path>>(
    design: &Design,
    file_path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = placed_cells(design);
    log::info!("[INFO] Exporting {} cells", records.len());
    write_records(&records, file_path)
}

/// Export only the hard macros, the input of a macro placement run
pub fn export_hard_macros_to_csv<P: AsRef<Path>>(
    design: &Design,
    file_path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let records: Vec<CellCsvRecord> = design
        .elements()
        .iter()
        .filter(|element| matches!(element.kind, ElementKind::HardMacro(_)))
        .filter_map(element_to_csv_record)
        .collect();
    log::info!("[INFO] Exporting {} hard macros", records.len());
    write_records(&records, file_path)
}
