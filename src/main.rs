// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::path::PathBuf;

use clap::Parser;

use plc_netlist::export::{export_cells_to_csv, export_hard_macros_to_csv};
use plc_netlist::Design;

#[derive(Parser)]
#[command(name = "plc-netlist")]
#[command(about = "Load a protobuf-text netlist and its placement file", long_about = None)]
struct Cli {
    /// Netlist in protobuf text format
    netlist: PathBuf,

    /// Placement (.plc) file to apply on top of the netlist
    #[arg(short, long)]
    placement: Option<PathBuf>,

    /// Write the placed cells and macros to this CSV file
    #[arg(long, value_name = "OUT")]
    csv: Option<PathBuf>,

    /// Only export hard macros
    #[arg(long, requires = "csv")]
    hard_macros_only: bool,
}

fn print_summary(design: &Design) {
    let indices = design.indices();
    println!("Elements:        {}", design.len());
    println!("  ports:         {}", indices.ports.len());
    println!("  hard macros:   {}", indices.hard_macros.len());
    println!("  hard pins:     {}", indices.hard_macro_pins.len());
    println!("  soft macros:   {}", indices.soft_macros.len());
    println!("  soft pins:     {}", indices.soft_macro_pins.len());
    println!("  std cells:     {}", indices.std_cells.len());

    let (columns, rows) = design.grid();
    let (width, height) = design.canvas_size();
    println!("Grid:            {columns} x {rows}");
    println!("Canvas:          {width:.3} x {height:.3}");
    println!("Total area:      {:.3}", design.total_area());
    println!("Diagnostics:     {}", design.diagnostics().len());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let design = Design::load_files(&cli.netlist, cli.placement.as_ref())?;
    print_summary(&design);

    if let Some(out) = &cli.csv {
        if cli.hard_macros_only {
            export_hard_macros_to_csv(&design, out)?;
        } else {
            export_cells_to_csv(&design, out)?;
        }
        println!("Exported:        {}", out.display());
    }

    Ok(())
}
