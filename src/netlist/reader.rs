// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::{parser::parse_netlist, Netlist};
use crate::error::{PlcError, PlcResult};

pub struct NetlistReader;

impl NetlistReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read<P: AsRef<Path>>(&self, path: P) -> PlcResult<Netlist> {
        let path = path.as_ref();
        log::info!("[LOAD] Loading netlist: {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| PlcError::Io {
            path: path.to_path_buf(),
            source: Arc::new(source),
        })?;
        log::info!("[FILE] Netlist size: {} bytes", content.len());

        match parse_netlist(&content) {
            Ok(netlist) => {
                log::info!("[PASS] Netlist parsed successfully!");
                let indices = &netlist.indices;
                log::info!(
                    "[INFO] {} nodes: {} ports, {} std cells",
                    netlist.len(),
                    indices.ports.len(),
                    indices.std_cells.len()
                );
                log::info!(
                    "[INFO] {} hard macros ({} pins), {} soft macros ({} pins)",
                    indices.hard_macros.len(),
                    indices.hard_macro_pins.len(),
                    indices.soft_macros.len(),
                    indices.soft_macro_pins.len()
                );
                if !netlist.diagnostics.is_empty() {
                    log::warn!(
                        "[WARN] {} recoverable problems in netlist",
                        netlist.diagnostics.len()
                    );
                }
                Ok(netlist)
            }
            Err(e) => {
                log::error!("[FAIL] Failed to parse netlist: {e}");
                Err(e)
            }
        }
    }
}

impl Default for NetlistReader {
    fn default() -> Self {
        Self::new()
    }
}
