// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::{parser::parse_placement, Placement};
use crate::error::{PlcError, PlcResult};

pub struct PlacementReader;

impl PlacementReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read<P: AsRef<Path>>(&self, path: P) -> PlcResult<Placement> {
        let path = path.as_ref();
        log::info!("[LOAD] Loading placement: {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| PlcError::Io {
            path: path.to_path_buf(),
            source: Arc::new(source),
        })?;
        log::info!("[FILE] Placement size: {} bytes", content.len());

        let placement = parse_placement(&content);
        log::info!(
            "[INFO] Grid {}x{}, {} placement rows",
            placement.columns,
            placement.rows,
            placement.placements.len()
        );
        if let Some(block) = &placement.block_name {
            log::info!("[INFO] Block: {block}");
        }
        if !placement.diagnostics.is_empty() {
            log::warn!(
                "[WARN] {} unreadable lines in placement file",
                placement.diagnostics.len()
            );
        }

        Ok(placement)
    }
}

impl Default for PlacementReader {
    fn default() -> Self {
        Self::new()
    }
}
