//! License plate to plate-code lookup table.
//!
//! The table is read once at startup from a workbook whose configured columns
//! hold tokens of the form `PLATE(CODE)` (ASCII or full-width parentheses).
//! Each token is stored twice: under the plate as written and under the plate
//! with hyphens removed, so lookups succeed regardless of caller formatting.
//!
//! Loading never aborts the pipeline: [`MappingTable::load_or_empty`] logs the
//! failure and hands back an empty table, which downstream code treats as
//! "no code available".

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use calamine::{open_workbook_auto, Data, Reader};
use regex::Regex;
use thiserror::Error;

/// Matches `PLATE(CODE)` at the start of a cell, with half or full-width parentheses.
static PLATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([A-Z0-9-]+)\s*[(（](\d+)[)）]").unwrap());

/// Errors that can occur while loading the mapping workbook.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Mapping file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("None of the sheets {tried:?} exist in {}", path.display())]
    NoMatchingSheet { path: PathBuf, tried: Vec<String> },

    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
}

/// Immutable plate → code table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: HashMap<String, String>,
}

impl MappingTable {
    /// An empty table (every lookup misses).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from raw cell strings. Cells that are not `PLATE(CODE)`
    /// tokens are skipped. Later tokens win on duplicate plates.
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::default();
        for cell in cells {
            let cell = cell.as_ref().trim();
            if cell.is_empty() {
                continue;
            }
            if !table.insert_token(cell) {
                tracing::debug!("Cell '{}' did not match PLATE(CODE) format", cell);
            }
        }
        table
    }

    /// Load the table from a workbook.
    ///
    /// The first of `sheets` present in the workbook is read with no header
    /// row; `columns` are zero-based absolute column indices (A = 0).
    pub fn load(path: &Path, sheets: &[String], columns: &[usize]) -> Result<Self, MappingError> {
        if !path.exists() {
            return Err(MappingError::FileNotFound(path.to_path_buf()));
        }

        let mut workbook = open_workbook_auto(path)?;
        let available = workbook.sheet_names();
        let sheet = sheets
            .iter()
            .find(|name| available.iter().any(|a| a == *name))
            .ok_or_else(|| MappingError::NoMatchingSheet {
                path: path.to_path_buf(),
                tried: sheets.to_vec(),
            })?;

        if sheet != &sheets[0] {
            tracing::warn!("Sheet '{}' not found, using '{}'", sheets[0], sheet);
        }

        let range = workbook.worksheet_range(sheet)?;
        let mut cells = Vec::new();

        if let (Some((first_row, _)), Some((last_row, last_col))) = (range.start(), range.end()) {
            for &col in columns {
                if col as u32 > last_col {
                    tracing::debug!("Column {} is outside the used range of '{}'", col + 1, sheet);
                    continue;
                }
                for row in first_row..=last_row {
                    match range.get_value((row, col as u32)) {
                        None | Some(Data::Empty) => {}
                        Some(Data::String(s)) => cells.push(s.clone()),
                        Some(other) => cells.push(other.to_string()),
                    }
                }
            }
        }

        let table = Self::from_cells(cells);
        if table.is_empty() {
            tracing::warn!(
                "No license plate mappings were loaded from {} (check sheet name and column format)",
                path.display()
            );
        } else {
            tracing::info!("Loaded {} license plate mappings", table.len());
        }
        Ok(table)
    }

    /// Load the table, degrading to an empty table on any failure.
    pub fn load_or_empty(path: &Path, sheets: &[String], columns: &[usize]) -> Self {
        match Self::load(path, sheets, columns) {
            Ok(table) => table,
            Err(MappingError::FileNotFound(p)) => {
                let shown = std::fs::canonicalize(&p).unwrap_or(p);
                tracing::error!(
                    "Mapping file not found at '{}'; plate codes will be unavailable",
                    shown.display()
                );
                Self::empty()
            }
            Err(e) => {
                tracing::error!("Error loading license plate mapping: {}", e);
                Self::empty()
            }
        }
    }

    fn insert_token(&mut self, cell: &str) -> bool {
        match parse_plate_token(cell) {
            Some((plate, code)) => {
                self.entries.insert(plate.replace('-', ""), code.clone());
                self.entries.insert(plate, code);
                true
            }
            None => false,
        }
    }

    /// Exact lookup of a normalized plate key.
    pub fn get(&self, plate: &str) -> Option<&str> {
        self.entries.get(plate).map(String::as_str)
    }

    /// Look up a plate as written, then with hyphens stripped.
    pub fn lookup(&self, plate: &str) -> Option<&str> {
        self.get(plate)
            .or_else(|| self.get(&plate.replace('-', "")))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a `PLATE(CODE)` cell into an uppercased plate and its digit code.
pub fn parse_plate_token(cell: &str) -> Option<(String, String)> {
    let caps = PLATE_TOKEN.captures(cell.trim())?;
    let plate = caps.get(1)?.as_str().to_uppercase();
    let code = caps.get(2)?.as_str().to_string();
    Some((plate, code))
}
