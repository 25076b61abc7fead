use std::path::Path;

use itertools::Itertools;
use log::{info, warn};

use crate::error::{Result, WealthGapError};
use crate::load_clean::{cell, read_rows};
use crate::store::{JoinKeyMap, RecordStore};

/// Where the identity columns sit in the primary (national GDP) dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryLayout {
    pub name_column: usize,
    pub code_column: usize,
}

impl Default for PrimaryLayout {
    fn default() -> Self {
        Self {
            name_column: 0,
            code_column: 1,
        }
    }
}

/// Title-cases every whitespace separated word of a country name.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().map(capitalize).join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Builds the record store and the join-key map from the primary dataset.
pub fn populate(
    path: &Path,
    header_lines: usize,
    layout: PrimaryLayout,
) -> Result<(RecordStore, JoinKeyMap)> {
    let rows = read_rows(path, header_lines)?;
    let mut store = RecordStore::new();
    let mut keys = JoinKeyMap::new();

    for (i, row) in rows.iter().enumerate() {
        let row_number = header_lines + i + 1;
        let missing = |column| WealthGapError::MissingJoinColumn {
            path: path.to_path_buf(),
            row: row_number,
            column,
        };
        let name = row.get(layout.name_column).ok_or_else(|| missing(layout.name_column))?;
        let code = row.get(layout.code_column).ok_or_else(|| missing(layout.code_column))?;

        let name = normalize_name(name);
        let Some(code) = cell(code) else {
            warn!("{}: row {row_number} has no country code, skipping", path.display());
            continue;
        };
        if name.is_empty() {
            warn!("{}: row {row_number} has no country name, skipping", path.display());
            continue;
        }

        if !store.insert(&name) {
            warn!("{}: duplicate country {name} at row {row_number}", path.display());
        }
        if let Some(previous) = keys.insert(code, &name) {
            if previous != name {
                warn!("{}: code {code} remapped from {previous} to {name}", path.display());
            }
        }
    }

    info!(
        "Populated {} countries and {} codes from {}",
        store.len(),
        keys.len(),
        path.display()
    );
    Ok((store, keys))
}
