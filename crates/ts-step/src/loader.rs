//! CSV loader for correction-relaxation tables.
//!
//! # Format
//!
//! One row per (sweep, iteration) cell:
//!
//! ```csv
//! sweep,iteration,relaxation
//! 0,0,0.25
//! 0,1,0.5
//! 1,0,0.1
//! ```
//!
//! Unlisted sweeps/iterations default to a relaxation of 0.0 (no corridor
//! widening).  Rows may appear in any order; a repeated (sweep, iteration)
//! pair keeps the last value.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::{RelaxationTable, StepError, StepResult};

#[derive(Debug, Deserialize)]
struct RelaxationRecord {
    sweep: u32,
    iteration: u32,
    relaxation: f64,
}

/// Load a [`RelaxationTable`] from any reader producing the CSV format
/// above.
pub fn load_relaxations_reader<R: Read>(reader: R) -> StepResult<RelaxationTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for result in csv_reader.deserialize() {
        let record: RelaxationRecord =
            result.map_err(|e| StepError::Parse(e.to_string()))?;
        let row = record.sweep as usize;
        let column = record.iteration as usize;
        if rows.len() <= row {
            rows.resize(row + 1, Vec::new());
        }
        if rows[row].len() <= column {
            rows[row].resize(column + 1, 0.0);
        }
        rows[row][column] = record.relaxation;
    }

    Ok(RelaxationTable::new(rows))
}

/// Load a [`RelaxationTable`] from a CSV file on disk.
pub fn load_relaxations_csv<P: AsRef<Path>>(path: P) -> StepResult<RelaxationTable> {
    let file = File::open(path)?;
    load_relaxations_reader(file)
}
