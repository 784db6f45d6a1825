// src/frame/mod.rs

pub mod cell;
pub mod header;
pub mod read;

use anyhow::{bail, Result};
use serde::Serialize;

pub use cell::{Cell, Values};
pub use read::{read_csv, read_csv_from, ReadOptions, DEFAULT_INDEX_COLUMN};

/// A labelled numeric table: the value matrix plus its column and row labels.
///
/// Field order is the serialized order, `values`, `columns`, `index`, which
/// is the shape a DataFrame constructor on the consuming side expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataFrame {
    values: Values,
    columns: Vec<String>,
    index: Vec<String>,
}

impl DataFrame {
    /// Build a frame, checking that one label exists per row and per column.
    pub fn new(values: Values, columns: Vec<String>, index: Vec<String>) -> Result<Self> {
        if values.num_rows() != index.len() {
            bail!(
                "frame has {} rows but {} row labels",
                values.num_rows(),
                index.len()
            );
        }
        match values.uniform_width() {
            None => bail!("frame rows have differing widths"),
            Some(Some(w)) if w != columns.len() => {
                bail!("frame rows have {} cells but {} column labels", w, columns.len())
            }
            _ => {}
        }
        Ok(Self {
            values,
            columns,
            index,
        })
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.index.len(), self.columns.len())
    }

    /// Compact JSON, e.g. `{"values":[[1,2]],"columns":["a","b"],"index":["x"]}`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
