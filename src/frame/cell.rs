use anyhow::{anyhow, Result};
use serde::Serialize;

/// A single parsed value cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
}

impl Cell {
    pub fn as_f64(self) -> f64 {
        match self {
            Cell::Int(i) => i as f64,
            Cell::Float(f) => f,
        }
    }
}

/// The value matrix, stored under a single dtype for the whole frame.
///
/// Serializes as a bare array of arrays: integers stay integral (`1`),
/// floats keep their fractional form (`1.0`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Values {
    Int(Vec<Vec<i64>>),
    Float(Vec<Vec<f64>>),
}

impl Values {
    pub fn num_rows(&self) -> usize {
        match self {
            Values::Int(rows) => rows.len(),
            Values::Float(rows) => rows.len(),
        }
    }

    /// Width of every row, or `None` if the rows disagree.
    /// An empty matrix has no width to report.
    pub fn uniform_width(&self) -> Option<Option<usize>> {
        fn width<T>(rows: &[Vec<T>]) -> Option<Option<usize>> {
            let Some(first) = rows.first() else {
                return Some(None);
            };
            rows.iter()
                .all(|r| r.len() == first.len())
                .then_some(Some(first.len()))
        }
        match self {
            Values::Int(rows) => width(rows),
            Values::Float(rows) => width(rows),
        }
    }

    /// Cell at (`row`, `col`) widened to `f64`.
    pub fn get_f64(&self, row: usize, col: usize) -> Option<f64> {
        match self {
            Values::Int(rows) => rows.get(row)?.get(col).map(|&i| i as f64),
            Values::Float(rows) => rows.get(row)?.get(col).copied(),
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, Values::Int(_))
    }
}

/// Parse one value cell: surrounding whitespace is ignored, integers are kept
/// exact, anything else must be a finite float.
pub fn parse_cell(raw: &str) -> Result<Cell> {
    let v = raw.trim();
    if v.is_empty() {
        return Err(anyhow!("empty cell"));
    }
    if let Ok(i) = v.parse::<i64>() {
        return Ok(Cell::Int(i));
    }
    match v.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(Cell::Float(f)),
        Ok(_) => Err(anyhow!("non-finite value {:?}", v)),
        Err(_) => Err(anyhow!("not a number: {:?}", v)),
    }
}

/// Collapse parsed rows into one dtype: all-integer frames stay integral,
/// a single float anywhere upcasts the whole matrix.
pub fn resolve(rows: Vec<Vec<Cell>>) -> Values {
    let all_int = rows
        .iter()
        .flatten()
        .all(|c| matches!(c, Cell::Int(_)));

    if all_int {
        Values::Int(
            rows.into_iter()
                .map(|r| {
                    r.into_iter()
                        .map(|c| match c {
                            Cell::Int(i) => i,
                            Cell::Float(f) => f as i64,
                        })
                        .collect()
                })
                .collect(),
        )
    } else {
        Values::Float(
            rows.into_iter()
                .map(|r| r.into_iter().map(Cell::as_f64).collect())
                .collect(),
        )
    }
}
