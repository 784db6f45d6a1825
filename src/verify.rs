use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path};
use tracing::{debug, warn};

use crate::frame::{read_csv, DataFrame, ReadOptions};

#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub read: ReadOptions,
    /// Absolute tolerance, scaled by magnitude once values exceed 1.
    pub tolerance: f64,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            read: ReadOptions::default(),
            tolerance: 1e-9,
        }
    }
}

/// The JSON document as written, read back loosely so shape errors can be
/// reported instead of failing the parse.
#[derive(Debug, Deserialize)]
struct Written {
    values: Vec<Vec<serde_json::Value>>,
    columns: Vec<serde_json::Value>,
    index: Vec<serde_json::Value>,
}

#[derive(Debug, Default)]
pub struct VerifyReport {
    pub rows: usize,
    pub cols: usize,
    pub cells_checked: usize,
    pub problems: Vec<String>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Re-read `csv_path` and compare it against the document at `json_path`.
#[tracing::instrument(level = "info", skip(csv_path, json_path, opts), fields(csv = %csv_path.as_ref().display()))]
pub fn verify<P: AsRef<Path>, Q: AsRef<Path>>(
    csv_path: P,
    json_path: Q,
    opts: &VerifyOptions,
) -> Result<VerifyReport> {
    let json_path = json_path.as_ref();
    let expected = read_csv(csv_path.as_ref(), &opts.read)?;

    let f = File::open(json_path).with_context(|| format!("opening {}", json_path.display()))?;
    let written: Written = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing {}", json_path.display()))?;

    let report = compare(&expected, &written, &opts.read.index_column, opts.tolerance);
    if report.is_ok() {
        debug!(cells = report.cells_checked, "verified");
    } else {
        warn!(problems = report.problems.len(), "verification failed");
    }
    Ok(report)
}

/// Parse a JSON document from a string and compare it against `expected`.
pub fn verify_str(expected: &DataFrame, json: &str, opts: &VerifyOptions) -> Result<VerifyReport> {
    let written: Written = serde_json::from_str(json).context("parsing JSON document")?;
    Ok(compare(expected, &written, &opts.read.index_column, opts.tolerance))
}

fn compare(expected: &DataFrame, got: &Written, index_column: &str, tol: f64) -> VerifyReport {
    let mut r = VerifyReport {
        rows: got.values.len(),
        cols: got.columns.len(),
        ..Default::default()
    };

    if got.values.len() != got.index.len() {
        r.problems.push(format!(
            "{} value rows but {} index labels",
            got.values.len(),
            got.index.len()
        ));
    }
    for (i, row) in got.values.iter().enumerate() {
        if row.len() != got.columns.len() {
            r.problems.push(format!(
                "row {} has {} cells but there are {} columns",
                i,
                row.len(),
                got.columns.len()
            ));
        }
    }

    match string_labels("columns", &got.columns) {
        Ok(cols) => {
            if cols.iter().any(|c| c == index_column) {
                r.problems
                    .push(format!("row-label column {:?} leaked into columns", index_column));
            }
            if cols != expected.columns() {
                r.problems.push(format!(
                    "columns differ: expected {:?}, got {:?}",
                    expected.columns(),
                    cols
                ));
            }
        }
        Err(e) => r.problems.push(e.to_string()),
    }

    match string_labels("index", &got.index) {
        Ok(idx) if idx != expected.index() => r.problems.push(format!(
            "index differs: expected {} labels, got {}",
            expected.index().len(),
            idx.len()
        )),
        Ok(_) => {}
        Err(e) => r.problems.push(e.to_string()),
    }

    let (rows, cols) = expected.shape();
    if got.values.len() != rows {
        r.problems
            .push(format!("expected {} rows, got {}", rows, got.values.len()));
    }
    for (i, row) in got.values.iter().enumerate().take(rows) {
        for (j, cell) in row.iter().enumerate().take(cols) {
            let Some(want) = expected.values().get_f64(i, j) else {
                continue;
            };
            r.cells_checked += 1;
            match cell.as_f64() {
                Some(have) if close(want, have, tol) => {}
                Some(have) => r
                    .problems
                    .push(format!("value [{}][{}]: expected {}, got {}", i, j, want, have)),
                None => r
                    .problems
                    .push(format!("value [{}][{}] is not a number: {}", i, j, cell)),
            }
        }
    }
    r
}

fn string_labels(field: &str, labels: &[serde_json::Value]) -> Result<Vec<String>> {
    labels
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| anyhow!("{}[{}] is not a string: {}", field, i, v))
        })
        .collect()
}

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * a.abs().max(b.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{convert, ConvertOptions};
    use crate::frame::read_csv_from;
    use std::fs;
    use tempfile::tempdir;

    fn frame(csv: &str) -> DataFrame {
        read_csv_from(csv.as_bytes(), "t", &ReadOptions::default()).unwrap()
    }

    #[test]
    fn accepts_converter_output() -> Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("f.csv");
        fs::write(&input, ",a,b\n7,0.1,2\n8,-3.75,1e-3\n")?;
        let out = convert(
            &input,
            &ConvertOptions {
                out_dir: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
        )?;

        let report = verify(&input, &out, &VerifyOptions::default())?;
        assert!(report.is_ok(), "{:?}", report.problems);
        assert_eq!(report.cells_checked, 4);
        assert_eq!((report.rows, report.cols), (2, 2));
        Ok(())
    }

    #[test]
    fn flags_numeric_index_labels() -> Result<()> {
        let df = frame("Unnamed: 0,a\n7,1\n");
        let r = verify_str(&df, r#"{"values":[[1]],"columns":["a"],"index":[7]}"#, &VerifyOptions::default())?;
        assert!(!r.is_ok());
        assert!(r.problems[0].contains("index[0] is not a string"));
        Ok(())
    }

    #[test]
    fn flags_leaked_label_column() -> Result<()> {
        let df = frame("Unnamed: 0,a\nx,1\n");
        let r = verify_str(
            &df,
            r#"{"values":[[1,2]],"columns":["Unnamed: 0","a"],"index":["x"]}"#,
            &VerifyOptions::default(),
        )?;
        assert!(r.problems.iter().any(|p| p.contains("leaked")));
        assert!(r.problems.iter().any(|p| p.contains("columns differ")));
        Ok(())
    }

    #[test]
    fn tolerance_applies_to_values() -> Result<()> {
        let df = frame("Unnamed: 0,a\nx,0.3\n");
        let near = r#"{"values":[[0.30000000000000004]],"columns":["a"],"index":["x"]}"#;
        let far = r#"{"values":[[0.31]],"columns":["a"],"index":["x"]}"#;
        assert!(verify_str(&df, near, &VerifyOptions::default())?.is_ok());
        assert!(!verify_str(&df, far, &VerifyOptions::default())?.is_ok());
        Ok(())
    }

    #[test]
    fn shape_mismatch_is_reported() -> Result<()> {
        let df = frame("Unnamed: 0,a\nx,1\ny,2\n");
        let r = verify_str(&df, r#"{"values":[[1]],"columns":["a"],"index":["x","y"]}"#, &VerifyOptions::default())?;
        assert!(r.problems.iter().any(|p| p.contains("1 value rows but 2 index labels")));
        assert!(r.problems.iter().any(|p| p.contains("expected 2 rows, got 1")));
        Ok(())
    }
}
