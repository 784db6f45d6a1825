use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::{collections::HashSet, fs::File, io::Read, path::Path};
use tracing::{debug, warn};

use super::{
    cell::{self, Cell},
    header::normalize_headers,
    DataFrame,
};

/// Name the row-label column ends up with when its header cell is blank.
pub const DEFAULT_INDEX_COLUMN: &str = "Unnamed: 0";

#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Header (after normalization) of the column holding row labels.
    pub index_column: String,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            index_column: DEFAULT_INDEX_COLUMN.to_string(),
        }
    }
}

/// Read a labelled CSV from disk into a [`DataFrame`].
#[tracing::instrument(level = "debug", skip(path, opts), fields(path = %path.as_ref().display()))]
pub fn read_csv<P: AsRef<Path>>(path: P, opts: &ReadOptions) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening CSV {}", path.display()))?;
    read_csv_from(file, &path.display().to_string(), opts)
}

/// Read a labelled CSV from any reader. `source` only shows up in errors.
///
/// The first record is the header. The index column's cells become row labels
/// exactly as written; every other cell must be numeric.
pub fn read_csv_from<R: Read>(input: R, source: &str, opts: &ReadOptions) -> Result<DataFrame> {
    // 1) Header row, blanks named and repeats mangled
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(input);

    let headers = normalize_headers(
        rdr.headers()
            .with_context(|| format!("reading header of {}", source))?
            .iter(),
    );

    // 2) Locate the row-label column and drop it from the value columns
    let index_pos = headers
        .iter()
        .position(|h| h == &opts.index_column)
        .ok_or_else(|| {
            anyhow!(
                "{}: row-label column {:?} not found (headers: {:?})",
                source,
                opts.index_column,
                headers
            )
        })?;

    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != index_pos)
        .map(|(_, h)| h.clone())
        .collect();

    // 3) Split each record into its label and numeric cells
    let mut index = Vec::new();
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (n, record) in rdr.records().enumerate() {
        let row_no = n + 1;
        let record = record
            .with_context(|| format!("{}: malformed CSV at data row {}", source, row_no))?;

        let mut label = None;
        let mut row = Vec::with_capacity(columns.len());
        for (i, raw) in record.iter().enumerate() {
            if i == index_pos {
                label = Some(raw.to_string());
                continue;
            }
            let cell = cell::parse_cell(raw).with_context(|| {
                format!(
                    "{}: data row {}, column {:?}",
                    source, row_no, headers[i]
                )
            })?;
            row.push(cell);
        }

        let label = label
            .ok_or_else(|| anyhow!("{}: data row {} has no row label", source, row_no))?;
        if !seen.insert(label.clone()) {
            warn!(source, label = %label, row = row_no, "duplicate row label");
        }
        index.push(label);
        rows.push(row);
    }

    // 4) One dtype for the whole matrix, then check the shape
    let values = cell::resolve(rows);
    debug!(
        source,
        rows = index.len(),
        cols = columns.len(),
        integral = values.is_integral(),
        "parsed CSV"
    );

    DataFrame::new(values, columns, index)
        .with_context(|| format!("building frame from {}", source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Values;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn read_str(content: &str) -> Result<DataFrame> {
        read_csv_from(content.as_bytes(), "test.csv", &ReadOptions::default())
    }

    #[test]
    fn drops_the_label_column() -> Result<()> {
        let df = read_str("Unnamed: 0,a,b\nx,1,2\ny,3,4\n")?;
        assert_eq!(df.columns(), ["a", "b"]);
        assert_eq!(df.index(), ["x", "y"]);
        assert_eq!(df.values(), &Values::Int(vec![vec![1, 2], vec![3, 4]]));
        Ok(())
    }

    #[test]
    fn blank_first_header_is_the_label_column() -> Result<()> {
        let df = read_str(",a,b\n0,0.5,1\n1,2,0.25\n")?;
        assert_eq!(df.columns(), ["a", "b"]);
        assert_eq!(df.index(), ["0", "1"]);
        assert_eq!(
            df.values(),
            &Values::Float(vec![vec![0.5, 1.0], vec![2.0, 0.25]])
        );
        Ok(())
    }

    #[test]
    fn numeric_labels_stay_strings() -> Result<()> {
        let df = read_str("Unnamed: 0,v\n7,1\n8,2\n")?;
        assert_eq!(df.to_json()?, r#"{"values":[[1],[2]],"columns":["v"],"index":["7","8"]}"#);
        Ok(())
    }

    #[test]
    fn header_and_label_whitespace_is_preserved() -> Result<()> {
        let df = read_str("Unnamed: 0, a\n x,1\n")?;
        assert_eq!(
            df.to_json()?,
            r#"{"values":[[1]],"columns":[" a"],"index":[" x"]}"#
        );
        Ok(())
    }

    #[test]
    fn duplicate_row_labels_are_kept() -> Result<()> {
        let df = read_str("Unnamed: 0,a\nx,1\nx,2\n")?;
        assert_eq!(df.index(), ["x", "x"]);
        assert_eq!(df.values(), &Values::Int(vec![vec![1], vec![2]]));
        Ok(())
    }

    #[test]
    fn custom_index_column_anywhere() -> Result<()> {
        let opts = ReadOptions {
            index_column: "id".into(),
        };
        let df = read_csv_from("a,id,b\n1,r1,2\n3,r2,4\n".as_bytes(), "t", &opts)?;
        assert_eq!(df.columns(), ["a", "b"]);
        assert_eq!(df.index(), ["r1", "r2"]);
        assert_eq!(df.values(), &Values::Int(vec![vec![1, 2], vec![3, 4]]));
        Ok(())
    }

    #[test]
    fn missing_label_column_is_an_error() {
        let err = read_str("id,a\nx,1\n").unwrap_err();
        assert!(format!("{:#}", err).contains("row-label column"));
    }

    #[test]
    fn bad_cell_names_row_and_column() {
        let err = read_str("Unnamed: 0,a,b\nx,1,2\ny,3,oops\n").unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("data row 2"), "{}", msg);
        assert!(msg.contains("\"b\""), "{}", msg);
        assert!(msg.contains("not a number"), "{}", msg);
    }

    #[test]
    fn missing_cell_is_an_error() {
        assert!(read_str("Unnamed: 0,a,b\nx,1,\n").is_err());
    }

    #[test]
    fn ragged_rows_are_an_error() {
        assert!(read_str("Unnamed: 0,a,b\nx,1,2\ny,3\n").is_err());
    }

    #[test]
    fn header_only_gives_empty_frame() -> Result<()> {
        let df = read_str("Unnamed: 0,a,b\n")?;
        assert_eq!(df.shape(), (0, 2));
        Ok(())
    }

    #[test]
    fn reads_from_disk() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(tmp, "Unnamed: 0,a\nx,1.5\n")?;
        let df = read_csv(tmp.path(), &ReadOptions::default())?;
        assert_eq!(df.values().get_f64(0, 0), Some(1.5));
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_csv("/definitely/not/here.csv", &ReadOptions::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("opening CSV"));
    }
}
