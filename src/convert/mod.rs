// src/convert/mod.rs
pub mod write;

use anyhow::{anyhow, bail, Result};
use std::{
    collections::HashMap,
    ffi::OsString,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::info;

use crate::frame::{read_csv, ReadOptions};
pub use write::write_json_atomic;

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub read: ReadOptions,
    /// Directory the `.json` files land in; `None` writes next to each input.
    pub out_dir: Option<PathBuf>,
    pub pretty: bool,
}

/// Where the document for `input` is written.
///
/// Without `out_dir` this is the input path with a literal `.json` appended
/// (`data/abalone.csv` -> `data/abalone.csv.json`). With `out_dir` it is
/// `<out_dir>/<input file name>.json`.
pub fn output_path(input: &Path, out_dir: Option<&Path>) -> Result<PathBuf> {
    let name = input
        .file_name()
        .ok_or_else(|| anyhow!("input path {:?} has no file name", input))?;
    let mut out: OsString = match out_dir {
        Some(dir) => dir.join(name).into_os_string(),
        None => input.as_os_str().to_os_string(),
    };
    out.push(".json");
    Ok(PathBuf::from(out))
}

/// Resolve the output path of every input in a batch, failing before anything
/// is written if two inputs would land on the same file.
pub fn output_paths(inputs: &[PathBuf], out_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::with_capacity(inputs.len());
    let mut out = Vec::with_capacity(inputs.len());
    for input in inputs {
        let path = output_path(input, out_dir)?;
        if let Some(prev) = claimed.insert(path.clone(), input.as_path()) {
            if prev != input.as_path() {
                bail!(
                    "{} and {} would both be written to {}",
                    prev.display(),
                    input.display(),
                    path.display()
                );
            }
        }
        out.push(path);
    }
    Ok(out)
}

/// Convert one labelled CSV into its `values`/`columns`/`index` JSON document.
///
/// Returns the path written. Nothing is written unless the whole CSV parses.
#[tracing::instrument(level = "info", skip(input, opts), fields(path = %input.as_ref().display()))]
pub fn convert<P: AsRef<Path>>(input: P, opts: &ConvertOptions) -> Result<PathBuf> {
    let input = input.as_ref();
    let start = Instant::now();

    // 1) Destination, derived from the input path
    let out = output_path(input, opts.out_dir.as_deref())?;

    // 2) Parse the whole CSV before touching the destination
    let frame = read_csv(input, &opts.read)?;

    // 3) Write `{values, columns, index}`
    write_json_atomic(&out, &frame, opts.pretty)?;

    let (rows, cols) = frame.shape();
    info!(
        rows,
        cols,
        out = %out.display(),
        elapsed = ?start.elapsed(),
        "converted"
    );
    Ok(out)
}
