use anyhow::{Context, Result};
use glob::glob;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::{
    convert::ConvertOptions,
    frame::{ReadOptions, DEFAULT_INDEX_COLUMN},
};

/// The partial-correlation fixtures converted when no file list is given.
pub const DEFAULT_FILES: [&str; 3] = [
    "part.corr.matrix.estimate.abalone.csv",
    "part.corr.matrix.estimate.adult.csv",
    "part.corr.matrix.estimate.mushrooms.csv",
];

/// Batch description, loaded from YAML:
///
/// ```yaml
/// index_column: "Unnamed: 0"
/// out_dir: out
/// pretty: false
/// files:
///   - part.corr.matrix.estimate.*.csv
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub index_column: String,
    /// Unset: each `.json` is written next to its CSV.
    pub out_dir: Option<PathBuf>,
    pub pretty: bool,
    pub files: Vec<String>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            index_column: DEFAULT_INDEX_COLUMN.to_string(),
            out_dir: None,
            pretty: false,
            files: DEFAULT_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Manifest {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        let m: Manifest = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing manifest {}", path.display()))?;
        debug!(path = %path.display(), files = m.files.len(), "loaded manifest");
        Ok(m)
    }

    /// Resolve every entry as a glob pattern, in manifest order.
    ///
    /// A pattern that matches nothing is passed through as a literal path so
    /// the conversion itself reports the missing file.
    pub fn expand_files(&self) -> Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for entry in &self.files {
            let mut matches: Vec<PathBuf> = glob(entry)
                .with_context(|| format!("invalid glob pattern '{}'", entry))?
                .filter_map(|m| m.ok())
                .collect();
            if matches.is_empty() {
                warn!(pattern = %entry, "no files matched; keeping as literal path");
                out.push(PathBuf::from(entry));
                continue;
            }
            matches.sort();
            out.extend(matches);
        }
        Ok(out)
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            read: ReadOptions {
                index_column: self.index_column.clone(),
            },
            out_dir: self.out_dir.clone(),
            pretty: self.pretty,
        }
    }
}
