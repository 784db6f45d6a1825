use anyhow::Result;
use clap::Parser;
use csvframe::{convert, output_paths, Manifest};
use std::{path::PathBuf, time::Instant};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Convert labelled CSV files into `{values, columns, index}` JSON documents.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV files or glob patterns; defaults to the manifest's file list
    files: Vec<String>,

    /// YAML manifest describing the batch
    #[arg(short, long, env = "CSVFRAME_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Directory the `.json` files are written to (default: next to each CSV)
    #[arg(short, long, env = "CSVFRAME_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Header of the row-label column
    #[arg(short, long, env = "CSVFRAME_INDEX_COLUMN")]
    index_column: Option<String>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn into_manifest(self) -> Result<Manifest> {
        let mut m = match &self.manifest {
            Some(path) => Manifest::load(path)?,
            None => Manifest::default(),
        };
        if !self.files.is_empty() {
            m.files = self.files;
        }
        if let Some(dir) = self.out_dir {
            m.out_dir = Some(dir);
        }
        if let Some(col) = self.index_column {
            m.index_column = col;
        }
        m.pretty |= self.pretty;
        Ok(m)
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // ─── 2) resolve the batch ────────────────────────────────────────
    let manifest = Args::parse().into_manifest()?;
    let opts = manifest.convert_options();
    let files = manifest.expand_files()?;
    output_paths(&files, opts.out_dir.as_deref())?;
    info!(files = files.len(), out_dir = ?opts.out_dir, "startup");

    // ─── 3) convert sequentially, stop on first failure ──────────────
    let start = Instant::now();
    for (n, file) in files.iter().enumerate() {
        if let Err(e) = convert(file, &opts) {
            error!("{} failed: {:#}", file.display(), e);
            return Err(e.context(format!(
                "converted {} of {} files before failing",
                n,
                files.len()
            )));
        }
    }

    info!(files = files.len(), elapsed = ?start.elapsed(), "all done");
    Ok(())
}
