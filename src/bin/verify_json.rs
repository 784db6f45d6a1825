// src/bin/verify_json.rs

use anyhow::{anyhow, Result};
use clap::Parser;
use csvframe::{
    output_path,
    verify::{verify, VerifyOptions},
    Manifest,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

/// Check converted JSON documents against the CSV files they came from.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV files or glob patterns; defaults to the manifest's file list
    files: Vec<String>,

    #[arg(short, long, env = "CSVFRAME_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Directory holding the `.json` files
    #[arg(short, long, env = "CSVFRAME_OUT_DIR")]
    out_dir: Option<PathBuf>,

    #[arg(short, long, env = "CSVFRAME_INDEX_COLUMN")]
    index_column: Option<String>,

    /// Allowed difference between CSV and JSON values
    #[arg(short, long, default_value_t = 1e-9)]
    tolerance: f64,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    let mut manifest = match &args.manifest {
        Some(path) => Manifest::load(path)?,
        None => Manifest::default(),
    };
    if !args.files.is_empty() {
        manifest.files = args.files.clone();
    }
    if let Some(dir) = &args.out_dir {
        manifest.out_dir = Some(dir.clone());
    }
    if let Some(col) = &args.index_column {
        manifest.index_column = col.clone();
    }

    let read = manifest.convert_options().read;
    let opts = VerifyOptions {
        read,
        tolerance: args.tolerance,
    };

    println!(
        "{: <50} {:>8} {:>8} {:>10}",
        "File", "Rows", "Cols", "Problems"
    );
    println!("{:-<79}", "");

    let mut failed = 0usize;
    for csv in manifest.expand_files()? {
        let json = output_path(&csv, manifest.out_dir.as_deref())?;
        let (lines, ok) = summarize(&csv, &json, &opts);
        for line in &lines {
            println!("{}", line);
        }
        if !ok {
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} file(s) failed verification", failed));
    }
    Ok(())
}

/// Table row for one file plus any problem lines; `false` if it failed.
/// A file that cannot be read still gets its row so the table runs to the end.
fn summarize(csv: &Path, json: &Path, opts: &VerifyOptions) -> (Vec<String>, bool) {
    match verify(csv, json, opts) {
        Ok(report) => {
            let mut lines = vec![format!(
                "{: <50} {:>8} {:>8} {:>10}",
                csv.display(),
                report.rows,
                report.cols,
                report.problems.len()
            )];
            lines.extend(report.problems.iter().map(|p| format!("    {}", p)));
            (lines, report.is_ok())
        }
        Err(e) => (
            vec![
                format!("{: <50} {:>8} {:>8} {:>10}", csv.display(), "-", "-", "error"),
                format!("    {:#}", e),
            ],
            false,
        ),
    }
}
