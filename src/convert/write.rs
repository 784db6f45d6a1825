use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};
use tempfile::NamedTempFile;

/// Serialize `value` to `path` atomically.
///
/// The document goes to a temp file in the destination directory first and is
/// renamed over `path` only once fully written, so readers see either the old
/// file or the complete new one.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    // 1) Temp file in the destination directory
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("creating output directory {:?}", dir))?;

    let tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {:?}", dir))?;

    // 2) Write and flush the whole document
    {
        let mut w = BufWriter::new(tmp.as_file());
        if pretty {
            serde_json::to_writer_pretty(&mut w, value).context("serializing JSON")?;
            w.write_all(b"\n")?;
        } else {
            serde_json::to_writer(&mut w, value).context("serializing JSON")?;
        }
        w.flush().with_context(|| format!("flushing temp file for {:?}", path))?;
    }

    // 3) Rename over the original
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("renaming temp file -> {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn writes_compact_and_pretty() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.json");
        let doc = json!({"a": [1, 2]});

        write_json_atomic(&path, &doc, false)?;
        assert_eq!(fs::read_to_string(&path)?, r#"{"a":[1,2]}"#);

        write_json_atomic(&path, &doc, true)?;
        let pretty = fs::read_to_string(&path)?;
        assert!(pretty.ends_with("}\n"));
        assert!(pretty.contains("\n  \"a\""));
        Ok(())
    }

    #[test]
    fn leaves_no_temp_files_behind() -> Result<()> {
        let dir = tempdir()?;
        write_json_atomic(&dir.path().join("x.json"), &json!([]), false)?;
        let names: Vec<_> = fs::read_dir(dir.path())?
            .filter_map(Result::ok)
            .map(|e| e.file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("x.json")]);
        Ok(())
    }

    #[test]
    fn creates_missing_directories() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/deeper/x.json");
        write_json_atomic(&path, &json!({}), false)?;
        assert!(path.exists());
        Ok(())
    }
}
