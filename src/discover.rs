//! Input discovery: expands the paths given on the command line into an
//! ordered, duplicate-free list of CSV files.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use itertools::Itertools;

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Directories contribute their immediate `*.csv` children (any case);
/// explicit file paths are taken as-is. The result is sorted and
/// deduplicated so runs over the same inputs are reproducible.
pub fn discover_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let entries =
                fs::read_dir(input).with_context(|| format!("Listing directory {input:?}"))?;
            for entry in entries {
                let path = entry
                    .with_context(|| format!("Reading entry in {input:?}"))?
                    .path();
                if path.is_file() && has_csv_extension(&path) {
                    found.push(path);
                }
            }
        } else if input.is_file() {
            found.push(input.clone());
        } else {
            bail!("Input path {input:?} does not exist");
        }
    }
    Ok(found.into_iter().sorted().dedup().collect())
}

/// The directory a run's default output and log folders hang off: the
/// first input if it is a directory, otherwise its parent.
pub fn base_directory(inputs: &[PathBuf]) -> PathBuf {
    match inputs.first() {
        Some(first) if first.is_dir() => first.clone(),
        Some(first) => first
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
        None => PathBuf::from("."),
    }
}
