use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{error, info};

/// Date stamp used in every per-domain artifact filename, so re-running a
/// domain on the same calendar day overwrites instead of duplicating.
pub fn date_stamp() -> String {
    Local::now().format("%Y%m%d").to_string()
}

/// Reads a line-oriented file, trimming and dropping empty lines.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut body = lines.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

/// Merges the per-tool subdomain files into one deduplicated, lexically
/// sorted list. Missing inputs (a tool that produced nothing) are logged and
/// skipped; the combined file is written even when empty.
pub fn combine_files(inputs: &[PathBuf], output: &Path) -> Option<PathBuf> {
    let mut unique = BTreeSet::new();

    for path in inputs {
        match fs::read_to_string(path) {
            Ok(content) => {
                for line in content.lines() {
                    let line = line.trim();
                    if !line.is_empty() {
                        unique.insert(line.to_string());
                    }
                }
            }
            Err(err) => error!("could not read {}: {err}", path.display()),
        }
    }

    let lines: Vec<String> = unique.into_iter().collect();
    if let Err(err) = write_lines(output, &lines) {
        error!("could not write combined subdomains: {err:#}");
        return None;
    }
    info!("combined {} unique subdomains into {}", lines.len(), output.display());
    Some(output.to_path_buf())
}
