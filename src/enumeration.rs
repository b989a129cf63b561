use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::files::{date_stamp, write_lines};
use crate::normalize::clean_domain;
use crate::runner::{run_or_empty, CommandRunner};

/// Environment variable holding the Chaos API key.
pub const CHAOS_KEY_VAR: &str = "CHAOS_KEY";

pub async fn subfinder_enum(
    runner: &dyn CommandRunner,
    domain: &str,
    namespace: &Path,
) -> PathBuf {
    let args = vec!["-d".to_string(), domain.to_string(), "-silent".to_string()];
    tool_enum(runner, "subfinder", args, domain, namespace).await
}

pub async fn chaos_enum(runner: &dyn CommandRunner, domain: &str, namespace: &Path) -> PathBuf {
    if env::var(CHAOS_KEY_VAR).is_err() {
        // Chaos may still answer unauthenticated or just return nothing.
        warn!("{CHAOS_KEY_VAR} is not set, chaos enumeration may return no results");
    }
    let args = vec!["-d".to_string(), domain.to_string(), "-silent".to_string()];
    tool_enum(runner, "chaos", args, domain, namespace).await
}

/// Runs one enumeration tool and persists its deduplicated, normalized
/// output to a dated per-tool file. On failure or empty output nothing is
/// written and the returned path does not exist; downstream stages treat
/// the missing file as "this tool found nothing".
async fn tool_enum(
    runner: &dyn CommandRunner,
    tool: &str,
    args: Vec<String>,
    domain: &str,
    namespace: &Path,
) -> PathBuf {
    info!("[{tool}] enumerating subdomains of {domain}");
    let output_file = namespace.join(format!("{}.{}.subdomains.txt", date_stamp(), tool));

    let stdout = run_or_empty(runner, tool, &args).await;
    if stdout.is_empty() {
        warn!("[{tool}] no subdomains returned for {domain}");
        return output_file;
    }

    // Dedup the raw tool output first (first occurrence wins), then
    // normalize each surviving line. Normalized duplicates are not collapsed
    // again; the combine step takes care of that.
    let mut seen = HashSet::new();
    let subdomains: Vec<String> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && seen.insert(line.to_string()))
        .map(clean_domain)
        .filter(|line| !line.is_empty())
        .collect();

    if let Err(err) = write_lines(&output_file, &subdomains) {
        error!("[{tool}] could not persist subdomains for {domain}: {err:#}");
        return output_file;
    }

    info!("[{tool}] found {} subdomains for {domain}", subdomains.len());
    output_file
}
