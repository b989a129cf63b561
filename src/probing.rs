use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::files::{date_stamp, write_lines};
use crate::records::load_pairs;
use crate::runner::{run_or_empty, CommandRunner};

/// Liveness probe stage: extracts the matched hosts, prefixes an HTTPS
/// scheme, and asks httpx which of them answer. Probing is deliberately
/// polite (two client threads, half-second delay, no retries); a host that
/// blocks automated probes is a warning, not a failure.
pub async fn check_online_hosts(
    runner: &dyn CommandRunner,
    grepped_pairs_file: &Path,
    namespace: &Path,
) -> Option<PathBuf> {
    let pairs = load_pairs(grepped_pairs_file)?;
    info!("probing {} matched hosts from {}", pairs.len(), grepped_pairs_file.display());

    let stamp = date_stamp();
    let hosts_file = namespace.join(format!("{stamp}.grepped_cname_hosts.txt"));
    let hosts: Vec<String> = pairs.keys().cloned().collect();
    if let Err(err) = write_lines(&hosts_file, &hosts) {
        error!("could not write matched hosts: {err:#}");
        return None;
    }

    let protocol_file = namespace.join(format!("{stamp}.hosts_with_protocol.txt"));
    let urls: Vec<String> = hosts.iter().map(|h| with_https_scheme(h)).collect();
    if let Err(err) = write_lines(&protocol_file, &urls) {
        error!("could not write protocol-prefixed hosts: {err:#}");
        return None;
    }

    let args = vec![
        "-silent".to_string(),
        "-l".to_string(),
        protocol_file.to_string_lossy().into_owned(),
        "-sc".to_string(),
        "-timeout".to_string(),
        "10".to_string(),
        "-retries".to_string(),
        "0".to_string(),
        "-threads".to_string(),
        "2".to_string(),
        "-delay".to_string(),
        "500ms".to_string(),
    ];
    let output = run_or_empty(runner, "httpx", &args).await;

    let online = probe_urls(&output);
    if online.is_empty() {
        warn!("no hosts answered the probe (they may be blocking automated requests)");
    }

    let online_file = namespace.join(format!("{stamp}.online_candidates.txt"));
    if let Err(err) = write_lines(&online_file, &online) {
        error!("could not write online candidates: {err:#}");
        return None;
    }
    info!("{} hosts online, saved to {}", online.len(), online_file.display());
    Some(online_file)
}

fn with_https_scheme(host: &str) -> String {
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

/// Each httpx line starts with the probed URL; status metadata after the
/// first whitespace is discarded.
pub fn probe_urls(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_token_per_line() {
        let output = "https://a.example.com [200] [Apache]\nhttps://b.example.com [404]\n\n";
        assert_eq!(probe_urls(output), ["https://a.example.com", "https://b.example.com"]);
    }

    #[test]
    fn scheme_prefixed_only_when_missing() {
        assert_eq!(with_https_scheme("a.example.com"), "https://a.example.com");
        assert_eq!(with_https_scheme("http://a.example.com"), "http://a.example.com");
    }
}
