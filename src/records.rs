use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, info};

use crate::files::date_stamp;

static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

/// Strips resolver color escapes and bracket decoration, then splits into
/// whitespace-separated fields.
fn clean_fields(line: &str) -> Vec<String> {
    let line = ANSI_ESCAPE.replace_all(line, "");
    line.replace(['[', ']'], "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Extracts host → CNAME target pairs from the raw resolver dump. The last
/// occurrence per host wins; targets without a dot are discarded. Malformed
/// lines are skipped without logging.
pub fn parse_cname_pairs(dump: &str) -> BTreeMap<String, String> {
    let mut pairs = BTreeMap::new();
    for line in dump.lines() {
        if !line.to_ascii_uppercase().contains("CNAME") {
            continue;
        }
        let fields = clean_fields(line);
        if fields.len() < 3 {
            continue;
        }
        let host = fields[0].clone();
        let target = fields[fields.len() - 1].clone();
        if !host.is_empty() && !target.is_empty() && target.contains('.') {
            pairs.insert(host, target);
        }
    }
    pairs
}

/// Extracts hosts whose SPF TXT record is permissive: `v=spf1` present and a
/// `~all` (softfail) or `?all` (neutral) catch-all. Strict `-all` records
/// fall through both checks and are dropped.
pub fn parse_spf_hosts(dump: &str) -> BTreeMap<String, String> {
    let mut hosts = BTreeMap::new();
    for line in dump.lines() {
        let upper = line.to_ascii_uppercase();
        if !upper.contains("TXT") || !upper.contains("V=SPF1") {
            continue;
        }
        let fields = clean_fields(line);
        if fields.len() < 3 {
            continue;
        }
        let host = fields[0].clone();
        let txt_record = fields[2..].join(" ");
        let lower = txt_record.to_ascii_lowercase();
        if lower.contains("~all") || lower.contains("?all") {
            hosts.insert(host, txt_record);
        }
    }
    hosts
}

/// Loads a host → value JSON artifact produced by an earlier stage.
pub fn load_pairs(path: &Path) -> Option<BTreeMap<String, String>> {
    if !path.is_file() {
        error!("pairs file {} not found", path.display());
        return None;
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            error!("could not read {}: {err}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(pairs) => Some(pairs),
        Err(err) => {
            error!("could not parse {}: {err}", path.display());
            None
        }
    }
}

pub fn persist_json(map: &BTreeMap<String, String>, path: &Path) -> Option<PathBuf> {
    match serde_json::to_string_pretty(map) {
        Ok(json) => {
            if let Err(err) = fs::write(path, json) {
                error!("could not write {}: {err}", path.display());
                return None;
            }
            Some(path.to_path_buf())
        }
        Err(err) => {
            error!("could not serialize {}: {err}", path.display());
            None
        }
    }
}

/// CNAME extraction stage: parses the dump and persists the host → target
/// mapping as pretty JSON in the domain namespace.
pub fn extract_cname_pairs(dns_file: &Path, namespace: &Path) -> Option<PathBuf> {
    if !dns_file.is_file() {
        error!("DNS records file {} not found for CNAME filtering", dns_file.display());
        return None;
    }
    info!("filtering CNAME records from {}", dns_file.display());

    let dump = match fs::read_to_string(dns_file) {
        Ok(dump) => dump,
        Err(err) => {
            error!("could not read {}: {err}", dns_file.display());
            return None;
        }
    };

    let pairs = parse_cname_pairs(&dump);
    let out = namespace.join(format!("{}.cname_hosts_pairs.json", date_stamp()));
    let out = persist_json(&pairs, &out)?;
    info!("{} host/CNAME pairs saved to {}", pairs.len(), out.display());
    Some(out)
}

/// SPF extraction stage, the terminal branch of the pipeline: persists hosts
/// with permissive SPF records and feeds nothing downstream.
pub fn extract_spf_hosts(dns_file: &Path, namespace: &Path) -> Option<PathBuf> {
    if !dns_file.is_file() {
        error!("DNS records file {} not found for SPF filtering", dns_file.display());
        return None;
    }
    info!("filtering permissive SPF records from {}", dns_file.display());

    let dump = match fs::read_to_string(dns_file) {
        Ok(dump) => dump,
        Err(err) => {
            error!("could not read {}: {err}", dns_file.display());
            return None;
        }
    };

    let hosts = parse_spf_hosts(&dump);
    let out = namespace.join(format!("{}.spf_permissive_hosts.json", date_stamp()));
    let out = persist_json(&hosts, &out)?;
    info!("{} permissive SPF hosts saved to {}", hosts.len(), out.display());
    Some(out)
}
