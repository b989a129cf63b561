use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use tracing::info;

use crate::constants::CNAME_FINGERPRINTS;
use crate::files::date_stamp;
use crate::records::{load_pairs, persist_json};

/// Provider name → nuclei template filename, relative to the template dir.
pub type TemplateMap = BTreeMap<String, String>;

/// Ordered provider fingerprint table. Order matters for provider
/// resolution (first match wins) but not for membership testing; the two
/// queries are deliberately kept separate because the grep stage discards
/// the provider label.
pub struct FingerprintTable {
    providers: Vec<(String, Vec<Regex>)>,
}

impl FingerprintTable {
    pub fn new<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    {
        let mut providers = Vec::new();
        for (name, patterns) in entries {
            let mut compiled = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .with_context(|| format!("invalid fingerprint {pattern:?} for {name}"))?;
                compiled.push(regex);
            }
            providers.push((name.to_string(), compiled));
        }
        Ok(Self { providers })
    }

    /// The built-in provider table from `constants`.
    pub fn builtin() -> Result<Self> {
        Self::new(CNAME_FINGERPRINTS.iter().map(|(name, patterns)| (*name, patterns.to_vec())))
    }

    /// Membership test: does any provider's fingerprint match the target?
    pub fn matches_any(&self, target: &str) -> bool {
        self.providers
            .iter()
            .any(|(_, patterns)| patterns.iter().any(|p| p.is_match(target)))
    }

    /// Provider resolution: providers in table order, fingerprints in list
    /// order, first hit wins.
    pub fn first_matching_provider(&self, target: &str) -> Option<&str> {
        for (name, patterns) in &self.providers {
            if patterns.iter().any(|p| p.is_match(target)) {
                return Some(name);
            }
        }
        None
    }
}

/// Keeps only the pairs whose CNAME target matches some fingerprint. Pure
/// set membership; which provider matched is not recorded here.
pub fn filter_pairs(
    pairs: &BTreeMap<String, String>,
    table: &FingerprintTable,
) -> BTreeMap<String, String> {
    pairs
        .iter()
        .filter(|(_, target)| table.matches_any(target))
        .map(|(host, target)| (host.clone(), target.clone()))
        .collect()
}

/// Grep stage: loads the host/CNAME pairs JSON, filters it against the
/// fingerprint table and persists the matching subset.
pub fn grep_cname_hosts(
    pairs_file: &Path,
    namespace: &Path,
    table: &FingerprintTable,
) -> Option<PathBuf> {
    let pairs = load_pairs(pairs_file)?;

    let matched = filter_pairs(&pairs, table);
    let out = namespace.join(format!("{}.grepped_cname_hosts_pairs.json", date_stamp()));
    let out = persist_json(&matched, &out)?;
    info!(
        "{} of {} CNAME targets matched a provider fingerprint ({})",
        matched.len(),
        pairs.len(),
        out.display()
    );
    Some(out)
}
