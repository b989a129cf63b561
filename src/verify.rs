use std::fs;
use std::path::Path;

use chrono::Local;
use tracing::{error, info};

use crate::files::read_lines;
use crate::fingerprint::{FingerprintTable, TemplateMap};
use crate::records::load_pairs;
use crate::notify::Notifier;
use crate::runner::CommandRunner;

/// One line of the final report, one per online host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictRow {
    pub subdomain: String,
    pub cname_target: String,
    pub provider: String,
    pub template: String,
    pub status: String,
}

/// Read-only collaborators for the verification stage, shared across all
/// hosts of one domain.
pub struct VerifyContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub notifier: &'a dyn Notifier,
    pub fingerprints: &'a FingerprintTable,
    pub templates: &'a TemplateMap,
    pub template_dir: &'a Path,
    pub output_dir: &'a Path,
}

/// Verification stage: for every online host, resolve its provider from the
/// CNAME target and run the provider's nuclei takeover template against it.
/// Every host produces exactly one row, in input order; a tool error or a
/// missing template never aborts the remaining hosts.
pub async fn run_takeover_scan(
    ctx: VerifyContext<'_>,
    online_file: &Path,
    pairs_file: &Path,
) -> Option<Vec<VerdictRow>> {
    if !online_file.is_file() {
        error!("online hosts file {} not found for nuclei scanning", online_file.display());
        return None;
    }
    let host_to_cname = load_pairs(pairs_file)?;

    let online_hosts = match read_lines(online_file) {
        Ok(hosts) => hosts,
        Err(err) => {
            error!("could not read {}: {err:#}", online_file.display());
            return None;
        }
    };

    info!("running targeted takeover verification for {} hosts", online_hosts.len());
    let mut rows = Vec::with_capacity(online_hosts.len());

    for host_url in &online_hosts {
        let host = bare_host(host_url);
        let cname_target = host_to_cname.get(host);

        let provider = cname_target
            .and_then(|target| ctx.fingerprints.first_matching_provider(target))
            .unwrap_or("Unknown");
        let template = ctx.templates.get(provider);

        let row = match (cname_target, template) {
            (Some(target), Some(template)) => {
                let template_path = ctx.template_dir.join(template);
                scan_host(&ctx, host, target, provider, &template_path).await
            }
            _ => {
                info!(
                    "skipped {host} (CNAME: {}) - no template for provider {provider}",
                    cname_target.map(String::as_str).unwrap_or("N/A")
                );
                VerdictRow {
                    subdomain: host.to_string(),
                    cname_target: cname_target.cloned().unwrap_or_else(|| "N/A".to_string()),
                    provider: provider.to_string(),
                    template: "N/A".to_string(),
                    status: "Skipped (No Template)".to_string(),
                }
            }
        };
        rows.push(row);
    }

    Some(rows)
}

async fn scan_host(
    ctx: &VerifyContext<'_>,
    host: &str,
    cname_target: &str,
    provider: &str,
    template_path: &Path,
) -> VerdictRow {
    info!("testing {host} against {provider} template {}", template_path.display());
    let args = vec![
        "-u".to_string(),
        host.to_string(),
        "-t".to_string(),
        template_path.to_string_lossy().into_owned(),
        "-silent".to_string(),
    ];

    let status = match ctx.runner.run("nuclei", &args).await {
        Ok(result) if !result.is_empty() => {
            let host_no_port = host.split(':').next().unwrap_or(host);
            let detail_path = ctx
                .output_dir
                .join(format!("{host_no_port}_vulnerable_{provider}.txt"));

            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            ctx.notifier
                .notify(&format!(
                    "[{timestamp}] VULNERABLE! {host} is vulnerable to {provider} takeover. \
                     Details saved in: {}",
                    detail_path.display()
                ))
                .await;

            if let Err(err) = fs::write(&detail_path, &result) {
                error!("could not save finding details for {host}: {err}");
            } else {
                info!("VULNERABLE! details saved in {}", detail_path.display());
            }
            format!("VULNERABLE ({provider})")
        }
        Ok(_) => "NOT Vulnerable".to_string(),
        Err(err) => {
            error!("error running nuclei for {host}: {err:#}");
            format!("Error: {err:#}")
        }
    };

    VerdictRow {
        subdomain: host.to_string(),
        cname_target: cname_target.to_string(),
        provider: provider.to_string(),
        template: template_path.to_string_lossy().into_owned(),
        status,
    }
}

/// Recovers the bare host from a probed URL: everything after the scheme
/// separator, up to the first path segment.
fn bare_host(url: &str) -> &str {
    let after_scheme = url.rsplit("//").next().unwrap_or(url);
    after_scheme.split('/').next().unwrap_or(after_scheme)
}
