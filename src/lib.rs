pub mod args;
pub mod constants;
pub mod dns;
pub mod enumeration;
pub mod files;
pub mod fingerprint;
pub mod normalize;
pub mod notify;
pub mod probing;
pub mod records;
pub mod reporting;
pub mod runner;
pub mod verify;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

pub use args::Args;

use fingerprint::{FingerprintTable, TemplateMap};
use notify::{DisabledNotifier, Notifier, TelegramNotifier};
use runner::{CommandRunner, ShellRunner};
use verify::VerifyContext;

/// Read-only collaborators shared by every concurrent domain run: the
/// fingerprint and template tables, the tool runner and the alert channel.
/// Built once at startup, never mutated afterwards.
pub struct ScanContext {
    pub output_dir: PathBuf,
    pub template_dir: PathBuf,
    pub fingerprints: FingerprintTable,
    pub templates: TemplateMap,
    pub runner: Arc<dyn CommandRunner>,
    pub notifier: Arc<dyn Notifier>,
}

impl ScanContext {
    pub fn new(output_dir: PathBuf, template_dir: PathBuf) -> Result<Self> {
        let fingerprints = FingerprintTable::builtin()?;
        let templates: TemplateMap = constants::TAKEOVER_TEMPLATES
            .iter()
            .map(|(provider, template)| (provider.to_string(), template.to_string()))
            .collect();

        let notifier: Arc<dyn Notifier> = match TelegramNotifier::from_env() {
            Some(notifier) => Arc::new(notifier),
            None => {
                warn!("TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID not set, alerts are disabled");
                Arc::new(DisabledNotifier)
            }
        };

        Ok(Self {
            output_dir,
            template_dir,
            fingerprints,
            templates,
            runner: Arc::new(ShellRunner),
            notifier,
        })
    }
}

/// Runs the full pipeline for one domain, strictly sequentially:
/// enumeration → combine → DNS resolution → SPF (terminal branch) → CNAME →
/// fingerprint match → liveness probe → verification → report. A stage that
/// produced nothing halts only this domain's remaining stages; artifacts
/// written so far are left in place.
pub async fn process_domain(ctx: &ScanContext, domain: &str) -> Result<()> {
    let namespace = ctx.output_dir.join(domain.replace('.', "_"));
    fs::create_dir_all(&namespace)
        .with_context(|| format!("could not create {}", namespace.display()))?;

    info!("processing domain: {domain}");
    info!("output directory: {}", namespace.display());

    let subfinder_file = enumeration::subfinder_enum(ctx.runner.as_ref(), domain, &namespace).await;
    let chaos_file = enumeration::chaos_enum(ctx.runner.as_ref(), domain, &namespace).await;

    let combined = namespace.join(format!("{}.combined_subdomains.txt", files::date_stamp()));
    let Some(subs_file) = files::combine_files(&[subfinder_file, chaos_file], &combined) else {
        warn!("{domain}: no combined subdomain list, stopping here");
        return Ok(());
    };

    let Some(dns_file) = dns::dns_enum(ctx.runner.as_ref(), &subs_file, &namespace).await else {
        warn!("{domain}: DNS resolution skipped, stopping here");
        return Ok(());
    };

    // Terminal branch: permissive SPF findings are their own artifact and
    // feed nothing downstream.
    records::extract_spf_hosts(&dns_file, &namespace);

    let Some(pairs_file) = records::extract_cname_pairs(&dns_file, &namespace) else {
        warn!("{domain}: no CNAME records extracted, stopping here");
        return Ok(());
    };

    let Some(grepped_file) =
        fingerprint::grep_cname_hosts(&pairs_file, &namespace, &ctx.fingerprints)
    else {
        warn!("{domain}: fingerprint matching skipped, stopping here");
        return Ok(());
    };

    let Some(online_file) =
        probing::check_online_hosts(ctx.runner.as_ref(), &grepped_file, &namespace).await
    else {
        warn!("{domain}: liveness probing skipped, stopping here");
        return Ok(());
    };

    let verify_ctx = VerifyContext {
        runner: ctx.runner.as_ref(),
        notifier: ctx.notifier.as_ref(),
        fingerprints: &ctx.fingerprints,
        templates: &ctx.templates,
        template_dir: &ctx.template_dir,
        output_dir: &ctx.output_dir,
    };
    let Some(rows) = verify::run_takeover_scan(verify_ctx, &online_file, &grepped_file).await
    else {
        warn!("{domain}: verification skipped, stopping here");
        return Ok(());
    };

    reporting::write_report(&rows, &namespace);
    info!("domain {domain} scan completed");
    Ok(())
}

/// Fleet scheduler: one task per domain, bounded by `max_threads` permits.
/// A domain whose task fails or panics is logged and does not affect its
/// siblings; `run_domains` returns once every domain has finished.
pub async fn run_domains(ctx: Arc<ScanContext>, domains: Vec<String>, max_threads: usize) {
    let semaphore = Arc::new(Semaphore::new(max_threads.max(1)));
    let mut tasks = FuturesUnordered::new();

    for domain in domains {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore unexpectedly closed");
        let ctx = Arc::clone(&ctx);

        tasks.push(tokio::spawn(async move {
            let _permit = permit;
            let result = process_domain(&ctx, &domain).await;
            (domain, result)
        }));
    }

    while let Some(joined) = tasks.next().await {
        match joined {
            Ok((_, Ok(()))) => {}
            Ok((domain, Err(err))) => error!("error processing domain {domain}: {err:#}"),
            Err(err) => error!("domain task aborted: {err}"),
        }
    }
}

pub async fn run(args: Args) -> Result<()> {
    let domains = load_domains(&args.input)?;
    if domains.is_empty() {
        warn!("no domains found in {}", args.input.display());
        return Ok(());
    }

    fs::create_dir_all(&args.output)
        .with_context(|| format!("could not create {}", args.output.display()))?;

    info!("scanning {} domains with up to {} workers", domains.len(), args.max_threads);
    let ctx = Arc::new(ScanContext::new(args.output, args.template_dir)?);
    run_domains(ctx, domains, args.max_threads).await;

    info!("all domains processed");
    Ok(())
}

/// Loads the input domain list: trimmed, comments and blanks skipped, every
/// line canonicalized through the normalizer.
fn load_domains(path: &Path) -> Result<Vec<String>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(normalize::clean_domain)
        .filter(|domain| !domain.is_empty())
        .collect())
}
