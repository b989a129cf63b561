use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Local;

use takeover::fingerprint::{FingerprintTable, TemplateMap};
use takeover::notify::Notifier;
use takeover::runner::CommandRunner;
use takeover::verify::{run_takeover_scan, VerifyContext};
use takeover::{process_domain, run_domains, ScanContext};

/// Stands in for the external tools: canned stdout per program, and the
/// dnsx contract of writing its own output file.
#[derive(Default)]
struct FakeRunner {
    subfinder: String,
    dns_dump: String,
    probe_output: String,
    nuclei_output: String,
    nuclei_error: bool,
    panic_dnsx_for: Option<String>,
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<String> {
        match program {
            "subfinder" => Ok(self.subfinder.clone()),
            "chaos" => Ok(String::new()),
            "dnsx" => {
                if let Some(marker) = &self.panic_dnsx_for {
                    if args.iter().any(|a| a.contains(marker.as_str())) {
                        panic!("resolver blew up");
                    }
                }
                let out = args
                    .iter()
                    .position(|a| a == "-o")
                    .map(|i| args[i + 1].clone())
                    .expect("dnsx invoked without -o");
                fs::write(out, &self.dns_dump)?;
                Ok(String::new())
            }
            "httpx" => Ok(self.probe_output.clone()),
            "nuclei" => {
                if self.nuclei_error {
                    Err(anyhow!("nuclei binary not found"))
                } else {
                    Ok(self.nuclei_output.clone())
                }
            }
            other => Err(anyhow!("unexpected tool {other}")),
        }
    }
}

#[derive(Default)]
struct CapturingNotifier {
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for CapturingNotifier {
    async fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

fn github_table() -> FingerprintTable {
    FingerprintTable::new(vec![("github", vec![r"github\.io"])]).unwrap()
}

fn github_templates() -> TemplateMap {
    let mut templates = BTreeMap::new();
    templates.insert("github".to_string(), "github.yaml".to_string());
    templates
}

fn context(
    output_dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
    notifier: Arc<dyn Notifier>,
) -> ScanContext {
    ScanContext {
        output_dir,
        template_dir: PathBuf::from("/templates"),
        fingerprints: github_table(),
        templates: github_templates(),
        runner,
        notifier,
    }
}

fn stamp() -> String {
    Local::now().format("%Y%m%d").to_string()
}

#[tokio::test]
async fn end_to_end_vulnerable_host() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(CapturingNotifier::default());
    let runner = Arc::new(FakeRunner {
        subfinder: "app.example.com".to_string(),
        dns_dump: "app.example.com [CNAME] [app.github.io]\n".to_string(),
        probe_output: "https://app.example.com [200]\n".to_string(),
        nuclei_output: "[github-takeover] [http] https://app.example.com".to_string(),
        ..FakeRunner::default()
    });
    let ctx = context(dir.path().to_path_buf(), runner, notifier.clone());

    process_domain(&ctx, "example.com").await.unwrap();

    let namespace = dir.path().join("example_com");
    let report = fs::read_to_string(namespace.join(format!("final_results_{}.csv", stamp())))
        .expect("report missing");
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(
        lines[0],
        "Subdomain,CNAME Target,Provider,Nuclei Template,Vulnerability Status"
    );
    assert_eq!(
        lines[1],
        "app.example.com,app.github.io,github,/templates/github.yaml,VULNERABLE (github)"
    );
    assert_eq!(lines.len(), 2);

    // The raw finding lands in the top-level output dir, not the namespace.
    let detail = fs::read_to_string(dir.path().join("app.example.com_vulnerable_github.txt"))
        .expect("finding details missing");
    assert!(detail.contains("github-takeover"));

    let alerts = notifier.messages.lock().unwrap();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("app.example.com"));
    assert!(alerts[0].contains("github"));

    // Intermediate artifacts of both branches exist.
    assert!(namespace.join(format!("{}.combined_subdomains.txt", stamp())).is_file());
    assert!(namespace.join(format!("{}.spf_permissive_hosts.json", stamp())).is_file());
    assert!(namespace.join(format!("{}.online_candidates.txt", stamp())).is_file());
}

#[tokio::test]
async fn fleet_isolation_one_domain_panics() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(CapturingNotifier::default());
    let runner = Arc::new(FakeRunner {
        subfinder: "app.good.com".to_string(),
        dns_dump: "app.good.com CNAME app.github.io\n".to_string(),
        probe_output: "https://app.good.com [200]\n".to_string(),
        nuclei_output: "[github-takeover] https://app.good.com".to_string(),
        panic_dnsx_for: Some("bad_com".to_string()),
        ..FakeRunner::default()
    });
    let ctx = Arc::new(context(dir.path().to_path_buf(), runner, notifier));

    run_domains(ctx, vec!["bad.com".to_string(), "good.com".to_string()], 4).await;

    let good_report = dir
        .path()
        .join("good_com")
        .join(format!("final_results_{}.csv", stamp()));
    let report = fs::read_to_string(good_report).expect("good.com report missing");
    assert!(report.contains("app.good.com,app.github.io,github"));

    // The failed domain got as far as its pipeline allowed, and no further.
    let bad_report = dir
        .path()
        .join("bad_com")
        .join(format!("final_results_{}.csv", stamp()));
    assert!(!bad_report.exists());
}

#[tokio::test]
async fn one_row_per_online_host_in_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let online_file = dir.path().join("online.txt");
    fs::write(
        &online_file,
        "https://b.example.com\nhttps://a.example.com\nhttps://c.example.com\n",
    )
    .unwrap();

    let pairs_file = dir.path().join("pairs.json");
    let mut pairs = BTreeMap::new();
    pairs.insert("a.example.com", "a.github.io");
    pairs.insert("b.example.com", "b.github.io");
    pairs.insert("c.example.com", "c.internal.lan");
    fs::write(&pairs_file, serde_json::to_string_pretty(&pairs).unwrap()).unwrap();

    let runner = FakeRunner::default();
    let notifier = CapturingNotifier::default();
    let table = github_table();
    let templates = TemplateMap::new(); // no templates: everything is skipped
    let ctx = VerifyContext {
        runner: &runner,
        notifier: &notifier,
        fingerprints: &table,
        templates: &templates,
        template_dir: dir.path(),
        output_dir: dir.path(),
    };

    let rows = run_takeover_scan(ctx, &online_file, &pairs_file).await.unwrap();
    let subdomains: Vec<&str> = rows.iter().map(|r| r.subdomain.as_str()).collect();
    assert_eq!(subdomains, ["b.example.com", "a.example.com", "c.example.com"]);
    assert!(rows.iter().all(|r| r.status == "Skipped (No Template)"));
    assert_eq!(rows[0].provider, "github");
    assert_eq!(rows[2].provider, "Unknown");
    assert_eq!(rows[2].template, "N/A");
}

#[tokio::test]
async fn nuclei_failure_yields_error_row_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let online_file = dir.path().join("online.txt");
    fs::write(&online_file, "https://a.example.com\nhttps://b.example.com\n").unwrap();

    let pairs_file = dir.path().join("pairs.json");
    let mut pairs = BTreeMap::new();
    pairs.insert("a.example.com", "a.github.io");
    pairs.insert("b.example.com", "b.github.io");
    fs::write(&pairs_file, serde_json::to_string_pretty(&pairs).unwrap()).unwrap();

    let runner = FakeRunner {
        nuclei_error: true,
        ..FakeRunner::default()
    };
    let notifier = CapturingNotifier::default();
    let table = github_table();
    let templates = github_templates();
    let ctx = VerifyContext {
        runner: &runner,
        notifier: &notifier,
        fingerprints: &table,
        templates: &templates,
        template_dir: dir.path(),
        output_dir: dir.path(),
    };

    let rows = run_takeover_scan(ctx, &online_file, &pairs_file).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.status.starts_with("Error: ")));
    assert!(notifier.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn clean_probe_means_not_vulnerable_and_no_alert() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(CapturingNotifier::default());
    let runner = Arc::new(FakeRunner {
        subfinder: "app.example.com".to_string(),
        dns_dump: "app.example.com CNAME app.github.io\n".to_string(),
        probe_output: "https://app.example.com [200]\n".to_string(),
        nuclei_output: String::new(),
        ..FakeRunner::default()
    });
    let ctx = context(dir.path().to_path_buf(), runner, notifier.clone());

    process_domain(&ctx, "example.com").await.unwrap();

    let report = fs::read_to_string(
        dir.path()
            .join("example_com")
            .join(format!("final_results_{}.csv", stamp())),
    )
    .unwrap();
    assert!(report.contains("app.example.com,app.github.io,github,/templates/github.yaml,NOT Vulnerable"));
    assert!(notifier.messages.lock().unwrap().is_empty());
}
