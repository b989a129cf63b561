use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{error, warn};

/// Seam for invoking the external reconnaissance tools (subfinder, chaos,
/// dnsx, httpx, nuclei). The pipeline only ever sees captured stdout, so
/// tests substitute a fake runner instead of spawning real processes.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs a tool and captures its trimmed stdout. A non-zero exit still
    /// yields whatever stdout was produced; only a failure to spawn the
    /// process surfaces as an error.
    async fn run(&self, program: &str, args: &[String]) -> Result<String>;
}

/// Production runner backed by `tokio::process`.
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .with_context(|| format!("failed to execute {program}"))?;

        if !output.status.success() {
            warn!("{} exited with {}", program, output.status);
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Invocation wrapper for stages where a failed tool is an expected soft
/// failure: the error is logged and the stage proceeds as if the tool had
/// produced no output.
pub async fn run_or_empty(runner: &dyn CommandRunner, program: &str, args: &[String]) -> String {
    match runner.run(program, args).await {
        Ok(stdout) => stdout,
        Err(err) => {
            error!("{program} invocation failed: {err:#}");
            String::new()
        }
    }
}
