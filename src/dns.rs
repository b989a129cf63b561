use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::files::date_stamp;
use crate::runner::{run_or_empty, CommandRunner};

/// DNS resolution stage: asks dnsx for CNAME and TXT records over the
/// combined subdomain list. dnsx writes the record dump itself via `-o`;
/// its stdout is ignored. A missing input list halts this domain's pipeline.
pub async fn dns_enum(
    runner: &dyn CommandRunner,
    subdomains_file: &Path,
    namespace: &Path,
) -> Option<PathBuf> {
    if !subdomains_file.is_file() {
        error!(
            "subdomains file {} not found for DNS enumeration",
            subdomains_file.display()
        );
        return None;
    }

    info!("resolving CNAME and TXT records for {}", subdomains_file.display());
    let output_file = namespace.join(format!("{}.dns_records.txt", date_stamp()));

    let args = vec![
        "-cname".to_string(),
        "-txt".to_string(),
        "-silent".to_string(),
        "-re".to_string(),
        "-l".to_string(),
        subdomains_file.to_string_lossy().into_owned(),
        "-o".to_string(),
        output_file.to_string_lossy().into_owned(),
    ];
    run_or_empty(runner, "dnsx", &args).await;

    Some(output_file)
}
