use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "takeover",
    author,
    version,
    about = "Automated subdomain takeover and permissive SPF configuration scanner",
    long_about = None
)]
pub struct Args {
    /// Text file containing the domains to scan, one per line
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory where extracted assets will be saved
    #[arg(short, long, default_value = "./output")]
    pub output: PathBuf,

    /// Directory holding the nuclei takeover templates
    #[arg(short, long, default_value = "nuclei-templates/http/takeovers")]
    pub template_dir: PathBuf,

    /// Maximum number of domains scanned in parallel
    #[arg(short, long, default_value_t = 8)]
    pub max_threads: usize,
}
