use clap::Parser;
use tracing_subscriber::EnvFilter;

use takeover::Args;

const BANNER: &str = r#"
  ______      __        ____
 /_  __/___ _/ /_____  / __ \_   _____  _____
  / / / __ `/ //_/ _ \/ / / / | / / _ \/ ___/
 / / / /_/ / ,< /  __/ /_/ /| |/ /  __/ /
/_/  \__,_/_/|_|\___/\____/ |___/\___/_/   v2.0.0
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("{BANNER}");

    let args = Args::parse();
    println!("[*] Configuration:");
    println!("    - Input: {}", args.input.display());
    println!("    - Output: {}", args.output.display());
    println!("    - Templates: {}", args.template_dir.display());
    println!("    - Max threads: {}", args.max_threads);

    takeover::run(args).await
}
