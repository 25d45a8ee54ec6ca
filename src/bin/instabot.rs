//! Command line client for the private API
//!
//! Logs in, runs one action, prints the JSON result to stdout and logs out.
//!
//! # Usage
//!
//! ```bash
//! instabot --username alice follow 123
//! instabot followers --amount 500
//! instabot send-message "hi" --to 10,20
//! ```
//!
//! Without `--password` the credentials file is consulted.

use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

use instabot_api::{
    InstagramApi,
    cli::{Command, run_command},
    config::ConfigLoader,
    utils::{get_version, init_logging},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "instabot")]
struct Cli {
    /// Account username
    #[arg(short, long, global = true, env = "INSTABOT_USERNAME")]
    username: Option<String>,

    /// Account password
    #[arg(long, global = true, env = "INSTABOT_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Proxy server URL (http://host:port, socks5://host:port, etc.)
    #[arg(short, long, global = true, value_name = "PROXY")]
    proxy: Option<String>,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = ConfigLoader::new().load(cli.config.as_deref())?;
    if cli.verbose {
        settings.logging.verbose = true;
    }
    if let Some(ref proxy) = cli.proxy {
        settings.network.proxy = Some(proxy.clone());
    }

    let _log_guard = init_logging(&settings.logging)?;
    debug!("instabot v{} running {:?}", get_version(), cli.command);

    let api = InstagramApi::new(settings)?;
    api.login(
        cli.username.as_deref(),
        cli.password.as_deref(),
        cli.command.force_login(),
        cli.proxy.as_deref(),
    )
    .await?;

    let outcome = run_command(&api, &cli.command).await;
    api.logout().await;

    let value = outcome?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    info!("Done after {} requests", api.total_requests());

    Ok(())
}
