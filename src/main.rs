//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `scraping_services_tester` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use scraping_services_tester::config::{Cli, Command, CompareArgs, ProxyArgs};
use scraping_services_tester::initialization::init_logger_with;
use scraping_services_tester::{
    cancel_on_ctrl_c, list_examples, list_services, run_compare, start_proxy_server, ProxyConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (service tokens, PORT) from the current directory first,
    // then from next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    let result = match cli.command {
        Command::Compare(args) => compare(args).await,
        Command::Proxy(args) => proxy(args).await,
    };

    if let Err(e) = result {
        eprintln!("scraping_services_tester error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn compare(args: CompareArgs) -> Result<()> {
    if args.list_services {
        print!("{}", list_services(&args.apify_endpoint));
        return Ok(());
    }
    if args.list_examples {
        print!("{}", list_examples());
        return Ok(());
    }

    let config = args.into_config().context("Invalid arguments")?;
    let format = config.report_format;
    let report = run_compare(config).await?;
    println!("{}", report.render(format)?);
    Ok(())
}

async fn proxy(args: ProxyArgs) -> Result<()> {
    start_proxy_server(ProxyConfig::from(args), cancel_on_ctrl_c()).await
}
