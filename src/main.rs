mod cli;
mod config;
mod download;
mod error;
mod install;
mod platform;
mod release;
mod types;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::load_config;
use console::style;
use error::InstallError;
use install::{resolve, Pipeline};
use release::release_page_url;
use types::{InstallPhase, InstallerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    let config = load_config(cli.install_root.clone(), cli.quiet)?;
    tracing::debug!("Installer configuration: {:?}", config);

    if cli.print_url {
        match resolve(&config) {
            Ok((_, url)) => println!("{}", url),
            Err(e) => {
                report_failure(&config, &e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // The install future is dropped before exiting so a partial archive is removed
    let mut pipeline = Pipeline::new(&config);
    let outcome = tokio::select! {
        result = pipeline.run() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    tracing::debug!("Installer stopped in phase {}", pipeline.phase());

    match outcome {
        Some(Ok(report)) => {
            tracing::info!(
                "Installed {} for {} from {}",
                report.binary_path.display(),
                report.target,
                report.url
            );
            Ok(())
        }
        Some(Err(e)) => {
            report_failure(&config, &e);
            std::process::exit(1);
        }
        None => {
            eprintln!("{}", style("Installation interrupted").red());
            std::process::exit(130);
        }
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}

fn report_failure(config: &InstallerConfig, err: &InstallError) {
    eprintln!("{}", style(err).red());

    if err.phase() == InstallPhase::Fetching {
        if let Some(url) = err.url() {
            eprintln!("URL: {}", url);
        }
        eprintln!();
        eprintln!("Make sure the release exists at:");
        eprintln!("{}", release_page_url(&config.release));
    }
}
