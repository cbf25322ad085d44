mod cli;
mod error;

use crate::cli::{Args, Commands};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use futures::future::join_all;
use preload_config::BuildConfig;
use preload_engine::{Mode, Preloader, lifecycle};
use preload_storage::backend::LocalBackend;
use std::process::ExitCode;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = init_logging(args.verbose, args.quiet) {
        eprintln!("Error: {err:?}");
        return ExitCode::FAILURE;
    }
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(log_filter(verbose, quiet, directives.as_deref()))
        .try_init()
        .or_raise(|| ErrorKind::Logging)
}

/// `--quiet` and `--verbose` win over `RUST_LOG`, which wins over the
/// `info` default.
fn log_filter(verbose: bool, quiet: bool, directives: Option<&str>) -> EnvFilter {
    if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        directives
            .filter(|directives| !directives.trim().is_empty())
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = BuildConfig::load(args.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if args.production {
        config.mode = Mode::Production;
    }
    let preloader = Preloader::from_config(config).or_raise(|| ErrorKind::Setup)?;

    match args.command {
        Commands::Fetch { urls, site, name, file_ending, skip_cache, content_hash } => {
            if preloader.config().clear_preloaded && preloader.config().mode.is_production() {
                lifecycle::clear(preloader.store().as_ref()).await.or_raise(|| ErrorKind::Clear)?;
            }
            let options = cli::options(site, name, file_ending, skip_cache, content_hash);
            let served = join_all(urls.iter().map(|url| preloader.preload(url, &options))).await;
            for path in served {
                println!("{path}");
            }
        },
        Commands::Clear => {
            let removed = lifecycle::clear(preloader.store().as_ref()).await.or_raise(|| ErrorKind::Clear)?;
            println!("Removed {removed} preloaded artifact(s)");
        },
        Commands::Copy => {
            let target = LocalBackend::new("output", preloader.config().output_preload_dir())
                .or_raise(|| ErrorKind::CopyTree)?;
            let copied = lifecycle::copy_tree(preloader.store().as_ref(), &target).await.or_raise(|| ErrorKind::CopyTree)?;
            println!("Copied {copied} preloaded artifact(s) to {}", target.root().display());
        },
    }
    Ok(())
}
