use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;

use autopkgtest_diff::config::{DiffConfig, LoggingConfig};
use autopkgtest_diff::DatabaseError;

#[derive(Parser)]
#[command(
    name = "autopkgtest-diff",
    about = "Compare autopkgtest results before and after a reference date",
    version,
    long_about = "Compares the latest autopkgtest run before REFERENCE_DATE with the \
                  latest run on or after it, per package and architecture, and writes \
                  no_news, good_news and bad_news JSON reports.\n\n\
                  Packages come from the local package list, or from the team mapping \
                  when TEAM is given. Settings are read from $AUTOPKGTEST_DIFF_CONFIG \
                  or ./autopkgtest-diff.toml."
)]
struct Cli {
    /// Reference date (YYYY-MM-DD); runs on or after it count as "after"
    reference_date: NaiveDate,

    /// Team whose packages to compare (from the team mapping)
    team: Option<String>,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli, config: DiffConfig) -> Result<()> {
    let summary = autopkgtest_diff::run(&config, cli.reference_date, cli.team.as_deref()).await?;

    for (class, path, pairs) in &summary.written {
        println!("{:<10} {:>5} pair(s)  {}", class, pairs, path.display());
    }
    if summary.no_data > 0 {
        println!("{:<10} {:>5} pair(s)  (not reported)", "no_data", summary.no_data);
    }
    if summary.failed > 0 {
        println!("{:<10} {:>5} pair(s)  (skipped, see log)", "failed", summary.failed);
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match DiffConfig::discover() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging);
    tracing::debug!(?config, "effective configuration");

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.downcast_ref::<DatabaseError>().is_some() {
                tracing::error!(error = %format!("{e:#}"), "results database unavailable");
            } else {
                tracing::error!(error = %format!("{e:#}"), "comparison failed");
            }
            ExitCode::FAILURE
        }
    }
}
