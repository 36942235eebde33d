use anyhow::Context;
use clap::Parser;
use ratesheet_core::config::Settings;
use ratesheet_core::ingest::env::RateInputs;
use ratesheet_core::ingest::error::InputError;
use ratesheet_core::time::stamp::{resolve_updated_at, UpdateStamp};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod report;

#[derive(Debug, Parser)]
#[command(name = "ratesheet_worker")]
#[command(about = "Merge today's mortgage rates into the rates snapshot file")]
struct Args {
    /// Path of the rates snapshot. Overrides RATES_PATH.
    #[arg(long)]
    rates_path: Option<PathBuf>,

    /// Record the update at this RFC 3339 instant instead of now.
    #[arg(long)]
    updated_at: Option<String>,

    /// Compute and print the summary without writing the file.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(&settings, &args) {
        sentry_anyhow::capture_anyhow(&err);
        match err.downcast_ref::<InputError>() {
            Some(input) => tracing::error!(
                variable = %input.variable,
                value = ?input.value,
                "rate input rejected; rates file left unchanged"
            ),
            None => {
                let detail = format!("{err:#}");
                tracing::error!(error = %detail, "rates update failed");
            }
        }
        return Err(err);
    }

    Ok(())
}

fn run(settings: &Settings, args: &Args) -> anyhow::Result<()> {
    let rates_path = args
        .rates_path
        .clone()
        .unwrap_or_else(|| settings.rates_path.clone());

    let updated_at = resolve_updated_at(args.updated_at.as_deref(), chrono::Utc::now())?;
    let stamp = UpdateStamp::at(updated_at, settings.display_offset);
    let inputs = RateInputs::from_env();

    tracing::info!(
        path = %rates_path.display(),
        %updated_at,
        dry_run = args.dry_run,
        "updating rates"
    );

    let outcome = ratesheet_core::update::update_rates_file(&rates_path, &inputs, &stamp, args.dry_run)
        .with_context(|| format!("rates update for {} failed", rates_path.display()))?;

    println!(
        "{}",
        report::render_summary(&stamp.display_date, &outcome.changes, outcome.written)
    );
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
