//! `barpark` -- runs the park app's screens against simulated services.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default          | Description                          |
//! |------------------------|----------|------------------|--------------------------------------|
//! | `BARPARK_LATENCY_MS`   | no       | `300`            | Delay added to every service call    |
//! | `BARPARK_FAILURE_RATE` | no       | `0.0`            | Chance that a service call fails     |
//! | `BARPARK_DATA_DIR`     | no       | `./barpark-data` | Photo files and dashboard settings   |
//! | `BARPARK_USER_NAME`    | no       | `You`            | Display name of the local user       |
//! | `BARPARK_LOG_FORMAT`   | no       | `pretty`         | `pretty` or `json`                   |
//! | `RUST_LOG`             | no       | `barpark=info`   | Standard `tracing` filter            |

use barpark_app::{demo, AppConfig, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "barpark=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }

    tracing::info!(
        latency_ms = config.latency.as_millis() as u64,
        failure_rate = config.failure_rate,
        data_dir = %config.data_dir.display(),
        "Starting barpark",
    );

    let report = demo::run(&config).await?;

    tracing::info!(
        parks = report.parks,
        reviews = report.reviews,
        average_rating = report.average_rating,
        joined = ?report.joined_event,
        photos = report.photos,
        changes = report.changes,
        rollbacks = report.rollbacks,
        "Demo finished",
    );
    Ok(())
}
