//! `sowcycle-worker` -- one reporting sweep over the breeding engine.
//!
//! Lists the pending alerts whose notify-on set contains the sweep day and
//! the open pregnancies past their expected birth date, then exits.
//!
//! # Environment variables
//!
//! Everything [`EngineConfig::from_env`] reads, plus:
//!
//! | Variable     | Required | Default     | Description                    |
//! |--------------|----------|-------------|--------------------------------|
//! | `SWEEP_DATE` | no       | today (UTC) | Day to sweep, `YYYY-MM-DD`     |

use std::sync::Arc;

use anyhow::Context;
use sowcycle_core::calendar::{parse_calendar_date, Clock, FixedClock, SystemClock};
use sowcycle_engine::{BreedingRecordManager, EngineConfig, EngineDeps};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sowcycle_worker=debug,sowcycle_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env().context("Failed to load configuration")?;

    let clock: Arc<dyn Clock> = match std::env::var("SWEEP_DATE") {
        Ok(raw) => Arc::new(FixedClock::at_date(parse_calendar_date("SWEEP_DATE", &raw)?)),
        Err(_) => Arc::new(SystemClock),
    };
    let day = clock.today();

    let pool = sowcycle_db::create_pool(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    sowcycle_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    sowcycle_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    tracing::info!(
        species = %config.profile.species,
        %day,
        grace_days = config.overdue_grace_days,
        "Starting sweep"
    );

    let deps = EngineDeps::new(
        pool.clone(),
        config.profile,
        clock,
        Arc::new(Default::default()),
    );
    let breeding = BreedingRecordManager::new(deps);
    let report = sowcycle_worker::sweep::run(&pool, &breeding, day, config.overdue_grace_days).await?;

    tracing::info!(
        farms = report.farms,
        due_alerts = report.due_alerts,
        overdue_pregnancies = report.overdue_pregnancies,
        "Sweep complete"
    );
    Ok(())
}
