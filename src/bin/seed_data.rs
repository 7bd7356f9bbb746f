//! Seed data script - replaces the product catalog with the fixture set
//!
//! Run with: cargo run --bin seed-data -- [--database-url <URL>] [--skip-migrations]
//!
//! Existing cart lines, carts and favorites are removed along with the old
//! products, since they reference product ids.

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use storefront_api::{config, db, seed};

#[derive(Debug, Parser)]
#[command(name = "seed-data", about = "Populate the storefront database with sample products")]
struct Args {
    /// Database URL; defaults to the configured `database_url`
    #[arg(long)]
    database_url: Option<String>,

    /// Do not apply pending migrations before seeding
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    if let Some(url) = args.database_url {
        cfg.database_url = url;
    }

    if let Err(err) = run(&cfg, args.skip_migrations).await {
        error!(error = %err, "Seeding failed");
        return Err(err);
    }

    Ok(())
}

async fn run(cfg: &config::AppConfig, skip_migrations: bool) -> anyhow::Result<()> {
    info!("Connecting to database for seeding");
    let pool = db::establish_connection_from_app_config(cfg)
        .await
        .context("failed to connect to database")?;

    if !skip_migrations {
        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
    }

    let created = seed::seed_database(&pool)
        .await
        .context("failed to seed products")?;

    println!("Seeded {} products into the database", created.len());
    info!("Seeding completed successfully");
    Ok(())
}
