//! `crowdcast db` command handlers.

use std::path::PathBuf;

use clap::Subcommand;
use sqlx::PgPool;

/// Sub-commands available under `db`.
#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Validate the achievement catalog and upsert it by slug
    Seed {
        /// Catalog file (defaults to `CROWDCAST_ACHIEVEMENTS_PATH`)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

pub(crate) async fn run(
    pool: &PgPool,
    config: &crowdcast_core::AppConfig,
    command: DbCommands,
) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            crowdcast_db::ping(pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = crowdcast_db::run_migrations(pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Seed { path } => {
            let path = path.unwrap_or_else(|| config.achievements_path.clone());
            run_seed(pool, &path).await?;
        }
    }
    Ok(())
}

/// Load the catalog from `path`, validate it, and upsert every entry.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if
/// the upsert transaction fails. Nothing is written on validation failure.
async fn run_seed(pool: &PgPool, path: &std::path::Path) -> anyhow::Result<()> {
    let catalog = crowdcast_core::load_achievements(path)?;
    let seeded = crowdcast_db::seed_achievements(pool, &catalog.achievements).await?;
    tracing::info!(seeded, path = %path.display(), "achievement catalog seeded");
    println!("seeded {seeded} achievement(s) from {}", path.display());
    Ok(())
}
