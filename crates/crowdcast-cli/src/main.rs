mod db;
mod jobs;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{db::DbCommands, jobs::JobsCommands};

#[derive(Debug, Parser)]
#[command(name = "crowdcast")]
#[command(about = "Crowdcast engagement jobs command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Run an engagement job once and print its result as JSON
    Jobs {
        #[command(subcommand)]
        command: JobsCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("crowdcast: no command given; see --help");
        return Ok(());
    };

    let config = crowdcast_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let pool_config = crowdcast_db::PoolConfig::from_app_config(&config);
    let pool = crowdcast_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => db::run(&pool, &config, command).await,
        Commands::Jobs { command } => jobs::run(&pool, command).await,
    }
}

#[cfg(test)]
mod tests;
