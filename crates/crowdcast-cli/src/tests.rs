use super::*;
use uuid::Uuid;

const USER: &str = "6f1c9b54-2b1e-4c1a-9d2f-0a8b7c6d5e4f";

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["crowdcast", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["crowdcast", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn db_seed_path_is_optional() {
    let cli = Cli::try_parse_from(["crowdcast", "db", "seed"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Seed { path: None }
        })
    ));

    let cli = Cli::try_parse_from(["crowdcast", "db", "seed", "--path", "catalog.yaml"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Seed { path: Some(ref p) }
        }) if p.as_os_str() == "catalog.yaml"
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["crowdcast"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_jobs_trending() {
    let cli = Cli::try_parse_from(["crowdcast", "jobs", "trending"]).expect("valid args");
    assert!(matches!(
        cli.command,
        Some(Commands::Jobs {
            command: JobsCommands::Trending
        })
    ));
}

#[test]
fn jobs_streaks_without_user_is_the_sweep() {
    let cli = Cli::try_parse_from(["crowdcast", "jobs", "streaks"]).expect("valid args");
    assert!(matches!(
        cli.command,
        Some(Commands::Jobs {
            command: JobsCommands::Streaks { user: None }
        })
    ));
}

#[test]
fn jobs_streaks_parses_user_uuid() {
    let cli = Cli::try_parse_from(["crowdcast", "jobs", "streaks", "--user", USER])
        .expect("valid args");
    let expected = Uuid::parse_str(USER).expect("uuid");
    assert!(matches!(
        cli.command,
        Some(Commands::Jobs {
            command: JobsCommands::Streaks { user: Some(u) }
        }) if u == expected
    ));
}

#[test]
fn jobs_streaks_rejects_non_uuid_user() {
    let result = Cli::try_parse_from(["crowdcast", "jobs", "streaks", "--user", "ada"]);
    assert!(result.is_err());
}

#[test]
fn jobs_achievements_requires_user() {
    let result = Cli::try_parse_from(["crowdcast", "jobs", "achievements"]);
    assert!(result.is_err());
}

#[test]
fn jobs_achievements_accepts_event() {
    let cli = Cli::try_parse_from([
        "crowdcast",
        "jobs",
        "achievements",
        "--user",
        USER,
        "--event",
        "new_follower",
    ])
    .expect("valid args");

    assert!(matches!(
        cli.command,
        Some(Commands::Jobs {
            command: JobsCommands::Achievements { event: Some(ref e), .. }
        }) if e == "new_follower"
    ));
}
