use std::process::ExitCode;

use configs::{AppConfig, LogFormat};
use migration::{Migrator, MigratorTrait};
use tracing::{error, info};

/// Subcommands accepted on the command line; `up` when none is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Up,
    Down(Option<u32>),
    Fresh,
    Refresh,
    Status,
}

fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    let steps = match args.get(1) {
        Some(n) => Some(n.parse::<u32>().map_err(|_| anyhow::anyhow!("steps must be a positive number, got {n}"))?),
        None => None,
    };
    match args.first().map(String::as_str) {
        None | Some("up") => Ok(Command::Up),
        Some("down") => Ok(Command::Down(steps.or(Some(1)))),
        Some("fresh") => Ok(Command::Fresh),
        Some("refresh") => Ok(Command::Refresh),
        Some("status") => Ok(Command::Status),
        Some(other) => Err(anyhow::anyhow!("unknown command `{other}`; expected up, down [n], fresh, refresh or status")),
    }
}

fn init_logging(cfg: &AppConfig) {
    match cfg.logging.format {
        LogFormat::Compact => common::utils::logging::init_logging_default(),
        LogFormat::Json => common::utils::logging::init_logging_json(),
    }
    info!(service = "migrate", event = "logger_init", "tracing subscriber initialized");
}

async fn run(cfg: &AppConfig, cmd: Command) -> anyhow::Result<()> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    models::db::ping(&db).await?;
    match cmd {
        Command::Up => Migrator::up(&db, None).await?,
        Command::Down(steps) => Migrator::down(&db, steps).await?,
        Command::Fresh => Migrator::fresh(&db).await?,
        Command::Refresh => Migrator::refresh(&db).await?,
        Command::Status => Migrator::status(&db).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cfg = match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "migrate", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&cfg);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = match parse_command(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            error!(service = "migrate", event = "bad_args", error = %e, "invalid arguments");
            return ExitCode::from(2);
        }
    };

    info!(service = "migrate", event = "start", command = ?cmd, sqlite = cfg.database.is_sqlite(), "running migrations");
    match run(&cfg, cmd).await {
        Ok(()) => {
            info!(service = "migrate", event = "done", command = ?cmd, "migrations finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "migrate", event = "failed", error = %e, "migration command failed");
            ExitCode::FAILURE
        }
    }
}
