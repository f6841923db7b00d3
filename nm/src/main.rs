//! nm - Next Meal client
//!
//! CLI entry point for the interactive shell and backend checks.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use nextmeal::cli::{Cli, Command, get_log_path};
use nextmeal::config::Config;
use nextmeal::runtime::AppHandle;
use nextmeal::shell::ShellSession;
use nextmeal::{HttpMealApi, MealApi};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(base_url = %config.backend.base_url, providers = ?config.identity.providers, "nextmeal loaded config");

    let api = HttpMealApi::from_config(&config.backend).context("Failed to create backend client")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None | Some(Command::Shell) => {
            debug!("main: matched Shell command");
            cmd_shell(&config, api).await
        }
        Some(Command::Ping) => {
            debug!("main: matched Ping command");
            cmd_ping(&api).await
        }
        Some(Command::Meals { skip, limit }) => {
            debug!(skip, limit, "main: matched Meals command");
            cmd_meals(&api, skip, limit).await
        }
    }
}

async fn cmd_shell(config: &Config, api: HttpMealApi) -> Result<()> {
    let base_url = api.base_url().to_string();
    let api: Arc<dyn MealApi> = Arc::new(api);
    let handle = AppHandle::start(config, api);
    ShellSession::new(handle, base_url).run().await
}

async fn cmd_ping(api: &HttpMealApi) -> Result<()> {
    let message = api
        .health()
        .await
        .context(format!("Backend at {} is not reachable", api.base_url()))?;
    println!("{} {}", "ok".bright_green(), message);
    Ok(())
}

async fn cmd_meals(api: &HttpMealApi, skip: u32, limit: u32) -> Result<()> {
    let meals = api.list_meals(skip, limit).await.context("Failed to list meals")?;
    if meals.is_empty() {
        println!("{}", "No meals.".dimmed());
        return Ok(());
    }
    for meal in meals {
        let tags: Vec<String> = [&meal.category, &meal.suitable_time, &meal.mood_tag, &meal.regional_tag]
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        let calories = meal.calories.map(|c| format!("{} kcal", c)).unwrap_or_default();
        println!(
            "{:>4}  {:32} {} {}",
            meal.id.to_string().dimmed(),
            meal.name,
            tags.join(" · ").cyan(),
            calories.dimmed()
        );
    }
    Ok(())
}
