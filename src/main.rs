use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info};

use fileshare::file::sweep;
use fileshare::{create_image_api, AppState, Config, Database, TempStorage, WebServer};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Load the config file if present, otherwise defaults, then environment
/// overrides.
fn load_config(path: &str) -> fileshare::Result<Config> {
    let mut config = if Path::new(path).exists() {
        Config::load(path)?
    } else {
        eprintln!("{path} not found, using default configuration.");
        Config::default()
    };
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

async fn serve(config: Config) -> fileshare::Result<()> {
    let db = Database::open(&config.database.path).await?;
    let images = create_image_api(&config.image)?;
    let uploads = TempStorage::new(&config.uploads.temp_dir)?;

    let leftover = uploads.clear()?;
    if leftover > 0 {
        info!(count = leftover, "Removed leftover buffered uploads");
    }

    let state = AppState::new(db, images, uploads)
        .with_max_upload_size(config.uploads.max_upload_bytes())
        .with_session_expiry(config.web.session_expiry_secs)
        .with_secure_cookies(config.web.secure_cookies);

    WebServer::new(&config, state)?.run().await?;
    Ok(())
}

async fn run_sweep(config: Config) -> fileshare::Result<()> {
    let db = Database::open(&config.database.path).await?;
    let images = create_image_api(&config.image)?;

    let report = sweep(db.pool(), &*images, config.retention.max_age_days).await?;
    info!(
        selected = report.selected,
        removed = report.removed,
        failed = report.failed,
        "Sweep finished"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, config_path) = match args.first().map(String::as_str) {
        Some("sweep") => ("sweep", args.get(1).map(String::as_str)),
        Some("serve") => ("serve", args.get(1).map(String::as_str)),
        other => ("serve", other),
    };

    let config = match load_config(config_path.unwrap_or(DEFAULT_CONFIG_PATH)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = fileshare::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        fileshare::logging::init_console_only(&config.logging.level);
    }

    info!("fileshare {}", env!("CARGO_PKG_VERSION"));

    let result = match command {
        "sweep" => run_sweep(config).await,
        _ => {
            info!(
                "Server configured on {}:{}",
                config.web.host, config.web.port
            );
            serve(config).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
