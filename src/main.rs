use std::process::ExitCode;

use tracing::{error, info};

use academy::cli::{self, Action};
use academy::{Config, CredentialError, CredentialStore, Database, WebServer};

fn load_config(path: &str) -> Config {
    let mut config = match Config::load(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();
    config
}

async fn create_admin(config: &Config, email: &str, password: &str, name: &str) -> ExitCode {
    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match CredentialStore::new(db).bootstrap_admin(email, password, name).await {
        Ok(admin) => {
            info!(admin_id = admin.id, email = %admin.email, "Admin created");
            ExitCode::SUCCESS
        }
        Err(CredentialError::AdminExists) => {
            error!("Admin already exists");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Failed to create admin: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: &Config) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let server = match WebServer::new(config, db) {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Academy server configured on {}", server.addr());
    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Web server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let action = cli::dispatch(&cli::new().get_matches());
    let config_path = match &action {
        Action::Serve { config } | Action::CreateAdmin { config, .. } => config.clone(),
    };
    let config = load_config(&config_path);

    if let Err(e) = academy::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        academy::logging::init_console_only(&config.logging.level);
    }

    match action {
        Action::Serve { .. } => serve(&config).await,
        Action::CreateAdmin {
            email,
            password,
            name,
            ..
        } => create_admin(&config, &email, &password, &name).await,
    }
}
