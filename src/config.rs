use anyhow::Result;
use sea_orm::Database;

use crate::auth::SessionManager;
use crate::schemas::AppState;

/// Runtime configuration, read once at process start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub session_secret: String,
}

impl AppConfig {
    /// Loads configuration from the environment (and `.env` if present).
    ///
    /// `DATABASE_URL` wins; otherwise a Postgres URL is assembled from the
    /// historical `WHATSUB_DATABASE_*` parts, falling back to a local
    /// SQLite file for development.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            match (
                std::env::var("WHATSUB_DATABASE_HOST"),
                std::env::var("WHATSUB_DATABASE_NAME"),
                std::env::var("WHATSUB_DATABASE_USER"),
                std::env::var("WHATSUB_DATABASE_PASSWORD"),
            ) {
                (Ok(host), Ok(name), Ok(user), Ok(password)) => {
                    format!("postgres://{user}:{password}@{host}/{name}")
                }
                _ => "sqlite://whatsub.db".to_string(),
            }
        });

        let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| {
            let port = std::env::var("WHATSUB_PORT").unwrap_or_else(|_| "3000".to_string());
            format!("0.0.0.0:{port}")
        });

        let session_secret = std::env::var("WHATSUB_SESSION_SECRET")
            .unwrap_or_else(|_| "whatsub-dev-secret".to_string());

        Self {
            database_url,
            bind_address,
            session_secret,
        }
    }
}

/// Initialize application state from configuration.
pub async fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url).await?;

    let sessions = SessionManager::new(&config.session_secret);

    Ok(AppState { db, sessions })
}
