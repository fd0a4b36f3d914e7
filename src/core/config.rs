use secrecy::Secret;
use serde::Deserialize;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::ConnectOptions;

#[derive(Deserialize, Clone)]
pub struct AppConfig {
    pub portal: PortalConfig,
    pub sqlite: SqliteConfig,
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self, config::ConfigError> {
        let base_path = std::env::current_dir().expect("Failed to find the current dir");
        let config_dir = base_path.join("src/core/configurations");

        let app_environment: Environment = std::env::var("ROLL_CALL_APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .expect("Failed to parse ROLL_CALL_APP_ENVIRONMENT");

        let configurations = config::Config::builder()
            .add_source(
                config::File::from(config_dir.join(app_environment.as_str())).required(true),
            )
            .build()?;

        configurations.try_deserialize()
    }
}

#[derive(Deserialize, Clone)]
pub struct PortalConfig {
    pub name: String,
}

#[derive(Deserialize, Clone)]
pub struct SqliteConfig {
    pub database_path: String,
    pub create_if_missing: bool,
}

impl SqliteConfig {
    pub fn connect(&self) -> SqliteConnectOptions {
        let options = SqliteConnectOptions::new()
            .filename(&self.database_path)
            .create_if_missing(self.create_if_missing)
            .foreign_keys(true);

        options.log_statements(tracing::log::LevelFilter::Trace)
    }

    pub fn in_memory() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(":memory:")
            .foreign_keys(true)
    }
}

/// First admin account, seeded on startup so a fresh database is usable.
#[derive(Deserialize, Clone)]
pub struct BootstrapConfig {
    pub admin_first_name: String,
    pub admin_surname: String,
    pub admin_birthdate: String,
    pub admin_email: String,
    pub admin_password: Secret<String>,
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
