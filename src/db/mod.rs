pub mod courses;
pub mod degrees;
pub mod users;

use secrecy::ExposeSecret;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::core::config::{BootstrapConfig, SqliteConfig};
use crate::core::AppError;
use crate::models::users::{RegisterRequest, Role};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub async fn connect(config: &SqliteConfig) -> Result<SqlitePool, AppError> {
    let pool = SqlitePoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_with(config.connect())
        .await?;

    Ok(pool)
}

/// Creates the schema, triggers and seed data on a fresh database; a no-op
/// on an already-migrated one.
pub async fn initialize(pool: &SqlitePool) -> Result<(), AppError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Seeds the configured admin account so a fresh database has someone who
/// can promote users and manage courses. Idempotent.
#[tracing::instrument(name = "Seeding bootstrap admin", skip(pool, bootstrap))]
pub async fn ensure_bootstrap_admin(
    pool: &SqlitePool,
    bootstrap: &BootstrapConfig,
) -> Result<(), AppError> {
    if users::email_exists(pool, &bootstrap.admin_email).await? {
        tracing::debug!("bootstrap admin already present");
        return Ok(());
    }

    let request = RegisterRequest {
        first_name: bootstrap.admin_first_name.clone(),
        surname: bootstrap.admin_surname.clone(),
        birthdate: bootstrap.admin_birthdate.clone(),
        email: bootstrap.admin_email.clone(),
        password: bootstrap.admin_password.expose_secret().clone(),
        password_confirmation: bootstrap.admin_password.expose_secret().clone(),
    };

    let user = users::create_user(pool, &request).await?;
    users::set_account_role(pool, user.person().id, Role::Admin).await?;

    tracing::info!(email = %bootstrap.admin_email, "bootstrap admin created");
    Ok(())
}
