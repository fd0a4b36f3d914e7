use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use once_cell::sync::Lazy;
use rand::Rng;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use roll_call::core::config::SqliteConfig;
use roll_call::core::{get_subscriber, init_subscriber};
use roll_call::db;
use roll_call::models::users::{RegisterRequest, Role, User};

// Logs are swallowed unless TEST_LOG is set; the subscriber can only be
// installed once per process.
static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber("test".into(), "debug".into(), std::io::stdout);
        init_subscriber(subscriber);
    }
});

/// Fresh in-memory database with schema, triggers and seed data applied.
/// A single connection keeps every query on the same `:memory:` instance.
pub async fn spawn_db() -> SqlitePool {
    Lazy::force(&TRACING);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(SqliteConfig::in_memory())
        .await
        .expect("Failed to open in-memory database");

    db::initialize(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub fn register_request(password: &str) -> RegisterRequest {
    // A random tag on the local part keeps emails unique across the run.
    let tag: u32 = rand::thread_rng().gen();
    let email: String = SafeEmail().fake();

    RegisterRequest {
        first_name: "Ada".to_string(),
        surname: "Lovelace".to_string(),
        birthdate: "2000-01-01".to_string(),
        email: format!("{}.{}", tag, email),
        password: password.to_string(),
        password_confirmation: password.to_string(),
    }
}

pub async fn create_student(pool: &SqlitePool) -> User {
    db::users::create_user(pool, &register_request("hunter2"))
        .await
        .expect("Failed to create student")
}

#[allow(dead_code)]
pub async fn create_teacher(pool: &SqlitePool) -> User {
    let user = create_student(pool).await;
    let id = user.person().id;
    db::users::set_account_role(pool, id, Role::Teacher)
        .await
        .expect("Failed to promote to teacher");
    db::users::get_user_by_id(pool, id)
        .await
        .expect("Failed to reload teacher")
}
