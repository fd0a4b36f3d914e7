use roll_call::core::{get_subscriber, init_subscriber, AppConfig};
use roll_call::db;

use colored::*;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let file_appender = tracing_appender::rolling::daily("/var/tmp/log/roll_call", "app");

    let subscriber = get_subscriber("roll_call".into(), "info".into(), file_appender);
    init_subscriber(subscriber);

    let config = AppConfig::new().expect("cant build our appConfig object");

    let pool = db::connect(&config.sqlite)
        .await
        .expect("Failed to open the portal database");

    db::initialize(&pool)
        .await
        .expect("Failed to run database migrations");

    db::ensure_bootstrap_admin(&pool, &config.bootstrap)
        .await
        .expect("Failed to seed the bootstrap admin");

    println!("{}", "-----------------------------------------".green());
    println!(
        "🎓 Portal core ready, database at: {}",
        config.sqlite.database_path
    );
    println!("{}", "-----------------------------------------".green());

    // The desktop shell links against the library and takes over from here;
    // this binary only prepares the database it renders from.
    Ok(())
}
