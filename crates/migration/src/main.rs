use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./fairshare.db?mode=rwc";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let cmd = args.next().unwrap_or_else(|| "up".to_string());
    // An explicit URL argument wins over the environment.
    let db_url = args
        .next()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

    let db = Database::connect(&db_url).await?;

    match cmd.as_str() {
        "up" => migration::Migrator::up(&db, None).await?,
        "down" => migration::Migrator::down(&db, Some(1)).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => {
            let pending = migration::Migrator::get_pending_migrations(&db).await?;
            println!("{db_url}: {} pending migration(s)", pending.len());
            migration::Migrator::status(&db).await?;
        }
        _ => {
            eprintln!("Usage: migration [up|down|fresh|status] [DATABASE_URL]");
            std::process::exit(2);
        }
    }

    Ok(())
}
