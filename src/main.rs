use anyhow::Context;
use bloggery::{api, config::Config, AppState};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let conn = Database::connect(config.database_url.as_str())
        .await
        .context("database connection failed")?;
    Migrator::up(&conn, None).await?;

    let state = AppState::from_config(conn, &config);
    let app = api::router(state);

    let listener = TcpListener::bind(config.server_url())
        .await
        .with_context(|| format!("cannot bind {}", config.server_url()))?;
    tracing::info!(addr = %config.server_url(), "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
