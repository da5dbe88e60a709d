use warbler_shared::clients::db::create_pool;

use warbler_web::config::AppConfig;
use warbler_web::{build_router, run_migrations, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    warbler_shared::middleware::init_tracing("warbler-web");

    let config = AppConfig::load()?;
    let port = config.port;

    let pool = create_pool(&config.database_url)?;
    {
        let mut conn = pool.get()?;
        run_migrations(&mut conn)?;
    }

    let state = AppState::new(pool, &config)?;
    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "warbler-web starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
