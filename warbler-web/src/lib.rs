use axum::extract::FromRef;
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::Key;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tera::Tera;
use tower_http::trace::TraceLayer;

use warbler_shared::clients::db::DbPool;

pub mod config;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;

use config::AppConfig;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub templates: Tera,
    key: Key,
}

impl AppState {
    pub fn new(db: DbPool, config: &AppConfig) -> anyhow::Result<Self> {
        let templates = load_templates()?;
        let key = Key::derive_from(config.session_secret.as_bytes());
        Ok(Self { db, templates, key })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.key.clone()
    }
}

pub fn load_templates() -> tera::Result<Tera> {
    Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*.html"))
}

pub fn run_migrations(conn: &mut SqliteConnection) -> anyhow::Result<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("running migrations failed: {e}"))?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home::index))
        .route("/health", get(routes::health::health_check))
        .route(
            "/signup",
            get(routes::auth::signup_form).post(routes::auth::signup),
        )
        .route(
            "/login",
            get(routes::auth::login_form).post(routes::auth::login),
        )
        .route("/logout", get(routes::auth::logout))
        .route("/users", get(routes::users::index))
        .route(
            "/users/profile",
            get(routes::users::edit_form).post(routes::users::update_profile),
        )
        .route("/users/delete", post(routes::users::delete_account))
        .route("/users/follow/:id", post(routes::users::follow))
        .route(
            "/users/stop-following/:id",
            post(routes::users::stop_following),
        )
        .route("/users/:id", get(routes::users::show))
        .route("/users/:id/following", get(routes::users::following))
        .route("/users/:id/followers", get(routes::users::followers))
        .route("/users/:id/likes", get(routes::users::likes))
        .route(
            "/messages/new",
            get(routes::messages::new_form).post(routes::messages::create),
        )
        .route("/messages/:id", get(routes::messages::show))
        .route("/messages/:id/delete", post(routes::messages::delete))
        .route("/messages/:id/like", post(routes::messages::toggle_like))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
