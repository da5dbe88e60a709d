use axum::response::Html;
use diesel::sqlite::SqliteConnection;
use tera::Context;

use warbler_shared::errors::AppResult;
use warbler_shared::session::Session;

use crate::models::User;
use crate::AppState;

pub mod auth;
pub mod health;
pub mod home;
pub mod messages;
pub mod users;

pub(crate) fn render(state: &AppState, template: &str, ctx: &Context) -> AppResult<Html<String>> {
    Ok(Html(state.templates.render(template, ctx)?))
}

/// Context every page template expects: the logged-in user (or null) and an
/// optional flash message.
pub(crate) fn base_context(user: Option<&User>, flash: Option<&str>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("user", &user);
    ctx.insert("flash", &flash);
    ctx.insert("error", &Option::<&str>::None);
    ctx
}

/// Resolve the session marker to a user row. A stale marker (user deleted)
/// counts as logged out.
pub(crate) fn load_session_user(
    conn: &mut SqliteConnection,
    session: Session,
) -> AppResult<Option<User>> {
    match session.user_id {
        Some(id) => Ok(User::find(conn, id)?),
        None => Ok(None),
    }
}
