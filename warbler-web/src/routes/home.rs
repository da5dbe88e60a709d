use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::SignedCookieJar;

use warbler_shared::errors::{AppError, AppResult};
use warbler_shared::session::{take_flash, Session};

use crate::routes::{base_context, load_session_user, render};
use crate::AppState;

/// GET / - the logged-in feed, or the anonymous landing page.
pub async fn index(
    session: Session,
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let (jar, flash) = take_flash(jar);

    match load_session_user(&mut conn, session)? {
        Some(user) => {
            let feed = user.feed(&mut conn)?;
            let mut ctx = base_context(Some(&user), flash.as_deref());
            ctx.insert("feed", &feed);
            Ok((jar, render(&state, "home.html", &ctx)?).into_response())
        }
        None => {
            let ctx = base_context(None, flash.as_deref());
            Ok((jar, render(&state, "home-anon.html", &ctx)?).into_response())
        }
    }
}
