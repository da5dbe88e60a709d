use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use validator::Validate;

use warbler_shared::errors::{is_unique_violation, AppError, AppResult};
use warbler_shared::session::{clear_session, flash, found, session_cookie, take_flash};

use crate::models::User;
use crate::routes::{base_context, render};
use crate::services::auth_service;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub password: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// --- GET /signup ---

pub async fn signup_form(State(state): State<AppState>) -> AppResult<Response> {
    let ctx = base_context(None, None);
    Ok(render(&state, "users/signup.html", &ctx)?.into_response())
}

// --- POST /signup ---

/// Creates the account and logs the new user in. A duplicate username or email
/// is caught at this boundary and re-renders the form with feedback instead of
/// bubbling the integrity error.
pub async fn signup(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    if let Err(errors) = form.validate() {
        let mut ctx = base_context(None, None);
        ctx.insert("error", &errors.to_string());
        return Ok(render(&state, "users/signup.html", &ctx)?.into_response());
    }

    if let Err(err) = auth_service::validate_password(&form.password) {
        let AppError::Validation(message) = err else {
            return Err(err);
        };
        let mut ctx = base_context(None, None);
        ctx.insert("error", &message);
        return Ok(render(&state, "users/signup.html", &ctx)?.into_response());
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let user = match User::signup(
        &mut conn,
        &form.username,
        &form.email,
        &form.password,
        form.image_url.as_deref(),
    ) {
        Ok(user) => user,
        Err(AppError::Database(err)) if is_unique_violation(&err) => {
            let mut ctx = base_context(None, None);
            ctx.insert("error", "Username already taken");
            return Ok(render(&state, "users/signup.html", &ctx)?.into_response());
        }
        Err(other) => return Err(other),
    };

    tracing::info!(user_id = user.id, username = %user.username, "user signed up");

    let jar = jar.add(session_cookie(user.id));
    Ok((jar, found("/")).into_response())
}

// --- GET /login ---

pub async fn login_form(State(state): State<AppState>, jar: SignedCookieJar) -> AppResult<Response> {
    let (jar, message) = take_flash(jar);
    let ctx = base_context(None, message.as_deref());
    Ok((jar, render(&state, "users/login.html", &ctx)?).into_response())
}

// --- POST /login ---

pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    match User::authenticate(&mut conn, &form.username, &form.password)? {
        Some(user) => {
            tracing::info!(user_id = user.id, "user logged in");
            let jar = jar.add(session_cookie(user.id));
            let jar = flash(jar, format!("Hello, {}!", user.username));
            Ok((jar, found("/")).into_response())
        }
        None => {
            let mut ctx = base_context(None, None);
            ctx.insert("error", "Invalid credentials.");
            Ok(render(&state, "users/login.html", &ctx)?.into_response())
        }
    }
}

// --- GET /logout ---

pub async fn logout(jar: SignedCookieJar) -> Response {
    let jar = clear_session(jar);
    let jar = flash(jar, "You have been logged out.");
    (jar, found("/login")).into_response()
}
