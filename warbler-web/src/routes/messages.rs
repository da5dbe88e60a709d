use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use validator::Validate;

use warbler_shared::errors::{AppError, AppResult};
use warbler_shared::session::{found, unauthorized_redirect, Session};

use crate::models::{Message, User};
use crate::routes::{base_context, load_session_user, render};
use crate::AppState;

/// Only `text` is read from the form; the owner is always the session user, so
/// a forged `user_id` field cannot attach the message to someone else.
#[derive(Debug, Deserialize, Validate)]
pub struct NewMessageForm {
    #[validate(length(min = 1, max = 140, message = "Message must be 1-140 characters"))]
    pub text: String,
}

fn find_message(conn: &mut diesel::SqliteConnection, id: i32) -> AppResult<Message> {
    Message::find(conn, id)?.ok_or_else(|| AppError::not_found(format!("no message with id {id}")))
}

// --- GET /messages/new ---

pub async fn new_form(
    session: Session,
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let Some(current) = load_session_user(&mut conn, session)? else {
        return Ok(unauthorized_redirect(jar));
    };

    let ctx = base_context(Some(&current), None);
    Ok(render(&state, "messages/new.html", &ctx)?.into_response())
}

// --- POST /messages/new ---

pub async fn create(
    session: Session,
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<NewMessageForm>,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let Some(current) = load_session_user(&mut conn, session)? else {
        return Ok(unauthorized_redirect(jar));
    };

    if let Err(errors) = form.validate() {
        let mut ctx = base_context(Some(&current), None);
        ctx.insert("error", &errors.to_string());
        return Ok(render(&state, "messages/new.html", &ctx)?.into_response());
    }

    let message = Message::create(&mut conn, &form.text, current.id)?;
    tracing::debug!(message_id = message.id, user_id = current.id, "message created");

    Ok(found(&format!("/users/{}", current.id)))
}

// --- GET /messages/:id ---

pub async fn show(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let current = load_session_user(&mut conn, session)?;
    let message = find_message(&mut conn, id)?;
    let author = User::find(&mut conn, message.user_id)?
        .ok_or_else(|| AppError::not_found("message author no longer exists"))?;

    let liked = match &current {
        Some(user) => user.has_liked(&mut conn, &message)?,
        None => false,
    };

    let mut ctx = base_context(current.as_ref(), None);
    ctx.insert("message", &message);
    ctx.insert("author", &author);
    ctx.insert("liked", &liked);
    ctx.insert("like_count", &message.like_count(&mut conn)?);
    Ok(render(&state, "messages/show.html", &ctx)?.into_response())
}

// --- POST /messages/:id/delete ---

/// Only the owner may delete a message. A logged-in request against someone
/// else's message is a deliberate silent no-op: the route logs it and answers
/// the same redirect as a successful mutation, since the UI never offers the
/// action and this app never answers error pages from form posts.
pub async fn delete(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let Some(current) = load_session_user(&mut conn, session)? else {
        return Ok(unauthorized_redirect(jar));
    };
    let message = find_message(&mut conn, id)?;

    if message.user_id != current.id {
        tracing::warn!(
            message_id = message.id,
            owner_id = message.user_id,
            user_id = current.id,
            "refused to delete another user's message"
        );
        return Ok(found("/"));
    }

    message.delete(&mut conn)?;
    Ok(found(&format!("/users/{}", current.id)))
}

// --- POST /messages/:id/like ---

/// Toggle: first post adds the like, a second post removes it.
pub async fn toggle_like(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let Some(current) = load_session_user(&mut conn, session)? else {
        return Ok(unauthorized_redirect(jar));
    };
    let message = find_message(&mut conn, id)?;

    if current.has_liked(&mut conn, &message)? {
        current.unlike_message(&mut conn, &message)?;
    } else {
        current.like_message(&mut conn, &message)?;
    }

    Ok(found("/"))
}
