use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;

use warbler_shared::errors::{is_unique_violation, AppError, AppResult};
use warbler_shared::session::{clear_session, found, take_flash, unauthorized_redirect, Session};

use crate::models::{UpdateUser, User, DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};
use crate::routes::{base_context, load_session_user, render};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditProfileForm {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub password: String,
}

fn find_user(conn: &mut diesel::SqliteConnection, id: i32) -> AppResult<User> {
    User::find(conn, id)?.ok_or_else(|| AppError::not_found(format!("no user with id {id}")))
}

// --- GET /users ---

pub async fn index(
    session: Session,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let current = load_session_user(&mut conn, session)?;

    let users = match query.q.as_deref().filter(|q| !q.is_empty()) {
        Some(term) => User::search(&mut conn, term)?,
        None => User::all(&mut conn)?,
    };

    let mut ctx = base_context(current.as_ref(), None);
    ctx.insert("users", &users);
    ctx.insert("query", &query.q);
    Ok(render(&state, "users/index.html", &ctx)?.into_response())
}

// --- GET /users/:id ---

pub async fn show(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let current = load_session_user(&mut conn, session)?;
    let profile = find_user(&mut conn, id)?;

    let messages = profile.messages(&mut conn)?;
    let is_following = match &current {
        Some(user) => user.is_following(&mut conn, &profile)?,
        None => false,
    };

    let mut ctx = base_context(current.as_ref(), None);
    ctx.insert("profile", &profile);
    ctx.insert("messages", &messages);
    ctx.insert("is_following", &is_following);
    ctx.insert("following_count", &profile.following(&mut conn)?.len());
    ctx.insert("followers_count", &profile.followers(&mut conn)?.len());
    Ok(render(&state, "users/show.html", &ctx)?.into_response())
}

// --- GET /users/:id/following ---

pub async fn following(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let Some(current) = load_session_user(&mut conn, session)? else {
        return Ok(unauthorized_redirect(jar));
    };
    let profile = find_user(&mut conn, id)?;
    let following = profile.following(&mut conn)?;

    let mut ctx = base_context(Some(&current), None);
    ctx.insert("profile", &profile);
    ctx.insert("following", &following);
    Ok(render(&state, "users/following.html", &ctx)?.into_response())
}

// --- GET /users/:id/followers ---

pub async fn followers(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let Some(current) = load_session_user(&mut conn, session)? else {
        return Ok(unauthorized_redirect(jar));
    };
    let profile = find_user(&mut conn, id)?;
    let followers = profile.followers(&mut conn)?;

    let mut ctx = base_context(Some(&current), None);
    ctx.insert("profile", &profile);
    ctx.insert("followers", &followers);
    Ok(render(&state, "users/followers.html", &ctx)?.into_response())
}

// --- GET /users/:id/likes ---

pub async fn likes(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let Some(current) = load_session_user(&mut conn, session)? else {
        return Ok(unauthorized_redirect(jar));
    };
    let profile = find_user(&mut conn, id)?;
    let liked = profile.likes(&mut conn)?;

    let mut ctx = base_context(Some(&current), None);
    ctx.insert("profile", &profile);
    ctx.insert("messages", &liked);
    Ok(render(&state, "users/likes.html", &ctx)?.into_response())
}

// --- POST /users/follow/:id ---

pub async fn follow(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let Some(current) = load_session_user(&mut conn, session)? else {
        return Ok(unauthorized_redirect(jar));
    };
    let target = find_user(&mut conn, id)?;

    current.follow(&mut conn, &target)?;
    tracing::debug!(follower = current.id, followed = target.id, "follow added");

    Ok(found(&format!("/users/{}/following", current.id)))
}

// --- POST /users/stop-following/:id ---

pub async fn stop_following(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let Some(current) = load_session_user(&mut conn, session)? else {
        return Ok(unauthorized_redirect(jar));
    };
    let target = find_user(&mut conn, id)?;

    current.unfollow(&mut conn, &target)?;
    tracing::debug!(follower = current.id, followed = target.id, "follow removed");

    Ok(found(&format!("/users/{}/following", current.id)))
}

// --- GET /users/profile ---

pub async fn edit_form(
    session: Session,
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let Some(current) = load_session_user(&mut conn, session)? else {
        return Ok(unauthorized_redirect(jar));
    };

    let ctx = base_context(Some(&current), None);
    Ok(render(&state, "users/edit.html", &ctx)?.into_response())
}

// --- POST /users/profile ---

/// Profile edits are confirmed with the current password; a wrong password
/// re-renders the form without touching the row.
pub async fn update_profile(
    session: Session,
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<EditProfileForm>,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let Some(current) = load_session_user(&mut conn, session)? else {
        return Ok(unauthorized_redirect(jar));
    };

    if User::authenticate(&mut conn, &current.username, &form.password)?.is_none() {
        let mut ctx = base_context(Some(&current), None);
        ctx.insert("error", "Wrong password, please try again.");
        return Ok(render(&state, "users/edit.html", &ctx)?.into_response());
    }

    let changes = UpdateUser {
        username: Some(form.username),
        email: Some(form.email),
        image_url: Some(
            form.image_url
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_owned()),
        ),
        header_image_url: Some(
            form.header_image_url
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_HEADER_IMAGE_URL.to_owned()),
        ),
        bio: form.bio,
        location: form.location,
    };

    use crate::schema::users;
    use diesel::prelude::*;

    match diesel::update(users::table.find(current.id))
        .set(&changes)
        .execute(&mut conn)
    {
        Ok(_) => Ok(found(&format!("/users/{}", current.id))),
        Err(err) if is_unique_violation(&err) => {
            let mut ctx = base_context(Some(&current), None);
            ctx.insert("error", "Username already taken");
            Ok(render(&state, "users/edit.html", &ctx)?.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

// --- POST /users/delete ---

/// Deletes the account and everything hanging off it (messages via FK cascade),
/// then sends the visitor back to the signup page.
pub async fn delete_account(
    session: Session,
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let Some(current) = load_session_user(&mut conn, session)? else {
        return Ok(unauthorized_redirect(jar));
    };

    current.delete(&mut conn)?;
    tracing::info!(user_id = current.id, "account deleted");

    let (jar, _) = take_flash(jar);
    let jar = clear_session(jar);
    Ok((jar, found("/signup")).into_response())
}
