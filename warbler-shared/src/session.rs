use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, Key, SignedCookieJar};

/// Cookie holding the id of the logged-in user. Absent when logged out.
pub const CURR_USER_KEY: &str = "curr_user";

/// Cookie carrying a one-shot flash message, consumed on the next rendered page.
pub const FLASH_KEY: &str = "flash";

/// The request session: the identity marker read from the signed cookie jar.
///
/// Extraction never fails; handlers decide what a missing identity means.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub user_id: Option<i32>,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar: SignedCookieJar = SignedCookieJar::from_request_parts(parts, state).await?;
        let user_id = jar
            .get(CURR_USER_KEY)
            .and_then(|cookie| cookie.value().parse().ok());
        Ok(Session { user_id })
    }
}

pub fn session_cookie(user_id: i32) -> Cookie<'static> {
    Cookie::build((CURR_USER_KEY, user_id.to_string()))
        .path("/")
        .http_only(true)
        .build()
}

pub fn clear_session(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(CURR_USER_KEY).path("/").build())
}

pub fn flash(jar: SignedCookieJar, message: impl Into<String>) -> SignedCookieJar {
    jar.add(Cookie::build((FLASH_KEY, message.into())).path("/").build())
}

/// Read and consume the flash message, if any.
pub fn take_flash(jar: SignedCookieJar) -> (SignedCookieJar, Option<String>) {
    match jar.get(FLASH_KEY) {
        Some(cookie) => {
            let message = cookie.value().to_owned();
            let jar = jar.remove(Cookie::build(FLASH_KEY).path("/").build());
            (jar, Some(message))
        }
        None => (jar, None),
    }
}

/// 302 Found redirect. `axum::response::Redirect` answers 303 for `to`, which is
/// not what a classic form-post app sends; mutating routes here answer 302.
pub fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_owned())],
    )
        .into_response()
}

/// The response for an unauthenticated request to a mutating route: flash a
/// notice and bounce to the public home page, which carries the sign-up prompt.
pub fn unauthorized_redirect(jar: SignedCookieJar) -> Response {
    (flash(jar, "Access unauthorized."), found("/")).into_response()
}
