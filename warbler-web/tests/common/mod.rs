#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sqlite::SqliteConnection;
use http_body_util::BodyExt;
use tower::ServiceExt;

use warbler_shared::clients::db::{create_test_pool, DbPool};
use warbler_shared::session::CURR_USER_KEY;
use warbler_web::config::AppConfig;
use warbler_web::models::User;
use warbler_web::{build_router, run_migrations, AppState};

pub type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// A fresh app over its own in-memory database. The pool holds a single
/// connection, so state created through `conn()` is visible to request
/// handlers -- but the checkout must be dropped before driving the router, or
/// handlers will wait on the pool.
pub struct TestApp {
    pub router: Router,
    pub db: DbPool,
}

pub fn test_app() -> TestApp {
    let config = AppConfig {
        port: 0,
        database_url: ":memory:".into(),
        session_secret: "warbler-test-session-secret-0123456789-0123456789-0123456789abcd".into(),
    };

    let pool = create_test_pool(&config.database_url).expect("test pool");
    {
        let mut conn = pool.get().expect("test connection");
        run_migrations(&mut conn).expect("migrations");
    }

    let state = AppState::new(pool.clone(), &config).expect("app state");
    TestApp {
        router: build_router(state),
        db: pool,
    }
}

impl TestApp {
    pub fn conn(&self) -> Conn {
        self.db.get().expect("test connection")
    }

    /// Seed a user the way the view tests need one: a real signup with a
    /// known password.
    pub fn seed_user(&self, username: &str, email: &str, password: &str) -> User {
        let mut conn = self.conn();
        User::signup(&mut conn, username, email, password, None).expect("seed user")
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::empty()).expect("request");
        self.router.clone().oneshot(request).await.expect("response")
    }

    pub async fn post(&self, path: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::from(body.to_owned())).expect("request");
        self.router.clone().oneshot(request).await.expect("response")
    }

    /// Log in through the real login route and return the session cookie to
    /// attach to later requests.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post("/login", &format!("username={username}&password={password}"), None)
            .await;
        assert_eq!(response.status(), StatusCode::FOUND, "login should redirect");
        session_cookie(&response).expect("login should set the session cookie")
    }

    /// Re-issue the request the redirect points at, carrying the same cookie.
    pub async fn follow_redirect(
        &self,
        response: &Response<Body>,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .expect("redirect location")
            .to_owned();
        self.get(&location, cookie).await
    }
}

/// The `name=value` pair of the session cookie set by a response, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(CURR_USER_KEY))
        .and_then(|value| value.split(';').next())
        .map(str::to_owned)
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
