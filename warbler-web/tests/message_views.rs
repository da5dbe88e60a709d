//! Message view tests: posting, deleting, liking, and the session gate.

mod common;

use axum::http::StatusCode;

use warbler_web::models::Message;

use common::{body_text, test_app};

#[tokio::test]
async fn logged_in_user_can_add_a_message() {
    let app = test_app();
    let user = app.seed_user("testuser", "test@test.com", "testuser");

    let cookie = app.login("testuser", "testuser").await;

    let response = app.post("/messages/new", "text=Hello", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let mut conn = app.conn();
    let messages = user.messages(&mut conn).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "Hello");
}

#[tokio::test]
async fn logged_out_user_cannot_add_a_message() {
    let app = test_app();
    app.seed_user("testuser", "test@test.com", "testuser");

    let response = app.post("/messages/new", "text=Hello", None).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let landed = app.follow_redirect(&response, None).await;
    assert_eq!(landed.status(), StatusCode::OK);
    assert!(body_text(landed).await.contains("Sign up"));

    let mut conn = app.conn();
    assert_eq!(Message::count(&mut conn).unwrap(), 0);
}

#[tokio::test]
async fn owner_can_delete_their_message() {
    let app = test_app();
    let user = app.seed_user("testuser", "test@test.com", "testuser");
    let message = {
        let mut conn = app.conn();
        Message::create(&mut conn, "test", user.id).unwrap()
    };

    let cookie = app.login("testuser", "testuser").await;

    let response = app
        .post(&format!("/messages/{}/delete", message.id), "", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let landed = app.follow_redirect(&response, Some(&cookie)).await;
    assert_eq!(landed.status(), StatusCode::OK);

    let mut conn = app.conn();
    assert_eq!(Message::count(&mut conn).unwrap(), 0);
    assert_eq!(user.messages(&mut conn).unwrap().len(), 0);
}

#[tokio::test]
async fn logged_out_user_cannot_delete_a_message() {
    let app = test_app();
    let user = app.seed_user("testuser", "test@test.com", "testuser");
    let message = {
        let mut conn = app.conn();
        Message::create(&mut conn, "test", user.id).unwrap()
    };

    let response = app
        .post(&format!("/messages/{}/delete", message.id), "", None)
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let landed = app.follow_redirect(&response, None).await;
    assert_eq!(landed.status(), StatusCode::OK);
    assert!(body_text(landed).await.contains("Sign up"));

    let mut conn = app.conn();
    assert_eq!(Message::count(&mut conn).unwrap(), 1);
}

#[tokio::test]
async fn forged_user_id_field_is_ignored_on_create() {
    let app = test_app();
    let user = app.seed_user("testuser", "test@test.com", "testuser");
    let other = app.seed_user("other_user", "other@other.com", "otherother");

    let cookie = app.login("testuser", "testuser").await;

    let response = app
        .post(
            "/messages/new",
            &format!("text=Hello&user_id={}", other.id),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let mut conn = app.conn();
    assert_eq!(user.messages(&mut conn).unwrap().len(), 1);
    assert_eq!(other.messages(&mut conn).unwrap().len(), 0);
}

#[tokio::test]
async fn deleting_another_users_message_is_a_no_op() {
    let app = test_app();
    app.seed_user("testuser", "test@test.com", "testuser");
    let other = app.seed_user("other_user", "other@other.com", "otherother");
    let message = {
        let mut conn = app.conn();
        Message::create(&mut conn, "other_user's warble", other.id).unwrap()
    };

    let cookie = app.login("testuser", "testuser").await;

    let response = app
        .post(&format!("/messages/{}/delete", message.id), "", Some(&cookie))
        .await;

    // Deliberate authorization decision: quietly refuse with the usual
    // redirect, leaving the message untouched.
    assert_eq!(response.status(), StatusCode::FOUND);

    let mut conn = app.conn();
    assert_eq!(other.messages(&mut conn).unwrap().len(), 1);
    assert!(Message::find(&mut conn, message.id).unwrap().is_some());
}

#[tokio::test]
async fn message_page_shows_text_author_and_like_count() {
    let app = test_app();
    let user = app.seed_user("testuser", "test@test.com", "testuser");
    let message = {
        let mut conn = app.conn();
        let message = Message::create(&mut conn, "a warble worth reading", user.id).unwrap();
        user.like_message(&mut conn, &message).unwrap();
        message
    };

    let response = app.get(&format!("/messages/{}", message.id), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("a warble worth reading"));
    assert!(body.contains("@testuser"));
    assert!(body.contains("1 likes"));
}

#[tokio::test]
async fn like_toggles_on_and_off() {
    let app = test_app();
    let user = app.seed_user("testuser", "test@test.com", "testuser");
    let message = {
        let mut conn = app.conn();
        Message::create(&mut conn, "test", user.id).unwrap()
    };

    let cookie = app.login("testuser", "testuser").await;

    let response = app
        .post(&format!("/messages/{}/like", message.id), "", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    {
        let mut conn = app.conn();
        assert_eq!(user.likes(&mut conn).unwrap().len(), 1);
    }

    let response = app
        .post(&format!("/messages/{}/like", message.id), "", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    {
        let mut conn = app.conn();
        assert_eq!(user.likes(&mut conn).unwrap().len(), 0);
    }
}

#[tokio::test]
async fn logged_out_user_cannot_like_a_message() {
    let app = test_app();
    let user = app.seed_user("testuser", "test@test.com", "testuser");
    let message = {
        let mut conn = app.conn();
        Message::create(&mut conn, "test", user.id).unwrap()
    };

    let response = app
        .post(&format!("/messages/{}/like", message.id), "", None)
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let landed = app.follow_redirect(&response, None).await;
    assert_eq!(landed.status(), StatusCode::OK);
    assert!(body_text(landed).await.contains("Sign up"));

    let mut conn = app.conn();
    assert_eq!(user.likes(&mut conn).unwrap().len(), 0);
}

#[tokio::test]
async fn message_over_140_characters_is_rejected() {
    let app = test_app();
    let user = app.seed_user("testuser", "test@test.com", "testuser");

    let cookie = app.login("testuser", "testuser").await;

    let long_text = "x".repeat(141);
    let response = app
        .post("/messages/new", &format!("text={long_text}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut conn = app.conn();
    assert_eq!(user.messages(&mut conn).unwrap().len(), 0);
}
