use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;

use warbler_shared::errors::AppResult;

use crate::schema::{follows, likes, messages, users};
use crate::services::auth_service;

pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.jpg";

// --- User ---

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub image_url: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl User {
    /// Create a user with a hashed credential. A duplicate username or email
    /// surfaces as a database unique violation for the caller to translate.
    pub fn signup(
        conn: &mut SqliteConnection,
        username: &str,
        email: &str,
        password: &str,
        image_url: Option<&str>,
    ) -> AppResult<User> {
        let password_hash = auth_service::hash_password(password)?;

        let new_user = NewUser {
            username: username.to_owned(),
            email: email.to_owned(),
            password_hash,
            image_url: image_url
                .filter(|url| !url.is_empty())
                .unwrap_or(DEFAULT_IMAGE_URL)
                .to_owned(),
        };

        let user = diesel::insert_into(users::table)
            .values(&new_user)
            .get_result::<User>(conn)?;

        Ok(user)
    }

    /// Look up a user by username and check the candidate password against the
    /// stored hash. Wrong username and wrong password both yield `None`.
    pub fn authenticate(
        conn: &mut SqliteConnection,
        username: &str,
        password: &str,
    ) -> AppResult<Option<User>> {
        let user: Option<User> = users::table
            .filter(users::username.eq(username))
            .first(conn)
            .optional()?;

        match user {
            Some(user) if auth_service::verify_password(password, &user.password_hash)? => {
                Ok(Some(user))
            }
            _ => Ok(None),
        }
    }

    pub fn find(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<User>> {
        users::table.find(id).first(conn).optional()
    }

    pub fn all(conn: &mut SqliteConnection) -> QueryResult<Vec<User>> {
        users::table.order(users::id.asc()).load(conn)
    }

    pub fn search(conn: &mut SqliteConnection, term: &str) -> QueryResult<Vec<User>> {
        users::table
            .filter(users::username.like(format!("%{term}%")))
            .order(users::id.asc())
            .load(conn)
    }

    pub fn delete(&self, conn: &mut SqliteConnection) -> QueryResult<usize> {
        diesel::delete(users::table.find(self.id)).execute(conn)
    }

    pub fn messages(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<Message>> {
        messages::table
            .filter(messages::user_id.eq(self.id))
            .order(messages::timestamp.desc())
            .load(conn)
    }

    // --- Follows ---

    pub fn follow(&self, conn: &mut SqliteConnection, other: &User) -> QueryResult<usize> {
        diesel::insert_into(follows::table)
            .values(&NewFollow {
                follower_id: self.id,
                followed_id: other.id,
            })
            .on_conflict_do_nothing()
            .execute(conn)
    }

    pub fn unfollow(&self, conn: &mut SqliteConnection, other: &User) -> QueryResult<usize> {
        diesel::delete(
            follows::table
                .filter(follows::follower_id.eq(self.id))
                .filter(follows::followed_id.eq(other.id)),
        )
        .execute(conn)
    }

    pub fn is_following(&self, conn: &mut SqliteConnection, other: &User) -> QueryResult<bool> {
        follows::table
            .filter(follows::follower_id.eq(self.id))
            .filter(follows::followed_id.eq(other.id))
            .count()
            .get_result::<i64>(conn)
            .map(|count| count > 0)
    }

    pub fn is_followed_by(&self, conn: &mut SqliteConnection, other: &User) -> QueryResult<bool> {
        other.is_following(conn, self)
    }

    /// Users this user follows, most recently followed last.
    pub fn following(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<User>> {
        let followed_ids: Vec<i32> = follows::table
            .filter(follows::follower_id.eq(self.id))
            .select(follows::followed_id)
            .load(conn)?;

        users::table.filter(users::id.eq_any(followed_ids)).load(conn)
    }

    pub fn followers(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<User>> {
        let follower_ids: Vec<i32> = follows::table
            .filter(follows::followed_id.eq(self.id))
            .select(follows::follower_id)
            .load(conn)?;

        users::table.filter(users::id.eq_any(follower_ids)).load(conn)
    }

    // --- Likes ---

    pub fn like_message(&self, conn: &mut SqliteConnection, message: &Message) -> QueryResult<usize> {
        diesel::insert_into(likes::table)
            .values(&NewLike {
                user_id: self.id,
                message_id: message.id,
            })
            .on_conflict_do_nothing()
            .execute(conn)
    }

    pub fn unlike_message(
        &self,
        conn: &mut SqliteConnection,
        message: &Message,
    ) -> QueryResult<usize> {
        diesel::delete(
            likes::table
                .filter(likes::user_id.eq(self.id))
                .filter(likes::message_id.eq(message.id)),
        )
        .execute(conn)
    }

    pub fn has_liked(&self, conn: &mut SqliteConnection, message: &Message) -> QueryResult<bool> {
        likes::table
            .filter(likes::user_id.eq(self.id))
            .filter(likes::message_id.eq(message.id))
            .count()
            .get_result::<i64>(conn)
            .map(|count| count > 0)
    }

    /// Messages this user has liked.
    pub fn likes(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<Message>> {
        let message_ids: Vec<i32> = likes::table
            .filter(likes::user_id.eq(self.id))
            .select(likes::message_id)
            .load(conn)?;

        messages::table
            .filter(messages::id.eq_any(message_ids))
            .order(messages::timestamp.desc())
            .load(conn)
    }

    /// Home feed: this user's own messages plus those of everyone they follow,
    /// newest first, capped at 100.
    pub fn feed(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<MessageWithAuthor>> {
        let mut author_ids: Vec<i32> = follows::table
            .filter(follows::follower_id.eq(self.id))
            .select(follows::followed_id)
            .load(conn)?;
        author_ids.push(self.id);

        let rows: Vec<(Message, User)> = messages::table
            .inner_join(users::table)
            .filter(messages::user_id.eq_any(author_ids))
            .order(messages::timestamp.desc())
            .limit(100)
            .load(conn)?;

        Ok(rows.into_iter().map(MessageWithAuthor::from).collect())
    }
}

// --- Message ---

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: i32,
    pub text: String,
    pub timestamp: NaiveDateTime,
    pub user_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub text: String,
    pub timestamp: NaiveDateTime,
    pub user_id: i32,
}

impl Message {
    pub fn create(conn: &mut SqliteConnection, text: &str, user_id: i32) -> QueryResult<Message> {
        diesel::insert_into(messages::table)
            .values(&NewMessage {
                text: text.to_owned(),
                timestamp: chrono::Utc::now().naive_utc(),
                user_id,
            })
            .get_result(conn)
    }

    pub fn find(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Message>> {
        messages::table.find(id).first(conn).optional()
    }

    pub fn count(conn: &mut SqliteConnection) -> QueryResult<i64> {
        messages::table.count().get_result(conn)
    }

    pub fn delete(&self, conn: &mut SqliteConnection) -> QueryResult<usize> {
        diesel::delete(messages::table.find(self.id)).execute(conn)
    }

    pub fn like_count(&self, conn: &mut SqliteConnection) -> QueryResult<i64> {
        likes::table
            .filter(likes::message_id.eq(self.id))
            .count()
            .get_result(conn)
    }
}

// --- Follow / Like edges ---

#[derive(Debug, Insertable)]
#[diesel(table_name = follows)]
pub struct NewFollow {
    pub follower_id: i32,
    pub followed_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = likes)]
pub struct NewLike {
    pub user_id: i32,
    pub message_id: i32,
}

/// A message paired with its author, the shape the feed templates render.
#[derive(Debug, Serialize)]
pub struct MessageWithAuthor {
    pub message: Message,
    pub author: User,
}

impl From<(Message, User)> for MessageWithAuthor {
    fn from((message, author): (Message, User)) -> Self {
        Self { message, author }
    }
}
