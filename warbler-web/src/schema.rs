diesel::table! {
    users (id) {
        id -> Integer,
        username -> Text,
        email -> Text,
        password_hash -> Text,
        image_url -> Text,
        header_image_url -> Text,
        bio -> Nullable<Text>,
        location -> Nullable<Text>,
    }
}

diesel::table! {
    messages (id) {
        id -> Integer,
        #[max_length = 140]
        text -> Varchar,
        timestamp -> Timestamp,
        user_id -> Integer,
    }
}

diesel::table! {
    follows (follower_id, followed_id) {
        follower_id -> Integer,
        followed_id -> Integer,
    }
}

diesel::table! {
    likes (user_id, message_id) {
        user_id -> Integer,
        message_id -> Integer,
    }
}

diesel::joinable!(messages -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, messages, follows, likes);
