use serde::Deserialize;

// Request bodies tolerate unknown fields: clients commonly post a whole
// entity (including its id) where only a few fields are read.

// -- Accounts --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub posted_by: i32,
    pub message_text: String,
    pub time_posted_epoch: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessageRequest {
    pub message_text: String,
}
