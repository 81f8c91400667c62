use parley_types::models::{Account, Message};

use crate::Result;

/// Persistence operations over the `account` and `message` tables.
///
/// Implementations map rows to entities and nothing more: business rules
/// live in the caller. Each call is atomic on its own; no call spans another.
pub trait Store: Send + Sync {
    // -- Accounts --

    /// Every stored account, ordered by id.
    fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Exact match on both username and password.
    fn find_account(&self, username: &str, password: &str) -> Result<Option<Account>>;

    /// Insert without re-checking constraints; returns the row with its generated id.
    fn insert_account(&self, username: &str, password: &str) -> Result<Account>;

    // -- Messages --

    fn list_messages(&self) -> Result<Vec<Message>>;

    fn find_message(&self, message_id: i32) -> Result<Option<Message>>;

    fn list_messages_by_account(&self, account_id: i32) -> Result<Vec<Message>>;

    fn insert_message(&self, posted_by: i32, text: &str, time_posted_epoch: i64)
    -> Result<Message>;

    /// Returns the pre-deletion snapshot, or `None` if the id was not stored.
    fn delete_message(&self, message_id: i32) -> Result<Option<Message>>;

    /// Returns the post-update snapshot, or `None` if the id was not stored.
    fn update_message_text(&self, message_id: i32, text: &str) -> Result<Option<Message>>;
}
