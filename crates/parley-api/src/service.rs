//! Business rules for accounts and messages.
//!
//! Every check here is a separate round trip from the write that follows it.
//! The store's UNIQUE and FOREIGN KEY constraints back the scan-based checks,
//! so a write that loses a race is still reported as a rejection.

use std::sync::Arc;

use parley_db::{DbError, Store};
use parley_types::models::{Account, Message};
use thiserror::Error;
use tracing::{debug, warn};

pub const MIN_PASSWORD_LEN: usize = 4;
pub const MAX_MESSAGE_LEN: usize = 255;

/// A business rule the input failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("username must not be blank")]
    BlankUsername,
    #[error("password must be at least 4 characters")]
    PasswordTooShort,
    #[error("username is already taken")]
    UsernameTaken,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("message text must not be blank")]
    BlankMessage,
    #[error("message text must be at most 255 characters")]
    MessageTooLong,
    #[error("posted_by does not match any account")]
    UnknownAuthor,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("message not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] DbError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Clone)]
pub struct SocialService {
    store: Arc<dyn Store>,
}

impl SocialService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    // -- Accounts --

    pub fn all_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.store.list_accounts()?)
    }

    pub fn register_account(&self, username: &str, password: &str) -> Result<Account> {
        if is_blank(username) {
            return reject(Rejection::BlankUsername);
        }
        if text_len(password) < MIN_PASSWORD_LEN {
            return reject(Rejection::PasswordTooShort);
        }
        if self
            .store
            .list_accounts()?
            .iter()
            .any(|a| a.username == username)
        {
            return reject(Rejection::UsernameTaken);
        }

        let account = self
            .store
            .insert_account(username, password)
            .map_err(|e| on_constraint(e, Rejection::UsernameTaken))?;

        debug!("Registered account {} ({})", account.account_id, account.username);
        Ok(account)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Account> {
        match self.store.find_account(username, password)? {
            Some(account) => Ok(account),
            None => reject(Rejection::InvalidCredentials),
        }
    }

    // -- Messages --

    pub fn post_message(
        &self,
        posted_by: i32,
        text: &str,
        time_posted_epoch: i64,
    ) -> Result<Message> {
        check_message_text(text)?;

        if !self
            .store
            .list_accounts()?
            .iter()
            .any(|a| a.account_id == posted_by)
        {
            return reject(Rejection::UnknownAuthor);
        }

        let message = self
            .store
            .insert_message(posted_by, text, time_posted_epoch)
            .map_err(|e| on_constraint(e, Rejection::UnknownAuthor))?;

        debug!("Account {} posted message {}", posted_by, message.message_id);
        Ok(message)
    }

    pub fn get_message(&self, message_id: i32) -> Result<Option<Message>> {
        Ok(self.store.find_message(message_id)?)
    }

    pub fn all_messages(&self) -> Result<Vec<Message>> {
        Ok(self.store.list_messages()?)
    }

    pub fn account_messages(&self, account_id: i32) -> Result<Vec<Message>> {
        Ok(self.store.list_messages_by_account(account_id)?)
    }

    /// Deleting an id that is not stored is a no-op, not an error.
    pub fn delete_message(&self, message_id: i32) -> Result<Option<Message>> {
        let deleted = self.store.delete_message(message_id)?;
        if deleted.is_some() {
            debug!("Deleted message {}", message_id);
        }
        Ok(deleted)
    }

    pub fn update_message(&self, message_id: i32, text: &str) -> Result<Message> {
        check_message_text(text)?;

        let updated = self
            .store
            .update_message_text(message_id, text)?
            .ok_or(ServiceError::NotFound)?;

        debug!("Updated message {}", message_id);
        Ok(updated)
    }
}

/// Lengths are counted in UTF-16 code units, as clients of the original API expect.
fn text_len(s: &str) -> usize {
    s.encode_utf16().count()
}

fn is_blank(s: &str) -> bool {
    s.chars().all(is_blank_char)
}

/// Whitespace that counts towards a blank value. Non-breaking spaces
/// (U+00A0, U+2007, U+202F) and NEL are content; the C0 separators are not.
fn is_blank_char(c: char) -> bool {
    match c {
        '\u{0085}' | '\u{00A0}' | '\u{2007}' | '\u{202F}' => false,
        '\u{001C}'..='\u{001F}' => true,
        c => c.is_whitespace(),
    }
}

fn check_message_text(text: &str) -> Result<()> {
    if is_blank(text) {
        return reject(Rejection::BlankMessage);
    }
    if text_len(text) > MAX_MESSAGE_LEN {
        return reject(Rejection::MessageTooLong);
    }
    Ok(())
}

fn reject<T>(rejection: Rejection) -> Result<T> {
    warn!("Rejected: {}", rejection);
    Err(rejection.into())
}

/// A constraint failure on insert means a concurrent writer beat the check.
fn on_constraint(err: DbError, rejection: Rejection) -> ServiceError {
    if err.is_constraint_violation() {
        warn!("Rejected by store constraint: {}", rejection);
        rejection.into()
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_db::Database;

    fn service() -> SocialService {
        SocialService::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    fn rejection(err: ServiceError) -> Rejection {
        match err {
            ServiceError::Rejected(r) => r,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn register_rejects_bad_input() {
        let svc = service();

        let err = svc.register_account("   ", "pw1234").unwrap_err();
        assert_eq!(rejection(err), Rejection::BlankUsername);

        let err = svc.register_account("alice", "abc").unwrap_err();
        assert_eq!(rejection(err), Rejection::PasswordTooShort);

        svc.register_account("alice", "pw1234").unwrap();
        let err = svc.register_account("alice", "another").unwrap_err();
        assert_eq!(rejection(err), Rejection::UsernameTaken);

        assert_eq!(svc.all_accounts().unwrap().len(), 1);
    }

    #[test]
    fn password_of_exactly_four_is_accepted() {
        let svc = service();
        let account = svc.register_account("bob", "abcd").unwrap();
        assert!(account.account_id >= 1);
    }

    #[test]
    fn login_matches_exact_credentials() {
        let svc = service();
        let alice = svc.register_account("alice", "pw1234").unwrap();

        assert_eq!(svc.login("alice", "pw1234").unwrap(), alice);
        let err = svc.login("alice", "PW1234").unwrap_err();
        assert_eq!(rejection(err), Rejection::InvalidCredentials);
    }

    #[test]
    fn post_rejects_bad_text_and_unknown_author() {
        let svc = service();
        let alice = svc.register_account("alice", "pw1234").unwrap();

        let err = svc.post_message(alice.account_id, "", 1).unwrap_err();
        assert_eq!(rejection(err), Rejection::BlankMessage);

        let long = "x".repeat(MAX_MESSAGE_LEN + 1);
        let err = svc.post_message(alice.account_id, &long, 1).unwrap_err();
        assert_eq!(rejection(err), Rejection::MessageTooLong);

        let err = svc.post_message(alice.account_id + 1, "hi", 1).unwrap_err();
        assert_eq!(rejection(err), Rejection::UnknownAuthor);

        assert!(svc.all_messages().unwrap().is_empty());
    }

    #[test]
    fn max_length_counts_utf16_units() {
        let svc = service();
        let alice = svc.register_account("alice", "pw1234").unwrap();

        let text = "é".repeat(MAX_MESSAGE_LEN);
        let msg = svc.post_message(alice.account_id, &text, 1).unwrap();
        assert_eq!(msg.message_text, text);

        // Each emoji is a surrogate pair: 128 of them is 256 units.
        let err = svc
            .post_message(alice.account_id, &"😀".repeat(128), 1)
            .unwrap_err();
        assert_eq!(rejection(err), Rejection::MessageTooLong);
        svc.post_message(alice.account_id, &"😀".repeat(127), 1).unwrap();
    }

    #[test]
    fn non_breaking_space_is_not_blank() {
        let svc = service();
        let alice = svc.register_account("alice", "pw1234").unwrap();

        svc.post_message(alice.account_id, "\u{00A0}", 1).unwrap();
        svc.register_account("\u{202F}", "pw1234").unwrap();

        let err = svc.post_message(alice.account_id, "\t\n \u{3000}\u{001F}", 1).unwrap_err();
        assert_eq!(rejection(err), Rejection::BlankMessage);
    }

    /// Serves an empty account list so every check passes and the
    /// store's own constraints decide.
    struct StaleScan(Database);

    impl Store for StaleScan {
        fn list_accounts(&self) -> parley_db::Result<Vec<Account>> {
            Ok(Vec::new())
        }
        fn find_account(&self, u: &str, p: &str) -> parley_db::Result<Option<Account>> {
            self.0.find_account(u, p)
        }
        fn insert_account(&self, u: &str, p: &str) -> parley_db::Result<Account> {
            self.0.insert_account(u, p)
        }
        fn list_messages(&self) -> parley_db::Result<Vec<Message>> {
            self.0.list_messages()
        }
        fn find_message(&self, id: i32) -> parley_db::Result<Option<Message>> {
            self.0.find_message(id)
        }
        fn list_messages_by_account(&self, id: i32) -> parley_db::Result<Vec<Message>> {
            self.0.list_messages_by_account(id)
        }
        fn insert_message(&self, by: i32, text: &str, at: i64) -> parley_db::Result<Message> {
            self.0.insert_message(by, text, at)
        }
        fn delete_message(&self, id: i32) -> parley_db::Result<Option<Message>> {
            self.0.delete_message(id)
        }
        fn update_message_text(&self, id: i32, text: &str) -> parley_db::Result<Option<Message>> {
            self.0.update_message_text(id, text)
        }
    }

    #[test]
    fn constraint_failure_after_stale_check_is_a_rejection() {
        let db = Database::open_in_memory().unwrap();
        db.insert_account("alice", "pw1234").unwrap();
        let svc = SocialService::new(Arc::new(StaleScan(db)));

        let err = svc.register_account("alice", "other").unwrap_err();
        assert_eq!(rejection(err), Rejection::UsernameTaken);

        let err = svc.post_message(5, "hi", 1000).unwrap_err();
        assert_eq!(rejection(err), Rejection::UnknownAuthor);
    }

    #[test]
    fn update_rejects_without_mutating() {
        let svc = service();
        let alice = svc.register_account("alice", "pw1234").unwrap();
        let msg = svc.post_message(alice.account_id, "hi", 1000).unwrap();

        let long = "x".repeat(MAX_MESSAGE_LEN + 1);
        let err = svc.update_message(msg.message_id, &long).unwrap_err();
        assert_eq!(rejection(err), Rejection::MessageTooLong);

        let err = svc.update_message(msg.message_id, " ").unwrap_err();
        assert_eq!(rejection(err), Rejection::BlankMessage);

        assert!(matches!(
            svc.update_message(msg.message_id + 1, "bye"),
            Err(ServiceError::NotFound)
        ));

        assert_eq!(svc.get_message(msg.message_id).unwrap(), Some(msg));
    }

    #[test]
    fn update_changes_only_text() {
        let svc = service();
        let alice = svc.register_account("alice", "pw1234").unwrap();
        let msg = svc.post_message(alice.account_id, "hi", 1000).unwrap();

        let updated = svc.update_message(msg.message_id, "bye").unwrap();
        assert_eq!(updated.message_id, msg.message_id);
        assert_eq!(updated.posted_by, msg.posted_by);
        assert_eq!(updated.time_posted_epoch, msg.time_posted_epoch);
        assert_eq!(updated.message_text, "bye");
    }

    #[test]
    fn delete_missing_is_a_no_op() {
        let svc = service();
        let alice = svc.register_account("alice", "pw1234").unwrap();
        let keep = svc.post_message(alice.account_id, "keep", 1).unwrap();

        assert_eq!(svc.delete_message(keep.message_id + 1).unwrap(), None);
        assert_eq!(svc.all_messages().unwrap(), vec![keep.clone()]);

        assert_eq!(svc.delete_message(keep.message_id).unwrap(), Some(keep.clone()));
        assert_eq!(svc.get_message(keep.message_id).unwrap(), None);
    }

    #[test]
    fn account_messages_only_returns_that_author() {
        let svc = service();
        let alice = svc.register_account("alice", "pw1234").unwrap();
        let bob = svc.register_account("bob", "pw1234").unwrap();
        let a = svc.post_message(alice.account_id, "from alice", 1).unwrap();
        svc.post_message(bob.account_id, "from bob", 2).unwrap();

        assert_eq!(svc.account_messages(alice.account_id).unwrap(), vec![a]);
        assert!(svc.account_messages(99).unwrap().is_empty());
    }
}
