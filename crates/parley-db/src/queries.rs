use parley_types::models::{Account, Message};
use rusqlite::{Connection, Params, Row};

use crate::{Database, DbError, Result, Store};

const ACCOUNT_COLUMNS: &str = "account_id, username, password";
const MESSAGE_COLUMNS: &str = "message_id, posted_by, message_text, time_posted_epoch";

impl Store for Database {
    // -- Accounts --

    fn list_accounts(&self) -> Result<Vec<Account>> {
        self.with_conn(|conn| {
            query_accounts(
                conn,
                &format!("SELECT {ACCOUNT_COLUMNS} FROM account ORDER BY account_id"),
                [],
            )
        })
    }

    fn find_account(&self, username: &str, password: &str) -> Result<Option<Account>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM account
                     WHERE username = ?1 AND password = ?2
                     ORDER BY account_id LIMIT 1"
                ),
                (username, password),
                account_from_row,
            )
            .optional()
        })
    }

    fn insert_account(&self, username: &str, password: &str) -> Result<Account> {
        self.with_conn(|conn| {
            let account = conn.query_row(
                &format!(
                    "INSERT INTO account (username, password) VALUES (?1, ?2)
                     RETURNING {ACCOUNT_COLUMNS}"
                ),
                (username, password),
                account_from_row,
            )?;
            Ok(account)
        })
    }

    // -- Messages --

    fn list_messages(&self) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                &format!("SELECT {MESSAGE_COLUMNS} FROM message ORDER BY message_id"),
                [],
            )
        })
    }

    fn find_message(&self, message_id: i32) -> Result<Option<Message>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM message WHERE message_id = ?1"),
                [message_id],
                message_from_row,
            )
            .optional()
        })
    }

    fn list_messages_by_account(&self, account_id: i32) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM message
                     WHERE posted_by = ?1 ORDER BY message_id"
                ),
                [account_id],
            )
        })
    }

    fn insert_message(
        &self,
        posted_by: i32,
        text: &str,
        time_posted_epoch: i64,
    ) -> Result<Message> {
        self.with_conn(|conn| {
            let message = conn.query_row(
                &format!(
                    "INSERT INTO message (posted_by, message_text, time_posted_epoch)
                     VALUES (?1, ?2, ?3)
                     RETURNING {MESSAGE_COLUMNS}"
                ),
                rusqlite::params![posted_by, text, time_posted_epoch],
                message_from_row,
            )?;
            Ok(message)
        })
    }

    fn delete_message(&self, message_id: i32) -> Result<Option<Message>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("DELETE FROM message WHERE message_id = ?1 RETURNING {MESSAGE_COLUMNS}"),
                [message_id],
                message_from_row,
            )
            .optional()
        })
    }

    fn update_message_text(&self, message_id: i32, text: &str) -> Result<Option<Message>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "UPDATE message SET message_text = ?1 WHERE message_id = ?2
                     RETURNING {MESSAGE_COLUMNS}"
                ),
                rusqlite::params![text, message_id],
                message_from_row,
            )
            .optional()
        })
    }
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        account_id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        message_id: row.get(0)?,
        posted_by: row.get(1)?,
        message_text: row.get(2)?,
        time_posted_epoch: row.get(3)?,
    })
}

fn query_accounts(conn: &Connection, sql: &str, params: impl Params) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, account_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_messages(conn: &Connection, sql: &str, params: impl Params) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::from(e)),
        }
    }
}
