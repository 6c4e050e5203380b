use rusqlite::{Connection, Row, params};

use crate::Error;

/// Database identifier for an account.
pub type AccountId = i64;

/// A bank account held by the organisation.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// A human readable name, e.g. "Current account".
    pub name: String,
    /// The IBAN of the account.
    pub iban: String,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            iban TEXT NOT NULL UNIQUE
        )",
        (),
    )?;

    Ok(())
}

/// Create an account and return it with its generated ID.
///
/// # Errors
/// Returns an [Error::SqlError] if the name or IBAN is already taken, or if
/// there is some other SQL error.
pub fn create_account(name: &str, iban: &str, connection: &Connection) -> Result<Account, Error> {
    connection.execute(
        "INSERT INTO account (name, iban) VALUES (?1, ?2)",
        params![name, iban],
    )?;

    Ok(Account {
        id: connection.last_insert_rowid(),
        name: name.to_owned(),
        iban: iban.to_owned(),
    })
}

/// Retrieve the account with `id`.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to an account.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare("SELECT id, name, iban FROM account WHERE id = :id")?
        .query_row(&[(":id", &id)], map_row_to_account)
        .map_err(Error::from)
}

/// Retrieve all accounts ordered by name.
pub fn get_all_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare("SELECT id, name, iban FROM account ORDER BY name ASC")?
        .query_map([], map_row_to_account)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        iban: row.get(2)?,
    })
}
