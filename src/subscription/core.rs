//! The subscription model, month arithmetic and database queries.

use std::fmt::Display;

use rusqlite::{
    Connection, OptionalExtension, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{
    Error,
    database_id::DatabaseId,
    month::{first_of_month, shift_month},
    movement::{MovementId, get_movement},
};

/// Database identifier for a subscription.
pub type SubscriptionId = DatabaseId;

/// How often a member pays their subscription.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionKind {
    /// One payment covers a single month.
    #[default]
    Monthly,
    /// One payment covers twelve months.
    Yearly,
}

impl SubscriptionKind {
    fn as_str(self) -> &'static str {
        match self {
            SubscriptionKind::Monthly => "monthly",
            SubscriptionKind::Yearly => "yearly",
        }
    }

    /// The last month covered by a payment of this kind starting in `start_month`.
    pub fn end_month(self, start_month: Date) -> Result<Date, Error> {
        match self {
            SubscriptionKind::Monthly => Ok(start_month),
            SubscriptionKind::Yearly => shift_month(start_month, 11).ok_or_else(|| {
                Error::InvalidArgument(format!("a year from {start_month} is out of range"))
            }),
        }
    }
}

impl Display for SubscriptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for SubscriptionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SubscriptionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "monthly" => Ok(SubscriptionKind::Monthly),
            "yearly" => Ok(SubscriptionKind::Yearly),
            other => Err(FromSqlError::Other(
                format!("unknown subscription kind {other:?}").into(),
            )),
        }
    }
}

/// The membership period paid by a movement.
///
/// Months are stored as the first day of the month.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    /// `None` until the subscription has been saved.
    pub id: Option<SubscriptionId>,
    /// The movement that paid for the subscription.
    pub movement_id: MovementId,
    /// Who the subscription is for.
    pub member_name: String,
    /// Whether one payment covers a month or a year.
    pub kind: SubscriptionKind,
    /// The first month covered, inclusive.
    pub start_month: Date,
    /// The last month covered, inclusive.
    pub end_month: Date,
    /// A free text note, may be empty.
    pub comment: String,
}

/// Parse a month written as `YYYY-MM` into the first day of that month.
pub fn parse_month(text: &str) -> Result<Date, Error> {
    let invalid = || Error::InvalidSubscription(format!("{text:?} is not a month (YYYY-MM)"));

    let (year, month) = text.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u8 = month.parse().map_err(|_| invalid())?;
    let month = Month::try_from(month).map_err(|_| invalid())?;

    Date::from_calendar_date(year, month, 1).map_err(|_| invalid())
}

/// Format a month as `YYYY-MM`, the value format of `<input type="month">`.
pub fn format_month(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), date.month() as u8)
}

/// Get the subscription paid by the movement `movement_id`.
///
/// If none has been saved yet, a draft of kind `draft_kind` is returned that
/// starts in the month of the movement.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `movement_id` does not refer to a valid movement,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_subscription_for_movement(
    movement_id: MovementId,
    draft_kind: SubscriptionKind,
    connection: &Connection,
) -> Result<Subscription, Error> {
    let stored = connection
        .prepare(
            "SELECT id, movement_id, member_name, kind, start_month, end_month, comment
             FROM subscription WHERE movement_id = :movement_id",
        )?
        .query_row(&[(":movement_id", &movement_id)], map_subscription_row)
        .optional()?;

    if let Some(subscription) = stored {
        return Ok(subscription);
    }

    let movement = get_movement(movement_id, connection)?;
    let start_month = first_of_month(movement.entry_date);

    Ok(Subscription {
        id: None,
        movement_id,
        member_name: movement.counter_party_name.unwrap_or_default(),
        kind: draft_kind,
        start_month,
        end_month: draft_kind.end_month(start_month)?,
        comment: String::new(),
    })
}

/// Insert `subscription`, or update the one already attached to its movement.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidSubscription] if the member name is empty or the end month
///   precedes the start month,
/// - [Error::NotFound] if the movement does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn save_subscription(
    subscription: &Subscription,
    connection: &Connection,
) -> Result<Subscription, Error> {
    if subscription.member_name.trim().is_empty() {
        return Err(Error::InvalidSubscription(
            "the member name cannot be empty".to_owned(),
        ));
    }

    let start_month = first_of_month(subscription.start_month);
    let end_month = first_of_month(subscription.end_month);

    if end_month < start_month {
        return Err(Error::InvalidSubscription(format!(
            "the subscription ends ({}) before it starts ({})",
            format_month(end_month),
            format_month(start_month)
        )));
    }

    connection
        .prepare(
            "INSERT INTO subscription (movement_id, member_name, kind, start_month, end_month, comment)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(movement_id) DO UPDATE SET
                member_name = excluded.member_name,
                kind = excluded.kind,
                start_month = excluded.start_month,
                end_month = excluded.end_month,
                comment = excluded.comment
             RETURNING id, movement_id, member_name, kind, start_month, end_month, comment",
        )?
        .query_row(
            (
                subscription.movement_id,
                subscription.member_name.trim(),
                subscription.kind,
                start_month,
                end_month,
                &subscription.comment,
            ),
            map_subscription_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })
}

/// Create the subscription table in the database.
pub fn create_subscription_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS subscription (
                id INTEGER PRIMARY KEY,
                movement_id INTEGER NOT NULL UNIQUE,
                member_name TEXT NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('monthly', 'yearly')),
                start_month TEXT NOT NULL,
                end_month TEXT NOT NULL,
                comment TEXT NOT NULL DEFAULT '',
                FOREIGN KEY(movement_id) REFERENCES movement(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn map_subscription_row(row: &Row) -> Result<Subscription, rusqlite::Error> {
    Ok(Subscription {
        id: row.get(0)?,
        movement_id: row.get(1)?,
        member_name: row.get(2)?,
        kind: row.get(3)?,
        start_month: row.get(4)?,
        end_month: row.get(5)?,
        comment: row.get(6)?,
    })
}
