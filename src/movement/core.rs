//! Defines the core data model and database queries for movements.

use rusqlite::{Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    account::AccountId,
    category::CategoryId,
    database_id::DatabaseId,
    money::{get_decimal, to_sql_text},
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a movement.
pub type MovementId = DatabaseId;

/// A single dated, signed amount posted on one of the organisation's bank
/// accounts.
///
/// To create a new `Movement`, use [Movement::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// The ID of the movement.
    pub id: MovementId,
    /// The account the movement was posted on.
    pub account_id: AccountId,
    /// The date the movement posted.
    pub entry_date: Date,
    /// Positive amounts are credits, negative amounts are debits.
    pub amount: Decimal,
    /// The communication given by the bank, e.g. "Cotisation janvier".
    pub communication: String,
    /// Who paid or was paid.
    pub counter_party_name: Option<String>,
    /// The IBAN of the counter party.
    pub counter_party_iban: Option<String>,
    /// The category the movement belongs to, if it has been categorised.
    pub category_id: Option<CategoryId>,
}

impl Movement {
    /// Create a new movement.
    ///
    /// Shortcut for [MovementBuilder] for discoverability.
    pub fn build(
        account_id: AccountId,
        entry_date: Date,
        amount: Decimal,
        communication: &str,
    ) -> MovementBuilder {
        MovementBuilder {
            account_id,
            entry_date,
            amount,
            communication: communication.to_owned(),
            counter_party_name: None,
            counter_party_iban: None,
            category_id: None,
        }
    }

    /// Whether money came in with this movement.
    pub fn is_credit(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// A builder for creating [Movement] instances.
///
/// # Examples
///
/// ```ignore
/// use rust_decimal_macros::dec;
/// use time::macros::date;
///
/// use crate::movement::Movement;
///
/// let builder = Movement::build(1, date!(2025 - 01 - 15), dec!(-850), "Loyer janvier")
///     .counter_party("Immo SPRL", "BE71096123456769")
///     .category_id(Some(3));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct MovementBuilder {
    /// The account the movement is posted on.
    pub account_id: AccountId,
    /// The date the movement posted.
    pub entry_date: Date,
    /// The signed amount, positive for credits and negative for debits.
    pub amount: Decimal,
    /// The communication given by the bank.
    pub communication: String,
    /// Who paid or was paid.
    pub counter_party_name: Option<String>,
    /// The IBAN of the counter party.
    pub counter_party_iban: Option<String>,
    /// The category of the movement.
    pub category_id: Option<CategoryId>,
}

impl MovementBuilder {
    /// Set the counter party of the movement.
    pub fn counter_party(mut self, name: &str, iban: &str) -> Self {
        self.counter_party_name = Some(name.to_owned());
        self.counter_party_iban = Some(iban.to_owned());
        self
    }

    /// Set the category id for the movement.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_MOVEMENT: &str = "SELECT id, account_id, entry_date, amount, communication, \
    counter_party_name, counter_party_iban, category_id FROM movement";

/// Create a new movement in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAccount] if the account ID does not refer to a real account,
/// - or [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_movement(
    builder: MovementBuilder,
    connection: &Connection,
) -> Result<Movement, Error> {
    let movement = connection
        .prepare(
            "INSERT INTO movement (account_id, entry_date, amount, communication, \
                counter_party_name, counter_party_iban, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, account_id, entry_date, amount, communication, \
                counter_party_name, counter_party_iban, category_id",
        )?
        .query_row(
            (
                builder.account_id,
                builder.entry_date,
                to_sql_text(builder.amount),
                &builder.communication,
                &builder.counter_party_name,
                &builder.counter_party_iban,
                builder.category_id,
            ),
            map_movement_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => match account_exists(builder.account_id, connection) {
                Ok(true) => Error::InvalidCategory(builder.category_id),
                Ok(false) => Error::InvalidAccount(builder.account_id),
                Err(error) => error,
            },
            error => error.into(),
        })?;

    Ok(movement)
}

fn account_exists(account_id: AccountId, connection: &Connection) -> Result<bool, Error> {
    let found = connection
        .query_row("SELECT 1 FROM account WHERE id = ?1", [account_id], |_| {
            Ok(())
        })
        .optional()?;

    Ok(found.is_some())
}

/// Retrieve a movement from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid movement,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_movement(id: MovementId, connection: &Connection) -> Result<Movement, Error> {
    let movement = connection
        .prepare(&format!("{SELECT_MOVEMENT} WHERE id = :id"))?
        .query_one(&[(":id", &id)], map_movement_row)?;

    Ok(movement)
}

/// Retrieve all movements, newest first.
pub fn get_all_movements(connection: &Connection) -> Result<Vec<Movement>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_MOVEMENT} ORDER BY entry_date DESC, id DESC"
        ))?
        .query_map([], map_movement_row)?
        .map(|maybe_movement| maybe_movement.map_err(Error::from))
        .collect()
}

/// Retrieve the movements to or from the counter party with `iban`, newest first.
pub fn get_movements_by_counter_party(
    iban: &str,
    connection: &Connection,
) -> Result<Vec<Movement>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_MOVEMENT} WHERE counter_party_iban = ?1 ORDER BY entry_date DESC, id DESC"
        ))?
        .query_map([iban], map_movement_row)?
        .map(|maybe_movement| maybe_movement.map_err(Error::from))
        .collect()
}

/// Retrieve the movements in the category `category_id`, newest first.
pub fn get_movements_by_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Vec<Movement>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_MOVEMENT} WHERE category_id = ?1 ORDER BY entry_date DESC, id DESC"
        ))?
        .query_map([category_id], map_movement_row)?
        .map(|maybe_movement| maybe_movement.map_err(Error::from))
        .collect()
}

/// Assign the movement `id` to `category_id`, or clear its category with `None`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingMovement] if `id` does not refer to a valid movement,
/// - or [Error::InvalidCategory] if `category_id` does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn set_movement_category(
    id: MovementId,
    category_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE movement SET category_id = ?1 WHERE id = ?2",
            (category_id, id),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(category_id),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingMovement);
    }

    Ok(())
}

/// Create the movement table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_movement_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS movement (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL,
                entry_date TEXT NOT NULL,
                amount TEXT NOT NULL,
                communication TEXT NOT NULL,
                counter_party_name TEXT,
                counter_party_iban TEXT,
                category_id INTEGER,
                FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE RESTRICT,
                FOREIGN KEY(category_id) REFERENCES movement_category(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_movement_entry_date ON movement(entry_date, category_id);",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_movement_counter_party_iban ON movement(counter_party_iban);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Movement.
pub fn map_movement_row(row: &Row) -> Result<Movement, rusqlite::Error> {
    Ok(Movement {
        id: row.get(0)?,
        account_id: row.get(1)?,
        entry_date: row.get(2)?,
        amount: get_decimal(row, 3)?,
        communication: row.get(4)?,
        counter_party_name: row.get(5)?,
        counter_party_iban: row.get(6)?,
        category_id: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        account::create_account,
        category::{CategoryKind, CategoryName, create_category},
        db::initialize,
        movement::{
            Movement, create_movement, get_all_movements, get_movement,
            get_movements_by_category, get_movements_by_counter_party, set_movement_category,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        create_account(
            "Compte courant",
            "BE68539007547034",
            &conn,
        )
        .unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let movement = create_movement(
            Movement::build(1, date!(2025 - 10 - 05), dec!(12.30), "Cotisation")
                .counter_party("Jane Doe", "BE71096123456769"),
            &conn,
        )
        .expect("Could not create movement");

        assert!(movement.id > 0);
        assert_eq!(movement.amount, dec!(12.3));
        assert_eq!(movement.entry_date, date!(2025 - 10 - 05));
        assert_eq!(movement.counter_party_name.as_deref(), Some("Jane Doe"));
        assert_eq!(movement.category_id, None);
    }

    #[test]
    fn create_fails_on_invalid_category() {
        let conn = get_test_connection();

        let result = create_movement(
            Movement::build(1, date!(2025 - 10 - 05), dec!(12.30), "").category_id(Some(42)),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(Some(42))));
    }

    #[test]
    fn create_fails_on_invalid_account() {
        let conn = get_test_connection();

        let result = create_movement(
            Movement::build(99, date!(2025 - 10 - 05), dec!(12.30), ""),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidAccount(99)));
    }

    #[test]
    fn get_movement_round_trips() {
        let conn = get_test_connection();
        let inserted = create_movement(
            Movement::build(1, date!(2025 - 01 - 15), dec!(-850.00), "Loyer"),
            &conn,
        )
        .unwrap();

        assert_eq!(get_movement(inserted.id, &conn), Ok(inserted));
    }

    #[test]
    fn get_movement_with_invalid_id_returns_not_found() {
        let conn = get_test_connection();

        assert_eq!(get_movement(1337, &conn), Err(Error::NotFound));
    }

    #[test]
    fn get_all_movements_returns_newest_first() {
        let conn = get_test_connection();
        let oldest = create_movement(
            Movement::build(1, date!(2025 - 01 - 01), dec!(10), "a"),
            &conn,
        )
        .unwrap();
        let newest = create_movement(
            Movement::build(1, date!(2025 - 03 - 01), dec!(20), "b"),
            &conn,
        )
        .unwrap();
        let same_day_later_id = create_movement(
            Movement::build(1, date!(2025 - 03 - 01), dec!(30), "c"),
            &conn,
        )
        .unwrap();

        let ids: Vec<i64> = get_all_movements(&conn)
            .unwrap()
            .into_iter()
            .map(|movement| movement.id)
            .collect();

        assert_eq!(ids, [same_day_later_id.id, newest.id, oldest.id]);
    }

    #[test]
    fn get_movements_by_counter_party_filters_iban() {
        let conn = get_test_connection();
        let wanted = create_movement(
            Movement::build(1, date!(2025 - 01 - 01), dec!(10), "a")
                .counter_party("Jane", "BE71096123456769"),
            &conn,
        )
        .unwrap();
        create_movement(
            Movement::build(1, date!(2025 - 01 - 01), dec!(10), "b")
                .counter_party("John", "BE62510007547061"),
            &conn,
        )
        .unwrap();

        let got = get_movements_by_counter_party("BE71096123456769", &conn).unwrap();

        assert_eq!(got, vec![wanted]);
    }

    #[test]
    fn set_category_then_query_by_category() {
        let conn = get_test_connection();
        let category = create_category(
            CategoryName::new_unchecked("Cotisations"),
            CategoryKind::Credit,
            &conn,
        )
        .unwrap();
        let movement = create_movement(
            Movement::build(1, date!(2025 - 01 - 01), dec!(10), "a"),
            &conn,
        )
        .unwrap();

        set_movement_category(movement.id, Some(category.id), &conn).unwrap();

        let got = get_movements_by_category(category.id, &conn).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, movement.id);
        assert_eq!(got[0].category_id, Some(category.id));
    }

    #[test]
    fn set_category_can_clear_category() {
        let conn = get_test_connection();
        let category = create_category(
            CategoryName::new_unchecked("Cotisations"),
            CategoryKind::Credit,
            &conn,
        )
        .unwrap();
        let movement = create_movement(
            Movement::build(1, date!(2025 - 01 - 01), dec!(10), "a").category_id(Some(category.id)),
            &conn,
        )
        .unwrap();

        set_movement_category(movement.id, None, &conn).unwrap();

        assert_eq!(get_movement(movement.id, &conn).unwrap().category_id, None);
    }

    #[test]
    fn set_category_on_missing_movement_fails() {
        let conn = get_test_connection();

        assert_eq!(
            set_movement_category(404, None, &conn),
            Err(Error::UpdateMissingMovement)
        );
    }

    #[test]
    fn set_category_with_invalid_category_fails() {
        let conn = get_test_connection();
        let movement = create_movement(
            Movement::build(1, date!(2025 - 01 - 01), dec!(10), "a"),
            &conn,
        )
        .unwrap();

        assert_eq!(
            set_movement_category(movement.id, Some(7), &conn),
            Err(Error::InvalidCategory(Some(7)))
        );
    }
}
