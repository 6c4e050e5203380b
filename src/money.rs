//! Conversion of exact decimal amounts to and from SQLite.
//!
//! Amounts are stored as TEXT so that they survive the round trip through
//! SQLite without the rounding that REAL columns would introduce.

use std::str::FromStr;

use rusqlite::{Row, types::Type};
use rust_decimal::Decimal;

/// Read the decimal stored as text in column `index` of `row`.
pub fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let raw: String = row.get(index)?;

    Decimal::from_str(&raw).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}

/// The text representation of `amount` used for storage.
pub fn to_sql_text(amount: Decimal) -> String {
    amount.normalize().to_string()
}
