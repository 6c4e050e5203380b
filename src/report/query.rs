//! Loads the ledger snapshot the reports are computed from.

use rusqlite::{Connection, Row};

use crate::{Error, money::get_decimal, report::LedgerEntry};

/// Every movement as a [LedgerEntry], ordered by entry date, then ID.
pub fn get_ledger(connection: &Connection) -> Result<Vec<LedgerEntry>, Error> {
    connection
        .prepare("SELECT entry_date, amount, category_id FROM movement ORDER BY entry_date, id")?
        .query_map([], map_ledger_row)?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

fn map_ledger_row(row: &Row) -> Result<LedgerEntry, rusqlite::Error> {
    Ok(LedgerEntry {
        entry_date: row.get(0)?,
        amount: get_decimal(row, 1)?,
        category_id: row.get(2)?,
    })
}
