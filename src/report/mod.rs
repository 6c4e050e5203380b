//! Reports over the ledger: the rolling balance and the daily credits and debits.

mod aggregation;
mod charts;
mod graphs_page;
mod query;

pub use aggregation::{
    BalancePoint, DailyCreditDebit, LedgerEntry, daily_credit_debit, daily_credit_debit_start,
    rolling_balance, rolling_balance_start,
};
pub use graphs_page::{get_credits_per_day, get_graphs_page, get_rolling_sum};
pub use query::get_ledger;
