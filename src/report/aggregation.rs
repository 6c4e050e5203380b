//! Balance and cash-flow aggregation over the ledger.
//!
//! These functions are pure: they take a snapshot of the ledger and the
//! reference date `as_of`, and never read the clock or the database.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    category::{CategoryId, is_internal_transfer},
    month::shift_month,
};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// The part of a movement the reports need.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// The date the movement posted.
    pub entry_date: Date,
    /// Positive for credits, negative for debits.
    pub amount: Decimal,
    /// `None` for uncategorised movements.
    pub category_id: Option<CategoryId>,
}

/// The balance of all accounts at the end of a day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalancePoint {
    /// Serialized as `YYYY-MM-DD`.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// The running total over the full history up to and including `date`.
    pub balance: Decimal,
}

/// The money that came in and went out on a day.
///
/// `credit` is zero or positive, `debit` is zero or negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCreditDebit {
    /// Serialized as `YYYY-MM-DD`.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// The sum of the day's positive amounts.
    pub credit: Decimal,
    /// The sum of the day's negative amounts.
    pub debit: Decimal,
}

/// The first date reported by [rolling_balance]: two calendar years before `as_of`.
///
/// 29 February maps to 28 February when the earlier year is not a leap year.
///
/// # Errors
/// Returns [Error::InvalidArgument] if the date is before the first representable date.
pub fn rolling_balance_start(as_of: Date) -> Result<Date, Error> {
    let out_of_range = || {
        Error::InvalidArgument(format!(
            "{as_of} is too close to the first supported date to report two years of balances"
        ))
    };

    let year = as_of.year().checked_sub(2).ok_or_else(out_of_range)?;
    let mut day = as_of.day();

    loop {
        match Date::from_calendar_date(year, as_of.month(), day) {
            Ok(date) => return Ok(date),
            Err(_) if day > 28 => day -= 1,
            Err(_) => return Err(out_of_range()),
        }
    }
}

/// The first date reported by [daily_credit_debit]: the first day of the
/// month two months before the month of `as_of`.
///
/// # Errors
/// Returns [Error::InvalidArgument] if the date is before the first representable date.
pub fn daily_credit_debit_start(as_of: Date) -> Result<Date, Error> {
    let out_of_range = || {
        Error::InvalidArgument(format!(
            "{as_of} is too close to the first supported date to report credits and debits"
        ))
    };

    shift_month(as_of, -2).ok_or_else(out_of_range)
}

/// The end-of-day balance for every date in the two years up to `as_of` that
/// has at least one movement, in ascending date order.
///
/// The balance is summed over the whole ledger, so movements older than the
/// reported window still count towards the balance.
///
/// # Errors
/// Returns [Error::InvalidArgument] if the window start cannot be computed
/// or the running total overflows.
pub fn rolling_balance(
    movements: &[LedgerEntry],
    as_of: Date,
) -> Result<Vec<BalancePoint>, Error> {
    let start_date = rolling_balance_start(as_of)?;

    let mut rows: Vec<(Date, Decimal)> = movements
        .iter()
        .map(|movement| (movement.entry_date, movement.amount))
        .collect();
    rows.sort_by_key(|(date, _)| *date);

    // Running total per row. Rows on the same date are peers and share the
    // total of everything up to and including that date.
    let mut running_totals = Vec::with_capacity(rows.len());
    let mut total = Decimal::ZERO;
    for peers in rows.chunk_by(|a, b| a.0 == b.0) {
        for (_, amount) in peers {
            total = checked_add(total, *amount)?;
        }
        running_totals.extend(peers.iter().map(|(date, _)| (*date, total)));
    }

    let mut points: Vec<BalancePoint> = Vec::new();
    for (date, total) in running_totals
        .into_iter()
        .filter(|(date, _)| *date >= start_date)
    {
        match points.last_mut() {
            Some(point) if point.date == date => point.balance = point.balance.min(total),
            _ => points.push(BalancePoint {
                date,
                balance: total,
            }),
        }
    }

    Ok(points)
}

/// The credits and debits per day from the start of the month two months
/// before `as_of`, in ascending date order.
///
/// Internal transfers are left out. Movements without a category, or whose
/// category is missing from `category_names`, are counted.
///
/// # Errors
/// Returns [Error::InvalidArgument] if the window start cannot be computed
/// or a daily sum overflows.
pub fn daily_credit_debit(
    movements: &[LedgerEntry],
    category_names: &HashMap<CategoryId, String>,
    as_of: Date,
) -> Result<Vec<DailyCreditDebit>, Error> {
    let start_date = daily_credit_debit_start(as_of)?;

    let is_excluded = |movement: &LedgerEntry| {
        movement
            .category_id
            .and_then(|id| category_names.get(&id))
            .is_some_and(|name| is_internal_transfer(name))
    };

    let mut days: BTreeMap<Date, DailyCreditDebit> = BTreeMap::new();
    for movement in movements
        .iter()
        .filter(|movement| movement.entry_date >= start_date && !is_excluded(movement))
    {
        let day = days
            .entry(movement.entry_date)
            .or_insert_with(|| DailyCreditDebit {
                date: movement.entry_date,
                credit: Decimal::ZERO,
                debit: Decimal::ZERO,
            });

        if movement.amount > Decimal::ZERO {
            day.credit = checked_add(day.credit, movement.amount)?;
        } else if movement.amount < Decimal::ZERO {
            day.debit = checked_add(day.debit, movement.amount)?;
        }
    }

    Ok(days.into_values().collect())
}

fn checked_add(total: Decimal, amount: Decimal) -> Result<Decimal, Error> {
    total.checked_add(amount).ok_or_else(|| {
        Error::InvalidArgument(format!("adding {amount} to {total} overflows"))
    })
}



#[cfg(test)]
mod daily_credit_debit_tests {
    use std::collections::HashMap;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::{Date, macros::date};

    use crate::{
        Error,
        category::{INTERNAL_CREDIT, INTERNAL_DEBIT},
    };

    use super::{DailyCreditDebit, LedgerEntry, daily_credit_debit};

    fn entry(entry_date: Date, amount: Decimal, category_id: Option<i64>) -> LedgerEntry {
        LedgerEntry {
            entry_date,
            amount,
            category_id,
        }
    }

    fn category_names() -> HashMap<i64, String> {
        HashMap::from([
            (1, INTERNAL_CREDIT.to_owned()),
            (2, INTERNAL_DEBIT.to_owned()),
            (3, "Sales".to_owned()),
        ])
    }

    #[test]
    fn internal_transfers_are_excluded() {
        let movements = [
            entry(date!(2024 - 05 - 01), dec!(200), Some(1)),
            entry(date!(2024 - 05 - 01), dec!(50), Some(3)),
        ];

        let got = daily_credit_debit(&movements, &category_names(), date!(2024 - 06 - 01)).unwrap();

        assert_eq!(
            got,
            vec![DailyCreditDebit {
                date: date!(2024 - 05 - 01),
                credit: dec!(50),
                debit: dec!(0),
            }]
        );
    }

    #[test]
    fn day_with_only_internal_transfers_has_no_row() {
        let movements = [
            entry(date!(2024 - 05 - 02), dec!(200), Some(1)),
            entry(date!(2024 - 05 - 02), dec!(-200), Some(2)),
            entry(date!(2024 - 05 - 03), dec!(-15), Some(3)),
        ];

        let got = daily_credit_debit(&movements, &category_names(), date!(2024 - 06 - 01)).unwrap();

        assert_eq!(
            got,
            vec![DailyCreditDebit {
                date: date!(2024 - 05 - 03),
                credit: dec!(0),
                debit: dec!(-15),
            }]
        );
    }

    #[test]
    fn sums_credits_and_debits_per_day() {
        let movements = [
            entry(date!(2024 - 05 - 10), dec!(20), None),
            entry(date!(2024 - 05 - 10), dec!(5.5), Some(3)),
            entry(date!(2024 - 05 - 10), dec!(-7.25), None),
            entry(date!(2024 - 04 - 02), dec!(-1), None),
        ];

        let got = daily_credit_debit(&movements, &category_names(), date!(2024 - 06 - 01)).unwrap();

        assert_eq!(
            got,
            vec![
                DailyCreditDebit {
                    date: date!(2024 - 04 - 02),
                    credit: dec!(0),
                    debit: dec!(-1),
                },
                DailyCreditDebit {
                    date: date!(2024 - 05 - 10),
                    credit: dec!(25.5),
                    debit: dec!(-7.25),
                },
            ]
        );
    }

    #[test]
    fn movements_before_window_are_ignored() {
        let movements = [
            entry(date!(2024 - 03 - 31), dec!(20), None),
            entry(date!(2024 - 04 - 01), dec!(30), None),
        ];

        let got = daily_credit_debit(&movements, &category_names(), date!(2024 - 06 - 30)).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].date, date!(2024 - 04 - 01));
    }

    #[test]
    fn dangling_category_is_included() {
        let movements = [entry(date!(2024 - 05 - 10), dec!(20), Some(404))];

        let got = daily_credit_debit(&movements, &category_names(), date!(2024 - 06 - 01)).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].credit, dec!(20));
    }

    #[test]
    fn empty_ledger_gives_empty_series() {
        assert_eq!(
            daily_credit_debit(&[], &HashMap::new(), date!(2024 - 06 - 01)),
            Ok(vec![])
        );
    }

    #[test]
    fn is_idempotent() {
        let movements = [
            entry(date!(2024 - 05 - 10), dec!(20), None),
            entry(date!(2024 - 05 - 11), dec!(-3), Some(3)),
        ];
        let names = category_names();

        assert_eq!(
            daily_credit_debit(&movements, &names, date!(2024 - 06 - 01)),
            daily_credit_debit(&movements, &names, date!(2024 - 06 - 01))
        );
    }

    #[test]
    fn as_of_too_early_is_invalid() {
        assert!(matches!(
            daily_credit_debit(&[], &HashMap::new(), Date::MIN),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn overflowing_daily_sum_is_invalid() {
        let movements = [
            entry(date!(2024 - 05 - 01), Decimal::MIN, None),
            entry(date!(2024 - 05 - 01), Decimal::MIN, None),
        ];

        assert!(matches!(
            daily_credit_debit(&movements, &HashMap::new(), date!(2024 - 06 - 01)),
            Err(Error::InvalidArgument(_))
        ));
    }
}
