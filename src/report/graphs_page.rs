//! The graphs page and the JSON endpoints for the report series.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{
    AppState, Error,
    category::get_category_names_by_id,
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
    report::{
        BalancePoint, DailyCreditDebit,
        charts::{ReportChart, balance_chart, charts_script, charts_view, credit_debit_chart},
        daily_credit_debit, daily_credit_debit_start, get_ledger, rolling_balance,
        rolling_balance_start,
    },
    timezone::local_today,
};

/// The state needed for the graphs page and the report endpoints.
#[derive(Debug, Clone)]
pub struct GraphsState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Brussels".
    pub local_timezone: String,
}

impl FromRef<AppState> for GraphsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Query parameters for the report endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// The reference date as `YYYY-MM-DD`, defaults to today.
    pub as_of: Option<String>,
}

/// Display the balance and cash-flow charts.
pub async fn get_graphs_page(State(state): State<GraphsState>) -> Result<Response, Error> {
    let as_of = today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let ledger = get_ledger(&connection)?;
    if ledger.is_empty() {
        return Ok(graphs_no_data_view().into_response());
    }

    let category_names = get_category_names_by_id(&connection)?;
    let balances = rolling_balance(&ledger, as_of)?;
    let cash_flow = daily_credit_debit(&ledger, &category_names, as_of)?;

    let charts = [
        ReportChart {
            id: "balance-chart",
            options: balance_chart(&balances).to_string(),
        },
        ReportChart {
            id: "credit-debit-chart",
            options: credit_debit_chart(&cash_flow).to_string(),
        },
    ];

    Ok(graphs_view(as_of, &charts)?.into_response())
}

/// The rolling balance series as JSON.
pub async fn get_rolling_sum(
    State(state): State<GraphsState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<BalancePoint>>, Error> {
    let as_of = as_of_or_today(query, &state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let ledger = get_ledger(&connection)?;

    Ok(Json(rolling_balance(&ledger, as_of)?))
}

/// The daily credit and debit series as JSON.
pub async fn get_credits_per_day(
    State(state): State<GraphsState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<DailyCreditDebit>>, Error> {
    let as_of = as_of_or_today(query, &state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let ledger = get_ledger(&connection)?;
    let category_names = get_category_names_by_id(&connection)?;

    Ok(Json(daily_credit_debit(&ledger, &category_names, as_of)?))
}

fn today(local_timezone: &str) -> Result<Date, Error> {
    local_today(local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {local_timezone}");
        Error::InvalidTimezoneError(local_timezone.to_owned())
    })
}

fn as_of_or_today(query: ReportQuery, local_timezone: &str) -> Result<Date, Error> {
    match query.as_of.as_deref() {
        Some(text) => Date::parse(text, format_description!("[year]-[month]-[day]"))
            .map_err(|_| Error::InvalidArgument(format!("{text:?} is not a date (YYYY-MM-DD)"))),
        None => today(local_timezone),
    }
}

fn graphs_view(as_of: Date, charts: &[ReportChart]) -> Result<Markup, Error> {
    let nav_bar = NavBar::new(endpoints::GRAPHS_VIEW).into_html();
    let balance_start = rolling_balance_start(as_of)?;
    let cash_flow_start = daily_credit_debit_start(as_of)?;

    let content = html!(
        (nav_bar)

        div
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            p class="mb-4 text-sm text-gray-600 dark:text-gray-400"
            {
                "Balance since " (balance_start) ", credits and debits since "
                (cash_flow_start) "."
            }

            (charts_view(charts))
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
    ];

    Ok(base("Graphs", &scripts, &content))
}

fn graphs_no_data_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::GRAPHS_VIEW).into_html();
    let add_movement_link = link(endpoints::ADD_MOVEMENT, "add a movement");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once there are movements. You can "
                (add_movement_link) " by hand."
            }
        }
    );

    base("Graphs", &[], &content)
}
