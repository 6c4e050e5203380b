//! Accounting is a web app for keeping the books of a small organisation.
//!
//! It records the movements of the organisation's bank accounts, lets the
//! treasurer categorise and split them, tracks membership subscriptions paid
//! through those movements, and renders balance and cash-flow reports.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use rust_decimal::Decimal;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod category;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod money;
mod month;
mod movement;
mod navigation;
mod not_found;
mod report;
mod role;
mod routing;
mod subscription;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use account::{Account, AccountId, create_account};
pub use app_state::AppState;
pub use category::{
    Category, CategoryId, CategoryKind, CategoryName, INTERNAL_CREDIT, INTERNAL_DEBIT,
    create_category,
};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use movement::{Movement, MovementBuilder, create_movement};
pub use report::{BalancePoint, DailyCreditDebit, LedgerEntry, daily_credit_debit, rolling_balance};
pub use routing::build_router;
pub use subscription::{Subscription, SubscriptionKind, save_subscription};
pub use timezone::get_local_offset;

use crate::{
    alert::Alert,
    html::error_view,
    internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An argument to a computation or a request parameter was invalid, e.g.
    /// a reference date that cannot be parsed or a date too close to the
    /// limits of the calendar for a reporting window to be computed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A monetary amount was rejected, e.g. a zero amount on a new movement.
    #[error("invalid amount {0}")]
    InvalidAmount(Decimal),

    /// The two parts of a split do not add up to the original movement, or
    /// one of the parts has the wrong sign.
    #[error("invalid split: {0}")]
    InvalidSplit(String),

    /// The category ID used to categorise a movement did not match a valid
    /// category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// The account ID used to create a movement did not match a valid account.
    #[error("the account ID {0} does not refer to a valid account")]
    InvalidAccount(AccountId),

    /// The subscription period is not valid, e.g. it ends before it starts.
    #[error("invalid subscription: {0}")]
    InvalidSubscription(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The caller does not hold the role required for the route.
    #[error("the caller is not allowed to access this resource")]
    Forbidden,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a movement that does not exist
    #[error("tried to update a movement that is not in the database")]
    UpdateMissingMovement,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                error_view(
                    "Forbidden",
                    "403",
                    "You are not allowed to see this page.",
                    "Ask the treasurer to grant you the required role.",
                ),
            )
                .into_response(),
            Error::InvalidArgument(reason) => (
                StatusCode::BAD_REQUEST,
                error_view(
                    "Bad Request",
                    "400",
                    "The request could not be understood.",
                    &reason,
                ),
            )
                .into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidAmount(amount) => Alert::error(
                "Invalid amount",
                &format!("{amount} is not a valid amount for a movement."),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InvalidSplit(reason) => Alert::error("Could not split movement", &reason)
                .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InvalidCategory(category_id) => Alert::error(
                "Invalid category",
                &format!("Could not find a category with the ID {category_id:?}"),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InvalidAccount(account_id) => Alert::error(
                "Invalid account",
                &format!("Could not find an account with the ID {account_id}"),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InvalidSubscription(reason) => {
                Alert::error("Invalid subscription", &reason)
                    .into_response_with_status(StatusCode::BAD_REQUEST)
            }
            Error::NotFound | Error::UpdateMissingMovement => Alert::error(
                "Could not update movement",
                "The movement could not be found. \
                Try refreshing the page to see if it has been split or removed.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::InvalidTimezoneError(timezone) => Alert::error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            )
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
            _ => Alert::error(
                "Something went wrong",
                "An unexpected error occurred, check the server logs for more details.",
            )
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}
