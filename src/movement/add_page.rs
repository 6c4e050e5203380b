//! The page and endpoint for adding a movement by hand.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    account::{Account, AccountId, get_all_accounts},
    endpoints::{self, movement_anchor},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    movement::{Movement, create_movement},
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed to add a movement.
#[derive(Debug, Clone)]
pub struct AddMovementState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Brussels".
    pub local_timezone: String,
}

impl FromRef<AppState> for AddMovementState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for adding a movement.
#[derive(Debug, Deserialize)]
pub struct AddMovementForm {
    pub account_id: AccountId,
    /// Positive for money received, negative for money spent.
    pub amount: Decimal,
    pub communication: String,
    pub date: Date,
}

/// Render the form for adding a movement.
pub async fn get_add_movement_page(
    State(state): State<AddMovementState>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_all_accounts(&connection)?;

    Ok(add_movement_view(&accounts, today).into_response())
}

/// Add a movement and send the client to its row in the movements list.
pub async fn add_movement_endpoint(
    State(state): State<AddMovementState>,
    Form(form): Form<AddMovementForm>,
) -> Response {
    if form.amount.is_zero() {
        return Error::InvalidAmount(form.amount).into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let builder = Movement::build(form.account_id, form.date, form.amount, &form.communication);

    match create_movement(builder, &connection) {
        Ok(movement) => (
            HxRedirect(movement_anchor(movement.id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not add movement: {error}");
            error.into_alert_response()
        }
    }
}

fn add_movement_view(accounts: &[Account], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::ADD_MOVEMENT).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Add movement" }

            form
                hx-post=(endpoints::ADD_MOVEMENT)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="account_id" class=(FORM_LABEL_STYLE) { "Account" }

                    select id="account_id" name="account_id" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for account in accounts {
                            option value=(account.id) { (account.name) " (" (account.iban) ")" }
                        }
                    }
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        placeholder="-12.50"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="communication" class=(FORM_LABEL_STYLE) { "Communication" }

                    input
                        id="communication"
                        type="text"
                        name="communication"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        id="date"
                        type="date"
                        name="date"
                        value=(today)
                        max=(today)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add movement" }
            }
        }
    };

    base("Add Movement", &[], &content)
}
