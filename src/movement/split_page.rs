//! The page and endpoint for splitting a movement in two.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::{Category, CategoryId, CategoryKind, get_categories_by_kind},
    endpoints::{self, format_endpoint, movement_anchor},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        format_currency,
    },
    movement::{
        Movement, MovementId, SplitPart, form::category_select, get_movement, split_movement,
    },
    navigation::NavBar,
};

/// The state needed for splitting a movement.
#[derive(Debug, Clone)]
pub struct SplitMovementState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SplitMovementState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The two parts of a split as submitted by the split form.
#[derive(Debug, Deserialize)]
pub struct SplitForm {
    pub communication: String,
    pub amount: Decimal,
    #[serde(default)]
    pub category: Option<CategoryId>,
    pub communication_split: String,
    pub amount_split: Decimal,
    #[serde(default)]
    pub category_split: Option<CategoryId>,
}

/// Render the form for splitting the movement `movement_id`.
///
/// Only credit categories are offered for a positive movement, and only debit
/// categories otherwise.
pub async fn get_split_movement_page(
    Path(movement_id): Path<MovementId>,
    State(state): State<SplitMovementState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let movement = get_movement(movement_id, &connection)?;
    let kind = if movement.is_credit() {
        CategoryKind::Credit
    } else {
        CategoryKind::Debit
    };
    let categories = get_categories_by_kind(kind, &connection)?;

    Ok(split_view(&movement, &categories).into_response())
}

/// Split the movement `movement_id` and send the client to the first part in the list.
pub async fn split_movement_endpoint(
    Path(movement_id): Path<MovementId>,
    State(state): State<SplitMovementState>,
    Form(form): Form<SplitForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let part_one = SplitPart {
        communication: form.communication,
        amount: form.amount,
        category_id: form.category,
    };
    let part_two = SplitPart {
        communication: form.communication_split,
        amount: form.amount_split,
        category_id: form.category_split,
    };

    match split_movement(movement_id, part_one, part_two, &connection) {
        Ok(part_one) => (
            HxRedirect(movement_anchor(part_one.id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::warn!("Could not split movement {movement_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn split_view(movement: &Movement, categories: &[Category]) -> Markup {
    let endpoint = format_endpoint(endpoints::SPLIT_MOVEMENT, movement.id);
    let nav_bar = NavBar::new(&endpoint).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-2" { "Split movement" }

            p class="mb-4 text-sm"
            {
                (movement.entry_date) " · " (format_currency(movement.amount)) " · " (movement.communication)
            }

            form
                hx-post=(endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                fieldset class="space-y-2"
                {
                    legend class=(FORM_LABEL_STYLE) { "First part" }

                    input
                        type="text"
                        name="communication"
                        aria-label="Communication"
                        value=(movement.communication)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    input
                        type="number"
                        name="amount"
                        aria-label="Amount"
                        step="0.01"
                        value=(movement.amount)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    (category_select("category", categories, movement.category_id))
                }

                fieldset class="space-y-2"
                {
                    legend class=(FORM_LABEL_STYLE) { "Second part" }

                    input
                        type="text"
                        name="communication_split"
                        aria-label="Communication"
                        value=(movement.communication)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    input
                        type="number"
                        name="amount_split"
                        aria-label="Amount"
                        step="0.01"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    (category_select("category_split", categories, None))
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Split" }
            }
        }
    };

    base("Split Movement", &[], &content)
}
