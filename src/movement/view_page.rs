//! The page showing a single movement.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{Account, get_account},
    category::{Category, get_all_categories},
    endpoints::{self, format_endpoint},
    html::{CATEGORY_BADGE_STYLE, PAGE_CONTAINER_STYLE, base, format_currency, link},
    movement::{Movement, MovementId, form::category_select, get_movement},
    navigation::NavBar,
};

/// The state needed for the movement page.
#[derive(Debug, Clone)]
pub struct MovementPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MovementPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the details of the movement `movement_id`.
pub async fn get_movement_page(
    Path(movement_id): Path<MovementId>,
    State(state): State<MovementPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let movement = get_movement(movement_id, &connection)?;
    let account = get_account(movement.account_id, &connection)?;
    let categories = get_all_categories(&connection)?;

    Ok(movement_view(&movement, &account, &categories).into_response())
}

fn movement_view(movement: &Movement, account: &Account, categories: &[Category]) -> Markup {
    let endpoint = format_endpoint(endpoints::MOVEMENT_VIEW, movement.id);
    let nav_bar = NavBar::new(&endpoint).into_html();
    let category = movement
        .category_id
        .and_then(|id| categories.iter().find(|category| category.id == id));

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Movement #" (movement.id) }

                dl class="grid grid-cols-2 gap-2 text-sm"
                {
                    dt class="font-semibold" { "Date" }
                    dd { (movement.entry_date) }

                    dt class="font-semibold" { "Amount" }
                    dd { (format_currency(movement.amount)) }

                    dt class="font-semibold" { "Account" }
                    dd { (account.name) " (" (account.iban) ")" }

                    dt class="font-semibold" { "Counter party" }
                    dd
                    {
                        (movement.counter_party_name.as_deref().unwrap_or("-"))

                        @if let Some(iban) = &movement.counter_party_iban {
                            " "
                            (link(&format_endpoint(endpoints::MOVEMENTS_BY_IBAN_VIEW, iban), iban))
                        }
                    }

                    dt class="font-semibold" { "Communication" }
                    dd { (movement.communication) }

                    dt class="font-semibold" { "Category" }
                    dd
                    {
                        @match category {
                            Some(category) => {
                                a
                                    href=(format_endpoint(endpoints::MOVEMENTS_BY_CATEGORY_VIEW, category.id))
                                    class=(CATEGORY_BADGE_STYLE)
                                {
                                    (category.name)
                                }
                            }
                            None => { "Uncategorised" }
                        }
                    }
                }

                form
                    hx-post=(format_endpoint(endpoints::MOVEMENT_CATEGORY, movement.id))
                    hx-trigger="change"
                    hx-target-error="#alert-container"
                {
                    (category_select("category_id", categories, movement.category_id))
                }

                div class="flex gap-3"
                {
                    (link(&format_endpoint(endpoints::SPLIT_MOVEMENT, movement.id), "Split"))

                    @if movement.is_credit() {
                        (link(&format_endpoint(endpoints::MOVEMENT_SUBSCRIPTION, movement.id), "Subscription"))
                    }
                }
            }
        }
    };

    base("Movement", &[], &content)
}
