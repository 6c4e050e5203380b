//! The subscription form of a movement and its save endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        format_currency,
    },
    movement::{Movement, MovementId, get_movement},
    navigation::NavBar,
    subscription::{
        Subscription, SubscriptionKind,
        core::{format_month, parse_month},
        get_subscription_for_movement, save_subscription,
    },
};

/// The state needed for the subscription page and endpoint.
#[derive(Debug, Clone)]
pub struct SubscriptionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SubscriptionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    /// The kind of a subscription that has not been saved yet.
    pub kind: Option<SubscriptionKind>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionForm {
    pub member_name: String,
    pub kind: SubscriptionKind,
    pub start_month: String,
    pub end_month: String,
    #[serde(default)]
    pub comment: String,
}

/// Render the subscription form for the movement `movement_id`.
pub async fn get_subscription_page(
    Path(movement_id): Path<MovementId>,
    Query(query): Query<SubscriptionQuery>,
    State(state): State<SubscriptionState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let movement = get_movement(movement_id, &connection)?;
    let subscription =
        get_subscription_for_movement(movement_id, query.kind.unwrap_or_default(), &connection)?;

    Ok(subscription_view(&movement, &subscription).into_response())
}

/// Save the subscription form of the movement `movement_id`.
pub async fn save_subscription_endpoint(
    Path(movement_id): Path<MovementId>,
    State(state): State<SubscriptionState>,
    Form(form): Form<SubscriptionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let subscription = match subscription_from_form(movement_id, form) {
        Ok(subscription) => subscription,
        Err(error) => return error.into_alert_response(),
    };

    match save_subscription(&subscription, &connection) {
        Ok(saved) => Alert::success(
            "Subscription saved",
            &format!(
                "{} is a member from {} to {}.",
                saved.member_name,
                format_month(saved.start_month),
                format_month(saved.end_month)
            ),
        )
        .into_response_with_status(StatusCode::OK),
        Err(error) => {
            tracing::error!("Could not save subscription for movement {movement_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn subscription_from_form(
    movement_id: MovementId,
    form: SubscriptionForm,
) -> Result<Subscription, Error> {
    Ok(Subscription {
        id: None,
        movement_id,
        member_name: form.member_name,
        kind: form.kind,
        start_month: parse_month(&form.start_month)?,
        end_month: parse_month(&form.end_month)?,
        comment: form.comment,
    })
}

fn subscription_view(movement: &Movement, subscription: &Subscription) -> Markup {
    let endpoint = endpoints::format_endpoint(endpoints::MOVEMENT_SUBSCRIPTION, movement.id);
    let nav_bar = NavBar::new(&endpoint).into_html();
    let kinds = [SubscriptionKind::Monthly, SubscriptionKind::Yearly];

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-2" { "Subscription" }

            p class="mb-4 text-sm"
            {
                (movement.entry_date) " · " (format_currency(movement.amount)) " · " (movement.communication)
            }

            form
                hx-post=(endpoint)
                hx-target-error="#alert-container"
                hx-target="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="member_name" class=(FORM_LABEL_STYLE) { "Member" }

                    input
                        id="member_name"
                        type="text"
                        name="member_name"
                        value=(subscription.member_name)
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="kind" class=(FORM_LABEL_STYLE) { "Kind" }

                    select id="kind" name="kind" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for kind in kinds {
                            option value=(kind) selected[kind == subscription.kind] { (kind) }
                        }
                    }
                }

                div
                {
                    label for="start_month" class=(FORM_LABEL_STYLE) { "First month" }

                    input
                        id="start_month"
                        type="month"
                        name="start_month"
                        value=(format_month(subscription.start_month))
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="end_month" class=(FORM_LABEL_STYLE) { "Last month" }

                    input
                        id="end_month"
                        type="month"
                        name="end_month"
                        value=(format_month(subscription.end_month))
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="comment" class=(FORM_LABEL_STYLE) { "Comment" }

                    textarea id="comment" name="comment" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        (subscription.comment)
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save subscription" }
            }
        }
    };

    base("Subscription", &[], &content)
}

#[cfg(test)]
mod subscription_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        account::create_account,
        db::initialize,
        endpoints,
        movement::{Movement, create_movement},
        subscription::{SubscriptionKind, get_subscription_for_movement},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document, parse_html_fragment,
        },
    };

    use super::{
        SubscriptionForm, SubscriptionQuery, SubscriptionState, get_subscription_page,
        save_subscription_endpoint,
    };

    fn get_state() -> SubscriptionState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        create_account("Compte courant", "BE68539007547034", &conn).unwrap();
        create_movement(
            Movement::build(1, date!(2024 - 09 - 17), dec!(120), "Cotisation")
                .counter_party("Jane Doe", "BE71096123456769"),
            &conn,
        )
        .unwrap();

        SubscriptionState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn form(start_month: &str, end_month: &str) -> SubscriptionForm {
        SubscriptionForm {
            member_name: "Jane Doe".to_owned(),
            kind: SubscriptionKind::Yearly,
            start_month: start_month.to_owned(),
            end_month: end_month.to_owned(),
            comment: String::new(),
        }
    }

    #[tokio::test]
    async fn page_shows_yearly_draft() {
        let state = get_state();

        let response = get_subscription_page(
            Path(1),
            Query(SubscriptionQuery {
                kind: Some(SubscriptionKind::Yearly),
            }),
            State(state),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::MOVEMENT_SUBSCRIPTION, 1),
            "hx-post",
        );
        assert_form_input_with_value(&form, "member_name", "text", "Jane Doe");
        assert_form_input_with_value(&form, "start_month", "month", "2024-09");
        assert_form_input_with_value(&form, "end_month", "month", "2025-08");
        let selected = html
            .select(&Selector::parse("option[selected]").unwrap())
            .next()
            .expect("No selected kind");
        assert_eq!(selected.value().attr("value"), Some("yearly"));
    }

    #[tokio::test]
    async fn page_for_missing_movement_is_not_found() {
        let state = get_state();

        let result =
            get_subscription_page(Path(2), Query(SubscriptionQuery::default()), State(state)).await;

        assert!(matches!(result, Err(crate::Error::NotFound)));
    }

    #[tokio::test]
    async fn save_stores_subscription() {
        let state = get_state();

        let response = save_subscription_endpoint(
            Path(1),
            State(state.clone()),
            Form(form("2024-09", "2025-08")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let alert = html
            .select(&Selector::parse("div[role=alert]").unwrap())
            .next()
            .expect("No alert found");
        assert!(alert.text().collect::<String>().contains("Subscription saved"));

        let connection = state.db_connection.lock().unwrap();
        let stored =
            get_subscription_for_movement(1, SubscriptionKind::Monthly, &connection).unwrap();
        assert!(stored.id.is_some());
        assert_eq!(stored.kind, SubscriptionKind::Yearly);
        assert_eq!(stored.end_month, date!(2025 - 08 - 01));
    }

    #[tokio::test]
    async fn save_rejects_end_before_start() {
        let state = get_state();

        let response =
            save_subscription_endpoint(Path(1), State(state), Form(form("2024-09", "2024-08")))
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn save_rejects_malformed_month() {
        let state = get_state();

        let response =
            save_subscription_endpoint(Path(1), State(state), Form(form("September", "2024-08")))
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
