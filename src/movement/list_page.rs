//! The pages listing movements: all of them, those of a counter party and
//! those of a category.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, CategoryId, get_all_categories, get_category, get_category_names_by_id},
    endpoints::{self, format_endpoint},
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    movement::{
        Movement, form::category_select, get_all_movements, get_movements_by_category,
        get_movements_by_counter_party,
    },
    navigation::NavBar,
};

/// The state needed for the movement list pages.
#[derive(Debug, Clone)]
pub struct MovementsListState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MovementsListState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render every movement, newest first.
pub async fn get_movements_page(
    State(state): State<MovementsListState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let movements = get_all_movements(&connection)?;

    render_list(
        "Movements",
        endpoints::MOVEMENTS_VIEW,
        &movements,
        &connection,
    )
}

/// Render the movements to or from the counter party `iban`.
pub async fn get_movements_by_iban_page(
    Path(iban): Path<String>,
    State(state): State<MovementsListState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let movements = get_movements_by_counter_party(&iban, &connection)?;

    render_list(
        &format!("Movements of {iban}"),
        &format_endpoint(endpoints::MOVEMENTS_BY_IBAN_VIEW, &iban),
        &movements,
        &connection,
    )
}

/// Render the movements in the category `category_id`.
pub async fn get_movements_by_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<MovementsListState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, &connection)?;
    let movements = get_movements_by_category(category_id, &connection)?;

    render_list(
        &format!("Movements in {}", category.name),
        &format_endpoint(endpoints::MOVEMENTS_BY_CATEGORY_VIEW, category_id),
        &movements,
        &connection,
    )
}

fn render_list(
    title: &str,
    active_endpoint: &str,
    movements: &[Movement],
    connection: &Connection,
) -> Result<Response, Error> {
    let categories = get_all_categories(connection)?;
    let category_names = get_category_names_by_id(connection)?;

    Ok(
        movements_view(title, active_endpoint, movements, &categories, &category_names)
            .into_response(),
    )
}

fn movements_view(
    title: &str,
    active_endpoint: &str,
    movements: &[Movement],
    categories: &[Category],
    category_names: &HashMap<CategoryId, String>,
) -> Markup {
    let nav_bar = NavBar::new(active_endpoint).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl"
            {
                div class="flex justify-between items-center mb-4"
                {
                    h1 class="text-xl font-bold" { (title) }
                    (link(endpoints::ADD_MOVEMENT, "Add movement"))
                }

                @if movements.is_empty() {
                    p { "No movements yet." }
                } @else {
                    div class="relative overflow-x-auto shadow-md rounded"
                    {
                        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Counter party" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Communication" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }

                            tbody
                            {
                                @for movement in movements {
                                    (movement_row(movement, categories, category_names))
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base(title, &[], &content)
}

fn movement_row(
    movement: &Movement,
    categories: &[Category],
    category_names: &HashMap<CategoryId, String>,
) -> Markup {
    let category_endpoint = format_endpoint(endpoints::MOVEMENT_CATEGORY, movement.id);

    html! {
        tr id=(format!("movement-{}", movement.id)) class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (movement.entry_date) }
            td class=(TABLE_CELL_STYLE) { (format_currency(movement.amount)) }
            td class=(TABLE_CELL_STYLE)
            {
                @match (&movement.counter_party_name, &movement.counter_party_iban) {
                    (name, Some(iban)) => {
                        a
                            href=(format_endpoint(endpoints::MOVEMENTS_BY_IBAN_VIEW, iban))
                            class=(LINK_STYLE)
                        {
                            (name.as_deref().unwrap_or(iban.as_str()))
                        }
                    }
                    (Some(name), None) => { (name) }
                    (None, None) => {}
                }
            }
            td class=(TABLE_CELL_STYLE) { (movement.communication) }
            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(category_id) = movement.category_id {
                    a
                        href=(format_endpoint(endpoints::MOVEMENTS_BY_CATEGORY_VIEW, category_id))
                        class=(CATEGORY_BADGE_STYLE)
                    {
                        (category_names.get(&category_id).map(String::as_str).unwrap_or("Unknown category"))
                    }
                }

                form
                    hx-post=(category_endpoint)
                    hx-trigger="change"
                    hx-target-error="#alert-container"
                    class="mt-2"
                {
                    (category_select("category_id", categories, movement.category_id))
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-3"
                {
                    (link(&format_endpoint(endpoints::MOVEMENT_VIEW, movement.id), "View"))
                    (link(&format_endpoint(endpoints::SPLIT_MOVEMENT, movement.id), "Split"))

                    @if movement.is_credit() {
                        (link(&format_endpoint(endpoints::MOVEMENT_SUBSCRIPTION, movement.id), "Subscription"))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod movements_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        Error,
        account::create_account,
        category::{CategoryKind, CategoryName, create_category},
        db::initialize,
        endpoints::{self, format_endpoint},
        movement::{Movement, create_movement},
        test_utils::{assert_hx_endpoint, assert_valid_html, must_get_form, parse_html_document},
    };

    use super::{
        MovementsListState, get_movements_by_category_page, get_movements_by_iban_page,
        get_movements_page,
    };

    fn get_state() -> MovementsListState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        create_account("Compte courant", "BE68539007547034", &conn).unwrap();
        let dues = create_category(
            CategoryName::new_unchecked("Cotisations"),
            CategoryKind::Credit,
            &conn,
        )
        .unwrap();
        create_movement(
            Movement::build(1, date!(2025 - 01 - 10), dec!(20), "Cotisation janvier")
                .counter_party("Jane Doe", "BE71096123456769")
                .category_id(Some(dues.id)),
            &conn,
        )
        .unwrap();
        create_movement(
            Movement::build(1, date!(2025 - 01 - 12), dec!(-850), "Loyer")
                .counter_party("Immo SPRL", "BE62510007547061"),
            &conn,
        )
        .unwrap();

        MovementsListState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn row_ids(html: &Html) -> Vec<String> {
        html.select(&Selector::parse("tbody tr").unwrap())
            .map(|row| row.value().attr("id").unwrap_or_default().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn lists_all_movements_newest_first() {
        let response = get_movements_page(State(get_state())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(row_ids(&html), ["movement-2", "movement-1"]);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::MOVEMENT_CATEGORY, 2),
            "hx-post",
        );
    }

    #[tokio::test]
    async fn shows_category_name_and_selected_option() {
        let response = get_movements_page(State(get_state())).await.unwrap();

        let html = parse_html_document(response).await;
        let badge = html
            .select(&Selector::parse("#movement-1 a[href='/app/movements/by-category/1']").unwrap())
            .next()
            .expect("No category badge found");
        assert_eq!(badge.text().collect::<String>().trim(), "Cotisations");
        let selected = html
            .select(&Selector::parse("#movement-1 option[selected]").unwrap())
            .next()
            .expect("No selected category");
        assert_eq!(selected.value().attr("value"), Some("1"));
    }

    #[tokio::test]
    async fn empty_list_shows_message() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let state = MovementsListState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = get_movements_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(row_ids(&html).is_empty());
        assert!(html.html().contains("No movements yet."));
    }

    #[tokio::test]
    async fn lists_movements_of_counter_party() {
        let response =
            get_movements_by_iban_page(Path("BE62510007547061".to_owned()), State(get_state()))
                .await
                .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(row_ids(&html), ["movement-2"]);
    }

    #[tokio::test]
    async fn lists_movements_of_category() {
        let response = get_movements_by_category_page(Path(1), State(get_state()))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(row_ids(&html), ["movement-1"]);
    }

    #[tokio::test]
    async fn unknown_category_is_not_found() {
        let result = get_movements_by_category_page(Path(9), State(get_state())).await;

        assert!(matches!(result, Err(Error::NotFound)));
    }
}
