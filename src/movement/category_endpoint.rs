//! The endpoint for assigning a category to a movement.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::CategoryId,
    endpoints::{self, movement_anchor},
    movement::{MovementId, set_movement_category},
};

/// The state needed to categorise a movement.
#[derive(Debug, Clone)]
pub struct SetCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SetCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// Assign the category picked in the movements list to the movement `movement_id`.
///
/// Picking no category leaves the movement as it is and sends the client back to the list.
pub async fn set_category_endpoint(
    Path(movement_id): Path<MovementId>,
    State(state): State<SetCategoryState>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let Some(category_id) = form.category_id else {
        return (
            HxRedirect(endpoints::MOVEMENTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match set_movement_category(movement_id, Some(category_id), &connection) {
        Ok(()) => (
            HxRedirect(movement_anchor(movement_id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not set category of movement {movement_id}: {error}");
            error.into_alert_response()
        }
    }
}
