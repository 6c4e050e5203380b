//! Application router configuration with the routes grouped by the role they require.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    internal_server_error::get_internal_server_error_page,
    movement::{
        add_movement_endpoint, get_add_movement_page, get_movement_page,
        get_movements_by_category_page, get_movements_by_iban_page, get_movements_page,
        get_split_movement_page, set_category_endpoint, split_movement_endpoint,
    },
    not_found::get_404_not_found,
    report::{get_credits_per_day, get_graphs_page, get_rolling_sum},
    role::{require_admin, require_treasurer},
    subscription::{get_subscription_page, save_subscription_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route(endpoints::MOVEMENTS_VIEW, get(get_movements_page))
        .route(endpoints::MOVEMENT_VIEW, get(get_movement_page))
        .route(
            endpoints::ADD_MOVEMENT,
            get(get_add_movement_page).post(add_movement_endpoint),
        )
        .route(endpoints::GRAPHS_VIEW, get(get_graphs_page))
        .route(endpoints::ROLLING_SUM_API, get(get_rolling_sum))
        .route(endpoints::CREDITS_PER_DAY_API, get(get_credits_per_day))
        .route_layer(middleware::from_fn(require_admin));

    let treasurer_routes = Router::new()
        .route(endpoints::MOVEMENT_CATEGORY, post(set_category_endpoint))
        .route(
            endpoints::MOVEMENTS_BY_IBAN_VIEW,
            get(get_movements_by_iban_page),
        )
        .route(
            endpoints::MOVEMENTS_BY_CATEGORY_VIEW,
            get(get_movements_by_category_page),
        )
        .route(
            endpoints::SPLIT_MOVEMENT,
            get(get_split_movement_page).post(split_movement_endpoint),
        )
        .route(
            endpoints::MOVEMENT_SUBSCRIPTION,
            get(get_subscription_page).post(save_subscription_endpoint),
        )
        .route_layer(middleware::from_fn(require_treasurer));

    let public_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    admin_routes
        .merge(treasurer_routes)
        .merge(public_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the movements page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::MOVEMENTS_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_movements() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::MOVEMENTS_VIEW);
    }
}
