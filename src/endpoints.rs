//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/app/movements/{movement_id}', use [format_endpoint].

/// The root route which redirects to the movements page.
pub const ROOT: &str = "/";
/// The page listing all movements.
pub const MOVEMENTS_VIEW: &str = "/app/movements";
/// The page showing a single movement.
pub const MOVEMENT_VIEW: &str = "/app/movements/{movement_id}";
/// The route for setting the category of a movement.
pub const MOVEMENT_CATEGORY: &str = "/app/movements/{movement_id}/category";
/// The page listing the movements from a counter party.
pub const MOVEMENTS_BY_IBAN_VIEW: &str = "/app/movements/by-iban/{iban}";
/// The page listing the movements of a category.
pub const MOVEMENTS_BY_CATEGORY_VIEW: &str = "/app/movements/by-category/{category_id}";
/// The page and route for splitting a movement in two.
pub const SPLIT_MOVEMENT: &str = "/app/movements/{movement_id}/split";
/// The page and route for the subscription paid by a movement.
pub const MOVEMENT_SUBSCRIPTION: &str = "/app/movements/{movement_id}/subscription";
/// The page and route for adding a movement by hand.
pub const ADD_MOVEMENT: &str = "/app/movements/add";
/// The page with the balance and cash-flow charts.
pub const GRAPHS_VIEW: &str = "/graphs";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for the rolling balance series as JSON.
pub const ROLLING_SUM_API: &str = "/api/graphs/rolling-sum";
/// The route for the daily credit and debit sums as JSON.
pub const CREDITS_PER_DAY_API: &str = "/api/graphs/credits-per-day";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl std::fmt::Display) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

/// The movements list, scrolled to the row of `movement_id`.
pub fn movement_anchor(movement_id: i64) -> String {
    format!("{MOVEMENTS_VIEW}#movement-{movement_id}")
}
