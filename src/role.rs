//! Role checks for the routes.
//!
//! Authentication happens in the reverse proxy in front of the app. The proxy
//! forwards the caller's roles in the `X-Forwarded-Roles` header as a comma
//! separated list, e.g. `ROLE_ADMIN, ROLE_TREASURER`.

use std::str::FromStr;

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::Error;

/// The header the reverse proxy puts the caller's roles in.
pub const ROLES_HEADER: &str = "x-forwarded-roles";

/// What a caller is allowed to do. A role does not imply the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// May see the movements and the reports, and add movements.
    Admin,
    /// May categorise and split movements and record subscriptions.
    Treasurer,
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let name = name.strip_prefix("ROLE_").unwrap_or(name);

        if name.eq_ignore_ascii_case("ADMIN") {
            Ok(Role::Admin)
        } else if name.eq_ignore_ascii_case("TREASURER") {
            Ok(Role::Treasurer)
        } else {
            Err(Error::InvalidArgument(format!("unknown role {s:?}")))
        }
    }
}

/// The roles listed in every `X-Forwarded-Roles` header of `headers`.
///
/// Unknown roles are ignored.
pub fn roles_from_headers(headers: &HeaderMap) -> Vec<Role> {
    headers
        .get_all(ROLES_HEADER)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| name.parse().ok())
        .collect()
}

async fn require_role(role: Role, request: Request, next: Next) -> Response {
    if roles_from_headers(request.headers()).contains(&role) {
        return next.run(request).await;
    }

    tracing::warn!(
        "Refused {} {}: caller does not have the role {role:?}",
        request.method(),
        request.uri().path()
    );

    Error::Forbidden.into_response()
}

/// Middleware that only lets callers with the [Role::Admin] role through.
pub async fn require_admin(request: Request, next: Next) -> Response {
    require_role(Role::Admin, request, next).await
}

/// Middleware that only lets callers with the [Role::Treasurer] role through.
pub async fn require_treasurer(request: Request, next: Next) -> Response {
    require_role(Role::Treasurer, request, next).await
}


#[cfg(test)]
mod middleware_tests {
    use axum::{Router, http::StatusCode, middleware, routing::get};
    use axum_test::TestServer;

    use super::{ROLES_HEADER, require_admin, require_treasurer};

    async fn test_handler() -> &'static str {
        "ok"
    }

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route("/admin", get(test_handler))
            .route_layer(middleware::from_fn(require_admin))
            .merge(
                Router::new()
                    .route("/treasurer", get(test_handler))
                    .route_layer(middleware::from_fn(require_treasurer)),
            );

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn admin_route_accepts_admin() {
        let server = get_test_server();

        server
            .get("/admin")
            .add_header(ROLES_HEADER, "ROLE_ADMIN")
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn admin_route_refuses_treasurer() {
        let server = get_test_server();

        server
            .get("/admin")
            .add_header(ROLES_HEADER, "ROLE_TREASURER")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn treasurer_route_refuses_admin() {
        let server = get_test_server();

        server
            .get("/treasurer")
            .add_header(ROLES_HEADER, "ADMIN")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn routes_refuse_anonymous_callers() {
        let server = get_test_server();

        server.get("/admin").await.assert_status(StatusCode::FORBIDDEN);
        server
            .get("/treasurer")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
