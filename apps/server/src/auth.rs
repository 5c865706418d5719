//! Caller identity extraction.
//!
//! Authentication lives upstream: the gateway verifies credentials and
//! forwards the result as two headers. This module only parses them.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn handler(Caller(actor): Caller) -> impl IntoResponse {
//!     format!("hello, {}", actor.actor_id)
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use kasir_core::{Actor, Role};

use crate::error::ErrorBody;

/// Header naming the verified staff member.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header naming the verified role (`admin` or `cashier`).
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extractor for the calling staff member.
pub struct Caller(pub Actor);

/// Rejection when the identity headers are missing or malformed.
#[derive(Debug)]
pub struct AuthRejection(&'static str);

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: "unauthorized",
            message: self.0.to_string(),
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AuthRejection("missing or empty x-actor-id header"))?;

        let role: Role = parts
            .headers
            .get(ACTOR_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthRejection("missing x-actor-role header"))?
            .parse()
            .map_err(|_| AuthRejection("unrecognized x-actor-role header"))?;

        Ok(Caller(Actor::new(actor_id, role)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<Caller, AuthRejection> {
        let (mut parts, _) = request.into_parts();
        Caller::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_headers() {
        let request = Request::builder()
            .header(ACTOR_ID_HEADER, "c1")
            .header(ACTOR_ROLE_HEADER, "cashier")
            .body(())
            .unwrap();

        let Caller(actor) = extract(request).await.unwrap();
        assert_eq!(actor.actor_id, "c1");
        assert_eq!(actor.role, Role::Cashier);
    }

    #[tokio::test]
    async fn test_role_is_case_insensitive() {
        let request = Request::builder()
            .header(ACTOR_ID_HEADER, "a1")
            .header(ACTOR_ROLE_HEADER, "Admin")
            .body(())
            .unwrap();

        let Caller(actor) = extract(request).await.unwrap();
        assert!(actor.is_admin());
    }

    #[tokio::test]
    async fn test_missing_headers_are_rejected() {
        let request = Request::builder().body(()).unwrap();
        assert!(extract(request).await.is_err());

        let request = Request::builder()
            .header(ACTOR_ID_HEADER, "c1")
            .body(())
            .unwrap();
        assert!(extract(request).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_role_is_rejected() {
        let request = Request::builder()
            .header(ACTOR_ID_HEADER, "c1")
            .header(ACTOR_ROLE_HEADER, "manager")
            .body(())
            .unwrap();

        assert!(extract(request).await.is_err());
    }

    #[tokio::test]
    async fn test_blank_actor_id_is_rejected() {
        let request = Request::builder()
            .header(ACTOR_ID_HEADER, "   ")
            .header(ACTOR_ROLE_HEADER, "cashier")
            .body(())
            .unwrap();

        assert!(extract(request).await.is_err());
    }
}
