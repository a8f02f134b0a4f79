//! Actor resolution middleware
//!
//! Authentication lives in the upstream gateway; this service only needs to
//! know who performs each mutation for the audit trail. The gateway forwards
//! the authenticated identity in `X-Actor-Id` / `X-Actor-Name` headers.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{ErrorDetail, ErrorResponse};

const ACTOR_ID_HEADER: &str = "x-actor-id";
const ACTOR_NAME_HEADER: &str = "x-actor-name";

/// Acting user resolved from the forwarded identity headers.
#[derive(Clone, Debug)]
pub struct Actor {
    pub actor_id: uuid::Uuid,
    pub name: String,
}

/// Middleware that requires a forwarded actor identity on every request.
pub async fn actor_middleware(mut request: Request, next: Next) -> Response {
    let actor_id = request
        .headers()
        .get(ACTOR_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| uuid::Uuid::parse_str(s).ok());

    let actor_id = match actor_id {
        Some(id) => id,
        None => {
            return unauthorized_response("Missing or invalid X-Actor-Id header");
        }
    };

    let name = request
        .headers()
        .get(ACTOR_NAME_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| actor_id.to_string());

    request.extensions_mut().insert(Actor { actor_id, name });

    next.run(request).await
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            field: None,
            pending_units: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for the acting user
/// Use this in handlers that record who performed a mutation
#[derive(Clone, Debug)]
pub struct CurrentActor(pub Actor);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(CurrentActor)
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: ErrorDetail {
                        code: "UNAUTHORIZED".to_string(),
                        message: "Actor identity required".to_string(),
                        field: None,
                        pending_units: None,
                    },
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}
