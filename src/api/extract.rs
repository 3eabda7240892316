//! Request extractors shared by the handlers.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::app_state::AppState;
use crate::error::GatewayError;

/// JSON body whose rejections use the gateway error shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Guard for admin routes.
///
/// Succeeds when no admin token is configured, or when the request
/// carries `Authorization: Bearer <token>` with the configured token.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_token.as_deref() else {
            return Ok(Self);
        };

        let provided = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        match provided {
            Some(token) if constant_time_eq::constant_time_eq(token.as_bytes(), expected.as_bytes()) => {
                Ok(Self)
            }
            Some(_) => {
                tracing::warn!(path = %parts.uri.path(), "admin request with wrong token");
                Err(GatewayError::Unauthorized)
            }
            None => Err(GatewayError::Unauthorized),
        }
    }
}
