//! Caller identity.
//!
//! Sessions are terminated upstream; the gateway forwards the authenticated
//! user in `X-User-Id` and their role in `X-User-Role`. Requests without a
//! valid user id are rejected before reaching a handler.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use listwise_types::UserId;

use crate::error::RpcError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const MODERATOR_ROLE: &str = "moderator";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub is_moderator: bool,
}

impl Identity {
    pub fn require_moderator(&self) -> Result<&UserId, RpcError> {
        if self.is_moderator {
            Ok(&self.user_id)
        } else {
            Err(RpcError::Forbidden)
        }
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = RpcError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| UserId::new(v.trim()).ok())
            .ok_or(RpcError::Unauthorized)?;
        let is_moderator = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|role| {
                role.split(',')
                    .any(|r| r.trim().eq_ignore_ascii_case(MODERATOR_ROLE))
            })
            .unwrap_or(false);
        Ok(Self {
            user_id,
            is_moderator,
        })
    }
}
