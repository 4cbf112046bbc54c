//! Caller identity.
//!
//! Labwise does not authenticate users itself. The caller's id arrives in the
//! `X-User-Id` header, set by whatever sits in front of the server, and is
//! only used to attribute bookings.

use std::fmt;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

use crate::error::RestError;

/// Header carrying the caller's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Identifies the user a booking is made for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a user id. Surrounding whitespace is dropped; blank ids are `None`.
    pub fn new(id: impl AsRef<str>) -> Option<Self> {
        let id = id.as_ref().trim();
        (!id.is_empty()).then(|| Self(id.to_string()))
    }

    /// Returns the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(UserId::new)
            .ok_or_else(|| RestError::Unauthorized {
                message: "X-User-Id header is required to book a test".to_string(),
            })
    }
}
