//! # Actor Extraction
//!
//! Authentication happens upstream. The auth collaborator forwards the
//! resolved user as three headers, which this module turns into an
//! [`Actor`] before any handler runs.
//!
//! ```text
//! x-actor-id:       u-42
//! x-actor-username: budi
//! x-actor-role:     cashier        (admin | cashier | kasir)
//!        │
//!        ▼
//! CurrentActor(Actor { id, username, role })
//!        │
//!        ▼
//! require(Capability::ViewReports) ──► 403 when the role lacks it
//! ```

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::debug;

use kantin_core::{has_capability, Actor, Capability, Role};

use crate::error::ApiError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_USERNAME_HEADER: &str = "x-actor-username";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// The authenticated caller of the current request.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl CurrentActor {
    /// Fails with 403 unless the actor's role grants `capability`.
    pub fn require(&self, capability: Capability) -> Result<&Actor, ApiError> {
        if has_capability(&self.0, capability) {
            Ok(&self.0)
        } else {
            debug!(
                actor = %self.0.username,
                role = %self.0.role,
                %capability,
                "Capability denied"
            );
            Err(ApiError::Forbidden(format!(
                "role '{}' may not {}",
                self.0.role, capability
            )))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(parts, ACTOR_ID_HEADER)?;
        let username = header(parts, ACTOR_USERNAME_HEADER)?;
        let role: Role = header(parts, ACTOR_ROLE_HEADER)?
            .parse()
            .map_err(|_| ApiError::Unauthenticated(format!("invalid {ACTOR_ROLE_HEADER}")))?;

        Ok(CurrentActor(Actor::new(id, username, role)))
    }
}

fn header(parts: &Parts, name: &str) -> Result<String, ApiError> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthenticated(format!("missing {name}")))
}
