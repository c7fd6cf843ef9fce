//! Bearer-token authentication extractor for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{RoleSet, UserRole};
use crate::services::auth::{self as auth_service, TokenKind};
use crate::AppState;

/// Authenticated user resolved from the Bearer token and the `users` row.
///
/// Use as an Axum extractor in handlers that require authentication:
/// ```ignore
/// async fn handler(current_user: CurrentUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: RoleSet,
    pub manager_id: Option<Uuid>,
}

impl CurrentUser {
    pub fn has(&self, role: UserRole) -> bool {
        self.roles.has(role)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;

        let claims = auth_service::decode_token(
            bearer.token(),
            &state.config.jwt_secret,
            TokenKind::Access,
        )?;

        let user = auth_service::find_user_by_id(&state.db, claims.user_id).await?;
        if !user.is_active {
            return Err(AppError::Unauthorized);
        }

        Ok(CurrentUser {
            id: user.id,
            roles: user.role_set(),
            name: user.name,
            email: user.email,
            manager_id: user.manager_id,
        })
    }
}
