//! Role-based access control extractors for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::user::UserRole;
use crate::AppState;

/// Reject with 403 unless the user holds at least one of `roles`.
pub fn ensure_any(user: &CurrentUser, roles: &[UserRole]) -> Result<(), AppError> {
    if user.roles.has_any(roles) {
        return Ok(());
    }
    let wanted: Vec<&str> = roles.iter().map(UserRole::as_str).collect();
    Err(AppError::Forbidden(format!(
        "{} access required",
        wanted.join(" or ")
    )))
}

/// Declares an extractor that wraps [`CurrentUser`] behind a role check.
macro_rules! role_extractor {
    ($(#[$doc:meta])* $name:ident, [$($role:expr),+ $(,)?]) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name(pub CurrentUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let user = CurrentUser::from_request_parts(parts, state).await?;
                ensure_any(&user, &[$($role),+])?;
                Ok($name(user))
            }
        }
    };
}

role_extractor!(
    /// Extractor that requires the MANAGER tag.
    RequireManager,
    [UserRole::Manager]
);

role_extractor!(
    /// Extractor that requires the HOD tag.
    RequireHod,
    [UserRole::Hod]
);

role_extractor!(
    /// Extractor that requires the OPERATIONS tag.
    RequireOperations,
    [UserRole::Operations]
);

role_extractor!(
    /// Extractor that requires the LEADGEN tag.
    RequireLeadGen,
    [UserRole::LeadGen]
);

role_extractor!(
    /// Extractor that requires the FSE tag.
    RequireFse,
    [UserRole::Fse]
);

role_extractor!(
    /// Extractor for user administration: ADMIN or HOD.
    RequireUserAdmin,
    [UserRole::Admin, UserRole::Hod]
);

role_extractor!(
    /// Extractor for job description authors.
    RequireJobAuthor,
    [UserRole::Manager, UserRole::Hod, UserRole::Fse]
);
