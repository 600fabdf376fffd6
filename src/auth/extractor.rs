use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use crate::auth::session;
use crate::db;
use crate::error::{ApiError, AppError};
use crate::middleware::auth_redirect::LOGIN_REQUIRED;
use crate::models::User;
use crate::state::SharedState;

/// The logged-in user, loaded fresh from the database on every request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Ownership guard for listing edits.
    pub fn require_owner(&self, author_id: uuid::Uuid) -> Result<(), AppError> {
        if self.0.id == author_id {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You must own a gym in order to edit it!".to_string(),
            ))
        }
    }
}

async fn load(parts: &Parts, state: &SharedState) -> Result<Option<CurrentUser>, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(user_id) = session::user_id(&jar, &state.config.session_secret) else {
        return Ok(None);
    };

    // A valid token for a user that no longer exists is treated as logged out.
    let user = db::users::find_by_id(&state.pool, user_id).await?;
    Ok(user.map(CurrentUser))
}

impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        load(parts, state)
            .await?
            .ok_or_else(|| AppError::Unauthorized(LOGIN_REQUIRED.to_string()))
    }
}

impl OptionalFromRequestParts<SharedState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Option<Self>, Self::Rejection> {
        load(parts, state).await
    }
}

/// [`CurrentUser`] for JSON routes: rejects with a JSON body instead of a page.
#[derive(Debug, Clone)]
pub struct ApiUser(pub User);

impl FromRequestParts<SharedState> for ApiUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) =
            <CurrentUser as FromRequestParts<SharedState>>::from_request_parts(parts, state)
                .await?;
        Ok(ApiUser(user))
    }
}
