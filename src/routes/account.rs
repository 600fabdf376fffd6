use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use crate::auth::extractor::CurrentUser;
use crate::db;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::forms::account::AccountForm;
use crate::state::SharedState;
use crate::views::account::render_account;

pub async fn update(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(form): Form<AccountForm>,
) -> Result<Response, AppError> {
    let submitted = form.clone();
    let (name, email) = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            let mut response =
                render_account(jar, &user, &submitted.name, &submitted.email, errors)?;
            *response.status_mut() = StatusCode::UNPROCESSABLE_ENTITY;
            return Ok(response);
        }
    };

    match db::users::update_profile(&state.pool, user.id, &name, &email).await {
        Ok(_) => Ok(flash::redirect(jar, "/account", Flash::success("Updated the profile!"))),
        Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
            let mut response = render_account(
                jar,
                &user,
                &name,
                &email,
                vec!["That email is already in use.".to_string()],
            )?;
            *response.status_mut() = StatusCode::CONFLICT;
            Ok(response)
        }
        Err(e) => Err(AppError::Database(e)),
    }
}
