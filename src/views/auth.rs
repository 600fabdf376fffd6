use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use crate::auth::extractor::CurrentUser;
use crate::auth::token;
use crate::db;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::forms::account::RegisterForm;
use crate::state::SharedState;
use crate::views::{Page, render};

pub const RESET_INVALID: &str = "Password reset is invalid or has expired";

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    page: Page,
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate {
    page: Page,
    name: String,
    email: String,
}

#[derive(Template)]
#[template(path = "reset.html")]
struct ResetTemplate {
    page: Page,
    token: String,
}

pub async fn login_page(user: Option<CurrentUser>, jar: CookieJar) -> Result<Response, AppError> {
    // Already logged in
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let (jar, flashes) = flash::take(jar);
    let template = LoginTemplate {
        page: Page::new("Login", None, flashes),
    };
    render(jar, &template)
}

pub async fn register_page(jar: CookieJar) -> Result<Response, AppError> {
    render_register(jar, &RegisterForm::default(), Vec::new())
}

/// Re-render registration keeping what the user typed (never the passwords).
pub fn render_register(
    jar: CookieJar,
    form: &RegisterForm,
    errors: Vec<String>,
) -> Result<Response, AppError> {
    let (jar, mut flashes) = flash::take(jar);
    flashes.extend(errors.into_iter().map(Flash::error));

    let template = RegisterTemplate {
        page: Page::new("Register", None, flashes),
        name: form.name.clone(),
        email: form.email.clone(),
    };
    render(jar, &template)
}

pub async fn reset_page(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    let user = db::users::find_by_valid_reset_token(&state.pool, &token::hash(&token)).await?;
    if user.is_none() {
        return Ok(flash::redirect(jar, "/login", Flash::error(RESET_INVALID)));
    }

    let (jar, flashes) = flash::take(jar);
    let template = ResetTemplate {
        page: Page::new("Reset your password", None, flashes),
        token,
    };
    render(jar, &template)
}
