use askama::Template;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use crate::auth::extractor::CurrentUser;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::models::User;
use crate::views::{Page, render};

#[derive(Template)]
#[template(path = "account.html")]
struct AccountTemplate {
    page: Page,
    name: String,
    email: String,
}

pub async fn account_page(
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    render_account(jar, &user, &user.name, &user.email, Vec::new())
}

pub fn render_account(
    jar: CookieJar,
    user: &User,
    name: &str,
    email: &str,
    errors: Vec<String>,
) -> Result<Response, AppError> {
    let (jar, mut flashes) = flash::take(jar);
    flashes.extend(errors.into_iter().map(Flash::error));

    let template = AccountTemplate {
        page: Page::new("Edit Your Account", Some(user), flashes),
        name: name.to_string(),
        email: email.to_string(),
    };
    render(jar, &template)
}
