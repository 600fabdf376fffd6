use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use crate::flash::{self, Flash};

pub const LOGIN_REQUIRED: &str = "Oops! You must be logged in to do that.";

/// Turns a 401 from a browser page into a redirect to `/login` with a flash.
pub async fn redirect_unauthorized(jar: CookieJar, req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    if response.status() == StatusCode::UNAUTHORIZED {
        flash::redirect(jar, "/login", Flash::error(LOGIN_REQUIRED))
    } else {
        response
    }
}
