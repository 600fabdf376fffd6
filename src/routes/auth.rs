use axum::Form;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};

use crate::auth::{password, session, token};
use crate::db;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::forms::account::{ForgotForm, LoginForm, RegisterForm, ResetForm, normalize_email};
use crate::state::SharedState;
use crate::views::auth::{RESET_INVALID, render_register};

const RESET_TOKEN_TTL_HOURS: i64 = 1;

fn start_session(state: &SharedState, jar: CookieJar, user_id: uuid::Uuid) -> Result<CookieJar, AppError> {
    session::login(
        jar,
        user_id,
        &state.config.session_secret,
        state.config.secure_cookies,
    )
    .map_err(AppError::Internal)
}

pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = normalize_email(&form.email);

    if let Err(retry_after) = state.login_limiter.check(&email) {
        let minutes = retry_after.div_ceil(60).max(1);
        return Ok(flash::redirect(
            jar,
            "/login",
            Flash::error(format!(
                "Too many failed login attempts. Please try again in {minutes} minutes."
            )),
        ));
    }

    let user = db::users::find_by_email(&state.pool, &email).await?;
    let valid = match &user {
        Some(user) => password::verify(&form.password, &user.password_hash)
            .map_err(AppError::Internal)?,
        None => false,
    };

    let Some(user) = user.filter(|_| valid) else {
        state.login_limiter.record_failure(&email);
        tracing::info!("Failed login for {email}");
        return Ok(flash::redirect(jar, "/login", Flash::error("Failed Login!")));
    };

    state.login_limiter.reset(&email);
    let jar = start_session(&state, jar, user.id)?;
    Ok(flash::redirect(jar, "/", Flash::success("Welcome back!")))
}

pub async fn register(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let form = form.sanitized();

    if let Err(errors) = form.validate() {
        let mut response = render_register(jar, &form, errors)?;
        *response.status_mut() = StatusCode::UNPROCESSABLE_ENTITY;
        return Ok(response);
    }

    let pw_hash = password::hash(&form.password).map_err(AppError::Internal)?;

    let user = match db::users::create(&state.pool, &form.email, &form.name, &pw_hash).await {
        Ok(user) => user,
        Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
            let mut response = render_register(
                jar,
                &form,
                vec!["A user with that email is already registered".to_string()],
            )?;
            *response.status_mut() = StatusCode::CONFLICT;
            return Ok(response);
        }
        Err(e) => return Err(AppError::Database(e)),
    };

    tracing::info!("Registered user {}", user.id);

    if let Some(mailer) = state.mailer.clone() {
        let base_url = state.config.base_url.clone();
        let (email, name) = (user.email.clone(), user.name.clone());
        tokio::spawn(async move {
            if let Err(e) = mailer.send_welcome(&email, &name, &base_url).await {
                tracing::error!("Failed to send welcome email: {e}");
            }
        });
    }

    let jar = start_session(&state, jar, user.id)?;
    Ok(flash::redirect(
        jar,
        "/",
        Flash::success(format!("Welcome, {}!", user.name)),
    ))
}

pub async fn logout(jar: CookieJar) -> Response {
    let jar = session::logout(jar);
    flash::redirect(jar, "/", Flash::success("You are now logged out! 👋"))
}

pub async fn forgot(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<ForgotForm>,
) -> Result<Response, AppError> {
    // Same answer whether or not the email is registered
    let done = flash::redirect(
        jar,
        "/login",
        Flash::info("If that email is registered, you have been emailed a password reset link ✉️"),
    );

    let email = normalize_email(&form.email);
    let Some(user) = db::users::find_by_email(&state.pool, &email).await? else {
        return Ok(done);
    };

    let reset_token = token::generate();
    db::users::set_reset_token(
        &state.pool,
        user.id,
        &token::hash(&reset_token),
        Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS),
    )
    .await?;

    let reset_url = format!("{}/account/reset/{reset_token}", state.config.base_url);
    match state.mailer.clone() {
        Some(mailer) => {
            tokio::spawn(async move {
                if let Err(e) = mailer
                    .send_password_reset(&user.email, &user.name, &reset_url)
                    .await
                {
                    tracing::error!("Failed to send password reset email: {e}");
                }
            });
        }
        None => {
            tracing::warn!("No SMTP relay configured. Password reset link: {reset_url}");
        }
    }

    Ok(done)
}

pub async fn reset(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(reset_token): Path<String>,
    Form(form): Form<ResetForm>,
) -> Result<Response, AppError> {
    if !reset_token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(flash::redirect(jar, "/login", Flash::error(RESET_INVALID)));
    }

    if let Err(msg) = form.validate() {
        return Ok(flash::redirect(
            jar,
            &format!("/account/reset/{reset_token}"),
            Flash::error(msg),
        ));
    }

    let Some(user) =
        db::users::find_by_valid_reset_token(&state.pool, &token::hash(&reset_token)).await?
    else {
        return Ok(flash::redirect(jar, "/login", Flash::error(RESET_INVALID)));
    };

    let pw_hash = password::hash(&form.password).map_err(AppError::Internal)?;
    db::users::reset_password(&state.pool, user.id, &pw_hash).await?;
    state.login_limiter.reset(&user.email);

    tracing::info!("Password reset for user {}", user.id);

    let jar = start_session(&state, jar, user.id)?;
    Ok(flash::redirect(
        jar,
        "/",
        Flash::success("💃 Nice! Your password has been reset! You are now logged in!"),
    ))
}
