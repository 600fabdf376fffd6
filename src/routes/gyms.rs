use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum_extra::extract::CookieJar;
use bytes::Bytes;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::extractor::CurrentUser;
use crate::db;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::forms::gym::{GymForm, PhotoUpload, parse_multipart};
use crate::models::{Gym, User};
use crate::photo::{self, PhotoError};
use crate::slug;
use crate::state::SharedState;
use crate::views::gyms::render_gym_form;

/// Slug for `name`, suffixed past any gym already using the same base.
pub async fn unique_slug(
    pool: &PgPool,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<String, sqlx::Error> {
    let base = slug::slugify(name);
    let existing = db::gyms::slugs_matching(pool, &slug::family_pattern(&base), exclude).await?;
    Ok(slug::disambiguate(&base, &existing))
}

fn invalid_form(
    jar: CookieJar,
    user: &User,
    form: GymForm,
    existing: Option<&Gym>,
    errors: Vec<String>,
) -> Result<Response, AppError> {
    let mut response = render_gym_form(jar, user, form, existing, errors)?;
    *response.status_mut() = StatusCode::UNPROCESSABLE_ENTITY;
    Ok(response)
}

async fn store_photo(
    state: &SharedState,
    upload: Option<PhotoUpload>,
) -> Result<Option<String>, PhotoError> {
    match upload {
        Some(upload) => photo::save(upload, &state.config.upload_dir).await.map(Some),
        None => Ok(None),
    }
}

/// Drop a freshly stored photo when the row it belongs to was not saved.
async fn discard_photo(state: &SharedState, photo: Option<&str>) {
    if let Some(file_name) = photo {
        photo::remove(&state.config.upload_dir, file_name).await;
    }
}

fn slug_conflict(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => AppError::Conflict(
            "Another gym just took that name. Please try again.".to_string(),
        ),
        sqlx::Error::RowNotFound => AppError::NotFound("Gym not found".to_string()),
        _ => AppError::Database(e),
    }
}

pub async fn create(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let submission = parse_multipart(&headers, body)
        .await
        .map_err(AppError::BadRequest)?;

    let draft = match submission.form.validate() {
        Ok(draft) => draft,
        Err(errors) => return invalid_form(jar, &user, submission.form, None, errors),
    };

    let slug = unique_slug(&state.pool, &draft.name, None).await?;

    let photo = match store_photo(&state, submission.photo).await {
        Ok(photo) => photo,
        Err(PhotoError::Io(msg)) => return Err(AppError::Internal(msg)),
        Err(e) => return invalid_form(jar, &user, submission.form, None, vec![e.to_string()]),
    };

    let saved = db::gyms::create(&state.pool, &draft, &slug, photo.as_deref(), user.id).await;
    let gym = match saved {
        Ok(gym) => gym,
        Err(e) => {
            discard_photo(&state, photo.as_deref()).await;
            return Err(slug_conflict(e));
        }
    };

    tracing::info!("Gym {} created by {}", gym.slug, user.id);

    Ok(flash::redirect(
        jar,
        &format!("/gym/{}", gym.slug),
        Flash::success(format!(
            "Successfully created {}. Care to leave a review?",
            gym.name
        )),
    ))
}

pub async fn update(
    State(state): State<SharedState>,
    current: CurrentUser,
    jar: CookieJar,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let gym = db::gyms::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Gym not found".to_string()))?;
    current.require_owner(gym.author_id)?;
    let CurrentUser(user) = current;

    let submission = parse_multipart(&headers, body)
        .await
        .map_err(AppError::BadRequest)?;

    let draft = match submission.form.validate() {
        Ok(draft) => draft,
        Err(errors) => return invalid_form(jar, &user, submission.form, Some(&gym), errors),
    };

    // The slug only follows the name when the name actually changes.
    let slug = if draft.name == gym.name {
        gym.slug.clone()
    } else {
        unique_slug(&state.pool, &draft.name, Some(gym.id)).await?
    };

    let photo = match store_photo(&state, submission.photo).await {
        Ok(photo) => photo,
        Err(PhotoError::Io(msg)) => return Err(AppError::Internal(msg)),
        Err(e) => {
            return invalid_form(jar, &user, submission.form, Some(&gym), vec![e.to_string()]);
        }
    };

    let saved = db::gyms::update(&state.pool, gym.id, &draft, &slug, photo.as_deref()).await;
    let updated = match saved {
        Ok(updated) => updated,
        Err(e) => {
            discard_photo(&state, photo.as_deref()).await;
            return Err(slug_conflict(e));
        }
    };

    // A new upload replaces the old file.
    if photo.is_some() && gym.photo != updated.photo {
        discard_photo(&state, gym.photo.as_deref()).await;
    }

    tracing::info!("Gym {} updated by {}", updated.slug, user.id);

    Ok(flash::redirect(
        jar,
        &format!("/gyms/{}/edit", updated.id),
        Flash::success(format!("Successfully updated {}.", updated.name)),
    ))
}
