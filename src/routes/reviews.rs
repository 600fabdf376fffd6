use axum::Form;
use axum::extract::{Path, State};
use axum::response::Response;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::extractor::CurrentUser;
use crate::db;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::forms::review::ReviewForm;
use crate::state::SharedState;

pub async fn create(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(gym_id): Path<Uuid>,
    Form(form): Form<ReviewForm>,
) -> Result<Response, AppError> {
    let gym = db::gyms::find_by_id(&state.pool, gym_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Gym not found".to_string()))?;
    let back = format!("/gym/{}", gym.slug);

    let (text, rating) = match form.validate() {
        Ok(valid) => valid,
        Err(msg) => return Ok(flash::redirect(jar, &back, Flash::error(msg))),
    };

    let review = db::reviews::create(&state.pool, gym.id, user.id, &text, rating).await?;
    tracing::info!("Review {} on {} by {}", review.id, gym.slug, user.id);

    Ok(flash::redirect(jar, &back, Flash::success("Review saved!")))
}
