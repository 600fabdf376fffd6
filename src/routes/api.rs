use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extractor::ApiUser;
use crate::db;
use crate::error::{ApiError, AppError};
use crate::geo::{self, Point};
use crate::models::{GymResponse, NearbyGym};
use crate::state::SharedState;

const SEARCH_LIMIT: i64 = 5;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct NearQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

#[derive(Serialize)]
pub struct HeartResponse {
    pub hearted: bool,
    pub hearts: Vec<Uuid>,
}

pub async fn search(
    State(state): State<SharedState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<GymResponse>>, ApiError> {
    let q = query.q.trim();
    if q.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let gyms = db::gyms::search(&state.pool, q, SEARCH_LIMIT).await?;
    Ok(Json(gyms.into_iter().map(GymResponse::from).collect()))
}

pub async fn near(
    State(state): State<SharedState>,
    Query(query): Query<NearQuery>,
) -> Result<Json<Vec<NearbyGym>>, ApiError> {
    let (Some(lng), Some(lat)) = (query.lng.as_deref(), query.lat.as_deref()) else {
        return Err(AppError::BadRequest("lat and lng are required".to_string()).into());
    };
    let center = Point::parse(lng, lat).map_err(AppError::BadRequest)?;

    let nearby = db::gyms::near(&state.pool, center, geo::NEAR_RADIUS_M, geo::NEAR_LIMIT)
        .await?
        .into_iter()
        .map(NearbyGym::from)
        .collect();

    Ok(Json(nearby))
}

pub async fn heart(
    State(state): State<SharedState>,
    ApiUser(user): ApiUser,
    Path(gym_id): Path<Uuid>,
) -> Result<Json<HeartResponse>, ApiError> {
    if db::gyms::find_by_id(&state.pool, gym_id).await?.is_none() {
        return Err(AppError::NotFound("Gym not found".to_string()).into());
    }

    let updated = db::users::toggle_heart(&state.pool, user.id, gym_id).await?;
    Ok(Json(HeartResponse {
        hearted: updated.has_hearted(gym_id),
        hearts: updated.hearts,
    }))
}
