use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Point;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Gym {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub address: String,
    pub lng: f64,
    pub lat: f64,
    pub photo: Option<String>,
    pub author_id: Uuid,
}

/// Validated user input for creating or editing a gym.
#[derive(Debug, Clone, PartialEq)]
pub struct GymDraft {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub address: String,
    pub location: Point,
}

/// GeoJSON-style point plus the human address.
#[derive(Debug, Clone, Serialize)]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: [f64; 2],
    pub address: String,
}

/// Public JSON shape of a gym.
#[derive(Debug, Clone, Serialize)]
pub struct GymResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub location: Location,
    pub photo: Option<String>,
    pub author: Uuid,
}

impl From<Gym> for GymResponse {
    fn from(gym: Gym) -> Self {
        Self {
            id: gym.id,
            name: gym.name,
            slug: gym.slug,
            description: gym.description,
            tags: gym.tags,
            created_at: gym.created_at,
            location: Location {
                kind: "Point",
                coordinates: [gym.lng, gym.lat],
                address: gym.address,
            },
            photo: gym.photo,
            author: gym.author_id,
        }
    }
}

/// A gym returned by the proximity search, with its distance in metres.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyGym {
    #[serde(flatten)]
    pub gym: GymResponse,
    pub distance: f64,
}

/// Row shape of the proximity query: the gym plus `ST_Distance` in metres.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GymDistance {
    #[sqlx(flatten)]
    pub gym: Gym,
    pub distance: f64,
}

impl From<GymDistance> for NearbyGym {
    fn from(row: GymDistance) -> Self {
        Self {
            gym: row.gym.into(),
            distance: row.distance.round(),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct TopGym {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub photo: Option<String>,
    pub review_count: i64,
    pub average_rating: f64,
}
