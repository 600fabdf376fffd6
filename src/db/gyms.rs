use sqlx::PgPool;
use uuid::Uuid;

use crate::geo::Point;
use crate::models::gym::GymDraft;
use crate::models::{Gym, GymDistance, TagCount, TopGym};

// `location` and `search` are generated columns and stay out of row mapping.
const COLUMNS: &str =
    "id, name, slug, description, tags, created_at, address, lng, lat, photo, author_id";

pub async fn list(pool: &PgPool) -> Result<Vec<Gym>, sqlx::Error> {
    sqlx::query_as::<_, Gym>(&format!(
        "SELECT {COLUMNS} FROM gyms ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Gym>, sqlx::Error> {
    sqlx::query_as::<_, Gym>(&format!("SELECT {COLUMNS} FROM gyms WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Gym>, sqlx::Error> {
    sqlx::query_as::<_, Gym>(&format!("SELECT {COLUMNS} FROM gyms WHERE slug = $1"))
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Gym>, sqlx::Error> {
    sqlx::query_as::<_, Gym>(&format!(
        "SELECT {COLUMNS} FROM gyms WHERE id = ANY($1) ORDER BY created_at DESC"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
}

/// Slugs matching `pattern` case-insensitively, ignoring gym `exclude`.
pub async fn slugs_matching(
    pool: &PgPool,
    pattern: &str,
    exclude: Option<Uuid>,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT slug FROM gyms WHERE slug ~* $1 AND ($2::uuid IS NULL OR id <> $2)",
    )
    .bind(pattern)
    .bind(exclude)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    draft: &GymDraft,
    slug: &str,
    photo: Option<&str>,
    author_id: Uuid,
) -> Result<Gym, sqlx::Error> {
    sqlx::query_as::<_, Gym>(&format!(
        "INSERT INTO gyms (id, name, slug, description, tags, address, lng, lat, photo, author_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {COLUMNS}"
    ))
    .bind(Uuid::now_v7())
    .bind(&draft.name)
    .bind(slug)
    .bind(&draft.description)
    .bind(&draft.tags)
    .bind(&draft.address)
    .bind(draft.location.lng)
    .bind(draft.location.lat)
    .bind(photo)
    .bind(author_id)
    .fetch_one(pool)
    .await
}

/// Overwrite the editable fields. A `None` photo keeps the current one.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    draft: &GymDraft,
    slug: &str,
    photo: Option<&str>,
) -> Result<Gym, sqlx::Error> {
    sqlx::query_as::<_, Gym>(&format!(
        "UPDATE gyms
         SET name = $2, slug = $3, description = $4, tags = $5, address = $6,
             lng = $7, lat = $8, photo = COALESCE($9, photo)
         WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(&draft.name)
    .bind(slug)
    .bind(&draft.description)
    .bind(&draft.tags)
    .bind(&draft.address)
    .bind(draft.location.lng)
    .bind(draft.location.lat)
    .bind(photo)
    .fetch_one(pool)
    .await
}

/// Every tag in use with the number of gyms carrying it, most used first.
pub async fn tags_list(pool: &PgPool) -> Result<Vec<TagCount>, sqlx::Error> {
    sqlx::query_as::<_, TagCount>(
        "SELECT tag, COUNT(*) AS count
         FROM gyms, unnest(tags) AS tag
         GROUP BY tag
         ORDER BY count DESC, tag ASC",
    )
    .fetch_all(pool)
    .await
}

/// Gyms carrying `tag`, or any tag at all when `None`.
pub async fn list_by_tag(pool: &PgPool, tag: Option<&str>) -> Result<Vec<Gym>, sqlx::Error> {
    match tag {
        Some(tag) => {
            sqlx::query_as::<_, Gym>(&format!(
                "SELECT {COLUMNS} FROM gyms WHERE $1 = ANY(tags) ORDER BY created_at DESC"
            ))
            .bind(tag)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Gym>(&format!(
                "SELECT {COLUMNS} FROM gyms WHERE cardinality(tags) > 0 ORDER BY created_at DESC"
            ))
            .fetch_all(pool)
            .await
        }
    }
}

/// Full-text search over name and description, best match first.
pub async fn search(pool: &PgPool, query: &str, limit: i64) -> Result<Vec<Gym>, sqlx::Error> {
    sqlx::query_as::<_, Gym>(&format!(
        "SELECT {COLUMNS} FROM gyms
         WHERE search @@ plainto_tsquery('english', $1)
         ORDER BY ts_rank(search, plainto_tsquery('english', $1)) DESC, created_at DESC
         LIMIT $2"
    ))
    .bind(query)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Gyms within `radius_m` metres of `center`, nearest first.
pub async fn near(
    pool: &PgPool,
    center: Point,
    radius_m: f64,
    limit: i64,
) -> Result<Vec<GymDistance>, sqlx::Error> {
    sqlx::query_as::<_, GymDistance>(&format!(
        "WITH origin AS (
             SELECT ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography AS point
         )
         SELECT {COLUMNS}, ST_Distance(gyms.location, origin.point) AS distance
         FROM gyms, origin
         WHERE ST_DWithin(gyms.location, origin.point, $3)
         ORDER BY distance
         LIMIT $4"
    ))
    .bind(center.lng)
    .bind(center.lat)
    .bind(radius_m)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Gyms with at least two reviews, highest average rating first.
pub async fn top_rated(pool: &PgPool, limit: i64) -> Result<Vec<TopGym>, sqlx::Error> {
    sqlx::query_as::<_, TopGym>(
        "SELECT g.id, g.name, g.slug, g.photo,
                COUNT(r.id) AS review_count,
                AVG(r.rating)::float8 AS average_rating
         FROM gyms g
         JOIN reviews r ON r.gym_id = g.id
         GROUP BY g.id
         HAVING COUNT(r.id) >= 2
         ORDER BY average_rating DESC, review_count DESC
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
