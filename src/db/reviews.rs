use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Review, ReviewWithAuthor};

pub async fn create(
    pool: &PgPool,
    gym_id: Uuid,
    author_id: Uuid,
    text: &str,
    rating: i16,
) -> Result<Review, sqlx::Error> {
    sqlx::query_as::<_, Review>(
        "INSERT INTO reviews (id, gym_id, author_id, text, rating)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(gym_id)
    .bind(author_id)
    .bind(text)
    .bind(rating)
    .fetch_one(pool)
    .await
}

pub async fn list_for_gym(
    pool: &PgPool,
    gym_id: Uuid,
) -> Result<Vec<ReviewWithAuthor>, sqlx::Error> {
    sqlx::query_as::<_, ReviewWithAuthor>(
        "SELECT r.id, r.author_id, u.name AS author_name, r.text, r.rating, r.created_at
         FROM reviews r
         JOIN users u ON u.id = r.author_id
         WHERE r.gym_id = $1
         ORDER BY r.created_at DESC",
    )
    .bind(gym_id)
    .fetch_all(pool)
    .await
}
