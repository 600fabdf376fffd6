use askama::Template;
use axum::extract::{Path, State};
use axum::response::Response;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::extractor::CurrentUser;
use crate::db;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::forms::gym::{GymForm, TAG_CHOICES};
use crate::models::{Gym, User};
use crate::models::review::{MAX_RATING, MIN_RATING};
use crate::state::SharedState;
use crate::views::{GymCard, Page, photo_url, render};

const TOP_LIMIT: i64 = 10;

#[derive(Template)]
#[template(path = "gyms.html")]
struct GymsTemplate {
    page: Page,
    gyms: Vec<GymCard>,
    empty_message: String,
}

#[derive(Template)]
#[template(path = "edit_gym.html")]
struct GymFormTemplate {
    page: Page,
    action: String,
    form: GymForm,
    tag_choices: Vec<TagChoice>,
    custom_tags: String,
    current_photo: Option<String>,
    view_url: Option<String>,
}

struct TagChoice {
    name: String,
    checked: bool,
}

#[derive(Template)]
#[template(path = "gym.html")]
struct GymTemplate {
    page: Page,
    gym: GymDetail,
    reviews: Vec<ReviewView>,
    logged_in: bool,
    hearted: bool,
    can_edit: bool,
    ratings: Vec<i16>,
}

struct GymDetail {
    id: String,
    name: String,
    description: String,
    address: String,
    photo_url: String,
    tags: Vec<String>,
    created: String,
    author_name: String,
    author_gravatar: String,
    lng: f64,
    lat: f64,
}

struct ReviewView {
    author_name: String,
    text: String,
    stars: String,
    created: String,
}

#[derive(Template)]
#[template(path = "tags.html")]
struct TagsTemplate {
    page: Page,
    tags: Vec<TagView>,
    gyms: Vec<GymCard>,
}

struct TagView {
    name: String,
    count: i64,
    active: bool,
}

#[derive(Template)]
#[template(path = "top_gyms.html")]
struct TopGymsTemplate {
    page: Page,
    gyms: Vec<TopRow>,
}

struct TopRow {
    rank: usize,
    name: String,
    slug: String,
    photo_url: String,
    review_count: i64,
    average: String,
}

#[derive(Template)]
#[template(path = "map.html")]
struct MapTemplate {
    page: Page,
}

pub async fn index(
    State(state): State<SharedState>,
    user: Option<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let user = user.map(|u| u.0);
    let gyms = db::gyms::list(&state.pool).await?;

    let (jar, flashes) = flash::take(jar);
    let template = GymsTemplate {
        page: Page::new("Gyms", user.as_ref(), flashes),
        gyms: GymCard::list(&gyms, user.as_ref()),
        empty_message: "No gyms yet. Be the first to add one!".to_string(),
    };
    render(jar, &template)
}

pub async fn hearts(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let gyms = db::gyms::list_by_ids(&state.pool, &user.hearts).await?;

    let (jar, flashes) = flash::take(jar);
    let template = GymsTemplate {
        page: Page::new("Hearted Gyms", Some(&user), flashes),
        gyms: GymCard::list(&gyms, Some(&user)),
        empty_message: "You haven't hearted any gyms yet.".to_string(),
    };
    render(jar, &template)
}

pub async fn add_page(CurrentUser(user): CurrentUser, jar: CookieJar) -> Result<Response, AppError> {
    render_gym_form(jar, &user, GymForm::default(), None, Vec::new())
}

pub async fn edit_page(
    State(state): State<SharedState>,
    current: CurrentUser,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let gym = db::gyms::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Gym not found".to_string()))?;
    current.require_owner(gym.author_id)?;

    render_gym_form(jar, &current.0, GymForm::from_gym(&gym), Some(&gym), Vec::new())
}

/// Add form when `existing` is `None`, edit form otherwise. `errors` become
/// error flashes alongside any pending ones.
pub fn render_gym_form(
    jar: CookieJar,
    user: &User,
    form: GymForm,
    existing: Option<&Gym>,
    errors: Vec<String>,
) -> Result<Response, AppError> {
    let (jar, mut flashes) = flash::take(jar);
    flashes.extend(errors.into_iter().map(Flash::error));

    let (title, action) = match existing {
        Some(gym) => (format!("Edit: {}", gym.name), format!("/add/{}", gym.id)),
        None => ("👊 Add Gym".to_string(), "/add".to_string()),
    };

    let tag_choices = TAG_CHOICES
        .iter()
        .map(|t| TagChoice {
            name: t.to_string(),
            checked: form.has_tag(t),
        })
        .collect();

    let template = GymFormTemplate {
        page: Page::new(title, Some(user), flashes),
        action,
        custom_tags: form.custom_tags(),
        tag_choices,
        form,
        current_photo: existing.and_then(|g| g.photo.as_deref()).map(|p| photo_url(Some(p))),
        view_url: existing.map(|g| format!("/gym/{}", g.slug)),
    };
    render(jar, &template)
}

pub async fn show(
    State(state): State<SharedState>,
    user: Option<CurrentUser>,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let user = user.map(|u| u.0);
    let gym = db::gyms::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Gym not found".to_string()))?;

    let author = db::users::find_by_id(&state.pool, gym.author_id).await?;
    let reviews = db::reviews::list_for_gym(&state.pool, gym.id).await?;

    let (jar, flashes) = flash::take(jar);
    let template = GymTemplate {
        page: Page::new(gym.name.clone(), user.as_ref(), flashes),
        logged_in: user.is_some(),
        hearted: user.as_ref().is_some_and(|u| u.has_hearted(gym.id)),
        can_edit: user.as_ref().is_some_and(|u| u.id == gym.author_id),
        ratings: (MIN_RATING..=MAX_RATING).rev().collect(),
        reviews: reviews
            .into_iter()
            .map(|r| ReviewView {
                author_name: r.author_name,
                text: r.text,
                stars: stars(r.rating),
                created: r.created_at.format("%d %B %Y").to_string(),
            })
            .collect(),
        gym: GymDetail {
            id: gym.id.to_string(),
            photo_url: photo_url(gym.photo.as_deref()),
            created: gym.created_at.format("%d %B %Y").to_string(),
            author_name: author
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            author_gravatar: author.as_ref().map(User::gravatar).unwrap_or_default(),
            lng: gym.lng,
            lat: gym.lat,
            name: gym.name,
            description: gym.description,
            address: gym.address,
            tags: gym.tags,
        },
    };
    render(jar, &template)
}

pub async fn tags(
    State(state): State<SharedState>,
    user: Option<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    render_tags(state, user, jar, None).await
}

pub async fn tag(
    State(state): State<SharedState>,
    user: Option<CurrentUser>,
    jar: CookieJar,
    Path(tag): Path<String>,
) -> Result<Response, AppError> {
    render_tags(state, user, jar, Some(tag)).await
}

async fn render_tags(
    state: SharedState,
    user: Option<CurrentUser>,
    jar: CookieJar,
    tag: Option<String>,
) -> Result<Response, AppError> {
    let user = user.map(|u| u.0);
    let (tags, gyms) = tokio::try_join!(
        db::gyms::tags_list(&state.pool),
        db::gyms::list_by_tag(&state.pool, tag.as_deref()),
    )?;

    let title = match &tag {
        Some(t) => format!("Tags: {t}"),
        None => "Tags".to_string(),
    };

    let (jar, flashes) = flash::take(jar);
    let template = TagsTemplate {
        page: Page::new(title, user.as_ref(), flashes),
        tags: tags
            .into_iter()
            .map(|t| TagView {
                active: tag.as_deref() == Some(t.tag.as_str()),
                name: t.tag,
                count: t.count,
            })
            .collect(),
        gyms: GymCard::list(&gyms, user.as_ref()),
    };
    render(jar, &template)
}

pub async fn top(
    State(state): State<SharedState>,
    user: Option<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let user = user.map(|u| u.0);
    let top = db::gyms::top_rated(&state.pool, TOP_LIMIT).await?;

    let (jar, flashes) = flash::take(jar);
    let template = TopGymsTemplate {
        page: Page::new("⭐ Top Gyms!", user.as_ref(), flashes),
        gyms: top
            .into_iter()
            .enumerate()
            .map(|(i, g)| TopRow {
                rank: i + 1,
                photo_url: photo_url(g.photo.as_deref()),
                name: g.name,
                slug: g.slug,
                review_count: g.review_count,
                average: format!("{:.1}", g.average_rating),
            })
            .collect(),
    };
    render(jar, &template)
}

pub async fn map_page(user: Option<CurrentUser>, jar: CookieJar) -> Result<Response, AppError> {
    let (jar, flashes) = flash::take(jar);
    let user = user.map(|u| u.0);
    let template = MapTemplate {
        page: Page::new("Map", user.as_ref(), flashes),
    };
    render(jar, &template)
}

/// Five-slot star string, e.g. `★★★☆☆` for 3.
fn stars(rating: i16) -> String {
    let filled = rating.clamp(0, MAX_RATING) as usize;
    let empty = MAX_RATING as usize - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_fill_left_to_right() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(5), "★★★★★");
        assert_eq!(stars(9), "★★★★★");
    }
}
