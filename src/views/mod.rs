pub mod account;
pub mod auth;
pub mod gyms;

use askama::Template;
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::CookieJar;

use crate::error::AppError;
use crate::flash::Flash;
use crate::models::{Gym, User};

/// Layout data shared by every page.
pub struct Page {
    pub title: String,
    pub user: Option<UserNav>,
    pub flashes: Vec<Flash>,
}

/// What the header needs to know about the logged-in user.
pub struct UserNav {
    pub name: String,
    pub gravatar: String,
    pub heart_count: usize,
}

impl Page {
    pub fn new(title: impl Into<String>, user: Option<&User>, flashes: Vec<Flash>) -> Self {
        Self {
            title: title.into(),
            user: user.map(|u| UserNav {
                name: u.name.clone(),
                gravatar: u.gravatar(),
                heart_count: u.hearts.len(),
            }),
            flashes,
        }
    }

    pub fn anonymous(title: impl Into<String>) -> Self {
        Self::new(title, None, Vec::new())
    }
}

/// Render `template` and send back the jar (which carries consumed flashes).
pub fn render<T: Template>(jar: CookieJar, template: &T) -> Result<Response, AppError> {
    let html = template.render()?;
    Ok((jar, Html(html)).into_response())
}

/// Gym as shown in a card or list.
pub struct GymCard {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub excerpt: String,
    pub address: String,
    pub photo_url: String,
    pub hearted: bool,
    pub can_edit: bool,
}

const EXCERPT_WORDS: usize = 25;

impl GymCard {
    pub fn new(gym: &Gym, viewer: Option<&User>) -> Self {
        Self {
            id: gym.id.to_string(),
            name: gym.name.clone(),
            slug: gym.slug.clone(),
            excerpt: excerpt(&gym.description, EXCERPT_WORDS),
            address: gym.address.clone(),
            photo_url: photo_url(gym.photo.as_deref()),
            hearted: viewer.is_some_and(|u| u.has_hearted(gym.id)),
            can_edit: viewer.is_some_and(|u| u.id == gym.author_id),
        }
    }

    pub fn list(gyms: &[Gym], viewer: Option<&User>) -> Vec<Self> {
        gyms.iter().map(|g| Self::new(g, viewer)).collect()
    }
}

pub fn photo_url(photo: Option<&str>) -> String {
    match photo {
        Some(file) => format!("/uploads/{file}"),
        None => "/static/images/gym.svg".to_string(),
    }
}

/// First `words` words of `text`, with an ellipsis when cut.
pub fn excerpt(text: &str, words: usize) -> String {
    let mut parts = text.split_whitespace();
    let head: Vec<&str> = parts.by_ref().take(words).collect();
    let mut out = head.join(" ");
    if parts.next().is_some() {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_cuts_on_word_boundary() {
        assert_eq!(excerpt("one two three", 2), "one two…");
        assert_eq!(excerpt("one  two", 2), "one two");
        assert_eq!(excerpt("", 5), "");
    }

    #[test]
    fn photo_url_falls_back_to_placeholder() {
        assert_eq!(photo_url(Some("a.png")), "/uploads/a.png");
        assert_eq!(photo_url(None), "/static/images/gym.svg");
    }
}
