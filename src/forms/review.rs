use serde::Deserialize;

use crate::models::review::{MAX_RATING, MIN_RATING};

const MAX_TEXT_LEN: usize = 2000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub rating: String,
}

impl ReviewForm {
    /// Trimmed text and a rating within 1..=5.
    pub fn validate(&self) -> Result<(String, i16), String> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err("Your review must have some text!".to_string());
        }
        if text.chars().count() > MAX_TEXT_LEN {
            return Err(format!("Reviews are limited to {MAX_TEXT_LEN} characters."));
        }

        let rating: i16 = self
            .rating
            .trim()
            .parse()
            .map_err(|_| "Please pick a rating!".to_string())?;
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}."
            ));
        }

        Ok((text.to_string(), rating))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(text: &str, rating: &str) -> ReviewForm {
        ReviewForm {
            text: text.to_string(),
            rating: rating.to_string(),
        }
    }

    #[test]
    fn accepts_rating_in_range() {
        assert_eq!(
            form("  Great squat racks ", "5").validate().unwrap(),
            ("Great squat racks".to_string(), 5)
        );
    }

    #[test]
    fn rejects_bad_ratings_and_empty_text() {
        assert!(form("ok", "0").validate().is_err());
        assert!(form("ok", "6").validate().is_err());
        assert!(form("ok", "").validate().is_err());
        assert!(form("   ", "3").validate().is_err());
    }
}
