use axum::http::HeaderMap;
use bytes::Bytes;

use crate::geo::Point;
use crate::models::Gym;
use crate::models::gym::GymDraft;

/// Tags offered as checkboxes on the gym form. Any other tag typed into
/// `new_tags` is accepted as well.
pub const TAG_CHOICES: &[&str] = &[
    "Open 24/7",
    "Free Weights",
    "Classes",
    "Showers",
    "Parking",
    "Wifi",
    "Family Friendly",
];

const MAX_NAME_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 5000;
const MAX_TAG_LEN: usize = 50;
const MAX_TAGS: usize = 20;

/// Raw gym form values, as submitted.
#[derive(Debug, Clone, Default)]
pub struct GymForm {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub new_tags: String,
    pub address: String,
    pub lng: String,
    pub lat: String,
}

/// An image part of the multipart body.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct GymSubmission {
    pub form: GymForm,
    pub photo: Option<PhotoUpload>,
}

impl GymForm {
    /// Pre-fill the edit form.
    pub fn from_gym(gym: &Gym) -> Self {
        Self {
            name: gym.name.clone(),
            description: gym.description.clone(),
            tags: gym.tags.clone(),
            new_tags: String::new(),
            address: gym.address.clone(),
            lng: gym.lng.to_string(),
            lat: gym.lat.to_string(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Tags from the form that are not among the checkbox choices.
    pub fn custom_tags(&self) -> String {
        self.tags
            .iter()
            .filter(|t| !TAG_CHOICES.contains(&t.as_str()))
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn validate(&self) -> Result<GymDraft, Vec<String>> {
        let mut errors = Vec::new();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.push("Please enter a gym name!".to_string());
        } else if name.chars().count() > MAX_NAME_LEN {
            errors.push(format!("Gym names are limited to {MAX_NAME_LEN} characters."));
        }

        let description = self.description.trim().to_string();
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            errors.push(format!(
                "Descriptions are limited to {MAX_DESCRIPTION_LEN} characters."
            ));
        }

        let address = self.address.trim().to_string();
        if address.is_empty() {
            errors.push("You must supply an address!".to_string());
        }

        let location = match Point::parse(&self.lng, &self.lat) {
            Ok(point) => Some(point),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let tags = normalize_tags(
            self.tags
                .iter()
                .map(String::as_str)
                .chain(self.new_tags.split(',')),
        );
        if tags.len() > MAX_TAGS {
            errors.push(format!("A gym can have at most {MAX_TAGS} tags."));
        }
        if tags.iter().any(|t| t.chars().count() > MAX_TAG_LEN) {
            errors.push(format!("Tags are limited to {MAX_TAG_LEN} characters."));
        }

        match location {
            Some(location) if errors.is_empty() => Ok(GymDraft {
                name,
                description,
                tags,
                address,
                location,
            }),
            _ => Err(errors),
        }
    }
}

/// Trim, drop empties, de-duplicate keeping first occurrence.
fn normalize_tags<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Parse the multipart gym form using multer.
pub async fn parse_multipart(headers: &HeaderMap, body: Bytes) -> Result<GymSubmission, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = GymForm::default();
    let mut photo = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "photo" {
            let content_type = field
                .content_type()
                .map(|m| m.to_string())
                .unwrap_or_default();
            let data = field
                .bytes()
                .await
                .map_err(|e| format!("Field read error: {e}"))?;
            // Browsers send an empty part when no file was chosen.
            if !data.is_empty() && photo.is_none() {
                photo = Some(PhotoUpload { content_type, data });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| format!("Field read error: {e}"))?;
        match name.as_str() {
            "name" => form.name = value,
            "description" => form.description = value,
            "tags" => form.tags.push(value),
            "new_tags" => form.new_tags = value,
            "address" => form.address = value,
            "lng" => form.lng = value,
            "lat" => form.lat = value,
            _ => {}
        }
    }

    Ok(GymSubmission { form, photo })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> GymForm {
        GymForm {
            name: "  Iron Temple ".to_string(),
            description: " Heavy iron ".to_string(),
            tags: vec!["Wifi".to_string(), "Classes".to_string()],
            new_tags: "Sauna, wifi ,, Wifi".to_string(),
            address: "1 Main St".to_string(),
            lng: "-79.38".to_string(),
            lat: "43.65".to_string(),
        }
    }

    #[test]
    fn valid_form_is_trimmed_and_tags_deduplicated() {
        let draft = valid_form().validate().unwrap();
        assert_eq!(draft.name, "Iron Temple");
        assert_eq!(draft.description, "Heavy iron");
        assert_eq!(draft.tags, vec!["Wifi", "Classes", "Sauna", "wifi"]);
        assert_eq!(draft.location, Point::new(-79.38, 43.65).unwrap());
    }

    #[test]
    fn missing_required_fields_are_all_reported() {
        let form = GymForm {
            lng: "".to_string(),
            lat: "".to_string(),
            ..GymForm::default()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Please enter a gym name!".to_string(),
                "You must supply an address!".to_string(),
                "You must supply coordinates!".to_string(),
            ]
        );
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let form = GymForm {
            lat: "123".to_string(),
            ..valid_form()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn custom_tags_excludes_choices() {
        let mut form = valid_form();
        form.tags.push("Sauna".to_string());
        assert_eq!(form.custom_tags(), "Sauna");
        assert!(form.has_tag("Wifi"));
    }

    #[tokio::test]
    async fn parses_multipart_fields_and_photo() {
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nIron Temple\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"tags\"\r\n\r\nWifi\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"tags\"\r\n\r\nClasses\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"a.png\"\r\n\
             Content-Type: image/png\r\n\r\nPNGDATA\r\n\
             --{b}--\r\n",
            b = boundary
        );
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            format!("multipart/form-data; boundary={boundary}").parse().unwrap(),
        );

        let submission = parse_multipart(&headers, Bytes::from(body)).await.unwrap();
        assert_eq!(submission.form.name, "Iron Temple");
        assert_eq!(submission.form.tags, vec!["Wifi", "Classes"]);
        let photo = submission.photo.unwrap();
        assert_eq!(photo.content_type, "image/png");
        assert_eq!(&photo.data[..], b"PNGDATA");
    }

    #[tokio::test]
    async fn empty_file_part_means_no_photo() {
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\r\n\
             --{b}--\r\n",
            b = boundary
        );
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            format!("multipart/form-data; boundary={boundary}").parse().unwrap(),
        );

        let submission = parse_multipart(&headers, Bytes::from(body)).await.unwrap();
        assert!(submission.photo.is_none());
    }
}
