use chrono::{DateTime, Utc};

use super::error::DomainError;

const TITLE_MAX_CHARS: usize = 256;
const IMAGE_MAX_CHARS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AuthorRef {
    pub(crate) id: i64,
    pub(crate) username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryRef {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocationRef {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) is_published: bool,
}

/// A post as read back from storage, already annotated with the number of
/// comments attached to it.
#[derive(Debug, Clone)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) is_published: bool,
    pub(crate) author: AuthorRef,
    pub(crate) category: Option<CategoryRef>,
    pub(crate) location: Option<LocationRef>,
    pub(crate) image: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) comment_count: i64,
}

impl Post {
    pub(crate) fn is_authored_by(&self, user_id: i64) -> bool {
        self.author.id == user_id
    }
}

/// Author-editable fields of a post. Publication flags are managed outside
/// of the author's form.
#[derive(Debug, Clone)]
pub(crate) struct PostRequest {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: Option<DateTime<Utc>>,
    pub(crate) category_id: Option<i64>,
    pub(crate) location_id: Option<i64>,
    pub(crate) image: Option<String>,
}

impl PostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            text: normalize_text(&self.text)?,
            pub_date: self.pub_date,
            category_id: validate_optional_id("category", self.category_id)?,
            location_id: validate_optional_id("location", self.location_id)?,
            image: normalize_image(self.image)?,
        })
    }
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > TITLE_MAX_CHARS {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..256 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_text(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::Validation {
            field: "text",
            message: "must not be empty",
        });
    }
    Ok(text.to_string())
}

fn validate_optional_id(field: &'static str, id: Option<i64>) -> Result<Option<i64>, DomainError> {
    match id {
        Some(value) if value <= 0 => Err(DomainError::Validation {
            field,
            message: "select a valid choice",
        }),
        other => Ok(other),
    }
}

fn normalize_image(image: Option<String>) -> Result<Option<String>, DomainError> {
    let Some(image) = image else {
        return Ok(None);
    };
    let image = image.trim();
    if image.is_empty() {
        return Ok(None);
    }
    if image.chars().count() > IMAGE_MAX_CHARS {
        return Err(DomainError::Validation {
            field: "image",
            message: "must be at most 255 chars",
        });
    }
    Ok(Some(image.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{DomainError, PostRequest};

    fn request(title: &str, text: &str) -> PostRequest {
        PostRequest {
            title: title.to_string(),
            text: text.to_string(),
            pub_date: None,
            category_id: None,
            location_id: None,
            image: None,
        }
    }

    #[test]
    fn post_request_validate_rejects_empty_title() {
        let err = request("   ", "valid text")
            .validate()
            .expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn post_request_validate_rejects_too_long_title() {
        let err = request(&"x".repeat(257), "valid text")
            .validate()
            .expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn post_request_validate_rejects_empty_text() {
        let err = request("title", " \n ")
            .validate()
            .expect_err("text must be rejected");
        assert_validation_field(err, "text");
    }

    #[test]
    fn post_request_validate_normalizes_fields() {
        let mut req = request("  title  ", "  text  ");
        req.image = Some("   ".to_string());

        let validated = req.validate().expect("must validate");
        assert_eq!(validated.title, "title");
        assert_eq!(validated.text, "text");
        assert_eq!(validated.image, None);
    }

    #[test]
    fn post_request_validate_rejects_non_positive_category() {
        let mut req = request("title", "text");
        req.category_id = Some(0);

        let err = req.validate().expect_err("category must be rejected");
        assert_validation_field(err, "category");
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
