//! Comments owned by the threaded comment subsystem, as seen by moderators.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// `submit_date` rendering used by every moderation response.
pub const SUBMIT_DATE_FORMAT: &str = "%d %b %Y %H:%M";

pub const MAX_USER_NAME_LEN: u64 = 50;
pub const MAX_EMAIL_LEN: u64 = 254;
pub const MAX_COMMENT_LEN: u64 = 3000;

pub fn format_submit_date(date: &DateTime<Utc>) -> String {
    date.format(SUBMIT_DATE_FORMAT).to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    /// Primary key of the commented object, stored as text.
    pub object_pk: String,
    pub user_name: String,
    pub user_email: String,
    pub user_url: String,
    pub comment: String,
    pub submit_date: DateTime<Utc>,
    pub is_public: bool,
    pub is_removed: bool,
    pub parent_id: Option<i64>,
    pub level: i32,
}

impl Comment {
    pub fn flags(&self) -> ModerationFlags {
        ModerationFlags {
            is_public: self.is_public,
            is_removed: self.is_removed,
        }
    }
}

/// Visibility flags of a comment. A comment is never public and removed at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationFlags {
    pub is_public: bool,
    pub is_removed: bool,
}

impl ModerationFlags {
    /// Flip `is_public`; publishing also restores a removed comment.
    pub fn toggle_public(self) -> Self {
        let is_public = !self.is_public;
        Self {
            is_public,
            is_removed: if is_public { false } else { self.is_removed },
        }
    }

    /// Flip `is_removed`; removing also hides the comment.
    pub fn toggle_removed(self) -> Self {
        let is_removed = !self.is_removed;
        Self {
            is_public: if is_removed { false } else { self.is_public },
            is_removed,
        }
    }
}

/// Which moderation toggle a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    TogglePublic,
    ToggleRemoved,
}

impl ModerationAction {
    pub fn apply(self, flags: ModerationFlags) -> ModerationFlags {
        match self {
            ModerationAction::TogglePublic => flags.toggle_public(),
            ModerationAction::ToggleRemoved => flags.toggle_removed(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModerationAction::TogglePublic => "toggle_public",
            ModerationAction::ToggleRemoved => "toggle_removed",
        }
    }
}

/// Body of the toggle endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationResponse {
    pub ok: bool,
    pub id: i64,
    pub is_public: bool,
    pub is_removed: bool,
    pub submit_date: String,
}

impl From<&Comment> for ModerationResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            ok: true,
            id: comment.id,
            is_public: comment.is_public,
            is_removed: comment.is_removed,
            submit_date: format_submit_date(&comment.submit_date),
        }
    }
}

/// Body of a successful edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentEditResponse {
    pub ok: bool,
    pub id: i64,
    pub user_name: String,
    pub user_email: String,
    pub comment: String,
    pub is_public: bool,
    pub is_removed: bool,
    pub submit_date: String,
}

impl From<&Comment> for CommentEditResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            ok: true,
            id: comment.id,
            user_name: comment.user_name.clone(),
            user_email: comment.user_email.clone(),
            comment: comment.comment.clone(),
            is_public: comment.is_public,
            is_removed: comment.is_removed,
            submit_date: format_submit_date(&comment.submit_date),
        }
    }
}

/// Raw urlencoded edit form. Checkboxes are present only when ticked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentEditForm {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_url: String,
    #[serde(default)]
    pub comment: String,
    pub is_public: Option<String>,
    pub is_removed: Option<String>,
}

fn checkbox(value: &Option<String>) -> bool {
    match value.as_deref().map(str::trim) {
        None => false,
        Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "" | "false" | "0" | "off"),
    }
}

fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl CommentEditForm {
    /// Build the form from decoded urlencoded pairs. A repeated field keeps
    /// its last value, so a hidden `false` followed by a ticked checkbox
    /// reads as ticked. Unknown fields are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "user_name" => form.user_name = value,
                "user_email" => form.user_email = value,
                "user_url" => form.user_url = value,
                "comment" => form.comment = value,
                "is_public" => form.is_public = Some(value),
                "is_removed" => form.is_removed = Some(value),
                _ => {}
            }
        }
        form
    }

    /// Prefill the form from a stored comment.
    pub fn from_comment(comment: &Comment) -> Self {
        let tick = |on: bool| if on { Some("on".to_string()) } else { None };
        Self {
            user_name: comment.user_name.clone(),
            user_email: comment.user_email.clone(),
            user_url: comment.user_url.clone(),
            comment: comment.comment.clone(),
            is_public: tick(comment.is_public),
            is_removed: tick(comment.is_removed),
        }
    }

    pub fn is_public_checked(&self) -> bool {
        checkbox(&self.is_public)
    }

    pub fn is_removed_checked(&self) -> bool {
        checkbox(&self.is_removed)
    }

    pub fn clean(&self) -> CommentEdit {
        CommentEdit {
            user_name: self.user_name.trim().to_string(),
            user_email: blank_to_none(&self.user_email),
            user_url: blank_to_none(&self.user_url),
            comment: self.comment.trim().to_string(),
            is_public: self.is_public_checked(),
            is_removed: self.is_removed_checked(),
        }
    }
}

/// Cleaned edit form; the only shape that reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
#[validate(schema(function = "validate_exclusive_flags", skip_on_field_errors = false))]
pub struct CommentEdit {
    #[validate(length(max = 50, message = "Ensure this value has at most 50 characters"))]
    pub user_name: String,
    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 254, message = "Ensure this value has at most 254 characters")
    )]
    pub user_email: Option<String>,
    #[validate(url(message = "Enter a valid URL"))]
    pub user_url: Option<String>,
    #[validate(length(min = 1, max = 3000, message = "This field is required and may not exceed 3000 characters"))]
    pub comment: String,
    pub is_public: bool,
    pub is_removed: bool,
}

fn validate_exclusive_flags(edit: &CommentEdit) -> Result<(), ValidationError> {
    if edit.is_public && edit.is_removed {
        let mut err = ValidationError::new("public_and_removed");
        err.message = Some("A comment cannot be public and removed at the same time".into());
        return Err(err);
    }
    Ok(())
}

impl CommentEdit {
    pub fn flags(&self) -> ModerationFlags {
        ModerationFlags {
            is_public: self.is_public,
            is_removed: self.is_removed,
        }
    }
}
