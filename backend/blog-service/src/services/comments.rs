/// Comment moderation service - listing, editing and visibility toggles
use crate::config::BLOG_POST_CONTENT_TYPE;
use crate::db::{CommentRepository, PageRepository};
use crate::error::{AppError, Result};
use crate::metrics::moderation::COMMENT_MODERATION_TOTAL;
use crate::models::{Comment, CommentEditForm, ModerationAction};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use validator::{Validate, ValidationErrors};

/// Field name to messages; form-level errors live under `__all__`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub fn field_messages(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|err| {
                    err.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", err.code))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Result of submitting the edit form.
#[derive(Debug)]
pub enum EditOutcome {
    Saved(Comment),
    /// The stored comment is unchanged; errors belong to the submitted form.
    Invalid {
        comment: Comment,
        errors: FieldErrors,
    },
}

pub struct CommentModerationService {
    comments: Arc<dyn CommentRepository>,
    pages: Arc<dyn PageRepository>,
}

impl CommentModerationService {
    pub fn new(comments: Arc<dyn CommentRepository>, pages: Arc<dyn PageRepository>) -> Self {
        Self { comments, pages }
    }

    /// Comments on blog posts, newest first. Empty until the blog post
    /// content type is registered.
    pub async fn list(&self) -> Result<Vec<Comment>> {
        match self.comments.content_type_id(BLOG_POST_CONTENT_TYPE).await? {
            Some(content_type_id) => self.comments.list_for_content_type(content_type_id).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn get(&self, comment_id: i64) -> Result<Comment> {
        self.comments
            .find(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {}", comment_id)))
    }

    pub async fn edit(&self, comment_id: i64, form: &CommentEditForm) -> Result<EditOutcome> {
        let comment = self.get(comment_id).await?;

        let edit = form.clean();
        if let Err(errors) = edit.validate() {
            return Ok(EditOutcome::Invalid {
                comment,
                errors: field_messages(&errors),
            });
        }

        let saved = self
            .comments
            .update(comment_id, &edit)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {}", comment_id)))?;
        COMMENT_MODERATION_TOTAL.with_label_values(&["edit"]).inc();
        info!(comment_id, "Comment edited");

        Ok(EditOutcome::Saved(saved))
    }

    /// Apply a visibility toggle and persist only the two flags.
    pub async fn toggle(&self, comment_id: i64, action: ModerationAction) -> Result<Comment> {
        let comment = self.get(comment_id).await?;
        let flags = action.apply(comment.flags());

        let updated = self
            .comments
            .set_flags(comment_id, flags)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {}", comment_id)))?;
        COMMENT_MODERATION_TOTAL
            .with_label_values(&[action.as_str()])
            .inc();
        info!(
            comment_id,
            action = action.as_str(),
            is_public = updated.is_public,
            is_removed = updated.is_removed,
            "Comment moderation flags updated"
        );

        Ok(updated)
    }

    /// Public comment count for the page-listing badge. `None` when nothing
    /// should be shown: not a blog post, comments disabled, or zero comments.
    pub async fn listing_badge(&self, page_id: i64) -> Result<Option<i64>> {
        let post = match self.pages.find_post(page_id).await? {
            Some(post) if post.enable_comments => post,
            _ => return Ok(None),
        };

        let count = self
            .comments
            .count_public(BLOG_POST_CONTENT_TYPE, &post.id.to_string())
            .await?;
        Ok((count > 0).then_some(count))
    }
}
