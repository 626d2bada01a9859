use crate::error::Result;
use crate::models::{Comment, CommentEdit, ModerationFlags};
use async_trait::async_trait;
use sqlx::PgPool;

/// Moderation access to the comment subsystem's store. Comments are never
/// created or hard-deleted from here.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Id of a registered content type (`app_label.model`), if any.
    async fn content_type_id(&self, content_type: &str) -> Result<Option<i32>>;

    /// All comments on objects of a content type, newest submission first.
    async fn list_for_content_type(&self, content_type_id: i32) -> Result<Vec<Comment>>;

    async fn find(&self, comment_id: i64) -> Result<Option<Comment>>;

    /// Persist the editable fields and return the stored row.
    async fn update(&self, comment_id: i64, edit: &CommentEdit) -> Result<Option<Comment>>;

    /// Write only `is_public` and `is_removed`.
    async fn set_flags(&self, comment_id: i64, flags: ModerationFlags) -> Result<Option<Comment>>;

    /// Public comments attached to one object.
    async fn count_public(&self, content_type: &str, object_pk: &str) -> Result<i64>;
}

const COMMENT_COLUMNS: &str = "id, object_pk, user_name, user_email, user_url, comment, \
     submit_date, is_public, is_removed, parent_id, level";

/// Split `app_label.model` into its parts.
pub fn split_content_type(content_type: &str) -> (&str, &str) {
    content_type.split_once('.').unwrap_or(("", content_type))
}

/// PostgreSQL-backed comment repository
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn content_type_id(&self, content_type: &str) -> Result<Option<i32>> {
        let (app_label, model) = split_content_type(content_type);
        let id = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM content_types WHERE app_label = $1 AND model = $2",
        )
        .bind(app_label)
        .bind(model)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_for_content_type(&self, content_type_id: i32) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE content_type_id = $1 ORDER BY submit_date DESC, id DESC",
            COMMENT_COLUMNS
        ))
        .bind(content_type_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn find(&self, comment_id: i64) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn update(&self, comment_id: i64, edit: &CommentEdit) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments
            SET user_name = $1, user_email = $2, user_url = $3, comment = $4,
                is_public = $5, is_removed = $6
            WHERE id = $7
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(&edit.user_name)
        .bind(edit.user_email.as_deref().unwrap_or(""))
        .bind(edit.user_url.as_deref().unwrap_or(""))
        .bind(&edit.comment)
        .bind(edit.is_public)
        .bind(edit.is_removed)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn set_flags(&self, comment_id: i64, flags: ModerationFlags) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments SET is_public = $1, is_removed = $2 WHERE id = $3 RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(flags.is_public)
        .bind(flags.is_removed)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn count_public(&self, content_type: &str, object_pk: &str) -> Result<i64> {
        let (_, model) = split_content_type(content_type);
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM comments c
            JOIN content_types ct ON ct.id = c.content_type_id
            WHERE ct.model = $1 AND c.object_pk = $2 AND c.is_public = TRUE
            "#,
        )
        .bind(model)
        .bind(object_pk)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
