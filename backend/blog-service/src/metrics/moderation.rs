use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Moderation writes by action (edit, toggle_public, toggle_removed).
    pub static ref COMMENT_MODERATION_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_comment_moderation_total",
        "Comment moderation writes segmented by action",
        &["action"]
    )
    .expect("failed to register blog_comment_moderation_total");
}
