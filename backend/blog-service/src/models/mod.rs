/// Data models for blog-service
///
/// - Page types: blog index (category) pages, blog post pages, and the
///   aggregates shown in listing sidebars
/// - Filters: post scope and the listing's search/tag/month criteria
/// - Comment: moderation view of the external comment entity
pub mod comment;
pub mod filter;
pub mod page;

pub use comment::{
    format_submit_date, Comment, CommentEdit, CommentEditForm, CommentEditResponse,
    ModerationAction, ModerationFlags, ModerationResponse,
};
pub use filter::{MonthFilter, PostQuery, PostScope};
pub use page::{
    ArchiveMonth, BlogIndexPage, BlogPage, CategoryLink, Listable, NewBlogPage, NewIndexPage,
    PostCard, RecentPost, TagCount,
};
