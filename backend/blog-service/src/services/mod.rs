/// Business logic layer for blog-service
///
/// - listing: index page context (filters, pagination, sidebar widgets)
/// - feed: RSS documents for the site and for single categories
/// - comments: moderation of comments on blog posts
/// - pages: creation of index and post pages
pub mod comments;
pub mod feed;
pub mod listing;
pub mod pages;
pub mod pagination;

pub use comments::{CommentModerationService, EditOutcome};
pub use feed::FeedService;
pub use listing::{ListingContext, ListingParams, ListingService};
pub use pages::PageService;
pub use pagination::{PageInfo, Paginator};
