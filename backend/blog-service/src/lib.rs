/// Blog Service Library
///
/// Serves the blog section of the Runutin site: index (category) pages with
/// search, tag and month filters, RSS feeds, and the admin endpoints used to
/// create pages and moderate comments.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route registration
/// - `models`: Page, filter and comment data structures
/// - `services`: Business logic layer
/// - `db`: Repository traits and PostgreSQL implementations
/// - `html`: Admin HTML fragments
/// - `middleware`: Admin authentication
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod html;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use config::{AdminConfig, CommentsConfig, SiteConfig};
use db::{CommentRepository, PageRepository};
use std::sync::Arc;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pages: Arc<dyn PageRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub site: SiteConfig,
    pub admin: AdminConfig,
    pub comment_settings: CommentsConfig,
}

impl AppState {
    pub fn new(
        pages: Arc<dyn PageRepository>,
        comments: Arc<dyn CommentRepository>,
        config: &Config,
    ) -> Self {
        Self {
            pages,
            comments,
            site: config.site.clone(),
            admin: config.admin.clone(),
            comment_settings: config.comments.clone(),
        }
    }
}
