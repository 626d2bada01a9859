//! Shared fixtures for blog-service HTTP tests
#![allow(dead_code)]

pub mod memory_store;

use actix_web::web;
use blog_service::config::{AdminConfig, CommentsConfig, SiteConfig};
use blog_service::AppState;
use memory_store::{MemoryCommentStore, MemoryPageStore};
use std::sync::Arc;

pub const ADMIN_TOKEN: &str = "test-admin-token";

pub fn site_config() -> SiteConfig {
    SiteConfig {
        root_url: Some("https://runutin.test".to_string()),
        feed_title: "Runutin Blog".to_string(),
        feed_description: "RSS feed for the latest blog posts".to_string(),
        blog_link: "/blog/".to_string(),
    }
}

pub fn state_with_token(
    pages: &MemoryPageStore,
    comments: &MemoryCommentStore,
    api_token: Option<&str>,
) -> web::Data<AppState> {
    web::Data::new(AppState {
        pages: Arc::new(pages.clone()),
        comments: Arc::new(comments.clone()),
        site: site_config(),
        admin: AdminConfig {
            api_token: api_token.map(str::to_string),
        },
        comment_settings: CommentsConfig::default(),
    })
}

/// State whose admin routes accept [`ADMIN_TOKEN`].
pub fn state(pages: &MemoryPageStore, comments: &MemoryCommentStore) -> web::Data<AppState> {
    state_with_token(pages, comments, Some(ADMIN_TOKEN))
}

pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", ADMIN_TOKEN))
}
