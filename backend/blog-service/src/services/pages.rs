/// Page service - creation of blog index and post pages
use crate::db::PageRepository;
use crate::error::Result;
use crate::models::{BlogIndexPage, BlogPage, NewBlogPage, NewIndexPage};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// Confirmation shown to the editor after a post is created.
pub fn creation_notice(title: &str, enable_comments: bool) -> String {
    format!(
        "Page \"{}\" created. Comments {}.",
        title,
        if enable_comments { "enabled" } else { "disabled" }
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedPost {
    pub page: BlogPage,
    pub message: String,
}

pub struct PageService {
    pages: Arc<dyn PageRepository>,
}

impl PageService {
    pub fn new(pages: Arc<dyn PageRepository>) -> Self {
        Self { pages }
    }

    pub async fn create_index_page(&self, page: &NewIndexPage) -> Result<BlogIndexPage> {
        page.validate()?;

        let created = self.pages.create_index_page(page).await?;
        info!(page_id = created.id, title = %created.title, "Blog index page created");
        Ok(created)
    }

    pub async fn create_post(&self, parent_id: i64, page: &NewBlogPage) -> Result<CreatedPost> {
        page.validate()?;

        let created = self.pages.create_post(parent_id, page).await?;
        let message = creation_notice(&created.title, created.enable_comments);
        info!(page_id = created.id, parent_id, "{}", message);

        Ok(CreatedPost {
            page: created,
            message,
        })
    }
}
