//! RSS 2.0 feeds of live blog posts, site-wide or per category.
use crate::config::SiteConfig;
use crate::db::PageRepository;
use crate::error::{AppError, Result};
use crate::metrics::feed::FEED_RENDER_TOTAL;
use crate::models::{BlogPage, Listable, PostQuery, PostScope};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

pub const FEED_ITEM_LIMIT: i64 = 20;
pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";
const FEED_LANGUAGE: &str = "en-us";

pub fn site_feed_path() -> String {
    "/blog/rss/".to_string()
}

pub fn category_feed_path(page_id: i64) -> String {
    format!("/blog/rss/category/{}/", page_id)
}

/// Absolute link for a page: site root plus relative path. Without a root
/// the relative path is used, and `/` when there is no path either.
pub fn page_link(root_url: Option<&str>, url_path: Option<&str>) -> String {
    let path = url_path.map(str::trim).filter(|p| !p.is_empty());
    match (root_url.map(|r| r.trim_end_matches('/')), path) {
        (Some(root), Some(path)) if !root.is_empty() => {
            if path.starts_with('/') {
                format!("{}{}", root, path)
            } else {
                format!("{}/{}", root, path)
            }
        }
        (_, Some(path)) => path.to_string(),
        (Some(root), None) if !root.is_empty() => format!("{}/", root),
        _ => "/".to_string(),
    }
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RssItem {
    pub title: String,
    pub link: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct RssChannel {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Absolute URL of the feed itself (`atom:link rel="self"`).
    pub feed_url: String,
    pub last_build_date: DateTime<Utc>,
    pub items: Vec<RssItem>,
}

impl RssChannel {
    /// Serialize as an RSS 2.0 document.
    pub fn render(&self) -> String {
        let mut xml = String::with_capacity(512 + self.items.len() * 256);
        xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        xml.push_str("<rss version=\"2.0\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n");
        xml.push_str("<channel>\n");
        let _ = write!(
            xml,
            "  <title>{}</title>\n  <link>{}</link>\n  <description>{}</description>\n",
            escape_xml(&self.title),
            escape_xml(&self.link),
            escape_xml(&self.description)
        );
        let _ = write!(
            xml,
            "  <atom:link href=\"{}\" rel=\"self\"></atom:link>\n  <language>{}</language>\n  <lastBuildDate>{}</lastBuildDate>\n",
            escape_xml(&self.feed_url),
            FEED_LANGUAGE,
            self.last_build_date.to_rfc2822()
        );

        for item in &self.items {
            let link = escape_xml(&item.link);
            let _ = write!(
                xml,
                "  <item>\n    <title>{}</title>\n    <link>{}</link>\n    <description>{}</description>\n    <guid>{}</guid>\n  </item>\n",
                escape_xml(&item.title),
                link,
                escape_xml(&item.description),
                link
            );
        }

        xml.push_str("</channel>\n</rss>\n");
        xml
    }
}

pub struct FeedService {
    pages: Arc<dyn PageRepository>,
    site: SiteConfig,
}

impl FeedService {
    pub fn new(pages: Arc<dyn PageRepository>, site: SiteConfig) -> Self {
        Self { pages, site }
    }

    fn item(&self, post: &BlogPage) -> RssItem {
        RssItem {
            title: post.title.clone(),
            link: page_link(self.site.root_url.as_deref(), Some(&post.url_path)),
            description: post.listing_summary(),
        }
    }

    async fn items(&self, scope: PostScope) -> Result<Vec<RssItem>> {
        let posts = self
            .pages
            .list_posts(&PostQuery::new(scope), FEED_ITEM_LIMIT, 0)
            .await?;
        Ok(posts.iter().map(|post| self.item(post)).collect())
    }

    /// Latest live posts of the whole site.
    pub async fn site_feed(&self) -> Result<RssChannel> {
        let items = self.items(PostScope::Site).await?;
        FEED_RENDER_TOTAL.with_label_values(&["site"]).inc();
        debug!(items = items.len(), "Rendering site feed");

        Ok(RssChannel {
            title: self.site.feed_title.clone(),
            link: page_link(self.site.root_url.as_deref(), Some(&self.site.blog_link)),
            description: self.site.feed_description.clone(),
            feed_url: page_link(self.site.root_url.as_deref(), Some(&site_feed_path())),
            last_build_date: Utc::now(),
            items,
        })
    }

    /// Latest live posts below one blog index page.
    pub async fn category_feed(&self, page_id: i64) -> Result<RssChannel> {
        let index = self
            .pages
            .find_index_page(page_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("blog index page {}", page_id)))?;

        let items = self.items(PostScope::DescendantOf(index.id)).await?;
        FEED_RENDER_TOTAL.with_label_values(&["category"]).inc();
        debug!(page_id, items = items.len(), "Rendering category feed");

        Ok(RssChannel {
            title: format!("{} — {}", self.site.feed_title, index.title),
            link: page_link(self.site.root_url.as_deref(), Some(&index.url_path)),
            description: format!("RSS feed for posts under {}", index.title),
            feed_url: page_link(
                self.site.root_url.as_deref(),
                Some(&category_feed_path(index.id)),
            ),
            last_build_date: Utc::now(),
            items,
        })
    }
}
