//! Page types of the blog section: the index (category) page and the post page.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const INDEX_PAGE_TYPE: &str = "blog.blogindexpage";
pub const POST_PAGE_TYPE: &str = crate::config::BLOG_POST_CONTENT_TYPE;

pub const DEFAULT_POSTS_PER_PAGE: usize = 9;
pub const MAX_INTRO_LEN: u64 = 250;

/// Formatting the editor may offer on rich-text fields of both page types.
pub const RICH_TEXT_FEATURES: &[&str] = &[
    "h2",
    "h3",
    "bold",
    "italic",
    "ol",
    "ul",
    "link",
    "document-link",
    "image",
    "embed",
    "code",
    "hr",
    "blockquote",
];

/// Anything shown in a post listing or a feed.
pub trait Listable {
    fn intro(&self) -> &str;

    /// Short text used for cards and feed descriptions.
    fn listing_summary(&self) -> String {
        self.intro().to_string()
    }
}

/// Blog category page. Only [`BlogPage`]s may live under it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BlogIndexPage {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub title: String,
    pub url_path: String,
    pub live: bool,
    pub intro: String,
    pub show_categories: bool,
    pub show_recent: bool,
    pub show_popular_tags: bool,
    pub show_archives: bool,
    pub show_rss: bool,
    pub enable_search: bool,
    pub posts_per_page: i32,
}

impl BlogIndexPage {
    /// Page size for the post listing; a zero or unset value falls back to the default.
    pub fn page_size(&self) -> usize {
        if self.posts_per_page > 0 {
            self.posts_per_page as usize
        } else {
            DEFAULT_POSTS_PER_PAGE
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BlogPage {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub title: String,
    pub url_path: String,
    pub live: bool,
    pub date: NaiveDate,
    pub intro: String,
    pub body: String,
    pub enable_comments: bool,
    /// Editor override for the card/feed text.
    pub listing_summary: Option<String>,
    pub tags: Vec<String>,
}

impl Listable for BlogPage {
    fn intro(&self) -> &str {
        &self.intro
    }

    fn listing_summary(&self) -> String {
        match self.listing_summary.as_deref().map(str::trim) {
            Some(summary) if !summary.is_empty() => summary.to_string(),
            _ => self.intro.clone(),
        }
    }
}

/// Post card as rendered in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCard {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub date: NaiveDate,
    pub summary: String,
    pub tags: Vec<String>,
}

impl From<&BlogPage> for PostCard {
    fn from(page: &BlogPage) -> Self {
        Self {
            id: page.id,
            title: page.title.clone(),
            url: page.url_path.clone(),
            date: page.date,
            summary: page.listing_summary(),
            tags: page.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecentPost {
    pub id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub url_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TagCount {
    pub name: String,
    pub slug: String,
    pub num_times: i64,
}

/// Number of posts published in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMonth {
    pub year: i32,
    pub month: u32,
    pub count: i64,
}

impl ArchiveMonth {
    /// Value of the `month` query parameter selecting this bucket.
    pub fn param(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryLink {
    pub id: i64,
    pub title: String,
    pub url_path: String,
}

fn default_true() -> bool {
    true
}

fn default_posts_per_page() -> i32 {
    DEFAULT_POSTS_PER_PAGE as i32
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewIndexPage {
    /// Parent page; `None` places the index at the top of the tree.
    pub parent_id: Option<i64>,
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub intro: String,
    #[serde(default = "default_true")]
    pub show_categories: bool,
    #[serde(default = "default_true")]
    pub show_recent: bool,
    #[serde(default = "default_true")]
    pub show_popular_tags: bool,
    #[serde(default = "default_true")]
    pub show_archives: bool,
    #[serde(default = "default_true")]
    pub show_rss: bool,
    #[serde(default = "default_true")]
    pub enable_search: bool,
    #[serde(default = "default_posts_per_page")]
    #[validate(range(min = 1, max = 60, message = "Posts per page must be between 1 and 60"))]
    pub posts_per_page: i32,
    #[serde(default = "default_true")]
    pub live: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewBlogPage {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    pub slug: Option<String>,
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 250, message = "Intro must be 1 to 250 characters"))]
    pub intro: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub enable_comments: bool,
    pub listing_summary: Option<String>,
    #[serde(default = "default_true")]
    pub live: bool,
}

impl NewBlogPage {
    /// Tag names trimmed, blank entries dropped, duplicates removed (first wins).
    pub fn normalized_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for tag in self.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            if !tags.iter().any(|existing| existing == tag) {
                tags.push(tag.to_string());
            }
        }
        tags
    }
}

/// URL slug derived from a title: lowercase ASCII alphanumerics joined by `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("page");
    }
    slug
}

/// Join a parent's relative URL and a child slug (`/blog/` + `post` = `/blog/post/`).
pub fn child_url_path(parent_url_path: &str, slug: &str) -> String {
    let base = parent_url_path.trim_end_matches('/');
    format!("{}/{}/", base, slug)
}
