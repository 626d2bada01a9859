//! Context of a blog index page: filtered, paginated posts plus sidebar widgets.
use crate::db::PageRepository;
use crate::error::Result;
use crate::metrics::listing::LISTING_REQUESTS_TOTAL;
use crate::models::{
    ArchiveMonth, BlogIndexPage, CategoryLink, MonthFilter, PostCard, PostQuery, PostScope,
    RecentPost, TagCount,
};
use crate::services::feed::category_feed_path;
use crate::services::pagination::{PageInfo, Paginator};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

pub const RECENT_POSTS_LIMIT: i64 = 5;
pub const POPULAR_TAGS_LIMIT: i64 = 10;

/// Query parameters of an index page. Every field is optional and malformed
/// values degrade to "no filter" instead of failing the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingParams {
    pub q: Option<String>,
    pub tag: Option<String>,
    /// `YYYY-MM`
    pub month: Option<String>,
    /// Kept as text so a non-numeric value can fall back to page 1.
    pub page: Option<String>,
}

impl ListingParams {
    /// Collect decoded query pairs. A repeated key keeps its last value and
    /// unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "q" => &mut params.q,
                "tag" => &mut params.tag,
                "month" => &mut params.month,
                "page" => &mut params.page,
                _ => continue,
            };
            *slot = Some(value);
        }
        params
    }
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or("").to_string()
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexHeader {
    pub id: i64,
    pub title: String,
    pub intro: String,
    pub url: String,
}

/// Everything an index page template needs. Disabled widgets are present and empty.
#[derive(Debug, Clone, Serialize)]
pub struct ListingContext {
    pub page: IndexHeader,
    pub posts: Vec<PostCard>,
    pub page_obj: PageInfo,
    pub is_paginated: bool,
    pub q: String,
    pub active_tag: String,
    pub active_month: String,
    pub recent_posts: Vec<RecentPost>,
    pub popular_tags: Vec<TagCount>,
    pub archives: Vec<ArchiveMonth>,
    pub categories: Vec<CategoryLink>,
    pub active_category_id: i64,
    pub enable_search: bool,
    pub show_rss: bool,
    pub rss_url: String,
}

pub struct ListingService {
    pages: Arc<dyn PageRepository>,
}

impl ListingService {
    pub fn new(pages: Arc<dyn PageRepository>) -> Self {
        Self { pages }
    }

    /// Build the post query for an index page from its raw parameters.
    pub fn build_query(index: &BlogIndexPage, params: &ListingParams) -> PostQuery {
        let q = trimmed(&params.q);
        let tag = trimmed(&params.tag);
        let month = trimmed(&params.month);

        PostQuery {
            scope: PostScope::DescendantOf(index.id),
            search: non_empty(&q).filter(|_| index.enable_search),
            tag: non_empty(&tag),
            month: if month.is_empty() {
                None
            } else {
                MonthFilter::parse(&month)
            },
        }
    }

    pub async fn context(
        &self,
        index: &BlogIndexPage,
        params: &ListingParams,
    ) -> Result<ListingContext> {
        let query = Self::build_query(index, params);
        LISTING_REQUESTS_TOTAL
            .with_label_values(&[if query.search.is_some() { "search" } else { "browse" }])
            .inc();

        let total = self.pages.count_posts(&query).await?;
        let paginator = Paginator::new(total.max(0) as usize, index.page_size());
        let page_obj = paginator.page(paginator.resolve(params.page.as_deref()));
        debug!(
            page_id = index.id,
            total,
            page = page_obj.number,
            "Composing blog listing"
        );

        let posts = self
            .pages
            .list_posts(&query, page_obj.per_page as i64, page_obj.offset() as i64)
            .await?;

        let recent_posts = if index.show_recent {
            self.pages.recent_posts(index.id, RECENT_POSTS_LIMIT).await?
        } else {
            Vec::new()
        };

        let popular_tags = if index.show_popular_tags {
            self.popular_tags(index.id).await?
        } else {
            Vec::new()
        };

        let archives = if index.show_archives {
            self.pages.monthly_archive(index.id).await?
        } else {
            Vec::new()
        };

        let categories = if index.show_categories {
            self.categories(index.id).await
        } else {
            Vec::new()
        };

        Ok(ListingContext {
            page: IndexHeader {
                id: index.id,
                title: index.title.clone(),
                intro: index.intro.clone(),
                url: index.url_path.clone(),
            },
            posts: posts.iter().map(PostCard::from).collect(),
            is_paginated: page_obj.is_paginated,
            page_obj,
            q: trimmed(&params.q),
            active_tag: trimmed(&params.tag),
            active_month: trimmed(&params.month),
            recent_posts,
            popular_tags,
            archives,
            categories,
            active_category_id: index.id,
            enable_search: index.enable_search,
            show_rss: index.show_rss,
            rss_url: category_feed_path(index.id),
        })
    }

    /// Top tags under the index, or across the whole site when the index has none.
    pub async fn popular_tags(&self, index_id: i64) -> Result<Vec<TagCount>> {
        let scoped = self
            .pages
            .popular_tags(PostScope::DescendantOf(index_id), POPULAR_TAGS_LIMIT)
            .await?;
        if !scoped.is_empty() {
            return Ok(scoped);
        }

        self.pages
            .popular_tags(PostScope::Site, POPULAR_TAGS_LIMIT)
            .await
    }

    /// Sibling categories. A failed lookup yields an empty list.
    pub async fn categories(&self, index_id: i64) -> Vec<CategoryLink> {
        match self.pages.sibling_index_pages(index_id).await {
            Ok(categories) => categories,
            Err(err) => {
                warn!(page_id = index_id, error = %err, "Sibling category lookup failed");
                Vec::new()
            }
        }
    }
}
