use crate::db::tree;
use crate::error::{AppError, Result};
use crate::models::page::{child_url_path, slugify, INDEX_PAGE_TYPE, POST_PAGE_TYPE};
use crate::models::{
    ArchiveMonth, BlogIndexPage, BlogPage, CategoryLink, NewBlogPage, NewIndexPage, PostQuery,
    PostScope, RecentPost, TagCount,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Read and write access to the blog part of the page tree.
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// Index page by id, live or not.
    async fn find_index_page(&self, page_id: i64) -> Result<Option<BlogIndexPage>>;

    async fn find_post(&self, page_id: i64) -> Result<Option<BlogPage>>;

    /// Number of live posts matching the query.
    async fn count_posts(&self, query: &PostQuery) -> Result<i64>;

    /// Live posts matching the query, newest first (search rank first when searching).
    async fn list_posts(&self, query: &PostQuery, limit: i64, offset: i64)
        -> Result<Vec<BlogPage>>;

    async fn recent_posts(&self, index_id: i64, limit: i64) -> Result<Vec<RecentPost>>;

    /// Tags ranked by how many live posts in scope carry them.
    async fn popular_tags(&self, scope: PostScope, limit: i64) -> Result<Vec<TagCount>>;

    /// Live descendant post counts per calendar month, newest month first.
    async fn monthly_archive(&self, index_id: i64) -> Result<Vec<ArchiveMonth>>;

    /// Live index pages sharing the parent of `index_id`, itself included.
    async fn sibling_index_pages(&self, index_id: i64) -> Result<Vec<CategoryLink>>;

    async fn create_index_page(&self, page: &NewIndexPage) -> Result<BlogIndexPage>;

    /// Create a post below an index page. Fails with a validation error when
    /// the parent is not a blog index page.
    async fn create_post(&self, parent_id: i64, page: &NewBlogPage) -> Result<BlogPage>;
}

const INDEX_COLUMNS: &str = r#"
    SELECT p.id, p.parent_id, p.title, p.url_path, p.live,
           bi.intro, bi.show_categories, bi.show_recent, bi.show_popular_tags,
           bi.show_archives, bi.show_rss, bi.enable_search, bi.posts_per_page
    FROM pages p
    JOIN blog_index_pages bi ON bi.page_id = p.id
"#;

const POST_COLUMNS: &str = r#"
    SELECT p.id, p.parent_id, p.title, p.url_path, p.live,
           bp.date, bp.intro, bp.body, bp.enable_comments, p.listing_summary,
           ARRAY(
               SELECT t.name::TEXT FROM blog_page_tags bt
               JOIN tags t ON t.id = bt.tag_id
               WHERE bt.content_object_id = p.id
               ORDER BY t.name
           ) AS tags
"#;

/// Escape LIKE metacharacters so user input matches literally.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Joins and WHERE clause selecting live posts for a query.
fn push_post_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &PostQuery) {
    qb.push(" FROM pages p JOIN blog_pages bp ON bp.page_id = p.id");
    if let PostScope::DescendantOf(index_id) = query.scope {
        qb.push(" JOIN pages anc ON anc.id = ")
            .push_bind(index_id)
            .push(" AND p.path LIKE anc.path || '%' AND p.depth > anc.depth");
    }
    qb.push(" WHERE p.live = TRUE");

    if let Some(search) = &query.search {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR bp.intro ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(tag) = &query.tag {
        qb.push(
            " AND EXISTS (SELECT 1 FROM blog_page_tags bt JOIN tags t ON t.id = bt.tag_id \
             WHERE bt.content_object_id = p.id AND t.name = ",
        )
        .push_bind(tag.clone())
        .push(")");
    }

    if let Some(month) = &query.month {
        let (start, end) = month.bounds();
        qb.push(" AND bp.date >= ")
            .push_bind(start)
            .push(" AND bp.date < ")
            .push_bind(end);
    }
}

/// Blog index pages hold only posts and posts are leaves, so neither can
/// parent a new index page.
pub fn check_index_parent(parent_id: i64, parent_type: &str) -> Result<()> {
    if parent_type == INDEX_PAGE_TYPE || parent_type == POST_PAGE_TYPE {
        return Err(AppError::Validation(format!(
            "blog index pages cannot be created under page {} ('{}')",
            parent_id, parent_type
        )));
    }
    Ok(())
}

/// Advisory lock serializing inserts of top-level pages.
const ROOT_TREE_LOCK_KEY: i64 = 0x626c_6f67_726f_6f74;

/// Tag slugs are tried as `slug`, `slug-2`, `slug-3`, ... up to this many times.
const MAX_TAG_SLUG_ATTEMPTS: u32 = 50;

/// Width of `tags.slug`.
const TAG_SLUG_MAX_LEN: usize = 100;

/// Slug to try for a new tag on the given attempt, counting from 1. The base
/// is cut so the suffixed slug still fits the column; slugs are ASCII.
pub fn tag_slug_candidate(base: &str, attempt: u32) -> String {
    let suffix = if attempt <= 1 {
        String::new()
    } else {
        format!("-{}", attempt)
    };
    let keep = base.len().min(TAG_SLUG_MAX_LEN - suffix.len());
    format!("{}{}", &base[..keep], suffix)
}

#[derive(sqlx::FromRow)]
struct ArchiveRow {
    year: i32,
    month: i32,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct TreeNode {
    id: i64,
    path: String,
    url_path: String,
    content_type: String,
}

/// PostgreSQL-backed page repository
#[derive(Clone)]
pub struct PgPageRepository {
    pool: PgPool,
}

impl PgPageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the `pages` row for a new child of `parent` (or a top-level page).
    async fn insert_page_node(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        parent: Option<&TreeNode>,
        title: &str,
        slug: Option<&str>,
        content_type: &str,
        live: bool,
        listing_summary: Option<&str>,
    ) -> Result<i64> {
        let parent_path = parent.map(|p| p.path.as_str()).unwrap_or("");
        let last_child: Option<String> = match parent {
            Some(p) => {
                sqlx::query_scalar("SELECT MAX(path) FROM pages WHERE parent_id = $1")
                    .bind(p.id)
                    .fetch_one(&mut **tx)
                    .await?
            }
            None => {
                // Top-level pages have no parent row to lock.
                sqlx::query("SELECT pg_advisory_xact_lock($1)")
                    .bind(ROOT_TREE_LOCK_KEY)
                    .execute(&mut **tx)
                    .await?;
                sqlx::query_scalar("SELECT MAX(path) FROM pages WHERE parent_id IS NULL")
                    .fetch_one(&mut **tx)
                    .await?
            }
        };

        let path = tree::next_child_path(parent_path, last_child.as_deref()).ok_or_else(|| {
            AppError::Internal(format!("no free tree slot below '{}'", parent_path))
        })?;
        let slug = slugify(slug.unwrap_or(title));
        let url_path = child_url_path(parent.map(|p| p.url_path.as_str()).unwrap_or("/"), &slug);

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO pages (parent_id, path, depth, title, slug, url_path, content_type, live, listing_summary)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(parent.map(|p| p.id))
        .bind(&path)
        .bind(tree::depth_of(&path))
        .bind(title)
        .bind(&slug)
        .bind(&url_path)
        .bind(content_type)
        .bind(live)
        .bind(listing_summary)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    /// Id of the tag named `name`, creating it with the first free slug.
    async fn upsert_tag(tx: &mut sqlx::Transaction<'_, Postgres>, name: &str) -> Result<i64> {
        let base = slugify(name);
        for attempt in 1..=MAX_TAG_SLUG_ATTEMPTS {
            let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM tags WHERE name = $1")
                .bind(name)
                .fetch_optional(&mut **tx)
                .await?;
            if let Some(id) = existing {
                return Ok(id);
            }

            // Conflicts on either name or slug insert nothing.
            let inserted: Option<i64> = sqlx::query_scalar(
                "INSERT INTO tags (name, slug) VALUES ($1, $2) ON CONFLICT DO NOTHING RETURNING id",
            )
            .bind(name)
            .bind(tag_slug_candidate(&base, attempt))
            .fetch_optional(&mut **tx)
            .await?;
            if let Some(id) = inserted {
                return Ok(id);
            }
        }

        Err(AppError::Internal(format!("no free slug for tag '{}'", name)))
    }

    async fn lock_node(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        page_id: i64,
    ) -> Result<Option<TreeNode>> {
        let node = sqlx::query_as::<_, TreeNode>(
            "SELECT id, path, url_path, content_type FROM pages WHERE id = $1 FOR UPDATE",
        )
        .bind(page_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(node)
    }
}

#[async_trait]
impl PageRepository for PgPageRepository {
    async fn find_index_page(&self, page_id: i64) -> Result<Option<BlogIndexPage>> {
        let page = sqlx::query_as::<_, BlogIndexPage>(&format!("{} WHERE p.id = $1", INDEX_COLUMNS))
            .bind(page_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(page)
    }

    async fn find_post(&self, page_id: i64) -> Result<Option<BlogPage>> {
        let post = sqlx::query_as::<_, BlogPage>(&format!(
            "{} FROM pages p JOIN blog_pages bp ON bp.page_id = p.id WHERE p.id = $1",
            POST_COLUMNS
        ))
        .bind(page_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn count_posts(&self, query: &PostQuery) -> Result<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        push_post_filters(&mut qb, query);

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn list_posts(
        &self,
        query: &PostQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BlogPage>> {
        let mut qb = QueryBuilder::<Postgres>::new(POST_COLUMNS);
        push_post_filters(&mut qb, query);

        qb.push(" ORDER BY ");
        if let Some(search) = &query.search {
            qb.push("ts_rank(to_tsvector('simple', p.title || ' ' || bp.intro), plainto_tsquery('simple', ")
                .push_bind(search.clone())
                .push(")) DESC, ");
        }
        qb.push("bp.date DESC, p.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let posts = qb.build_query_as::<BlogPage>().fetch_all(&self.pool).await?;
        Ok(posts)
    }

    async fn recent_posts(&self, index_id: i64, limit: i64) -> Result<Vec<RecentPost>> {
        let posts = sqlx::query_as::<_, RecentPost>(
            r#"
            SELECT p.id, p.title, bp.date, p.url_path
            FROM pages p
            JOIN blog_pages bp ON bp.page_id = p.id
            JOIN pages anc ON anc.id = $1
            WHERE p.live = TRUE AND p.path LIKE anc.path || '%' AND p.depth > anc.depth
            ORDER BY bp.date DESC, p.id DESC
            LIMIT $2
            "#,
        )
        .bind(index_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn popular_tags(&self, scope: PostScope, limit: i64) -> Result<Vec<TagCount>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT t.name, t.slug, COUNT(bt.id) AS num_times \
             FROM tags t \
             JOIN blog_page_tags bt ON bt.tag_id = t.id \
             JOIN pages p ON p.id = bt.content_object_id",
        );
        if let PostScope::DescendantOf(index_id) = scope {
            qb.push(" JOIN pages anc ON anc.id = ")
                .push_bind(index_id)
                .push(" AND p.path LIKE anc.path || '%' AND p.depth > anc.depth");
        }
        qb.push(" WHERE p.live = TRUE GROUP BY t.id, t.name, t.slug ORDER BY num_times DESC, t.name ASC LIMIT ")
            .push_bind(limit);

        let tags = qb.build_query_as::<TagCount>().fetch_all(&self.pool).await?;
        Ok(tags)
    }

    async fn monthly_archive(&self, index_id: i64) -> Result<Vec<ArchiveMonth>> {
        let rows = sqlx::query_as::<_, ArchiveRow>(
            r#"
            SELECT EXTRACT(YEAR FROM bp.date)::INT AS year,
                   EXTRACT(MONTH FROM bp.date)::INT AS month,
                   COUNT(*) AS count
            FROM pages p
            JOIN blog_pages bp ON bp.page_id = p.id
            JOIN pages anc ON anc.id = $1
            WHERE p.live = TRUE AND p.path LIKE anc.path || '%' AND p.depth > anc.depth
            GROUP BY 1, 2
            ORDER BY 1 DESC, 2 DESC
            "#,
        )
        .bind(index_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ArchiveMonth {
                year: row.year,
                month: row.month as u32,
                count: row.count,
            })
            .collect())
    }

    async fn sibling_index_pages(&self, index_id: i64) -> Result<Vec<CategoryLink>> {
        let siblings = sqlx::query_as::<_, CategoryLink>(
            r#"
            SELECT p.id, p.title, p.url_path
            FROM pages p
            JOIN pages me ON me.id = $1
            WHERE p.parent_id IS NOT DISTINCT FROM me.parent_id
              AND p.live = TRUE
              AND p.content_type = $2
            ORDER BY p.path
            "#,
        )
        .bind(index_id)
        .bind(INDEX_PAGE_TYPE)
        .fetch_all(&self.pool)
        .await?;

        Ok(siblings)
    }

    async fn create_index_page(&self, page: &NewIndexPage) -> Result<BlogIndexPage> {
        let mut tx = self.pool.begin().await?;

        let parent = match page.parent_id {
            Some(parent_id) => {
                let parent = Self::lock_node(&mut tx, parent_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("page {}", parent_id)))?;
                check_index_parent(parent_id, &parent.content_type)?;
                Some(parent)
            }
            None => None,
        };

        let id = Self::insert_page_node(
            &mut tx,
            parent.as_ref(),
            &page.title,
            page.slug.as_deref(),
            INDEX_PAGE_TYPE,
            page.live,
            None,
        )
        .await?;

        sqlx::query(
            r#"
            INSERT INTO blog_index_pages (page_id, intro, show_categories, show_recent,
                show_popular_tags, show_archives, show_rss, enable_search, posts_per_page)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(id)
        .bind(&page.intro)
        .bind(page.show_categories)
        .bind(page.show_recent)
        .bind(page.show_popular_tags)
        .bind(page.show_archives)
        .bind(page.show_rss)
        .bind(page.enable_search)
        .bind(page.posts_per_page)
        .execute(&mut *tx)
        .await?;

        let created = sqlx::query_as::<_, BlogIndexPage>(&format!("{} WHERE p.id = $1", INDEX_COLUMNS))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn create_post(&self, parent_id: i64, page: &NewBlogPage) -> Result<BlogPage> {
        let mut tx = self.pool.begin().await?;

        let parent = Self::lock_node(&mut tx, parent_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("page {}", parent_id)))?;
        if parent.content_type != INDEX_PAGE_TYPE {
            return Err(AppError::Validation(format!(
                "blog posts can only be created under a blog index page, page {} is '{}'",
                parent_id, parent.content_type
            )));
        }

        let id = Self::insert_page_node(
            &mut tx,
            Some(&parent),
            &page.title,
            page.slug.as_deref(),
            POST_PAGE_TYPE,
            page.live,
            page.listing_summary.as_deref(),
        )
        .await?;

        sqlx::query(
            "INSERT INTO blog_pages (page_id, date, intro, body, enable_comments) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(page.date)
        .bind(&page.intro)
        .bind(&page.body)
        .bind(page.enable_comments)
        .execute(&mut *tx)
        .await?;

        for name in page.normalized_tags() {
            let tag_id = Self::upsert_tag(&mut tx, &name).await?;

            sqlx::query(
                "INSERT INTO blog_page_tags (tag_id, content_object_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(tag_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        let created = sqlx::query_as::<_, BlogPage>(&format!(
            "{} FROM pages p JOIN blog_pages bp ON bp.page_id = p.id WHERE p.id = $1",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }
}
