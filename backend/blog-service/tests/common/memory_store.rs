//! In-memory repositories for HTTP tests
//!
//! Mirrors the PostgreSQL repositories closely enough to drive every handler
//! without a database: live filtering, tree scoping, tag counts and the
//! comment flags all behave like the SQL versions.

use async_trait::async_trait;
use blog_service::db::page_repo::check_index_parent;
use blog_service::db::{CommentRepository, PageRepository};
use blog_service::error::{AppError, Result};
use blog_service::models::page::{child_url_path, slugify, INDEX_PAGE_TYPE, POST_PAGE_TYPE};
use blog_service::models::{
    ArchiveMonth, BlogIndexPage, BlogPage, CategoryLink, Comment, CommentEdit, ModerationFlags,
    NewBlogPage, NewIndexPage, PostQuery, PostScope, RecentPost, TagCount,
};
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct PageTree {
    next_id: i64,
    /// Every node, blog or not: id -> (parent, url_path, live)
    nodes: BTreeMap<i64, (Option<i64>, String, bool)>,
    indexes: BTreeMap<i64, BlogIndexPage>,
    posts: BTreeMap<i64, BlogPage>,
}

impl PageTree {
    fn allocate(&mut self, parent_id: Option<i64>, url_path: String, live: bool) -> i64 {
        self.next_id += 1;
        let id = self.next_id;
        self.nodes.insert(id, (parent_id, url_path, live));
        id
    }

    fn url_of(&self, id: Option<i64>) -> String {
        id.and_then(|id| self.nodes.get(&id))
            .map(|(_, url, _)| url.clone())
            .unwrap_or_else(|| "/".to_string())
    }

    fn is_descendant(&self, id: i64, ancestor: i64) -> bool {
        let mut current = self.nodes.get(&id).and_then(|(parent, _, _)| *parent);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.nodes.get(&node).and_then(|(parent, _, _)| *parent);
        }
        false
    }

    fn in_scope(&self, post: &BlogPage, scope: PostScope) -> bool {
        match scope {
            PostScope::Site => true,
            PostScope::DescendantOf(ancestor) => self.is_descendant(post.id, ancestor),
        }
    }

    /// Live posts matching the query, newest first.
    fn matching(&self, query: &PostQuery) -> Vec<BlogPage> {
        let mut posts: Vec<BlogPage> = self
            .posts
            .values()
            .filter(|post| post.live && self.in_scope(post, query.scope))
            .filter(|post| match &query.search {
                Some(term) => {
                    let term = term.to_lowercase();
                    post.title.to_lowercase().contains(&term)
                        || post.intro.to_lowercase().contains(&term)
                }
                None => true,
            })
            .filter(|post| match &query.tag {
                Some(tag) => post.tags.iter().any(|t| t == tag),
                None => true,
            })
            .filter(|post| match &query.month {
                Some(month) => month.contains(post.date),
                None => true,
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        posts
    }
}

/// Page tree held in memory. Clones share the same tree.
#[derive(Clone, Default)]
pub struct MemoryPageStore {
    tree: Arc<Mutex<PageTree>>,
    fail_siblings: Arc<Mutex<bool>>,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain (non-blog) page, e.g. the site root.
    pub fn add_plain_page(&self, parent_id: Option<i64>, slug: &str) -> i64 {
        let mut tree = self.tree.lock().unwrap();
        let url = child_url_path(&tree.url_of(parent_id), slug);
        tree.allocate(parent_id, url, true)
    }

    pub fn add_index(&self, parent_id: Option<i64>, title: &str, posts_per_page: i32) -> i64 {
        let mut tree = self.tree.lock().unwrap();
        let url_path = child_url_path(&tree.url_of(parent_id), &slugify(title));
        let id = tree.allocate(parent_id, url_path.clone(), true);
        tree.indexes.insert(
            id,
            BlogIndexPage {
                id,
                parent_id,
                title: title.to_string(),
                url_path,
                live: true,
                intro: format!("All about {}", title),
                show_categories: true,
                show_recent: true,
                show_popular_tags: true,
                show_archives: true,
                show_rss: true,
                enable_search: true,
                posts_per_page,
            },
        );
        id
    }

    pub fn add_post(&self, parent_id: i64, title: &str, date: &str, tags: &[&str]) -> i64 {
        let mut tree = self.tree.lock().unwrap();
        let url_path = child_url_path(&tree.url_of(Some(parent_id)), &slugify(title));
        let id = tree.allocate(Some(parent_id), url_path.clone(), true);
        tree.posts.insert(
            id,
            BlogPage {
                id,
                parent_id: Some(parent_id),
                title: title.to_string(),
                url_path,
                live: true,
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                intro: format!("Intro of {}", title),
                body: String::new(),
                enable_comments: true,
                listing_summary: None,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
        );
        id
    }

    pub fn update_index(&self, id: i64, f: impl FnOnce(&mut BlogIndexPage)) {
        let mut tree = self.tree.lock().unwrap();
        let index = tree.indexes.get_mut(&id).unwrap();
        f(index);
        let live = index.live;
        tree.nodes.get_mut(&id).unwrap().2 = live;
    }

    pub fn update_post(&self, id: i64, f: impl FnOnce(&mut BlogPage)) {
        let mut tree = self.tree.lock().unwrap();
        let post = tree.posts.get_mut(&id).unwrap();
        f(post);
        let live = post.live;
        tree.nodes.get_mut(&id).unwrap().2 = live;
    }

    /// Make every sibling lookup fail with a database error.
    pub fn fail_sibling_lookups(&self) {
        *self.fail_siblings.lock().unwrap() = true;
    }

    pub fn post(&self, id: i64) -> Option<BlogPage> {
        self.tree.lock().unwrap().posts.get(&id).cloned()
    }
}

#[async_trait]
impl PageRepository for MemoryPageStore {
    async fn find_index_page(&self, page_id: i64) -> Result<Option<BlogIndexPage>> {
        Ok(self.tree.lock().unwrap().indexes.get(&page_id).cloned())
    }

    async fn find_post(&self, page_id: i64) -> Result<Option<BlogPage>> {
        Ok(self.post(page_id))
    }

    async fn count_posts(&self, query: &PostQuery) -> Result<i64> {
        Ok(self.tree.lock().unwrap().matching(query).len() as i64)
    }

    async fn list_posts(
        &self,
        query: &PostQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BlogPage>> {
        Ok(self
            .tree
            .lock()
            .unwrap()
            .matching(query)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn recent_posts(&self, index_id: i64, limit: i64) -> Result<Vec<RecentPost>> {
        let tree = self.tree.lock().unwrap();
        Ok(tree
            .matching(&PostQuery::new(PostScope::DescendantOf(index_id)))
            .into_iter()
            .take(limit as usize)
            .map(|post| RecentPost {
                id: post.id,
                title: post.title,
                date: post.date,
                url_path: post.url_path,
            })
            .collect())
    }

    async fn popular_tags(&self, scope: PostScope, limit: i64) -> Result<Vec<TagCount>> {
        let tree = self.tree.lock().unwrap();
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for post in tree.matching(&PostQuery::new(scope)) {
            for tag in post.tags {
                *counts.entry(tag).or_default() += 1;
            }
        }

        let mut tags: Vec<TagCount> = counts
            .into_iter()
            .map(|(name, num_times)| TagCount {
                slug: slugify(&name),
                name,
                num_times,
            })
            .collect();
        tags.sort_by(|a, b| b.num_times.cmp(&a.num_times).then(a.name.cmp(&b.name)));
        tags.truncate(limit as usize);
        Ok(tags)
    }

    async fn monthly_archive(&self, index_id: i64) -> Result<Vec<ArchiveMonth>> {
        let tree = self.tree.lock().unwrap();
        let mut buckets: BTreeMap<(i32, u32), i64> = BTreeMap::new();
        for post in tree.matching(&PostQuery::new(PostScope::DescendantOf(index_id))) {
            *buckets
                .entry((post.date.year(), post.date.month()))
                .or_default() += 1;
        }
        Ok(buckets
            .into_iter()
            .rev()
            .map(|((year, month), count)| ArchiveMonth { year, month, count })
            .collect())
    }

    async fn sibling_index_pages(&self, index_id: i64) -> Result<Vec<CategoryLink>> {
        if *self.fail_siblings.lock().unwrap() {
            return Err(AppError::Database("connection reset".to_string()));
        }

        let tree = self.tree.lock().unwrap();
        let parent = match tree.nodes.get(&index_id) {
            Some((parent, _, _)) => *parent,
            None => return Ok(Vec::new()),
        };
        Ok(tree
            .indexes
            .values()
            .filter(|index| index.live && index.parent_id == parent)
            .map(|index| CategoryLink {
                id: index.id,
                title: index.title.clone(),
                url_path: index.url_path.clone(),
            })
            .collect())
    }

    async fn create_index_page(&self, page: &NewIndexPage) -> Result<BlogIndexPage> {
        let mut tree = self.tree.lock().unwrap();
        if let Some(parent_id) = page.parent_id {
            if !tree.nodes.contains_key(&parent_id) {
                return Err(AppError::NotFound(format!("page {}", parent_id)));
            }
            let parent_type = if tree.indexes.contains_key(&parent_id) {
                INDEX_PAGE_TYPE
            } else if tree.posts.contains_key(&parent_id) {
                POST_PAGE_TYPE
            } else {
                "home.homepage"
            };
            check_index_parent(parent_id, parent_type)?;
        }

        let slug = slugify(page.slug.as_deref().unwrap_or(&page.title));
        let url_path = child_url_path(&tree.url_of(page.parent_id), &slug);
        let id = tree.allocate(page.parent_id, url_path.clone(), page.live);
        let index = BlogIndexPage {
            id,
            parent_id: page.parent_id,
            title: page.title.clone(),
            url_path,
            live: page.live,
            intro: page.intro.clone(),
            show_categories: page.show_categories,
            show_recent: page.show_recent,
            show_popular_tags: page.show_popular_tags,
            show_archives: page.show_archives,
            show_rss: page.show_rss,
            enable_search: page.enable_search,
            posts_per_page: page.posts_per_page,
        };
        tree.indexes.insert(id, index.clone());
        Ok(index)
    }

    async fn create_post(&self, parent_id: i64, page: &NewBlogPage) -> Result<BlogPage> {
        let mut tree = self.tree.lock().unwrap();
        if !tree.indexes.contains_key(&parent_id) {
            return Err(AppError::Validation(format!(
                "page {} cannot hold blog posts",
                parent_id
            )));
        }

        let slug = slugify(page.slug.as_deref().unwrap_or(&page.title));
        let url_path = child_url_path(&tree.url_of(Some(parent_id)), &slug);
        let id = tree.allocate(Some(parent_id), url_path.clone(), page.live);
        let post = BlogPage {
            id,
            parent_id: Some(parent_id),
            title: page.title.clone(),
            url_path,
            live: page.live,
            date: page.date,
            intro: page.intro.clone(),
            body: page.body.clone(),
            enable_comments: page.enable_comments,
            listing_summary: page.listing_summary.clone(),
            tags: page.normalized_tags(),
        };
        tree.posts.insert(id, post.clone());
        Ok(post)
    }
}

/// Comment table held in memory, keyed by id with its content type.
#[derive(Clone)]
pub struct MemoryCommentStore {
    content_types: Arc<Mutex<HashMap<String, i32>>>,
    comments: Arc<Mutex<BTreeMap<i64, (i32, Comment)>>>,
}

impl Default for MemoryCommentStore {
    fn default() -> Self {
        let content_types = HashMap::from([
            ("blog.blogindexpage".to_string(), 1),
            ("blog.blogpage".to_string(), 2),
        ]);
        Self {
            content_types: Arc::new(Mutex::new(content_types)),
            comments: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store without any registered content type.
    pub fn unregistered() -> Self {
        let store = Self::default();
        store.content_types.lock().unwrap().clear();
        store
    }

    /// Add a neutral comment (neither public nor removed) on a blog post.
    pub fn add_comment(&self, id: i64, post_id: i64, user_name: &str, text: &str) -> i64 {
        let comment = Comment {
            id,
            object_pk: post_id.to_string(),
            user_name: user_name.to_string(),
            user_email: format!("{}@example.com", user_name.to_lowercase()),
            user_url: String::new(),
            comment: text.to_string(),
            submit_date: Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap(),
            is_public: false,
            is_removed: false,
            parent_id: None,
            level: 0,
        };
        self.comments.lock().unwrap().insert(id, (2, comment));
        id
    }

    pub fn set(&self, id: i64, flags: ModerationFlags) {
        let mut comments = self.comments.lock().unwrap();
        let (_, comment) = comments.get_mut(&id).unwrap();
        comment.is_public = flags.is_public;
        comment.is_removed = flags.is_removed;
    }

    pub fn get(&self, id: i64) -> Option<Comment> {
        self.comments.lock().unwrap().get(&id).map(|(_, c)| c.clone())
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentStore {
    async fn content_type_id(&self, content_type: &str) -> Result<Option<i32>> {
        Ok(self.content_types.lock().unwrap().get(content_type).copied())
    }

    async fn list_for_content_type(&self, content_type_id: i32) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .values()
            .filter(|(ct, _)| *ct == content_type_id)
            .map(|(_, c)| c.clone())
            .collect();
        comments.sort_by(|a, b| b.submit_date.cmp(&a.submit_date).then(b.id.cmp(&a.id)));
        Ok(comments)
    }

    async fn find(&self, comment_id: i64) -> Result<Option<Comment>> {
        Ok(self.get(comment_id))
    }

    async fn update(&self, comment_id: i64, edit: &CommentEdit) -> Result<Option<Comment>> {
        let mut comments = self.comments.lock().unwrap();
        Ok(comments.get_mut(&comment_id).map(|(_, comment)| {
            comment.user_name = edit.user_name.clone();
            comment.user_email = edit.user_email.clone().unwrap_or_default();
            comment.user_url = edit.user_url.clone().unwrap_or_default();
            comment.comment = edit.comment.clone();
            comment.is_public = edit.is_public;
            comment.is_removed = edit.is_removed;
            comment.clone()
        }))
    }

    async fn set_flags(&self, comment_id: i64, flags: ModerationFlags) -> Result<Option<Comment>> {
        let mut comments = self.comments.lock().unwrap();
        Ok(comments.get_mut(&comment_id).map(|(_, comment)| {
            comment.is_public = flags.is_public;
            comment.is_removed = flags.is_removed;
            comment.clone()
        }))
    }

    async fn count_public(&self, content_type: &str, object_pk: &str) -> Result<i64> {
        let content_type_id = match self.content_types.lock().unwrap().get(content_type) {
            Some(id) => *id,
            None => return Ok(0),
        };
        Ok(self
            .comments
            .lock()
            .unwrap()
            .values()
            .filter(|(ct, c)| *ct == content_type_id && c.object_pk == object_pk && c.is_public)
            .count() as i64)
    }
}
