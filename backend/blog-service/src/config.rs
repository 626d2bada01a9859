/// Configuration management for Blog Service
///
/// Everything is read from environment variables once at startup and then
/// shared read-only through `web::Data`.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Content type key the comment subsystem uses for blog posts.
pub const BLOG_POST_CONTENT_TYPE: &str = "blog.blogpage";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Site and feed presentation
    pub site: SiteConfig,
    /// Admin surface
    pub admin: AdminConfig,
    /// Comment subsystem settings
    pub comments: CommentsConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Site-level presentation used by feeds and absolute URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute root (scheme + host) of the public site, e.g. `https://runutin.com`.
    /// When unset, links are emitted relative to the site.
    pub root_url: Option<String>,
    pub feed_title: String,
    pub feed_description: String,
    /// Relative link of the blog section used as the site feed's channel link.
    pub blog_link: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Bearer token required on `/admin` routes. `None` disables the check.
    pub api_token: Option<String>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Per-content-type moderation features of the comment subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationOptions {
    pub allow_flagging: bool,
    /// Like/dislike feedback
    pub allow_feedback: bool,
    pub show_feedback: bool,
}

/// Settings consumed by the threaded comment subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsConfig {
    /// New comments need an email confirmation before they are published.
    pub confirm_email: bool,
    /// Maximum nesting level (0 = flat).
    pub max_thread_level: u32,
    /// Comments per page on public comment listings.
    pub list_paginate_by: u32,
    pub from_email: String,
    pub contact_email: String,
    pub app_model_options: HashMap<String, ModerationOptions>,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        let mut app_model_options = HashMap::new();
        app_model_options.insert(
            BLOG_POST_CONTENT_TYPE.to_string(),
            ModerationOptions {
                allow_flagging: true,
                allow_feedback: true,
                show_feedback: true,
            },
        );

        Self {
            confirm_email: true,
            max_thread_level: 3,
            list_paginate_by: 10,
            from_email: "noreply@runutin.com".to_string(),
            contact_email: "admin@runutin.com".to_string(),
            app_model_options,
        }
    }
}

impl CommentsConfig {
    /// Moderation options for a content type; types without an entry get
    /// every feature disabled.
    pub fn options_for(&self, content_type: &str) -> ModerationOptions {
        self.app_model_options
            .get(content_type)
            .copied()
            .unwrap_or(ModerationOptions {
                allow_flagging: false,
                allow_feedback: false,
                show_feedback: false,
            })
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let cors = {
            let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                Ok(value) => value,
                Err(_) if production => {
                    return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                }
                Err(_) => "http://localhost:3000".to_string(),
            };

            if production && allowed_origins.trim() == "*" {
                return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
            }

            CorsConfig { allowed_origins }
        };

        let admin = {
            let api_token = non_empty_env("ADMIN_API_TOKEN");
            if production && api_token.is_none() {
                return Err("ADMIN_API_TOKEN must be set in production".to_string());
            }
            AdminConfig { api_token }
        };

        let defaults = CommentsConfig::default();
        let comments = CommentsConfig {
            confirm_email: parse_env_or_default("COMMENTS_CONFIRM_EMAIL", defaults.confirm_email)?,
            max_thread_level: parse_env_or_default(
                "COMMENTS_MAX_THREAD_LEVEL",
                defaults.max_thread_level,
            )?,
            list_paginate_by: parse_env_or_default(
                "COMMENTS_LIST_PAGINATE_BY",
                defaults.list_paginate_by,
            )?,
            from_email: std::env::var("COMMENTS_FROM_EMAIL").unwrap_or(defaults.from_email),
            contact_email: std::env::var("COMMENTS_CONTACT_EMAIL")
                .unwrap_or(defaults.contact_email),
            app_model_options: defaults.app_model_options,
        };

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("BLOG_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("BLOG_SERVICE_PORT", 8090)?,
            },
            cors,
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/runutin".to_string()),
                max_connections: parse_env_or_default("DATABASE_MAX_CONNECTIONS", 10)?,
                acquire_timeout_secs: parse_env_or_default("DATABASE_ACQUIRE_TIMEOUT_SECS", 10)?,
            },
            site: SiteConfig {
                root_url: non_empty_env("SITE_ROOT_URL"),
                feed_title: std::env::var("BLOG_FEED_TITLE")
                    .unwrap_or_else(|_| "Runutin Blog".to_string()),
                feed_description: std::env::var("BLOG_FEED_DESCRIPTION")
                    .unwrap_or_else(|_| "RSS feed for the latest blog posts".to_string()),
                blog_link: std::env::var("BLOG_LINK").unwrap_or_else(|_| "/blog/".to_string()),
            },
            admin,
            comments,
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => parse_value(key, &val),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| format!("Failed to parse {}='{}': {}", key, raw, e))
}
