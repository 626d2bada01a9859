/// Page handlers - admin page creation and page-listing extras
use crate::error::Result;
use crate::html::{render_comment_badge, HTML_CONTENT_TYPE};
use crate::middleware::AdminAuth;
use crate::models::page::RICH_TEXT_FEATURES;
use crate::models::{NewBlogPage, NewIndexPage};
use crate::services::{CommentModerationService, PageService};
use crate::AppState;
use actix_web::{web, HttpResponse};

/// Create a blog index page.
pub async fn create_index_page(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    req: web::Json<NewIndexPage>,
) -> Result<HttpResponse> {
    let page = PageService::new(state.pages.clone())
        .create_index_page(&req)
        .await?;

    Ok(HttpResponse::Created().json(page))
}

/// Create a blog post under an index page. The response carries the
/// editor confirmation message.
pub async fn create_post(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    parent_id: web::Path<i64>,
    req: web::Json<NewBlogPage>,
) -> Result<HttpResponse> {
    let created = PageService::new(state.pages.clone())
        .create_post(parent_id.into_inner(), &req)
        .await?;

    Ok(HttpResponse::Created().json(created))
}

/// Comment counter for the page listing; empty when there is nothing to show.
pub async fn page_listing_buttons(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    page_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = CommentModerationService::new(state.comments.clone(), state.pages.clone());
    let body = match service.listing_badge(page_id.into_inner()).await? {
        Some(count) => render_comment_badge(count),
        None => String::new(),
    };

    Ok(HttpResponse::Ok().content_type(HTML_CONTENT_TYPE).body(body))
}

/// Formatting the rich-text editor may offer.
pub async fn rich_text_features(_admin: AdminAuth) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "features": RICH_TEXT_FEATURES }))
}
