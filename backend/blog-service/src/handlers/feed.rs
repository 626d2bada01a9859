/// Feed handlers - RSS documents
use crate::error::Result;
use crate::services::feed::RSS_CONTENT_TYPE;
use crate::services::FeedService;
use crate::AppState;
use actix_web::{web, HttpResponse};

/// Latest posts of the whole site.
pub async fn site_feed(state: web::Data<AppState>) -> Result<HttpResponse> {
    let service = FeedService::new(state.pages.clone(), state.site.clone());
    let channel = service.site_feed().await?;

    Ok(HttpResponse::Ok()
        .content_type(RSS_CONTENT_TYPE)
        .body(channel.render()))
}

/// Latest posts under one blog index page.
pub async fn category_feed(
    state: web::Data<AppState>,
    page_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = FeedService::new(state.pages.clone(), state.site.clone());
    let channel = service.category_feed(page_id.into_inner()).await?;

    Ok(HttpResponse::Ok()
        .content_type(RSS_CONTENT_TYPE)
        .body(channel.render()))
}
