/// Listing handlers - blog index pages
use crate::error::{AppError, Result};
use crate::services::{ListingParams, ListingService};
use crate::AppState;
use actix_web::{web, HttpResponse};

/// Context of a live blog index page as JSON. The query string is read as
/// raw pairs so repeated or unknown keys never reject the request.
pub async fn get_index_page(
    state: web::Data<AppState>,
    page_id: web::Path<i64>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse> {
    let page_id = page_id.into_inner();
    let index = state
        .pages
        .find_index_page(page_id)
        .await?
        .filter(|index| index.live)
        .ok_or_else(|| AppError::NotFound(format!("blog index page {}", page_id)))?;

    let params = ListingParams::from_pairs(query.into_inner());
    let service = ListingService::new(state.pages.clone());
    let context = service.context(&index, &params).await?;

    Ok(HttpResponse::Ok().json(context))
}
