/// HTTP handlers for blog endpoints
///
/// - Listing: blog index page context
/// - Feed: site-wide and per-category RSS
/// - Comments: admin moderation (list, edit, toggles) and public settings
/// - Pages: admin page creation, page-listing badge, editor features
pub mod comments;
pub mod feed;
pub mod listing;
pub mod pages;

use actix_web::web;

/// Register every blog route. Feed routes come before `/blog/{page_id}/` so
/// `rss` is never read as a page id.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/blog")
            .route("/rss/", web::get().to(feed::site_feed))
            .route(
                "/rss/category/{page_id}/",
                web::get().to(feed::category_feed),
            )
            .route(
                "/comments/settings/",
                web::get().to(comments::comment_settings),
            )
            .route("/{page_id}/", web::get().to(listing::get_index_page)),
    )
    .service(
        web::scope("/admin/blog")
            .route("/comments/", web::get().to(comments::list_comments))
            .service(
                web::resource("/comments/{comment_id}/edit/")
                    .route(web::get().to(comments::edit_comment_form))
                    .route(web::post().to(comments::update_comment)),
            )
            .route(
                "/comments/{comment_id}/toggle-public/",
                web::route().to(comments::toggle_public),
            )
            .route(
                "/comments/{comment_id}/toggle-removed/",
                web::route().to(comments::toggle_removed),
            )
            .route(
                "/pages/{page_id}/listing-buttons/",
                web::get().to(pages::page_listing_buttons),
            )
            .route("/indexes/", web::post().to(pages::create_index_page))
            .route(
                "/indexes/{page_id}/posts/",
                web::post().to(pages::create_post),
            )
            .route(
                "/rich-text-features/",
                web::get().to(pages::rich_text_features),
            ),
    )
    .route(
        "/metrics",
        web::get().to(crate::metrics::serve_metrics),
    );
}
