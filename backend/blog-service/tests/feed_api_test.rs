mod common;

use actix_web::{http::header, test, App};
use blog_service::handlers;
use common::memory_store::{MemoryCommentStore, MemoryPageStore};

async fn get_feed(pages: &MemoryPageStore, uri: &str) -> (u16, String, String) {
    let state = common::state(pages, &MemoryCommentStore::new());
    let app = test::init_service(App::new().app_data(state).configure(handlers::configure)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    (status, content_type, body)
}

#[actix_web::test]
async fn site_feed_lists_every_live_post_newest_first() {
    let pages = MemoryPageStore::new();
    let tech = pages.add_index(None, "Tech", 9);
    let travel = pages.add_index(None, "Travel", 9);
    pages.add_post(tech, "Older <post>", "2024-01-01", &[]);
    let summary = pages.add_post(travel, "Newer", "2024-02-01", &[]);
    pages.update_post(summary, |post| post.listing_summary = Some("Card text".into()));
    let draft = pages.add_post(tech, "Draft", "2024-03-01", &[]);
    pages.update_post(draft, |post| post.live = false);

    let (status, content_type, body) = get_feed(&pages, "/blog/rss/").await;
    assert_eq!(status, 200);
    assert!(content_type.starts_with("application/rss+xml"));
    assert!(body.contains("<title>Runutin Blog</title>"));
    assert!(body.contains("<title>Older &lt;post&gt;</title>"));
    assert!(body.contains("<link>https://runutin.test/travel/newer/</link>"));
    assert!(body.contains("<description>Card text</description>"));
    assert!(body.contains("<description>Intro of Older &lt;post&gt;</description>"));
    assert!(!body.contains("Draft"));

    let newer = body.find("<title>Newer</title>").unwrap();
    let older = body.find("<title>Older &lt;post&gt;</title>").unwrap();
    assert!(newer < older);
}

#[actix_web::test]
async fn category_feed_keeps_live_descendants_only() {
    let pages = MemoryPageStore::new();
    let tech = pages.add_index(None, "Tech", 9);
    let travel = pages.add_index(None, "Travel", 9);
    pages.add_post(tech, "Borrow checker", "2024-01-05", &[]);
    pages.add_post(travel, "Lisbon", "2024-01-06", &[]);
    let draft = pages.add_post(tech, "Hidden draft", "2024-01-07", &[]);
    pages.update_post(draft, |post| post.live = false);

    let (status, _, body) = get_feed(&pages, &format!("/blog/rss/category/{}/", tech)).await;
    assert_eq!(status, 200);
    assert!(body.contains("<title>Runutin Blog — Tech</title>"));
    assert!(body.contains("Borrow checker"));
    assert!(!body.contains("Lisbon"));
    assert!(!body.contains("Hidden draft"));
}

#[actix_web::test]
async fn feeds_cap_at_twenty_items() {
    let pages = MemoryPageStore::new();
    let tech = pages.add_index(None, "Tech", 9);
    for day in 1..=25 {
        pages.add_post(tech, &format!("Post {}", day), &format!("2024-01-{:02}", day), &[]);
    }

    let (_, _, body) = get_feed(&pages, &format!("/blog/rss/category/{}/", tech)).await;
    assert_eq!(body.matches("<item>").count(), 20);
    assert!(body.contains("<title>Post 25</title>"));
    assert!(!body.contains("<title>Post 5</title>"));

    let (_, _, body) = get_feed(&pages, "/blog/rss/").await;
    assert_eq!(body.matches("<item>").count(), 20);
}

#[actix_web::test]
async fn category_feed_for_unknown_index_is_not_found() {
    let pages = MemoryPageStore::new();
    let tech = pages.add_index(None, "Tech", 9);
    let post = pages.add_post(tech, "Leaf", "2024-01-01", &[]);

    let (status, _, _) = get_feed(&pages, "/blog/rss/category/4242/").await;
    assert_eq!(status, 404);

    let (status, _, _) = get_feed(&pages, &format!("/blog/rss/category/{}/", post)).await;
    assert_eq!(status, 404);
}
