use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// RSS documents rendered, by feed kind (site, category).
    pub static ref FEED_RENDER_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_feed_render_total",
        "RSS feeds rendered segmented by feed kind",
        &["feed"]
    )
    .expect("failed to register blog_feed_render_total");
}
