use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Index page listings composed, split by whether a search ran.
    pub static ref LISTING_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_listing_requests_total",
        "Blog index listings composed segmented by mode (browse, search)",
        &["mode"]
    )
    .expect("failed to register blog_listing_requests_total");
}
