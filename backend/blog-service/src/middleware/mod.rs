/// HTTP request guards for blog-service
///
/// Admin routes take an [`AdminAuth`] extractor that checks the bearer token
/// against the configured admin token.
use crate::AppState;
use actix_web::{error::ErrorUnauthorized, web, Error, FromRequest, HttpRequest};
use std::future::{ready, Ready};

/// Proof that the request carried a valid admin token.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

/// Length-independent comparison so token checks do not short-circuit.
fn tokens_match(expected: &str, provided: &str) -> bool {
    let expected = expected.as_bytes();
    let provided = provided.as_bytes();
    let mut diff = expected.len() ^ provided.len();
    for (i, byte) in provided.iter().enumerate() {
        let other = expected.get(i % expected.len().max(1)).copied().unwrap_or(0);
        diff |= usize::from(byte ^ other);
    }
    diff == 0
}

fn authorize(req: &HttpRequest) -> Result<AdminAuth, Error> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ErrorUnauthorized("Admin state missing"))?;

    let expected = match state.admin.api_token.as_deref() {
        Some(token) => token,
        None => return Ok(AdminAuth),
    };

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ErrorUnauthorized("Missing Authorization header"))?
        .strip_prefix("Bearer ")
        .ok_or_else(|| ErrorUnauthorized("Invalid Authorization scheme"))?;

    if tokens_match(expected, token.trim()) {
        Ok(AdminAuth)
    } else {
        Err(ErrorUnauthorized("Invalid admin token"))
    }
}

impl FromRequest for AdminAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(authorize(req))
    }
}
