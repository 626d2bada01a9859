/// Comment handlers - admin moderation endpoints and public settings
use crate::config::BLOG_POST_CONTENT_TYPE;
use crate::error::Result;
use crate::html::{render_comment_form, render_comment_list, HTML_CONTENT_TYPE};
use crate::middleware::AdminAuth;
use crate::models::{
    CommentEditForm, CommentEditResponse, ModerationAction, ModerationResponse,
};
use crate::services::comments::FieldErrors;
use crate::services::{CommentModerationService, EditOutcome};
use crate::AppState;
use actix_web::{http::Method, web, HttpRequest, HttpResponse};
use serde::Serialize;

const COMMENTS_PAGE_TITLE: &str = "Blog comments";

fn service(state: &AppState) -> CommentModerationService {
    CommentModerationService::new(state.comments.clone(), state.pages.clone())
}

/// Moderation table of every comment on blog posts.
pub async fn list_comments(_admin: AdminAuth, state: web::Data<AppState>) -> Result<HttpResponse> {
    let comments = service(&state).list().await?;

    Ok(HttpResponse::Ok()
        .content_type(HTML_CONTENT_TYPE)
        .body(render_comment_list(COMMENTS_PAGE_TITLE, &comments)))
}

/// Edit form fragment for one comment.
pub async fn edit_comment_form(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let comment = service(&state).get(comment_id.into_inner()).await?;
    let form = CommentEditForm::from_comment(&comment);

    Ok(HttpResponse::Ok()
        .content_type(HTML_CONTENT_TYPE)
        .body(render_comment_form(&comment, &form, &FieldErrors::new())))
}

/// Decode an urlencoded body into raw pairs. Undecodable input yields no
/// pairs, which the form validation then reports field by field.
fn form_pairs(body: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(body);
    web::Query::<Vec<(String, String)>>::from_query(&text)
        .map(web::Query::into_inner)
        .unwrap_or_default()
}

/// Save the edit form; an invalid form comes back as HTML with a 400.
pub async fn update_comment(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    comment_id: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let form = CommentEditForm::from_pairs(form_pairs(&body));
    match service(&state).edit(comment_id.into_inner(), &form).await? {
        EditOutcome::Saved(comment) => {
            Ok(HttpResponse::Ok().json(CommentEditResponse::from(&comment)))
        }
        EditOutcome::Invalid { comment, errors } => Ok(HttpResponse::BadRequest()
            .content_type(HTML_CONTENT_TYPE)
            .body(render_comment_form(&comment, &form, &errors))),
    }
}

async fn toggle(
    req: &HttpRequest,
    state: &AppState,
    comment_id: i64,
    action: ModerationAction,
) -> Result<HttpResponse> {
    if req.method() != Method::POST {
        return Ok(HttpResponse::BadRequest().body("Invalid method"));
    }

    let comment = service(state).toggle(comment_id, action).await?;
    Ok(HttpResponse::Ok().json(ModerationResponse::from(&comment)))
}

/// Flip `is_public`; publishing also clears `is_removed`.
pub async fn toggle_public(
    _admin: AdminAuth,
    req: HttpRequest,
    state: web::Data<AppState>,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse> {
    toggle(&req, &state, comment_id.into_inner(), ModerationAction::TogglePublic).await
}

/// Flip `is_removed`; removing also clears `is_public`.
pub async fn toggle_removed(
    _admin: AdminAuth,
    req: HttpRequest,
    state: web::Data<AppState>,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse> {
    toggle(&req, &state, comment_id.into_inner(), ModerationAction::ToggleRemoved).await
}

#[derive(Debug, Serialize)]
struct CommentSettingsResponse<'a> {
    content_type: &'a str,
    confirm_email: bool,
    max_thread_level: u32,
    list_paginate_by: u32,
    allow_flagging: bool,
    allow_feedback: bool,
    show_feedback: bool,
}

/// Settings the public comment widget needs for blog posts.
pub async fn comment_settings(state: web::Data<AppState>) -> HttpResponse {
    let settings = &state.comment_settings;
    let options = settings.options_for(BLOG_POST_CONTENT_TYPE);

    HttpResponse::Ok().json(CommentSettingsResponse {
        content_type: BLOG_POST_CONTENT_TYPE,
        confirm_email: settings.confirm_email,
        max_thread_level: settings.max_thread_level,
        list_paginate_by: settings.list_paginate_by,
        allow_flagging: options.allow_flagging,
        allow_feedback: options.allow_feedback,
        show_feedback: options.show_feedback,
    })
}
