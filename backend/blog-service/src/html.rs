//! Small HTML fragments served to the admin: the comment moderation table,
//! the comment edit form, and the page-listing comment badge.
use crate::models::{format_submit_date, Comment, CommentEditForm};
use crate::services::comments::FieldErrors;
use std::fmt::Write as _;

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

pub fn comment_edit_path(comment_id: i64) -> String {
    format!("/admin/blog/comments/{}/edit/", comment_id)
}

fn status_labels(comment: &Comment) -> &'static str {
    match (comment.is_public, comment.is_removed) {
        (_, true) => r#"<span class="status-tag">Removed</span>"#,
        (true, false) => r#"<span class="status-tag primary">Public</span>"#,
        (false, false) => r#"<span class="status-tag">Hidden</span>"#,
    }
}

/// Moderation table of all blog comments.
pub fn render_comment_list(title: &str, comments: &[Comment]) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<h1>{}</h1>", escape_html(title));

    if comments.is_empty() {
        html.push_str("<p class=\"help-block\">No comments yet.</p>\n");
        return html;
    }

    html.push_str(
        "<table class=\"listing\">\n<thead><tr><th>Author</th><th>Comment</th><th>Post</th>\
         <th>Submitted</th><th>Status</th><th>Actions</th></tr></thead>\n<tbody>\n",
    );
    for comment in comments {
        let _ = writeln!(
            html,
            "<tr data-comment-id=\"{id}\"><td>{name}<br><small>{email}</small></td><td>{body}</td>\
             <td>#{object}</td><td>{date}</td><td>{status}</td><td>\
             <a class=\"button button-small\" href=\"{edit}\">Edit</a> \
             <button class=\"button button-small\" data-action=\"/admin/blog/comments/{id}/toggle-public/\">Toggle public</button> \
             <button class=\"button button-small\" data-action=\"/admin/blog/comments/{id}/toggle-removed/\">Toggle removed</button>\
             </td></tr>",
            id = comment.id,
            name = escape_html(&comment.user_name),
            email = escape_html(&comment.user_email),
            body = escape_html(&comment.comment),
            object = escape_html(&comment.object_pk),
            date = format_submit_date(&comment.submit_date),
            status = status_labels(comment),
            edit = comment_edit_path(comment.id),
        );
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

fn error_list(errors: &FieldErrors, field: &str) -> String {
    match errors.get(field) {
        Some(messages) if !messages.is_empty() => {
            let mut out = String::from("<ul class=\"errorlist\">");
            for message in messages {
                let _ = write!(out, "<li>{}</li>", escape_html(message));
            }
            out.push_str("</ul>");
            out
        }
        _ => String::new(),
    }
}

fn text_input(html: &mut String, errors: &FieldErrors, name: &str, label: &str, kind: &str, value: &str) {
    let _ = writeln!(
        html,
        "<div class=\"field\"><label for=\"id_{name}\">{label}</label>\
         <input type=\"{kind}\" name=\"{name}\" id=\"id_{name}\" value=\"{value}\">{errors}</div>",
        name = name,
        label = label,
        kind = kind,
        value = escape_html(value),
        errors = error_list(errors, name),
    );
}

fn checkbox_input(html: &mut String, errors: &FieldErrors, name: &str, label: &str, checked: bool) {
    let _ = writeln!(
        html,
        "<div class=\"field\"><label><input type=\"checkbox\" name=\"{name}\" id=\"id_{name}\"{checked}> {label}</label>{errors}</div>",
        name = name,
        label = label,
        checked = if checked { " checked" } else { "" },
        errors = error_list(errors, name),
    );
}

/// Edit form for one comment, prefilled from `form` and annotated with `errors`.
pub fn render_comment_form(comment: &Comment, form: &CommentEditForm, errors: &FieldErrors) -> String {
    let mut html = String::new();
    let _ = writeln!(
        html,
        "<form method=\"post\" action=\"{}\" class=\"comment-edit-form\" data-comment-id=\"{}\">",
        comment_edit_path(comment.id),
        comment.id
    );
    html.push_str(&error_list(errors, "__all__"));

    text_input(&mut html, errors, "user_name", "Name", "text", &form.user_name);
    text_input(&mut html, errors, "user_email", "Email", "email", &form.user_email);
    text_input(&mut html, errors, "user_url", "URL", "url", &form.user_url);
    let _ = writeln!(
        html,
        "<div class=\"field\"><label for=\"id_comment\">Comment</label>\
         <textarea name=\"comment\" id=\"id_comment\" rows=\"5\">{}</textarea>{}</div>",
        escape_html(&form.comment),
        error_list(errors, "comment"),
    );
    checkbox_input(&mut html, errors, "is_public", "Is public", form.is_public_checked());
    checkbox_input(&mut html, errors, "is_removed", "Is removed", form.is_removed_checked());

    let _ = writeln!(
        html,
        "<p class=\"help\">Submitted {}</p>\n<button type=\"submit\" class=\"button\">Save</button>\n</form>",
        format_submit_date(&comment.submit_date)
    );
    html
}

/// Inline comment counter for the page listing.
pub fn render_comment_badge(count: i64) -> String {
    format!(
        "<span class=\"button button-small button-secondary\" title=\"Comment count\">\
         <svg class=\"icon icon-comment\" aria-hidden=\"true\"><use href=\"#icon-comment\"></use></svg> {}\
         </span>",
        count
    )
}
