//! HTML rendering helpers for the web UI.
//!
//! Everything interpolated into markup goes through `escape`.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::domain::{DomainError, ValidationErrors};
use crate::web::session::SessionUser;

/// Rows per page on the list screens
pub const PAGE_SIZE: u64 = 50;

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn document(title: &str, nav: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Librarium</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<header><a class="brand" href="/">Librarium</a>{nav}</header>
<main>
<h1>{title}</h1>
{content}
</main>
</body>
</html>"#,
        title = escape(title),
        nav = nav,
        content = content,
    )
}

/// Full page with navigation for a signed-in user.
pub fn layout(title: &str, user: &SessionUser, content: &str) -> Html<String> {
    let nav = format!(
        r#"<nav>
<a href="/books">Books</a>
<a href="/classifications">Classifications</a>
<a href="/classification-details">Classification details</a>
<a href="/divisions">Divisions</a>
<span class="user">{username}</span>
<a href="/account/password">Password</a>
<form method="post" action="/logout" class="inline"><button type="submit">Log out</button></form>
</nav>"#,
        username = escape(&user.username),
    );
    Html(document(title, &nav, content))
}

/// Page without navigation, used by the login screen.
pub fn bare_layout(title: &str, content: &str) -> Html<String> {
    Html(document(title, "", content))
}

pub fn render(status: StatusCode, page: Html<String>) -> Response {
    (status, page).into_response()
}

/// Renders a domain failure as an HTML page.
pub fn error_page(user: &SessionUser, err: DomainError) -> Response {
    let status = err.status_code();
    let (title, message) = match &err {
        DomainError::NotFound => ("Not found", "The requested record does not exist.".to_string()),
        DomainError::Conflict(msg) => ("Cannot complete the request", msg.clone()),
        DomainError::Forbidden => (
            "Permission denied",
            "You do not have permission to do that.".to_string(),
        ),
        DomainError::Database(_) | DomainError::Internal(_) => {
            tracing::error!("Web request failed: {}", err);
            ("Server error", "Something went wrong. Please try again.".to_string())
        }
        _ => ("Error", err.to_string()),
    };

    let content = format!(
        r#"<p class="error">{}</p><p><a href="javascript:history.back()">Back</a></p>"#,
        escape(&message)
    );
    render(status, layout(title, user, &content))
}

pub fn errors_for(errors: Option<&ValidationErrors>, field: &str) -> String {
    errors
        .and_then(|e| e.get(field))
        .map(|messages| {
            let items: String = messages
                .iter()
                .map(|m| format!("<li>{}</li>", escape(m)))
                .collect();
            format!(r#"<ul class="errorlist">{}</ul>"#, items)
        })
        .unwrap_or_default()
}

pub fn text_input(
    label: &str,
    name: &str,
    value: &str,
    errors: Option<&ValidationErrors>,
    extra: &str,
) -> String {
    format!(
        r#"<p><label for="id_{name}">{label}</label>{errs}<input type="text" id="id_{name}" name="{name}" value="{value}" {extra}></p>"#,
        name = name,
        label = escape(label),
        errs = errors_for(errors, name),
        value = escape(value),
        extra = extra,
    )
}

pub fn password_input(label: &str, name: &str, errors: Option<&ValidationErrors>) -> String {
    format!(
        r#"<p><label for="id_{name}">{label}</label>{errs}<input type="password" id="id_{name}" name="{name}" required></p>"#,
        name = name,
        label = escape(label),
        errs = errors_for(errors, name),
    )
}

pub fn date_input(
    label: &str,
    name: &str,
    value: &str,
    errors: Option<&ValidationErrors>,
) -> String {
    format!(
        r#"<p><label for="id_{name}">{label}</label>{errs}<input type="date" id="id_{name}" name="{name}" value="{value}"></p>"#,
        name = name,
        label = escape(label),
        errs = errors_for(errors, name),
        value = escape(value),
    )
}

pub fn checkbox(label: &str, name: &str, checked: bool, errors: Option<&ValidationErrors>) -> String {
    format!(
        r#"<p>{errs}<label><input type="checkbox" name="{name}"{checked}> {label}</label></p>"#,
        name = name,
        label = escape(label),
        errs = errors_for(errors, name),
        checked = if checked { " checked" } else { "" },
    )
}

/// A `<select>`; `options` are `(value, label)` pairs.
pub fn select(
    label: &str,
    name: &str,
    options: &[(String, String)],
    selected: &str,
    errors: Option<&ValidationErrors>,
) -> String {
    let mut html = format!(
        r#"<p><label for="id_{name}">{label}</label>{errs}<select id="id_{name}" name="{name}"><option value="">---------</option>"#,
        name = name,
        label = escape(label),
        errs = errors_for(errors, name),
    );
    for (value, text) in options {
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            escape(value),
            if value.eq_ignore_ascii_case(selected) { " selected" } else { "" },
            escape(text)
        ));
    }
    html.push_str("</select></p>");
    html
}

pub fn form(action: &str, fields: &str, submit: &str, cancel: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">{fields}<p><button type="submit">{submit}</button> <a href="{cancel}">Cancel</a></p></form>"#,
        action = escape(action),
        fields = fields,
        submit = escape(submit),
        cancel = escape(cancel),
    )
}

/// Delete confirmation used by every catalog.
pub fn confirm_delete(what: &str, action: &str, cancel: &str) -> String {
    format!(
        r#"<p>Are you sure you want to delete {what}?</p>
<form method="post" action="{action}"><button type="submit" class="danger">Yes, delete</button> <a href="{cancel}">No, take me back</a></form>"#,
        what = escape(what),
        action = escape(action),
        cancel = escape(cancel),
    )
}

/// Builds `path?key=value&...`, skipping empty values.
pub fn link_with_query(path: &str, params: &[(&str, &str)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query.join("&"))
    }
}

/// Previous / next links for a list screen.
pub fn pager(path: &str, params: &[(&str, &str)], page: u64, total: u64) -> String {
    let pages = total.div_ceil(PAGE_SIZE).max(1);
    if pages <= 1 {
        return String::new();
    }

    let link = |p: u64| {
        let page = p.to_string();
        let mut all: Vec<(&str, &str)> = params.to_vec();
        all.push(("page", page.as_str()));
        escape(&link_with_query(path, &all))
    };

    let mut html = String::from(r#"<p class="pager">"#);
    // past the end, "previous" leads back to the last real page
    if page > 0 {
        let previous = page.min(pages) - 1;
        html.push_str(&format!(r#"<a href="{}">&laquo; Previous</a> "#, link(previous)));
    }
    let current = page.saturating_add(1);
    html.push_str(&format!("Page {} of {}", current, pages));
    if current < pages {
        html.push_str(&format!(r#" <a href="{}">Next &raquo;</a>"#, link(current)));
    }
    html.push_str("</p>");
    html
}
