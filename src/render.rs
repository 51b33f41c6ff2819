//! Inline HTML templates for the front-end pages.
//!
//! Values are escaped for the context they land in: element text, or a
//! URL inside an `href` attribute. The About page's `content` field is rich
//! text and is emitted as-is.

use std::borrow::Cow;

use serde_json::Value;

use crate::cms::ContentRecord;

/// Replacement for URLs with a disallowed scheme.
pub const UNSAFE_URL: &str = "#ZgotmplZ";

/// Escape text for HTML element content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '+' => out.push_str("&#43;"),
            '\0' => out.push('\u{FFFD}'),
            c => out.push(c),
        }
    }
    out
}

/// Unescaped display form of a field value; missing and null are empty.
pub fn display(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

/// A field rendered as escaped text.
pub fn text(value: Option<&Value>) -> String {
    escape_html(&display(value))
}

/// A field rendered as trusted HTML when it is a string.
pub fn richtext(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(html)) => html.clone(),
        other => text(other),
    }
}

/// Whether a URL has no scheme or one of http, https, mailto.
pub fn is_safe_url(url: &str) -> bool {
    match url.find(':') {
        Some(i) if !url[..i].contains('/') => {
            let scheme = &url[..i];
            scheme.eq_ignore_ascii_case("http")
                || scheme.eq_ignore_ascii_case("https")
                || scheme.eq_ignore_ascii_case("mailto")
        }
        _ => true,
    }
}

/// Percent-encode bytes that may not appear in a URL, keeping existing escapes.
pub fn normalize_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for b in url.bytes() {
        match b {
            b'!' | b'#' | b'$' | b'&' | b'*' | b'+' | b',' | b'/' | b':' | b';' | b'=' | b'?'
            | b'@' | b'[' | b']' | b'-' | b'.' | b'_' | b'~' | b'%' => out.push(b as char),
            b if b.is_ascii_alphanumeric() => out.push(b as char),
            b => out.push_str(&format!("%{:02x}", b)),
        }
    }
    out
}

/// A field rendered as the value of an `href` attribute.
pub fn url_attr(value: Option<&Value>) -> String {
    let raw = display(value);
    if !is_safe_url(&raw) {
        return UNSAFE_URL.to_string();
    }
    escape_html(&normalize_url(&raw))
}

fn details_items(record: &ContentRecord) -> String {
    let Some(Value::Array(details)) = record.get("details") else {
        return String::new();
    };

    details
        .iter()
        .map(|detail| format!("\n\t\t\t<li>{}</li>", text(Some(detail))))
        .collect()
}

/// Landing page linking to the events list.
pub fn index_page() -> String {
    r#"<p><a href="/events">See All Events</a></p>"#.to_string()
}

/// About page: heading plus rich-text body.
pub fn about_page(record: &ContentRecord) -> String {
    format!(
        "\n\t<h1>{}</h1>\n\t<div>{}</div>\n",
        text(record.get("title")),
        richtext(record.get("content")),
    )
}

/// Events list followed by the submission form.
pub fn events_page(records: &[ContentRecord]) -> String {
    let mut html = String::from("\n<ul>");

    for record in records {
        let id = display(record.get("id"));
        html.push_str(&format!(
            "\n\t<li>\n\t\t<h3><a href=\"/event/{}\">{}</a></h3>\n\t\t<ol>{}\n\t\t</ol>\n\t\t<a href=\"{}\">Buy Tickets</a>\n\t</li>",
            escape_html(&normalize_url(&id)),
            text(record.get("title")),
            details_items(record),
            url_attr(record.get("ticket_link")),
        ));
    }

    html.push_str(
        r#"
</ul>

<h2>Submit new event:</h2>
<form action="/events" method="post" enctype="multipart/form-data">
	<label>Title <br/><input name="title"/></label><br/>
	<label>Details <br/><input name="details.0"/><br/><input name="details.1"/><br/><input name="details.2"/></label><br/>
	<label>Ticket Link <br/><input name="ticket_link"/></label><br/>
	<input type="submit" value="Submit"/>
</form>
"#,
    );

    html
}

/// Single event page with a link back to the list.
pub fn event_page(record: &ContentRecord) -> String {
    format!(
        "\n<p><a href=\"/events\">&larr; All Events</a></p>\n<h3>{}</h3>\n<ol>{}\n</ol>\n<a href=\"{}\">Buy Tickets</a>\n",
        text(record.get("title")),
        details_items(record),
        url_attr(record.get("ticket_link")),
    )
}
