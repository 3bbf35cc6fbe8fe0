//! HTML confirmation page shown to the person who scanned the code.

use axum::http::StatusCode;
use axum::response::Html;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::{Outcome, Registrant};

const SUCCESS_COLOR: &str = "#10b981";
const FAILURE_COLOR: &str = "#ef4444";

const STYLE: &str = r"
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
  display: flex; justify-content: center; align-items: center;
  min-height: 100vh; padding: 20px;
  background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
}
.container {
  background: white; padding: 40px; border-radius: 20px;
  box-shadow: 0 20px 60px rgba(0,0,0,0.3);
  text-align: center; max-width: 500px; width: 100%;
}
.status-icon {
  width: 80px; height: 80px; border-radius: 50%; color: white;
  display: flex; align-items: center; justify-content: center;
  font-size: 48px; margin: 0 auto 20px;
}
h1 { color: #1f2937; margin-bottom: 10px; font-size: 28px; }
.message { color: #6b7280; font-size: 16px; margin-bottom: 20px; }
.details { background: #f9fafb; padding: 20px; border-radius: 10px; margin-top: 20px; }
.detail-row {
  display: flex; justify-content: space-between;
  padding: 10px 0; border-bottom: 1px solid #e5e7eb;
}
.detail-row:last-child { border-bottom: none; }
.detail-label { font-weight: 600; color: #4b5563; }
.detail-value { color: #1f2937; }
.timestamp { margin-top: 20px; font-size: 14px; color: #9ca3af; }
";

/// Renders the page for a check-in outcome, with its status code.
#[must_use]
pub fn outcome(outcome: &Outcome) -> (StatusCode, Html<String>) {
    (
        outcome.status_code(),
        Html(render(
            outcome.is_success(),
            outcome.message(),
            outcome.registrant(),
            Utc::now(),
        )),
    )
}

/// Renders a failure page with no registrant details.
#[must_use]
pub fn failure(status: StatusCode, message: &str) -> (StatusCode, Html<String>) {
    (status, Html(render(false, message, None, Utc::now())))
}

fn render(
    success: bool,
    message: &str,
    registrant: Option<&Registrant>,
    rendered_at: DateTime<Utc>,
) -> String {
    let (color, icon, title, heading) = if success {
        (SUCCESS_COLOR, "✓", "Check-in Success", "Check-in Successful!")
    } else {
        (FAILURE_COLOR, "✗", "Check-in Failed", "Check-in Failed")
    };
    let details = registrant.map(details).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<div class="container">
<div class="status-icon" style="background: {color}">{icon}</div>
<h1>{heading}</h1>
<p class="message">{message}</p>
{details}
<p class="timestamp">Timestamp: {timestamp}</p>
</div>
</body>
</html>
"#,
        message = escape(message),
        timestamp = format_timestamp(rendered_at),
    )
}

fn details(registrant: &Registrant) -> String {
    let mut rows = vec![
        detail_row("Name", &registrant.name),
        detail_row("Email", registrant.email.as_str()),
    ];
    if let Some(at) = registrant.checked_in_at {
        rows.push(detail_row("Checked in at", &format_timestamp(at)));
    }
    format!("<div class=\"details\">\n{}\n</div>", rows.join("\n"))
}

fn detail_row(label: &str, value: &str) -> String {
    format!(
        "<div class=\"detail-row\"><span class=\"detail-label\">{label}:</span>\
         <span class=\"detail-value\">{}</span></div>",
        escape(value)
    )
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Escapes text for use in HTML element content and attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
