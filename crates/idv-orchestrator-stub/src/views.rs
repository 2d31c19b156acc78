//! HTML rendering for the retrieved identity.

use serde_json::{Map, Value};

/// Renders the retrieved attribute map as a table.
#[must_use]
pub fn render_identity(attributes: &Map<String, Value>) -> String {
    let mut rows = String::new();
    for (name, value) in attributes {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            html_escape(name),
            html_escape(&rendered)
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Retrieved identity</title>
</head>
<body>
<h1>Retrieved identity</h1>
<table>
<thead><tr><th>Attribute</th><th>Value</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
<p><a href="/authorize">Start again</a></p>
</body>
</html>
"#
    )
}

/// Renders a flow failure.
#[must_use]
pub fn render_error(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Identity verification failed</title>
</head>
<body>
<h1>Identity verification failed</h1>
<p>{}</p>
<p><a href="/authorize">Start again</a></p>
</body>
</html>
"#,
        html_escape(message)
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
