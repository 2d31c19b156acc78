//! Server-rendered HTML for the operator confirmation step.
//!
//! The confirmation page shows the decoded request-object claims (or the
//! inline decode-error text) and carries the request context forward in a
//! form that submits to `/generate-response`.

/// Model for the confirmation page.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationView {
    /// Issuer display name.
    pub issuer_name: String,
    /// Client id of the requesting relying party.
    pub client_id: String,
    /// Raw request object, passed through for Finalize.
    pub request: Option<String>,
    /// State parameter, passed through for Finalize.
    pub state: Option<String>,
    /// Redirect URI resolved from the request.
    pub redirect_uri: Option<String>,
    /// Pretty-printed shared claims, or the inline decode-error text.
    pub shared_claims: String,
    /// Suggested payload identifier for the operator form.
    pub suggested_payload_id: String,
    /// Error-injection parameters, passed through for Finalize.
    pub requested_oauth_error: Option<String>,
    /// Error-injection target endpoint, passed through for Finalize.
    pub requested_oauth_error_endpoint: Option<String>,
    /// Error-injection description, passed through for Finalize.
    pub requested_oauth_error_description: Option<String>,
}

/// Renders the confirmation page.
#[must_use]
pub fn render_confirmation(view: &ConfirmationView) -> String {
    let mut hidden = String::new();
    push_hidden(&mut hidden, "client_id", Some(&view.client_id));
    push_hidden(&mut hidden, "request", view.request.as_deref());
    push_hidden(&mut hidden, "state", view.state.as_deref());
    push_hidden(&mut hidden, "redirect_uri", view.redirect_uri.as_deref());
    push_hidden(
        &mut hidden,
        "requested_oauth_error",
        view.requested_oauth_error.as_deref(),
    );
    push_hidden(
        &mut hidden,
        "requested_oauth_error_endpoint",
        view.requested_oauth_error_endpoint.as_deref(),
    );
    push_hidden(
        &mut hidden,
        "requested_oauth_error_description",
        view.requested_oauth_error_description.as_deref(),
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{issuer} - Confirm issuance</title>
</head>
<body>
<h1>{issuer}</h1>
<p>Authorization request from client <strong>{client}</strong></p>
<h2>Shared claims</h2>
<pre id="shared-claims">{claims}</pre>
<h2>Credential payload</h2>
<form method="get" action="/generate-response">
{hidden}<label for="json_payload">JSON payload</label><br>
<textarea id="json_payload" name="json_payload" rows="12" cols="80">{{}}</textarea><br>
<label for="resourceId">Payload identifier</label><br>
<input id="resourceId" name="resourceId" value="{payload_id}" size="40"><br>
<button type="submit">Issue credential</button>
</form>
</body>
</html>
"#,
        issuer = html_escape(&view.issuer_name),
        client = html_escape(&view.client_id),
        claims = html_escape(&view.shared_claims),
        hidden = hidden,
        payload_id = html_escape(&view.suggested_payload_id),
    )
}

fn push_hidden(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!(
            "<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
            name,
            html_escape(value)
        ));
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html_metacharacters() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape(r#"a"b"#), "a&quot;b");
    }

    #[test]
    fn confirmation_carries_context_forward() {
        let view = ConfirmationView {
            issuer_name: "Credential Issuer Stub".to_string(),
            client_id: "clientIdValid".to_string(),
            request: Some("eyJ.abc.def".to_string()),
            state: Some("test-state".to_string()),
            shared_claims: "{\n  \"test\": 1\n}".to_string(),
            suggested_payload_id: "resource-1".to_string(),
            ..ConfirmationView::default()
        };

        let html = render_confirmation(&view);
        assert!(html.contains("Credential Issuer Stub"));
        assert!(html.contains(r#"name="request" value="eyJ.abc.def""#));
        assert!(html.contains(r#"name="state" value="test-state""#));
        assert!(html.contains(r#"name="resourceId" value="resource-1""#));
        assert!(html.contains("&quot;test&quot;: 1"));
    }

    #[test]
    fn absent_context_fields_are_omitted() {
        let view = ConfirmationView {
            issuer_name: "Stub".to_string(),
            client_id: "c".to_string(),
            ..ConfirmationView::default()
        };

        let html = render_confirmation(&view);
        assert!(!html.contains(r#"name="request""#));
        assert!(!html.contains(r#"name="requested_oauth_error""#));
    }
}
