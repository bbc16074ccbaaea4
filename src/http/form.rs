//! URL-encoded form bodies

use url::form_urlencoded;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Whether a `Content-Type` value (parameters allowed) names a URL-encoded form
pub fn is_form_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// Value of form field `name` in `body`
///
/// When the field repeats, the last value wins. Surrounding whitespace is
/// trimmed. Empty values are kept (`query=` yields `Some("")`).
pub fn body_argument(body: &[u8], name: &str) -> Option<String> {
    form_urlencoded::parse(body)
        .filter(|(key, _)| key == name)
        .last()
        .map(|(_, value)| value.trim().to_string())
}
