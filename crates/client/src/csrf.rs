//! CSRF token extraction from EV's web-UI markup.
//!
//! EV embeds the token as a hidden form input; there is no documented API
//! for this. The pattern match lives behind this one function so it can be
//! swapped for a real HTML parse if the markup ever changes shape.

use std::sync::OnceLock;

use regex::Regex;

fn re_csrf() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r#"<input type="hidden" name="csrfmiddlewaretoken" value="([a-zA-Z0-9]+)">"#)
            .expect("invalid regex")
    })
}

/// Pulls the CSRF token out of a rendered EV page, if present.
pub fn extract_csrf_token(html: &str) -> Option<&str> {
    re_csrf()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
