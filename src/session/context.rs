/// Header and cookie state attached to outgoing requests
use std::collections::HashMap;

use super::RawCookie;

const PLATFORM_ORIGIN: &str = "https://www.bilibili.com";

/// The headers and parsed cookies sent with every request
///
/// A context is immutable once built. Refreshing the session builds a whole
/// new value and swaps it in behind an `Arc`, so in-flight requests never
/// observe a half-updated header set.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Header map sent with every request, including the `Cookie` header
    pub headers: HashMap<String, String>,
    /// Parsed cookie jar backing the `Cookie` header
    pub cookies: HashMap<String, String>,
}

impl SessionContext {
    /// Builds a context from a User-Agent plus captured cookies
    ///
    /// The `Cookie` header joins the cookies in capture order; the cookie
    /// map keeps the last value for a repeated name.
    pub fn new(user_agent: &str, cookies: &[RawCookie]) -> Self {
        let mut headers = HashMap::new();
        headers.insert("User-Agent".to_string(), user_agent.to_string());
        headers.insert("Origin".to_string(), PLATFORM_ORIGIN.to_string());
        headers.insert("Referer".to_string(), PLATFORM_ORIGIN.to_string());

        let cookie_header = build_cookie_header(cookies);
        if !cookie_header.is_empty() {
            headers.insert("Cookie".to_string(), cookie_header);
        }

        let cookie_map = cookies
            .iter()
            .map(|cookie| (cookie.name.clone(), cookie.value.clone()))
            .collect();

        Self {
            headers,
            cookies: cookie_map,
        }
    }

    /// Returns a single cookie value, if present
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

fn build_cookie_header(cookies: &[RawCookie]) -> String {
    cookies
        .iter()
        .map(|cookie| format!("{}={}", cookie.name, cookie.value))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_cookies() -> Vec<RawCookie> {
        vec![
            RawCookie {
                name: "SESSDATA".to_string(),
                value: "abc123".to_string(),
            },
            RawCookie {
                name: "buvid3".to_string(),
                value: "device-xyz".to_string(),
            },
        ]
    }

    #[test]
    fn test_builds_cookie_header_in_capture_order() {
        let context = SessionContext::new("TestAgent/1.0", &create_test_cookies());

        assert_eq!(
            context.headers.get("Cookie").map(String::as_str),
            Some("SESSDATA=abc123; buvid3=device-xyz")
        );
    }

    #[test]
    fn test_builds_cookie_map() {
        let context = SessionContext::new("TestAgent/1.0", &create_test_cookies());

        assert_eq!(context.cookie("SESSDATA"), Some("abc123"));
        assert_eq!(context.cookie("buvid3"), Some("device-xyz"));
        assert_eq!(context.cookie("missing"), None);
    }

    #[test]
    fn test_sets_browser_headers() {
        let context = SessionContext::new("TestAgent/1.0", &create_test_cookies());

        assert_eq!(
            context.headers.get("User-Agent").map(String::as_str),
            Some("TestAgent/1.0")
        );
        assert_eq!(
            context.headers.get("Origin").map(String::as_str),
            Some("https://www.bilibili.com")
        );
        assert_eq!(
            context.headers.get("Referer").map(String::as_str),
            Some("https://www.bilibili.com")
        );
    }

    #[test]
    fn test_no_cookies_means_no_cookie_header() {
        let context = SessionContext::new("TestAgent/1.0", &[]);

        assert!(!context.headers.contains_key("Cookie"));
        assert!(context.cookies.is_empty());
    }

    #[test]
    fn test_duplicate_cookie_name_keeps_last_value() {
        let cookies = vec![
            RawCookie {
                name: "SESSDATA".to_string(),
                value: "old".to_string(),
            },
            RawCookie {
                name: "SESSDATA".to_string(),
                value: "new".to_string(),
            },
        ];

        let context = SessionContext::new("TestAgent/1.0", &cookies);

        assert_eq!(context.cookie("SESSDATA"), Some("new"));
        assert_eq!(
            context.headers.get("Cookie").map(String::as_str),
            Some("SESSDATA=old; SESSDATA=new")
        );
    }
}
