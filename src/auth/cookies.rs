use axum::http::HeaderMap;

use crate::config;

/// Login session cookie
pub const SESSION_COOKIE: &str = "tw_session";
/// Impersonation delegation cookie
pub const IMPERSONATION_COOKIE: &str = "tw_impersonation";

/// Read a named cookie from the Cookie header
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get("cookie")?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        if k == name && !v.is_empty() {
            Some(v.to_string())
        } else {
            None
        }
    })
}

/// Build a Set-Cookie value: http-only, same-site lax, whole-site path,
/// Secure outside development.
pub fn set_cookie(name: &str, value: &str, max_age_secs: i64) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        name, value, max_age_secs
    );
    if config::config().security.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build a Set-Cookie value that clears the named cookie (Max-Age 0)
pub fn clear_cookie(name: &str) -> String {
    set_cookie(name, "", 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn reads_named_cookie_among_several() {
        let headers = headers("a=1; tw_session=tok-abc; b=2");
        assert_eq!(read_cookie(&headers, SESSION_COOKIE).as_deref(), Some("tok-abc"));
        assert_eq!(read_cookie(&headers, "a").as_deref(), Some("1"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_value_reads_as_absent() {
        let headers = headers("tw_impersonation=");
        assert_eq!(read_cookie(&headers, IMPERSONATION_COOKIE), None);
    }

    #[test]
    fn set_cookie_carries_scoping_attributes() {
        let cookie = set_cookie(SESSION_COOKIE, "tok", 28800);
        assert!(cookie.starts_with("tw_session=tok;"));
        assert!(cookie.contains("Max-Age=28800"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn clear_cookie_zeroes_max_age() {
        let cookie = clear_cookie(IMPERSONATION_COOKIE);
        assert!(cookie.contains("Max-Age=0"));
    }
}
