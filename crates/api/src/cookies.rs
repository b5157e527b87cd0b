//! Tracking cookies: sticky variant assignment and anonymous client id.
//!
//! Both names are wire contract; changing them orphans every assignment
//! already living in browsers.

use cookie::time::Duration;
use cookie::Cookie;

/// Anonymous client correlation token, one year.
pub const CLIENT_ID_COOKIE: &str = "GoWPTrackerCID";

/// Per-test sticky assignment prefix; the full name is `<prefix>_<slug>`.
pub const SPLIT_COOKIE_PREFIX: &str = "GoWPTrackerSplit";

pub fn split_cookie_name(slug: &str) -> String {
    format!("{SPLIT_COOKIE_PREFIX}_{slug}")
}

/// Sticky variant assignment, 30 days.
pub fn sticky_cookie(slug: &str, variant_id: i64, secure: bool) -> Cookie<'static> {
    base_cookie(
        split_cookie_name(slug),
        variant_id.to_string(),
        Duration::days(30),
        secure,
    )
}

/// Anonymous client id, 1 year.
pub fn client_id_cookie(client_id: &str, secure: bool) -> Cookie<'static> {
    base_cookie(
        CLIENT_ID_COOKIE.to_string(),
        client_id.to_string(),
        Duration::days(365),
        secure,
    )
}

fn base_cookie(name: String, value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_max_age(max_age);
    cookie
}
