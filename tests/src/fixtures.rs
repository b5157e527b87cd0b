//! Shared test fixtures.

/// Regular desktop browser.
pub const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Regular mobile browser.
pub const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

/// Crawler on both signature lists; blocked on the click path.
pub const GOOGLEBOT_UA: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

/// HTTP library; advisory-only, passes the click gate.
pub const CURL_UA: &str = "curl/8.5.0";

/// Destination domain present in the default test allow-list.
pub const ALLOWED_DOMAIN: &str = "good.partner.example";

/// Publishing-site host used for same-site referrer checks.
pub const SITE_HOST: &str = "blog.example.com";
