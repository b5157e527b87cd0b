//! Redirect responses and error mapping.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use cookie::Cookie;

use tracker_core::Error;

/// Handler error adapter: plain-text body, status from the error
/// taxonomy (403 rejection, 400 validation, 404 not-found, 500 rest).
pub struct HandlerError(pub Error);

impl From<Error> for HandlerError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.0.to_string()).into_response()
    }
}

/// A 302 Found with explicit Location; axum's own redirect helpers emit
/// 303/307, which downgrade link previews and some in-app browsers.
pub struct Found {
    location: String,
    cookies: Vec<Cookie<'static>>,
    no_store: bool,
}

impl Found {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            cookies: Vec::new(),
            no_store: false,
        }
    }

    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Adds the cache-suppression trio so no intermediary ever replays
    /// this particular 302.
    pub fn no_store(mut self) -> Self {
        self.no_store = true;
        self
    }
}

impl IntoResponse for Found {
    fn into_response(self) -> Response {
        let Ok(location) = HeaderValue::from_str(&self.location) else {
            return HandlerError(Error::internal("redirect target is not a valid header value"))
                .into_response();
        };

        let mut response = StatusCode::FOUND.into_response();
        let headers = response.headers_mut();
        headers.insert(header::LOCATION, location);

        if self.no_store {
            headers.insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
            );
            headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
            headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
        }

        for cookie in &self.cookies {
            if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
                headers.append(header::SET_COOKIE, value);
            }
        }

        response
    }
}
