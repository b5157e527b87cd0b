//! End-to-end tests for the outbound-click endpoint.
//!
//! The full router runs over in-memory mocks, so every assertion covers
//! the production validation pipeline, audit write and redirect.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum_test::TestServer;
use integration_tests::fixtures::{CHROME_UA, CURL_UA, GOOGLEBOT_UA, SITE_HOST};
use integration_tests::setup::{location, TestContext};
use tower::ServiceExt;

#[tokio::test]
async fn allow_listed_destination_redirects_and_records() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).unwrap();

    let response = server
        .get("/go")
        .add_query_param("dest", "https://good.partner.example/p")
        .add_query_param("utm_campaign", "summer")
        .add_header("User-Agent", CHROME_UA)
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(
        location(&response),
        "https://good.partner.example/p?utm_campaign=summer"
    );

    let clicks = ctx.store.clicks();
    assert_eq!(clicks.len(), 1);
    assert_eq!(clicks[0].dest_host, "good.partner.example");
    assert_eq!(clicks[0].utm_campaign, "summer");
    assert_eq!(clicks[0].utm_source, "");
    assert!(!clicks[0].is_bot);
}

#[tokio::test]
async fn head_requests_are_forbidden() {
    let ctx = TestContext::new();
    let request = Request::builder()
        .method(Method::HEAD)
        .uri("/go?dest=https%3A%2F%2Fgood.partner.example%2Fp")
        .header("User-Agent", CHROME_UA)
        .body(Body::empty())
        .unwrap();

    let response = ctx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(ctx.store.clicks().is_empty());
}

#[tokio::test]
async fn non_get_methods_are_forbidden() {
    let ctx = TestContext::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/go?dest=https%3A%2F%2Fgood.partner.example%2Fp")
        .header("User-Agent", CHROME_UA)
        .body(Body::empty())
        .unwrap();

    let response = ctx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(ctx.store.clicks().is_empty());
}

#[tokio::test]
async fn bot_user_agents_are_forbidden_without_logging() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).unwrap();

    let response = server
        .get("/go")
        .add_query_param("dest", "https://good.partner.example/p")
        .add_header("User-Agent", GOOGLEBOT_UA)
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert!(ctx.store.clicks().is_empty());
}

#[tokio::test]
async fn http_libraries_pass_the_gate_but_are_flagged() {
    // curl is on the advisory list only; the click is served and the
    // recorded row carries the bot flag for later filtering.
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).unwrap();

    let response = server
        .get("/go")
        .add_query_param("dest", "https://good.partner.example/p")
        .add_header("User-Agent", CURL_UA)
        .await;

    response.assert_status(StatusCode::FOUND);
    let clicks = ctx.store.clicks();
    assert_eq!(clicks.len(), 1);
    assert!(clicks[0].is_bot);
}

#[tokio::test]
async fn missing_destination_is_a_validation_error() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).unwrap();

    let response = server.get("/go").add_header("User-Agent", CHROME_UA).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Missing destination parameter.");
    assert!(ctx.store.clicks().is_empty());
}

#[tokio::test]
async fn disallowed_schemes_are_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).unwrap();

    for dest in ["ftp://good.partner.example/f", "javascript:alert(1)"] {
        let response = server
            .get("/go")
            .add_query_param("dest", dest)
            .add_header("User-Agent", CHROME_UA)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
    assert!(ctx.store.clicks().is_empty());
}

#[tokio::test]
async fn localhost_and_private_ranges_are_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).unwrap();

    for dest in [
        "http://localhost/admin",
        "http://127.0.0.1/admin",
        "http://10.0.0.8/",
        "http://192.168.1.1/",
        "http://172.16.0.1/",
        "http://172.31.255.254/",
    ] {
        let response = server
            .get("/go")
            .add_query_param("dest", dest)
            .add_header("User-Agent", CHROME_UA)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.text(),
            "Destination to IP/localhost/private network is not allowed.",
            "{dest}"
        );
    }
    assert!(ctx.store.clicks().is_empty());
}

#[tokio::test]
async fn unlisted_domains_never_redirect() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).unwrap();

    let response = server
        .get("/go")
        .add_query_param("dest", "https://evil.example.com/phish")
        .add_header("User-Agent", CHROME_UA)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Destination domain is not allowed.");
    assert!(ctx.store.clicks().is_empty());
}

#[tokio::test]
async fn destination_query_parameters_survive_propagation() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).unwrap();

    let response = server
        .get("/go")
        .add_query_param("dest", "https://good.partner.example/p?color=red&utm_source=old")
        .add_query_param("utm_source", "newsletter")
        .add_header("User-Agent", CHROME_UA)
        .await;

    response.assert_status(StatusCode::FOUND);
    let target = location(&response);
    assert!(target.contains("color=red"), "{target}");
    assert!(target.contains("utm_source=newsletter"), "{target}");
    assert!(!target.contains("utm_source=old"), "{target}");
}

#[tokio::test]
async fn plp_is_inferred_from_a_same_site_referrer() {
    let ctx = TestContext::new();
    let referrer = format!("https://{SITE_HOST}/my-landing-page");
    ctx.content.map_referrer(&referrer, "my-landing-page");
    let server = TestServer::new(ctx.router.clone()).unwrap();

    let response = server
        .get("/go")
        .add_query_param("dest", "https://good.partner.example/p")
        .add_header("User-Agent", CHROME_UA)
        .add_header("Referer", &referrer)
        .await;

    response.assert_status(StatusCode::FOUND);
    assert!(location(&response).contains("plp=my-landing-page"));
    assert_eq!(ctx.store.clicks()[0].plp, "my-landing-page");
}

#[tokio::test]
async fn cross_site_referrers_do_not_set_plp() {
    let ctx = TestContext::new();
    let referrer = "https://other.example.com/page";
    ctx.content.map_referrer(referrer, "should-not-appear");
    let server = TestServer::new(ctx.router.clone()).unwrap();

    let response = server
        .get("/go")
        .add_query_param("dest", "https://good.partner.example/p")
        .add_header("User-Agent", CHROME_UA)
        .add_header("Referer", referrer)
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(ctx.store.clicks()[0].plp, "");
}

#[tokio::test]
async fn explicit_plp_wins_over_referrer_inference() {
    let ctx = TestContext::new();
    let referrer = format!("https://{SITE_HOST}/my-landing-page");
    ctx.content.map_referrer(&referrer, "inferred");
    let server = TestServer::new(ctx.router.clone()).unwrap();

    let response = server
        .get("/go")
        .add_query_param("dest", "https://good.partner.example/p")
        .add_query_param("plp", "explicit")
        .add_header("User-Agent", CHROME_UA)
        .add_header("Referer", &referrer)
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(ctx.store.clicks()[0].plp, "explicit");
}

#[tokio::test]
async fn store_failure_does_not_break_the_redirect() {
    let ctx = TestContext::new();
    ctx.store.set_fail_writes(true);
    let server = TestServer::new(ctx.router.clone()).unwrap();

    let response = server
        .get("/go")
        .add_query_param("dest", "https://good.partner.example/p")
        .add_header("User-Agent", CHROME_UA)
        .await;

    response.assert_status(StatusCode::FOUND);
    assert!(ctx.store.clicks().is_empty());
}
