mod common;

use link_rotator::domain::repositories::SlugRepository;

#[tokio::test]
async fn test_default_fallback_page() {
    let app = common::create_test_app(3);

    let response = app
        .server
        .get("/fallback")
        .add_query_param("slug", "docs")
        .add_query_param("reason", "slug_disabled")
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "text/html; charset=utf-8");
    assert_eq!(response.header("cache-control"), "no-store");
    assert!(response.text().contains("<code>docs</code>"));
}

#[tokio::test]
async fn test_stored_fallback_html_is_used() {
    let app = common::create_test_app(3);
    app.repo
        .set_fallback_html("<p>{{slug}} is off ({{reason}})</p>")
        .await
        .unwrap();

    let response = app
        .server
        .get("/fallback?slug=promo&reason=all_destinations_disabled")
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "<p>promo is off (all_destinations_disabled)</p>");
}

#[tokio::test]
async fn test_placeholders_are_escaped() {
    let app = common::create_test_app(3);
    app.repo.set_fallback_html("{{slug}}").await.unwrap();

    let response = app
        .server
        .get("/fallback")
        .add_query_param("slug", "<script>alert(1)</script>")
        .await;

    assert_eq!(response.text(), "&lt;script&gt;alert(1)&lt;/script&gt;");
}

#[tokio::test]
async fn test_missing_query_renders_empty_placeholders() {
    let app = common::create_test_app(3);
    app.repo.set_fallback_html("[{{slug}}|{{reason}}]").await.unwrap();

    let response = app.server.get("/fallback").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "[|]");
}

#[tokio::test]
async fn test_blank_stored_html_uses_default() {
    let app = common::create_test_app(3);
    app.repo.set_fallback_html("   ").await.unwrap();

    let response = app.server.get("/fallback?slug=docs").await;

    assert!(response.text().contains("Link unavailable"));
}

#[tokio::test]
async fn test_fallback_path_is_not_a_slug() {
    let app = common::create_test_app(3);
    common::create_test_slug(&app.repo, "fallback", &["https://example.com"]).await;

    let response = app.server.get("/fallback").await;

    response.assert_status_ok();
    assert!(app.queue.is_empty());
}
