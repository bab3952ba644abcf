mod common;

#[tokio::test]
async fn render_markdown_from_json() {
    let env = common::TestEnv::start();
    let server = env.server();

    let body: serde_json::Value = server
        .post("/render_markdown")
        .json(&serde_json::json!({ "content": "**bold** <script>x()</script>" }))
        .await
        .json();

    let html = body["html"].as_str().unwrap();
    assert!(html.contains("<strong>bold</strong>"));
    assert!(!html.contains("<script"));
}

#[tokio::test]
async fn render_markdown_from_form() {
    let env = common::TestEnv::start();
    let server = env.server();

    let body: serde_json::Value = server
        .post("/render_markdown")
        .form(&[("content", "# Preview")])
        .await
        .json();

    assert_eq!(body["html"].as_str().unwrap().trim(), "<h1 id=\"preview\">Preview</h1>");
}

#[tokio::test]
async fn render_markdown_missing_content_is_empty() {
    let env = common::TestEnv::start();
    let server = env.server();

    let body: serde_json::Value = server
        .post("/render_markdown")
        .json(&serde_json::json!({}))
        .await
        .json();

    assert_eq!(body["html"], "");
}

#[tokio::test]
async fn static_assets_are_served() {
    let env = common::TestEnv::start();
    let server = env.server();

    let response = server.get("/static/wiki.js").await;
    response.assert_status_ok();
    assert!(response.text().contains("/render_markdown"));
}
