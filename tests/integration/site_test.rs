//! Static site injection tests

use super::{ga_config, local_builder, make_client, start};
use std::path::Path;

fn write_site(dir: &Path) {
    std::fs::write(
        dir.join("index.html"),
        "<!DOCTYPE html><html><head><title>Home</title></head><body><h1>Home</h1></body></html>",
    )
    .unwrap();
    std::fs::write(dir.join("style.css"), "body { color: red; } /* </body> */").unwrap();
    std::fs::create_dir(dir.join("admin")).unwrap();
    std::fs::write(
        dir.join("admin/index.html"),
        "<html><body>dashboard</body></html>",
    )
    .unwrap();
}

/// Frontend HTML pages get the snippet before `</body>`
#[tokio::test]
async fn test_frontend_page_gets_snippet() {
    let site = tempfile::tempdir().unwrap();
    write_site(site.path());

    let builder = local_builder(ga_config("UA-SITE", None)).site_dir(site.path());
    let (mut gateway, addr) = start(builder).await;

    let response = make_client()
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let len = response.content_length();
    let page = response.text().await.unwrap();

    assert_eq!(len, Some(page.len() as u64));
    let snippet_at = page.find("UA-SITE").unwrap();
    let body_end = page.rfind("</body>").unwrap();
    assert!(snippet_at < body_end);
    assert!(page.contains("https://www.example.com/tracking/googleanalytics"));
    assert!(page.starts_with("<!DOCTYPE html><html><head><title>Home</title></head>"));

    gateway.shutdown().await.unwrap();
}

/// Non-HTML responses pass through unchanged
#[tokio::test]
async fn test_non_html_untouched() {
    let site = tempfile::tempdir().unwrap();
    write_site(site.path());

    let builder = local_builder(ga_config("UA-SITE", None)).site_dir(site.path());
    let (mut gateway, addr) = start(builder).await;

    let css = make_client()
        .get(format!("http://{addr}/style.css"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(css, "body { color: red; } /* </body> */");

    gateway.shutdown().await.unwrap();
}

/// Backend pages get no frontend snippets
#[tokio::test]
async fn test_backend_page_untouched() {
    let site = tempfile::tempdir().unwrap();
    write_site(site.path());

    let builder = local_builder(ga_config("UA-SITE", None)).site_dir(site.path());
    let (mut gateway, addr) = start(builder).await;

    let page = make_client()
        .get(format!("http://{addr}/admin/index.html"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(page, "<html><body>dashboard</body></html>");

    gateway.shutdown().await.unwrap();
}

/// Without enabled providers pages are served as-is
#[tokio::test]
async fn test_no_providers_no_injection() {
    let site = tempfile::tempdir().unwrap();
    write_site(site.path());

    let tracking = scriptgate::common::TrackingConfig::default();
    let builder = local_builder(tracking).site_dir(site.path());
    let (mut gateway, addr) = start(builder).await;

    let page = make_client()
        .get(format!("http://{addr}/index.html"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!page.contains("_gaq"));
    assert!(page.ends_with("<h1>Home</h1></body></html>"));

    gateway.shutdown().await.unwrap();
}
