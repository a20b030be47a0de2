//! Proxy route tests
//!
//! A real gateway proxies a wiremock upstream.

use super::{ga_config, local_builder, make_client, start};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SCRIPT: &str = "(function(){var _gat={};})();";

async fn upstream() -> (MockServer, String) {
    let server = MockServer::start().await;
    let url = format!("{}/ga.js", server.uri());
    (server, url)
}

/// Successful proxy: 200, script headers, body passed through unchanged
#[tokio::test]
async fn test_proxy_serves_upstream_script() {
    let (upstream, url) = upstream().await;
    Mock::given(method("GET"))
        .and(path("/ga.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SCRIPT))
        .mount(&upstream)
        .await;

    let (mut gateway, addr) = start(local_builder(ga_config("UA-123", Some(&url)))).await;

    let response = make_client()
        .get(format!("http://{addr}/tracking/googleanalytics"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"],
        "application/javascript"
    );
    assert_eq!(response.headers()["cache-control"], "max-age=86400");
    assert_eq!(response.text().await.unwrap(), SCRIPT);

    gateway.shutdown().await.unwrap();
}

/// One 5xx is absorbed by the retry
#[tokio::test]
async fn test_proxy_retries_after_server_error() {
    let (upstream, url) = upstream().await;
    Mock::given(method("GET"))
        .and(path("/ga.js"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/ga.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SCRIPT))
        .expect(1)
        .mount(&upstream)
        .await;

    let (mut gateway, addr) = start(local_builder(ga_config("UA-1", Some(&url)))).await;

    let response = make_client()
        .get(format!("http://{addr}/tracking/googleanalytics"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), SCRIPT);

    gateway.shutdown().await.unwrap();
}

/// Persistent failure: 502 with a short cache lifetime and a JS comment body
#[tokio::test]
async fn test_proxy_upstream_failure_is_bad_gateway() {
    let (upstream, url) = upstream().await;
    Mock::given(method("GET"))
        .and(path("/ga.js"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&upstream)
        .await;

    let (mut gateway, addr) = start(local_builder(ga_config("UA-1", Some(&url)))).await;

    let response = make_client()
        .get(format!("http://{addr}/tracking/googleanalytics"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 502);
    assert_eq!(
        response.headers()["content-type"],
        "application/javascript"
    );
    assert_eq!(response.headers()["cache-control"], "max-age=60");
    assert_eq!(
        response.text().await.unwrap(),
        "/* tracking script unavailable */"
    );

    gateway.shutdown().await.unwrap();
}

/// 4xx is not retried
#[tokio::test]
async fn test_proxy_client_error_not_retried() {
    let (upstream, url) = upstream().await;
    Mock::given(method("GET"))
        .and(path("/ga.js"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&upstream)
        .await;

    let (mut gateway, addr) = start(local_builder(ga_config("UA-1", Some(&url)))).await;

    let response = make_client()
        .get(format!("http://{addr}/tracking/googleanalytics"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 502);

    gateway.shutdown().await.unwrap();
}

/// A slow upstream hits the per-attempt timeout
#[tokio::test]
async fn test_proxy_upstream_timeout() {
    let (upstream, url) = upstream().await;
    Mock::given(method("GET"))
        .and(path("/ga.js"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SCRIPT)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&upstream)
        .await;

    let builder = local_builder(ga_config("UA-1", Some(&url)))
        .upstream_timeout(Duration::from_millis(200))
        .upstream_retries(0);
    let (mut gateway, addr) = start(builder).await;

    let response = make_client()
        .get(format!("http://{addr}/tracking/googleanalytics"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 502);

    gateway.shutdown().await.unwrap();
}

/// Within the TTL only one upstream request is made
#[tokio::test]
async fn test_proxy_caches_script() {
    let (upstream, url) = upstream().await;
    Mock::given(method("GET"))
        .and(path("/ga.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SCRIPT))
        .expect(1)
        .mount(&upstream)
        .await;

    let (mut gateway, addr) = start(local_builder(ga_config("UA-1", Some(&url)))).await;
    let client = make_client();

    for _ in 0..3 {
        let response = client
            .get(format!("http://{addr}/tracking/googleanalytics"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), SCRIPT);
    }

    gateway.shutdown().await.unwrap();
}

/// A zero TTL fetches on every request
#[tokio::test]
async fn test_proxy_cache_disabled() {
    let (upstream, url) = upstream().await;
    Mock::given(method("GET"))
        .and(path("/ga.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SCRIPT))
        .expect(2)
        .mount(&upstream)
        .await;

    let builder = local_builder(ga_config("UA-1", Some(&url))).cache_ttl(Duration::ZERO);
    let (mut gateway, addr) = start(builder).await;
    let client = make_client();

    for _ in 0..2 {
        let response = client
            .get(format!("http://{addr}/tracking/googleanalytics"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    gateway.shutdown().await.unwrap();
}

/// An expired copy is served when the upstream goes down
#[tokio::test]
async fn test_proxy_serves_stale_copy_on_failure() {
    let (upstream, url) = upstream().await;
    Mock::given(method("GET"))
        .and(path("/ga.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SCRIPT))
        .up_to_n_times(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/ga.js"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&upstream)
        .await;

    let builder = local_builder(ga_config("UA-1", Some(&url))).cache_ttl(Duration::from_millis(50));
    let (mut gateway, addr) = start(builder).await;
    let client = make_client();
    let script_url = format!("http://{addr}/tracking/googleanalytics");

    let first = client.get(&script_url).send().await.unwrap();
    assert_eq!(first.status(), 200);

    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = client.get(&script_url).send().await.unwrap();
    assert_eq!(second.status(), 200);
    assert_eq!(second.text().await.unwrap(), SCRIPT);

    gateway.shutdown().await.unwrap();
}

/// Disabled providers get no route
#[tokio::test]
async fn test_no_route_without_provider() {
    let tracking = scriptgate::common::TrackingConfig::from_yaml_str("providers: ~\n").unwrap();
    let (mut gateway, addr) = start(local_builder(tracking)).await;

    let response = make_client()
        .get(format!("http://{addr}/tracking/googleanalytics"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let health = make_client()
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), 200);

    gateway.shutdown().await.unwrap();
}
