//! Pattern registration, the global wrapper and the JSON 404.

use gateway::config::GatewayConfig;

mod common;

#[tokio::test]
async fn test_route_with_and_without_trailing_slash() {
    let backend = common::start_mock_backend("ok").await;

    let mut config = GatewayConfig::default();
    config
        .services
        .push(common::service("/api", &format!("http://{}", backend)));

    let addr = common::spawn_gateway(config, None).await;
    let client = common::http_client();

    for path in ["/api", "/api/", "/api/deep/sub"] {
        let res = client
            .get(format!("http://{}{}", addr, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200, "path {} should reach the backend", path);
        assert_eq!(res.text().await.unwrap(), "ok");
    }
}

#[tokio::test]
async fn test_unknown_path_yields_json_404() {
    let backend = common::start_mock_backend("ok").await;

    let mut config = GatewayConfig::default();
    config
        .services
        .push(common::service("/api", &format!("http://{}", backend)));

    let addr = common::spawn_gateway(config, None).await;
    let client = common::http_client();

    let res = client
        .get(format!("http://{}/missing", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(res.text().await.unwrap(), r#"{"error":"resource not found"}"#);
}

#[tokio::test]
async fn test_options_is_short_circuited_with_cors() {
    let backend = common::start_mock_backend("ok").await;

    let mut config = GatewayConfig::default();
    config
        .services
        .push(common::service("/api", &format!("http://{}", backend)));

    let addr = common::spawn_gateway(config, None).await;
    let client = common::http_client();

    let res = client
        .request(reqwest::Method::OPTIONS, format!("http://{}/api", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 204);
    let headers = res.headers();
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(
        headers.get("access-control-allow-methods").unwrap(),
        "GET,POST,PUT,DELETE,OPTIONS"
    );
    assert_eq!(
        headers.get("access-control-allow-headers").unwrap(),
        "Content-Type,Authorization"
    );
}

#[tokio::test]
async fn test_every_response_carries_security_headers() {
    let backend = common::start_mock_backend("ok").await;

    let mut config = GatewayConfig::default();
    config
        .services
        .push(common::service("/api", &format!("http://{}", backend)));

    let addr = common::spawn_gateway(config, None).await;
    let client = common::http_client();

    // Both a proxied response and the gateway's own 404 carry the full set.
    for path in ["/api", "/nowhere"] {
        let res = client
            .get(format!("http://{}{}", addr, path))
            .send()
            .await
            .unwrap();
        let headers = res.headers();

        for header in [
            "strict-transport-security",
            "content-security-policy",
            "x-content-type-options",
            "x-frame-options",
            "referrer-policy",
            "access-control-allow-origin",
            "access-control-allow-methods",
            "access-control-allow-headers",
        ] {
            assert!(
                headers.contains_key(header),
                "{} missing on {}",
                header,
                path
            );
        }
    }
}

#[tokio::test]
async fn test_missing_secret_with_protected_route_is_fatal() {
    let mut config = GatewayConfig::default();
    let mut svc = common::service("/secure", "http://127.0.0.1:1");
    svc.auth = gateway::config::AuthMode::Private;
    config.services.push(svc);

    let err = gateway::build_router(&config, None).unwrap_err();
    assert!(err.to_string().contains("GATEWAY_JWT_SECRET"));
}
