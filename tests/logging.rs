//! Per-route access logging through a served gateway.

use std::fs;

use gateway::config::GatewayConfig;

mod common;

#[tokio::test]
async fn test_access_log_line_written_per_request() {
    let backend = common::start_mock_backend("ok").await;

    let log_path = std::env::temp_dir().join(format!(
        "gateway-test-access-{}.log",
        std::process::id()
    ));
    let _ = fs::remove_file(&log_path);

    let mut config = GatewayConfig::default();
    let mut svc = common::service("/api", &format!("http://{}", backend));
    svc.log = Some(log_path.clone());
    config.services.push(svc);

    let addr = common::spawn_gateway(config, None).await;
    let client = common::http_client();

    let res = client
        .get(format!("http://{}/api/users?page=2", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let contents = fs::read_to_string(&log_path).unwrap();
    let line = contents.lines().last().unwrap();
    assert!(line.starts_with('['), "line should start with a timestamp: {}", line);
    assert!(line.contains("GET"), "line should carry the method: {}", line);
    assert!(
        line.contains("/api/users?page=2"),
        "line should carry the request uri: {}",
        line
    );
    assert!(line.contains("-> 200"), "line should carry the status: {}", line);
}
