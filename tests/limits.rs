//! Admission control through a served gateway.

use std::time::Duration;

use gateway::config::GatewayConfig;

mod common;

#[tokio::test]
async fn test_rate_limit_second_request_rejected() {
    let backend = common::start_mock_backend("ok").await;

    let mut config = GatewayConfig::default();
    config
        .services
        .push(common::service("/api", &format!("http://{}", backend)));
    config.limits.requests_per_second = Some(1);
    config.limits.burst = Some(1);

    let addr = common::spawn_gateway(config, None).await;
    let client = common::http_client();

    let first = client
        .get(format!("http://{}/api", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 200);

    let second = client
        .get(format!("http://{}/api", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 429);
    assert_eq!(second.headers().get("retry-after").unwrap(), "1");
}

#[tokio::test]
async fn test_conn_limit_rejects_concurrent_excess() {
    let backend = common::start_programmable_backend(|| async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        (200, "slow".to_string())
    })
    .await;

    let mut config = GatewayConfig::default();
    config
        .services
        .push(common::service("/api", &format!("http://{}", backend)));
    config.limits.max_conns_per_ip = Some(1);

    let addr = common::spawn_gateway(config, None).await;
    let client = common::http_client();

    let in_flight = {
        let client = client.clone();
        let url = format!("http://{}/api", addr);
        tokio::spawn(async move { client.get(&url).send().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let rejected = client
        .get(format!("http://{}/api", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), 503);

    let served = in_flight.await.unwrap().unwrap();
    assert_eq!(served.status(), 200);
}

#[tokio::test]
async fn test_queue_limit_caps_total_in_flight_work() {
    let backend = common::start_programmable_backend(|| async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        (200, "slow".to_string())
    })
    .await;

    let mut config = GatewayConfig::default();
    config
        .services
        .push(common::service("/api", &format!("http://{}", backend)));
    config.limits.queue_size = Some(1);

    let addr = common::spawn_gateway(config, None).await;
    let client = common::http_client();

    let in_flight = {
        let client = client.clone();
        let url = format!("http://{}/api", addr);
        tokio::spawn(async move { client.get(&url).send().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let rejected = client
        .get(format!("http://{}/api", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), 503);

    let served = in_flight.await.unwrap().unwrap();
    assert_eq!(served.status(), 200);
}
