use std::net::SocketAddr;

use botwatch_server::{Server, ServerConfig};
use botwatch_types::StatsResponse;
use serde_json::{json, Value};

async fn start() -> SocketAddr {
    let config = ServerConfig::builder()
        .listen_addr("127.0.0.1:0")
        .max_history_entries(5)
        .build();
    let server = Server::bind(config).await.unwrap();
    let addr = server.local_addr();
    server.spawn();
    addr
}

fn now() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs_f64()
}

fn report(bot_id: &str, topic: &str, throughput: f64) -> Value {
    json!({
        "bot_id": bot_id,
        "received": 100,
        "processed": 40,
        "in_flight": 3,
        "throughput": throughput,
        "elapsed": 12.5,
        "empty_polls": 0,
        "partitions": 2,
        "progress": 40.0,
        "timestamp": now(),
        "topic": topic
    })
}

#[tokio::test]
async fn test_update_then_stats() {
    let addr = start().await;
    let client = reqwest::Client::new();

    for (id, topic, tp) in [("a", "orders", 1.5), ("b", "orders", 7.0), ("c", "refunds", 3.0)] {
        let resp = client
            .post(format!("http://{}/update", addr))
            .json(&report(id, topic, tp))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "status": "ok" }));
    }

    let stats: StatsResponse = client
        .get(format!("http://{}/api/stats", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let ids: Vec<_> = stats.stats.iter().filter_map(|r| r.bot_id.as_deref()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);
    assert_eq!(stats.stats[0].ip_address.as_deref(), Some("127.0.0.1"));
    assert_eq!(stats.stats[0].text("topic").as_deref(), Some("orders"));

    let global = stats.global.unwrap();
    assert_eq!(global.bots, 3);
    assert_eq!(global.received, 300);
    assert_eq!(global.in_flight, 9);
    assert_eq!(global.throughput, 11.5);
    assert_eq!(global.progress, 40.0);
    assert_eq!(stats.history.len(), 1);
    assert_eq!(stats.aggregated_by, None);
}

#[tokio::test]
async fn test_aggregate_by_topic() {
    let addr = start().await;
    let client = reqwest::Client::new();

    for (id, topic, tp) in [("a", "orders", 1.5), ("b", "orders", 7.0), ("c", "refunds", 3.0)] {
        client
            .post(format!("http://{}/update", addr))
            .json(&report(id, topic, tp))
            .send()
            .await
            .unwrap();
    }

    let body: Value = client
        .get(format!("http://{}/api/stats?aggregate_by=topic", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["aggregated_by"], "topic");
    let rows = body["stats"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["bot_id"], "orders (2 bots)");
    assert_eq!(rows[0]["bots"], json!(["b", "a"]));
    assert_eq!(rows[0]["received"], 200);
    assert_eq!(rows[1]["bot_id"], "refunds (1 bots)");
    assert!(rows[0].get("progress").is_none());

    // History keeps per-bot rows.
    let history = body["history"].as_array().unwrap();
    assert_eq!(history[0]["stats"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_invalid_update_is_422() {
    let addr = start().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{}/update", addr))
        .json(&json!({ "bot_id": "a", "received": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("missing field"));

    let resp = client
        .post(format!("http://{}/update", addr))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
}

#[tokio::test]
async fn test_history_is_capped_across_polls() {
    let addr = start().await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{}/update", addr))
        .json(&report("a", "orders", 1.0))
        .send()
        .await
        .unwrap();

    let mut last = StatsResponse::default();
    for _ in 0..8 {
        last = client
            .get(format!("http://{}/api/stats", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    }
    assert_eq!(last.history.len(), 5);
}

#[tokio::test]
async fn test_metrics_health_and_not_found() {
    let addr = start().await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{}/update", addr))
        .json(&report("a", "orders", 2.0))
        .send()
        .await
        .unwrap();

    let resp = client.get(format!("http://{}/metrics", addr)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let text = resp.text().await.unwrap();
    assert!(text.contains("botwatch_active_bots 1\n"));
    assert!(text.contains("botwatch_bot_throughput{bot_id=\"a\"} 2.00"));

    let resp = client.get(format!("http://{}/healthz", addr)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");

    let resp = client.get(format!("http://{}/nope", addr)).send().await.unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client.get(format!("http://{}/update", addr)).send().await.unwrap();
    assert_eq!(resp.status(), 405);
}

#[tokio::test]
async fn test_index_lists_endpoints() {
    let addr = start().await;
    let resp = reqwest::get(format!("http://{}/", addr)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let text = resp.text().await.unwrap();
    assert!(text.starts_with("botwatch collector"));
    assert!(text.contains("POST /update"));
    assert!(text.contains("GET  /api/stats"));
    assert!(text.contains("GET  /metrics"));
}
