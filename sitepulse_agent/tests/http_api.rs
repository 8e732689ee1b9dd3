//! The agent's HTTP and WebSocket endpoints on an ephemeral port.
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use sitepulse_agent::config::AgentConfig;
use sitepulse_agent::http::router;
use sitepulse_agent::state::AppState;
use std::net::SocketAddr;
use tokio_tungstenite::{connect_async, tungstenite::Message};

const TOKEN: &str = "s3cret";

struct Agent {
    addr: SocketAddr,
    _dir: tempfile::TempDir,
}

impl Agent {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

async fn spawn_agent(token: Option<&str>) -> Agent {
    let dir = tempfile::tempdir().unwrap();
    let mut args = vec![
        "sitepulse_agent".to_string(),
        "--settings".to_string(),
        dir.path().join("settings.json").display().to_string(),
        "--app-root".to_string(),
        dir.path().display().to_string(),
    ];
    if let Some(t) = token {
        args.push("--token".into());
        args.push(t.into());
    }
    let cfg = AgentConfig::parse(args, |_| None).unwrap();
    let state = AppState::from_config(&cfg).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(state)).await;
    });
    Agent { addr, _dir: dir }
}

#[tokio::test]
async fn stats_require_the_admin_token() {
    let agent = spawn_agent(Some(TOKEN)).await;
    let client = reqwest::Client::new();

    let anon = client.get(agent.url("/api/stats")).send().await.unwrap();
    assert_eq!(anon.status(), 403);
    let body: Value = anon.json().await.unwrap();
    assert_eq!(body["code"], "forbidden");
    assert!(body.get("cpu").is_none());

    let wrong = client
        .get(agent.url("/api/stats"))
        .bearer_auth("nope")
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), 403);
}

#[tokio::test]
async fn no_configured_token_closes_every_endpoint() {
    let agent = spawn_agent(None).await;
    let res = reqwest::Client::new()
        .get(agent.url("/api/session"))
        .bearer_auth("")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);
}

#[tokio::test]
async fn stats_payload_shape() {
    let agent = spawn_agent(Some(TOKEN)).await;
    let body: Value = reqwest::Client::new()
        .get(agent.url("/api/stats"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    for key in [
        "cpu",
        "load_avg",
        "ram_percent",
        "ram_total_mb",
        "ram_used_mb",
        "disk_percent",
        "disk_total_gb",
        "uptime",
        "net_up",
        "net_down",
        "db_size_mb",
        "mysql_buffer_mb",
        "mysql_buffer_total_mb",
        "mysql_buffer_percent",
        "posts",
        "pages",
        "users",
    ] {
        assert!(body.get(key).is_some(), "missing {key}");
    }
    assert_eq!(body["mysql_buffer"]["status"], "unavailable");
    assert_eq!(body["mysql_buffer_formatted"], "N/A");
    assert_eq!(body["db_size_formatted"], "-");
    let used = body["ram_used_mb"].as_f64().unwrap();
    let total = body["ram_total_mb"].as_f64().unwrap();
    assert!(used <= total);
}

#[tokio::test]
async fn repeated_pulls_within_ttl_are_identical() {
    let agent = spawn_agent(Some(TOKEN)).await;
    let client = reqwest::Client::new();
    let get = || async {
        client
            .get(agent.url("/api/stats"))
            .bearer_auth(TOKEN)
            .send()
            .await
            .unwrap()
            .json::<Value>()
            .await
            .unwrap()
    };
    let a = get().await;
    let b = get().await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn settings_round_trip_through_normalization() {
    let agent = spawn_agent(Some(TOKEN)).await;
    let client = reqwest::Client::new();

    let saved: Value = client
        .post(agent.url("/api/settings"))
        .bearer_auth(TOKEN)
        .json(&json!({
            "refresh_interval_s": 0,
            "chart_type": "pie",
            "alert_thresholds": { "cpu": 250 },
            "dark_mode": "1",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved["success"], true);
    assert_eq!(saved["settings"]["refresh_interval_s"], 1);
    assert_eq!(saved["settings"]["chart_type"], "line");
    assert_eq!(saved["settings"]["alert_thresholds"]["cpu"], 100);
    assert_eq!(saved["settings"]["dark_mode"], true);

    let current: Value = client
        .get(agent.url("/api/settings"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(current, saved["settings"]);
}

#[tokio::test]
async fn unparseable_settings_body_is_accepted_unchanged() {
    let agent = spawn_agent(Some(TOKEN)).await;
    let client = reqwest::Client::new();

    for (content_type, body) in [
        ("text/plain", "refresh_interval_s=9"),
        ("application/json", "{not json"),
        ("application/x-www-form-urlencoded", ""),
    ] {
        let res = client
            .post(agent.url("/api/settings"))
            .bearer_auth(TOKEN)
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200, "{content_type}: {body}");
        let saved: Value = res.json().await.unwrap();
        assert_eq!(saved["success"], true);
        assert_eq!(saved["settings"]["refresh_interval_s"], 2);
    }
}

#[tokio::test]
async fn huge_cache_ttl_is_capped_and_pulls_keep_working() {
    let agent = spawn_agent(Some(TOKEN)).await;
    let client = reqwest::Client::new();

    let saved: Value = client
        .post(agent.url("/api/settings"))
        .bearer_auth(TOKEN)
        .json(&json!({ "cache_ttl_s": 1e19 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved["settings"]["cache_ttl_s"], 3600);

    for _ in 0..2 {
        let res = client
            .get(agent.url("/api/stats"))
            .bearer_auth(TOKEN)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }
}

#[tokio::test]
async fn websocket_fallback_requires_a_session_nonce() {
    let agent = spawn_agent(Some(TOKEN)).await;

    let bad = connect_async(format!("ws://{}/ws?nonce=forged", agent.addr)).await;
    assert!(bad.is_err());

    let session: Value = reqwest::Client::new()
        .get(agent.url("/api/session"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let nonce = session["nonce"].as_str().unwrap().to_string();
    assert_eq!(session["settings"]["refresh_interval_s"], 2);

    let (mut ws, _) = connect_async(format!("ws://{}/ws?nonce={nonce}", agent.addr))
        .await
        .unwrap();
    ws.send(Message::Text("get_stats".into())).await.unwrap();
    let reply = match ws.next().await {
        Some(Ok(Message::Text(t))) => t,
        other => panic!("unexpected ws reply: {other:?}"),
    };
    let env: Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(env["success"], true);
    assert!(env["data"]["cpu"].is_number());

    ws.send(Message::Text("get_everything".into())).await.unwrap();
    let reply = match ws.next().await {
        Some(Ok(Message::Text(t))) => t,
        other => panic!("unexpected ws reply: {other:?}"),
    };
    let env: Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(env["success"], false);
}
