//! End-to-end tests over a real listener.

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use crm_gateway::backend::GrpcDialer;
use crm_gateway::config::{BackendConfig, GatewayConfig};
use crm_gateway::lifecycle::{build_server, Shutdown};
use crm_gateway::HttpServer;

mod common;
use common::{student_schema, Backends, CountingDialer, STUDENT_ID};

async fn serve(server: HttpServer, shutdown: &Shutdown) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, handle)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_crud_over_http_and_graceful_shutdown() {
    let backends = Backends::new();
    backends.users.reply(
        "/user_service.StudentService/GetAll",
        Ok(json!({"students": [{"id": STUDENT_ID}], "count": 1})),
    );
    let server = HttpServer::new(GatewayConfig::default(), Arc::new(backends.registry()));
    let shutdown = Shutdown::new();
    let (addr, handle) = serve(server, &shutdown).await;
    let client = client();

    let created = client
        .post(format!("http://{}/api/v1/student", addr))
        .json(&json!({"full_name": "Ann Lee", "password": "Secur3Pass", "phone": "+998901234567"}))
        .send()
        .await
        .expect("gateway unreachable");
    assert_eq!(created.status(), 201);
    assert!(created.headers().contains_key("x-request-id"));
    let body: Value = created.json().await.unwrap();
    assert_eq!(body["message"], "Student created successfully");

    let listed = client
        .get(format!("http://{}/api/v1/students?page=2&limit=5", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(listed.status(), 200);
    let body: Value = listed.json().await.unwrap();
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(backends.users.calls()[1].payload, json!({"offset": 5, "limit": 5, "search": ""}));

    let bad = client
        .get(format!("http://{}/api/v1/student/xyz", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), 400);
    let body: Value = bad.json().await.unwrap();
    assert!(body["message"].is_string());
    assert!(body["error"].is_string());
    assert_eq!(backends.users.call_count(), 2);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_startup_survives_unreachable_backend() {
    let mut config = GatewayConfig::default();
    config.backends = vec![
        BackendConfig::plaintext("user_service", "10.0.0.1:9000"),
        BackendConfig::plaintext("schedule_service", "10.0.0.2:9000"),
    ];
    let dialer = CountingDialer {
        refuse: vec!["10.0.0.2:9000".to_string()],
        ..Default::default()
    };

    let server = build_server(config, &dialer).await;
    assert_eq!(dialer.dials.load(Ordering::SeqCst), 2);

    let shutdown = Shutdown::new();
    let (addr, handle) = serve(server, &shutdown).await;
    let client = client();

    let health: Value = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["data"]["status"], "degraded");

    let schedules = client
        .get(format!("http://{}/api/v1/schedules", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(schedules.status(), 500);

    let branches = client
        .get(format!("http://{}/api/v1/branches", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(branches.status(), 200);

    shutdown.trigger();
    let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
}

#[tokio::test]
async fn test_grpc_dialer_marks_refused_backend() {
    let mut config = GatewayConfig::default();
    config.rpc.connect_timeout_secs = 1;
    config.backends = vec![
        BackendConfig::plaintext("user_service", "127.0.0.1:1"),
        BackendConfig::plaintext("schedule_service", "127.0.0.1:1"),
    ];
    let dialer = GrpcDialer::new(config.rpc.clone(), student_schema());

    let server = build_server(config, &dialer).await;
    // Nothing connected: every resource answers with a 500 envelope.
    let response = tower::ServiceExt::oneshot(
        server.router(),
        axum::http::Request::builder()
            .uri("/api/v1/teachers")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), 500);
}
