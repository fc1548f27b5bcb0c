//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
    MethodDescriptorProto, ServiceDescriptorProto,
};
use serde_json::Value;
use tokio::sync::Notify;

use crm_gateway::backend::{
    BackendError, ConnectionError, ConnectionRegistry, Dialer, RpcCall, RpcTransport,
    ServiceSchema,
};
use crm_gateway::config::{BackendConfig, GatewayConfig};
use crm_gateway::HttpServer;

pub const STUDENT_ID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";

/// Recording backend. Echoes the request payload unless a reply is programmed for the method.
#[derive(Debug)]
pub struct MockTransport {
    address: String,
    calls: Mutex<Vec<RpcCall>>,
    replies: Mutex<HashMap<String, Result<Value, BackendError>>>,
    delay: Mutex<Option<Duration>>,
}

impl MockTransport {
    pub fn new(address: &str) -> Arc<Self> {
        Arc::new(Self {
            address: address.to_string(),
            calls: Mutex::new(Vec::new()),
            replies: Mutex::new(HashMap::new()),
            delay: Mutex::new(None),
        })
    }

    /// Program the result for one method path.
    pub fn reply(&self, path: &str, result: Result<Value, BackendError>) {
        self.replies.lock().unwrap().insert(path.to_string(), result);
    }

    /// Make every call take this long (bounded by the call's timeout).
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<RpcCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn unary(&self, call: RpcCall) -> Result<Value, BackendError> {
        self.calls.lock().unwrap().push(call.clone());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            if tokio::time::timeout(call.timeout, tokio::time::sleep(delay)).await.is_err() {
                return Err(BackendError::deadline_exceeded());
            }
        }

        let programmed = self.replies.lock().unwrap().get(&call.path).cloned();
        programmed.unwrap_or(Ok(call.payload))
    }

    fn address(&self) -> &str {
        &self.address
    }
}

/// Backend whose calls never finish. Records when a call starts and when its future is dropped.
#[derive(Debug, Default)]
pub struct StallingTransport {
    pub started: Notify,
    pub dropped: Arc<AtomicBool>,
}

/// Sets its flag when the in-flight call is dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RpcTransport for StallingTransport {
    async fn unary(&self, _call: RpcCall) -> Result<Value, BackendError> {
        let _flag = DropFlag(self.dropped.clone());
        self.started.notify_one();
        std::future::pending::<()>().await;
        Ok(Value::Null)
    }

    fn address(&self) -> &str {
        "stalled.mock:9101"
    }
}

/// Dialer that hands out mock transports and refuses selected addresses.
#[derive(Default)]
pub struct CountingDialer {
    pub dials: AtomicUsize,
    pub refuse: Vec<String>,
}

#[async_trait]
impl Dialer for CountingDialer {
    async fn dial(&self, backend: &BackendConfig) -> Result<Arc<dyn RpcTransport>, ConnectionError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        if self.refuse.contains(&backend.address) {
            return Err(ConnectionError::Dial {
                address: backend.address.clone(),
                reason: "connection refused".into(),
            });
        }
        Ok(MockTransport::new(&backend.address))
    }
}

/// Both backend groups served by their own mock.
pub struct Backends {
    pub users: Arc<MockTransport>,
    pub schedules: Arc<MockTransport>,
}

impl Backends {
    pub fn new() -> Self {
        Self {
            users: MockTransport::new("users.mock:9101"),
            schedules: MockTransport::new("schedules.mock:9102"),
        }
    }

    pub fn registry(&self) -> ConnectionRegistry {
        let mut registry = ConnectionRegistry::new();
        registry.insert("user_service", self.users.clone());
        registry.insert("schedule_service", self.schedules.clone());
        registry
    }

    pub fn total_calls(&self) -> usize {
        self.users.call_count() + self.schedules.call_count()
    }
}

/// Router over the given registry with default config.
pub fn router(registry: ConnectionRegistry) -> Router {
    router_with(GatewayConfig::default(), registry)
}

pub fn router_with(config: GatewayConfig, registry: ConnectionRegistry) -> Router {
    HttpServer::new(config, Arc::new(registry)).router()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Status and parsed JSON body.
pub async fn read_json(response: Response<Body>) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn field(name: &str, number: i32, ty: Type, label: Label, type_name: Option<&str>) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        type_name: type_name.map(str::to_string),
        ..Default::default()
    }
}

fn string(name: &str, number: i32) -> FieldDescriptorProto {
    field(name, number, Type::String, Label::Optional, None)
}

fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: fields,
        ..Default::default()
    }
}

fn method(name: &str, input: &str, output: &str) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_string()),
        input_type: Some(format!(".user_service.{}", input)),
        output_type: Some(format!(".user_service.{}", output)),
        ..Default::default()
    }
}

/// Schema of a student service shaped like the user backend's.
pub fn student_descriptor_set() -> FileDescriptorSet {
    let file = FileDescriptorProto {
        name: Some("student.proto".to_string()),
        package: Some("user_service".to_string()),
        syntax: Some("proto3".to_string()),
        message_type: vec![
            message("StudentPrimaryKey", vec![string("id", 1)]),
            message(
                "Student",
                vec![
                    string("id", 1),
                    string("full_name", 2),
                    string("password", 3),
                    string("phone", 4),
                ],
            ),
            message(
                "GetAllRequest",
                vec![
                    field("offset", 1, Type::Int64, Label::Optional, None),
                    field("limit", 2, Type::Int64, Label::Optional, None),
                    string("search", 3),
                ],
            ),
            message(
                "StudentList",
                vec![
                    field("students", 1, Type::Message, Label::Repeated, Some(".user_service.Student")),
                    field("count", 2, Type::Int64, Label::Optional, None),
                ],
            ),
            message("Empty", vec![]),
        ],
        service: vec![ServiceDescriptorProto {
            name: Some("StudentService".to_string()),
            method: vec![
                method("Create", "Student", "Student"),
                method("GetById", "StudentPrimaryKey", "Student"),
                method("Update", "Student", "Student"),
                method("Delete", "StudentPrimaryKey", "Empty"),
                method("GetAll", "GetAllRequest", "StudentList"),
            ],
            ..Default::default()
        }],
        ..Default::default()
    };
    FileDescriptorSet { file: vec![file] }
}

pub fn student_schema() -> Arc<ServiceSchema> {
    let pool = prost_reflect::DescriptorPool::from_file_descriptor_set(student_descriptor_set()).unwrap();
    Arc::new(ServiceSchema::new(pool))
}
