//! Axum handlers.
//!
//! Resource handlers receive their descriptor from the route closure and hand
//! everything else to the dispatcher. Extractor rejections are turned into
//! decode envelopes here so callers never see axum's plain-text errors.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Json;
use serde_json::{json, Value};

use crate::dispatch::{DispatchRequest, GatewayError};
use crate::http::envelope::Envelope;
use crate::http::request::{call_context, ListQuery};
use crate::http::server::AppState;
use crate::resources::{Operation, ResourceDescriptor};

pub async fn create(
    State(state): State<AppState>,
    descriptor: &'static ResourceDescriptor,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Envelope {
    let ctx = call_context(&headers, state.request_timeout);
    match body {
        Ok(Json(body)) => {
            state
                .dispatcher
                .dispatch(descriptor, DispatchRequest::Create { body }, ctx)
                .await
        }
        Err(rejection) => {
            state
                .dispatcher
                .reject(descriptor, Operation::Create, ctx, decode_error(rejection.body_text()))
        }
    }
}

pub async fn get_by_id(
    State(state): State<AppState>,
    descriptor: &'static ResourceDescriptor,
    headers: HeaderMap,
    id: Result<Path<String>, PathRejection>,
) -> Envelope {
    let ctx = call_context(&headers, state.request_timeout);
    match id {
        Ok(Path(id)) => {
            state
                .dispatcher
                .dispatch(descriptor, DispatchRequest::GetById { id }, ctx)
                .await
        }
        Err(rejection) => {
            state
                .dispatcher
                .reject(descriptor, Operation::GetById, ctx, decode_error(rejection.body_text()))
        }
    }
}

pub async fn update(
    State(state): State<AppState>,
    descriptor: &'static ResourceDescriptor,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Envelope {
    let ctx = call_context(&headers, state.request_timeout);
    match body {
        Ok(Json(body)) => {
            state
                .dispatcher
                .dispatch(descriptor, DispatchRequest::Update { body }, ctx)
                .await
        }
        Err(rejection) => {
            state
                .dispatcher
                .reject(descriptor, Operation::Update, ctx, decode_error(rejection.body_text()))
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    descriptor: &'static ResourceDescriptor,
    headers: HeaderMap,
    id: Result<Path<String>, PathRejection>,
) -> Envelope {
    let ctx = call_context(&headers, state.request_timeout);
    match id {
        Ok(Path(id)) => {
            state
                .dispatcher
                .dispatch(descriptor, DispatchRequest::Delete { id }, ctx)
                .await
        }
        Err(rejection) => {
            state
                .dispatcher
                .reject(descriptor, Operation::Delete, ctx, decode_error(rejection.body_text()))
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    descriptor: &'static ResourceDescriptor,
    headers: HeaderMap,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Envelope {
    let ctx = call_context(&headers, state.request_timeout);
    match query {
        Ok(Query(ListQuery {
            page,
            limit,
            search,
        })) => {
            state
                .dispatcher
                .dispatch(
                    descriptor,
                    DispatchRequest::List {
                        page,
                        limit,
                        search,
                    },
                    ctx,
                )
                .await
        }
        Err(rejection) => {
            state
                .dispatcher
                .reject(descriptor, Operation::List, ctx, decode_error(rejection.body_text()))
        }
    }
}

fn decode_error(text: String) -> GatewayError {
    GatewayError::Decode(text)
}

/// `GET /`
pub async fn index() -> Envelope {
    Envelope::success(
        StatusCode::OK,
        "Api gateway",
        json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// `GET /health`: connection status of every backend group.
pub async fn health(State(state): State<AppState>) -> Envelope {
    let registry = state.dispatcher.registry();
    let status = if registry.all_connected() { "ok" } else { "degraded" };
    Envelope::success(
        StatusCode::OK,
        "Backend status",
        json!({
            "status": status,
            "environment": state.environment,
            "backends": registry.statuses(),
        }),
    )
}

/// Unknown path.
pub async fn not_found(method: Method, uri: Uri) -> Envelope {
    Envelope::failure(
        StatusCode::NOT_FOUND,
        "route not found",
        format!("no route for {} {}", method, uri.path()),
    )
}

/// Known path, undeclared method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> Envelope {
    Envelope::failure(
        StatusCode::METHOD_NOT_ALLOWED,
        "method not allowed",
        format!("{} is not supported on {}", method, uri.path()),
    )
}
