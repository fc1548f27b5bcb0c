//! Route table built from the resource catalogue.
//!
//! For each descriptor only declared operations are mounted:
//! ```text
//! POST   /api/v1/{path}          create
//! GET    /api/v1/{path}/{id}     get by id
//! PUT    /api/v1/{path}          update (id in body)
//! DELETE /api/v1/{path}/{id}     delete
//! GET    /api/v1/{collection}    list (?search=&page=&limit=)
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, MethodRouter};
use axum::{Json, Router};
use serde_json::Value;

use crate::http::handlers;
use crate::http::request::ListQuery;
use crate::http::server::AppState;
use crate::resources::{catalog, Operation, ResourceDescriptor};

pub const API_PREFIX: &str = "/api/v1";

/// Routes for every catalogued resource plus `/` and `/health`.
pub fn api_routes() -> Router<AppState> {
    let mut router = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health));

    for descriptor in catalog::all() {
        router = router.merge(resource_routes(descriptor));
    }
    router
}

/// Routes for one resource.
pub fn resource_routes(descriptor: &'static ResourceDescriptor) -> Router<AppState> {
    let mut router = Router::new();

    let mut item: MethodRouter<AppState> = MethodRouter::new();
    let mut item_mounted = false;
    if descriptor.supports(Operation::Create) {
        item = item.post(
            move |state: State<AppState>,
                  headers: HeaderMap,
                  body: Result<Json<Value>, JsonRejection>| {
                handlers::create(state, descriptor, headers, body)
            },
        );
        item_mounted = true;
    }
    if descriptor.supports(Operation::Update) {
        item = item.put(
            move |state: State<AppState>,
                  headers: HeaderMap,
                  body: Result<Json<Value>, JsonRejection>| {
                handlers::update(state, descriptor, headers, body)
            },
        );
        item_mounted = true;
    }
    if item_mounted {
        router = router.route(
            &format!("{}/{}", API_PREFIX, descriptor.path),
            item.fallback(handlers::method_not_allowed),
        );
    }

    let mut by_id: MethodRouter<AppState> = MethodRouter::new();
    let mut by_id_mounted = false;
    if descriptor.supports(Operation::GetById) {
        by_id = by_id.get(
            move |state: State<AppState>,
                  headers: HeaderMap,
                  id: Result<Path<String>, PathRejection>| {
                handlers::get_by_id(state, descriptor, headers, id)
            },
        );
        by_id_mounted = true;
    }
    if descriptor.supports(Operation::Delete) {
        by_id = by_id.delete(
            move |state: State<AppState>,
                  headers: HeaderMap,
                  id: Result<Path<String>, PathRejection>| {
                handlers::delete(state, descriptor, headers, id)
            },
        );
        by_id_mounted = true;
    }
    if by_id_mounted {
        router = router.route(
            &format!("{}/{}/{{id}}", API_PREFIX, descriptor.path),
            by_id.fallback(handlers::method_not_allowed),
        );
    }

    if let (true, Some(collection)) = (descriptor.supports(Operation::List), descriptor.collection) {
        let list = MethodRouter::new()
            .get(
                move |state: State<AppState>,
                      headers: HeaderMap,
                      query: Result<Query<ListQuery>, QueryRejection>| {
                    handlers::list(state, descriptor, headers, query)
                },
            )
            .fallback(handlers::method_not_allowed);
        router = router.route(&format!("{}/{}", API_PREFIX, collection), list);
    }

    router
}
