//! HTTP API of the panel: resource routes, health checks and Prometheus metrics

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use panel_lib::{
    health::{ComponentStatus, HealthRegistry},
    gateway::UpstreamResponse,
    Dashboard, PanelError, ResourceKind, ValidationError,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
pub struct AppState {
    pub dashboard: Dashboard,
    pub health_registry: HealthRegistry,
}

impl AppState {
    pub fn new(dashboard: Dashboard, health_registry: HealthRegistry) -> Self {
        Self {
            dashboard,
            health_registry,
        }
    }
}

type SharedState = State<Arc<AppState>>;

/// Error answer of the resource routes. Upstream errors keep the status and
/// body of the API server.
pub struct ApiError(PanelError);

impl From<PanelError> for ApiError {
    fn from(err: PanelError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError(PanelError::Validation(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PanelError::Upstream { status, body } => {
                let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
                return (status, Json(body.clone())).into_response();
            }
            PanelError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PanelError::Transport(_) | PanelError::Decode { .. } | PanelError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Successful write answered with the API server's own status code
fn upstream_reply(response: UpstreamResponse) -> (StatusCode, Json<Value>) {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
    (status, Json(response.body))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub namespace: Option<String>,
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): SharedState) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still serving
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): SharedState) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

async fn api_versions(State(state): SharedState) -> ApiResult<Json<Value>> {
    Ok(Json(state.dashboard.api_versions().await?))
}

async fn cluster_metrics(State(state): SharedState) -> ApiResult<Json<Value>> {
    let metrics = state.dashboard.cluster_metrics().await?;
    let value = serde_json::to_value(metrics).map_err(|e| PanelError::Decode {
        path: "cluster metrics".to_string(),
        message: e.to_string(),
    })?;
    Ok(Json(value))
}

/// A JSON body is a structured manifest or an envelope around a text
/// manifest, anything else is the text manifest itself
fn manifest_body(headers: &HeaderMap, body: &Bytes) -> Result<Value, ValidationError> {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false);

    if is_json {
        serde_json::from_slice(body).map_err(|e| ValidationError::Parse(e.to_string()))
    } else {
        let text = std::str::from_utf8(body)
            .map_err(|_| ValidationError::Parse("body is not valid UTF-8".to_string()))?;
        Ok(Value::String(text.to_string()))
    }
}

async fn list(
    state: Arc<AppState>,
    kind: ResourceKind,
    query: ListQuery,
) -> ApiResult<Json<Value>> {
    let namespace = query.namespace.filter(|ns| !ns.is_empty());
    Ok(Json(state.dashboard.list(kind, namespace.as_deref()).await?))
}

async fn create(
    state: Arc<AppState>,
    kind: ResourceKind,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let manifest = manifest_body(&headers, &body)?;
    let created = state.dashboard.create(kind, manifest).await?;
    Ok(upstream_reply(created))
}

async fn get_object(
    state: Arc<AppState>,
    kind: ResourceKind,
    namespace: Option<String>,
    name: String,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        state.dashboard.get(kind, namespace.as_deref(), &name).await?,
    ))
}

async fn update_object(
    state: Arc<AppState>,
    kind: ResourceKind,
    namespace: Option<String>,
    name: String,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let manifest = manifest_body(&headers, &body)?;
    let updated = state
        .dashboard
        .update_at(kind, namespace.as_deref(), &name, manifest)
        .await?;
    Ok(upstream_reply(updated))
}

async fn delete_object(
    state: Arc<AppState>,
    kind: ResourceKind,
    namespace: Option<String>,
    name: String,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let deleted = state
        .dashboard
        .delete(kind, namespace.as_deref(), &name)
        .await?;
    Ok(upstream_reply(deleted))
}

/// Routes of one resource kind. Nodes are read-only, namespaced kinds are
/// addressed by namespace and name.
fn kind_routes(kind: ResourceKind) -> Router<Arc<AppState>> {
    let collection = format!("/kube/{}", kind.plural());

    let mut collection_route = get(
        move |State(state): SharedState, Query(query): Query<ListQuery>| list(state, kind, query),
    );
    if kind != ResourceKind::Node {
        collection_route = collection_route.post(
            move |State(state): SharedState, headers: HeaderMap, body: Bytes| {
                create(state, kind, headers, body)
            },
        );
    }

    let router = Router::new().route(&collection, collection_route);

    match kind {
        ResourceKind::Node => router.route(
            &format!("{}/:name", collection),
            get(move |State(state): SharedState, Path(name): Path<String>| {
                get_object(state, kind, None, name)
            }),
        ),
        ResourceKind::Namespace => router.route(
            &format!("{}/:name", collection),
            get(move |State(state): SharedState, Path(name): Path<String>| {
                get_object(state, kind, None, name)
            })
            .put(
                move |State(state): SharedState,
                      Path(name): Path<String>,
                      headers: HeaderMap,
                      body: Bytes| {
                    update_object(state, kind, None, name, headers, body)
                },
            )
            .delete(move |State(state): SharedState, Path(name): Path<String>| {
                delete_object(state, kind, None, name)
            }),
        ),
        _ => router.route(
            &format!("{}/:namespace/:name", collection),
            get(
                move |State(state): SharedState,
                      Path((namespace, name)): Path<(String, String)>| {
                    get_object(state, kind, Some(namespace), name)
                },
            )
            .put(
                move |State(state): SharedState,
                      Path((namespace, name)): Path<(String, String)>,
                      headers: HeaderMap,
                      body: Bytes| {
                    update_object(state, kind, Some(namespace), name, headers, body)
                },
            )
            .delete(
                move |State(state): SharedState,
                      Path((namespace, name)): Path<(String, String)>| {
                    delete_object(state, kind, Some(namespace), name)
                },
            ),
        ),
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/kube/api", get(api_versions))
        .route("/kube/metrics", get(cluster_metrics));

    for kind in ResourceKind::ALL {
        router = router.merge(kind_routes(kind));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting panel API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type.parse().unwrap());
        headers
    }

    #[test]
    fn test_json_body_is_structured() {
        let body = Bytes::from_static(br#"{"kind":"Pod"}"#);
        let value = manifest_body(&headers("application/json; charset=utf-8"), &body).unwrap();
        assert_eq!(value["kind"], "Pod");
    }

    #[test]
    fn test_other_content_types_are_text() {
        let body = Bytes::from_static(b"kind: Pod\n");
        let value = manifest_body(&headers("application/yaml"), &body).unwrap();
        assert_eq!(value, Value::String("kind: Pod\n".to_string()));

        let value = manifest_body(&HeaderMap::new(), &body).unwrap();
        assert!(value.is_string());
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let body = Bytes::from_static(b"{not json");
        let err = manifest_body(&headers("application/json"), &body).unwrap_err();
        assert!(matches!(err, ValidationError::Parse(_)));
    }

    #[test]
    fn test_upstream_reply_keeps_status() {
        let (status, Json(body)) = upstream_reply(UpstreamResponse {
            status: 202,
            body: json!({"kind": "Status"}),
        });
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["kind"], "Status");
    }

    #[test]
    fn test_upstream_error_keeps_status() {
        let response = ApiError(PanelError::Upstream {
            status: 409,
            body: json!({"reason": "AlreadyExists"}),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = ApiError(PanelError::Transport("refused".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
