use crate::collectors::SampleError;
use crate::monitor::Monitor;
use crate::snapshot::{now_unix, Snapshot};
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct HttpAppState {
    pub monitor: Arc<Monitor>,
}

#[derive(Debug, serde::Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub history: Vec<Snapshot>,
}

pub fn build_router(monitor: Arc<Monitor>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/metrics", get(metrics_handler))
        .route("/api/v1/metrics/history", get(history_handler))
        .route("/api/v1/system/info", get(system_info_handler))
        .route("/api/v1/processes", get(processes_handler))
        .route("/api/v1/network", get(network_handler))
        .with_state(HttpAppState { monitor })
}

async fn health_handler(State(state): State<HttpAppState>) -> impl IntoResponse {
    let uptime = Duration::from_secs(state.monitor.uptime_seconds());
    Json(serde_json::json!({
        "status": "healthy",
        "time": now_unix(),
        "uptime": humantime::format_duration(uptime).to_string(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Live reading, sampled on demand rather than served from history.
async fn metrics_handler(State(state): State<HttpAppState>) -> Response {
    let snapshot = state.monitor.live_snapshot().await;
    let mut response = Json(snapshot).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

async fn history_handler(
    State(state): State<HttpAppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    // Unparseable or negative limits fall back to the configured
    // default; an explicit 0 yields an empty page.
    let limit = params
        .get("limit")
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(|v| usize::try_from(v).ok());

    let history = state.monitor.history(limit).await;
    Json(HistoryResponse {
        count: history.len(),
        history,
    })
}

async fn system_info_handler(State(state): State<HttpAppState>) -> Response {
    match state.monitor.host_info().await {
        Ok(info) => Json(info).into_response(),
        Err(err) => sample_error_response(&err),
    }
}

async fn processes_handler(State(state): State<HttpAppState>) -> Response {
    match state.monitor.processes().await {
        Ok(list) => Json(list).into_response(),
        Err(err) => sample_error_response(&err),
    }
}

async fn network_handler(State(state): State<HttpAppState>) -> Response {
    match state.monitor.interfaces().await {
        Ok(list) => Json(list).into_response(),
        Err(err) => sample_error_response(&err),
    }
}

fn sample_error_response(err: &SampleError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": err.to_string() })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::MetricsSource;
    use crate::history::HistoryStore;
    use crate::snapshot::{
        CpuStat, DiskStat, HostInfo, InterfaceStat, MemoryStat, NetworkStat, ProcessInfo,
        SystemStat,
    };
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    struct FixtureSource {
        fail_processes: bool,
    }

    impl MetricsSource for FixtureSource {
        fn sample_host(&mut self) -> Result<HostInfo, SampleError> {
            Ok(HostInfo {
                hostname: Some("fixture".to_string()),
                os: "linux".to_string(),
                ..HostInfo::default()
            })
        }

        fn sample_cpu(&mut self) -> Result<CpuStat, SampleError> {
            Ok(CpuStat {
                percent: 12.5,
                cores_logical: 2,
                ..CpuStat::default()
            })
        }

        fn sample_memory(&mut self) -> Result<MemoryStat, SampleError> {
            Ok(MemoryStat::default())
        }

        fn sample_disk(&mut self) -> Result<DiskStat, SampleError> {
            Ok(DiskStat::default())
        }

        fn sample_network(&mut self) -> Result<NetworkStat, SampleError> {
            Ok(NetworkStat::default())
        }

        fn sample_system(&mut self) -> Result<SystemStat, SampleError> {
            Ok(SystemStat::default())
        }

        fn list_processes(&mut self) -> Result<Vec<ProcessInfo>, SampleError> {
            if self.fail_processes {
                return Err(SampleError::Unavailable("process table"));
            }
            Ok(vec![ProcessInfo {
                pid: 42,
                name: "fixture-proc".to_string(),
                cpu: 1.5,
                mem_rss: 100,
                mem_vms: 200,
            }])
        }

        fn list_interfaces(&mut self) -> Result<Vec<InterfaceStat>, SampleError> {
            Ok(vec![InterfaceStat {
                iface: "eth0".to_string(),
                rx_bytes_total: 10,
                tx_bytes_total: 20,
                rx_packets_total: 1,
                tx_packets_total: 2,
                rx_errors_total: 0,
                tx_errors_total: 0,
            }])
        }
    }

    fn test_monitor(fail_processes: bool) -> Arc<Monitor> {
        let history = Arc::new(HistoryStore::new(100, 100).unwrap());
        Arc::new(Monitor::new(
            Box::new(FixtureSource { fail_processes }),
            history,
        ))
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let app = build_router(test_monitor(false));
        let (status, body) = get_body(app, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"healthy\""));
        assert!(body.contains("\"version\""));
    }

    #[tokio::test]
    async fn live_metrics_returns_fresh_snapshot() {
        let app = build_router(test_monitor(false));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-cache"
        );

        let (status, body) = get_body(app, "/api/v1/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"cpu\""));
        assert!(body.contains("\"percent\":12.5"));
    }

    #[tokio::test]
    async fn history_respects_limit_and_defaults() {
        let monitor = test_monitor(false);
        for _ in 0..3 {
            monitor.tick().await;
        }
        let app = build_router(monitor);

        let (status, body) = get_body(app.clone(), "/api/v1/metrics/history?limit=2").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"count\":2"));

        // Unparseable and negative limits fall back to the default.
        let (_, body) = get_body(app.clone(), "/api/v1/metrics/history?limit=abc").await;
        assert!(body.contains("\"count\":3"));
        let (_, body) = get_body(app.clone(), "/api/v1/metrics/history?limit=-1").await;
        assert!(body.contains("\"count\":3"));

        let (_, body) = get_body(app, "/api/v1/metrics/history?limit=0").await;
        assert!(body.contains("\"count\":0"));
    }

    #[tokio::test]
    async fn system_info_returns_host_block() {
        let app = build_router(test_monitor(false));
        let (status, body) = get_body(app, "/api/v1/system/info").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"hostname\":\"fixture\""));
    }

    #[tokio::test]
    async fn processes_lists_or_fails_explicitly() {
        let app = build_router(test_monitor(false));
        let (status, body) = get_body(app, "/api/v1/processes").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"fixture-proc\""));

        let app = build_router(test_monitor(true));
        let (status, body) = get_body(app, "/api/v1/processes").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("\"error\""));
    }

    #[tokio::test]
    async fn network_lists_interfaces() {
        let app = build_router(test_monitor(false));
        let (status, body) = get_body(app, "/api/v1/network").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"eth0\""));
    }
}
