use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use wallboard_core::api::{ApiErrorBody, HealthResponse};
use wallboard_core::model::NetworkBandwidthData;
use wallboard_core::now_utc;

use crate::service::{NetmonService, ServiceError};

const UNAVAILABLE_MESSAGE: &str = "vnStat may not be installed or has not collected data yet";
const INTERNAL_ERROR: &str = "Failed to fetch network data";

#[derive(Clone)]
pub struct AppState {
    svc: Arc<NetmonService>,
}

pub fn router(svc: Arc<NetmonService>) -> Router {
    let state = AppState { svc };
    Router::new()
        .route("/api/health", get(health))
        .route("/api/network/bandwidth", get(bandwidth))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        timestamp: now_utc(),
    })
}

async fn bandwidth(State(st): State<AppState>) -> Result<Json<NetworkBandwidthData>, AppError> {
    let data = st.svc.bandwidth().await?;
    tracing::debug!(
        interface = %data.interface,
        devices = data.top_devices.len(),
        "bandwidth snapshot"
    );
    Ok(Json(data))
}

#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(value: E) -> Self {
        Self(value.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(ServiceError::Unavailable) = self.0.downcast_ref::<ServiceError>() {
            tracing::warn!(error = %self.0, "bandwidth data unavailable");
            let body = Json(ApiErrorBody {
                error: ServiceError::Unavailable.to_string(),
                message: Some(UNAVAILABLE_MESSAGE.into()),
            });
            return (StatusCode::SERVICE_UNAVAILABLE, body).into_response();
        }

        tracing::error!(error = %self.0, "request failed");
        let body = Json(ApiErrorBody {
            error: INTERNAL_ERROR.into(),
            message: None,
        });
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unavailable_maps_to_503_with_fixed_body() {
        let resp = AppError::from(ServiceError::Unavailable).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let v = body_json(resp).await;
        assert_eq!(v["error"], "Network monitoring not available");
        assert_eq!(
            v["message"],
            "vnStat may not be installed or has not collected data yet"
        );
    }

    #[tokio::test]
    async fn other_errors_map_to_500() {
        let resp = AppError::from(ServiceError::Malformed("no traffic".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let v = body_json(resp).await;
        assert_eq!(v["error"], "Failed to fetch network data");
        assert!(v.get("message").is_none());
    }

    #[tokio::test]
    async fn bandwidth_without_vnstat_is_503() {
        let svc = NetmonService::new(
            "/nonexistent/vnstat".into(),
            "/nonexistent/arp".into(),
            10,
            Duration::from_secs(1),
        );
        let st = AppState { svc: Arc::new(svc) };
        let resp = bandwidth(State(st)).await.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(h) = health().await;
        assert_eq!(h.status, "ok");
    }
}
