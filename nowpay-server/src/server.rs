//! Axum server setup and router configuration.

use crate::api::ipn::receive_ipn;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Build the main application router.
///
/// `ipn_path` is the route NOWPayments posts deliveries to.
pub fn build_router(state: AppState, ipn_path: &str) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route(ipn_path, post(receive_ipn))
        // Add state to all routes
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run the server with graceful shutdown support.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use nowpay_sdk::ipn::IpnReceiver;
    use nowpay_sdk::objects::Payload;
    use nowpay_sdk::signature::IPN_SIGNATURE_HEADER;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const BODY: &str = r#"{"payment_status":"finished","order_id":"2"}"#;
    const GOLDEN: &str = "d2c36bbe09520b6fcaab21932d11275581e73724bad70e0b4d7a55212954c49f792a37e26f326704ea9534204d75993c99beae5a359b025b7e1c43de71f9026d";

    fn router(reject_unverified: bool) -> (Router, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let receiver = IpnReceiver::from_secret("my_secret", move |_payload: Payload| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
        .unwrap();
        let state = AppState::new(receiver, reject_unverified);
        (build_router(state, "/ipn"), calls)
    }

    fn delivery(body: &'static str, signature: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/ipn")
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            builder = builder.header(IPN_SIGNATURE_HEADER, signature);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_verified_delivery() {
        let (router, calls) = router(false);
        let response = router.oneshot(delivery(BODY, Some(GOLDEN))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unverified_delivery_is_acknowledged() {
        let (router, calls) = router(false);
        let response = router
            .oneshot(delivery(BODY, Some("0".repeat(128).as_str())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unverified_delivery_is_refused_when_configured() {
        let (router, calls) = router(true);
        let response = router.oneshot(delivery(BODY, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_delivery() {
        let (router, calls) = router(false);
        let response = router
            .oneshot(delivery("{\"order_id\":", Some(GOLDEN)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = router(false);
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "healthy");
    }
}
