//! Status API Handler
//!
//! Reports the service registration info of the running pipeline.

use axum::{
    extract::State,
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use conflux_core::domain::service::ServiceInfo;
use std::sync::Arc;

/// GET (any path)
/// Registration info as JSON; other methods get 405 with an empty body
pub async fn service_status(State(info): State<Arc<ServiceInfo>>, method: Method) -> Response {
    if method != Method::GET {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    match serde_json::to_vec(info.as_ref()) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize service info: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::serve;
    use conflux_core::domain::service::INFO_RESPONSE_TYPE;
    use reqwest::StatusCode as HttpStatus;
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    fn info() -> ServiceInfo {
        ServiceInfo {
            kind: INFO_RESPONSE_TYPE.to_string(),
            name: "conflux-orders".to_string(),
            id: "ABC123".to_string(),
            version: "1.0.0".to_string(),
            description: "Orders".to_string(),
            metadata: HashMap::from([("pipeline".to_string(), "orders".to_string())]),
            endpoints: vec![],
        }
    }

    /// Start the status endpoint on a random port, return the base URL
    async fn start_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(serve(listener, Arc::new(info())));

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_get_returns_service_info() {
        let base = start_server().await;

        let response = reqwest::get(format!("{base}/")).await.unwrap();
        assert_eq!(response.status(), HttpStatus::OK);
        assert_eq!(
            response.headers()[reqwest::header::CONTENT_TYPE],
            "application/json"
        );

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["type"], INFO_RESPONSE_TYPE);
        assert_eq!(body["metadata"]["pipeline"], "orders");

        let decoded: ServiceInfo = serde_json::from_value(body).unwrap();
        assert_eq!(decoded, info());
    }

    #[tokio::test]
    async fn test_any_path_is_served() {
        let base = start_server().await;

        let response = reqwest::get(format!("{base}/healthz")).await.unwrap();
        assert_eq!(response.status(), HttpStatus::OK);
    }

    #[tokio::test]
    async fn test_post_is_rejected() {
        let base = start_server().await;

        let response = reqwest::Client::new()
            .post(format!("{base}/"))
            .body("ping")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatus::METHOD_NOT_ALLOWED);
        assert!(response.text().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_rejected() {
        let base = start_server().await;

        let response = reqwest::Client::new()
            .delete(format!("{base}/"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatus::METHOD_NOT_ALLOWED);
    }
}
