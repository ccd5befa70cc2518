use async_trait::async_trait;
use localchat_core::{ChatRequest, ChatResponse, ErrorResponse, Turn};
use log::{debug, info};
use reqwest::Client;

use crate::backend::{ChatBackend, ExchangeError};

/// Client for the `/chat` endpoint of a localchat server
#[derive(Debug, Clone)]
pub struct ServerClient {
    client: Client,
    endpoint: String,
}

impl ServerClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        info!("Using chat endpoint: {}", endpoint);
        Self {
            client: Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts the conversation window and returns the server's reply text
    pub async fn send_chat(&self, messages: &[Turn]) -> Result<String, ExchangeError> {
        let request = ChatRequest::new(messages.to_vec());
        debug!("Sending {} turns to {}", messages.len(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExchangeError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let fallback = status.canonical_reason().unwrap_or("Unknown error").to_string();
            // The error body is best effort; fall back to the status text
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) if !body.error.is_empty() => body.error,
                _ => fallback,
            };
            return Err(ExchangeError::Http {
                status_code: status.as_u16(),
                message,
            });
        }

        let body = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ExchangeError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        debug!("Received reply ({} chars)", body.response.len());
        Ok(body.response)
    }
}

#[async_trait]
impl ChatBackend for ServerClient {
    async fn exchange(&self, window: &[Turn]) -> Result<String, ExchangeError> {
        self.send_chat(window).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{routing::post, Json, Router};
    use localchat_core::{
        GeneratedRecord, GenerationError, GenerationOptions, GenerationResult, Generator,
    };
    use localchat_server::http_server;
    use localchat_server::{AppState, ModelHandle};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    /// Replies with the number of turns it was given
    struct CountTurns;

    #[async_trait]
    impl Generator for CountTurns {
        async fn generate(
            &self,
            messages: &[Turn],
            _options: &GenerationOptions,
        ) -> Result<GenerationResult, GenerationError> {
            Ok(GenerationResult::Record(GeneratedRecord::plain(format!(
                "{} turns",
                messages.len()
            ))))
        }
    }

    async fn spawn_router(app: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn spawn_server(model: ModelHandle) -> SocketAddr {
        let state = AppState::new(model, GenerationOptions::default());
        spawn_router(http_server::router(state)).await
    }

    #[tokio::test]
    async fn test_round_trip_through_server() {
        let addr = spawn_server(ModelHandle::ready(Arc::new(CountTurns))).await;
        let client = ServerClient::new(format!("http://{}/chat", addr));

        let reply = client
            .send_chat(&[Turn::user("hi"), Turn::assistant("hello"), Turn::user("again")])
            .await
            .unwrap();
        assert_eq!(reply, "3 turns");
    }

    #[tokio::test]
    async fn test_not_ready_maps_to_http_error() {
        let addr = spawn_server(ModelHandle::new()).await;
        let client = ServerClient::new(format!("http://{}/chat", addr));

        match client.send_chat(&[Turn::user("hi")]).await {
            Err(ExchangeError::Http {
                status_code,
                message,
            }) => {
                assert_eq!(status_code, 503);
                assert_eq!(message, http_server::MODEL_LOADING);
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_without_body_uses_status_text() {
        let app = Router::new().route(
            "/chat",
            post(|| async { axum::http::StatusCode::BAD_GATEWAY }),
        );
        let addr = spawn_router(app).await;
        let client = ServerClient::new(format!("http://{}/chat", addr));

        let err = client.send_chat(&[Turn::user("hi")]).await.unwrap_err();
        assert_eq!(err.to_string(), "Error: 502 - Bad Gateway");
    }

    #[tokio::test]
    async fn test_unexpected_success_body_is_invalid_response() {
        let app = Router::new().route(
            "/chat",
            post(|| async { Json(serde_json::json!({ "reply": "wrong field" })) }),
        );
        let addr = spawn_router(app).await;
        let client = ServerClient::new(format!("http://{}/chat", addr));

        let err = client.send_chat(&[Turn::user("hi")]).await.unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ServerClient::new(format!("http://{}/chat", addr));
        let err = client.send_chat(&[Turn::user("hi")]).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Connection(_)));
        assert!(err.hint().is_some());
    }
}
