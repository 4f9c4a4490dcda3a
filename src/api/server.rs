//! HTTP server lifecycle.
//!
//! Binds the listener eagerly so a bad address fails at startup, then serves
//! the router on a background task until `shutdown()` is called.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to a running API server.
pub struct ApiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// The address the server actually bound (useful with port 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal graceful shutdown. Idempotent; in-flight requests complete.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Bind `addr` and serve the API until the returned handle is shut down.
pub async fn start_server(ctx: ApiContext, addr: SocketAddr) -> Result<ApiServer, ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let bound = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = api_router(ctx);

    tokio::spawn(async move {
        let serve = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        if let Err(err) = serve.await {
            tracing::error!(%err, "API server terminated abnormally");
        }
    });

    tracing::info!(%bound, "API server listening");
    Ok(ApiServer {
        addr: bound,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::sqlite::open_memory_database;

    fn test_ctx() -> ApiContext {
        let config = AppConfig {
            bind_addr: ([127, 0, 0, 1], 0).into(),
            database_path: ":memory:".into(),
            jwt_secret: "server-test-secret".into(),
            token_ttl_days: 7,
        };
        ApiContext::new(open_memory_database().unwrap(), config)
    }

    #[tokio::test]
    async fn serves_health_on_ephemeral_port() {
        let mut server = start_server(test_ctx(), ([127, 0, 0, 1], 0).into())
            .await
            .unwrap();

        let url = format!("http://{}/api/health", server.addr());
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Server is running");

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let mut server = start_server(test_ctx(), ([127, 0, 0, 1], 0).into())
            .await
            .unwrap();
        server.shutdown();
        server.shutdown();
    }

    #[tokio::test]
    async fn stops_accepting_after_shutdown() {
        let mut server = start_server(test_ctx(), ([127, 0, 0, 1], 0).into())
            .await
            .unwrap();
        let url = format!("http://{}/api/health", server.addr());
        assert!(reqwest::get(&url).await.is_ok());

        server.shutdown();
        // Give the accept loop a moment to wind down.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(500))
            .build()
            .unwrap();
        assert!(client.get(&url).send().await.is_err());
    }
}
