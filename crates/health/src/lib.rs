//! Keep-alive HTTP endpoint.
//!
//! Cloud hosts probe an HTTP port to decide the process is alive; the bot
//! itself only ever polls outward. This serves a fixed liveness line.

use axum::routing::get;
use axum::Router;
use tracing::info;

pub const LIVENESS_TEXT: &str = "twinbot is running!";

pub fn router() -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/healthz", get(liveness))
}

async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

/// Bind and serve until the process exits.
pub async fn serve(host: &str, port: u16) -> std::io::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("health endpoint listening on {}", addr);
    axum::serve(listener, router()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness_text() {
        assert_eq!(liveness().await, LIVENESS_TEXT);
    }

    #[tokio::test]
    async fn test_serve_binds_ephemeral_port() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, router()).await.unwrap();
        });

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        let response = String::from_utf8_lossy(&response);
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains(LIVENESS_TEXT));
    }
}
