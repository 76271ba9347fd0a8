use reqwest::Client;
use wallboard_core::config::NetworkConfig;
use wallboard_core::model::NetworkBandwidthData;
use wallboard_core::FetchError;

use super::{endpoint, get_json};

/// Reads the bandwidth service. A 503 from the service surfaces as
/// [`FetchError::Status`] carrying `"{error}: {message}"`.
pub async fn fetch(client: &Client, cfg: &NetworkConfig) -> Result<NetworkBandwidthData, FetchError> {
    let url = endpoint(&cfg.base_url, "api/network/bandwidth", &[])?;
    get_json(client, url).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wallboard_core::{FetchStatus, RefreshController};

    use super::*;

    const OK_BODY: &str = r#"{"timestamp":"2025-12-20T18:30:00.000Z","interface":"eth0","currentRates":{"download":125000,"upload":4200},"today":{"download":10,"upload":20},"month":{"download":30,"upload":40},"topDevices":[]}"#;
    const DOWN_BODY: &str = r#"{"error":"Network monitoring not available","message":"vnStat may not be installed or has not collected data yet"}"#;

    /// Serves the given (status line, body) pairs to successive connections.
    async fn serve(responses: Vec<(&'static str, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut sock, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 4096];
                let _ = sock.read(&mut buf).await;
                let reply = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                sock.write_all(reply.as_bytes()).await.unwrap();
                let _ = sock.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    fn client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn decodes_service_payload() {
        let base_url = serve(vec![("200 OK", OK_BODY)]).await;
        let data = fetch(&client(), &NetworkConfig { base_url }).await.unwrap();
        assert_eq!(data.interface, "eth0");
        assert_eq!(data.current_rates.download, 125_000);
    }

    #[tokio::test]
    async fn unavailable_service_keeps_previous_value() {
        let base_url = serve(vec![
            ("200 OK", OK_BODY),
            ("503 Service Unavailable", DOWN_BODY),
        ])
        .await;
        let cfg = NetworkConfig { base_url };
        let client = client();

        let mut ctl = RefreshController::new(
            "network",
            move || {
                let client = client.clone();
                let cfg = cfg.clone();
                async move { fetch(&client, &cfg).await }
            },
            0,
            true,
        );
        let mut rx = ctl.subscribe();
        ctl.start();
        rx.wait_for(|st| st.value.is_some()).await.unwrap();
        let before = ctl.state();

        assert!(ctl.refetch_now());
        rx.wait_for(|st| st.error.is_some()).await.unwrap();

        let st = ctl.state();
        assert_eq!(st.status(), FetchStatus::Stale);
        assert_eq!(st.value, before.value);
        assert_eq!(st.last_updated, before.last_updated);
        assert_eq!(
            st.error.as_deref(),
            Some("Network monitoring not available: vnStat may not be installed or has not collected data yet (HTTP 503)")
        );
    }
}
