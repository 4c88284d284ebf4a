//! Test server wrapper that starts freeroute on a random port

use std::net::SocketAddr;
use std::time::Duration;

use freeroute_config::ProxyConfig;
use freeroute_server::Server;
use tokio_util::sync::CancellationToken;

/// A running test server instance with its own persistence directory
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
    _dir: tempfile::TempDir,
}

impl TestServer {
    /// Start a test server pointed at the given upstream base URL
    ///
    /// Timeouts are shortened so scripted hangs resolve quickly.
    pub async fn start(base_url: url::Url) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let mut config = ProxyConfig::new(
            SocketAddr::from(([127, 0, 0, 1], 0)),
            base_url,
            None,
            dir.path().join("config.json"),
            dir.path().join("model_memory.json"),
        );
        config.probe_timeout = Duration::from_secs(2);
        config.chat_timeout = Duration::from_secs(2);

        let server = Server::new(config).await;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown,
            client: reqwest::Client::new(),
            _dir: dir,
        })
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Wait for the startup probe sweep to finish
    ///
    /// Polls `/health` until a sync has completed and none is running.
    pub async fn wait_until_synced(&self) {
        for _ in 0..200 {
            if let Ok(response) = self.client.get(self.url("/health")).send().await
                && let Ok(health) = response.json::<serde_json::Value>().await
                && health["is_syncing"] == false
                && !health["last_sync"].is_null()
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("server never finished its startup sync");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
