// Path: crates/node/src/admin.rs
use std::time::Duration;

/// REST path that asks the node to stop.
pub const SHUTDOWN_PATH: &str = "/api/v0/shutdown";

/// Talks to the node's REST interface.
#[derive(Debug, Clone)]
pub struct AdminClient {
    base_url: String,
    client: reqwest::Client,
}

impl AdminClient {
    /// Builds a client for the node listening on `rest_listen` (`IP:PORT`).
    /// Every request is bounded by `timeout`.
    pub fn new(rest_listen: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: format!("http://{rest_listen}"),
            client,
        })
    }

    pub fn shutdown_url(&self) -> String {
        format!("{}{SHUTDOWN_PATH}", self.base_url)
    }

    /// Requests a node shutdown.
    pub async fn shutdown(&self) -> Result<(), reqwest::Error> {
        self.client
            .get(self.shutdown_url())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
