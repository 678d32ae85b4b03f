// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Network reachability probe used as the dispatch pre-flight check.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

/// Answers "is the network reachable right now?" before a dispatch cycle.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync + 'static {
    async fn is_reachable(&self) -> bool;
}

/// Probe that opens a TCP connection to a well-known `host:port`.
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout: Duration::from_secs(5),
        }
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn is_reachable(&self) -> bool {
        match tokio::time::timeout(self.timeout, tokio::net::TcpStream::connect(&self.addr)).await
        {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(addr = %self.addr, error = %e, "connectivity probe failed");
                false
            }
            Err(_) => {
                debug!(addr = %self.addr, "connectivity probe timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reachable_when_listener_accepts() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let probe = TcpProbe::new(addr.to_string());
        assert!(probe.is_reachable().await);
    }

    #[tokio::test]
    async fn unreachable_when_connection_refused() {
        // Bind to learn a free port, then release it.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = TcpProbe::new(addr.to_string());
        assert!(!probe.is_reachable().await);
    }
}
