//! Connection pool.
//!
//! Hands out one connection per virtual-user iteration; ownership of the
//! pooled value enforces that a connection is used by at most one virtual
//! user at a time. Whether released connections are kept for reuse is a
//! scenario parameter, not an inferred behavior.

use async_trait::async_trait;
use parking_lot::Mutex;
use tonic::transport::{Channel, Endpoint};

use crate::config::ConnectionPolicy;
use crate::error::ConnectError;

/// Seam for establishing connections, so schedulers can be exercised
/// against scripted connectors in tests.
#[async_trait]
pub trait Connect: Send + Sync + 'static {
    type Conn: Send + 'static;

    async fn connect(&self) -> Result<Self::Conn, ConnectError>;
}

/// Connector producing tonic channels for a fixed endpoint.
pub struct ChannelConnector {
    endpoint: Endpoint,
    authority: String,
}

impl ChannelConnector {
    pub fn new(endpoint: Endpoint, authority: impl Into<String>) -> Self {
        Self {
            endpoint,
            authority: authority.into(),
        }
    }
}

#[async_trait]
impl Connect for ChannelConnector {
    type Conn = Channel;

    async fn connect(&self) -> Result<Channel, ConnectError> {
        self.endpoint
            .connect()
            .await
            .map_err(|source| ConnectError::Transport {
                endpoint: self.authority.clone(),
                source,
            })
    }
}

/// Pool of reusable connections over a [`Connect`] implementation.
pub struct ConnectionPool<C: Connect> {
    connector: C,
    policy: ConnectionPolicy,
    idle: Mutex<Vec<C::Conn>>,
}

impl<C: Connect> ConnectionPool<C> {
    pub fn new(connector: C, policy: ConnectionPolicy) -> Self {
        Self {
            connector,
            policy,
            idle: Mutex::new(Vec::new()),
        }
    }

    pub fn policy(&self) -> ConnectionPolicy {
        self.policy
    }

    /// Take an idle connection or establish a new one.
    pub async fn acquire(&self) -> Result<C::Conn, ConnectError> {
        if let Some(conn) = self.idle.lock().pop() {
            return Ok(conn);
        }
        self.connector.connect().await
    }

    /// Return a connection after an iteration. Under
    /// [`ConnectionPolicy::PerIteration`] the connection is dropped
    /// instead of kept.
    pub fn release(&self, conn: C::Conn) {
        if self.policy == ConnectionPolicy::Reuse {
            self.idle.lock().push(conn);
        }
    }

    /// Number of idle connections currently held.
    pub fn idle_len(&self) -> usize {
        self.idle.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingConnector {
        connects: AtomicUsize,
    }

    impl CountingConnector {
        fn new() -> Self {
            Self {
                connects: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Connect for CountingConnector {
        type Conn = usize;

        async fn connect(&self) -> Result<usize, ConnectError> {
            Ok(self.connects.fetch_add(1, Ordering::SeqCst))
        }
    }

    #[tokio::test]
    async fn reuse_policy_returns_released_connections() {
        let pool = ConnectionPool::new(CountingConnector::new(), ConnectionPolicy::Reuse);
        let conn = pool.acquire().await.unwrap();
        pool.release(conn);
        let again = pool.acquire().await.unwrap();
        assert_eq!(again, 0, "expected the pooled connection back");
        assert_eq!(pool.connector.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn per_iteration_policy_reconnects_every_time() {
        let pool = ConnectionPool::new(CountingConnector::new(), ConnectionPolicy::PerIteration);
        for _ in 0..3 {
            let conn = pool.acquire().await.unwrap();
            pool.release(conn);
        }
        assert_eq!(pool.connector.connects.load(Ordering::SeqCst), 3);
        assert_eq!(pool.idle_len(), 0);
    }

    #[tokio::test]
    async fn concurrent_acquires_get_distinct_connections() {
        use std::sync::Arc;
        let pool = Arc::new(ConnectionPool::new(
            CountingConnector::new(),
            ConnectionPolicy::Reuse,
        ));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move { pool.acquire().await.unwrap() }));
        }
        let mut seen = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap());
        }
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 8, "no connection may be handed out twice");
    }
}
