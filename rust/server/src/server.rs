use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;
use war_engine::deck::Deck;

use crate::connection::Connection;
use crate::pairing::{PairingError, PairingQueue};
use crate::session::Session;
use crate::stats::ServerStats;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4444;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    host: String,
    port: u16,
    seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            seed: None,
        }
    }

    /// Loopback on an OS-assigned port.
    pub fn for_tests() -> Self {
        Self::new("127.0.0.1", 0)
    }

    /// Deal session `k` from `seed + k` instead of fresh entropy.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Server task failed: {0}")]
    Task(String),
}

/// Shared state behind the listener: the pairing queue, deck seeding and
/// counters. Generic over the stream so it can be driven without sockets.
#[derive(Debug)]
pub struct Lobby<S> {
    queue: PairingQueue<Connection<S>>,
    seed: Option<u64>,
    stats: ServerStats,
}

impl<S> Lobby<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(seed: Option<u64>, stats: ServerStats) -> Self {
        Self {
            queue: PairingQueue::new(),
            seed,
            stats,
        }
    }

    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    pub fn waiting(&self) -> usize {
        self.queue.waiting()
    }

    /// Parks `conn`, or pairs it with a waiting connection and spawns the
    /// session. The returned handle resolves when that session ends.
    pub fn admit(&self, conn: Connection<S>) -> Result<Option<JoinHandle<()>>, PairingError> {
        self.stats.record_connection();
        let Some(pairing) = self.queue.enqueue(conn)? else {
            debug!(waiting = self.queue.waiting(), "connection parked");
            return Ok(None);
        };

        let ordinal = self.stats.record_session_start();
        let deck = match self.seed {
            Some(base) => Deck::new_with_seed(base.wrapping_add(ordinal)),
            None => Deck::from_entropy(),
        };
        let session = Session::new(
            Uuid::new_v4().to_string(),
            pairing.first,
            pairing.second,
            deck,
        );
        let stats = self.stats.clone();
        Ok(Some(tokio::spawn(async move {
            match session.run().await {
                Ok(_) => stats.record_session_complete(),
                Err(_) => stats.record_session_abort(),
            }
        })))
    }

    pub fn close_waiting(&self) -> usize {
        self.queue.clear()
    }
}

#[derive(Debug, Clone)]
pub struct GameServer {
    config: ServerConfig,
    stats: ServerStats,
}

impl GameServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            stats: ServerStats::new(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let GameServer { config, stats } = self;
        let bind_addr = Self::bind_addr(&config).await?;
        let listener = TcpListener::bind(bind_addr).await?;
        let addr = listener.local_addr()?;

        info!(%addr, seeded = config.seed().is_some(), "war server listening");

        let lobby = Arc::new(Lobby::new(config.seed(), stats.clone()));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(Self::accept_loop(listener, lobby, shutdown_rx));

        Ok(ServerHandle::new(addr, shutdown_tx, task, stats))
    }

    async fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        let host = config.host();

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }

        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }

        let candidate = format!("{}:{}", host, config.port());
        let mut addrs = tokio::net::lookup_host(&candidate).await.map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;

        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }

    async fn accept_loop(
        listener: TcpListener,
        lobby: Arc<Lobby<TcpStream>>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    let dropped = lobby.close_waiting();
                    info!(dropped_waiting = dropped, "war server shutting down");
                    lobby.stats().log_stats();
                    return;
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            debug!(%peer, "connection accepted");
                            if let Err(err) = lobby.admit(Connection::new(stream, peer.to_string())) {
                                error!(%peer, error = %err, "pairing failed, connection dropped");
                            }
                        }
                        Err(err) => {
                            error!(error = %err, "accept failed");
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    stats: ServerStats,
}

impl ServerHandle {
    fn new(
        addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<()>,
        stats: ServerStats,
    ) -> Self {
        Self {
            addr,
            shutdown: Some(shutdown),
            task: Some(task),
            stats,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    /// Stops accepting and closes parked connections. Sessions already
    /// running play on to completion.
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.await.map_err(|err| ServerError::Task(err.to_string()))?;
        }

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host(), DEFAULT_HOST);
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.seed(), None);
        assert_eq!(config.with_seed(Some(9)).seed(), Some(9));
    }

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let handle = GameServer::new(ServerConfig::for_tests())
            .start()
            .await
            .expect("start");
        assert_ne!(handle.address().port(), 0);
        handle.shutdown().await.expect("shutdown");
    }

    #[tokio::test]
    async fn pairing_failure_keeps_listener_alive() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let lobby = Arc::new(Lobby::new(None, ServerStats::new()));
        lobby.queue.poison();

        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(GameServer::accept_loop(listener, Arc::clone(&lobby), rx));

        for _ in 0..2 {
            let _client = TcpStream::connect(addr).await.unwrap();
        }
        for _ in 0..500 {
            if lobby.stats().snapshot().connections_accepted == 2 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(lobby.stats().snapshot().connections_accepted, 2);
        assert!(!task.is_finished(), "listener must survive pairing errors");

        tx.send(()).unwrap();
        task.await.expect("listener stops on shutdown");
    }

    #[tokio::test]
    async fn panicked_listener_is_task_error() {
        let (tx, _rx) = oneshot::channel();
        let task = tokio::spawn(async {
            panic!("listener crashed");
        });
        let handle = ServerHandle::new(
            "127.0.0.1:0".parse().unwrap(),
            tx,
            task,
            ServerStats::new(),
        );
        assert!(matches!(handle.shutdown().await, Err(ServerError::Task(_))));
    }

    #[tokio::test]
    async fn unresolvable_host_is_config_error() {
        let config = ServerConfig::new("no-such-host.invalid", 0);
        let result = GameServer::new(config).start().await;
        assert!(matches!(result, Err(ServerError::ConfigError(_))));
    }
}
