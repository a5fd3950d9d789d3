//! # war-server: Networked War Game
//!
//! Pairs inbound TCP connections, runs each pair through the war protocol
//! state machine on its own task, and ships a matching client and load
//! driver.
//!
//! - [`connection`] - Fixed-size frame I/O with one fault category
//! - [`pairing`] - Mutex-guarded queue that matches connections two at a time
//! - [`session`] - Handshake, deal, 26 turns, termination
//! - [`server`] - TCP listener, lobby and shutdown handle
//! - [`client`] - Game client and concurrent load driver
//! - [`stats`] - Session counters
//! - [`logging`] - `tracing` subscriber setup and a capturing test layer

pub mod client;
pub mod connection;
pub mod logging;
pub mod pairing;
pub mod server;
pub mod session;
pub mod stats;

pub use client::{connect_and_play, run_clients, ClientError, LoadReport};
pub use connection::{Connection, ConnectionFault};
pub use logging::{init_logging, LogEntry, LogFormat, TestLogSubscriber};
pub use pairing::{Pairing, PairingError, PairingQueue};
pub use server::{GameServer, Lobby, ServerConfig, ServerError, ServerHandle};
pub use session::{Session, SessionError, SessionId, SessionSummary, Side};
pub use stats::{ServerStats, StatsSnapshot};
