//! Protocol-conformant player and the concurrent load driver.
//!
//! A client asks for a game, plays its dealt hand in the order received and
//! tallies the results. [`run_clients`] launches many of them at once against
//! a live server, capped by a semaphore.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};
use war_engine::errors::ProtocolError;
use war_engine::protocol::{
    decode_game_start, decode_play_result, ClientMessage, FRAME_LEN, GAMESTART_LEN,
};
use war_engine::rules::{Tally, Verdict};

use crate::connection::{Connection, ConnectionFault};

/// Concurrency cap used by the load driver unless told otherwise.
pub const DEFAULT_CONCURRENCY: usize = 1000;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Connection fault: {0}")]
    Fault(#[from] ConnectionFault),
    #[error("Server sent an invalid frame: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Plays one full game over an established connection.
pub async fn play_game<S>(conn: &mut Connection<S>) -> Result<Tally, ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    conn.write_frame(&ClientMessage::WantGame.encode()).await?;
    let deal = conn.read_frame::<GAMESTART_LEN>().await?;
    let hand = decode_game_start(&deal)?;

    let mut tally = Tally::default();
    for card in hand.iter() {
        conn.write_frame(&ClientMessage::play(card).encode()).await?;
        let frame = conn.read_frame::<FRAME_LEN>().await?;
        tally.record(decode_play_result(frame)?);
    }
    Ok(tally)
}

/// Connects to `addr` (`host:port`), plays one game and closes.
pub async fn connect_and_play(addr: &str) -> Result<Tally, ClientError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ClientError::Connect {
            addr: addr.to_string(),
            source,
        })?;
    let mut conn = Connection::new(stream, addr);
    let tally = play_game(&mut conn).await?;
    conn.close().await;
    debug!(
        wins = tally.wins,
        draws = tally.draws,
        losses = tally.losses,
        "Game complete, I {}",
        tally.verdict()
    );
    Ok(tally)
}

/// Outcome of a load run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub requested: usize,
    pub completed: usize,
    pub failed: usize,
    pub won: usize,
    pub drew: usize,
    pub lost: usize,
}

impl LoadReport {
    fn record(&mut self, result: Result<Tally, ClientError>) {
        match result {
            Ok(tally) => {
                self.completed += 1;
                match tally.verdict() {
                    Verdict::Won => self.won += 1,
                    Verdict::Drew => self.drew += 1,
                    Verdict::Lost => self.lost += 1,
                }
            }
            Err(err) => {
                self.failed += 1;
                error!(error = %err, "client failed");
            }
        }
    }
}

/// Runs `count` clients against `addr`, at most `concurrency` at a time,
/// and collects their results in completion order.
pub async fn run_clients(addr: &str, count: usize, concurrency: usize) -> LoadReport {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut clients = JoinSet::new();

    for _ in 0..count {
        let permits = Arc::clone(&permits);
        let addr = addr.to_string();
        clients.spawn(async move {
            let _permit = permits.acquire_owned().await;
            connect_and_play(&addr).await
        });
    }

    let mut report = LoadReport {
        requested: count,
        ..LoadReport::default()
    };
    while let Some(joined) = clients.join_next().await {
        match joined {
            Ok(result) => report.record(result),
            Err(err) => {
                report.failed += 1;
                error!(error = %err, "client task panicked");
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};
    use war_engine::deck::Deck;
    use war_engine::protocol::ServerMessage;
    use war_engine::rules::Outcome;

    #[tokio::test]
    async fn plays_hand_in_dealt_order() {
        let (near, mut server) = duplex(1024);
        let (hand, _) = Deck::new_with_seed(21).deal();
        let expected: Vec<u8> = hand.iter().map(|c| c.value()).collect();

        let fake_server = tokio::spawn(async move {
            let mut hello = [0u8; 2];
            server.read_exact(&mut hello).await.unwrap();
            assert_eq!(hello, [0, 0]);
            server
                .write_all(&ServerMessage::GameStart(hand).encode())
                .await
                .unwrap();

            let mut played = Vec::new();
            for _ in 0..26 {
                let mut frame = [0u8; 2];
                server.read_exact(&mut frame).await.unwrap();
                assert_eq!(frame[0], 0x02);
                played.push(frame[1]);
                server
                    .write_all(&ServerMessage::PlayResult(Outcome::Win).encode())
                    .await
                    .unwrap();
            }
            played
        });

        let mut conn = Connection::new(near, "fake");
        let tally = play_game(&mut conn).await.expect("game");
        assert_eq!(tally.wins, 26);
        assert_eq!(fake_server.await.unwrap(), expected);
    }

    #[tokio::test]
    async fn garbage_deal_is_protocol_error() {
        let (near, mut server) = duplex(1024);
        tokio::spawn(async move {
            let mut hello = [0u8; 2];
            server.read_exact(&mut hello).await.unwrap();
            server.write_all(&[0x01; GAMESTART_LEN]).await.unwrap();
        });

        let mut conn = Connection::new(near, "fake");
        let err = play_game(&mut conn).await.expect_err("bad deal");
        assert!(matches!(
            err,
            ClientError::Protocol(ProtocolError::DuplicateCard(1))
        ));
    }

    #[tokio::test]
    async fn closed_server_is_fault() {
        let (near, server) = duplex(1024);
        drop(server);
        let mut conn = Connection::new(near, "fake");
        assert!(matches!(
            play_game(&mut conn).await,
            Err(ClientError::Fault(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_server_counts_failures() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let report = run_clients(&addr, 3, 2).await;
        assert_eq!(report.requested, 3);
        assert_eq!(report.completed, 0);
        assert_eq!(report.failed, 3);
    }
}
