//! Protocol state machine for one paired game.
//!
//! A [`Session`] owns both connections, both hands, both used-sets and the
//! turn counter. It moves through
//! `WaitReady -> Dealt -> Playing(0..26) -> {Done, Aborted}`; any violation,
//! truncated read or transport fault on either side aborts the whole session
//! and both connections are closed.

use std::fmt;
use std::io;

use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};
use war_engine::cards::Card;
use war_engine::deck::Deck;
use war_engine::errors::ProtocolError;
use war_engine::hand::{Hand, UsedSet, HAND_SIZE};
use war_engine::protocol::{ClientMessage, Command, ServerMessage, FRAME_LEN};
use war_engine::rules::{judge, Outcome, Tally};

use crate::connection::{Connection, ConnectionFault};

pub type SessionId = String;

/// Turns in a complete game: one per dealt card.
pub const TURNS: usize = HAND_SIZE;

/// Which end of a session a connection occupies. Side one is the
/// connection that was waiting in the pairing queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::One => f.write_str("1"),
            Side::Two => f.write_str("2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    WaitReady,
    Dealt,
    Playing { turn: usize },
    Done,
    Aborted,
}

/// Why a session was aborted. Always fatal to that session only.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("player {side} violated the protocol: {source}")]
    ProtocolViolation {
        side: Side,
        #[source]
        source: ProtocolError,
    },
    #[error("player {side} closed the stream mid-frame")]
    Truncation { side: Side },
    #[error("transport fault on player {side}: {source}")]
    TransportFault {
        side: Side,
        #[source]
        source: io::Error,
    },
}

impl SessionError {
    fn fault(side: Side, fault: ConnectionFault) -> Self {
        match fault {
            ConnectionFault::Truncated => SessionError::Truncation { side },
            ConnectionFault::Transport(source) => SessionError::TransportFault { side, source },
        }
    }

    fn violation(side: Side) -> impl FnOnce(ProtocolError) -> SessionError {
        move |source| SessionError::ProtocolViolation { side, source }
    }

    /// The side whose stream or frame caused the abort.
    pub fn side(&self) -> Side {
        match self {
            SessionError::ProtocolViolation { side, .. }
            | SessionError::Truncation { side }
            | SessionError::TransportFault { side, .. } => *side,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::ProtocolViolation { .. } => "protocol_violation",
            SessionError::Truncation { .. } => "truncation",
            SessionError::TransportFault { .. } => "transport_fault",
        }
    }
}

/// What a completed session reports.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub turns: usize,
    pub tallies: [Tally; 2],
}

#[derive(Debug)]
struct Seat<S> {
    conn: Connection<S>,
    hand: Hand,
    used: UsedSet,
    tally: Tally,
}

impl<S> Seat<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn new(conn: Connection<S>) -> Self {
        Self {
            conn,
            hand: Hand::default(),
            used: UsedSet::new(),
            tally: Tally::default(),
        }
    }

    fn expect_ready(&self, frame: [u8; FRAME_LEN]) -> Result<(), ProtocolError> {
        match ClientMessage::decode(frame)? {
            ClientMessage::WantGame => Ok(()),
            other => Err(ProtocolError::UnexpectedCommand {
                expected: Command::WantGame,
                found: other.command(),
            }),
        }
    }

    async fn receive<T, F>(&mut self, side: Side, check: &F) -> Result<T, SessionError>
    where
        F: Fn(&mut Seat<S>, [u8; FRAME_LEN]) -> Result<T, ProtocolError>,
    {
        let frame = self
            .conn
            .read_frame::<FRAME_LEN>()
            .await
            .map_err(|f| SessionError::fault(side, f))?;
        check(self, frame).map_err(SessionError::violation(side))
    }

    /// Validates a play against the dealt hand and records it as used.
    fn accept_play(&mut self, frame: [u8; FRAME_LEN]) -> Result<Card, ProtocolError> {
        let value = match ClientMessage::decode(frame)? {
            ClientMessage::PlayCard(value) => value,
            other => {
                return Err(ProtocolError::UnexpectedCommand {
                    expected: Command::PlayCard,
                    found: other.command(),
                })
            }
        };
        let card = self
            .hand
            .find(value)
            .ok_or(ProtocolError::CardNotDealt(value))?;
        if !self.used.insert(card) {
            return Err(ProtocolError::CardReplayed(value));
        }
        Ok(card)
    }
}

/// One paired game between two connections.
#[derive(Debug)]
pub struct Session<S> {
    id: SessionId,
    seats: [Seat<S>; 2],
    deck: Deck,
    turn: usize,
    phase: Phase,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// `first` is the connection that was waiting; it becomes side one.
    pub fn new(
        id: impl Into<SessionId>,
        first: Connection<S>,
        second: Connection<S>,
        deck: Deck,
    ) -> Self {
        Self {
            id: id.into(),
            seats: [Seat::new(first), Seat::new(second)],
            deck,
            turn: 0,
            phase: Phase::WaitReady,
        }
    }

    /// Plays the session to completion.
    ///
    /// Both connections are closed on every exit path. A fault is logged
    /// here and returned; it never escapes past the session.
    pub async fn run(mut self) -> Result<SessionSummary, SessionError> {
        info!(
            session_id = %self.id,
            first = %self.seats[0].conn.peer(),
            second = %self.seats[1].conn.peer(),
            "session started"
        );

        let result = self.drive().await;
        let reached = self.phase;
        self.phase = if result.is_ok() {
            Phase::Done
        } else {
            Phase::Aborted
        };
        self.close().await;

        match result {
            Ok(()) => {
                let summary = self.summary();
                info!(
                    session_id = %self.id,
                    turns = summary.turns,
                    wins_one = summary.tallies[0].wins,
                    wins_two = summary.tallies[1].wins,
                    draws = summary.tallies[0].draws,
                    "session complete"
                );
                Ok(summary)
            }
            Err(err) => {
                warn!(
                    session_id = %self.id,
                    phase = ?reached,
                    turn = self.turn,
                    side = %err.side(),
                    kind = err.kind(),
                    error = %err,
                    "session aborted"
                );
                Err(err)
            }
        }
    }

    async fn drive(&mut self) -> Result<(), SessionError> {
        self.await_ready().await?;
        self.deal().await?;
        while self.turn < TURNS {
            self.play_turn().await?;
        }
        Ok(())
    }

    async fn await_ready(&mut self) -> Result<(), SessionError> {
        self.phase = Phase::WaitReady;
        self.read_both(|seat, frame| seat.expect_ready(frame)).await?;
        Ok(())
    }

    async fn deal(&mut self) -> Result<(), SessionError> {
        let (first, second) = self.deck.deal();
        self.seats[0].hand = first;
        self.seats[1].hand = second;
        self.phase = Phase::Dealt;

        let frames = [
            ServerMessage::GameStart(self.seats[0].hand.clone()).encode(),
            ServerMessage::GameStart(self.seats[1].hand.clone()).encode(),
        ];
        self.write_both(&frames).await?;
        debug!(session_id = %self.id, "hands dealt");
        Ok(())
    }

    async fn play_turn(&mut self) -> Result<(), SessionError> {
        self.phase = Phase::Playing { turn: self.turn };
        let [first, second] = self.read_both(Seat::accept_play).await?;

        let (one, two) = judge(first, second);
        self.seats[0].tally.record(one);
        self.seats[1].tally.record(two);
        self.write_both(&[result_frame(one), result_frame(two)])
            .await?;

        debug!(
            session_id = %self.id,
            turn = self.turn,
            first = first.value(),
            second = second.value(),
            outcome = ?one,
            "turn played"
        );
        self.turn += 1;
        Ok(())
    }

    /// Reads and checks one client frame from each side. Both reads are
    /// awaited together; the first fault or violation on either side ends
    /// the step without waiting for the other side.
    async fn read_both<T, F>(&mut self, check: F) -> Result<[T; 2], SessionError>
    where
        F: Fn(&mut Seat<S>, [u8; FRAME_LEN]) -> Result<T, ProtocolError>,
    {
        let [one, two] = &mut self.seats;
        let (a, b) = tokio::try_join!(
            one.receive(Side::One, &check),
            two.receive(Side::Two, &check),
        )?;
        Ok([a, b])
    }

    async fn write_both(&mut self, frames: &[Vec<u8>; 2]) -> Result<(), SessionError> {
        let [one, two] = &mut self.seats;
        tokio::try_join!(
            async {
                one.conn
                    .write_frame(&frames[0])
                    .await
                    .map_err(|f| SessionError::fault(Side::One, f))
            },
            async {
                two.conn
                    .write_frame(&frames[1])
                    .await
                    .map_err(|f| SessionError::fault(Side::Two, f))
            },
        )?;
        Ok(())
    }

    async fn close(&mut self) {
        let [one, two] = &mut self.seats;
        tokio::join!(one.conn.close(), two.conn.close());
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id.clone(),
            turns: self.turn,
            tallies: [self.seats[0].tally, self.seats[1].tally],
        }
    }
}

fn result_frame(outcome: Outcome) -> Vec<u8> {
    ServerMessage::PlayResult(outcome).encode()
}
