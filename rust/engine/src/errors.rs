use thiserror::Error;

use crate::protocol::Command;

/// A frame or play that breaks the protocol.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ProtocolError {
    #[error("Unknown command byte {0:#04x}")]
    UnknownCommand(u8),
    #[error("Expected {expected:?} but received {found:?}")]
    UnexpectedCommand { expected: Command, found: Command },
    #[error("Command {0:?} is only sent by the server")]
    ServerOnlyCommand(Command),
    #[error("WANTGAME payload must be zero, got {0:#04x}")]
    NonzeroPayload(u8),
    #[error("Card {0} was not dealt to this player")]
    CardNotDealt(u8),
    #[error("Card {0} was already played")]
    CardReplayed(u8),
    #[error("Card value {0} is outside 0..52")]
    InvalidCard(u8),
    #[error("Hand must hold {expected} cards, got {actual}")]
    WrongHandSize { expected: usize, actual: usize },
    #[error("Card {0} appears twice in one hand")]
    DuplicateCard(u8),
    #[error("Outcome byte {0} is not WIN, DRAW or LOSE")]
    UnknownOutcome(u8),
}
