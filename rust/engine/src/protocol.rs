//! Byte-exact frames of the war protocol.
//!
//! Every frame is a command byte followed by a fixed payload. Client frames
//! and `PLAYRESULT` are two bytes; `GAMESTART` carries a whole hand and is
//! 27 bytes. There is no length prefix.

use crate::cards::Card;
use crate::errors::ProtocolError;
use crate::hand::{Hand, HAND_SIZE};
use crate::rules::Outcome;

/// Length of every frame except `GAMESTART`.
pub const FRAME_LEN: usize = 2;

/// Length of the `GAMESTART` frame: command byte plus 26 cards.
pub const GAMESTART_LEN: usize = 1 + HAND_SIZE;

/// Command tag carried in byte 0 of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    WantGame = 0x00,
    GameStart = 0x01,
    PlayCard = 0x02,
    PlayResult = 0x03,
}

impl TryFrom<u8> for Command {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x00 => Ok(Command::WantGame),
            0x01 => Ok(Command::GameStart),
            0x02 => Ok(Command::PlayCard),
            0x03 => Ok(Command::PlayResult),
            other => Err(ProtocolError::UnknownCommand(other)),
        }
    }
}

/// Frames sent from a player to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    WantGame,
    /// The raw card byte. Membership in the player's hand is checked by the
    /// session, so any byte is accepted here.
    PlayCard(u8),
}

impl ClientMessage {
    pub fn play(card: Card) -> Self {
        ClientMessage::PlayCard(card.value())
    }

    pub fn command(self) -> Command {
        match self {
            ClientMessage::WantGame => Command::WantGame,
            ClientMessage::PlayCard(_) => Command::PlayCard,
        }
    }

    pub fn encode(self) -> [u8; FRAME_LEN] {
        match self {
            ClientMessage::WantGame => [Command::WantGame as u8, 0x00],
            ClientMessage::PlayCard(card) => [Command::PlayCard as u8, card],
        }
    }

    /// Decodes a two-byte client frame.
    ///
    /// ```
    /// use war_engine::errors::ProtocolError;
    /// use war_engine::protocol::ClientMessage;
    ///
    /// assert_eq!(ClientMessage::decode([0x02, 7]), Ok(ClientMessage::PlayCard(7)));
    /// assert_eq!(ClientMessage::decode([0x00, 1]), Err(ProtocolError::NonzeroPayload(1)));
    /// assert_eq!(ClientMessage::decode([0x09, 0]), Err(ProtocolError::UnknownCommand(9)));
    /// ```
    pub fn decode(frame: [u8; FRAME_LEN]) -> Result<Self, ProtocolError> {
        let [tag, payload] = frame;
        match Command::try_from(tag)? {
            Command::WantGame if payload == 0 => Ok(ClientMessage::WantGame),
            Command::WantGame => Err(ProtocolError::NonzeroPayload(payload)),
            Command::PlayCard => Ok(ClientMessage::PlayCard(payload)),
            server @ (Command::GameStart | Command::PlayResult) => {
                Err(ProtocolError::ServerOnlyCommand(server))
            }
        }
    }
}

/// Frames sent from the server to a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    GameStart(Hand),
    PlayResult(Outcome),
}

impl ServerMessage {
    pub fn command(&self) -> Command {
        match self {
            ServerMessage::GameStart(_) => Command::GameStart,
            ServerMessage::PlayResult(_) => Command::PlayResult,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            ServerMessage::GameStart(hand) => {
                let mut frame = Vec::with_capacity(GAMESTART_LEN);
                frame.push(Command::GameStart as u8);
                frame.extend(hand.iter().map(Card::value));
                frame
            }
            ServerMessage::PlayResult(outcome) => {
                vec![Command::PlayResult as u8, outcome.code()]
            }
        }
    }
}

fn expect_command(tag: u8, expected: Command) -> Result<(), ProtocolError> {
    let found = Command::try_from(tag)?;
    if found == expected {
        Ok(())
    } else {
        Err(ProtocolError::UnexpectedCommand { expected, found })
    }
}

/// Decodes a `GAMESTART` frame into the dealt hand.
pub fn decode_game_start(frame: &[u8; GAMESTART_LEN]) -> Result<Hand, ProtocolError> {
    expect_command(frame[0], Command::GameStart)?;
    let cards = frame[1..]
        .iter()
        .map(|&b| Card::new(b))
        .collect::<Result<Vec<_>, _>>()?;
    Hand::from_cards(cards)
}

/// Decodes a `PLAYRESULT` frame into the receiving side's outcome.
pub fn decode_play_result(frame: [u8; FRAME_LEN]) -> Result<Outcome, ProtocolError> {
    expect_command(frame[0], Command::PlayResult)?;
    Outcome::from_code(frame[1])
}
