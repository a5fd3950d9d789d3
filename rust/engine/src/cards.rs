use serde::{Deserialize, Serialize};

use crate::errors::ProtocolError;

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 52;

/// Number of distinct ranks; a card's rank is its value modulo this.
pub const RANK_COUNT: u8 = 13;

/// A single playing card, encoded on the wire as one byte in `0..52`.
///
/// Only the rank (`value % 13`) takes part in scoring. The suit
/// (`value / 13`) is carried for display and never compared.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Card(u8);

impl Card {
    /// Builds a card from its wire value.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidCard`] when `value` is 52 or above.
    ///
    /// # Examples
    ///
    /// ```
    /// use war_engine::cards::Card;
    ///
    /// let card = Card::new(18).unwrap();
    /// assert_eq!(card.rank(), 5);
    /// assert_eq!(card.suit(), 1);
    /// assert!(Card::new(52).is_err());
    /// ```
    pub fn new(value: u8) -> Result<Card, ProtocolError> {
        if usize::from(value) < DECK_SIZE {
            Ok(Card(value))
        } else {
            Err(ProtocolError::InvalidCard(value))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn rank(self) -> u8 {
        self.0 % RANK_COUNT
    }

    pub const fn suit(self) -> u8 {
        self.0 / RANK_COUNT
    }
}

impl TryFrom<u8> for Card {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Card::new(value)
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> u8 {
        card.0
    }
}

/// All 52 cards in ascending value order.
pub fn full_deck() -> Vec<Card> {
    (0..DECK_SIZE as u8).map(Card).collect()
}
