use std::collections::HashSet;

use crate::cards::{Card, DECK_SIZE};
use crate::errors::ProtocolError;

/// Cards dealt to each side of a session.
pub const HAND_SIZE: usize = DECK_SIZE / 2;

/// The ordered cards dealt to one side for one session.
///
/// Order is the shuffle order and is preserved on the wire. A `Hand` built
/// through [`Hand::from_cards`] always holds exactly [`HAND_SIZE`] distinct
/// cards; [`Hand::default`] is the empty hand of a seat that has not been
/// dealt yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    /// Validates a dealt hand: exactly 26 cards, no repeats.
    pub fn from_cards(cards: Vec<Card>) -> Result<Hand, ProtocolError> {
        if cards.len() != HAND_SIZE {
            return Err(ProtocolError::WrongHandSize {
                expected: HAND_SIZE,
                actual: cards.len(),
            });
        }
        let mut seen = HashSet::with_capacity(HAND_SIZE);
        for card in &cards {
            if !seen.insert(*card) {
                return Err(ProtocolError::DuplicateCard(card.value()));
            }
        }
        Ok(Hand { cards })
    }

    pub(crate) fn dealt(cards: Vec<Card>) -> Hand {
        debug_assert_eq!(cards.len(), HAND_SIZE);
        Hand { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    /// Looks up a raw wire byte in this hand.
    ///
    /// Bytes outside `0..52` can never be in a hand and resolve to `None`.
    pub fn find(&self, value: u8) -> Option<Card> {
        self.cards.iter().copied().find(|c| c.value() == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter().copied()
    }
}

/// Cards one side has already played this session.
///
/// Grows monotonically; a card can be inserted once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsedSet {
    bits: u64,
}

impl UsedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `card` as played. Returns `false` if it was already played.
    pub fn insert(&mut self, card: Card) -> bool {
        let mask = 1u64 << card.value();
        let fresh = self.bits & mask == 0;
        self.bits |= mask;
        fresh
    }

    pub fn contains(&self, card: Card) -> bool {
        self.bits & (1u64 << card.value()) != 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}
