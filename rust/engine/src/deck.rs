use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card, DECK_SIZE};
use crate::hand::{Hand, HAND_SIZE};

/// Shuffles and splits the 52-card deck for one session.
#[derive(Debug)]
pub struct Deck {
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new_with_seed(rand::random())
    }

    /// A uniformly random permutation of all 52 cards (Fisher-Yates).
    pub fn shuffled(&mut self) -> Vec<Card> {
        let mut cards = full_deck();
        cards.shuffle(&mut self.rng);
        cards
    }

    /// Deals two 26-card hands: the first half of a fresh shuffle goes to
    /// side one, the rest to side two.
    ///
    /// ```
    /// use war_engine::deck::{is_exact_partition, Deck};
    ///
    /// let (a, b) = Deck::new_with_seed(7).deal();
    /// assert_eq!(a.len(), 26);
    /// assert!(is_exact_partition(&a, &b));
    /// ```
    pub fn deal(&mut self) -> (Hand, Hand) {
        let mut first = self.shuffled();
        let second = first.split_off(HAND_SIZE);
        let (a, b) = (Hand::dealt(first), Hand::dealt(second));
        debug_assert!(is_exact_partition(&a, &b));
        (a, b)
    }
}

/// True when `a` and `b` hold 26 cards each and together cover every card
/// exactly once.
pub fn is_exact_partition(a: &Hand, b: &Hand) -> bool {
    if a.len() != HAND_SIZE || b.len() != HAND_SIZE {
        return false;
    }
    let mut seen = [false; DECK_SIZE];
    for card in a.iter().chain(b.iter()) {
        let slot = &mut seen[usize::from(card.value())];
        if *slot {
            return false;
        }
        *slot = true;
    }
    seen.iter().all(|&s| s)
}
