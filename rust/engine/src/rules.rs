use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::errors::ProtocolError;

/// Per-side result of one turn, with its wire code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Outcome {
    Win = 0,
    Draw = 1,
    Lose = 2,
}

impl Outcome {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Outcome, ProtocolError> {
        match code {
            0 => Ok(Outcome::Win),
            1 => Ok(Outcome::Draw),
            2 => Ok(Outcome::Lose),
            other => Err(ProtocolError::UnknownOutcome(other)),
        }
    }

    /// The outcome the other side receives for the same turn.
    pub const fn opposite(self) -> Outcome {
        match self {
            Outcome::Win => Outcome::Lose,
            Outcome::Draw => Outcome::Draw,
            Outcome::Lose => Outcome::Win,
        }
    }
}

/// Outcome for the player of `mine` against `theirs`.
///
/// Only ranks are compared. The lower rank loses, equal ranks draw.
///
/// # Examples
///
/// ```
/// use war_engine::cards::Card;
/// use war_engine::rules::{compare, Outcome};
///
/// let bottom = Card::new(0).unwrap(); // rank 0
/// let top = Card::new(12).unwrap(); // rank 12
/// assert_eq!(compare(bottom, top), Outcome::Lose);
/// assert_eq!(compare(top, bottom), Outcome::Win);
/// assert_eq!(compare(Card::new(5).unwrap(), Card::new(18).unwrap()), Outcome::Draw);
/// ```
pub fn compare(mine: Card, theirs: Card) -> Outcome {
    match mine.rank().cmp(&theirs.rank()) {
        std::cmp::Ordering::Less => Outcome::Lose,
        std::cmp::Ordering::Equal => Outcome::Draw,
        std::cmp::Ordering::Greater => Outcome::Win,
    }
}

/// Outcomes for side one and side two of a turn.
pub fn judge(first: Card, second: Card) -> (Outcome, Outcome) {
    let outcome = compare(first, second);
    (outcome, outcome.opposite())
}

/// Running win/draw/loss count for one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

/// Final standing of one side after a full game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Won,
    Drew,
    Lost,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let word = match self {
            Verdict::Won => "won",
            Verdict::Drew => "drew",
            Verdict::Lost => "lost",
        };
        f.write_str(word)
    }
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Lose => self.losses += 1,
        }
    }

    pub fn turns(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    /// Wins minus losses decides the game; draws do not count.
    pub fn verdict(&self) -> Verdict {
        match self.wins.cmp(&self.losses) {
            std::cmp::Ordering::Greater => Verdict::Won,
            std::cmp::Ordering::Equal => Verdict::Drew,
            std::cmp::Ordering::Less => Verdict::Lost,
        }
    }
}
