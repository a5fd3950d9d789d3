//! # war-engine: War Card Game Core
//!
//! Cards, deals, turn rules and the wire protocol for a two-player game of
//! war. Everything here is transport-agnostic; the networked state machine
//! lives in `war-server`.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card values 0..52, rank and suit
//! - [`hand`] - Dealt hands and the per-side set of played cards
//! - [`deck`] - Seeded ChaCha20 shuffling and the 26/26 deal
//! - [`rules`] - Turn outcomes and per-side tallies
//! - [`protocol`] - Command tags and byte-exact frame codecs
//! - [`errors`] - Protocol violation types
//!
//! ## Quick Start
//!
//! ```rust
//! use war_engine::deck::Deck;
//! use war_engine::rules::judge;
//!
//! let (a, b) = Deck::new_with_seed(42).deal();
//! let (first, second) = judge(a.cards()[0], b.cards()[0]);
//! assert_eq!(first.opposite(), second);
//! ```

pub mod cards;
pub mod deck;
pub mod errors;
pub mod hand;
pub mod protocol;
pub mod rules;
