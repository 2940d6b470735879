//! Deck statistics for Tabulae.
//!
//! Statistics are computed on demand from a listing of the card store; there
//! is no separate log or cache to keep in sync.

pub mod deck;

pub use deck::DeckStats;
