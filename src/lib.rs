//! # taskdeck
//!
//! Personal task tracker: a [`TaskDeck`] facade over the `SQLite` store and
//! the rule engine, and the `taskdeck` command-line binary built on it.

#![deny(unsafe_code)]

pub mod app;
pub mod cli;

pub use app::TaskDeck;
