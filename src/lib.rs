//! lexicon - read-only query service over a SQLite dictionary.
//!
//! The crate is layered leaf-first:
//!
//! ```text
//! query::{validate, fields} ──► query::compiler ──► storage ──► query::shaper
//!                                      │                            │
//!                                      └──── query::negative_cache ◄┘
//!                                                   │
//!                                   service ◄───────┘ ◄── server (axum) / cli
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod query;
pub mod server;
pub mod service;
pub mod storage;
pub mod test_utils;

pub use error::{LexiconError, Result};
