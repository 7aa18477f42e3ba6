//! Infrastructure layer for Tagarela.
//!
//! Contains implementations of the port traits defined in `tagarela-core`:
//! SQLite storage for the conversation log, the Gemini generation client,
//! and configuration loading from disk and environment.

pub mod config;
pub mod gemini;
pub mod sqlite;
