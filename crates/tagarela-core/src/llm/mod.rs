//! Generation client abstraction.

pub mod client;
