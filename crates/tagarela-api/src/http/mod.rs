//! HTTP/REST API layer for Tagarela.
//!
//! Axum-based REST API at `/api/v1/` with JSON:API documents and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
