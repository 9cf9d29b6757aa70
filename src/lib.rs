//! gemini-relay - HTTP relay between web clients and the Gemini API
//!
//! Two route tables share one stack: the `generate` variant relays text
//! prompts and uploaded images, documents, and audio; the `chat` variant
//! serves a static chat page backed by `/api/chat`.

pub mod cli;
pub mod config;
pub mod cors;
pub mod error;
pub mod gemini;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod telemetry;
pub mod upload;
