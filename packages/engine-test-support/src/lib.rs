//! Shared test helpers for `pong-engine`.
//!
//! A dev-dependency of the engine, used by its unit tests and its
//! integration binaries alike.

pub mod logging;
