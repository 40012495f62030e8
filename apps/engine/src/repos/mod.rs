//! Repository layer between services and the store.

pub mod games;

pub use games::{GameRepo, Update};
