//! HTTP API for the souvenir catalog: routing, page assembly, JSON mapping.

pub mod app;
pub mod middleware;
