//! Shared HTTP state and infrastructure handlers.

pub mod http;
