//! Shared helpers for pipeline stages.

pub mod cancel;
pub mod fs;
pub mod http;
