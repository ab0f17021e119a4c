//! CLI command implementations.

pub mod record;
pub mod remove;
pub mod restore;
pub mod serve;
pub mod stats;
