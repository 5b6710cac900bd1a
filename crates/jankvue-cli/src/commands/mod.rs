//! CLI command implementations

pub mod modes;
pub mod replay;
