//! CLI Commands

pub mod id;
pub mod monitor;
pub mod session;
