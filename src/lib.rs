//! CROUPIER — Screen-Macro Bet Placement Agent
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod compose;
pub mod layout;
pub mod storage;
pub mod pointer;
pub mod executor;
