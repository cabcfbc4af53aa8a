//! Engine bridge for the Chain Reaction relay
//!
//! The external engine is a separate program that reads the exchange file,
//! writes its move back into the same file and exits. This crate provides:
//!
//! - **Exchange file**: overwrite-write and read of the shared record
//! - **Engine trait**: the seam the move service drives
//! - **Process engine**: subprocess launch with a deadline and exit-status
//!   classification

mod engine;
mod exchange_file;
mod process;

pub use engine::{Engine, EngineReport};
pub use exchange_file::ExchangeFile;
pub use process::{EngineConfig, ProcessEngine};
