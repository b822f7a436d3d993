//! Meter reading uplink library
//!
//! This library extracts OBIS-coded register values from a meter reading log,
//! packs them into a hexadecimal payload (optionally AES encrypted) and sends it
//! in Sigfox sized frames to an AT command modem over a serial line.

pub mod config;
pub mod encoder;
pub mod extractor;
pub mod modem;
pub mod obis_utils;
pub mod registers;
pub mod runner;

#[cfg(test)]
pub(crate) mod testdata;

// Re-export common types for easier access
pub use config::{Config, ConfigHolder};
pub use encoder::{ChunkSequence, Payload};
pub use extractor::ReadingSet;
pub use modem::SigfoxModem;
pub use registers::{RegisterKind, RegisterTable};
pub use runner::{run, AppError, RunOptions, RunSummary};
