//! Ferro FTP Server - file-transfer command subsystem
//!
//! Executes the STOR, APPE, RETR, DELE, RNFR, RNTO, SIZE and MDTM commands
//! against a passive data connection and a pluggable storage driver. The
//! embedding server owns the control loop, command parsing, authentication
//! and passive-socket negotiation, and calls into this crate per command.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod storage;
pub mod transfer;

pub use client::Session;
pub use config::TransferConfig;
pub use protocol::{Command, handle_command};
pub use storage::{FsDriver, StorageDriver};
pub use transfer::DataChannel;
