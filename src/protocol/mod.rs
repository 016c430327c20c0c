//! FTP transfer protocol surface
//!
//! The command enum for the transfer verbs, their handlers, and reply
//! formatting.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::Command;
pub use handlers::handle_command;
pub use responses::{ReplyWriter, format_response};
