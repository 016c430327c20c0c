//! Module `commands`
//!
//! The file-transfer commands executed by this subsystem. Parsing raw
//! command lines into these variants is the embedding dispatcher's job;
//! every variant carries the single path parameter it was invoked with.

/// A file-transfer command with its path parameter.
#[derive(Debug, PartialEq)]
pub enum Command {
    STOR(String), // Store/upload file
    APPE(String), // Upload, appending to existing content
    RETR(String), // Retrieve/download file
    DELE(String), // Delete file
    RNFR(String), // Rename source
    RNTO(String), // Rename target
    SIZE(String), // File size query
    MDTM(String), // Modification time query
}
