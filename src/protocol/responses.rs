//! FTP Response handling
//!
//! Reply codes and formatting for the transfer commands, plus the seam
//! handlers use to write replies to the control connection.

use std::io::{self, Write};

/// Reply codes used by the transfer commands
pub const TRANSFER_STARTING: u16 = 150;
pub const FILE_STATUS: u16 = 213;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const FILE_ACTION_OK: u16 = 250;
pub const ACTION_NOT_TAKEN: u16 = 550;
pub const ACTION_ABORTED: u16 = 551;

/// Format an FTP reply line
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}

/// Where handlers write their replies.
///
/// Implemented for anything `Write`, so the control-connection stream
/// works directly and tests can capture replies in a buffer.
pub trait ReplyWriter {
    fn write_reply(&mut self, code: u16, message: &str) -> io::Result<()>;
}

impl<W: Write> ReplyWriter for W {
    fn write_reply(&mut self, code: u16, message: &str) -> io::Result<()> {
        self.write_all(format_response(code, message).as_bytes())?;
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_response() {
        assert_eq!(
            format_response(226, "OK, received 5 bytes"),
            "226 OK, received 5 bytes\r\n"
        );
    }

    #[test]
    fn test_write_reply_to_buffer() {
        let mut buf: Vec<u8> = Vec::new();
        buf.write_reply(150, "Data transfer starting").unwrap();
        assert_eq!(buf, b"150 Data transfer starting\r\n");
    }
}
