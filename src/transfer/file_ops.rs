//! Module `file_ops`
//!
//! Byte-accurate copy between a data connection and a driver file handle.
//! Uploads copy the first 512 bytes to the file as a discrete step so the
//! backend can classify the content before the rest of the stream
//! arrives. End-of-file is the normal exit everywhere, never an error.

use log::debug;
use std::io::{self, ErrorKind, Read, Write};

const BUFFER_SIZE: usize = 8192;

/// Length of the leading prefix copied separately during uploads.
pub const TYPE_SNIFF_LEN: u64 = 512;

/// Streams an upload from the data connection into the file handle,
/// returning the total byte count.
///
/// End-of-file inside the prefix finishes the upload with the short
/// count. An error inside the prefix aborts before any further bytes are
/// copied.
pub fn receive_file<R: Read, W: Write>(data: &mut R, file: &mut W) -> io::Result<u64> {
    let first = copy_stream(&mut data.by_ref().take(TYPE_SNIFF_LEN), file)?;
    if first < TYPE_SNIFF_LEN {
        return Ok(first);
    }
    debug!("Type-sniff prefix copied, streaming the remainder");
    let rest = copy_stream(data, file)?;
    Ok(first + rest)
}

/// Streams a download from the file handle to the data connection until
/// end-of-file, returning the byte count.
pub fn send_file<R: Read, W: Write>(file: &mut R, data: &mut W) -> io::Result<u64> {
    let total = copy_stream(file, data)?;
    data.flush()?;
    Ok(total)
}

fn copy_stream<R: Read, W: Write>(src: &mut R, dst: &mut W) -> io::Result<u64> {
    let mut buffer = [0u8; BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = match src.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        dst.write_all(&buffer[..n])?;
        total += n as u64;
    }
    Ok(total)
}
